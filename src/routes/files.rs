use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::Router;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorDetail, ValidationDetail};
use crate::helpers::AppJson;
use crate::models::file::{
    FileListResponse, NewFileRecord, UploadResponse, DEFAULT_FILE_TYPE, MAX_FILE_NAME_LEN,
    MAX_FILE_TYPE_LEN,
};
use crate::services::files::FileService;

/// Shape of the `multipart/form-data` body, for the API document only.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    caption: String,
}

/// Metadata pulled out of the `file` part once its body has been drained.
struct UploadedPart {
    file_name: String,
    file_type: String,
}

/// Reads `caption` and `file` out of the form. The file body is read to the
/// end and thrown away; only its name and declared type are kept.
async fn read_upload_form(mut form: Multipart) -> Result<(String, UploadedPart), AppError> {
    let mut caption = None;
    let mut upload = None;

    while let Some(mut field) = form.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("caption") => caption = Some(field.text().await?),
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .map(str::to_owned)
                    .ok_or_else(|| AppError::validation("file", "a filename is required"))?;
                let file_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_FILE_TYPE)
                    .to_owned();

                let mut size = 0usize;
                while let Some(chunk) = field.chunk().await? {
                    size += chunk.len();
                }
                debug!(%file_name, %file_type, size, "discarded upload body");

                upload = Some(UploadedPart {
                    file_name,
                    file_type,
                });
            }
            _ => debug!(field = ?name, "ignoring unexpected form field"),
        }
    }

    let caption = caption.ok_or_else(|| AppError::validation("caption", "field required"))?;
    let upload = upload.ok_or_else(|| AppError::validation("file", "field required"))?;

    // postgres text columns cannot hold NUL
    if caption.contains('\0') {
        return Err(AppError::validation("caption", "must not contain NUL characters"));
    }
    if upload.file_name.contains('\0') {
        return Err(AppError::validation("file", "filename must not contain NUL characters"));
    }

    if upload.file_type.chars().count() > MAX_FILE_TYPE_LEN {
        return Err(AppError::validation(
            "file",
            format!("content type longer than {MAX_FILE_TYPE_LEN} characters"),
        ));
    }
    if upload.file_name.chars().count() > MAX_FILE_NAME_LEN {
        return Err(AppError::validation(
            "file",
            format!("filename longer than {MAX_FILE_NAME_LEN} characters"),
        ));
    }

    Ok((caption, upload))
}

#[utoipa::path(
    post,
    path = "/files/upload",
    tag = "Files",
    summary = "Upload a file with a caption.",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Metadata stored; file bytes are not kept", body = UploadResponse),
        (status = 413, description = "Body larger than the upload limit", body = ErrorDetail),
        (status = 422, description = "Missing or invalid form field", body = ValidationDetail),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn upload_file<F: FileService>(
    State(files): State<F>,
    form: Result<Multipart, MultipartRejection>,
) -> Result<AppJson<UploadResponse>, AppError> {
    // anything that is not a multipart form carries neither required field
    let form = form.map_err(|rejection| {
        debug!(%rejection, "upload body is not multipart");
        AppError::validation("file", "field required")
    })?;
    let (caption, part) = read_upload_form(form).await?;

    let new = NewFileRecord::from_upload(caption, part.file_name, part.file_type);
    let record = files.insert(new).await?;
    info!(id = %record.id, url = %record.url, "file record stored");

    Ok(AppJson(record.into()))
}

#[utoipa::path(
    get,
    path = "/files",
    tag = "Files",
    summary = "Get a list of uploaded files.",
    responses(
        (status = 200, description = "File records, newest first", body = FileListResponse),
        (status = 500, description = "File store unavailable", body = ErrorDetail),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_files<F: FileService>(
    State(files): State<F>,
) -> Result<AppJson<FileListResponse>, AppError> {
    let records = files.list_recent().await?;
    Ok(AppJson(FileListResponse {
        files: records.into_iter().map(Into::into).collect(),
    }))
}

pub fn router<F: FileService>(max_upload_bytes: usize) -> Router<F> {
    Router::new().route("/files", get(list_files::<F>)).route(
        "/files/upload",
        post(upload_file::<F>).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}
