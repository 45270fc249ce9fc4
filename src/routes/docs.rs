use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use super::{files, posts};

#[derive(OpenApi)]
#[openapi(
    info(title = "filepost", description = "In-memory posts and uploaded file metadata."),
    paths(
        posts::list_posts,
        posts::create_post,
        posts::get_post,
        files::upload_file,
        files::list_files,
    ),
    tags(
        (name = "Posts", description = "Text posts held in process memory"),
        (name = "Files", description = "Metadata of uploaded files"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Serves the API document at `GET /openapi.json`.
pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}
