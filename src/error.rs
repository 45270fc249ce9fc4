use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const POST_NOT_FOUND: &str = "Post not found.";

/// Body of every non-validation error.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "detail": "Post not found." }))]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Offending field, e.g. `limit` or `file`.
    pub loc: String,
    pub msg: String,
}

/// Body of a 422 raised by a field rule.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationDetail {
    pub detail: Vec<FieldError>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input parsed fine but breaks a field rule.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// An extractor refused the request before the handler ran.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{}", POST_NOT_FOUND)]
    PostNotFound,

    #[error("persistence error: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Rejected { status, .. } => *status,
            Self::PostNotFound => StatusCode::NOT_FOUND,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            Self::Validation { field, message } => {
                let body = ValidationDetail {
                    detail: vec![FieldError {
                        loc: field,
                        msg: message,
                    }],
                };
                return (status, Json(body)).into_response();
            }
            Self::Rejected { message, .. } => message,
            Self::PostNotFound => POST_NOT_FOUND.to_owned(),
            Self::Persistence(e) => {
                tracing::error!(error = ?e, "file store failure");
                "Internal server error.".to_owned()
            }
        };
        (status, Json(ErrorDetail { detail })).into_response()
    }
}

macro_rules! rejection_into_app_error {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    Self::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

rejection_into_app_error!(
    JsonRejection,
    QueryRejection,
    PathRejection,
    MultipartError,
);

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::json;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_has_fixed_detail() {
        let (status, body) = body_json(AppError::PostNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "Post not found." }));
    }

    #[tokio::test]
    async fn validation_names_the_field() {
        let (status, body) = body_json(AppError::validation("limit", "out of range")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"], "limit");
        assert_eq!(body["detail"][0]["msg"], "out of range");
    }

    #[tokio::test]
    async fn persistence_hides_the_cause() {
        let err = AppError::from(anyhow::anyhow!("connection refused"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "Internal server error." }));
    }
}
