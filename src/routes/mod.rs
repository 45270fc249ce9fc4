pub mod docs;
pub mod files;
pub mod posts;

use axum::Router;

use crate::middleware::logging::HttpLoggingExt;
use crate::services::files::FileService;
use crate::services::posts::PostRegistry;

pub fn app<F: FileService>(registry: PostRegistry, file_svc: F, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(posts::router().with_state(registry))
        .merge(files::router::<F>(max_upload_bytes).with_state(file_svc))
        .merge(docs::router())
        .with_http_logging()
}
