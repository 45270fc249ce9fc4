use std::time::Duration;

use axum::http::{Request, Response};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::Span;

pub trait HttpLoggingExt<S> {
    fn with_http_logging(self) -> Self;
}

impl<S> HttpLoggingExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Add HTTP logging to Router
    fn with_http_logging(self) -> Router<S> {
        self.layer(
            TraceLayer::new_for_http()
                .on_request(|request: &Request<_>, _span: &Span| {
                    tracing::info!(target: "tower_http", method = %request.method(), path = %request.uri().path());
                })
                .on_response(|response: &Response<_>, latency: Duration, _span: &Span| {
                    tracing::info!(
                        target: "tower_http",
                        status = %format!(
                            "{} {}",
                            response.status().as_str(),
                            response.status().canonical_reason().unwrap_or_default()
                        ),
                        ?latency,
                    )
                }),
        )
    }
}
