mod config;
mod error;
mod helpers;
mod middleware;
mod models;
mod routes;
mod schema;
mod services;

use tracing::*;

use services::files::FileServiceDb;
use services::posts::PostRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::AppCfg::load()?;

    config::tracing::init(&cfg.log_filter);

    if cfg.run_migrations {
        services::run_migrations(&cfg.database_url).await?;
    }

    info!("Starting DB pool");
    let pool = services::build_pool(&cfg)?;

    let file_svc = FileServiceDb::new(pool);
    let registry = PostRegistry::seeded();
    info!(posts = registry.len().await, "post registry seeded");

    let app = routes::app(registry, file_svc, cfg.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port)).await?;
    info!("starting listening at {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(%e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(%e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
