pub mod files;
pub mod posts;

use std::time::Duration;

use anyhow::anyhow;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::deadpool::Hook;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

use crate::config::AppCfg;

pub type Pool = diesel_async::pooled_connection::deadpool::Pool<AsyncPgConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Marker for services handed to handlers through `State`.
pub trait Svc: Clone + Send + Sync + 'static {}

pub fn build_pool(cfg: &AppCfg) -> anyhow::Result<Pool> {
    let mgr = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&cfg.database_url);

    let pool = Pool::builder(mgr)
        .max_size(cfg.db_pool_max_size)
        .wait_timeout(Some(Duration::from_secs(cfg.db_wait_timeout_secs)))
        .post_create(Hook::async_fn(|_conn, metrics| {
            tracing::trace_span!("dbpool::post_create").in_scope(|| {
                tracing::trace!(?metrics, "Post-create");
                Box::pin(std::future::ready(Ok(())))
            })
        }))
        .runtime(deadpool::Runtime::Tokio1)
        .build()?;

    Ok(pool)
}

/// Applies pending embedded migrations on a dedicated blocking connection.
pub async fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    use diesel::Connection;

    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow!("running migrations: {e}"))?;
        Ok(versions.len())
    })
    .await??;

    info!(applied, "database migrations up to date");
    Ok(())
}
