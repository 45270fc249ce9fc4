use axum::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::models::file::*;
use crate::schema;

use super::{Pool, Svc};

#[async_trait]
pub trait FileService<E = anyhow::Error>: Svc {
    async fn insert(&self, file: NewFileRecord) -> Result<FileRecord, E>;
    /// Every record, newest first.
    async fn list_recent(&self) -> Result<Vec<FileRecord>, E>;
}

/// Postgres-backed file metadata. Each call checks a connection out of the
/// pool and gives it back when the call returns, whichever way it returns.
#[derive(Clone)]
pub struct FileServiceDb {
    db: Pool,
}

impl Svc for FileServiceDb {}

#[async_trait]
impl FileService<anyhow::Error> for FileServiceDb {
    async fn insert(&self, file: NewFileRecord) -> anyhow::Result<FileRecord> {
        use schema::files::dsl::*;

        let mut conn = self.db.get().await?;

        // rolled back if the insert fails or this future is dropped mid-flight
        let record = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::insert_into(files)
                        .values(&file)
                        .returning(FileRecord::as_returning())
                        .get_result::<FileRecord>(conn)
                        .await
                }
                .scope_boxed()
            })
            .await?;

        Ok(record)
    }

    async fn list_recent(&self) -> anyhow::Result<Vec<FileRecord>> {
        use schema::files::dsl::*;

        let mut conn = self.db.get().await?;
        let fs = files
            .order((created_at.desc(), seq.desc()))
            .select(FileRecord::as_select())
            .load(&mut conn)
            .await?;
        Ok(fs)
    }
}

impl FileServiceDb {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }
}

#[cfg(test)]
pub use memory::FileServiceMem;


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::config::AppCfg;
    use crate::services::{build_pool, run_migrations};

    use super::*;

    fn upload(n: usize) -> NewFileRecord {
        NewFileRecord::from_upload(
            format!("caption {n}"),
            format!("file-{n}.txt"),
            "text/plain".into(),
        )
    }

    async fn assert_round_trip<S: FileService>(svc: &S, n: usize) {
        let before = svc.list_recent().await.unwrap().len();

        let mut inserted = Vec::new();
        for i in 0..n {
            inserted.push(svc.insert(upload(i)).await.unwrap().id);
        }

        let listed = svc.list_recent().await.unwrap();
        assert_eq!(listed.len(), before + n);
        assert!(listed
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));

        let ids: HashSet<_> = listed.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), listed.len());
        assert!(inserted.iter().all(|i| ids.contains(i)));
        // equal timestamps still come back in reverse insertion order
        let newest: Vec<_> = listed.iter().take(n).map(|f| f.id).collect();
        let expected: Vec<_> = inserted.iter().rev().copied().collect();
        assert_eq!(newest, expected);
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        assert_round_trip(&FileServiceMem::default(), 25).await;
    }

    #[tokio::test]
    async fn memory_store_starts_empty() {
        let svc = FileServiceMem::default();
        assert!(svc.list_recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "needs PostgreSQL at APP_DATABASE_URL"]
    async fn postgres_round_trip() {
        let cfg = AppCfg::load().unwrap();
        run_migrations(&cfg.database_url).await.unwrap();
        let svc = FileServiceDb::new(build_pool(&cfg).unwrap());

        assert_round_trip(&svc, 5).await;

        let stored = svc.insert(upload(99)).await.unwrap();
        assert_eq!(stored.url, "/files/file-99.txt");
        assert_eq!(stored.caption.as_deref(), Some("caption 99"));
    }
}
