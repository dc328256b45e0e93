//! Manifest database handle.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

// Records are processed strictly one at a time, so one connection is plenty.
const MAX_CONNECTIONS: u32 = 1;

/// Read-only handle to a backup's `Manifest.db`.
///
/// The handle is owned by the caller and handed to whatever needs it; nothing
/// in this crate keeps a global connection around. Call [`close`](Self::close)
/// when done, dropping the handle also releases the connection but without
/// waiting for it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the manifest at the given path.
    ///
    /// The file must already exist (the manifest is never created) and must
    /// contain a `files` table with the expected columns.
    #[instrument("opening manifest", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            // No journal/WAL pragmas here: the manifest belongs to the backup
            // and is never written to.
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(std::time::Duration::from_millis(1500));
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        if let Err(e) = db.verify_schema().await {
            db.close().await;
            return Err(e);
        }
        tracing::debug!("connected to manifest database");
        Ok(db)
    }

    /// Check that the `files` table exists with all the columns we select.
    async fn verify_schema(&self) -> Result<()> {
        sqlx::query("SELECT fileID, domain, relativePath, flags, file FROM files LIMIT 0")
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Schema)?;
        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    ///
    /// Waits for the connection to be returned to the pool and then closes
    /// it. After calling this, the Database instance should not be used.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("closed manifest database");
    }
}
