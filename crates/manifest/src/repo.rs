//! Canned manifest queries.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::Decoded;
use crate::query::{FetchMode, Param, Query, bind_params};
use exn::ResultExt;
use sqlx::Sqlite;

/// Repository for reading [`ManifestRecord`](crate::ManifestRecord)s out of the manifest.
///
/// Borrows the caller's [`Database`] handle, the handle's lifetime (and
/// closing it) stays with the caller. All queries preserve manifest order,
/// and rows that cannot be decoded keep their place as [`Decoded`] errors.
#[derive(Debug, Clone, Copy)]
pub struct Repository<'a> {
    db: &'a Database,
}
impl<'a> From<&'a Database> for Repository<'a> {
    fn from(db: &'a Database) -> Self {
        Self { db }
    }
}
impl<'a> Repository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Every record in the manifest, fully materialized.
    pub async fn all(&self) -> Result<Vec<Decoded>> {
        Query::new(include_str!("../queries/all_files.sql")).execute(self.db, FetchMode::All).await
    }

    /// The first `limit` records in manifest order.
    pub async fn first(&self, limit: usize) -> Result<Vec<Decoded>> {
        Query::new(include_str!("../queries/all_files.sql")).execute(self.db, FetchMode::Many(limit)).await
    }

    /// Get a single record by its file ID (content hash).
    pub async fn get(&self, file_id: impl AsRef<str>) -> Result<Option<Decoded>> {
        let records = Query::new(include_str!("../queries/get_by_file_id.sql"))
            .bind(":file_id:", file_id.as_ref())?
            .execute(self.db, FetchMode::One)
            .await?;
        Ok(records.into_iter().next())
    }

    /// Every record belonging to the given (possibly compound) domain.
    ///
    /// The match is exact, `"AppDomain"` does not match
    /// `"AppDomain-com.example.app"`.
    pub async fn by_domain(&self, domain_group: impl AsRef<str>) -> Result<Vec<Decoded>> {
        Query::new(include_str!("../queries/get_by_domain.sql"))
            .bind(":domain:", domain_group.as_ref())?
            .execute(self.db, FetchMode::All)
            .await
    }

    /// Distinct domain values present in the manifest, sorted.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, the list is only ever
    /// displayed.
    pub async fn domains(&self) -> Result<Vec<String>> {
        let query = Query::new(include_str!("../queries/list_domains.sql"));
        let compiled = query.compile();
        let domains = bind_params!(sqlx::query_scalar::<Sqlite, Option<Vec<u8>>>(&compiled.sql), compiled.params)
            .fetch_all(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Query)?;
        Ok(domains.into_iter().flatten().map(|domain| String::from_utf8_lossy(&domain).into_owned()).collect())
    }

    /// Total number of records in the manifest.
    pub async fn count(&self) -> Result<u64> {
        let query = Query::new(include_str!("../queries/count_files.sql"));
        let compiled = query.compile();
        let count = bind_params!(sqlx::query_scalar::<Sqlite, i64>(&compiled.sql), compiled.params)
            .fetch_one(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Query)?;
        // COUNT(*) is never negative.
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
