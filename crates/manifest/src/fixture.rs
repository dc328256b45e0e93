//! Synthetic manifests for tests.
//!
//! Compiled for this crate's own tests, and for other crates through the
//! `fixture` feature (intended for dev-dependencies only).

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};

use crate::MANIFEST_FILENAME;
use crate::error::{ErrorKind, Result};
use crate::models::EntryType;

/// Same shape as the table written by iTunes/Finder.
const SCHEMA: &str = "CREATE TABLE Files (fileID TEXT PRIMARY KEY, domain TEXT, relativePath TEXT, flags INTEGER, file BLOB)";

/// A row to insert into a synthetic manifest.
#[derive(Clone, Debug)]
pub struct Row {
    pub file_id: String,
    pub domain: String,
    pub relative_path: String,
    pub flags: i64,
    pub metadata: Vec<u8>,
}
impl Row {
    pub fn new(
        file_id: impl Into<String>,
        domain: impl Into<String>,
        relative_path: impl Into<String>,
        flags: i64,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            domain: domain.into(),
            relative_path: relative_path.into(),
            flags,
            // The real thing is a binary plist, but nothing reads it.
            metadata: b"bplist00".to_vec(),
        }
    }

    pub fn file(file_id: impl Into<String>, domain: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self::new(file_id, domain, relative_path, EntryType::RegularFile.flags())
    }

    pub fn directory(file_id: impl Into<String>, domain: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self::new(file_id, domain, relative_path, EntryType::Directory.flags())
    }

    pub fn placeholder(
        file_id: impl Into<String>,
        domain: impl Into<String>,
        relative_path: impl Into<String>,
    ) -> Self {
        Self::new(file_id, domain, relative_path, EntryType::ProtectedPlaceholder.flags())
    }
}

/// Builder for a `Manifest.db` file.
#[derive(Clone, Debug, Default)]
pub struct Fixture {
    rows: Vec<Row>,
    statements: Vec<String>,
}
impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Run an arbitrary statement once the rows are in, for content the
    /// [`Row`] builder cannot express (e.g. text that is not UTF-8).
    pub fn sql(mut self, statement: impl Into<String>) -> Self {
        self.statements.push(statement.into());
        self
    }

    /// Write `Manifest.db` into `dir`, returning its path.
    pub async fn write(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(MANIFEST_FILENAME);
        let options = SqliteConnectOptions::new().filename(&path).create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        sqlx::query(SCHEMA).execute(&pool).await.or_raise(|| ErrorKind::Database)?;
        for row in &self.rows {
            sqlx::query("INSERT INTO Files (fileID, domain, relativePath, flags, file) VALUES (?, ?, ?, ?, ?)")
                .bind(row.file_id.as_str())
                .bind(row.domain.as_str())
                .bind(row.relative_path.as_str())
                .bind(row.flags)
                .bind(row.metadata.as_slice())
                .execute(&pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        for statement in &self.statements {
            sqlx::query(statement).execute(&pool).await.or_raise(|| ErrorKind::Database)?;
        }
        pool.close().await;
        Ok(path)
    }
}
