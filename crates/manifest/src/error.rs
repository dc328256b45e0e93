//! Manifest Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A manifest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No manifest exists at the given location.
    #[display("manifest not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The manifest could not be opened.
    #[display("database error")]
    Database,
    /// The manifest opened, but doesn't look like a backup manifest.
    #[display("unexpected manifest schema")]
    Schema,
    /// A query failed to execute (malformed SQL, store error).
    ///
    /// This is deliberately distinct from a query that matched zero rows.
    #[display("query failed")]
    Query,
    /// A placeholder token was not delimited by `:` on both sides, or
    /// contained characters other than ASCII alphanumerics and underscores.
    #[display("unsafe placeholder token: {_0:?}")]
    UnsafeToken(#[error(not(source))] String),
    /// A placeholder token does not appear in the query text.
    #[display("placeholder token not present in query: {_0:?}")]
    UnknownToken(#[error(not(source))] String),
    /// The same placeholder token was bound twice.
    #[display("placeholder token bound more than once: {_0:?}")]
    DuplicateToken(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if the error was caused by how a query was built,
    /// rather than by the manifest itself.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::UnsafeToken(_) | Self::UnknownToken(_) | Self::DuplicateToken(_))
    }
}
