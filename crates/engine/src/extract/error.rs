//! Errors affecting a single manifest record.
//!
//! Most of these skip the record and let the run carry on. The exception is a
//! directory that cannot be created: everything below it would fail too, so
//! [`is_fatal`](RecordErrorKind::is_fatal) tells the stream to stop.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A record error with automatic location tracking via [`exn::Exn`].
pub type RecordError = exn::Exn<RecordErrorKind>;
/// Result type alias for per-record operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;

#[derive(Debug, Display, Error)]
pub enum RecordErrorKind {
    /// A text column of the manifest row is not valid UTF-8.
    #[display("column {_0} is not valid UTF-8")]
    Undecodable(#[error(not(source))] &'static str),
    /// The flags column holds none of the known entry types.
    #[display("malformed entry type {_0}")]
    MalformedEntry(#[error(not(source))] i64),
    /// The file ID cannot name a payload.
    #[display("invalid file ID {_0:?}")]
    InvalidFileId(#[error(not(source))] String),
    /// Domain, group or relative path would leave the destination tree.
    #[display("invalid destination path")]
    InvalidPath,
    /// The payload of a regular file is not in the backup.
    #[display("payload missing: {}", _0.display())]
    MissingPayload(#[error(not(source))] PathBuf),
    #[display("could not copy payload")]
    Copy,
    #[display("could not create placeholder")]
    Placeholder,
    #[display("could not create directory {}", _0.display())]
    Directory(#[error(not(source))] PathBuf),
}

impl RecordErrorKind {
    /// Returns `true` if the run cannot continue past this record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}
