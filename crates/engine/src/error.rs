//! Engine Error Types
//!
//! Errors of this type end a run. Failures that only affect a single record
//! are reported through [`RecordErrorKind`](crate::extract::error::RecordErrorKind)
//! instead.

use derive_more::{Display, Error};

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The manifest could not be queried.
    #[display("could not read records from the manifest")]
    Manifest,
    /// The destination tree could not be built (a directory could not be
    /// created).
    #[display("could not build the destination tree")]
    Destination,
}
