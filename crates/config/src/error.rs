//! Config Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// An explicitly requested config file does not exist.
    #[display("config file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// A layer could not be read or did not match the expected shape.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
    /// No backup source directory was given by any layer.
    #[display("no backup source directory configured")]
    MissingSource,
}
