//! Device Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A device metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for device metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The property list could not be read or parsed.
    #[display("unreadable property list: {}", _0.display())]
    InvalidPlist(#[error(not(source))] PathBuf),
}
