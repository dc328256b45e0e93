//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface for materializing an extracted tree, regardless of whether the
//! writes actually land on disk.

mod local;
mod ro;

pub use self::local::LocalBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for destination backends.
///
/// # Path Handling
/// Destination paths are relative to the backend root and must be validated
/// using [`validate_path`](crate::validate_path) before use. Implementations
/// should enforce this validation. Source paths (payloads inside the backup)
/// are absolute and are only ever read.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use unback_storage::{backend::StorageBackend, error::Result};
///
/// async fn restore_note(backend: &dyn StorageBackend, payload: &Path) -> Result<u64> {
///     let path = Path::new("AppDomain/com.example.app/Documents/note.txt");
///     backend.create_dir(path.parent().unwrap()).await?;
///     backend.copy_from(payload, path).await
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend (used for logging only).
    fn name(&self) -> &str;

    /// Create a directory and all of its missing parents.
    ///
    /// Succeeds if the directory already exists. Returns
    /// [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if a
    /// non-directory is in the way.
    async fn create_dir(&self, path: &Path) -> Result<()>;

    /// Copy an absolute `source` file (outside the backend) to `path`,
    /// returning the number of bytes copied.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    /// - An existing file at `path` is replaced, even a read-only one.
    /// - Permissions and the modification time of `source` are preserved
    ///   where the backend supports them.
    async fn copy_from(&self, source: &Path, path: &Path) -> Result<u64>;

    /// Create an empty file at `path`, truncating any existing file.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    async fn touch(&self, path: &Path) -> Result<()>;
}
