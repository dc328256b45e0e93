//! Local filesystem storage backend.
//!
//! This module provides a storage backend implementation for the local filesystem.
//! Files are written below a configured directory using `tokio::fs` for async I/O.

use crate::error::ErrorKind;
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage backend.
///
/// Writes into a directory on the local filesystem. All paths are relative
/// to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use unback_storage::backend::LocalBackend;
///
/// # fn example() -> unback_storage::error::Result<()> {
/// let backend = LocalBackend::new("local", "/path/to/_unback_")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    /// Root directory of the extracted tree
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// The root directory (and any missing parents) is created if it doesn't
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, is not a directory, or
    /// cannot be created.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }

        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::AlreadyExists(root));
            }
        } else {
            tracing::debug!(root = %root.display(), "Creating destination directory");
            // Use non-async here; it'll only happen once on initialization
            // and it's not worth the hassle of making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }

        Ok(Self { name: name.into(), root })
    }

    /// Root directory of the backend.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the absolute path for a relative storage path.
    ///
    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists | std::io::ErrorKind::NotADirectory => {
                ErrorKind::AlreadyExists(path.to_path_buf())
            },
            _ => ErrorKind::Io(e),
        }
    }

    async fn create_parent(&self, abs_path: &Path, path: &Path) -> Result<()> {
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        // create_dir_all is happy when the directory is already there, but
        // also when a *file* is: make that case an error.
        match fs::metadata(&abs_path).await {
            Ok(metadata) if metadata.is_dir() => return Ok(()),
            Ok(_) => exn::bail!(ErrorKind::AlreadyExists(path.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => exn::bail!(Self::map_io_error(e, path)),
        }
        Ok(fs::create_dir_all(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn copy_from(&self, source: &Path, path: &Path) -> Result<u64> {
        let abs_path = self.absolute_path(path)?;
        let metadata = fs::metadata(source).await.map_err(|e| Self::map_io_error(e, source))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotFound(source.to_path_buf()));
        }
        self.create_parent(&abs_path, path).await?;
        // A previous copy may have left a read-only file behind, which cannot
        // be opened for writing. Unlinking only needs write access to the
        // parent directory.
        match fs::symlink_metadata(&abs_path).await {
            Ok(existing) if existing.is_dir() => exn::bail!(ErrorKind::AlreadyExists(path.to_path_buf())),
            Ok(_) => fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => exn::bail!(Self::map_io_error(e, path)),
        }
        // tokio::fs::copy carries the permission bits over, the timestamp has
        // to be set by hand.
        let bytes = fs::copy(source, &abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        // futimens() only needs ownership, not write access: a read-only
        // handle is enough even if the permissions copied above are 0444.
        let file = fs::File::open(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        file.into_std().await.set_modified(modified).map_err(ErrorKind::Io)?;
        Ok(bytes)
    }

    async fn touch(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        self.create_parent(&abs_path, path).await?;
        fs::File::create(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        Ok(())
    }
}
