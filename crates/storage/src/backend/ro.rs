//! Readonly storage backend.
//!
//! This module provides a storage backend implementation that wraps other
//! implementations and prevents write operations from executing, but
//! indicating success on return.

use async_trait::async_trait;
use std::path::Path;

use crate::{BackendHandle, StorageBackend, error::Result};

/// Read-only storage backend.
///
/// Wraps another backend and silently drops all write operations, logging an
/// [`info event`](tracing::Event). Used for dry runs.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping directory creation during read-only mode");
        Ok(())
    }

    async fn copy_from(&self, source: &Path, path: &Path) -> Result<u64> {
        tracing::info!(source = %source.display(), path = %path.display(), "Skipping copy during read-only mode");
        Ok(0)
    }

    async fn touch(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping placeholder creation during read-only mode");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_are_dropped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let payload = temp_dir.path().join("payload");
        std::fs::write(&payload, b"data").unwrap();
        let local = LocalBackend::new("local", temp_dir.path().join("out")).unwrap();
        let backend = ReadOnlyBackend::new(Arc::new(local));
        backend.create_dir(Path::new("a/b")).await.unwrap();
        assert_eq!(backend.copy_from(&payload, Path::new("a/b/file")).await.unwrap(), 0);
        backend.touch(Path::new("a/b/empty")).await.unwrap();
        assert!(!temp_dir.path().join("out/a").exists());
        assert_eq!(backend.name(), "local");
    }
}
