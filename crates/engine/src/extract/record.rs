use exn::ResultExt;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;
use unback_manifest::{EntryType, ManifestRecord};
use unback_storage::BackendHandle;

use crate::extract::error::{RecordErrorKind, RecordResult};
use crate::resolve::{Resolved, Resolver};

/// The outcome of (successfully) extracting a single record.
///
/// Every variant carries the destination, relative to the backend root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// A regular file was copied out of the backup.
    Copied { path: PathBuf, bytes: u64 },
    /// A directory was created (or already existed).
    Directory(PathBuf),
    /// A protected item was stood in for by an empty file.
    Placeholder(PathBuf),
}
impl Action {
    pub fn path(&self) -> &Path {
        match self {
            Self::Copied { path, .. } | Self::Directory(path) | Self::Placeholder(path) => path,
        }
    }
}

/// Materializes one manifest record in `backend`.
///
/// The record is checked in full (entry type, paths, payload) before anything
/// is written, so a record that is skipped leaves no trace in the destination.
///
/// # Errors
/// Every error is a [`RecordErrorKind`]. Only
/// [`Directory`](RecordErrorKind::Directory) is fatal to a run, see
/// [`is_fatal`](RecordErrorKind::is_fatal).
#[instrument(level = "trace", skip_all, fields(file_id = %record.file_id))]
pub async fn extract_record(
    backend: &BackendHandle,
    resolver: &Resolver,
    record: &ManifestRecord,
) -> RecordResult<Action> {
    let Some(entry_type) = record.entry_type() else {
        exn::bail!(RecordErrorKind::MalformedEntry(record.flags));
    };
    let Resolved { source, destination } = resolver.resolve(record)?;

    match entry_type {
        EntryType::RegularFile => {
            match fs::metadata(&source).await {
                Ok(metadata) if metadata.is_file() => {},
                Ok(_) => exn::bail!(RecordErrorKind::MissingPayload(source)),
                Err(e) if e.kind() == IoErrorKind::NotFound => exn::bail!(RecordErrorKind::MissingPayload(source)),
                Err(e) => return Err(e).or_raise(|| RecordErrorKind::Copy),
            }
            create_parent(backend, &destination).await?;
            let bytes = backend.copy_from(&source, &destination).await.or_raise(|| RecordErrorKind::Copy)?;
            Ok(Action::Copied { path: destination, bytes })
        },
        EntryType::Directory => {
            backend.create_dir(&destination).await.or_raise(|| RecordErrorKind::Directory(destination.clone()))?;
            Ok(Action::Directory(destination))
        },
        EntryType::ProtectedPlaceholder => {
            create_parent(backend, &destination).await?;
            backend.touch(&destination).await.or_raise(|| RecordErrorKind::Placeholder)?;
            Ok(Action::Placeholder(destination))
        },
    }
}

async fn create_parent(backend: &BackendHandle, destination: &Path) -> RecordResult<()> {
    match destination.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        Some(parent) => {
            backend.create_dir(parent).await.or_raise(|| RecordErrorKind::Directory(parent.to_path_buf()))
        },
        // Only a domain directory itself has no parent below the root.
        None => Ok(()),
    }
}
