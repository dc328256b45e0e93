//! Path validation and security utilities.
//!
//! Paths handed to a backend come straight out of a backup manifest, which is
//! just a file on disk. Nothing stops it from containing `..` components, so
//! every path is validated before it is joined onto a backend root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path for security and correctness.
/// Ensures that paths don't escape the storage root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use unback_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("HomeDomain/Library/Preferences").is_ok());
/// assert!(validate_path("a/../Documents/note.txt").is_ok()); // (never leaves root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves root)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/../still-wrong/.././Documents//./note.txt/").unwrap(),
///     Path::new("Documents/note.txt")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    // Use Rust's built-in path component parser for robust handling. Means we
    // don't have to deal with non-UTF8, or the maniacs on Unix that use
    // backslashes in their filenames.
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls, reject them explicitly.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Validates a single path segment (a directory or file name).
///
/// Rejects empty segments, `.` and `..`, and anything containing a path
/// separator or a null byte.
///
/// ```
/// use unback_storage::validate_segment;
/// assert!(validate_segment("AppDomain").is_ok());
/// assert!(validate_segment("com.example.app").is_ok());
/// assert!(validate_segment("..").is_err());
/// assert!(validate_segment("a/b").is_err());
/// ```
pub fn validate_segment(segment: &str) -> Result<&str> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    match invalid {
        true => exn::bail!(ErrorKind::InvalidPath(PathBuf::from(segment))),
        false => Ok(segment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(
            validate(Path::new("HomeDomain/Library/Preferences/com.apple.x.plist")).unwrap(),
            Path::new("HomeDomain/Library/Preferences/com.apple.x.plist")
        );
        assert_eq!(validate(Path::new("Documents/note.txt")).unwrap(), Path::new("Documents/note.txt"));
        assert_eq!(validate(Path::new("note.txt")).unwrap(), Path::new("note.txt"));
    }

    #[test]
    fn test_path_normalization() {
        // Double slashes are normalized
        assert_eq!(validate(Path::new("a//b//c")).unwrap(), Path::new("a/b/c"));
        // Current directory references removed
        assert_eq!(validate(Path::new("a/./b/./c")).unwrap(), Path::new("a/b/c"));
        // Absolute paths are re-rooted
        assert_eq!(validate(Path::new("/var/mobile/Media")).unwrap(), Path::new("var/mobile/Media"));
    }

    #[test]
    fn test_traversal_attempts() {
        // Basic parent directory reference
        assert!(validate(Path::new("../etc/passwd")).is_err());
        // Traversal in the middle
        assert!(validate(Path::new("a/../../b")).is_err());
        // Only parent references
        assert!(validate(Path::new("..")).is_err());
        assert!(validate(Path::new("../..")).is_err());
    }

    #[test]
    fn test_reverse_attempts() {
        // Traversal remains within root
        assert_eq!(validate(Path::new("a/b/..")).unwrap(), Path::new("a"));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(validate(Path::new("a\0b")).is_err());
        assert!(validate(Path::new("\0")).is_err());
    }

    #[test]
    fn test_empty_paths() {
        assert!(validate(Path::new("")).is_err());
        // Only dots and slashes (normalizes to empty)
        assert!(validate(Path::new(".")).is_err());
        assert!(validate(Path::new("./")).is_err());
        assert!(validate(Path::new("//")).is_err());
    }

    #[test]
    fn test_trailing_slashes() {
        assert_eq!(validate(Path::new("Library/")).unwrap(), Path::new("Library"));
        assert_eq!(validate(Path::new("Library///")).unwrap(), Path::new("Library"));
    }

    #[test]
    fn test_segments() {
        assert_eq!(validate_segment("HomeDomain").unwrap(), "HomeDomain");
        // Hyphens are fine inside a segment, groups are full of them.
        assert_eq!(validate_segment("group.com.example.shared-data").unwrap(), "group.com.example.shared-data");
        assert!(validate_segment("").is_err());
        assert!(validate_segment(".").is_err());
        assert!(validate_segment("..").is_err());
        assert!(validate_segment("a/b").is_err());
        assert!(validate_segment("a\\b").is_err());
        assert!(validate_segment("a\0b").is_err());
    }
}
