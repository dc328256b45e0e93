//! Mapping of manifest records to payload and destination paths.

use exn::ResultExt;
use std::path::{Path, PathBuf};
use unback_manifest::ManifestRecord;
use unback_storage::{validate_path, validate_segment};

use crate::extract::error::{RecordErrorKind, RecordResult};

/// A compound `"<domain>-<group>"` namespace, split on the first hyphen.
///
/// Groups (usually bundle identifiers) may contain further hyphens, domains
/// never do. A missing group is the empty string.
///
/// ```
/// use unback_engine::DomainGroup;
/// let parsed = DomainGroup::parse("AppDomainGroup-group.com.example.shared-data");
/// assert_eq!(parsed.domain, "AppDomainGroup");
/// assert_eq!(parsed.group, "group.com.example.shared-data");
/// assert_eq!(DomainGroup::parse("HomeDomain").group, "");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomainGroup<'a> {
    pub domain: &'a str,
    pub group: &'a str,
}
impl<'a> DomainGroup<'a> {
    pub fn parse(domain_group: &'a str) -> Self {
        match domain_group.split_once('-') {
            Some((domain, group)) => Self { domain, group },
            None => Self { domain: domain_group, group: "" },
        }
    }
}

/// Where a record's payload lives, and where it goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// Absolute path of the payload inside the backup.
    pub source: PathBuf,
    /// Path relative to the destination root.
    pub destination: PathBuf,
}

/// Resolves records against a backup directory.
///
/// Resolution is pure: nothing is read from or written to disk, so the payload
/// may or may not exist.
#[derive(Clone, Debug)]
pub struct Resolver {
    source_root: PathBuf,
}
impl Resolver {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self { source_root: source_root.into() }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn resolve(&self, record: &ManifestRecord) -> RecordResult<Resolved> {
        Ok(Resolved {
            source: self.source(&record.file_id)?,
            destination: destination(&record.domain_group, &record.relative_path)?,
        })
    }

    /// Payloads are sharded into directories named by the first two
    /// characters of their file ID: `<source root>/ab/ab12...`.
    pub fn source(&self, file_id: &str) -> RecordResult<PathBuf> {
        if file_id.len() < 2 || !file_id.bytes().all(|b| b.is_ascii_hexdigit()) {
            exn::bail!(RecordErrorKind::InvalidFileId(file_id.to_string()));
        }
        Ok(self.source_root.join(&file_id[..2]).join(file_id))
    }
}

/// `<domain>[/<group>]/<relative path>`, relative to the destination root.
///
/// Domain and group must each be a single path segment, and the relative path
/// may not climb out of the domain directory. An empty relative path is the
/// domain directory itself.
pub(crate) fn destination(domain_group: &str, relative_path: &str) -> RecordResult<PathBuf> {
    let DomainGroup { domain, group } = DomainGroup::parse(domain_group);
    let mut destination = PathBuf::from(validate_segment(domain).or_raise(|| RecordErrorKind::InvalidPath)?);
    if !group.is_empty() {
        destination.push(validate_segment(group).or_raise(|| RecordErrorKind::InvalidPath)?);
    }
    if !relative_path.is_empty() {
        destination.push(validate_path(relative_path).or_raise(|| RecordErrorKind::InvalidPath)?);
    }
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(file_id: &str, domain_group: &str, relative_path: &str) -> ManifestRecord {
        ManifestRecord {
            file_id: file_id.to_string(),
            domain_group: domain_group.to_string(),
            relative_path: relative_path.to_string(),
            flags: 1,
            metadata: vec![],
        }
    }

    #[rstest]
    #[case("A-B", "A", "B")]
    #[case("A", "A", "")]
    #[case("A-", "A", "")]
    #[case("AppDomain-com.example.app-extension", "AppDomain", "com.example.app-extension")]
    #[case("-B", "", "B")]
    fn test_domain_group(#[case] input: &str, #[case] domain: &str, #[case] group: &str) {
        assert_eq!(DomainGroup::parse(input), DomainGroup { domain, group });
    }

    #[test]
    fn test_source_is_sharded() {
        let resolver = Resolver::new("/backups/00008030");
        let file_id = "ab12cd34ef56ab12cd34ef56ab12cd34ef56ab12";
        let source = resolver.source(file_id).unwrap();
        assert_eq!(source, Path::new("/backups/00008030/ab").join(file_id));
        assert_eq!(source.parent().and_then(Path::file_name).unwrap(), "ab");
        assert_eq!(source.file_name().unwrap(), file_id);
    }

    #[rstest]
    #[case("")]
    #[case("a")]
    #[case("zz12")]
    #[case("../ab12")]
    #[case("ab/12")]
    fn test_invalid_file_id(#[case] file_id: &str) {
        let err = Resolver::new("/backups").source(file_id).unwrap_err();
        assert!(matches!(&*err, RecordErrorKind::InvalidFileId(_)));
        assert!(!err.is_fatal());
    }

    #[rstest]
    #[case("AppDomain-com.example.app", "Documents/note.txt", "AppDomain/com.example.app/Documents/note.txt")]
    #[case("HomeDomain", "Library/Preferences/x.plist", "HomeDomain/Library/Preferences/x.plist")]
    #[case("HomeDomain-", "Library", "HomeDomain/Library")]
    #[case("HomeDomain", "", "HomeDomain")]
    #[case("AppDomain-com.example.app", "", "AppDomain/com.example.app")]
    #[case("MediaDomain", "Media//DCIM/./100APPLE/", "MediaDomain/Media/DCIM/100APPLE")]
    fn test_destination(#[case] domain_group: &str, #[case] relative_path: &str, #[case] expected: &str) {
        assert_eq!(destination(domain_group, relative_path).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("", "Library")]
    #[case("-com.example.app", "Library")]
    #[case("..", "Library")]
    #[case("AppDomain-..", "Library")]
    #[case("AppDomain-a/b", "Library")]
    #[case("HomeDomain", "../../etc/passwd")]
    #[case("HomeDomain", "Library/../../x")]
    #[case("HomeDomain", ".")]
    fn test_destination_cannot_escape(#[case] domain_group: &str, #[case] relative_path: &str) {
        let err = destination(domain_group, relative_path).unwrap_err();
        assert!(matches!(&*err, RecordErrorKind::InvalidPath));
    }

    #[test]
    fn test_resolve() {
        let resolver = Resolver::new("/backups/abc");
        let resolved = resolver.resolve(&record("ab12", "AppDomain-com.example.app", "Documents/note.txt")).unwrap();
        assert_eq!(resolved.source, Path::new("/backups/abc/ab/ab12"));
        assert_eq!(resolved.destination, Path::new("AppDomain/com.example.app/Documents/note.txt"));
        // Deterministic.
        assert_eq!(resolver.resolve(&record("ab12", "AppDomain-com.example.app", "Documents/note.txt")).unwrap(), resolved);
    }
}
