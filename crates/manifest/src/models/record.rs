use derive_more::Display;

use crate::models::EntryType;

/// Raw row of the `files` table, exactly as the driver decodes it.
///
/// Text columns are read as bytes: the store does not enforce UTF-8, and one
/// bad row must not fail the whole query.
#[derive(sqlx::FromRow)]
pub(crate) struct RecordRow {
    #[sqlx(rename = "fileID")]
    file_id: Option<Vec<u8>>,
    domain: Option<Vec<u8>>,
    #[sqlx(rename = "relativePath")]
    relative_path: Option<Vec<u8>>,
    flags: i64,
    file: Option<Vec<u8>>,
}
impl TryFrom<RecordRow> for ManifestRecord {
    type Error = Undecodable;
    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let file_id = row.file_id.unwrap_or_default();
        let text = |bytes: Option<Vec<u8>>, column: &'static str| {
            String::from_utf8(bytes.unwrap_or_default())
                .map_err(|_| Undecodable { file_id: String::from_utf8_lossy(&file_id).into_owned(), column })
        };
        Ok(Self {
            domain_group: text(row.domain, "domain")?,
            relative_path: text(row.relative_path, "relativePath")?,
            file_id: text(Some(file_id.clone()), "fileID")?,
            flags: row.flags,
            metadata: row.file.unwrap_or_default(),
        })
    }
}

/// A row of the manifest that could not be turned into a [`ManifestRecord`]
/// because one of its text columns is not valid UTF-8.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display("column {column} of record {file_id:?} is not valid UTF-8")]
pub struct Undecodable {
    /// Best-effort file ID, invalid sequences replaced.
    pub file_id: String,
    pub column: &'static str,
}

/// One row of a query result: either a record, or the reason it could not be
/// decoded. Only the row is affected, the rest of the result stands.
pub type Decoded = Result<ManifestRecord, Undecodable>;

/// A single backed-up item, as described by the manifest.
///
/// Records are read-only snapshots; nothing writes them back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Content hash (lowercase hex). Also the payload's file name on disk.
    pub file_id: String,
    /// Backup namespace, optionally compound: `"<domain>-<group>"`.
    pub domain_group: String,
    /// Forward-slash separated path, relative to the domain.
    pub relative_path: String,
    /// Raw entry type flag; see [`entry_type`](Self::entry_type).
    pub flags: i64,
    /// Serialized attribute set (a binary property list). Opaque.
    pub metadata: Vec<u8>,
}

impl ManifestRecord {
    /// Interpret the raw flags.
    ///
    /// Returns `None` for a malformed record, the raw value is still available
    /// in [`flags`](Self::flags) for reporting.
    pub fn entry_type(&self) -> Option<EntryType> {
        EntryType::try_from(self.flags).ok()
    }
}
