mod entry;
mod record;

pub use self::entry::EntryType;
pub use self::record::{Decoded, ManifestRecord, Undecodable};
pub(crate) use self::record::RecordRow;
