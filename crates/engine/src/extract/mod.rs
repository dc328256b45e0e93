//! Materialization of manifest records.
//!
//! Each record is dispatched on its entry type: regular files are copied out
//! of the backup, directories are created, and protected placeholders become
//! empty files. The primary entry point is [`extract`], which walks the
//! manifest and streams an [`ExtractEvent`] per record.

pub mod error;
mod record;
mod stream;

pub use self::record::{Action, extract_record};
pub use self::stream::{ExtractEvent, Summary, extract};
