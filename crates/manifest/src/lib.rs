//! Read-only access to the manifest database of an iOS backup.
//!
//! Every backed-up item is described by a single row of the `files` table in
//! `Manifest.db`. The payloads themselves live next to the manifest, named by
//! their content hash; this crate only deals with the manifest side.
//!
//! # Architecture
//! - [`Database`]: the store handle. Opened read-only; the manifest is never
//!   mutated.
//! - [`Query`]: parameterized query builder. Values are never spliced into SQL
//!   text, they are passed to the driver as positional parameters.
//! - [`Repository`]: the canned queries the rest of the workspace needs.

mod db;
pub mod error;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
mod models;
mod query;
mod repo;

pub use crate::db::Database;
pub use crate::models::{Decoded, EntryType, ManifestRecord, Undecodable};
pub use crate::query::{FetchMode, Param, Query};
pub use crate::repo::Repository;

/// File name of the manifest database inside a backup directory.
pub const MANIFEST_FILENAME: &str = "Manifest.db";
