//! Manifest-driven extraction.
//!
//! A backup stores every file flat, named by its content hash, and describes
//! where each one belongs in `Manifest.db`. The [`Resolver`] maps a manifest
//! record to its payload and its place in the rebuilt tree; [`extract`] walks
//! the manifest and materializes every record through a storage backend.

pub mod error;
pub mod extract;
mod resolve;

pub use crate::extract::{Action, ExtractEvent, Summary, extract, extract_record};
pub use crate::resolve::{DomainGroup, Resolved, Resolver};
