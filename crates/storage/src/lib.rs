//! Destination storage for extracted backup trees.
//!
//! The extraction engine never touches the destination filesystem directly;
//! it goes through a [`StorageBackend`] so that the same run can be pointed at
//! a real directory ([`LocalBackend`](backend::LocalBackend)) or have its
//! writes discarded ([`ReadOnlyBackend`](backend::ReadOnlyBackend)).

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::path::{validate as validate_path, validate_segment};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
