//! Informational metadata about the device a backup was taken from.
//!
//! Nothing in here is needed to extract a backup. It powers the `--info`
//! summary: [`DeviceInfo`] is read from the backup's `Info.plist`, and the
//! [catalog](lookup) turns the hardware identifier it contains into the name
//! printed on the box.

mod catalog;
pub mod error;
mod info;

pub use crate::catalog::{UNKNOWN_DEVICE, lookup};
pub use crate::info::{Application, DeviceInfo, INFO_FILENAME};
