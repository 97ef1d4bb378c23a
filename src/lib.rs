//! Launcher asset store
//!
//! Sandboxed file storage and one-time bundled-asset migration for the
//! game launcher. The storage manager is the only gateway to the private
//! storage root; the initialization service copies the bundled asset tree
//! into it exactly once.

pub mod assets;
pub mod config;
pub mod error;
pub mod init;
pub mod storage;

pub use init::{InitOutcome, InitializationService};
pub use storage::StorageManager;
