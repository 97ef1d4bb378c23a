//! Asset initialization module
//!
//! One-time migration of the bundled asset tree into the sandbox storage.

pub mod service;

pub use service::{INIT_STATE_FILE, InitOutcome, InitializationService};
