//! Sandbox storage management
//!
//! Handles file operations over the private storage root and path validation.

pub mod manager;
pub mod validation;

pub use manager::StorageManager;
pub use validation::{RESERVED_PREFIXES, is_safe_path};
