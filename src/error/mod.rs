//! Error handling module
//!
//! Centralized error types for the asset store.

pub mod types;

pub use types::{InitError, StorageError, StoreError};
