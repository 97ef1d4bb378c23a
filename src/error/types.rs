//! Error types
//!
//! Defines domain-specific error types for each module of the asset store.

use std::fmt;
use std::io;

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    InvalidPath(String),
    FileNotFound(String),
    NotAFile(String),
    EmptySource(String),
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },
    DirectoryCreate(String),
    RootUnavailable(String),
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::NotAFile(p) => write!(f, "Not a regular file: {}", p),
            StorageError::EmptySource(p) => write!(f, "File has no readable bytes: {}", p),
            StorageError::SizeMismatch {
                path,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Read size mismatch for {}: expected {}, got {}",
                    path, expected, actual
                )
            }
            StorageError::DirectoryCreate(p) => write!(f, "Failed to create directory: {}", p),
            StorageError::RootUnavailable(p) => write!(f, "Cannot resolve storage root: {}", p),
            StorageError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Io(error)
    }
}

/// Initialization module errors
#[derive(Debug)]
pub enum InitError {
    /// Every bundled entry failed to copy; the flag stays unset so the
    /// next call retries the whole tree
    NoProgress { failed: usize },
    State(serde_json::Error),
    Storage(StorageError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::NoProgress { failed } => {
                write!(f, "No assets copied, {} entries failed", failed)
            }
            InitError::State(e) => write!(f, "Initialization state error: {}", e),
            InitError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for InitError {}

impl From<StorageError> for InitError {
    fn from(error: StorageError) -> Self {
        InitError::Storage(error)
    }
}

impl From<serde_json::Error> for InitError {
    fn from(error: serde_json::Error) -> Self {
        InitError::State(error)
    }
}

/// General asset store error that encompasses all error types
#[derive(Debug)]
pub enum StoreError {
    Config(config::ConfigError),
    Storage(StorageError),
    Init(InitError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Config(e) => write!(f, "Configuration error: {}", e),
            StoreError::Storage(e) => write!(f, "Storage error: {}", e),
            StoreError::Init(e) => write!(f, "Initialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<config::ConfigError> for StoreError {
    fn from(error: config::ConfigError) -> Self {
        StoreError::Config(error)
    }
}

impl From<StorageError> for StoreError {
    fn from(error: StorageError) -> Self {
        StoreError::Storage(error)
    }
}

impl From<InitError> for StoreError {
    fn from(error: InitError) -> Self {
        StoreError::Init(error)
    }
}
