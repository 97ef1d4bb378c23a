//! Asset source trait
//!
//! Models the bundled read-only asset tree behind a trait so that entries
//! carry an explicit kind. Callers branch on the kind instead of probing
//! with failed opens.

use std::io::{self, Read};

/// Kind of one entry in the bundled asset tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetEntryKind {
    File,
    Directory,
}

/// One entry of a directory listing in the bundled asset tree
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub name: String,
    pub kind: AssetEntryKind,
}

/// Read-only hierarchical asset source
///
/// Entries are either listable (directories) or openable as a byte stream
/// (files). The reported length is the only metadata assumed reliable.
pub trait AssetSource: Send {
    /// Entry kind at `path`, or `None` when nothing exists there
    fn kind(&self, path: &str) -> Option<AssetEntryKind>;

    /// Reported length in bytes of the file at `path`
    fn len(&self, path: &str) -> io::Result<u64>;

    /// List the entries directly under `path`; the empty string lists the root
    fn list(&self, path: &str) -> io::Result<Vec<AssetEntry>>;

    /// Open the file at `path` as a byte stream
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
}
