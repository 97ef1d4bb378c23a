//! Directory-backed asset source
//!
//! Serves the bundled asset tree from a plain directory shipped beside the
//! launcher binary.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::assets::source::{AssetEntry, AssetEntryKind, AssetSource};

/// Bundled asset tree rooted at a directory on disk
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

fn kind_of(path: &Path) -> Option<AssetEntryKind> {
    let metadata = fs::metadata(path).ok()?;
    if metadata.is_dir() {
        Some(AssetEntryKind::Directory)
    } else {
        Some(AssetEntryKind::File)
    }
}

impl AssetSource for DirAssetSource {
    fn kind(&self, path: &str) -> Option<AssetEntryKind> {
        kind_of(&self.resolve(path))
    }

    fn len(&self, path: &str) -> io::Result<u64> {
        Ok(fs::metadata(self.resolve(path))?.len())
    }

    fn list(&self, path: &str) -> io::Result<Vec<AssetEntry>> {
        let mut entries = vec![];

        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                AssetEntryKind::Directory
            } else {
                AssetEntryKind::File
            };

            entries.push(AssetEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                kind,
            });
        }

        // Directory iteration order is platform-dependent; keep it stable
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(self.resolve(path))?;
        Ok(Box::new(file))
    }
}
