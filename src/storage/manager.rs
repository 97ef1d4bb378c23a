//! Storage manager
//!
//! Sole gateway between application logic and the sandboxed filesystem
//! area. Sandbox-relative paths go through the validation policy before any
//! I/O; bundled-asset reads go through the attached [`AssetSource`]. Every
//! operation serializes through one per-instance lock.

use log::error;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::assets::{AssetCache, AssetEntry, AssetEntryKind, AssetPathResolver, AssetSource};
use crate::error::StorageError;
use crate::storage::validation::is_safe_path;

pub struct StorageManager {
    inner: Mutex<ManagerInner>,
}

struct ManagerInner {
    /// Absolute storage root, always with a trailing separator
    base_path: String,
    assets: Box<dyn AssetSource>,
    resolver: AssetPathResolver,
    cache: AssetCache,
}

impl ManagerInner {
    fn resolve(&self, path: &str) -> PathBuf {
        // Leading separators would otherwise replace the root on join
        let trimmed = path.trim_start_matches(['/', '\\']);
        Path::new(&self.base_path).join(trimmed)
    }
}

impl StorageManager {
    /// Resolve the storage root and attach the bundled-asset source.
    ///
    /// The root is created if missing and canonicalized once; an
    /// unresolvable root is an unrecoverable configuration failure for the
    /// caller.
    pub fn new(storage_root: &Path, assets: Box<dyn AssetSource>) -> Result<Self, StorageError> {
        fs::create_dir_all(storage_root)
            .and_then(|_| storage_root.canonicalize())
            .map_err(|e| {
                error!(
                    "Cannot resolve storage root {}: {}",
                    storage_root.display(),
                    e
                );
                StorageError::RootUnavailable(storage_root.display().to_string())
            })
            .map(|canonical| {
                let mut base_path = canonical.to_string_lossy().into_owned();
                if !base_path.ends_with(MAIN_SEPARATOR) {
                    base_path.push(MAIN_SEPARATOR);
                }
                Self {
                    inner: Mutex::new(ManagerInner {
                        base_path,
                        assets,
                        resolver: AssetPathResolver::with_known_mappings(),
                        cache: AssetCache::new(),
                    }),
                }
            })
    }

    fn lock(&self) -> MutexGuard<'_, ManagerInner> {
        // A poisoned lock only means another operation panicked mid-flight;
        // the base path itself is immutable, so continue with the guard
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The resolved storage root, always with a trailing separator
    pub fn base_path(&self) -> String {
        self.lock().base_path.clone()
    }

    /// True iff `path` is valid and a regular file exists under the root
    pub fn file_exists(&self, path: &str) -> bool {
        let inner = self.lock();

        if !is_safe_path(path) {
            error!("file_exists: invalid path: {}", path);
            return false;
        }

        inner.resolve(path).is_file()
    }

    /// Read the full byte contents of the file at `path` under the root.
    ///
    /// A byte count differing from the reported file size is treated as
    /// corruption; no partial buffer is returned.
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let inner = self.lock();

        if !is_safe_path(path) {
            error!("read_file: invalid path: {}", path);
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        let full_path = inner.resolve(path);
        let metadata = match fs::metadata(&full_path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("read_file: file does not exist: {}", path);
                return Err(StorageError::FileNotFound(path.to_string()));
            }
            Err(e) => {
                error!("read_file: cannot stat {}: {}", path, e);
                return Err(StorageError::Io(e));
            }
        };

        if !metadata.is_file() {
            error!("read_file: not a regular file: {}", path);
            return Err(StorageError::NotAFile(path.to_string()));
        }

        read_exact_sized(File::open(&full_path)?, metadata.len(), path)
    }

    /// Overwrite the file at `path` under the root with `data`.
    ///
    /// Missing parent directories are created. On a write failure the
    /// partially written file is left as-is; there is no rollback.
    pub fn write_file(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let inner = self.lock();

        if !is_safe_path(path) {
            error!("write_file: invalid path: {}", path);
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        let full_path = inner.resolve(path);

        if let Some(parent) = full_path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                error!(
                    "write_file: failed to create parent directories: {}",
                    parent.display()
                );
                return Err(StorageError::DirectoryCreate(parent.display().to_string()));
            }
        }

        let mut file = File::create(&full_path).inspect_err(|e| {
            error!("write_file: cannot create {}: {}", path, e);
        })?;
        file.write_all(data).inspect_err(|e| {
            error!("write_file: write failed for {}: {}", path, e);
        })?;
        file.flush().inspect_err(|e| {
            error!("write_file: flush failed for {}: {}", path, e);
        })?;

        Ok(())
    }

    /// Delete the regular file at `path` under the root
    pub fn remove_file(&self, path: &str) -> Result<(), StorageError> {
        let inner = self.lock();

        if !is_safe_path(path) {
            error!("remove_file: invalid path: {}", path);
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        let full_path = inner.resolve(path);
        let metadata = match fs::metadata(&full_path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("remove_file: file does not exist: {}", path);
                return Err(StorageError::FileNotFound(path.to_string()));
            }
            Err(e) => {
                error!("remove_file: cannot stat {}: {}", path, e);
                return Err(StorageError::Io(e));
            }
        };

        if !metadata.is_file() {
            error!("remove_file: not a regular file: {}", path);
            return Err(StorageError::NotAFile(path.to_string()));
        }

        fs::remove_file(&full_path).inspect_err(|e| {
            error!("remove_file: delete failed for {}: {}", path, e);
        })?;

        Ok(())
    }

    /// Read the full byte contents of a bundled asset.
    ///
    /// The logical path is resolved through the registered mappings first,
    /// and contents other callers still hold are served from the cache.
    /// Asset paths are package-controlled, so the only validity requirement
    /// is being non-empty.
    pub fn read_asset(&self, asset_path: &str) -> Result<Arc<Vec<u8>>, StorageError> {
        let inner = self.lock();

        if asset_path.is_empty() {
            error!("read_asset: asset path is empty");
            return Err(StorageError::InvalidPath(asset_path.to_string()));
        }

        let resolved = inner.resolver.resolve(asset_path).to_string();

        if let Some(cached) = inner.cache.get(&resolved) {
            return Ok(cached);
        }

        match inner.assets.kind(&resolved) {
            Some(AssetEntryKind::File) => {}
            Some(AssetEntryKind::Directory) => {
                error!("read_asset: not a regular file: {}", resolved);
                return Err(StorageError::NotAFile(resolved));
            }
            None => {
                error!("read_asset: asset does not exist: {}", resolved);
                return Err(StorageError::FileNotFound(resolved));
            }
        }

        let expected = inner.assets.len(&resolved)?;
        let reader = inner.assets.open(&resolved).inspect_err(|e| {
            error!("read_asset: cannot open {}: {}", resolved, e);
        })?;

        let data = Arc::new(read_exact_sized(reader, expected, &resolved)?);
        inner.cache.put(&resolved, &data);

        Ok(data)
    }

    /// True iff a bundled asset file exists at `asset_path` (after mapping
    /// resolution)
    pub fn asset_exists(&self, asset_path: &str) -> bool {
        if asset_path.is_empty() {
            return false;
        }

        let inner = self.lock();
        let resolved = inner.resolver.resolve(asset_path);
        inner.assets.kind(resolved) == Some(AssetEntryKind::File)
    }

    /// Entry kind of a bundled asset, or `None` when nothing exists there
    pub fn asset_kind(&self, asset_path: &str) -> Option<AssetEntryKind> {
        let inner = self.lock();
        let resolved = inner.resolver.resolve(asset_path);
        inner.assets.kind(resolved)
    }

    /// List the bundled asset entries directly under `asset_path`
    pub fn list_assets(&self, asset_path: &str) -> Result<Vec<AssetEntry>, StorageError> {
        Ok(self.lock().assets.list(asset_path)?)
    }

    /// Open a bundled asset as a byte stream for chunked copying.
    ///
    /// Streams bypass the cache; only whole-buffer reads are cached.
    pub fn open_asset(&self, asset_path: &str) -> Result<Box<dyn Read + Send>, StorageError> {
        let inner = self.lock();
        let resolved = inner.resolver.resolve(asset_path);
        Ok(inner.assets.open(resolved)?)
    }

    /// The bundled-tree path a logical path resolves to
    pub fn resolve_asset_path(&self, logical: &str) -> String {
        self.lock().resolver.resolve(logical).to_string()
    }

    /// Register a logical-to-asset path mapping for later lookups
    pub fn register_asset_mapping(&self, logical: &str, asset_path: &str) -> bool {
        self.lock().resolver.register(logical, asset_path)
    }

    /// Drop every cached asset
    pub fn clear_asset_cache(&self) {
        self.lock().cache.clear();
    }

    /// Number of assets currently held live in the cache
    pub fn asset_cache_size(&self) -> usize {
        self.lock().cache.len()
    }
}

/// Drain `reader` fully and require exactly `expected` bytes.
///
/// Zero reported bytes and short or long reads are failures, not partial
/// successes.
fn read_exact_sized(
    mut reader: impl Read,
    expected: u64,
    path: &str,
) -> Result<Vec<u8>, StorageError> {
    if expected == 0 {
        error!("File size is invalid: {}", path);
        return Err(StorageError::EmptySource(path.to_string()));
    }

    let mut data = Vec::with_capacity(expected as usize);
    reader.read_to_end(&mut data).inspect_err(|e| {
        error!("Read failed for {}: {}", path, e);
    })?;

    if data.len() as u64 != expected {
        error!(
            "Read size mismatch for {}: expected {}, got {}",
            path,
            expected,
            data.len()
        );
        return Err(StorageError::SizeMismatch {
            path: path.to_string(),
            expected,
            actual: data.len() as u64,
        });
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirAssetSource;
    use std::io;

    struct NoAssets;

    impl AssetSource for NoAssets {
        fn kind(&self, _path: &str) -> Option<AssetEntryKind> {
            None
        }

        fn len(&self, _path: &str) -> io::Result<u64> {
            Err(io::Error::from(ErrorKind::NotFound))
        }

        fn list(&self, _path: &str) -> io::Result<Vec<AssetEntry>> {
            Err(io::Error::from(ErrorKind::NotFound))
        }

        fn open(&self, _path: &str) -> io::Result<Box<dyn Read + Send>> {
            Err(io::Error::from(ErrorKind::NotFound))
        }
    }

    fn manager(dir: &tempfile::TempDir) -> StorageManager {
        StorageManager::new(&dir.path().join("files"), Box::new(NoAssets)).unwrap()
    }

    #[test]
    fn test_base_path_has_trailing_separator() {
        let dir = tempfile::tempdir().unwrap();
        let storage = manager(&dir);

        assert!(storage.base_path().ends_with(MAIN_SEPARATOR));
    }

    #[test]
    fn test_unresolvable_root_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the root directory should be
        fs::write(dir.path().join("blocked"), b"x").unwrap();

        let result = StorageManager::new(&dir.path().join("blocked/files"), Box::new(NoAssets));
        assert!(matches!(result, Err(StorageError::RootUnavailable(_))));
    }

    #[test]
    fn test_rejects_invalid_paths_without_touching_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let storage = manager(&dir);

        for path in [
            "../outside",
            "nested/../../outside",
            "..\\outside",
            "/data/app/x",
            "/sdcard/x",
            "/storage/emulated/0/x",
            "",
        ] {
            assert!(!storage.file_exists(path), "file_exists accepted {path:?}");
            assert!(
                matches!(storage.read_file(path), Err(StorageError::InvalidPath(_))),
                "read_file accepted {path:?}"
            );
            assert!(
                matches!(
                    storage.write_file(path, b"data"),
                    Err(StorageError::InvalidPath(_))
                ),
                "write_file accepted {path:?}"
            );
        }

        // Nothing may have been created under the root
        let entries: Vec<_> = fs::read_dir(dir.path().join("files")).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = manager(&dir);

        let data = b"launcher save state".to_vec();
        storage.write_file("saves/slot1.dat", &data).unwrap();

        assert!(storage.file_exists("saves/slot1.dat"));
        assert_eq!(storage.read_file("saves/slot1.dat").unwrap(), data);
    }

    #[test]
    fn test_write_overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let storage = manager(&dir);

        storage.write_file("config.ini", b"first contents").unwrap();
        storage.write_file("config.ini", b"second").unwrap();

        assert_eq!(storage.read_file("config.ini").unwrap(), b"second");
    }

    #[test]
    fn test_zero_length_write_succeeds_but_reads_as_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let storage = manager(&dir);

        storage.write_file("empty.bin", b"").unwrap();

        assert!(storage.file_exists("empty.bin"));
        assert!(matches!(
            storage.read_file("empty.bin"),
            Err(StorageError::EmptySource(_))
        ));
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = manager(&dir);

        assert!(matches!(
            storage.read_file("nowhere.bin"),
            Err(StorageError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_read_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = manager(&dir);

        storage.write_file("saves/slot1.dat", b"x").unwrap();

        assert!(!storage.file_exists("saves"));
        assert!(matches!(
            storage.read_file("saves"),
            Err(StorageError::NotAFile(_))
        ));
    }

    #[test]
    fn test_asset_reads_go_through_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        fs::create_dir(assets.path().join("data")).unwrap();
        fs::write(assets.path().join("data/weapons.cfg"), b"cfg").unwrap();

        let storage = StorageManager::new(
            &dir.path().join("files"),
            Box::new(DirAssetSource::new(assets.path())),
        )
        .unwrap();

        assert!(storage.asset_exists("data/weapons.cfg"));
        assert!(!storage.asset_exists("data"));
        assert!(!storage.asset_exists(""));
        assert_eq!(*storage.read_asset("data/weapons.cfg").unwrap(), b"cfg");
        assert!(matches!(
            storage.read_asset("data/missing.cfg"),
            Err(StorageError::FileNotFound(_))
        ));
        assert_eq!(
            storage.asset_kind("data"),
            Some(AssetEntryKind::Directory)
        );
    }

    #[test]
    fn test_remove_file_deletes_only_valid_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = manager(&dir);

        storage.write_file("saves/slot1.dat", b"x").unwrap();
        storage.remove_file("saves/slot1.dat").unwrap();
        assert!(!storage.file_exists("saves/slot1.dat"));

        assert!(matches!(
            storage.remove_file("saves/slot1.dat"),
            Err(StorageError::FileNotFound(_))
        ));
        assert!(matches!(
            storage.remove_file("saves"),
            Err(StorageError::NotAFile(_))
        ));
        assert!(matches!(
            storage.remove_file("../outside"),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_logical_paths_resolve_before_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        fs::create_dir(assets.path().join("data")).unwrap();
        fs::write(assets.path().join("data/gta.dat"), b"IDE lines").unwrap();

        let storage = StorageManager::new(
            &dir.path().join("files"),
            Box::new(DirAssetSource::new(assets.path())),
        )
        .unwrap();

        // Seeded known mapping
        assert_eq!(storage.resolve_asset_path("DATA/GTA.DAT"), "data/gta.dat");
        assert!(storage.asset_exists("DATA/GTA.DAT"));
        assert_eq!(*storage.read_asset("DATA/GTA.DAT").unwrap(), b"IDE lines");

        // Runtime registration
        assert!(storage.register_asset_mapping("GTA.DAT", "data/gta.dat"));
        assert_eq!(*storage.read_asset("GTA.DAT").unwrap(), b"IDE lines");

        // Unmapped logical paths pass through unchanged
        assert_eq!(storage.resolve_asset_path("data/gta.dat"), "data/gta.dat");
    }

    #[test]
    fn test_read_asset_serves_held_contents_from_cache() {
        struct CountingOpens {
            inner: DirAssetSource,
            opens: std::sync::atomic::AtomicUsize,
        }

        impl AssetSource for CountingOpens {
            fn kind(&self, path: &str) -> Option<AssetEntryKind> {
                self.inner.kind(path)
            }

            fn len(&self, path: &str) -> io::Result<u64> {
                self.inner.len(path)
            }

            fn list(&self, path: &str) -> io::Result<Vec<AssetEntry>> {
                self.inner.list(path)
            }

            fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
                self.opens
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                self.inner.open(path)
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        fs::write(assets.path().join("hud.txd"), b"texture").unwrap();

        let storage = StorageManager::new(
            &dir.path().join("files"),
            Box::new(CountingOpens {
                inner: DirAssetSource::new(assets.path()),
                opens: std::sync::atomic::AtomicUsize::new(0),
            }),
        )
        .unwrap();

        let first = storage.read_asset("hud.txd").unwrap();
        let second = storage.read_asset("hud.txd").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(storage.asset_cache_size(), 1);

        // Once no caller holds the contents, the cache entry dies
        drop(first);
        drop(second);
        assert_eq!(storage.asset_cache_size(), 0);
        let _third = storage.read_asset("hud.txd").unwrap();

        storage.clear_asset_cache();
        assert_eq!(storage.asset_cache_size(), 0);
    }

    #[test]
    fn test_asset_size_mismatch_is_corruption() {
        struct LyingSource;

        impl AssetSource for LyingSource {
            fn kind(&self, _path: &str) -> Option<AssetEntryKind> {
                Some(AssetEntryKind::File)
            }

            fn len(&self, _path: &str) -> io::Result<u64> {
                Ok(100)
            }

            fn list(&self, _path: &str) -> io::Result<Vec<AssetEntry>> {
                Ok(vec![])
            }

            fn open(&self, _path: &str) -> io::Result<Box<dyn Read + Send>> {
                Ok(Box::new(io::Cursor::new(b"short".to_vec())))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let storage =
            StorageManager::new(&dir.path().join("files"), Box::new(LyingSource)).unwrap();

        assert!(matches!(
            storage.read_asset("anything.bin"),
            Err(StorageError::SizeMismatch { expected: 100, .. })
        ));
    }
}
