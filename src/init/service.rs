//! Initialization service
//!
//! Walks the bundled asset tree and copies every entry into the storage
//! root, exactly once per install. Completion is recorded in a persisted
//! flag so the migration never re-runs; per-entry failures are tolerated
//! as long as some progress occurred.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::assets::AssetEntryKind;
use crate::error::{InitError, StorageError};
use crate::storage::StorageManager;

/// File under the storage root holding the persisted initialization flag
pub const INIT_STATE_FILE: &str = "asset_initialization.json";

const DEFAULT_COPY_BUFFER_SIZE: usize = 8192;

/// Persisted initialization state; the file name is the namespace, the
/// field is the key
#[derive(Debug, Default, Serialize, Deserialize)]
struct InitState {
    initialized: bool,
}

/// Outcome of one `initialize_assets` run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// A previous run already completed; nothing was copied
    AlreadyInitialized,
    /// The bundled tree had no entries; a bundle with no assets is a
    /// valid, already-complete state
    NoAssets,
    /// The tree was walked; per-top-level-entry tallies
    Completed { copied: usize, failed: usize },
}

pub struct InitializationService {
    copy_buffer_size: usize,
    /// Serializes concurrent migration callers; held for the whole run
    run_lock: Mutex<()>,
}

impl Default for InitializationService {
    fn default() -> Self {
        Self::new(DEFAULT_COPY_BUFFER_SIZE)
    }
}

impl InitializationService {
    pub fn new(copy_buffer_size: usize) -> Self {
        Self {
            copy_buffer_size,
            run_lock: Mutex::new(()),
        }
    }

    fn lock_run(&self) -> MutexGuard<'_, ()> {
        self.run_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read the persisted initialization flag; false when the flag file is
    /// absent or unreadable
    pub fn is_initialized(&self, storage: &StorageManager) -> bool {
        match storage.read_file(INIT_STATE_FILE) {
            Ok(data) => serde_json::from_slice::<InitState>(&data)
                .map(|state| state.initialized)
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Run the one-time migration of the bundled asset tree.
    ///
    /// Idempotent: an already-completed migration short-circuits. The flag
    /// is set when every entry copied, or when at least one did; only a
    /// total-zero-progress run leaves it unset so a later call retries the
    /// whole tree.
    pub fn initialize_assets(&self, storage: &StorageManager) -> Result<InitOutcome, InitError> {
        let _guard = self.lock_run();

        // Re-checked under the lock: a concurrent caller may have finished
        // the migration while this one was waiting
        if self.is_initialized(storage) {
            info!("initialize_assets: assets already initialized");
            return Ok(InitOutcome::AlreadyInitialized);
        }

        let base_path = storage.base_path();
        info!(
            "initialize_assets: starting initialization, base path: {}",
            base_path
        );

        let entries = match storage.list_assets("") {
            Ok(entries) => entries,
            Err(e) => {
                warn!("initialize_assets: asset tree unavailable: {}", e);
                self.mark_initialized(storage)?;
                return Ok(InitOutcome::NoAssets);
            }
        };

        if entries.is_empty() {
            warn!("initialize_assets: no bundled assets found");
            self.mark_initialized(storage)?;
            return Ok(InitOutcome::NoAssets);
        }

        let mut copied = 0;
        let mut failed = 0;

        for entry in &entries {
            if self.copy_entry(storage, &base_path, &entry.name, entry.kind) {
                copied += 1;
            } else {
                failed += 1;
                error!("initialize_assets: failed to copy asset: {}", entry.name);
            }
        }

        info!(
            "initialize_assets: completed, copied: {}, failed: {}",
            copied, failed
        );

        if failed == 0 || copied > 0 {
            self.mark_initialized(storage)?;
            Ok(InitOutcome::Completed { copied, failed })
        } else {
            Err(InitError::NoProgress { failed })
        }
    }

    /// Teardown hook: clear the persisted flag.
    ///
    /// The migration itself never resets the flag; this exists for test
    /// harnesses and explicit reinstalls.
    pub fn reset(&self, storage: &StorageManager) -> Result<(), StorageError> {
        let _guard = self.lock_run();

        if storage.file_exists(INIT_STATE_FILE) {
            storage.remove_file(INIT_STATE_FILE)?;
        }

        Ok(())
    }

    fn mark_initialized(&self, storage: &StorageManager) -> Result<(), InitError> {
        let state = InitState { initialized: true };
        let data = serde_json::to_vec(&state)?;
        storage.write_file(INIT_STATE_FILE, &data)?;
        Ok(())
    }

    /// Copy one bundled entry, depth-first. Returns per-entry success;
    /// failures are logged and do not propagate.
    fn copy_entry(
        &self,
        storage: &StorageManager,
        base_path: &str,
        asset_path: &str,
        kind: AssetEntryKind,
    ) -> bool {
        match kind {
            AssetEntryKind::File => self.copy_file(storage, base_path, asset_path),
            AssetEntryKind::Directory => self.copy_directory(storage, base_path, asset_path),
        }
    }

    fn copy_directory(
        &self,
        storage: &StorageManager,
        base_path: &str,
        asset_path: &str,
    ) -> bool {
        let children = match storage.list_assets(asset_path) {
            Ok(children) => children,
            Err(e) => {
                error!(
                    "copy_directory: cannot list asset directory {}: {}",
                    asset_path, e
                );
                return false;
            }
        };

        // An entry that lists nothing cannot be copied; treated as
        // unreadable, matching the read-size-mismatch strictness elsewhere
        if children.is_empty() {
            error!("copy_directory: unreadable asset entry: {}", asset_path);
            return false;
        }

        let dest = PathBuf::from(format!("{}{}", base_path, asset_path));
        if !dest.exists() && fs::create_dir_all(&dest).is_err() {
            error!(
                "copy_directory: failed to create directory: {}",
                dest.display()
            );
            return false;
        }

        let mut all_succeeded = true;
        for child in children {
            let child_path = format!("{}/{}", asset_path, child.name);
            if !self.copy_entry(storage, base_path, &child_path, child.kind) {
                all_succeeded = false;
            }
        }

        all_succeeded
    }

    fn copy_file(&self, storage: &StorageManager, base_path: &str, asset_path: &str) -> bool {
        let mut reader = match storage.open_asset(asset_path) {
            Ok(reader) => reader,
            Err(e) => {
                error!("copy_file: failed to open asset {}: {}", asset_path, e);
                return false;
            }
        };

        let dest = PathBuf::from(format!("{}{}", base_path, asset_path));
        if let Some(parent) = dest.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                error!(
                    "copy_file: failed to create parent directory: {}",
                    parent.display()
                );
                return false;
            }
        }

        match stream_copy(&mut reader, &dest, self.copy_buffer_size) {
            Ok(()) => true,
            Err(e) => {
                error!("copy_file: IO error for {}: {}", asset_path, e);
                // A truncated destination must not survive a failed copy;
                // the retry pass recopies the whole entry
                if dest.exists() && fs::remove_file(&dest).is_err() {
                    warn!(
                        "copy_file: failed to remove partial file: {}",
                        dest.display()
                    );
                }
                false
            }
        }
    }
}

/// Stream bytes from `reader` into a fresh file at `dest` in fixed-size
/// chunks
fn stream_copy(reader: &mut impl Read, dest: &Path, buffer_size: usize) -> std::io::Result<()> {
    let mut file = File::create(dest)?;
    let mut buffer = vec![0u8; buffer_size];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])?;
    }

    file.flush()
}
