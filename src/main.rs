//! Launcher Asset Store - Entry Point
//!
//! Resolves the sandbox storage root and runs the one-time bundled-asset
//! migration.

use log::{error, info};

use launcher_asset_store::assets::DirAssetSource;
use launcher_asset_store::config::StoreConfig;
use launcher_asset_store::error::StoreError;
use launcher_asset_store::{InitializationService, StorageManager};

fn run() -> Result<(), StoreError> {
    let config = StoreConfig::load()?;

    let assets = DirAssetSource::new(config.asset_root_path());
    let storage = StorageManager::new(&config.storage_root_path(), Box::new(assets))?;

    let service = InitializationService::new(config.copy_buffer_size);
    let outcome = service.initialize_assets(&storage)?;
    info!("Asset initialization finished: {:?}", outcome);

    Ok(())
}

fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching asset store...");

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
