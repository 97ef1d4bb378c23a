//! Bundled asset access
//!
//! Read-only access to the asset tree shipped with the launcher.

pub mod cache;
pub mod dir;
pub mod resolver;
pub mod source;

pub use cache::AssetCache;
pub use dir::DirAssetSource;
pub use resolver::AssetPathResolver;
pub use source::{AssetEntry, AssetEntryKind, AssetSource};
