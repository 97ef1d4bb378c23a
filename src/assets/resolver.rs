//! Asset path resolution
//!
//! Maps the logical paths the game asks for onto their locations in the
//! bundled asset tree. Unmapped paths resolve to themselves, so lookups
//! never fail at this layer.

use log::error;
use std::collections::HashMap;

/// Logical-to-asset path pairs every install starts with
const KNOWN_MAPPINGS: &[(&str, &str)] = &[
    ("DATA/GTA.DAT", "data/gta.dat"),
    ("DATA/DEFAULT.DAT", "data/default.dat"),
    ("DATA/OBJECT.DAT", "data/object.dat"),
    ("mainV1.scm", "main.scm"),
    ("main.scm", "main.scm"),
];

#[derive(Default)]
pub struct AssetPathResolver {
    mappings: HashMap<String, String>,
}

impl AssetPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver pre-seeded with the launcher's known game paths
    pub fn with_known_mappings() -> Self {
        let mut resolver = Self::new();
        for (logical, asset_path) in KNOWN_MAPPINGS {
            resolver.register(logical, asset_path);
        }
        resolver
    }

    /// The asset path mapped to `logical`, or `logical` itself when no
    /// mapping is registered
    pub fn resolve<'a>(&'a self, logical: &'a str) -> &'a str {
        self.mappings
            .get(logical)
            .map(String::as_str)
            .unwrap_or(logical)
    }

    /// Register a logical-to-asset mapping; later registrations for the
    /// same logical path win
    pub fn register(&mut self, logical: &str, asset_path: &str) -> bool {
        if !validate(logical) || !validate(asset_path) {
            error!(
                "register: invalid mapping: {:?} -> {:?}",
                logical, asset_path
            );
            return false;
        }

        self.mappings
            .insert(logical.to_string(), asset_path.to_string());
        true
    }

    pub fn is_mapped(&self, logical: &str) -> bool {
        self.mappings.contains_key(logical)
    }
}

fn validate(path: &str) -> bool {
    !path.is_empty() && !path.contains("../") && !path.contains("..\\")
}
