//! Asset cache
//!
//! Path-keyed cache of loaded asset contents. Entries hold weak references,
//! so a cached asset lives only while some caller still holds it; dead
//! entries are pruned on access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

#[derive(Default)]
pub struct AssetCache {
    entries: Mutex<HashMap<String, Weak<Vec<u8>>>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Weak<Vec<u8>>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the contents for `path`; the cache keeps only a weak handle
    pub fn put(&self, path: &str, data: &Arc<Vec<u8>>) {
        if path.is_empty() {
            return;
        }

        self.lock().insert(path.to_string(), Arc::downgrade(data));
    }

    /// Contents cached for `path`, if some caller still holds them
    pub fn get(&self, path: &str) -> Option<Arc<Vec<u8>>> {
        if path.is_empty() {
            return None;
        }

        let mut entries = self.lock();
        match entries.get(path) {
            Some(weak) => match weak.upgrade() {
                Some(data) => Some(data),
                None => {
                    entries.remove(path);
                    None
                }
            },
            None => None,
        }
    }

    pub fn remove(&self, path: &str) {
        if path.is_empty() {
            return;
        }

        self.lock().remove(path);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of live entries; dead ones are pruned while counting
    pub fn len(&self) -> usize {
        let mut entries = self.lock();
        entries.retain(|_, weak| weak.strong_count() > 0);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_live_while_held() {
        let cache = AssetCache::new();
        let data = Arc::new(b"texture bytes".to_vec());

        cache.put("textures/hud.txd", &data);

        let hit = cache.get("textures/hud.txd").unwrap();
        assert_eq!(*hit, *data);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entries_evaporate_when_dropped() {
        let cache = AssetCache::new();
        let data = Arc::new(b"short lived".to_vec());
        cache.put("audio/intro.wav", &data);
        drop(data);

        assert!(cache.get("audio/intro.wav").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = AssetCache::new();
        let a = Arc::new(b"a".to_vec());
        let b = Arc::new(b"b".to_vec());
        cache.put("a.dat", &a);
        cache.put("b.dat", &b);

        cache.remove("a.dat");
        assert!(cache.get("a.dat").is_none());
        assert!(cache.get("b.dat").is_some());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_empty_path_is_ignored() {
        let cache = AssetCache::new();
        let data = Arc::new(b"x".to_vec());

        cache.put("", &data);
        assert!(cache.get("").is_none());
        assert!(cache.is_empty());
    }
}
