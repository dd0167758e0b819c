//! In-memory asset store

use super::{Asset, AssetStore, StoreError};
use std::collections::HashMap;

/// Assets held in a map keyed by exact path
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    assets: HashMap<String, Asset>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: &str, asset: Asset) -> Self {
        self.insert(path, asset);
        self
    }

    pub fn insert(&mut self, path: &str, asset: Asset) {
        self.assets.insert(path.to_string(), asset);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    async fn fetch(&self, path: &str) -> Result<Asset, StoreError> {
        Ok(self
            .assets
            .get(path)
            .cloned()
            .unwrap_or_else(Asset::not_found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch() {
        let store = MemoryAssetStore::new().with("/a.txt", Asset::ok("a", "text/plain"));
        assert_eq!(store.len(), 1);
        assert_eq!(&store.fetch("/a.txt").await.unwrap().body[..], b"a");
        assert!(store.fetch("/b.txt").await.unwrap().is_not_found());
    }
}
