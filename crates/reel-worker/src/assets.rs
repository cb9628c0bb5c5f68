//! Registry of assets in managed storage.

use std::path::PathBuf;

use dashmap::DashMap;
use reel_models::IngestedAsset;

use crate::error::{WorkerError, WorkerResult};

/// In-memory index of [`IngestedAsset`]s by id.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: DashMap<String, IngestedAsset>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, asset: IngestedAsset) {
        self.assets.insert(asset.id.clone(), asset);
    }

    pub fn get(&self, id: &str) -> Option<IngestedAsset> {
        self.assets.get(id).map(|a| a.value().clone())
    }

    /// Storage path of the asset `id`.
    pub fn resolve_path(&self, id: &str) -> WorkerResult<PathBuf> {
        self.assets
            .get(id)
            .map(|a| PathBuf::from(&a.storage_path))
            .ok_or_else(|| WorkerError::not_found(format!("Video not found: {}", id)))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
