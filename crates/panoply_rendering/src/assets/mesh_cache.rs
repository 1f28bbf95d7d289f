//! Mesh resolution cache.
//!
//! One entry per distinct item look, shared by every observed player on a
//! client. Entries live until [`MeshCache::clear`], which hosts call when
//! assets are reloaded. Failed resolutions are not cached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use panoply_shared::ItemStack;

use super::{CachedMesh, ShapeLocation};
use crate::error::AssetResult;
use crate::integration::AssetBackend;

/// Item code plus every visually relevant attribute, sorted by key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a stack.
    ///
    /// Attributes with empty values are ignored. Storage order does not
    /// matter.
    #[must_use]
    pub fn for_stack(stack: &ItemStack) -> Self {
        let mut attributes: Vec<&(String, String)> = stack
            .attributes()
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        attributes.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut key = stack.code.as_str().to_owned();
        for (name, value) in attributes {
            key.push('|');
            key.push_str(name);
            key.push('=');
            key.push_str(value);
        }
        Self(key)
    }

    /// String form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshCacheStats {
    /// Resolutions answered from the cache.
    pub hits: u64,
    /// Resolutions that went to the asset backend.
    pub misses: u64,
    /// Misses that produced no mesh.
    pub failures: u64,
    /// Entries currently stored.
    pub entries: usize,
}

/// Shared `(item look) -> (texture, mesh)` map.
#[derive(Debug, Default)]
pub struct MeshCache {
    entries: RwLock<HashMap<CacheKey, CachedMesh>>,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl MeshCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stack's mesh, building it on first use.
    ///
    /// `None` means the item has no representation right now; the caller
    /// draws the slot empty.
    ///
    /// A miss holds the write lock for the whole backend round-trip,
    /// upload included, so concurrent readers wait for it. The backend must
    /// not call back into this cache.
    pub fn resolve(&self, stack: &ItemStack, assets: &dyn AssetBackend) -> Option<CachedMesh> {
        let key = CacheKey::for_stack(stack);

        if let Some(mesh) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(*mesh);
        }

        // Check-and-insert under one write lock so a look is uploaded once.
        let mut entries = self.entries.write();
        if let Some(mesh) = entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(*mesh);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        match Self::build(stack, assets) {
            Ok(mesh) => {
                tracing::debug!(key = key.as_str(), ?mesh, "mesh cached");
                entries.insert(key, mesh);
                Some(mesh)
            }
            Err(error) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(code = %stack.code, %error, "no mesh for item");
                None
            }
        }
    }

    fn build(stack: &ItemStack, assets: &dyn AssetBackend) -> AssetResult<CachedMesh> {
        let base = assets.shape_base(&stack.code)?;
        let location = ShapeLocation::from_base(&base);
        let shape = assets.load_shape(&location)?;
        assets.upload_mesh(&shape, stack)
    }

    /// Drops every entry. Handles already handed out become the host's
    /// business.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        tracing::info!(entries = entries.len(), "mesh cache cleared");
        entries.clear();
    }

    /// Number of cached looks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> MeshCacheStats {
        MeshCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::MockAssetBackend;
    use panoply_shared::ToolKind;

    fn backend() -> MockAssetBackend {
        let mut assets = MockAssetBackend::new();
        assets.register("game:knife-flint", "game:item/tool/knife");
        assets.register("game:shield-wood", "game:item/tool/shield");
        assets
    }

    #[test]
    fn test_key_ignores_attribute_order_and_empties() {
        let a = ItemStack::shield("game:shield-wood")
            .with_attribute("wood", "oak")
            .with_attribute("metal", "iron")
            .with_attribute("deco", "");
        let b = ItemStack::shield("game:shield-wood")
            .with_attribute("metal", "iron")
            .with_attribute("wood", "oak");
        assert_eq!(CacheKey::for_stack(&a), CacheKey::for_stack(&b));

        let c = ItemStack::shield("game:shield-wood").with_attribute("metal", "gold");
        assert_ne!(CacheKey::for_stack(&a), CacheKey::for_stack(&c));
    }

    #[test]
    fn test_second_resolve_hits_cache() {
        let assets = backend();
        let cache = MeshCache::new();
        let knife = ItemStack::tool("game:knife-flint", ToolKind::Knife);

        let first = cache.resolve(&knife, &assets).unwrap();
        let second = cache.resolve(&knife, &assets).unwrap();

        assert_eq!(first, second);
        assert_eq!(assets.uploads(), 1);
        assert_eq!(assets.shape_lookups(), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_visual_variants_get_own_entry() {
        let assets = backend();
        let cache = MeshCache::new();
        let oak = ItemStack::shield("game:shield-wood").with_attribute("wood", "oak");
        let pine = ItemStack::shield("game:shield-wood").with_attribute("wood", "pine");

        assert_ne!(cache.resolve(&oak, &assets), cache.resolve(&pine, &assets));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failures_not_cached() {
        let mut assets = backend();
        assets.remove_shape("game:shapes/item/tool/knife.json");
        let cache = MeshCache::new();
        let knife = ItemStack::tool("game:knife-flint", ToolKind::Knife);
        let unknown = ItemStack::other("game:mystery");

        assert_eq!(cache.resolve(&knife, &assets), None);
        assert_eq!(cache.resolve(&knife, &assets), None);
        assert_eq!(cache.resolve(&unknown, &assets), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().failures, 3);
    }

    #[test]
    fn test_clear_forces_rebuild() {
        let assets = backend();
        let cache = MeshCache::new();
        let knife = ItemStack::tool("game:knife-flint", ToolKind::Knife);

        cache.resolve(&knife, &assets);
        cache.clear();
        assert!(cache.is_empty());
        cache.resolve(&knife, &assets);
        assert_eq!(assets.uploads(), 2);
    }

    #[test]
    fn test_concurrent_misses_upload_once() {
        let assets = backend();
        let cache = MeshCache::new();
        let knife = ItemStack::tool("game:knife-flint", ToolKind::Knife);

        let meshes: Vec<_> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.resolve(&knife, &assets)))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(assets.uploads(), 1);
        assert!(meshes.iter().all(|mesh| *mesh == meshes[0] && mesh.is_some()));
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (7, 1));
    }
}
