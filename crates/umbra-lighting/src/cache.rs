//! Content-keyed raster store.
//!
//! Readers take a snapshot of the whole map and never block writers for
//! longer than a pointer swap: inserts copy the map when a snapshot is still
//! alive and publish the new one in a single store.

use image::RgbaImage;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use umbra_core::alloc::HashMap;

type Images = HashMap<String, Arc<RgbaImage>>;

/// Hit/miss counters of a [`RasterCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
}

/// Shared store for rendered layers, owned by one environment.
#[derive(Default)]
pub struct RasterCache {
    images: RwLock<Arc<Images>>,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an image, counting the hit or miss.
    pub fn get(&self, key: &str) -> Option<Arc<RgbaImage>> {
        let found = self.images.read().get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn contains(&self, key: &str) -> bool {
        self.images.read().contains_key(key)
    }

    /// Publish an image under `key`, replacing any previous one.
    pub fn insert(&self, key: impl Into<String>, image: Arc<RgbaImage>) {
        let mut images = self.images.write();
        Arc::make_mut(&mut *images).insert(key.into(), image);
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Return the image under `key`, rendering and publishing it on a miss.
    pub fn get_or_insert_with<F>(&self, key: &str, render: F) -> Arc<RgbaImage>
    where
        F: FnOnce() -> RgbaImage,
    {
        if let Some(image) = self.get(key) {
            tracing::trace!("Raster cache hit: {}", key);
            return image;
        }

        let image = Arc::new(render());
        self.insert(key, image.clone());
        image
    }

    /// Immutable view of every cached image at this instant.
    pub fn snapshot(&self) -> Arc<Images> {
        self.images.read().clone()
    }

    /// Drop the image under `key`.
    pub fn remove(&self, key: &str) -> Option<Arc<RgbaImage>> {
        let mut images = self.images.write();
        if !images.contains_key(key) {
            return None;
        }
        Arc::make_mut(&mut *images).remove(key)
    }

    pub fn clear(&self) {
        *self.images.write() = Arc::default();
        tracing::debug!("Raster cache cleared");
    }

    pub fn len(&self) -> usize {
        self.images.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for RasterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCache")
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> RgbaImage {
        RgbaImage::new(2, 2)
    }

    #[test]
    fn test_get_or_insert_renders_once() {
        let cache = RasterCache::new();
        let mut renders = 0;
        let a = cache.get_or_insert_with("ambient-map-1", || {
            renders += 1;
            image()
        });
        let b = cache.get_or_insert_with("ambient-map-1", || {
            renders += 1;
            image()
        });

        assert_eq!(renders, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                inserts: 1
            }
        );
    }

    #[test]
    fn test_snapshot_survives_insert() {
        let cache = RasterCache::new();
        cache.insert("a", Arc::new(image()));
        let snapshot = cache.snapshot();
        cache.insert("b", Arc::new(image()));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = RasterCache::new();
        cache.insert("ambient-town-1", Arc::new(image()));
        cache.insert("ambient-town-2-1", Arc::new(image()));
        cache.insert("shadow-town-1", Arc::new(image()));

        assert!(cache.remove("ambient-town-1").is_some());
        assert!(cache.remove("ambient-town-1").is_none());
        assert!(cache.contains("ambient-town-2-1"));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
