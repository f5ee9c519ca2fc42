//! Pieces shared by the memoized map layers.

use crate::cache::RasterCache;
use crate::emitter::LightEmitter;
use crate::shadow::StaticShadow;
use ahash::AHasher;
use image::RgbaImage;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use umbra_core::alloc::stable_state;
use umbra_core::math::{Size, Vec2};

/// Everything a map layer is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct LayerInputs<'a> {
    pub map_name: &'a str,
    pub size: Size,
    pub lights: &'a [&'a LightEmitter],
    pub shadows: &'a [&'a StaticShadow],
}

/// Whether a light at `light_center` shines through `shadow`.
///
/// A light below the shadow, or inside it, is never darkened by it.
pub fn burns_through(light_center: Vec2, shadow: &StaticShadow) -> bool {
    shadow
        .area_bounds()
        .is_some_and(|b| light_center.y > b.bottom() || b.contains(light_center))
}

/// Fixed-seed hasher for a layer signature, primed with `tag`.
pub(crate) fn signature_hasher(tag: &str) -> AHasher {
    let mut hasher = stable_state().build_hasher();
    tag.hash(&mut hasher);
    hasher
}

/// Cache key `"{tag}-{map}-{signature}"`.
pub(crate) fn cache_key(tag: &str, map_name: &str, signature: u64) -> String {
    format!("{tag}-{map_name}-{signature:016x}")
}

/// Most recently published image of a layer.
#[derive(Debug, Default)]
pub(crate) struct Published {
    key: Option<String>,
    image: Option<Arc<RgbaImage>>,
    builds: u64,
}

impl Published {
    /// Serve the image for `key`, from this layer, then the cache, rendering
    /// only when both miss.
    ///
    /// The image published before under a different key is evicted, so the
    /// cache holds one image per layer.
    pub(crate) fn serve<F>(&mut self, cache: &RasterCache, key: String, render: F) -> Arc<RgbaImage>
    where
        F: FnOnce() -> RgbaImage,
    {
        if let (Some(current), Some(image)) = (&self.key, &self.image)
            && *current == key
        {
            return image.clone();
        }

        let mut rendered = false;
        let image = cache.get_or_insert_with(&key, || {
            rendered = true;
            render()
        });
        if rendered {
            self.builds += 1;
            tracing::debug!("Rendered layer {}", key);
        } else {
            tracing::debug!("Layer {} served from cache", key);
        }

        if let Some(stale) = self.key.replace(key)
            && self.key.as_deref() != Some(stale.as_str())
        {
            cache.remove(&stale);
        }
        self.image = Some(image.clone());
        image
    }

    /// Evict the published image from `cache` and forget it.
    pub(crate) fn release(&mut self, cache: &RasterCache) -> bool {
        self.image = None;
        self.key
            .take()
            .is_some_and(|key| cache.remove(&key).is_some())
    }

    pub(crate) fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub(crate) fn builds(&self) -> u64 {
        self.builds
    }
}
