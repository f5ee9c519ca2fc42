//! The ambient darkness layer.
//!
//! One map-sized raster: ambient darkness everywhere except where a light
//! shines, with each light painted as three falloff bands. Static shadows
//! are cut out of every band of the lights they fall on, unless the light
//! burns through them.

use crate::cache::RasterCache;
use crate::color::Color;
use crate::config::AmbientDefaults;
use crate::emitter::LightEmitter;
use crate::layer::{LayerInputs, Published, burns_through, cache_key, signature_hasher};
use crate::raster::fill_region;
use crate::shadow::StaticShadow;
use image::RgbaImage;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use umbra_core::profiling::{profile_function, profile_scope};
use umbra_geometry::CsgRegion;

/// The falloff bands of one light after static shadows were cut out.
#[derive(Debug, Clone)]
pub struct LitBands {
    pub small: CsgRegion,
    pub mid: CsgRegion,
    pub large: CsgRegion,
}

/// Falloff bands of `light` minus the static shadows falling on it.
///
/// `None` for a switched-off or zero-sized light.
pub fn lit_bands(light: &LightEmitter, shadows: &[&StaticShadow]) -> Option<LitBands> {
    let bands = light.lit_bands()?;
    let light_bounds = bands.large.bounds()?;
    let center = light.center();

    let mut lit = LitBands {
        small: bands.small.clone().into(),
        mid: bands.mid.clone().into(),
        large: bands.large.clone().into(),
    };
    for shadow in shadows {
        let overlaps = shadow
            .area_bounds()
            .is_some_and(|b| b.intersects(&light_bounds));
        if !overlaps || burns_through(center, shadow) {
            continue;
        }
        let Some(area) = shadow.area_shape() else {
            continue;
        };

        let cut = CsgRegion::from(area).intersection(bands.large.clone());
        lit.large.subtract(&cut);
        lit.mid.subtract(&cut);
        lit.small.subtract(&cut);
    }
    Some(lit)
}

/// Map-wide darkness with light cutouts, memoized by content signature.
#[derive(Debug)]
pub struct AmbientLayer {
    color: Color,
    alpha: u8,
    published: Published,
}

impl AmbientLayer {
    /// Cache key prefix of this layer.
    pub const TAG: &'static str = "ambient";

    pub fn new(defaults: AmbientDefaults) -> Self {
        Self {
            color: defaults.color,
            alpha: defaults.alpha,
            published: Published::default(),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }

    /// Number of times this layer actually rendered.
    pub fn builds(&self) -> u64 {
        self.published.builds()
    }

    /// Evict this layer's image from `cache`.
    pub fn release(&mut self, cache: &RasterCache) -> bool {
        self.published.release(cache)
    }

    /// Key of the image served last.
    pub fn current_key(&self) -> Option<&str> {
        self.published.key()
    }

    /// Hash of everything that affects the pixels.
    pub fn signature(&self, inputs: &LayerInputs<'_>) -> u64 {
        let mut hasher = signature_hasher(Self::TAG);
        inputs.size.hash(&mut hasher);
        self.color.to_rgba_u8().hash(&mut hasher);
        self.alpha.hash(&mut hasher);
        inputs.lights.len().hash(&mut hasher);
        for light in inputs.lights {
            light.hash(&mut hasher);
        }
        inputs.shadows.len().hash(&mut hasher);
        for shadow in inputs.shadows {
            shadow.hash(&mut hasher);
        }
        hasher.finish()
    }

    pub fn cache_key(&self, inputs: &LayerInputs<'_>) -> String {
        cache_key(Self::TAG, inputs.map_name, self.signature(inputs))
    }

    /// The layer image, rendered only if no image with the same signature
    /// exists.
    pub fn image(&mut self, inputs: &LayerInputs<'_>, cache: &RasterCache) -> Arc<RgbaImage> {
        let key = self.cache_key(inputs);
        let (color, alpha) = (self.color, self.alpha);
        self.published.serve(cache, key, || render(color, alpha, inputs))
    }

    /// Render the layer without consulting any cache.
    pub fn render(&self, inputs: &LayerInputs<'_>) -> RgbaImage {
        render(self.color, self.alpha, inputs)
    }
}

fn render(color: Color, alpha: u8, inputs: &LayerInputs<'_>) -> RgbaImage {
    profile_function!();
    let mut image = RgbaImage::new(inputs.size.width, inputs.size.height);
    if inputs.size.is_empty() {
        return image;
    }

    let ambient = color.with_alpha_u8(alpha);
    let lit: Vec<(&LightEmitter, LitBands)> = {
        profile_scope!("lit_bands");
        inputs
            .lights
            .iter()
            .filter_map(|light| lit_bands(light, inputs.shadows).map(|bands| (*light, bands)))
            .collect()
    };

    let mut darkness = CsgRegion::from_rect(inputs.size.to_rect());
    for (_, bands) in &lit {
        darkness.subtract(&bands.large);
    }
    fill_region(&mut image, &darkness, ambient);

    for (light, bands) in &lit {
        let brightness = light.intensity() as f32 / 255.0;
        fill_region(&mut image, &bands.large, light.color().with_alpha(brightness));

        let outer = bands.large.clone().difference(&bands.mid);
        fill_region(&mut image, &outer, ambient.with_alpha(ambient.a * 0.5));

        let inner = bands.mid.clone().difference(&bands.small);
        fill_region(&mut image, &inner, ambient.with_alpha(ambient.a * 0.25));
    }

    tracing::trace!("Ambient layer rendered with {} lit lights", lit.len());
    image
}
