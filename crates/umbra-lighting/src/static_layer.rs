//! The static shadow layer.
//!
//! Every static shadow of the map painted into one raster. Lights that burn
//! through a shadow have their lit area removed from it first.

use crate::cache::RasterCache;
use crate::color::Color;
use crate::config::ShadowDefaults;
use crate::emitter::LightEmitter;
use crate::layer::{LayerInputs, Published, burns_through, cache_key, signature_hasher};
use crate::raster::fill_region;
use crate::shadow::StaticShadow;
use image::RgbaImage;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use umbra_core::profiling::profile_function;
use umbra_geometry::CsgRegion;

/// Whether `light` is switched on, burns through `shadow` and reaches it.
fn lights_up(light: &LightEmitter, shadow: &StaticShadow) -> bool {
    let reaches = match (shadow.area_bounds(), light.large_shape().bounds()) {
        (Some(area), Some(lit)) => area.intersects(&lit),
        _ => false,
    };
    light.is_active() && reaches && burns_through(light.center(), shadow)
}

/// The painted region of `shadow`, minus the lights burning through it.
pub fn shadow_region(shadow: &StaticShadow, lights: &[&LightEmitter]) -> Option<CsgRegion> {
    let mut region = CsgRegion::from(shadow.area_shape()?);
    for light in lights.iter().filter(|light| lights_up(light, shadow)) {
        region.subtract(light.large_shape().clone());
    }
    Some(region)
}

/// All static shadows of a map, memoized by content signature.
#[derive(Debug)]
pub struct StaticShadowLayer {
    color: Color,
    alpha: u8,
    published: Published,
}

impl StaticShadowLayer {
    /// Cache key prefix of this layer.
    pub const TAG: &'static str = "shadow";

    pub fn new(defaults: &ShadowDefaults) -> Self {
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

    pub fn builds(&self) -> u64 {
        self.published.builds()
    }

    /// Evict this layer's image from `cache`.
    pub fn release(&mut self, cache: &RasterCache) -> bool {
        self.published.release(cache)
    }

    pub fn current_key(&self) -> Option<&str> {
        self.published.key()
    }

    /// Hash of color, alpha, map size, every shadow and every light that
    /// burns through one of them.
    pub fn signature(&self, inputs: &LayerInputs<'_>) -> u64 {
        let mut hasher = signature_hasher(Self::TAG);
        inputs.size.hash(&mut hasher);
        self.color.to_rgba_u8().hash(&mut hasher);
        self.alpha.hash(&mut hasher);
        inputs.shadows.len().hash(&mut hasher);
        for shadow in inputs.shadows {
            shadow.hash(&mut hasher);
        }
        for (index, light) in inputs.lights.iter().enumerate() {
            if inputs.shadows.iter().any(|shadow| lights_up(light, shadow)) {
                index.hash(&mut hasher);
                light.hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    pub fn cache_key(&self, inputs: &LayerInputs<'_>) -> String {
        cache_key(Self::TAG, inputs.map_name, self.signature(inputs))
    }

    pub fn image(&mut self, inputs: &LayerInputs<'_>, cache: &RasterCache) -> Arc<RgbaImage> {
        let key = self.cache_key(inputs);
        let paint = self.paint();
        self.published.serve(cache, key, || render(paint, inputs))
    }

    pub fn render(&self, inputs: &LayerInputs<'_>) -> RgbaImage {
        render(self.paint(), inputs)
    }

    fn paint(&self) -> Color {
        self.color.with_alpha_u8(self.alpha)
    }
}

fn render(paint: Color, inputs: &LayerInputs<'_>) -> RgbaImage {
    profile_function!();
    let mut image = RgbaImage::new(inputs.size.width, inputs.size.height);
    // Overlapping shadows share one fill so their alpha never stacks.
    let mut joined = CsgRegion::empty();
    let mut painted = 0;
    for shadow in inputs.shadows {
        if let Some(region) = shadow_region(shadow, inputs.lights) {
            joined.add(region);
            painted += 1;
        }
    }
    fill_region(&mut image, &joined, paint);
    tracing::trace!("Static shadow layer rendered {} shadows", painted);
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LightDefaults;
    use crate::shadow::ShadowType;
    use umbra_core::math::{Rect, Size};

    fn inputs<'a>(
        lights: &'a [&'a LightEmitter],
        shadows: &'a [&'a StaticShadow],
    ) -> LayerInputs<'a> {
        LayerInputs {
            map_name: "test",
            size: Size::new(64, 64),
            lights,
            shadows,
        }
    }

    #[test]
    fn test_none_shadows_are_not_painted() {
        let layer = StaticShadowLayer::new(&ShadowDefaults::default());
        let none = StaticShadow::new(Rect::new(0.0, 0.0, 32.0, 32.0), ShadowType::None, 10.0);
        let image = layer.render(&inputs(&[], &[&none]));
        assert!(image.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_shadow_painted_with_color_and_alpha() {
        let layer = StaticShadowLayer::new(&ShadowDefaults::default());
        let wall = StaticShadow::new(Rect::new(0.0, 0.0, 32.0, 32.0), ShadowType::Down, 10.0);
        let image = layer.render(&inputs(&[], &[&wall]));

        assert_eq!(image.get_pixel(10, 40).0, [0, 0, 0, 75]);
        assert_eq!(image.get_pixel(10, 45).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_overlapping_shadows_do_not_stack() {
        let layer = StaticShadowLayer::new(&ShadowDefaults::default());
        let upper = StaticShadow::new(Rect::new(0.0, 0.0, 32.0, 32.0), ShadowType::Down, 10.0);
        let lower = StaticShadow::new(Rect::new(0.0, 20.0, 32.0, 32.0), ShadowType::Down, 10.0);
        let image = layer.render(&inputs(&[], &[&upper, &lower]));

        // (10, 30) lies in both areas, (10, 5) and (10, 50) in one each.
        assert_eq!(image.get_pixel(10, 30).0, [0, 0, 0, 75]);
        assert_eq!(image.get_pixel(10, 5).0, [0, 0, 0, 75]);
        assert_eq!(image.get_pixel(10, 50).0, [0, 0, 0, 75]);
        assert_eq!(image.get_pixel(40, 30).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_light_burns_through_shadow() {
        let layer = StaticShadowLayer::new(&ShadowDefaults::default());
        let wall = StaticShadow::new(Rect::new(0.0, 0.0, 32.0, 32.0), ShadowType::Down, 10.0);
        // Centre (16, 36) lies inside the shadow area.
        let light = LightEmitter::new(Rect::new(6.0, 26.0, 20.0, 20.0), LightDefaults::default());

        let image = layer.render(&inputs(&[&light], &[&wall]));
        assert_eq!(image.get_pixel(16, 36)[3], 0);
        assert_eq!(image.get_pixel(2, 2)[3], 75);
    }

    #[test]
    fn test_inactive_light_does_not_burn_through() {
        let layer = StaticShadowLayer::new(&ShadowDefaults::default());
        let wall = StaticShadow::new(Rect::new(0.0, 0.0, 32.0, 32.0), ShadowType::Down, 10.0);
        let mut light = LightEmitter::new(Rect::new(6.0, 26.0, 20.0, 20.0), LightDefaults::default());
        light.deactivate();

        let image = layer.render(&inputs(&[&light], &[&wall]));
        assert_eq!(image.get_pixel(16, 36)[3], 75);
    }

    #[test]
    fn test_signature_tracks_burning_lights() {
        let layer = StaticShadowLayer::new(&ShadowDefaults::default());
        let wall = StaticShadow::new(Rect::new(0.0, 0.0, 32.0, 32.0), ShadowType::Down, 10.0);
        let inside = LightEmitter::new(Rect::new(6.0, 26.0, 20.0, 20.0), LightDefaults::default());
        let far = LightEmitter::new(Rect::new(50.0, 50.0, 10.0, 10.0), LightDefaults::default());

        let bare = layer.signature(&inputs(&[], &[&wall]));
        assert_eq!(bare, layer.signature(&inputs(&[&far], &[&wall])));
        assert_ne!(bare, layer.signature(&inputs(&[&inside], &[&wall])));
    }
}
