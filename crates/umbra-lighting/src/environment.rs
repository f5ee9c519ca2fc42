//! The lighting state of one loaded map.

use crate::actor::Actor;
use crate::ambient::AmbientLayer;
use crate::cache::RasterCache;
use crate::camera::Camera;
use crate::color::Color;
use crate::config::LightingConfig;
use crate::dynamic::DynamicShadowCaster;
use crate::emitter::LightEmitter;
use crate::error::LightingResult;
use crate::layer::LayerInputs;
use crate::map_object::{MapObject, MapObjectKind};
use crate::query::{LightQuery, VisionQuery};
use crate::shadow::StaticShadow;
use crate::static_layer::StaticShadowLayer;
use bitflags::bitflags;
use image::RgbaImage;
use std::sync::Arc;
use umbra_core::alloc::{Handle, HandleSet};
use umbra_core::math::{Rect, Size};
use umbra_geometry::CsgRegion;

bitflags! {
    /// Map layers whose inputs changed since they were last served.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayerDirty: u8 {
        /// Ambient darkness layer.
        const AMBIENT = 1 << 0;
        /// Static shadow layer.
        const STATIC_SHADOWS = 1 << 1;
    }
}

/// Handle of a light inside a [`LightingEnvironment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightHandle(Handle);

/// Handle of a static shadow inside a [`LightingEnvironment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowHandle(Handle);

/// What [`LightingEnvironment::load_map_object`] created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadedObject {
    Light(LightHandle),
    Shadow(ShadowHandle),
}

/// Lights, static shadows and the two memoized layers of one map.
///
/// Mutations only mark layers dirty; the layers are rebuilt lazily the next
/// time their image is requested, and only if their content signature
/// actually changed.
///
/// ```
/// use umbra_core::math::{Rect, Size};
/// use umbra_lighting::{LightEmitter, LightingEnvironment};
///
/// let mut env = LightingEnvironment::new("cellar", Size::new(128, 128));
/// env.set_ambient_alpha(180);
/// let light = LightEmitter::new(Rect::new(32.0, 32.0, 64.0, 64.0), env.config().light);
/// env.add_light(light);
///
/// let first = env.ambient_image();
/// let second = env.ambient_image();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
#[derive(Debug)]
pub struct LightingEnvironment {
    map_name: String,
    size: Size,
    config: LightingConfig,
    lights: HandleSet<LightEmitter>,
    shadows: HandleSet<StaticShadow>,
    caster: DynamicShadowCaster,
    ambient: AmbientLayer,
    static_layer: StaticShadowLayer,
    cache: Arc<RasterCache>,
    dirty: LayerDirty,
    ambient_image: Option<Arc<RgbaImage>>,
    shadow_image: Option<Arc<RgbaImage>>,
}

impl LightingEnvironment {
    pub fn new(map_name: impl Into<String>, size: Size) -> Self {
        Self::with_config(map_name, size, LightingConfig::default())
    }

    pub fn with_config(map_name: impl Into<String>, size: Size, config: LightingConfig) -> Self {
        let map_name = map_name.into();
        tracing::debug!("Creating lighting environment for '{}' ({:?})", map_name, size);
        Self {
            map_name,
            size,
            config,
            lights: HandleSet::new(),
            shadows: HandleSet::new(),
            caster: DynamicShadowCaster::new(config.dynamic),
            ambient: AmbientLayer::new(config.ambient),
            static_layer: StaticShadowLayer::new(&config.shadow),
            cache: Arc::new(RasterCache::new()),
            dirty: LayerDirty::all(),
            ambient_image: None,
            shadow_image: None,
        }
    }

    /// Share a raster cache with other environments. Keys are prefixed with
    /// the map name, so maps never see each other's images.
    pub fn with_cache(mut self, cache: Arc<RasterCache>) -> Self {
        self.cache = cache;
        self.mark_dirty(LayerDirty::all());
        self
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<RasterCache> {
        &self.cache
    }

    pub fn caster(&self) -> &DynamicShadowCaster {
        &self.caster
    }

    pub fn dirty(&self) -> LayerDirty {
        self.dirty
    }

    fn mark_dirty(&mut self, layers: LayerDirty) {
        self.dirty |= layers;
    }

    // =========================================================================
    // Lights
    // =========================================================================

    pub fn add_light(&mut self, light: LightEmitter) -> LightHandle {
        let light = light.with_falloff(self.config.falloff);
        tracing::debug!("Adding light at {:?}", light.bounds());
        self.mark_dirty(LayerDirty::all());
        LightHandle(self.lights.push(light))
    }

    pub fn remove_light(&mut self, handle: LightHandle) -> Option<LightEmitter> {
        let light = self.lights.remove(handle.0)?;
        tracing::debug!("Removed light at {:?}", light.bounds());
        self.mark_dirty(LayerDirty::all());
        Some(light)
    }

    pub fn light(&self, handle: LightHandle) -> Option<&LightEmitter> {
        self.lights.get(handle.0)
    }

    /// Mutate a light in place. Returns `None` for a stale handle.
    pub fn update_light<R>(
        &mut self,
        handle: LightHandle,
        update: impl FnOnce(&mut LightEmitter) -> R,
    ) -> Option<R> {
        let result = update(self.lights.get_mut(handle.0)?);
        self.mark_dirty(LayerDirty::all());
        Some(result)
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightHandle, &LightEmitter)> {
        self.lights
            .iter_with_handles()
            .map(|(handle, light)| (LightHandle(handle), light))
    }

    // =========================================================================
    // Static shadows
    // =========================================================================

    pub fn add_shadow(&mut self, shadow: StaticShadow) -> ShadowHandle {
        tracing::debug!(
            "Adding {} shadow at {:?}",
            shadow.shadow_type(),
            shadow.bounds()
        );
        self.mark_dirty(LayerDirty::all());
        ShadowHandle(self.shadows.push(shadow))
    }

    pub fn remove_shadow(&mut self, handle: ShadowHandle) -> Option<StaticShadow> {
        let shadow = self.shadows.remove(handle.0)?;
        tracing::debug!("Removed shadow at {:?}", shadow.bounds());
        self.mark_dirty(LayerDirty::all());
        Some(shadow)
    }

    pub fn shadow(&self, handle: ShadowHandle) -> Option<&StaticShadow> {
        self.shadows.get(handle.0)
    }

    pub fn update_shadow<R>(
        &mut self,
        handle: ShadowHandle,
        update: impl FnOnce(&mut StaticShadow) -> R,
    ) -> Option<R> {
        let result = update(self.shadows.get_mut(handle.0)?);
        self.mark_dirty(LayerDirty::all());
        Some(result)
    }

    pub fn shadows(&self) -> impl Iterator<Item = (ShadowHandle, &StaticShadow)> {
        self.shadows
            .iter_with_handles()
            .map(|(handle, shadow)| (ShadowHandle(handle), shadow))
    }

    // =========================================================================
    // Map objects
    // =========================================================================

    /// Create the light or shadow a map object describes.
    ///
    /// Objects of other kinds are ignored and yield `Ok(None)`.
    pub fn load_map_object(&mut self, object: &MapObject) -> LightingResult<Option<LoadedObject>> {
        match object.kind {
            MapObjectKind::LightSource => {
                let light = object.to_light(self.config.light)?;
                Ok(Some(LoadedObject::Light(self.add_light(light))))
            }
            MapObjectKind::StaticShadow | MapObjectKind::CollisionBox => {
                let shadow = object.to_shadow(&self.config.shadow)?;
                Ok(Some(LoadedObject::Shadow(self.add_shadow(shadow))))
            }
            MapObjectKind::Other(_) => {
                tracing::trace!("Ignoring map object {} of kind {}", object.id, object.kind.as_str());
                Ok(None)
            }
        }
    }

    /// Drop every light and shadow and the images this environment published.
    pub fn unload(&mut self) {
        self.lights.clear();
        self.shadows.clear();
        self.ambient_image = None;
        self.shadow_image = None;
        let removed = [
            self.ambient.release(&self.cache),
            self.static_layer.release(&self.cache),
        ]
        .into_iter()
        .filter(|&evicted| evicted)
        .count();
        tracing::debug!("Unloaded '{}', dropped {} cached images", self.map_name, removed);
        self.mark_dirty(LayerDirty::all());
    }

    // =========================================================================
    // Layer appearance
    // =========================================================================

    pub fn set_ambient_color(&mut self, color: Color) {
        self.ambient.set_color(color);
        self.mark_dirty(LayerDirty::AMBIENT);
    }

    /// Set the darkness opacity, clamped to `0..=255`.
    pub fn set_ambient_alpha(&mut self, alpha: i32) {
        self.ambient.set_alpha(alpha.clamp(0, 255) as u8);
        self.mark_dirty(LayerDirty::AMBIENT);
    }

    pub fn set_shadow_color(&mut self, color: Color) {
        self.static_layer.set_color(color);
        self.mark_dirty(LayerDirty::STATIC_SHADOWS);
    }

    /// Set the static shadow opacity, clamped to `0..=255`.
    pub fn set_shadow_alpha(&mut self, alpha: i32) {
        self.static_layer.set_alpha(alpha.clamp(0, 255) as u8);
        self.mark_dirty(LayerDirty::STATIC_SHADOWS);
    }

    pub fn ambient_layer(&self) -> &AmbientLayer {
        &self.ambient
    }

    pub fn static_shadow_layer(&self) -> &StaticShadowLayer {
        &self.static_layer
    }

    // =========================================================================
    // Rasters
    // =========================================================================

    /// The ambient layer image, rebuilt only when its signature changed.
    pub fn ambient_image(&mut self) -> Arc<RgbaImage> {
        if !self.dirty.contains(LayerDirty::AMBIENT)
            && let Some(image) = &self.ambient_image
        {
            return image.clone();
        }

        let lights: Vec<&LightEmitter> = self.lights.iter().collect();
        let shadows: Vec<&StaticShadow> = self.shadows.iter().collect();
        let inputs = LayerInputs {
            map_name: &self.map_name,
            size: self.size,
            lights: &lights,
            shadows: &shadows,
        };
        let image = self.ambient.image(&inputs, &self.cache);

        self.ambient_image = Some(image.clone());
        self.dirty.remove(LayerDirty::AMBIENT);
        image
    }

    /// The static shadow layer image, rebuilt only when its signature changed.
    pub fn static_shadow_image(&mut self) -> Arc<RgbaImage> {
        if !self.dirty.contains(LayerDirty::STATIC_SHADOWS)
            && let Some(image) = &self.shadow_image
        {
            return image.clone();
        }

        let lights: Vec<&LightEmitter> = self.lights.iter().collect();
        let shadows: Vec<&StaticShadow> = self.shadows.iter().collect();
        let inputs = LayerInputs {
            map_name: &self.map_name,
            size: self.size,
            lights: &lights,
            shadows: &shadows,
        };
        let image = self.static_layer.image(&inputs, &self.cache);

        self.shadow_image = Some(image.clone());
        self.dirty.remove(LayerDirty::STATIC_SHADOWS);
        image
    }

    /// Paint this frame's actor shadows onto a viewport-sized overlay.
    pub fn render_dynamic_shadows(
        &self,
        target: &mut RgbaImage,
        actors: &[&dyn Actor],
        camera: &dyn Camera,
    ) {
        self.caster.render(target, self.lights.iter(), actors, camera);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lit-ness of the map right now, including actor shadows.
    pub fn light_query(&self, actors: &[&dyn Actor]) -> LightQuery {
        let lights: Vec<&LightEmitter> = self.lights.iter().collect();
        let shadows: Vec<&StaticShadow> = self.shadows.iter().collect();
        LightQuery::new(&lights, &shadows, actors, &self.caster)
    }

    /// What `viewer` and its allies can see.
    pub fn vision(&self, viewer: &dyn Actor, actors: &[&dyn Actor]) -> VisionQuery {
        VisionQuery::new(viewer, actors, &self.config.vision, &self.caster)
    }

    /// The part of the map hidden from `viewer` and its allies.
    pub fn fog_of_war(&self, viewer: &dyn Actor, actors: &[&dyn Actor]) -> CsgRegion {
        self.vision(viewer, actors).fog_of_war(self.size)
    }

    /// The map as a rectangle.
    pub fn bounds(&self) -> Rect {
        self.size.to_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FalloffConfig;
    use crate::shadow::ShadowType;
    use umbra_core::math::Vec2;
    use umbra_geometry::Shape;

    fn env() -> LightingEnvironment {
        let mut env = LightingEnvironment::new("test", Size::new(32, 32));
        env.set_ambient_alpha(200);
        env
    }

    #[test]
    fn test_alpha_is_clamped() {
        let mut env = env();
        env.set_ambient_alpha(1000);
        assert_eq!(env.ambient_layer().alpha(), 255);
        env.set_shadow_alpha(-5);
        assert_eq!(env.static_shadow_layer().alpha(), 0);
    }

    #[test]
    fn test_dirty_flags() {
        let mut env = env();
        env.ambient_image();
        env.static_shadow_image();
        assert!(env.dirty().is_empty());

        env.set_shadow_color(Color::WHITE);
        assert_eq!(env.dirty(), LayerDirty::STATIC_SHADOWS);

        let light = LightEmitter::new(Rect::new(0.0, 0.0, 8.0, 8.0), env.config().light);
        env.add_light(light);
        assert_eq!(env.dirty(), LayerDirty::all());
    }

    #[test]
    fn test_stale_light_handle() {
        let mut env = env();
        let light = LightEmitter::new(Rect::new(0.0, 0.0, 8.0, 8.0), env.config().light);
        let handle = env.add_light(light);
        assert!(env.remove_light(handle).is_some());
        assert!(env.light(handle).is_none());
        assert_eq!(env.update_light(handle, |l| l.toggle()), None);
    }

    #[test]
    fn test_unload_drops_map_images() {
        let mut env = env();
        env.add_shadow(StaticShadow::new(Rect::new(0.0, 0.0, 8.0, 8.0), ShadowType::Down, 4.0));
        env.ambient_image();
        env.static_shadow_image();
        assert_eq!(env.cache().len(), 2);

        env.unload();
        assert!(env.cache().is_empty());
        assert_eq!(env.shadows().count(), 0);
    }

    #[test]
    fn test_unload_keeps_other_maps_with_shared_prefix() {
        let cache = Arc::new(RasterCache::new());
        let mut town = LightingEnvironment::new("town", Size::new(16, 16)).with_cache(cache.clone());
        let mut town_two = LightingEnvironment::new("town-2", Size::new(16, 16)).with_cache(cache.clone());
        town.ambient_image();
        town_two.ambient_image();
        assert_eq!(cache.len(), 2);

        town.unload();
        assert_eq!(cache.len(), 1);
        let kept = town_two.ambient_layer().current_key().map(str::to_owned);
        assert!(kept.is_some_and(|key| cache.contains(&key)));
    }

    #[test]
    fn test_moving_light_keeps_one_ambient_image() {
        let mut env = env();
        let handle = env.add_light(LightEmitter::new(Rect::new(0.0, 0.0, 8.0, 8.0), env.config().light));
        for step in 0..50 {
            let bounds = Rect::new(step as f32 * 0.5, 4.0, 8.0, 8.0);
            env.update_light(handle, |light| light.set_bounds(bounds));
            env.ambient_image();
        }

        let ambient = env
            .cache()
            .snapshot()
            .keys()
            .filter(|key| key.starts_with("ambient-"))
            .count();
        assert_eq!(ambient, 1);
        assert_eq!(env.cache().len(), 1);
    }

    #[test]
    fn test_added_lights_use_configured_falloff() {
        let config = LightingConfig {
            falloff: FalloffConfig { band_step: 0.3 },
            ..Default::default()
        };
        let mut env = LightingEnvironment::with_config("test", Size::new(64, 64), config);
        let light = LightEmitter::new(Rect::new(0.0, 0.0, 40.0, 40.0), env.config().light);
        let handle = env.add_light(light);

        let mid = env.light(handle).map(|light| light.mid_shape().clone());
        assert_eq!(mid, Some(Shape::ellipse(Vec2::new(20.0, 20.0), Vec2::new(14.0, 14.0))));
    }
}
