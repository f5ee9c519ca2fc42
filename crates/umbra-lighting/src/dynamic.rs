//! Shadows cast by moving actors.
//!
//! Each actor near a light is approximated by a small ground ellipse at its
//! feet. The shadow is that ellipse plus a quadrilateral tail pushed away
//! from the light:
//!
//! ```text
//!          light
//!            *
//!             \
//!          A --(c)-- B        A, B: ellipse extremes perpendicular to light→c
//!           \        \
//!            C ------ D       C, D: A and B projected `extrusion` from the light
//! ```
//!
//! Nothing here is cached; shadows are rebuilt per query or per frame.

use crate::actor::Actor;
use crate::camera::Camera;
use crate::color::Color;
use crate::config::DynamicShadowConfig;
use crate::emitter::LightEmitter;
use crate::raster::fill_region_with;
use image::RgbaImage;
use umbra_core::math::{Rect, Vec2};
use umbra_core::profiling::profile_function;
use umbra_geometry::vector::{normalize, perpendicular, project};
use umbra_geometry::{CsgRegion, Shape};

/// Bounds of the ground ellipse of an actor: a third of its width, a
/// quarter of its height, centred on its bottom edge.
pub fn ground_ellipse(actor: Rect) -> Rect {
    let width = (actor.width / 3.0).floor();
    let height = (actor.height / 4.0).floor();
    let x = actor.x + (actor.width - width) / 2.0;
    let y = actor.y + actor.height - (height / 2.0).floor();
    Rect::new(x, y, width, height)
}

/// Obstruction of an actor standing on `ground` as seen from `light`.
///
/// If the light sits exactly on the ellipse centre the direction is
/// undefined and only the ellipse is returned.
pub fn obstruction(light: Vec2, ground: Rect, extrusion: f32) -> CsgRegion {
    let ellipse = CsgRegion::from(Shape::ellipse_in(ground));
    let center = ground.center();
    let radii = ground.size() * 0.5;

    let Some(n) = normalize(center - light) else {
        return ellipse;
    };
    let p = perpendicular(n);
    let a = center - p * radii;
    let b = center + p * radii;

    match (project(light, a, extrusion), project(light, b, extrusion)) {
        (Some(c), Some(d)) => CsgRegion::from(Shape::polygon(vec![a, b, d, c])).union(ellipse),
        _ => ellipse,
    }
}

/// Builds actor shadows relative to lights and vision centres.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicShadowCaster {
    config: DynamicShadowConfig,
}

impl DynamicShadowCaster {
    pub fn new(config: DynamicShadowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DynamicShadowConfig {
        &self.config
    }

    /// Whether `actor` is alive and its centre within the falloff radius of
    /// `origin`.
    pub fn in_range(&self, origin: Vec2, actor: &dyn Actor) -> bool {
        let radius = self.config.falloff_radius;
        !actor.is_dead() && actor.center().distance_squared(origin) <= radius * radius
    }

    /// Obstruction of a single actor relative to `origin`, unclipped.
    pub fn shadow_of(&self, origin: Vec2, actor: &dyn Actor) -> CsgRegion {
        obstruction(origin, ground_ellipse(actor.bounds()), self.config.extrusion)
    }

    /// Union of the shadows all in-range actors cast from `origin`, keeping
    /// only actors accepted by `filter`.
    pub fn shadows_from<'a, I, F>(&self, origin: Vec2, actors: I, filter: F) -> CsgRegion
    where
        I: IntoIterator<Item = &'a dyn Actor>,
        F: Fn(&dyn Actor) -> bool,
    {
        actors
            .into_iter()
            .filter(|actor| self.in_range(origin, *actor) && filter(*actor))
            .fold(CsgRegion::empty(), |mut shadows, actor| {
                shadows.add(self.shadow_of(origin, actor));
                shadows
            })
    }

    /// Actor shadows of `light`, clipped to its lit area. Empty for a light
    /// that is switched off.
    pub fn light_shadows<'a, I>(&self, light: &LightEmitter, actors: I) -> CsgRegion
    where
        I: IntoIterator<Item = &'a dyn Actor>,
    {
        if !light.is_active() {
            return CsgRegion::empty();
        }
        self.shadows_from(light.center(), actors, |_| true)
            .intersection(light.large_shape().clone())
    }

    /// Paint the actor shadows of every active light onto a viewport overlay.
    ///
    /// Shadows are built in viewport space and filled with a radial gradient
    /// from the configured alpha at the light centre to transparent at the
    /// falloff radius.
    pub fn render<'a, L>(
        &self,
        target: &mut RgbaImage,
        lights: L,
        actors: &[&'a dyn Actor],
        camera: &dyn Camera,
    ) where
        L: IntoIterator<Item = &'a LightEmitter>,
    {
        profile_function!();
        for light in lights.into_iter().filter(|l| l.is_active()) {
            let world_center = light.center();
            let in_range: Vec<&dyn Actor> = actors
                .iter()
                .copied()
                .filter(|actor| self.in_range(world_center, *actor))
                .collect();
            if in_range.is_empty() {
                continue;
            }

            let center = camera.world_to_viewport(world_center);
            let radius = self.config.falloff_radius * camera.zoom();
            let extrusion = self.config.extrusion * camera.zoom();
            let alpha = self.config.gradient_alpha;
            let gradient = |p: Vec2| {
                let t = if radius > 0.0 {
                    (p.distance(center) / radius).min(1.0)
                } else {
                    1.0
                };
                Color::BLACK.with_alpha(alpha * (1.0 - t))
            };

            for actor in in_range {
                let ground = camera.rect_to_viewport(ground_ellipse(actor.bounds()));
                fill_region_with(target, &obstruction(center, ground, extrusion), &gradient);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorSnapshot;
    use crate::camera::ViewportCamera;
    use crate::config::LightDefaults;
    use umbra_geometry::Region;

    /// Overlay alpha the default gradient gives the centre of pixel `(x, y)`.
    fn gradient_alpha_at(x: u32, y: u32, center: Vec2, radius: f32) -> i32 {
        let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        let t = (p.distance(center) / radius).min(1.0);
        (255.0 * 0.3 * (1.0 - t)).round() as i32
    }

    fn render_scene(camera: &ViewportCamera) -> RgbaImage {
        // Ground ellipse (126, 94, 8, 12) sits right of the light centre.
        let light = LightEmitter::new(Rect::new(0.0, 0.0, 200.0, 200.0), LightDefaults::default());
        let actor = ActorSnapshot::new(1, Rect::new(118.0, 52.0, 24.0, 48.0), 0);
        let actors: [&dyn Actor; 1] = [&actor];
        let mut target = RgbaImage::new(256, 200);
        DynamicShadowCaster::default().render(&mut target, [&light], &actors, camera);
        target
    }

    #[test]
    fn test_ground_ellipse() {
        let ground = ground_ellipse(Rect::new(10.0, 20.0, 32.0, 48.0));
        // w = 10, h = 12, centred horizontally, straddling the feet.
        assert_eq!(ground, Rect::new(21.0, 62.0, 10.0, 12.0));
    }

    #[test]
    fn test_obstruction_points_away_from_light() {
        let ground = Rect::new(90.0, 95.0, 20.0, 10.0);
        let shadow = obstruction(Vec2::new(0.0, 100.0), ground, 200.0);

        // Behind the actor, along the ray.
        assert!(shadow.contains(Vec2::new(150.0, 100.0)));
        // Between the light and the actor.
        assert!(!shadow.contains(Vec2::new(50.0, 100.0)));
        // Beyond the extrusion distance.
        assert!(!shadow.contains(Vec2::new(250.0, 100.0)));
    }

    #[test]
    fn test_zero_length_direction_uses_ellipse() {
        let ground = Rect::new(0.0, 0.0, 20.0, 10.0);
        let shadow = obstruction(ground.center(), ground, 200.0);
        assert_eq!(shadow.bounds(), Some(ground));
    }

    #[test]
    fn test_range_excludes_dead_and_distant() {
        let caster = DynamicShadowCaster::default();
        let origin = Vec2::ZERO;
        let near = ActorSnapshot::new(1, Rect::new(-5.0, -5.0, 10.0, 10.0), 0);
        let far = ActorSnapshot::new(2, Rect::new(500.0, 0.0, 10.0, 10.0), 0);

        assert!(caster.in_range(origin, &near));
        assert!(!caster.in_range(origin, &near.dead()));
        assert!(!caster.in_range(origin, &far));
    }

    #[test]
    fn test_render_gradient_fades_at_radius() {
        let image = render_scene(&ViewportCamera::identity());
        let center = Vec2::new(100.0, 100.0);

        let near = image.get_pixel(150, 100);
        assert_eq!(&near.0[..3], &[0, 0, 0]);
        assert!((near[3] as i32 - gradient_alpha_at(150, 100, center, 100.0)).abs() <= 1);
        assert!(image.get_pixel(195, 100)[3] > 0);
        // The tail reaches past the radius but the gradient is spent there.
        assert_eq!(image.get_pixel(210, 100)[3], 0);
        // Outside the shadow.
        assert_eq!(image.get_pixel(150, 30)[3], 0);
        assert_eq!(image.get_pixel(60, 100)[3], 0);
    }

    #[test]
    fn test_render_follows_camera_offset_and_zoom() {
        let camera = ViewportCamera {
            focus: Vec2::new(100.0, 100.0),
            viewport: Vec2::new(100.0, 100.0),
            zoom: 2.0,
        };
        let image = render_scene(&camera);
        // The light centre lands on (50, 50) and the radius doubles.
        let center = Vec2::new(50.0, 50.0);

        let near = image.get_pixel(130, 50);
        assert!((near[3] as i32 - gradient_alpha_at(130, 50, center, 200.0)).abs() <= 1);
        assert!(image.get_pixel(240, 50)[3] > 0);
        assert_eq!(image.get_pixel(130, 100)[3], 0);
    }
}
