//! Boolean spatial queries over the lighting geometry.
//!
//! Both queries answer `contains` / `intersects` through [`Region`] and
//! never touch the raster path, so fog-of-war and visibility checks stay
//! cheap even while the layers are dirty.

use crate::actor::Actor;
use crate::ambient::lit_bands;
use crate::config::VisionConfig;
use crate::dynamic::DynamicShadowCaster;
use crate::emitter::LightEmitter;
use crate::shadow::StaticShadow;
use umbra_core::math::{Rect, Size, Vec2};
use umbra_geometry::{Coverage, CsgRegion, Region, Shape};

/// Area lit by any active light, after static and actor shadows.
#[derive(Debug, Clone)]
pub struct LightQuery {
    region: CsgRegion,
}

impl LightQuery {
    pub fn new(
        lights: &[&LightEmitter],
        shadows: &[&StaticShadow],
        actors: &[&dyn Actor],
        caster: &DynamicShadowCaster,
    ) -> Self {
        let mut region = CsgRegion::empty();
        for light in lights {
            let Some(bands) = lit_bands(light, shadows) else {
                continue;
            };
            let actor_shadows = caster.light_shadows(light, actors.iter().copied());
            region.add(bands.large.difference(actor_shadows));
        }
        Self { region }
    }

    pub fn region(&self) -> &CsgRegion {
        &self.region
    }
}

impl Region for LightQuery {
    fn contains(&self, point: Vec2) -> bool {
        self.region.contains(point)
    }

    fn bounds(&self) -> Option<Rect> {
        self.region.bounds()
    }

    fn coverage(&self, rect: &Rect) -> Coverage {
        self.region.coverage(rect)
    }

    fn intersects(&self, rect: &Rect) -> bool {
        self.region.intersects(rect)
    }
}

/// What one actor and its allies can see.
///
/// The union of the sight circles of every actor friendly to the viewer,
/// each minus the shadows that other allies near its centre cast.
#[derive(Debug, Clone)]
pub struct VisionQuery {
    viewer: u64,
    region: CsgRegion,
}

impl VisionQuery {
    pub fn new(
        viewer: &dyn Actor,
        actors: &[&dyn Actor],
        config: &VisionConfig,
        caster: &DynamicShadowCaster,
    ) -> Self {
        let mut region = CsgRegion::empty();
        let allies = actors
            .iter()
            .copied()
            .filter(|actor| actor.is_friendly(viewer) && actor.id() != viewer.id());

        for owner in std::iter::once(viewer).chain(allies) {
            let center = owner.center();
            let sight = Shape::ellipse(center, Vec2::splat(config.radius));
            let blockers = caster.shadows_from(center, actors.iter().copied(), |actor| {
                actor.id() != viewer.id() && actor.id() != owner.id() && actor.is_friendly(viewer)
            });
            region.add(CsgRegion::from(sight).difference(blockers));
        }

        Self {
            viewer: viewer.id(),
            region,
        }
    }

    pub fn viewer(&self) -> u64 {
        self.viewer
    }

    pub fn region(&self) -> &CsgRegion {
        &self.region
    }

    /// The part of the map nobody on the viewer's side can see.
    pub fn fog_of_war(&self, map: Size) -> CsgRegion {
        CsgRegion::from_rect(map.to_rect()).difference(&self.region)
    }
}

impl Region for VisionQuery {
    fn contains(&self, point: Vec2) -> bool {
        self.region.contains(point)
    }

    fn bounds(&self) -> Option<Rect> {
        self.region.bounds()
    }

    fn coverage(&self, rect: &Rect) -> Coverage {
        self.region.coverage(rect)
    }

    fn intersects(&self, rect: &Rect) -> bool {
        self.region.intersects(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorSnapshot;
    use crate::config::LightDefaults;

    #[test]
    fn test_inactive_light_lights_nothing() {
        let mut light = LightEmitter::new(Rect::new(0.0, 0.0, 50.0, 50.0), LightDefaults::default());
        light.deactivate();
        let query = LightQuery::new(&[&light], &[], &[], &DynamicShadowCaster::default());
        assert!(!query.contains(Vec2::new(25.0, 25.0)));
        assert!(query.is_empty());
    }

    #[test]
    fn test_actor_shadows_light() {
        let light = LightEmitter::new(Rect::new(0.0, 0.0, 200.0, 200.0), LightDefaults::default());
        // Feet at (130, 100), well inside the falloff radius of the centre.
        let actor = ActorSnapshot::new(1, Rect::new(118.0, 52.0, 24.0, 48.0), 0);
        let actors: [&dyn Actor; 1] = [&actor];
        let query = LightQuery::new(&[&light], &[], &actors, &DynamicShadowCaster::default());

        assert!(query.contains(Vec2::new(60.0, 100.0)));
        assert!(!query.contains(Vec2::new(170.0, 100.0)));
    }

    #[test]
    fn test_vision_includes_allies_only() {
        let viewer = ActorSnapshot::new(1, Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        let ally = ActorSnapshot::new(2, Rect::new(1000.0, 0.0, 10.0, 10.0), 0);
        let enemy = ActorSnapshot::new(3, Rect::new(0.0, 1000.0, 10.0, 10.0), 1);
        let actors: [&dyn Actor; 3] = [&viewer, &ally, &enemy];

        let vision = VisionQuery::new(
            &viewer,
            &actors,
            &VisionConfig::default(),
            &DynamicShadowCaster::default(),
        );
        assert!(vision.contains(Vec2::new(5.0, 5.0)));
        assert!(vision.contains(Vec2::new(1005.0, 5.0)));
        assert!(!vision.contains(Vec2::new(5.0, 1005.0)));

        let fog = vision.fog_of_war(Size::new(2000, 2000));
        assert!(fog.contains(Vec2::new(5.0, 1005.0)));
        assert!(!fog.contains(Vec2::new(5.0, 5.0)));
    }
}
