//! Turning map objects into lighting entities.
//!
//! The map loader hands over objects as a kind, a rectangle and a bag of
//! string properties. Malformed colours or numbers are reported; unknown
//! shape kinds and shadow types fall back to their defaults.

use crate::color::Color;
use crate::config::{LightDefaults, ShadowDefaults};
use crate::emitter::{LightEmitter, LightShapeKind};
use crate::error::{LightingError, LightingResult};
use crate::shadow::{ShadowType, StaticShadow};
use std::str::FromStr;
use umbra_core::alloc::HashMap;
use umbra_core::math::Rect;

/// Property names understood by the loaders.
pub mod property {
    pub const LIGHT_COLOR: &str = "lightColor";
    pub const LIGHT_INTENSITY: &str = "lightIntensity";
    pub const LIGHT_SHAPE: &str = "lightShape";
    pub const LIGHT_ACTIVE: &str = "lightActive";
    pub const SHADOW_TYPE: &str = "shadowType";
    pub const SHADOW_OFFSET: &str = "shadowOffset";
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapObjectKind {
    LightSource,
    StaticShadow,
    CollisionBox,
    Other(String),
}

impl MapObjectKind {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "lightsource" | "light" => Self::LightSource,
            "staticshadow" | "shadow" => Self::StaticShadow,
            "collisionbox" => Self::CollisionBox,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LightSource => "LightSource",
            Self::StaticShadow => "StaticShadow",
            Self::CollisionBox => "CollisionBox",
            Self::Other(name) => name,
        }
    }
}

/// A lighting-related object as read from a map file.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub id: u32,
    pub kind: MapObjectKind,
    pub bounds: Rect,
    pub properties: HashMap<String, String>,
}

impl MapObject {
    pub fn new(id: u32, kind: MapObjectKind, bounds: Rect) -> Self {
        Self {
            id,
            kind,
            bounds,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn number<T: FromStr>(&self, key: &str) -> LightingResult<Option<T>> {
        self.property(key)
            .map(|value| {
                value.parse().map_err(|_| LightingError::InvalidNumber {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    fn expect_kind(&self, expected: &[MapObjectKind]) -> LightingResult<()> {
        if expected.contains(&self.kind) {
            return Ok(());
        }
        Err(LightingError::UnexpectedObjectKind {
            expected: expected
                .iter()
                .map(MapObjectKind::as_str)
                .collect::<Vec<_>>()
                .join(" or "),
            found: self.kind.as_str().to_string(),
        })
    }

    /// Build a light from a `LightSource` object.
    pub fn to_light(&self, defaults: LightDefaults) -> LightingResult<LightEmitter> {
        self.expect_kind(&[MapObjectKind::LightSource])?;
        let mut light = LightEmitter::new(self.bounds, defaults);

        if let Some(color) = self.property(property::LIGHT_COLOR) {
            light.set_color(color.parse::<Color>()?);
        }
        if let Some(intensity) = self.number::<i64>(property::LIGHT_INTENSITY)? {
            light.set_intensity(intensity.clamp(0, 255) as u8);
        }
        if let Some(shape) = self.property(property::LIGHT_SHAPE) {
            light.set_shape_kind(LightShapeKind::parse_or_default(shape));
        }
        if let Some(active) = self.property(property::LIGHT_ACTIVE) {
            if active.eq_ignore_ascii_case("false") {
                light.deactivate();
            } else if active.eq_ignore_ascii_case("true") {
                light.activate();
            }
        }
        Ok(light)
    }

    /// Build a static shadow from a `StaticShadow` or `CollisionBox` object.
    ///
    /// Collision boxes cast no shadow unless they name a shadow type.
    pub fn to_shadow(&self, defaults: &ShadowDefaults) -> LightingResult<StaticShadow> {
        self.expect_kind(&[MapObjectKind::StaticShadow, MapObjectKind::CollisionBox])?;
        let mut shadow = match self.kind {
            MapObjectKind::CollisionBox => {
                StaticShadow::from_collision_box(self.id, self.bounds, defaults)
            }
            _ => StaticShadow::with_defaults(self.bounds, defaults),
        };

        if let Some(name) = self.property(property::SHADOW_TYPE) {
            shadow.set_shadow_type(ShadowType::parse_or_default(name));
        }
        if let Some(offset) = self.number::<f32>(property::SHADOW_OFFSET)? {
            shadow.set_offset(offset);
        }
        Ok(shadow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_properties() {
        let object = MapObject::new(1, MapObjectKind::LightSource, Rect::new(0.0, 0.0, 64.0, 64.0))
            .with_property(property::LIGHT_COLOR, "#ff8000")
            .with_property(property::LIGHT_INTENSITY, "300")
            .with_property(property::LIGHT_SHAPE, "rectangle")
            .with_property(property::LIGHT_ACTIVE, "false");
        let light = object.to_light(LightDefaults::default()).unwrap();

        assert_eq!(light.color().to_rgba_u8(), [255, 128, 0, 255]);
        assert_eq!(light.configured_intensity(), 255);
        assert_eq!(light.shape_kind(), LightShapeKind::Rectangle);
        assert!(!light.is_active());
    }

    #[test]
    fn test_bad_values_are_errors() {
        let object = MapObject::new(1, MapObjectKind::LightSource, Rect::new(0.0, 0.0, 8.0, 8.0))
            .with_property(property::LIGHT_INTENSITY, "bright");
        assert_eq!(
            object.to_light(LightDefaults::default()).unwrap_err(),
            LightingError::InvalidNumber {
                key: property::LIGHT_INTENSITY.to_string(),
                value: "bright".to_string(),
            }
        );

        let object = MapObject::new(1, MapObjectKind::LightSource, Rect::new(0.0, 0.0, 8.0, 8.0))
            .with_property(property::LIGHT_COLOR, "orange");
        assert!(matches!(
            object.to_light(LightDefaults::default()),
            Err(LightingError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_unknown_shadow_type_defaults() {
        let object = MapObject::new(4, MapObjectKind::StaticShadow, Rect::new(0.0, 0.0, 8.0, 8.0))
            .with_property(property::SHADOW_TYPE, "diagonal");
        let shadow = object.to_shadow(&ShadowDefaults::default()).unwrap();
        assert_eq!(shadow.shadow_type(), ShadowType::NoOffset);
    }

    #[test]
    fn test_collision_box_shadow() {
        let object = MapObject::new(9, MapObjectKind::parse("CollisionBox"), Rect::new(0.0, 0.0, 8.0, 8.0));
        let shadow = object.to_shadow(&ShadowDefaults::default()).unwrap();
        assert_eq!(shadow.origin(), Some(9));
        assert_eq!(shadow.shadow_type(), ShadowType::None);

        let light = object.to_light(LightDefaults::default());
        assert!(matches!(light, Err(LightingError::UnexpectedObjectKind { .. })));
    }
}
