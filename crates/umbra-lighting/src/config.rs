//! Named defaults for lighting entities and compositors.
//!
//! Every entity type gets its own defaults struct, passed at construction
//! time. [`LightingConfig`] bundles them for an environment.

use crate::color::Color;
use crate::emitter::LightShapeKind;
use crate::shadow::ShadowType;

/// Initial values for a new [`LightEmitter`](crate::LightEmitter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDefaults {
    /// Light color
    pub color: Color,
    /// Brightness in `0..=255`
    pub intensity: u8,
    /// Shape of the lit area
    pub shape: LightShapeKind,
    /// Whether the light starts switched on
    pub active: bool,
}

impl Default for LightDefaults {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 100,
            shape: LightShapeKind::Ellipse,
            active: true,
        }
    }
}

/// Initial values for static shadows and the static shadow layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowDefaults {
    /// Shadow color
    pub color: Color,
    /// Shadow opacity in `0..=255`
    pub alpha: u8,
    /// Extrusion distance
    pub offset: f32,
    /// Direction used when a map object names none or an unknown one
    pub shadow_type: ShadowType,
}

impl Default for ShadowDefaults {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            alpha: 75,
            offset: 10.0,
            shadow_type: ShadowType::NoOffset,
        }
    }
}

/// Initial values for the ambient darkness layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientDefaults {
    pub color: Color,
    /// Darkness opacity in `0..=255`; zero means broad daylight.
    pub alpha: u8,
}

impl Default for AmbientDefaults {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            alpha: 0,
        }
    }
}

/// Parameters of the per-frame actor shadows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicShadowConfig {
    /// Actors farther than this from a light cast no shadow for it.
    pub falloff_radius: f32,
    /// How far the shadow tail is pushed away from the light.
    pub extrusion: f32,
    /// Opacity of the overlay gradient at the light center.
    pub gradient_alpha: f32,
}

impl Default for DynamicShadowConfig {
    fn default() -> Self {
        Self {
            falloff_radius: 100.0,
            extrusion: 200.0,
            gradient_alpha: 0.3,
        }
    }
}

/// Spacing of the three falloff bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalloffConfig {
    /// Band inset as a fraction of the light radius.
    pub band_step: f32,
}

impl Default for FalloffConfig {
    fn default() -> Self {
        Self { band_step: 0.15 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionConfig {
    /// Sight radius of a friendly actor.
    pub radius: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self { radius: 200.0 }
    }
}

/// All lighting configuration of one environment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightingConfig {
    pub light: LightDefaults,
    pub shadow: ShadowDefaults,
    pub ambient: AmbientDefaults,
    pub dynamic: DynamicShadowConfig,
    pub falloff: FalloffConfig,
    pub vision: VisionConfig,
}
