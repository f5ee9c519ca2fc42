//! Umbra Lighting - dynamic 2D lights and shadows
//!
//! This crate provides:
//! - Light emitters with three nested falloff bands
//! - Static shadows extruded from map objects in one of eleven directions
//! - Per-frame actor shadows painted with a radial gradient
//! - Two map-sized layers (ambient darkness and static shadows) that are
//!   rebuilt only when their content signature changes
//! - Geometric queries: "is this point lit" and friendly-team vision
//!
//! # Example
//!
//! ```
//! use umbra_core::math::{Rect, Size};
//! use umbra_lighting::{Color, LightEmitter, LightingEnvironment, ShadowType, StaticShadow};
//!
//! let mut env = LightingEnvironment::new("crypt", Size::new(64, 64));
//! env.set_ambient_color(Color::BLACK);
//! env.set_ambient_alpha(220);
//!
//! let mut torch = LightEmitter::new(Rect::new(8.0, 8.0, 48.0, 48.0), env.config().light);
//! torch.set_color(Color::from_hex(0xffcc66));
//! env.add_light(torch);
//! env.add_shadow(StaticShadow::new(Rect::new(0.0, 0.0, 16.0, 8.0), ShadowType::Down, 6.0));
//!
//! let darkness = env.ambient_image();
//! assert_eq!(darkness.dimensions(), (64, 64));
//! ```

pub mod actor;
pub mod ambient;
pub mod cache;
pub mod camera;
pub mod color;
pub mod config;
pub mod dynamic;
pub mod emitter;
pub mod environment;
pub mod error;
pub mod layer;
pub mod map_object;
pub mod query;
mod raster;
pub mod shadow;
pub mod static_layer;

pub use actor::{Actor, ActorSnapshot};
pub use ambient::{AmbientLayer, LitBands};
pub use cache::{CacheStats, RasterCache};
pub use camera::{Camera, ViewportCamera};
pub use color::Color;
pub use config::{
    AmbientDefaults, DynamicShadowConfig, FalloffConfig, LightDefaults, LightingConfig,
    ShadowDefaults, VisionConfig,
};
pub use dynamic::DynamicShadowCaster;
pub use emitter::{LightBands, LightEmitter, LightShapeKind};
pub use environment::{LayerDirty, LightHandle, LightingEnvironment, LoadedObject, ShadowHandle};
pub use error::{LightingError, LightingResult};
pub use layer::LayerInputs;
pub use map_object::{MapObject, MapObjectKind};
pub use query::{LightQuery, VisionQuery};
pub use shadow::{ShadowType, StaticShadow};
pub use static_layer::StaticShadowLayer;
