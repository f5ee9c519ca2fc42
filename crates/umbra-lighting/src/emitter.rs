//! Light sources.

use crate::color::Color;
use crate::config::{FalloffConfig, LightDefaults};
use std::cell::OnceCell;
use std::hash::{Hash, Hasher};
use umbra_core::math::{Rect, Vec2};
use umbra_geometry::Shape;

/// Outline of a light's lit area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightShapeKind {
    #[default]
    Ellipse,
    Rectangle,
}

impl LightShapeKind {
    /// Case-insensitive lookup of `ellipse` / `rectangle`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ellipse" => Some(Self::Ellipse),
            "rectangle" => Some(Self::Rectangle),
            _ => None,
        }
    }

    /// Like [`parse`](Self::parse), falling back to [`Ellipse`](Self::Ellipse).
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!("Unknown light shape '{}', using ellipse", s);
            Self::default()
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ellipse => "ellipse",
            Self::Rectangle => "rectangle",
        }
    }

    /// Shape of this kind filling `bounds`.
    pub fn shape(self, bounds: Rect) -> Shape {
        match self {
            Self::Ellipse => Shape::ellipse_in(bounds),
            Self::Rectangle => Shape::rect_from(bounds),
        }
    }
}

/// The three nested falloff shapes of a light, `small ⊆ mid ⊆ large`.
#[derive(Debug, Clone, PartialEq)]
pub struct LightBands {
    pub small: Shape,
    pub mid: Shape,
    pub large: Shape,
}

impl LightBands {
    fn build(kind: LightShapeKind, bounds: Rect, radius: f32, band_step: f32) -> Self {
        let step = radius * band_step;
        Self {
            small: kind.shape(bounds.inset(step * 2.0)),
            mid: kind.shape(bounds.inset(step)),
            large: kind.shape(bounds),
        }
    }
}

/// A light-producing entity.
///
/// Switching a light off keeps its configured color and intensity; only
/// [`intensity`](Self::intensity) and [`lit_bands`](Self::lit_bands) report
/// it as dark. Band shapes are derived lazily and dropped on every mutation.
#[derive(Debug, Clone)]
pub struct LightEmitter {
    bounds: Rect,
    shape_kind: LightShapeKind,
    color: Color,
    intensity: u8,
    active: bool,
    band_step: f32,
    bands: OnceCell<LightBands>,
}

impl LightEmitter {
    pub fn new(bounds: Rect, defaults: LightDefaults) -> Self {
        Self {
            bounds,
            shape_kind: defaults.shape,
            color: defaults.color,
            intensity: defaults.intensity,
            active: defaults.active,
            band_step: FalloffConfig::default().band_step,
            bands: OnceCell::new(),
        }
    }

    pub fn with_falloff(mut self, falloff: FalloffConfig) -> Self {
        self.band_step = falloff.band_step;
        self.invalidate();
        self
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn location(&self) -> Vec2 {
        self.bounds.position()
    }

    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }

    /// Half of the shorter side, rounded down.
    pub fn radius(&self) -> f32 {
        (self.bounds.width.min(self.bounds.height) / 2.0).floor().max(0.0)
    }

    pub fn shape_kind(&self) -> LightShapeKind {
        self.shape_kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Effective brightness, zero while the light is switched off.
    pub fn intensity(&self) -> u8 {
        if self.active { self.intensity } else { 0 }
    }

    /// Brightness as configured, regardless of the active flag.
    pub fn configured_intensity(&self) -> u8 {
        self.intensity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    // =========================================================================
    // Switching
    // =========================================================================

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
        tracing::trace!("Light at {:?} toggled to {}", self.bounds.position(), self.active);
    }

    /// Handle a scripted message. `"toggle"` flips the light and answers its
    /// new state; anything else is ignored.
    pub fn send_message(&mut self, message: &str) -> Option<String> {
        if message.trim().eq_ignore_ascii_case("toggle") {
            self.toggle();
            return Some(self.active.to_string());
        }
        None
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.invalidate();
    }

    pub fn set_intensity(&mut self, intensity: u8) {
        self.intensity = intensity;
        self.invalidate();
    }

    pub fn set_shape_kind(&mut self, kind: LightShapeKind) {
        self.shape_kind = kind;
        self.invalidate();
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.bounds = Rect::from_pos_size(self.bounds.position(), size.max(Vec2::ZERO));
        self.invalidate();
    }

    pub fn set_location(&mut self, location: Vec2) {
        self.bounds = Rect::from_pos_size(location, self.bounds.size());
        self.invalidate();
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.set_location(bounds.position());
        self.set_size(bounds.size());
    }

    fn invalidate(&mut self) {
        self.bands = OnceCell::new();
    }

    // =========================================================================
    // Shapes
    // =========================================================================

    /// Falloff shapes, built on first access after a mutation.
    pub fn bands(&self) -> &LightBands {
        self.bands.get_or_init(|| {
            LightBands::build(self.shape_kind, self.bounds, self.radius(), self.band_step)
        })
    }

    /// Falloff shapes of a light that is switched on, `None` otherwise.
    pub fn lit_bands(&self) -> Option<&LightBands> {
        self.active.then(|| self.bands())
    }

    /// The full lit area of the light.
    pub fn large_shape(&self) -> &Shape {
        &self.bands().large
    }

    pub fn mid_shape(&self) -> &Shape {
        &self.bands().mid
    }

    pub fn small_shape(&self) -> &Shape {
        &self.bands().small
    }
}

/// Hashes everything that changes the pixels a light produces.
impl Hash for LightEmitter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_rect(&self.bounds, state);
        self.shape_kind.hash(state);
        self.color.to_rgba_u8().hash(state);
        self.intensity().hash(state);
        self.active.hash(state);
        self.band_step.to_bits().hash(state);
    }
}

pub(crate) fn hash_rect<H: Hasher>(rect: &Rect, state: &mut H) {
    [rect.x, rect.y, rect.width, rect.height]
        .map(f32::to_bits)
        .hash(state);
}
