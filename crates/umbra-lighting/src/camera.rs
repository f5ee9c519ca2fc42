//! World to viewport transform consumed by the overlay renderers.

use umbra_core::math::{Rect, Vec2};

/// Maps world coordinates to viewport pixels.
///
/// The transform must be axis-aligned (translation and uniform zoom).
pub trait Camera {
    fn world_to_viewport(&self, point: Vec2) -> Vec2;

    /// Viewport pixels per world unit.
    fn zoom(&self) -> f32 {
        1.0
    }

    fn rect_to_viewport(&self, rect: Rect) -> Rect {
        Rect::from_min_max(
            self.world_to_viewport(rect.min()),
            self.world_to_viewport(rect.max()),
        )
    }
}

/// A camera looking at `focus`, which lands in the middle of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportCamera {
    pub focus: Vec2,
    pub viewport: Vec2,
    pub zoom: f32,
}

impl ViewportCamera {
    pub fn new(focus: Vec2, viewport: Vec2) -> Self {
        Self {
            focus,
            viewport,
            zoom: 1.0,
        }
    }

    /// A camera whose viewport coincides with world space.
    pub fn identity() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO)
    }
}

impl Camera for ViewportCamera {
    fn world_to_viewport(&self, point: Vec2) -> Vec2 {
        (point - self.focus) * self.zoom + self.viewport * 0.5
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }
}
