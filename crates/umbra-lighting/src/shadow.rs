//! Static shadows cast by fixed obstructions.
//!
//! A static shadow is an axis-aligned obstruction rectangle extruded
//! downwards by an offset, skewed according to its [`ShadowType`]. The
//! outline of every type comes from a fixed vertex table; the vertex order
//! matters for the region operations applied later.

use crate::config::ShadowDefaults;
use crate::emitter::hash_rect;
use std::cell::OnceCell;
use std::hash::{Hash, Hasher};
use umbra_core::math::{Rect, Vec2};
use umbra_geometry::{Polygon, Shape};

/// Direction of a static shadow's extrusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowType {
    Down,
    DownLeft,
    DownRight,
    Left,
    LeftDown,
    LeftRight,
    RightLeft,
    Right,
    RightDown,
    /// The obstruction rectangle itself, without extrusion.
    #[default]
    NoOffset,
    /// No shadow at all.
    None,
}

/// One vertex as `x + w·W + ox·o`, `y + h·H + oy·o` for an obstruction at
/// `(x, y)` of size `W × H` and offset `o`.
#[derive(Debug, Clone, Copy)]
struct VertexRule {
    w: f32,
    ox: f32,
    h: f32,
    oy: f32,
}

const fn v(w: f32, ox: f32, h: f32, oy: f32) -> VertexRule {
    VertexRule { w, ox, h, oy }
}

const TOP_LEFT: VertexRule = v(0.0, 0.0, 0.0, 0.0);
const TOP_RIGHT: VertexRule = v(1.0, 0.0, 0.0, 0.0);
const BOTTOM_RIGHT: VertexRule = v(1.0, 0.0, 1.0, 0.0);
const BOTTOM_LEFT: VertexRule = v(0.0, 0.0, 1.0, 0.0);

const DOWN: &[VertexRule] = &[TOP_LEFT, TOP_RIGHT, v(1.0, 0.0, 1.0, 1.0), v(0.0, 0.0, 1.0, 1.0)];
const DOWN_LEFT: &[VertexRule] = &[
    TOP_LEFT,
    TOP_RIGHT,
    BOTTOM_RIGHT,
    v(1.0, -0.5, 1.0, 1.0),
    v(0.0, 0.0, 1.0, 1.0),
];
const DOWN_RIGHT: &[VertexRule] = &[
    TOP_LEFT,
    TOP_RIGHT,
    BOTTOM_RIGHT,
    v(1.0, 0.5, 1.0, 1.0),
    v(0.0, 0.0, 1.0, 1.0),
];
const LEFT: &[VertexRule] = &[
    TOP_LEFT,
    TOP_RIGHT,
    BOTTOM_RIGHT,
    v(1.0, -0.5, 1.0, 1.0),
    v(0.0, -0.5, 1.0, 1.0),
    BOTTOM_LEFT,
];
const LEFT_DOWN: &[VertexRule] = &[
    TOP_LEFT,
    TOP_RIGHT,
    BOTTOM_RIGHT,
    v(1.0, 0.0, 1.0, 1.0),
    v(0.0, -0.5, 1.0, 1.0),
    BOTTOM_LEFT,
];
const LEFT_RIGHT: &[VertexRule] = &[
    TOP_LEFT,
    TOP_RIGHT,
    BOTTOM_RIGHT,
    v(1.0, 0.5, 1.0, 1.0),
    v(0.0, -0.5, 1.0, 1.0),
    BOTTOM_LEFT,
];
const RIGHT_LEFT: &[VertexRule] = &[
    TOP_LEFT,
    TOP_RIGHT,
    BOTTOM_RIGHT,
    v(1.0, -0.5, 1.0, 1.0),
    v(0.0, 0.5, 1.0, 1.0),
    BOTTOM_LEFT,
];
const RIGHT: &[VertexRule] = &[
    TOP_LEFT,
    TOP_RIGHT,
    BOTTOM_RIGHT,
    v(1.0, 0.5, 1.0, 1.0),
    v(0.0, 0.5, 1.0, 1.0),
    BOTTOM_LEFT,
];
const RIGHT_DOWN: &[VertexRule] = &[
    TOP_LEFT,
    TOP_RIGHT,
    BOTTOM_RIGHT,
    v(1.0, 0.0, 1.0, 1.0),
    v(0.0, 0.5, 1.0, 1.0),
    BOTTOM_LEFT,
];
const NO_OFFSET: &[VertexRule] = &[TOP_LEFT, TOP_RIGHT, BOTTOM_RIGHT, BOTTOM_LEFT];

impl ShadowType {
    pub const ALL: [ShadowType; 11] = [
        Self::Down,
        Self::DownLeft,
        Self::DownRight,
        Self::Left,
        Self::LeftDown,
        Self::LeftRight,
        Self::RightLeft,
        Self::Right,
        Self::RightDown,
        Self::NoOffset,
        Self::None,
    ];

    /// Map-property name, e.g. `DOWNLEFT`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Down => "DOWN",
            Self::DownLeft => "DOWNLEFT",
            Self::DownRight => "DOWNRIGHT",
            Self::Left => "LEFT",
            Self::LeftDown => "LEFTDOWN",
            Self::LeftRight => "LEFTRIGHT",
            Self::RightLeft => "RIGHTLEFT",
            Self::Right => "RIGHT",
            Self::RightDown => "RIGHTDOWN",
            Self::NoOffset => "NOOFFSET",
            Self::None => "NONE",
        }
    }

    /// Case-insensitive lookup by map-property name. Underscores are ignored,
    /// so `down_left` and `DOWNLEFT` name the same type.
    pub fn parse(s: &str) -> Option<Self> {
        let name: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Like [`parse`](Self::parse), falling back to [`NoOffset`](Self::NoOffset).
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!("Unknown shadow type '{}', using NOOFFSET", s);
            Self::NoOffset
        })
    }

    fn rules(self) -> Option<&'static [VertexRule]> {
        Some(match self {
            Self::Down => DOWN,
            Self::DownLeft => DOWN_LEFT,
            Self::DownRight => DOWN_RIGHT,
            Self::Left => LEFT,
            Self::LeftDown => LEFT_DOWN,
            Self::LeftRight => LEFT_RIGHT,
            Self::RightLeft => RIGHT_LEFT,
            Self::Right => RIGHT,
            Self::RightDown => RIGHT_DOWN,
            Self::NoOffset => NO_OFFSET,
            Self::None => return None,
        })
    }

    /// Outline of the shadow cast by `obstruction`, or `None` for
    /// [`ShadowType::None`].
    pub fn vertices(self, obstruction: Rect, offset: f32) -> Option<Vec<Vec2>> {
        let rules = self.rules()?;
        let origin = obstruction.position();
        let size = obstruction.size();
        Some(
            rules
                .iter()
                .map(|r| {
                    origin
                        + Vec2::new(r.w * size.x + r.ox * offset, r.h * size.y + r.oy * offset)
                })
                .collect(),
        )
    }
}

impl std::fmt::Display for ShadowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed shadow derived from an obstruction rectangle.
///
/// The outline is built on first read and dropped by every setter.
#[derive(Debug, Clone)]
pub struct StaticShadow {
    bounds: Rect,
    shadow_type: ShadowType,
    offset: f32,
    origin: Option<u32>,
    area: OnceCell<Option<Polygon>>,
}

impl StaticShadow {
    pub fn new(bounds: Rect, shadow_type: ShadowType, offset: f32) -> Self {
        Self {
            bounds,
            shadow_type,
            offset,
            origin: None,
            area: OnceCell::new(),
        }
    }

    /// Shadow for `bounds` with the default type and offset.
    pub fn with_defaults(bounds: Rect, defaults: &ShadowDefaults) -> Self {
        Self::new(bounds, defaults.shadow_type, defaults.offset)
    }

    /// Shadow tied to a collision box. It casts nothing until a type is set.
    pub fn from_collision_box(id: u32, bounds: Rect, defaults: &ShadowDefaults) -> Self {
        Self {
            origin: Some(id),
            ..Self::new(bounds, ShadowType::None, defaults.offset)
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn shadow_type(&self) -> ShadowType {
        self.shadow_type
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Id of the collision box this shadow was created from.
    pub fn origin(&self) -> Option<u32> {
        self.origin
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.invalidate();
    }

    pub fn set_location(&mut self, location: Vec2) {
        self.set_bounds(Rect::from_pos_size(location, self.bounds.size()));
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.set_bounds(Rect::from_pos_size(self.bounds.position(), size));
    }

    pub fn set_shadow_type(&mut self, shadow_type: ShadowType) {
        self.shadow_type = shadow_type;
        self.invalidate();
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.area = OnceCell::new();
    }

    // =========================================================================
    // Area
    // =========================================================================

    /// The shadow outline, `None` for [`ShadowType::None`] or a degenerate
    /// obstruction.
    pub fn area(&self) -> Option<&Polygon> {
        self.area.get_or_init(|| self.build_area()).as_ref()
    }

    /// The outline as a [`Shape`].
    pub fn area_shape(&self) -> Option<Shape> {
        self.area().cloned().map(Shape::Polygon)
    }

    /// Bounding box of the outline.
    pub fn area_bounds(&self) -> Option<Rect> {
        self.area().and_then(Polygon::bounds)
    }

    fn build_area(&self) -> Option<Polygon> {
        if self.bounds.is_degenerate() {
            if self.shadow_type != ShadowType::None {
                tracing::debug!("Skipping shadow for degenerate obstruction {:?}", self.bounds);
            }
            return None;
        }
        let points = self.shadow_type.vertices(self.bounds, self.offset)?;
        Some(Polygon::new(points))
    }
}

impl Hash for StaticShadow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_rect(&self.bounds, state);
        self.shadow_type.hash(state);
        self.offset.to_bits().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: Rect = Rect::new(0.0, 0.0, 32.0, 32.0);

    fn points(shadow_type: ShadowType) -> Vec<(f32, f32)> {
        shadow_type
            .vertices(BOX, 10.0)
            .unwrap()
            .into_iter()
            .map(|p| (p.x, p.y))
            .collect()
    }

    #[test]
    fn test_down_vertices() {
        assert_eq!(
            points(ShadowType::Down),
            vec![(0.0, 0.0), (32.0, 0.0), (32.0, 42.0), (0.0, 42.0)]
        );
    }

    #[test]
    fn test_skewed_vertices() {
        assert_eq!(
            points(ShadowType::DownLeft),
            vec![(0.0, 0.0), (32.0, 0.0), (32.0, 32.0), (27.0, 42.0), (0.0, 42.0)]
        );
        assert_eq!(
            points(ShadowType::LeftRight),
            vec![
                (0.0, 0.0),
                (32.0, 0.0),
                (32.0, 32.0),
                (37.0, 42.0),
                (-5.0, 42.0),
                (0.0, 32.0)
            ]
        );
        assert_eq!(
            points(ShadowType::RightDown),
            vec![
                (0.0, 0.0),
                (32.0, 0.0),
                (32.0, 32.0),
                (32.0, 42.0),
                (5.0, 42.0),
                (0.0, 32.0)
            ]
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(ShadowType::parse("downleft"), Some(ShadowType::DownLeft));
        assert_eq!(ShadowType::parse("RIGHT_DOWN"), Some(ShadowType::RightDown));
        assert_eq!(ShadowType::parse_or_default("sideways"), ShadowType::NoOffset);
        for t in ShadowType::ALL {
            assert_eq!(ShadowType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_none_has_no_area() {
        let shadow = StaticShadow::new(BOX, ShadowType::None, 10.0);
        assert!(shadow.area().is_none());
    }

    #[test]
    fn test_degenerate_obstruction_skipped() {
        let shadow = StaticShadow::new(Rect::new(0.0, 0.0, 0.0, 32.0), ShadowType::Down, 10.0);
        assert!(shadow.area().is_none());
    }

    #[test]
    fn test_area_cached_until_mutation() {
        let mut shadow = StaticShadow::new(BOX, ShadowType::Down, 10.0);
        let first = shadow.area().unwrap() as *const Polygon;
        let second = shadow.area().unwrap() as *const Polygon;
        assert!(std::ptr::eq(first, second));

        shadow.set_offset(20.0);
        assert_eq!(shadow.area_bounds(), Some(Rect::new(0.0, 0.0, 32.0, 52.0)));
    }

    #[test]
    fn test_collision_box_shadow_starts_empty() {
        let mut shadow = StaticShadow::from_collision_box(7, BOX, &ShadowDefaults::default());
        assert_eq!(shadow.origin(), Some(7));
        assert!(shadow.area().is_none());

        shadow.set_shadow_type(ShadowType::Down);
        assert!(shadow.area().is_some());
    }
}
