//! Primitive shapes.
//!
//! Shapes are the leaves of a [`CsgRegion`](crate::CsgRegion): rectangles,
//! axis-aligned ellipses and closed polygons. Each one answers point
//! containment exactly and reports a tight bounding box.

use crate::region::Coverage;
use crate::vector::{ellipse_contains, segment_touches_rect};
use glam::Vec2;
use lyon::algorithms::hit_test::hit_test_path;
use lyon::math::point;
use lyon::path::{FillRule, Path};
use umbra_core::math::Rect;

/// Tolerance handed to lyon when hit testing polygon paths.
const HIT_TOLERANCE: f32 = 0.01;

/// A closed polygon.
///
/// The lyon path used for hit testing is built once on construction.
#[derive(Clone)]
pub struct Polygon {
    points: Vec<Vec2>,
    path: Path,
    bounds: Option<Rect>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        let mut builder = Path::builder();
        if let Some((first, rest)) = points.split_first() {
            builder.begin(point(first.x, first.y));
            for p in rest {
                builder.line_to(point(p.x, p.y));
            }
            builder.end(true);
        }

        // Fewer than three vertices enclose nothing.
        let bounds = if points.len() >= 3 {
            Rect::from_points(&points).filter(|r| !r.is_degenerate())
        } else {
            None
        };

        Self {
            path: builder.build(),
            points,
            bounds,
        }
    }

    /// The vertices in construction order.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// The lyon path backing this polygon.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Closed edges, the last one joining the final vertex to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points
            .iter()
            .copied()
            .zip(self.points.iter().copied().cycle().skip(1))
    }

    /// Exact classification of `rect` against the polygon.
    ///
    /// Without an edge touching the rect the winding number is constant over
    /// it, so its centre decides.
    pub fn coverage(&self, rect: &Rect) -> Coverage {
        if !self.bounds.is_some_and(|b| b.intersects(rect)) {
            return Coverage::Outside;
        }
        let (min, max) = (rect.min(), rect.max());
        if self.edges().any(|(a, b)| segment_touches_rect(a, b, min, max)) {
            return Coverage::Partial;
        }
        if self.contains(rect.center()) {
            Coverage::Inside
        } else {
            Coverage::Outside
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        match self.bounds {
            Some(bounds) if bounds.contains(p) => hit_test_path(
                &point(p.x, p.y),
                self.path.iter(),
                FillRule::NonZero,
                HIT_TOLERANCE,
            ),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Polygon")
            .field("points", &self.points)
            .finish()
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

/// A primitive shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A rectangle.
    Rect {
        /// Top-left position
        position: Vec2,
        /// Size (width, height)
        size: Vec2,
    },
    /// An axis-aligned ellipse.
    Ellipse {
        /// Center point
        center: Vec2,
        /// Radii (x, y)
        radii: Vec2,
    },
    /// A polygon (closed polyline).
    Polygon(Polygon),
}

impl Shape {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a rectangle.
    pub fn rect(position: Vec2, size: Vec2) -> Self {
        Self::Rect { position, size }
    }

    /// Create a rectangle covering `bounds`.
    pub fn rect_from(bounds: Rect) -> Self {
        Self::rect(bounds.position(), bounds.size())
    }

    /// Create an ellipse.
    pub fn ellipse(center: Vec2, radii: Vec2) -> Self {
        Self::Ellipse { center, radii }
    }

    /// Create the ellipse inscribed in `bounds`.
    pub fn ellipse_in(bounds: Rect) -> Self {
        Self::ellipse(bounds.center(), bounds.size() * 0.5)
    }

    /// Create a polygon.
    pub fn polygon(points: Vec<Vec2>) -> Self {
        Self::Polygon(Polygon::new(points))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Tight bounding box, or `None` if the shape encloses no area.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Shape::Rect { position, size } => {
                Some(Rect::from_pos_size(*position, *size)).filter(|r| !r.is_degenerate())
            }
            Shape::Ellipse { center, radii } => {
                Some(Rect::from_min_max(*center - *radii, *center + *radii))
                    .filter(|r| !r.is_degenerate())
            }
            Shape::Polygon(polygon) => polygon.bounds(),
        }
    }

    /// Point containment.
    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            Shape::Rect { position, size } => {
                let rect = Rect::from_pos_size(*position, *size);
                !rect.is_degenerate() && rect.contains(p)
            }
            Shape::Ellipse { center, radii } => ellipse_contains(*center, *radii, p),
            Shape::Polygon(polygon) => polygon.contains(p),
        }
    }

    /// How `rect` relates to the shape.
    ///
    /// `Inside` and `Outside` are exact. A rect sharing only an edge with a
    /// rectangle or polygon is outside.
    pub fn coverage(&self, rect: &Rect) -> Coverage {
        let Some(bounds) = self.bounds().filter(|b| b.intersects(rect)) else {
            return Coverage::Outside;
        };
        let corners = [
            rect.min(),
            Vec2::new(rect.right(), rect.y),
            rect.max(),
            Vec2::new(rect.x, rect.bottom()),
        ];

        match self {
            Shape::Rect { .. } => {
                if bounds.contains(rect.min()) && bounds.contains(rect.max()) {
                    Coverage::Inside
                } else {
                    Coverage::Partial
                }
            }
            Shape::Ellipse { center, radii } => {
                let closest = center.clamp(rect.min(), rect.max());
                if !ellipse_contains(*center, *radii, closest) {
                    Coverage::Outside
                } else if corners.iter().all(|c| ellipse_contains(*center, *radii, *c)) {
                    Coverage::Inside
                } else {
                    Coverage::Partial
                }
            }
            Shape::Polygon(polygon) => polygon.coverage(rect),
        }
    }

    /// Same shape kind, shrunk by `amount` on every side around its center.
    ///
    /// Polygons are returned unchanged.
    pub fn inset(&self, amount: f32) -> Self {
        match self {
            Shape::Rect { position, size } => {
                let rect = Rect::from_pos_size(*position, *size).inset(amount);
                Shape::rect_from(rect)
            }
            Shape::Ellipse { center, radii } => Shape::ellipse(
                *center,
                (*radii - Vec2::splat(amount)).max(Vec2::ZERO),
            ),
            Shape::Polygon(_) => self.clone(),
        }
    }

    /// Check if this shape is a closed area.
    pub fn is_closed(&self) -> bool {
        self.bounds().is_some()
    }
}
