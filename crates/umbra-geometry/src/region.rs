//! Boolean regions.
//!
//! Lighting composes its geometry out of unions, differences and
//! intersections of primitive [`Shape`]s. The [`Region`] trait is the seam the
//! rest of the engine talks to; [`CsgRegion`] implements it as a small
//! constructive solid geometry tree evaluated by exact point classification.
//!
//! ```
//! use umbra_core::math::{Rect, Vec2};
//! use umbra_geometry::{CsgRegion, Region, Shape};
//!
//! let mut lit = CsgRegion::from(Shape::ellipse(Vec2::new(50.0, 50.0), Vec2::splat(40.0)));
//! lit.subtract(Shape::rect_from(Rect::new(50.0, 0.0, 100.0, 100.0)));
//!
//! assert!(lit.contains(Vec2::new(30.0, 50.0)));
//! assert!(!lit.contains(Vec2::new(70.0, 50.0)));
//! ```

use crate::shape::Shape;
use glam::Vec2;
use umbra_core::math::Rect;

/// Cells at or below this size on both axes stop subdividing.
const MIN_CELL: f32 = 0.125;

/// How a rect relates to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// No interior point of the rect is in the region.
    Outside,
    /// The whole rect is in the region.
    Inside,
    /// Unknown or mixed.
    Partial,
}

/// A 2D area that can answer point and rectangle queries.
pub trait Region {
    /// Whether `point` lies inside the region.
    fn contains(&self, point: Vec2) -> bool;

    /// A rect enclosing the region, or `None` if it is known to be empty.
    ///
    /// The bounds may be larger than the region itself after subtraction.
    fn bounds(&self) -> Option<Rect>;

    /// Classify `rect`. `Partial` is always a valid answer.
    fn coverage(&self, rect: &Rect) -> Coverage {
        match self.bounds() {
            Some(bounds) if bounds.intersects(rect) => Coverage::Partial,
            _ => Coverage::Outside,
        }
    }

    /// Whether the region overlaps `rect`.
    ///
    /// Never misses an overlap. Boundaries closer than a fraction of a unit
    /// may report one that is not there.
    fn intersects(&self, rect: &Rect) -> bool {
        overlaps(self, rect)
    }

    /// True when the region certainly contains nothing.
    fn is_empty(&self) -> bool {
        self.bounds().is_none()
    }
}

/// Overlap test by subdividing `rect` until each cell is classified.
fn overlaps<R: Region + ?Sized>(region: &R, rect: &Rect) -> bool {
    let Some(area) = region.bounds().and_then(|b| b.intersection(rect)) else {
        return false;
    };

    match region.coverage(&area) {
        Coverage::Outside => false,
        Coverage::Inside => true,
        Coverage::Partial => {
            if region.contains(area.center()) {
                return true;
            }
            if area.width <= MIN_CELL && area.height <= MIN_CELL {
                return true;
            }
            let (first, second) = if area.width >= area.height {
                let half = area.width * 0.5;
                (
                    Rect::new(area.x, area.y, half, area.height),
                    Rect::new(area.x + half, area.y, area.width - half, area.height),
                )
            } else {
                let half = area.height * 0.5;
                (
                    Rect::new(area.x, area.y, area.width, half),
                    Rect::new(area.x, area.y + half, area.width, area.height - half),
                )
            };
            overlaps(region, &first) || overlaps(region, &second)
        }
    }
}

impl Region for Shape {
    fn contains(&self, point: Vec2) -> bool {
        Shape::contains(self, point)
    }

    fn bounds(&self) -> Option<Rect> {
        Shape::bounds(self)
    }

    fn coverage(&self, rect: &Rect) -> Coverage {
        Shape::coverage(self, rect)
    }

    fn intersects(&self, rect: &Rect) -> bool {
        Shape::coverage(self, rect) != Coverage::Outside
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Node {
    #[default]
    Empty,
    Shape(Shape),
    Union(Vec<CsgRegion>),
    Intersection(Box<CsgRegion>, Box<CsgRegion>),
    Difference(Box<CsgRegion>, Box<CsgRegion>),
}

/// A region built from shapes with union, difference and intersection.
///
/// Operations whose operands cannot overlap are folded away on the spot, so
/// subtracting a far-away shadow leaves the tree untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CsgRegion {
    node: Node,
    bounds: Option<Rect>,
}

impl CsgRegion {
    /// The empty region.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Region covering a rect.
    pub fn from_rect(rect: Rect) -> Self {
        Self::from(Shape::rect_from(rect))
    }

    // =========================================================================
    // In-place operations
    // =========================================================================

    /// Union `other` into this region.
    pub fn add(&mut self, other: impl Into<CsgRegion>) {
        let other = other.into();
        let Some(other_bounds) = other.bounds else {
            return;
        };
        let Some(bounds) = self.bounds else {
            *self = other;
            return;
        };

        self.bounds = Some(bounds.union(&other_bounds));
        match &mut self.node {
            Node::Union(children) => match other.node {
                Node::Union(more) => children.extend(more),
                _ => children.push(other),
            },
            node => {
                let previous = CsgRegion {
                    node: std::mem::take(node),
                    bounds: Some(bounds),
                };
                *node = Node::Union(vec![previous, other]);
            }
        }
    }

    /// Remove `other` from this region.
    pub fn subtract(&mut self, other: impl Into<CsgRegion>) {
        let other = other.into();
        let (Some(bounds), Some(other_bounds)) = (self.bounds, other.bounds) else {
            return;
        };
        if !bounds.intersects(&other_bounds) {
            return;
        }

        let previous = std::mem::take(self);
        *self = CsgRegion {
            node: Node::Difference(Box::new(previous), Box::new(other)),
            bounds: Some(bounds),
        };
    }

    /// Keep only the part of this region that also lies in `other`.
    pub fn intersect(&mut self, other: impl Into<CsgRegion>) {
        let other = other.into();
        let overlap = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => a.intersection(&b),
            _ => None,
        };
        let Some(overlap) = overlap else {
            *self = Self::empty();
            return;
        };

        let previous = std::mem::take(self);
        *self = CsgRegion {
            node: Node::Intersection(Box::new(previous), Box::new(other)),
            bounds: Some(overlap),
        };
    }

    // =========================================================================
    // Builder operations
    // =========================================================================

    pub fn union(mut self, other: impl Into<CsgRegion>) -> Self {
        self.add(other);
        self
    }

    pub fn difference(mut self, other: impl Into<CsgRegion>) -> Self {
        self.subtract(other);
        self
    }

    pub fn intersection(mut self, other: impl Into<CsgRegion>) -> Self {
        self.intersect(other);
        self
    }
}

impl From<Shape> for CsgRegion {
    fn from(shape: Shape) -> Self {
        match shape.bounds() {
            Some(bounds) => Self {
                node: Node::Shape(shape),
                bounds: Some(bounds),
            },
            None => Self::empty(),
        }
    }
}

impl From<&CsgRegion> for CsgRegion {
    fn from(region: &CsgRegion) -> Self {
        region.clone()
    }
}

impl Region for CsgRegion {
    fn contains(&self, point: Vec2) -> bool {
        match self.bounds {
            Some(bounds) if bounds.contains(point) => {}
            _ => return false,
        }

        match &self.node {
            Node::Empty => false,
            Node::Shape(shape) => shape.contains(point),
            Node::Union(children) => children.iter().any(|c| c.contains(point)),
            Node::Intersection(a, b) => a.contains(point) && b.contains(point),
            Node::Difference(a, b) => a.contains(point) && !b.contains(point),
        }
    }

    fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn coverage(&self, rect: &Rect) -> Coverage {
        if !self.bounds.is_some_and(|b| b.intersects(rect)) {
            return Coverage::Outside;
        }

        match &self.node {
            Node::Empty => Coverage::Outside,
            Node::Shape(shape) => shape.coverage(rect),
            Node::Union(children) => {
                let mut all_outside = true;
                for child in children {
                    match child.coverage(rect) {
                        Coverage::Inside => return Coverage::Inside,
                        Coverage::Partial => all_outside = false,
                        Coverage::Outside => {}
                    }
                }
                if all_outside {
                    Coverage::Outside
                } else {
                    Coverage::Partial
                }
            }
            Node::Intersection(a, b) => match (a.coverage(rect), b.coverage(rect)) {
                (Coverage::Outside, _) | (_, Coverage::Outside) => Coverage::Outside,
                (Coverage::Inside, Coverage::Inside) => Coverage::Inside,
                _ => Coverage::Partial,
            },
            Node::Difference(a, b) => match a.coverage(rect) {
                Coverage::Outside => Coverage::Outside,
                inner => match (inner, b.coverage(rect)) {
                    (_, Coverage::Inside) => Coverage::Outside,
                    (Coverage::Inside, Coverage::Outside) => Coverage::Inside,
                    _ => Coverage::Partial,
                },
            },
        }
    }
}
