//! Umbra Geometry - 2D shapes and boolean regions
//!
//! This crate provides:
//! - Vector helpers (normalize, perpendicular, projection along a ray)
//! - Shape primitives (rectangles, ellipses, polygons)
//! - The [`Region`] trait and a CSG implementation for union, difference
//!   and intersection
//!
//! # Example
//!
//! ```
//! use umbra_core::math::{Rect, Vec2};
//! use umbra_geometry::*;
//!
//! let light = Shape::ellipse_in(Rect::new(0.0, 0.0, 100.0, 100.0));
//! let wall = Shape::rect_from(Rect::new(60.0, 0.0, 40.0, 100.0));
//!
//! let lit = CsgRegion::from(light).difference(wall);
//! assert!(lit.contains(Vec2::new(50.0, 50.0)));
//! assert!(!lit.contains(Vec2::new(70.0, 50.0)));
//! ```

mod region;
mod shape;
pub mod vector;

pub use region::{Coverage, CsgRegion, Region};
pub use shape::{Polygon, Shape};
