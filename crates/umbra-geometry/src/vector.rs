//! Vector helpers used by the shadow builders.
//!
//! All functions guard against zero-length input instead of dividing by
//! zero; callers receive `None` and skip the dependent step.

use glam::Vec2;

/// Unit vector in the direction of `v`, or `None` when `v` has no length.
pub fn normalize(v: Vec2) -> Option<Vec2> {
    let len = v.length();
    if len == 0.0 || !len.is_finite() {
        return None;
    }
    Some(v / len)
}

/// Counter-clockwise perpendicular `(-y, x)`.
pub fn perpendicular(v: Vec2) -> Vec2 {
    v.perp()
}

/// Point reached by walking `distance` from `start` towards `through`.
///
/// Returns `None` when `start == through`, since the direction is undefined.
pub fn project(start: Vec2, through: Vec2, distance: f32) -> Option<Vec2> {
    normalize(through - start).map(|dir| start + dir * distance)
}

/// Whether `point` lies inside (or on) the axis-aligned ellipse.
pub fn ellipse_contains(center: Vec2, radii: Vec2, point: Vec2) -> bool {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return false;
    }
    let d = (point - center) / radii;
    d.length_squared() <= 1.0
}

/// Whether the segment `a`-`b` touches the closed rect `[min, max]`.
///
/// Liang-Barsky clipping of the segment's parameter range.
pub fn segment_touches_rect(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> bool {
    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zero_is_none() {
        assert_eq!(normalize(Vec2::ZERO), None);
        assert_eq!(normalize(Vec2::new(3.0, 4.0)), Some(Vec2::new(0.6, 0.8)));
    }

    #[test]
    fn test_perpendicular() {
        assert_eq!(perpendicular(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0));
        assert_eq!(perpendicular(Vec2::new(0.0, 1.0)), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_project_along_ray() {
        let p = project(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 200.0).unwrap();
        assert_eq!(p, Vec2::new(200.0, 0.0));
        assert!(project(Vec2::ONE, Vec2::ONE, 5.0).is_none());
    }

    #[test]
    fn test_ellipse_contains() {
        let c = Vec2::new(10.0, 10.0);
        let r = Vec2::new(10.0, 5.0);
        assert!(ellipse_contains(c, r, Vec2::new(19.0, 10.0)));
        assert!(!ellipse_contains(c, r, Vec2::new(10.0, 16.0)));
        assert!(!ellipse_contains(c, Vec2::new(0.0, 5.0), c));
    }

    #[test]
    fn test_segment_touches_rect() {
        let (min, max) = (Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        // Crosses straight through.
        assert!(segment_touches_rect(Vec2::new(-5.0, 5.0), Vec2::new(15.0, 5.0), min, max));
        // Ends inside.
        assert!(segment_touches_rect(Vec2::new(5.0, 5.0), Vec2::new(50.0, 50.0), min, max));
        // Passes the corner on the outside.
        assert!(!segment_touches_rect(Vec2::new(9.0, 14.0), Vec2::new(14.0, 9.0), min, max));
        // Parallel and outside.
        assert!(!segment_touches_rect(Vec2::new(-1.0, 0.0), Vec2::new(-1.0, 10.0), min, max));
    }
}
