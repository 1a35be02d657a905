//! Point helpers
//!
//! Points are plain `glam::DVec2` values. This module adds the handful of
//! scalar helpers the polygon kernel is written against.

use glam::DVec2;

/// A 2D point or vector in world units
pub type Point = DVec2;

/// 2D cross product (z component of the 3D cross product)
#[inline]
pub fn cross(a: Point, b: Point) -> f64 {
    a.perp_dot(b)
}

/// Intersect two parametric lines `p1 + t * d1` and `p2 + u * d2`
///
/// Returns `(t, u)` packed into a vector, or `None` if the lines are parallel.
pub fn intersect_lines(p1: Point, d1: Point, p2: Point, d2: Point) -> Option<DVec2> {
    let den = d1.x * d2.y - d1.y * d2.x;
    if den == 0.0 {
        return None;
    }

    let t = ((p2.x - p1.x) * d2.y - (p2.y - p1.y) * d2.x) / den;
    let u = ((p2.x - p1.x) * d1.y - (p2.y - p1.y) * d1.x) / den;
    Some(DVec2::new(t, u))
}

/// Signed distance from `p` to the line through `origin` along `dir`
///
/// Positive on the left of the direction. A zero direction yields the plain
/// distance to `origin`.
pub fn distance_to_line(origin: Point, dir: Point, p: Point) -> f64 {
    let len = dir.length();
    if len == 0.0 {
        return origin.distance(p);
    }
    (dir.x * (p.y - origin.y) - dir.y * (p.x - origin.x)) / len
}

/// `v` rescaled to `length`, or zero if `v` is zero
#[inline]
pub fn with_length(v: Point, length: f64) -> Point {
    v.normalize_or_zero() * length
}

/// Rotate `v` by `angle` radians counter-clockwise
#[inline]
pub fn rotate(v: Point, angle: f64) -> Point {
    DVec2::from_angle(angle).rotate(v)
}

/// Bit pattern of a point, usable as an exact-equality hash key
#[inline]
pub fn bits(p: Point) -> (u64, u64) {
    (p.x.to_bits(), p.y.to_bits())
}
