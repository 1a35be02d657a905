//! Voronoi cell construction from Delaunay triangulation
//!
//! Constructs Voronoi cells by computing circumcenters of Delaunay triangles
//! (via `spade`) and ordering them around each seed point. Each circumcenter
//! is computed once and shared by every cell touching it, so neighbouring
//! cells share bit-identical vertices.

use std::collections::HashMap;

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{DelaunayTriangulation, Point2, Triangulation as _};

use crate::error::{CityError, Result};
use crate::geom::{Point, Polygon};

/// Axis-aligned rectangle the tessellation is clipped to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower-left corner
    pub min: Point,
    /// Upper-right corner
    pub max: Point,
}

impl Bounds {
    /// Square of half-size `half` centred on the origin
    pub fn square(half: f64) -> Self {
        Self {
            min: Point::splat(-half),
            max: Point::splat(half),
        }
    }

    /// Whether `p` lies inside or on the boundary
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

/// Build the Voronoi cell of every seed, clipped to `bounds`
///
/// Returns one counter-clockwise polygon per input point, in input order.
/// A cell that vanishes under clipping comes back empty.
///
/// # Arguments
///
/// * `points` - Seed points, all strictly inside `bounds`
/// * `bounds` - Clipping rectangle
///
/// # Errors
///
/// Returns `Tessellation` if the triangulation rejects a seed (NaN or
/// out-of-range coordinates).
pub fn tessellate(points: &[Point], bounds: Bounds) -> Result<Vec<Polygon>> {
    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();

    let handles = points
        .iter()
        .map(|p| insert(&mut triangulation, *p))
        .collect::<Result<Vec<FixedVertexHandle>>>()?;

    // Frame corners keep every seed cell bounded
    for corner in bounds.corners() {
        insert(&mut triangulation, corner)?;
    }

    let circumcenters: HashMap<FixedFaceHandle<InnerTag>, Point> = triangulation
        .inner_faces()
        .map(|face| {
            let [a, b, c] = face.vertices().map(|v| to_point(v.position()));
            (face.fix(), circumcenter(a, b, c))
        })
        .collect();

    let cells = handles
        .iter()
        .zip(points)
        .map(|(&handle, &seed)| {
            let mut vertices: Vec<Point> = triangulation
                .vertex(handle)
                .out_edges()
                .filter_map(|edge| edge.face().as_inner())
                .filter_map(|face| circumcenters.get(&face.fix()).copied())
                .collect();

            order_around(&mut vertices, seed);
            vertices.dedup();
            Polygon::new(clip(vertices, &bounds)).dedup()
        })
        .collect();

    Ok(cells)
}

fn insert(
    triangulation: &mut DelaunayTriangulation<Point2<f64>>,
    p: Point,
) -> Result<FixedVertexHandle> {
    triangulation
        .insert(Point2::new(p.x, p.y))
        .map_err(|e| CityError::Tessellation(format!("cannot insert ({}, {}): {:?}", p.x, p.y, e)))
}

#[inline]
fn to_point(p: Point2<f64>) -> Point {
    Point::new(p.x, p.y)
}

/// Circumcenter of a triangle, or its centroid if the triangle is flat
fn circumcenter(a: Point, b: Point, c: Point) -> Point {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d == 0.0 {
        return (a + b + c) / 3.0;
    }

    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    Point::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    )
}

/// Sort cell vertices counter-clockwise around their seed
fn order_around(vertices: &mut [Point], seed: Point) {
    vertices.sort_by(|a, b| {
        let aa = (a.y - seed.y).atan2(a.x - seed.x);
        let ab = (b.y - seed.y).atan2(b.x - seed.x);
        aa.total_cmp(&ab)
    });
}

/// One side of the clipping rectangle
#[derive(Clone, Copy)]
struct ClipPlane {
    axis: usize,
    value: f64,
    keep_greater: bool,
}

impl ClipPlane {
    fn inside(&self, p: Point) -> bool {
        if self.keep_greater {
            p[self.axis] >= self.value
        } else {
            p[self.axis] <= self.value
        }
    }

    /// Crossing of segment `a-b` with the plane
    ///
    /// Endpoints are put in a canonical order first so that the two cells
    /// sharing the segment compute the same bits.
    fn crossing(&self, a: Point, b: Point) -> Point {
        let (p, q) = if (a.x, a.y) <= (b.x, b.y) { (a, b) } else { (b, a) };
        let t = (self.value - p[self.axis]) / (q[self.axis] - p[self.axis]);
        let mut r = p + (q - p) * t;
        r[self.axis] = self.value;
        r
    }
}

/// Sutherland–Hodgman clipping of a convex cell against `bounds`
fn clip(mut cell: Vec<Point>, bounds: &Bounds) -> Vec<Point> {
    let planes = [
        ClipPlane { axis: 0, value: bounds.min.x, keep_greater: true },
        ClipPlane { axis: 0, value: bounds.max.x, keep_greater: false },
        ClipPlane { axis: 1, value: bounds.min.y, keep_greater: true },
        ClipPlane { axis: 1, value: bounds.max.y, keep_greater: false },
    ];

    for plane in planes {
        if cell.is_empty() {
            break;
        }
        let input = std::mem::take(&mut cell);
        let len = input.len();
        for i in 0..len {
            let current = input[i];
            let prev = input[(i + len - 1) % len];
            match (plane.inside(prev), plane.inside(current)) {
                (true, true) => cell.push(current),
                (true, false) => cell.push(plane.crossing(prev, current)),
                (false, true) => {
                    cell.push(plane.crossing(prev, current));
                    cell.push(current);
                }
                (false, false) => {}
            }
        }
    }

    cell
}
