//! Polygon value type and the geometric kernel
//!
//! A polygon is an ordered cycle of points with an implicit closing edge from
//! the last vertex back to the first. Insertion order is the winding order:
//! counter-clockwise polygons have a positive [`Polygon::square`], and the
//! inward offsets of [`Polygon::shrink`] and [`Polygon::buffer`] assume it.
//!
//! Lookups by point ([`Polygon::contains`], [`Polygon::find_edge`]) use exact
//! coordinate equality.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::PI;

use super::point::{cross, intersect_lines, rotate, with_length, Point};

/// Intersections closer than this to an edge end are ignored by `buffer`
const DELTA: f64 = 0.000_001;

/// Ordered cycle of vertices
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    /// Vertices in winding order
    pub vertices: Vec<Point>,
}

impl From<Vec<Point>> for Polygon {
    fn from(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }
}

impl Polygon {
    /// Create a polygon from its vertices
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle centred on the origin
    pub fn rect(w: f64, h: f64) -> Self {
        Self::new(vec![
            Point::new(-w / 2.0, -h / 2.0),
            Point::new(w / 2.0, -h / 2.0),
            Point::new(w / 2.0, h / 2.0),
            Point::new(-w / 2.0, h / 2.0),
        ])
    }

    /// Regular `n`-gon of circumradius `r` centred on the origin
    pub fn regular(n: usize, r: f64) -> Self {
        Self::new(
            (0..n)
                .map(|i| {
                    let a = i as f64 / n as f64 * PI * 2.0;
                    Point::new(r * a.cos(), r * a.sin())
                })
                .collect(),
        )
    }

    /// Sixteen-sided approximation of a circle
    pub fn circle(r: f64) -> Self {
        Self::regular(16, r)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex at `i`, wrapping around the cycle
    #[inline]
    pub fn at(&self, i: usize) -> Point {
        self.vertices[i % self.vertices.len()]
    }

    /// Iterate over edges as `(v0, v1)` pairs, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let len = self.vertices.len();
        (0..len).map(move |i| (self.vertices[i], self.vertices[(i + 1) % len]))
    }

    /// Signed area (positive for counter-clockwise winding)
    pub fn square(&self) -> f64 {
        self.edges().map(|(v0, v1)| cross(v0, v1)).sum::<f64>() * 0.5
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(v0, v1)| v0.distance(v1)).sum()
    }

    /// `4π · area / perimeter²`: 1 for a circle, smaller for elongated shapes
    pub fn compactness(&self) -> f64 {
        let p = self.perimeter();
        if p == 0.0 {
            return 0.0;
        }
        4.0 * PI * self.square() / (p * p)
    }

    /// Average of the vertices
    pub fn center(&self) -> Point {
        if self.vertices.is_empty() {
            return Point::ZERO;
        }
        self.vertices.iter().copied().sum::<Point>() / self.vertices.len() as f64
    }

    /// Area-weighted centroid
    ///
    /// Falls back to [`Polygon::center`] for polygons with zero area.
    pub fn centroid(&self) -> Point {
        let mut a = 0.0;
        let mut c = Point::ZERO;
        for (v0, v1) in self.edges() {
            let f = cross(v0, v1);
            a += f;
            c += (v0 + v1) * f;
        }
        if a == 0.0 {
            return self.center();
        }
        c / (3.0 * a)
    }

    /// Index of the first vertex exactly equal to `v`
    pub fn index_of(&self, v: Point) -> Option<usize> {
        self.vertices.iter().position(|&p| p == v)
    }

    pub fn contains(&self, v: Point) -> bool {
        self.index_of(v).is_some()
    }

    /// Index of the edge `a → b`, if the polygon has it in this orientation
    pub fn find_edge(&self, a: Point, b: Point) -> Option<usize> {
        let i = self.index_of(a)?;
        (self.at(i + 1) == b).then_some(i)
    }

    /// Vector of the edge starting at vertex `i`
    pub fn vector_at(&self, i: usize) -> Point {
        self.at(i + 1) - self.at(i)
    }

    /// Index of the longest edge (its first vertex); the first one wins ties
    pub fn longest_edge(&self) -> Option<usize> {
        let mut best = None;
        let mut length = -1.0;
        for i in 0..self.len() {
            let len = self.vector_at(i).length();
            if len > length {
                length = len;
                best = Some(i);
            }
        }
        best
    }

    /// Minimum distance from `p` to any vertex
    pub fn distance(&self, p: Point) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.distance(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Translate in place
    pub fn offset(&mut self, d: Point) {
        for v in &mut self.vertices {
            *v += d;
        }
    }

    /// Rotate in place around the origin
    pub fn rotate(&mut self, angle: f64) {
        for v in &mut self.vertices {
            *v = rotate(*v, angle);
        }
    }

    /// Whether the turn at vertex `i` is to the left
    pub fn is_convex_vertex_at(&self, i: usize) -> bool {
        let len = self.len();
        let v0 = self.vertices[(i + len - 1) % len];
        let v1 = self.vertices[i % len];
        let v2 = self.vertices[(i + 1) % len];
        cross(v1 - v0, v2 - v1) > 0.0
    }

    pub fn is_convex(&self) -> bool {
        (0..self.len()).all(|i| self.is_convex_vertex_at(i))
    }

    /// Laplacian smoothing of one vertex: `(prev + f·v + next) / (2 + f)`
    pub fn smooth_vertex_at(&self, i: usize, f: f64) -> Point {
        let len = self.len();
        let prev = self.vertices[(i + len - 1) % len];
        let next = self.vertices[(i + 1) % len];
        (prev + self.vertices[i] * f + next) / (2.0 + f)
    }

    /// Smooth every vertex at once, each from the unsmoothed neighbours
    pub fn smooth_vertex_eq(&self, f: f64) -> Polygon {
        Polygon::new((0..self.len()).map(|i| self.smooth_vertex_at(i, f)).collect())
    }

    /// Inverse-distance weights of `p` against every vertex, summing to 1
    pub fn interpolate(&self, p: Point) -> Vec<f64> {
        if let Some(i) = self.index_of(p) {
            let mut weights = vec![0.0; self.len()];
            weights[i] = 1.0;
            return weights;
        }

        let inv: Vec<f64> = self.vertices.iter().map(|v| 1.0 / v.distance(p)).collect();
        let sum: f64 = inv.iter().sum();
        inv.into_iter().map(|d| d / sum).collect()
    }

    /// Whether the two polygons share an edge (in either orientation)
    pub fn borders(&self, other: &Polygon) -> bool {
        let len2 = other.len();
        for i in 0..self.len() {
            if let Some(j) = other.index_of(self.vertices[i]) {
                let next = self.at(i + 1);
                if next == other.vertices[(j + 1) % len2]
                    || next == other.vertices[(j + len2 - 1) % len2]
                {
                    return true;
                }
            }
        }
        false
    }

    /// Remove the flattest vertex until `n` vertices remain
    pub fn simplify(&mut self, n: usize) {
        while self.len() > n.max(3) {
            let len = self.len();
            let mut result = 0;
            let mut min = f64::INFINITY;
            for i in 0..len {
                let a = self.vertices[(i + len - 1) % len];
                let b = self.vertices[i];
                let c = self.vertices[(i + 1) % len];
                let measure =
                    (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)).abs();
                if measure < min {
                    result = i;
                    min = measure;
                }
            }
            self.vertices.remove(result);
        }
    }

    /// Split along the chord between vertices `i1` and `i2`
    ///
    /// Both halves keep the chord endpoints.
    pub fn split(&self, i1: usize, i2: usize) -> [Polygon; 2] {
        let (i1, i2) = if i1 > i2 { (i2, i1) } else { (i1, i2) };
        let part1 = self.vertices[i1..=i2].to_vec();
        let part2 = self.vertices[i2..]
            .iter()
            .chain(&self.vertices[..=i1])
            .copied()
            .collect();
        [Polygon::new(part1), Polygon::new(part2)]
    }

    /// Cut by the infinite line through `p1` and `p2`
    ///
    /// Only a line crossing exactly two edges splits the polygon; otherwise the
    /// polygon comes back unchanged as the only element. The half on the left
    /// of `p1 → p2` comes first. A positive `gap` peels `gap / 2` off each half
    /// along the cut.
    pub fn cut(&self, p1: Point, p2: Point, gap: f64) -> Vec<Polygon> {
        let dir = p2 - p1;
        let len = self.len();

        let mut hits = [(0usize, 0.0f64); 2];
        let mut count = 0;
        for i in 0..len {
            let v0 = self.vertices[i];
            let v1 = self.vertices[(i + 1) % len];
            if let Some(tu) = intersect_lines(p1, dir, v0, v1 - v0) {
                if (0.0..=1.0).contains(&tu.y) {
                    if count < 2 {
                        hits[count] = (i, tu.x);
                    }
                    count += 1;
                }
            }
        }

        if count != 2 {
            return vec![self.clone()];
        }

        let (edge1, ratio1) = hits[0];
        let (edge2, ratio2) = hits[1];
        let point1 = p1 + dir * ratio1;
        let point2 = p1 + dir * ratio2;

        let mut half1 = Vec::with_capacity(edge2 - edge1 + 2);
        half1.push(point1);
        half1.extend_from_slice(&self.vertices[edge1 + 1..=edge2]);
        half1.push(point2);

        let mut half2 = Vec::with_capacity(len - (edge2 - edge1) + 2);
        half2.push(point2);
        half2.extend_from_slice(&self.vertices[edge2 + 1..]);
        half2.extend_from_slice(&self.vertices[..=edge1]);
        half2.push(point1);

        let mut half1 = Polygon::new(half1);
        let mut half2 = Polygon::new(half2);
        if gap > 0.0 {
            half1 = half1.peel(half1.len() - 1, gap / 2.0);
            half2 = half2.peel(half2.len() - 1, gap / 2.0);
        }

        if cross(dir, self.vector_at(edge1)) > 0.0 {
            vec![half1, half2]
        } else {
            vec![half2, half1]
        }
    }

    /// Move the edge starting at vertex `i` inward by `d`
    pub fn peel(&self, i: usize, d: f64) -> Polygon {
        let v1 = self.at(i);
        let v2 = self.at(i + 1);
        let n = with_length((v2 - v1).perp(), d);
        self.cut(v1 + n, v2 + n, 0.0).swap_remove(0)
    }

    /// Inset each edge of a convex polygon by its own distance
    ///
    /// `d[i]` is the inset of the edge starting at vertex `i`.
    pub fn shrink(&self, d: &[f64]) -> Polygon {
        let mut q = self.clone();
        for (i, (v0, v1)) in self.edges().enumerate() {
            let dd = d.get(i).copied().unwrap_or(0.0);
            if dd > 0.0 {
                let n = with_length((v1 - v0).perp(), dd);
                q = q.cut(v0 + n, v1 + n, 0.0).swap_remove(0);
            }
        }
        q
    }

    pub fn shrink_eq(&self, d: f64) -> Polygon {
        self.shrink(&vec![d; self.len()])
    }

    /// Inset each edge of an arbitrary polygon by its own distance
    ///
    /// The offset edges form a loop that may intersect itself; the loop is
    /// split at every crossing and the largest resulting piece is kept. An
    /// empty polygon means nothing with positive area survived.
    pub fn buffer(&self, d: &[f64]) -> Polygon {
        let mut q: Vec<Point> = Vec::with_capacity(self.len() * 2);
        for (i, (v0, v1)) in self.edges().enumerate() {
            let dd = d.get(i).copied().unwrap_or(0.0);
            if dd == 0.0 {
                q.push(v0);
                q.push(v1);
            } else {
                let n = with_length((v1 - v0).perp(), dd);
                q.push(v0 + n);
                q.push(v1 + n);
            }
        }
        // Crossing points are inserted twice; both copies share a tag
        let mut tags: Vec<Option<usize>> = vec![None; q.len()];

        let mut crossings = 0;
        let mut last_edge = 0;
        let max_crossings = q.len() * q.len();
        'search: while crossings < max_crossings {
            let n = q.len();
            for i in last_edge..n.saturating_sub(2) {
                last_edge = i;
                let p11 = q[i];
                let d1 = q[i + 1] - p11;

                let end = if i > 0 { n } else { n - 1 };
                for j in i + 2..end {
                    let p21 = q[j];
                    let p22 = if j < n - 1 { q[j + 1] } else { q[0] };
                    let Some(tu) = intersect_lines(p11, d1, p21, p22 - p21) else {
                        continue;
                    };
                    if tu.x > DELTA && tu.x < 1.0 - DELTA && tu.y > DELTA && tu.y < 1.0 - DELTA {
                        let pn = p11 + d1 * tu.x;
                        q.insert(j + 1, pn);
                        tags.insert(j + 1, Some(crossings));
                        q.insert(i + 1, pn);
                        tags.insert(i + 1, Some(crossings));
                        crossings += 1;
                        continue 'search;
                    }
                }
            }
            break;
        }

        let n = q.len();
        let twin = |k: usize| -> usize {
            match tags[k] {
                Some(tag) => (0..n).find(|&m| m != k && tags[m] == Some(tag)).unwrap_or(k),
                None => k,
            }
        };

        let mut visited = vec![false; n];
        let mut best: Option<Polygon> = None;
        let mut best_sq = f64::NEG_INFINITY;
        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut part = Vec::new();
            let mut i = start;
            loop {
                visited[i] = true;
                part.push(q[i]);
                i = twin((i + 1) % n);
                if i == start || visited[i] {
                    break;
                }
            }

            let part = Polygon::new(part).dedup();
            let s = part.square();
            if s > best_sq {
                best_sq = s;
                best = Some(part);
            }
        }

        match best {
            Some(p) if p.len() >= 3 && best_sq > 0.0 => p,
            _ => Polygon::default(),
        }
    }

    pub fn buffer_eq(&self, d: f64) -> Polygon {
        self.buffer(&vec![d; self.len()])
    }

    /// Drop consecutive duplicate vertices, including across the closing edge
    pub fn dedup(mut self) -> Polygon {
        self.vertices.dedup();
        while self.vertices.len() > 1 && self.vertices.first() == self.vertices.last() {
            self.vertices.pop();
        }
        self
    }
}
