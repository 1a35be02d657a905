//! Shared vertex storage
//!
//! Adjacent patches, the walls and the street network all refer to the same
//! boundary vertices. Positions live once in a [`VertexArena`] and shapes hold
//! [`VertexId`]s, so moving a vertex (junction merging, wall smoothing, street
//! smoothing) moves it for every shape at once, and identity queries compare
//! integers instead of floating-point coordinates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use crate::geom::{bits, Point, Polygon};

/// Handle of a vertex in a [`VertexArena`]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Positions of all vertices, with exact-coordinate interning
#[derive(Debug, Clone, Default)]
pub struct VertexArena {
    points: Vec<Point>,
    index: HashMap<(u64, u64), VertexId>,
}

impl VertexArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the vertex at exactly `p`, creating it if needed
    pub fn intern(&mut self, p: Point) -> VertexId {
        if let Some(&id) = self.index.get(&bits(p)) {
            return id;
        }
        let id = VertexId(self.points.len() as u32);
        self.points.push(p);
        self.index.insert(bits(p), id);
        id
    }

    /// Intern every vertex of a polygon
    pub fn intern_polygon(&mut self, poly: &Polygon) -> Outline {
        Outline::new(poly.vertices.iter().map(|&p| self.intern(p)).collect())
    }

    /// Id of the vertex at exactly `p`, if there is one
    pub fn lookup(&self, p: Point) -> Option<VertexId> {
        self.index.get(&bits(p)).copied()
    }

    #[inline]
    pub fn get(&self, id: VertexId) -> Point {
        self.points[id.index()]
    }

    /// Move a vertex
    pub fn set(&mut self, id: VertexId, p: Point) {
        let old = self.points[id.index()];
        if self.index.get(&bits(old)) == Some(&id) {
            self.index.remove(&bits(old));
        }
        self.points[id.index()] = p;
        self.index.entry(bits(p)).or_insert(id);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positions of a sequence of ids
    pub fn resolve(&self, ids: &[VertexId]) -> Vec<Point> {
        ids.iter().map(|&id| self.get(id)).collect()
    }
}

/// Closed cycle of vertex ids
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outline {
    ids: Vec<VertexId>,
}

impl From<Vec<VertexId>> for Outline {
    fn from(ids: Vec<VertexId>) -> Self {
        Self { ids }
    }
}

impl Outline {
    pub fn new(ids: Vec<VertexId>) -> Self {
        Self { ids }
    }

    #[inline]
    pub fn ids(&self) -> &[VertexId] {
        &self.ids
    }

    #[inline]
    pub fn ids_mut(&mut self) -> &mut Vec<VertexId> {
        &mut self.ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id at `i`, wrapping around the cycle
    #[inline]
    pub fn at(&self, i: usize) -> VertexId {
        self.ids[i % self.ids.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.ids.iter().copied()
    }

    /// Edges as `(v0, v1)` pairs, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let len = self.ids.len();
        (0..len).map(move |i| (self.ids[i], self.ids[(i + 1) % len]))
    }

    pub fn index_of(&self, v: VertexId) -> Option<usize> {
        self.ids.iter().position(|&id| id == v)
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.ids.contains(&v)
    }

    /// Index of the edge `a → b`, if the outline has it in this orientation
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<usize> {
        let i = self.index_of(a)?;
        (self.at(i + 1) == b).then_some(i)
    }

    /// Vertex after `v`
    pub fn next(&self, v: VertexId) -> Option<VertexId> {
        self.index_of(v).map(|i| self.at(i + 1))
    }

    /// Vertex before `v`
    pub fn prev(&self, v: VertexId) -> Option<VertexId> {
        let len = self.ids.len();
        self.index_of(v).map(|i| self.ids[(i + len - 1) % len])
    }

    /// Whether the two outlines share an edge (in either orientation)
    pub fn borders(&self, other: &Outline) -> bool {
        let len2 = other.len();
        for (i, &v) in self.ids.iter().enumerate() {
            if let Some(j) = other.index_of(v) {
                let next = self.at(i + 1);
                if next == other.ids[(j + 1) % len2] || next == other.ids[(j + len2 - 1) % len2] {
                    return true;
                }
            }
        }
        false
    }

    /// Split along the chord between positions `i1` and `i2`
    ///
    /// Both halves keep the chord endpoints.
    pub fn split(&self, i1: usize, i2: usize) -> [Outline; 2] {
        let (i1, i2) = if i1 > i2 { (i2, i1) } else { (i1, i2) };
        let part1 = self.ids[i1..=i2].to_vec();
        let part2 = self.ids[i2..].iter().chain(&self.ids[..=i1]).copied().collect();
        [Outline::new(part1), Outline::new(part2)]
    }

    /// Replace every occurrence of `from` with `to`
    pub fn replace(&mut self, from: VertexId, to: VertexId) -> bool {
        let mut found = false;
        for id in &mut self.ids {
            if *id == from {
                *id = to;
                found = true;
            }
        }
        found
    }

    /// Remove the first occurrence of `v`
    pub fn remove(&mut self, v: VertexId) -> bool {
        match self.index_of(v) {
            Some(i) => {
                self.ids.remove(i);
                true
            }
            None => false,
        }
    }

    /// Keep only the first occurrence of every id
    pub fn dedup_ids(&mut self) {
        let mut seen = std::collections::HashSet::with_capacity(self.ids.len());
        self.ids.retain(|id| seen.insert(*id));
    }

    /// Positions of the outline as a polygon
    pub fn resolve(&self, arena: &VertexArena) -> Polygon {
        Polygon::new(arena.resolve(&self.ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with_square() -> (VertexArena, Outline) {
        let mut arena = VertexArena::new();
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let outline = arena.intern_polygon(&poly);
        (arena, outline)
    }

    #[test]
    fn test_intern_dedups_exact_coordinates() {
        let mut arena = VertexArena::new();
        let a = arena.intern(Point::new(1.0, 2.0));
        let b = arena.intern(Point::new(1.0, 2.0));
        let c = arena.intern(Point::new(1.0, 2.000_000_1));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.lookup(Point::new(1.0, 2.0)), Some(a));
    }

    #[test]
    fn test_set_moves_shared_vertex() {
        let (mut arena, outline) = arena_with_square();
        let mut arena2 = arena.clone();
        let other = arena2.intern_polygon(&Polygon::new(vec![
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(10.0, 10.0),
        ]));
        assert_eq!(other.at(0), outline.at(1));

        arena.set(outline.at(1), Point::new(11.0, 0.0));
        assert_eq!(outline.resolve(&arena).vertices[1], Point::new(11.0, 0.0));
        assert_eq!(arena.lookup(Point::new(11.0, 0.0)), Some(outline.at(1)));
        assert_eq!(arena.lookup(Point::new(10.0, 0.0)), None);
    }

    #[test]
    fn test_outline_navigation() {
        let (_, outline) = arena_with_square();
        let [a, b, c, d] = [outline.at(0), outline.at(1), outline.at(2), outline.at(3)];

        assert_eq!(outline.next(d), Some(a));
        assert_eq!(outline.prev(a), Some(d));
        assert_eq!(outline.find_edge(b, c), Some(1));
        assert_eq!(outline.find_edge(c, b), None);
        assert_eq!(outline.next(VertexId(99)), None);
    }

    #[test]
    fn test_outline_borders() {
        let mut arena = VertexArena::new();
        let a = arena.intern_polygon(&Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]));
        let b = arena.intern_polygon(&Polygon::new(vec![
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(10.0, 10.0),
        ]));
        let c = arena.intern_polygon(&Polygon::new(vec![
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(0.0, 20.0),
        ]));
        assert!(a.borders(&b));
        assert!(b.borders(&a));
        assert!(!a.borders(&c));
    }

    #[test]
    fn test_outline_split_and_edit() {
        let (_, outline) = arena_with_square();
        let [p1, p2] = outline.split(3, 1);
        assert_eq!(p1.ids(), &[outline.at(1), outline.at(2), outline.at(3)]);
        assert_eq!(p2.ids(), &[outline.at(3), outline.at(0), outline.at(1)]);

        let mut o = outline.clone();
        assert!(o.replace(outline.at(2), outline.at(1)));
        o.dedup_ids();
        assert_eq!(o.len(), 3);
        assert!(o.remove(outline.at(0)));
        assert!(!o.remove(outline.at(0)));
    }
}
