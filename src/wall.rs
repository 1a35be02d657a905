//! Curtain walls
//!
//! A wall is the outer boundary of a set of patches. It picks gates along its
//! boundary, splits the countryside patch in front of each gate so a road can
//! leave the city, and places towers on every other vertex.

use crate::geom::Point;
use crate::patch::{Patch, PatchId, Patches};
use crate::random::Random;
use crate::vertex::{Outline, VertexArena, VertexId};

/// Outer boundary of a set of patches
///
/// Edges are kept only when no other patch of the set owns them in reverse
/// orientation, then chained into a single contour. A set of one patch reuses
/// that patch's outline.
pub fn find_circumference(patches: &Patches, set: &[PatchId]) -> Outline {
    match set {
        [] => return Outline::default(),
        [single] => return patches[*single].shape.clone(),
        _ => {}
    }

    let mut a: Vec<VertexId> = Vec::new();
    let mut b: Vec<VertexId> = Vec::new();
    for &id in set {
        for (v0, v1) in patches[id].shape.edges() {
            let inner_edge = set.iter().any(|&other| patches[other].shape.find_edge(v1, v0).is_some());
            if !inner_edge {
                a.push(v0);
                b.push(v1);
            }
        }
    }

    let mut result = Vec::new();
    if a.is_empty() {
        return Outline::default();
    }

    let mut index = 0;
    loop {
        result.push(a[index]);
        match a.iter().position(|&v| v == b[index]) {
            Some(next) => index = next,
            None => break,
        }
        if index == 0 || result.len() > a.len() {
            break;
        }
    }

    Outline::new(result)
}

/// Remove a picked gate candidate and its neighbours from the pool
///
/// * first candidate: it, the next one and the last one
/// * last candidate: it, the previous one and the first one
/// * otherwise: it and both neighbours
pub(crate) fn eliminate_candidates<T>(candidates: &mut Vec<T>, index: usize) {
    let len = candidates.len();
    if index == 0 {
        candidates.drain(0..2.min(len));
        candidates.pop();
    } else if index == len - 1 {
        candidates.drain(index - 1..len);
        if !candidates.is_empty() {
            candidates.remove(0);
        }
    } else {
        candidates.drain(index - 1..index + 2);
    }
}

/// A wall around a set of patches
///
/// The main city wall and the citadel wall are "real": their shape is
/// smoothed, gates split the patch in front of them and towers are placed.
/// When a city has no walls, a non-real wall still defines the border and its
/// gates. The default wall is empty and not real.
#[derive(Debug, Clone, Default)]
pub struct CurtainWall {
    /// Wall contour
    pub shape: Outline,

    /// Whether each edge of `shape` is an actual wall segment
    pub segments: Vec<bool>,

    pub gates: Vec<VertexId>,

    pub towers: Vec<VertexId>,

    real: bool,
    patches: Vec<PatchId>,
}

impl CurtainWall {
    /// Build a wall around `enclosed`, picking its gates
    ///
    /// # Arguments
    ///
    /// * `real` - Whether this is a physical wall
    /// * `enclosed` - Patches inside the wall
    /// * `reserved` - Vertices that must neither move nor become gates
    /// * `patches` - Every patch of the model; outer patches may be split
    /// * `arena` - Vertex positions; smoothing moves wall vertices in place
    /// * `rng` - Random stream of the run
    pub fn new(
        real: bool,
        enclosed: &[PatchId],
        reserved: &[VertexId],
        patches: &mut Patches,
        arena: &mut VertexArena,
        rng: &mut Random,
    ) -> Self {
        let shape = find_circumference(patches, enclosed);

        if real && enclosed.len() > 1 {
            let smooth_factor = (40.0 / enclosed.len() as f64).min(1.0);
            let poly = shape.resolve(arena);
            let smoothed: Vec<(VertexId, Point)> = shape
                .iter()
                .enumerate()
                .filter(|(_, v)| !reserved.contains(v))
                .map(|(i, v)| (v, poly.smooth_vertex_at(i, smooth_factor)))
                .collect();
            for (v, p) in smoothed {
                arena.set(v, p);
            }
        }

        let mut wall = Self {
            segments: vec![true; shape.len()],
            shape,
            gates: Vec::new(),
            towers: Vec::new(),
            real,
            patches: enclosed.to_vec(),
        };
        wall.build_gates(reserved, patches, arena, rng);
        wall
    }

    #[inline]
    pub fn is_real(&self) -> bool {
        self.real
    }

    /// Patches enclosed by the wall
    #[inline]
    pub fn enclosed(&self) -> &[PatchId] {
        &self.patches
    }

    fn gate_candidates(&self, reserved: &[VertexId], patches: &Patches) -> Vec<VertexId> {
        let free: Vec<VertexId> = self.shape.iter().filter(|v| !reserved.contains(v)).collect();

        let mut candidates: Vec<VertexId> = if self.patches.len() > 1 {
            free.iter()
                .copied()
                .filter(|&v| {
                    patches
                        .by_vertex(v)
                        .iter()
                        .filter(|id| self.patches.contains(id))
                        .count()
                        > 1
                })
                .collect()
        } else {
            Vec::new()
        };

        if candidates.is_empty() {
            candidates = free;
        }
        if candidates.is_empty() && !self.shape.is_empty() {
            candidates.push(self.shape.at(0));
        }
        candidates
    }

    fn build_gates(
        &mut self,
        reserved: &[VertexId],
        patches: &mut Patches,
        arena: &mut VertexArena,
        rng: &mut Random,
    ) {
        self.gates.clear();

        let mut candidates = self.gate_candidates(reserved, patches);
        if candidates.is_empty() {
            return;
        }

        loop {
            let index = rng.index(candidates.len());
            let gate = candidates[index];
            self.gates.push(gate);

            if self.real {
                self.split_outer_patch(gate, reserved, patches, arena);
            }

            eliminate_candidates(&mut candidates, index);
            if candidates.len() < 3 {
                break;
            }
        }

        if self.real {
            for &gate in &self.gates {
                let poly = self.shape.resolve(arena);
                if let Some(i) = self.shape.index_of(gate) {
                    arena.set(gate, poly.smooth_vertex_at(i, 1.0));
                }
            }
        }
    }

    /// Split the single countryside patch touching `gate` along the chord
    /// from the gate to its vertex farthest out along the wall normal
    fn split_outer_patch(
        &self,
        gate: VertexId,
        reserved: &[VertexId],
        patches: &mut Patches,
        arena: &VertexArena,
    ) {
        let outer: Vec<PatchId> = patches
            .by_vertex(gate)
            .into_iter()
            .filter(|id| !self.patches.contains(id))
            .collect();
        let [outer_id] = outer[..] else { return };
        let outer = &patches[outer_id];
        if outer.within_city || outer.shape.len() <= 3 {
            return;
        }

        let (Some(next), Some(prev)) = (self.shape.next(gate), self.shape.prev(gate)) else {
            return;
        };
        let wall_vector = arena.get(next) - arena.get(prev);
        let out = Point::new(wall_vector.y, -wall_vector.x);
        let gate_pos = arena.get(gate);

        let mut farthest = None;
        let mut best = f64::NEG_INFINITY;
        for v in outer.shape.iter() {
            if self.shape.contains(v) || reserved.contains(&v) {
                continue;
            }
            let dir = arena.get(v) - gate_pos;
            let score = dir.dot(out) / dir.length();
            if farthest.is_none() || score > best {
                farthest = Some(v);
                best = score;
            }
        }

        let Some(farthest) = farthest else { return };
        let (Some(i1), Some(i2)) = (outer.shape.index_of(gate), outer.shape.index_of(farthest)) else {
            return;
        };
        let [half1, half2] = outer.shape.split(i1, i2);
        if half1.len() < 3 || half2.len() < 3 {
            return;
        }

        patches.replace(outer_id, vec![Patch::new(half1), Patch::new(half2)]);
    }

    /// Place a tower on every non-gate vertex next to a wall segment
    pub fn build_towers(&mut self) {
        self.towers.clear();
        if !self.real {
            return;
        }

        let len = self.shape.len();
        for (i, t) in self.shape.iter().enumerate() {
            if !self.gates.contains(&t) && (self.segments[(i + len - 1) % len] || self.segments[i]) {
                self.towers.push(t);
            }
        }
    }

    /// Distance from the origin to the farthest wall vertex
    pub fn radius(&self, arena: &VertexArena) -> f64 {
        self.shape
            .iter()
            .map(|v| arena.get(v).length())
            .fold(0.0, f64::max)
    }

    /// Whether the edge `v0 → v1` of patch `id` runs along a wall segment
    pub fn borders_by(&self, id: PatchId, v0: VertexId, v1: VertexId) -> bool {
        let index = if self.patches.contains(&id) {
            self.shape.find_edge(v0, v1)
        } else {
            self.shape.find_edge(v1, v0)
        };
        index.is_some_and(|i| self.segments[i])
    }

    /// Whether any wall segment is an edge of the patch
    pub fn borders(&self, id: PatchId, patch: &Patch) -> bool {
        let within = self.patches.contains(&id);
        self.shape.edges().enumerate().any(|(i, (v0, v1))| {
            self.segments[i]
                && if within {
                    patch.shape.find_edge(v0, v1).is_some()
                } else {
                    patch.shape.find_edge(v1, v0).is_some()
                }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Polygon;
    use proptest::prelude::*;

    fn square(arena: &mut VertexArena, x: f64, y: f64) -> Patch {
        Patch::new(arena.intern_polygon(&Polygon::new(vec![
            Point::new(x, y),
            Point::new(x + 10.0, y),
            Point::new(x + 10.0, y + 10.0),
            Point::new(x, y + 10.0),
        ])))
    }

    /// 4x4 grid of squares; the central 2x2 block is within the city
    fn grid() -> (VertexArena, Patches, Vec<PatchId>) {
        let mut arena = VertexArena::new();
        let mut patches = Patches::new();
        let mut inner = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                let mut patch = square(&mut arena, -20.0 + 10.0 * i as f64, -20.0 + 10.0 * j as f64);
                let central = (1..3).contains(&i) && (1..3).contains(&j);
                patch.within_city = central;
                let id = patches.push(patch);
                if central {
                    inner.push(id);
                }
            }
        }
        (arena, patches, inner)
    }

    #[test]
    fn test_eliminate_first() {
        let mut c = vec![0, 1, 2, 3, 4, 5];
        eliminate_candidates(&mut c, 0);
        assert_eq!(c, vec![2, 3, 4]);
    }

    #[test]
    fn test_eliminate_last() {
        let mut c = vec![0, 1, 2, 3, 4, 5];
        eliminate_candidates(&mut c, 5);
        assert_eq!(c, vec![1, 2, 3]);
    }

    #[test]
    fn test_eliminate_interior() {
        let mut c = vec![0, 1, 2, 3, 4, 5];
        eliminate_candidates(&mut c, 2);
        assert_eq!(c, vec![0, 4, 5]);
    }

    #[test]
    fn test_eliminate_small_pools() {
        let mut c = vec![7];
        eliminate_candidates(&mut c, 0);
        assert!(c.is_empty());

        let mut c = vec![7, 8];
        eliminate_candidates(&mut c, 1);
        assert!(c.is_empty());
    }

    #[test]
    fn test_find_circumference() {
        let (arena, patches, inner) = grid();
        let outline = find_circumference(&patches, &inner);
        let poly = outline.resolve(&arena);

        assert_eq!(outline.len(), 8);
        assert!((poly.square() - 400.0).abs() < 1e-9);
        for p in [
            Point::new(-10.0, -10.0),
            Point::new(0.0, -10.0),
            Point::new(10.0, 10.0),
            Point::new(-10.0, 0.0),
        ] {
            assert!(poly.contains(p));
        }
    }

    #[test]
    fn test_find_circumference_single_patch() {
        let (_, patches, inner) = grid();
        let outline = find_circumference(&patches, &inner[..1]);
        assert_eq!(outline, patches[inner[0]].shape);
        assert!(find_circumference(&patches, &[]).is_empty());
    }

    #[test]
    fn test_border_gates_on_shared_vertices() {
        let (mut arena, mut patches, inner) = grid();
        let wall = CurtainWall::new(false, &inner, &[], &mut patches, &mut arena, &mut Random::new(3));

        // Only the edge midpoints are shared by two enclosed patches, and
        // picking any one of four candidates leaves a single one behind
        assert_eq!(wall.gates.len(), 1);
        let gate = arena.get(wall.gates[0]);
        assert!(gate.x == 0.0 || gate.y == 0.0);

        // Non-real walls neither move vertices nor split patches
        assert_eq!(patches.len(), 16);
        assert!((wall.shape.resolve(&arena).square() - 400.0).abs() < 1e-9);
        assert!((wall.radius(&arena) - 200f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_real_wall_smooths_and_builds_towers() {
        let (mut arena, mut patches, inner) = grid();
        let mut wall = CurtainWall::new(true, &inner, &[], &mut patches, &mut arena, &mut Random::new(3));
        wall.build_towers();

        let poly = wall.shape.resolve(&arena);
        assert!(poly.square() < 400.0);
        assert_eq!(wall.towers.len(), wall.shape.len() - wall.gates.len());
        assert!(wall.towers.iter().all(|t| !wall.gates.contains(t)));
    }

    #[test]
    fn test_gate_splits_outer_patch() {
        let mut arena = VertexArena::new();
        let mut patches = Patches::new();

        let mut inside = square(&mut arena, 0.0, 0.0);
        inside.within_city = true;
        let inside = patches.push(inside);
        let outside = patches.push(Patch::new(arena.intern_polygon(&Polygon::new(vec![
            Point::new(0.0, -10.0),
            Point::new(20.0, -10.0),
            Point::new(20.0, -2.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
        ]))));

        let reserved: Vec<VertexId> = [Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)]
            .iter()
            .filter_map(|&p| arena.lookup(p))
            .collect();
        let gate = arena.lookup(Point::new(10.0, 0.0)).unwrap();
        let corner = arena.lookup(Point::new(20.0, -10.0)).unwrap();

        let wall = CurtainWall::new(true, &[inside], &reserved, &mut patches, &mut arena, &mut Random::new(1));

        assert_eq!(wall.gates, vec![gate]);
        assert!(!patches.is_alive(outside));
        assert_eq!(patches.len(), 3);

        // Both halves share the chord from the gate to the far corner
        let halves: Vec<&Patch> = patches.iter().skip(1).map(|(_, p)| p).collect();
        assert!(halves.iter().all(|p| p.shape.contains(gate) && p.shape.contains(corner)));
        assert_eq!(halves[0].shape.len() + halves[1].shape.len(), 7);

        // The gate is smoothed in place, moving every shape that uses it
        let moved = arena.get(gate);
        assert!((moved - Point::new(20.0 / 3.0, 10.0 / 3.0)).length() < 1e-9);
    }

    #[test]
    fn test_borders_orientation() {
        let (mut arena, mut patches, inner) = grid();
        let wall = CurtainWall::new(false, &inner, &[], &mut patches, &mut arena, &mut Random::new(9));

        let a = arena.lookup(Point::new(-10.0, -10.0)).unwrap();
        let b = arena.lookup(Point::new(0.0, -10.0)).unwrap();
        let inside = inner[0];
        let below = patches.by_vertex(a).into_iter().find(|&id| {
            id != inside && patches[id].shape.find_edge(b, a).is_some()
        });

        assert!(wall.borders_by(inside, a, b));
        assert!(!wall.borders_by(inside, b, a));
        assert!(wall.borders(inside, &patches[inside]));
        let below = below.unwrap();
        assert!(wall.borders_by(below, b, a));
        assert!(wall.borders(below, &patches[below]));

        // A corner patch of the grid only touches the wall at a vertex
        let corner = patches.ids()[0];
        assert!(!wall.borders(corner, &patches[corner]));
    }

    proptest! {
        #[test]
        fn test_gate_elimination_terminates(len in 1usize..60, picks in prop::collection::vec(0.0f64..1.0, 60)) {
            let mut candidates: Vec<usize> = (0..len).collect();
            let mut gates = 0;
            for f in picks {
                let before = candidates.len();
                let index = ((f * before as f64) as usize).min(before - 1);
                eliminate_candidates(&mut candidates, index);
                gates += 1;
                prop_assert!(candidates.len() < before);
                if candidates.len() < 3 {
                    break;
                }
            }
            prop_assert!(gates >= 1);
            prop_assert!(candidates.len() < 3);
        }
    }
}
