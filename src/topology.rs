//! Street routing graph
//!
//! Every distinct patch vertex becomes a graph node and every patch edge a
//! weighted link. Wall and citadel vertices other than gates are blocked:
//! they keep a node but no links, so streets can only cross walls at gates.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::geom::Point;
use crate::patch::Patches;
use crate::vertex::{Outline, VertexArena, VertexId};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// Routed path as vertex ids, not closed
pub type Street = Vec<VertexId>;

/// Handle of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Weighted undirected graph with node positions for the A* heuristic
///
/// Links are kept in insertion order so that path search is reproducible.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    positions: Vec<Point>,
    links: Vec<Vec<(NodeId, f64)>>,
}

/// Open-set entry, ordered so that the heap pops the lowest `f` first
#[derive(Debug, Clone, Copy)]
struct Open {
    f: f64,
    g: f64,
    node: NodeId,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `position`
    pub fn add(&mut self, position: Point) -> NodeId {
        let id = NodeId(self.positions.len());
        self.positions.push(position);
        self.links.push(Vec::new());
        id
    }

    /// Link two nodes both ways; linking again replaces the weight
    pub fn link(&mut self, a: NodeId, b: NodeId, weight: f64) {
        Self::set_link(&mut self.links[a.0], b, weight);
        Self::set_link(&mut self.links[b.0], a, weight);
    }

    fn set_link(links: &mut Vec<(NodeId, f64)>, to: NodeId, weight: f64) {
        match links.iter_mut().find(|(n, _)| *n == to) {
            Some(link) => link.1 = weight,
            None => links.push((to, weight)),
        }
    }

    #[inline]
    pub fn position(&self, node: NodeId) -> Point {
        self.positions[node.0]
    }

    /// Linked nodes with their weights
    #[inline]
    pub fn neighbours(&self, node: NodeId) -> &[(NodeId, f64)] {
        &self.links[node.0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Shortest path from `start` to `end`, never stepping onto a node of
    /// `exclude`
    ///
    /// The heuristic is the straight-line distance, which never overestimates
    /// a path made of straight links.
    pub fn a_star(&self, start: NodeId, end: NodeId, exclude: &HashSet<NodeId>) -> Option<Vec<NodeId>> {
        let mut g_score = vec![f64::INFINITY; self.len()];
        let mut came_from: Vec<Option<NodeId>> = vec![None; self.len()];
        let mut open = BinaryHeap::new();

        let target = self.position(end);
        g_score[start.0] = 0.0;
        open.push(Open {
            f: self.position(start).distance(target),
            g: 0.0,
            node: start,
        });

        while let Some(Open { g, node: current, .. }) = open.pop() {
            if current == end {
                return Some(Self::reconstruct(&came_from, current));
            }
            if g > g_score[current.0] {
                continue;
            }

            for &(neighbour, weight) in self.neighbours(current) {
                if exclude.contains(&neighbour) {
                    continue;
                }

                let tentative = g + weight;
                if tentative < g_score[neighbour.0] {
                    came_from[neighbour.0] = Some(current);
                    g_score[neighbour.0] = tentative;
                    open.push(Open {
                        f: tentative + self.position(neighbour).distance(target),
                        g: tentative,
                        node: neighbour,
                    });
                }
            }
        }

        None
    }

    fn reconstruct(came_from: &[Option<NodeId>], mut current: NodeId) -> Vec<NodeId> {
        let mut path = vec![current];
        while let Some(prev) = came_from[current.0] {
            current = prev;
            path.push(current);
        }
        path.reverse();
        path
    }
}

/// Routing graph over the patch vertices of a model
pub struct Topology {
    graph: Graph,
    vertex_to_node: HashMap<VertexId, NodeId>,
    node_to_vertex: Vec<VertexId>,
    blocked: HashSet<VertexId>,

    /// Nodes of within-city patches, off the border
    pub inner: HashSet<NodeId>,

    /// Nodes of countryside patches, off the border
    pub outer: HashSet<NodeId>,

    /// Unblocked nodes, in graph order
    routable: Vec<NodeId>,

    #[cfg(feature = "spatial-index")]
    index: Option<SpatialIndex>,
}

impl Topology {
    /// Build the graph over every live patch
    ///
    /// # Arguments
    ///
    /// * `patches` - Patches of the model
    /// * `arena` - Vertex positions
    /// * `border` - Contour separating the inner and outer pools
    /// * `blocked` - Vertices streets may not pass through
    pub fn new(patches: &Patches, arena: &VertexArena, border: &Outline, blocked: &[VertexId]) -> Self {
        let mut topology = Self {
            graph: Graph::new(),
            vertex_to_node: HashMap::new(),
            node_to_vertex: Vec::new(),
            blocked: blocked.iter().copied().collect(),
            inner: HashSet::new(),
            outer: HashSet::new(),
            routable: Vec::new(),
            #[cfg(feature = "spatial-index")]
            index: None,
        };

        for (_, patch) in patches.iter() {
            let Some(last) = patch.shape.ids().last().copied() else {
                continue;
            };

            let mut v1 = last;
            let mut n1 = topology.process_vertex(v1, arena);
            for v in patch.shape.iter() {
                let (v0, n0) = (v1, n1);
                v1 = v;
                n1 = topology.process_vertex(v1, arena);

                for (v, n) in [(v0, n0), (v1, n1)] {
                    if let Some(n) = n {
                        if !border.contains(v) {
                            if patch.within_city {
                                topology.inner.insert(n);
                            } else {
                                topology.outer.insert(n);
                            }
                        }
                    }
                }

                if let (Some(n0), Some(n1)) = (n0, n1) {
                    topology.graph.link(n0, n1, arena.get(v0).distance(arena.get(v1)));
                }
            }
        }

        #[cfg(feature = "spatial-index")]
        {
            let positions: Vec<Point> = topology
                .routable
                .iter()
                .map(|&n| topology.graph.position(n))
                .collect();
            topology.index = SpatialIndex::new(&positions);
        }

        topology
    }

    /// Node of `v`, created on first sight; `None` if `v` is blocked
    fn process_vertex(&mut self, v: VertexId, arena: &VertexArena) -> Option<NodeId> {
        let node = match self.vertex_to_node.get(&v) {
            Some(&n) => n,
            None => {
                let n = self.graph.add(arena.get(v));
                self.vertex_to_node.insert(v, n);
                self.node_to_vertex.push(v);
                if !self.blocked.contains(&v) {
                    self.routable.push(n);
                }
                n
            }
        };

        (!self.blocked.contains(&v)).then_some(node)
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Routable node of a vertex
    pub fn node(&self, v: VertexId) -> Option<NodeId> {
        if self.blocked.contains(&v) {
            return None;
        }
        self.vertex_to_node.get(&v).copied()
    }

    #[inline]
    pub fn vertex(&self, node: NodeId) -> VertexId {
        self.node_to_vertex[node.0]
    }

    /// Shortest street from `from` to `to` avoiding the `exclude` nodes
    ///
    /// Unknown and blocked endpoints give `None`, as does a missing path.
    pub fn build_path(&self, from: VertexId, to: VertexId, exclude: &HashSet<NodeId>) -> Option<Street> {
        let start = self.node(from)?;
        let end = self.node(to)?;
        let path = self.graph.a_star(start, end, exclude)?;
        Some(path.into_iter().map(|n| self.vertex(n)).collect())
    }

    /// Coordinate-keyed variant of [`build_path`](Self::build_path)
    pub fn build_path_between(
        &self,
        arena: &VertexArena,
        from: Point,
        to: Point,
        exclude: &HashSet<NodeId>,
    ) -> Option<Street> {
        self.build_path(arena.lookup(from)?, arena.lookup(to)?, exclude)
    }

    /// Routable vertex closest to `p`
    pub fn nearest_vertex(&self, p: Point) -> Option<VertexId> {
        #[cfg(feature = "spatial-index")]
        let node = {
            let i = self.index.as_ref()?.find_nearest(p);
            self.routable[i]
        };

        #[cfg(not(feature = "spatial-index"))]
        let node = {
            let mut best: Option<(NodeId, f64)> = None;
            for &n in &self.routable {
                let d = self.graph.position(n).distance_squared(p);
                if best.map_or(true, |(_, b)| d < b) {
                    best = Some((n, d));
                }
            }
            best?.0
        };

        Some(self.vertex(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Polygon;
    use crate::patch::Patch;

    /// A(0,0) B(1,0) C(2,0) D(1,1) E(1,-2), three routes from A to C
    fn five_nodes() -> (Graph, [NodeId; 5]) {
        let mut graph = Graph::new();
        let a = graph.add(Point::new(0.0, 0.0));
        let b = graph.add(Point::new(1.0, 0.0));
        let c = graph.add(Point::new(2.0, 0.0));
        let d = graph.add(Point::new(1.0, 1.0));
        let e = graph.add(Point::new(1.0, -2.0));
        for (x, y) in [(a, b), (b, c), (a, d), (d, c), (a, e), (e, c)] {
            graph.link(x, y, graph.position(x).distance(graph.position(y)));
        }
        (graph, [a, b, c, d, e])
    }

    #[test]
    fn test_a_star_shortest() {
        let (graph, [a, b, c, _, _]) = five_nodes();
        assert_eq!(graph.a_star(a, c, &HashSet::new()), Some(vec![a, b, c]));
        assert_eq!(graph.a_star(c, a, &HashSet::new()), Some(vec![c, b, a]));
        assert_eq!(graph.a_star(a, a, &HashSet::new()), Some(vec![a]));
    }

    #[test]
    fn test_a_star_exclude() {
        let (graph, [a, b, c, d, e]) = five_nodes();

        let exclude: HashSet<NodeId> = [b].into();
        assert_eq!(graph.a_star(a, c, &exclude), Some(vec![a, d, c]));

        let exclude: HashSet<NodeId> = [b, d].into();
        assert_eq!(graph.a_star(a, c, &exclude), Some(vec![a, e, c]));

        let exclude: HashSet<NodeId> = [b, d, e].into();
        assert_eq!(graph.a_star(a, c, &exclude), None);
    }

    #[test]
    fn test_link_replaces_weight() {
        let (mut graph, [a, b, ..]) = five_nodes();
        graph.link(a, b, 7.0);
        assert_eq!(graph.neighbours(a)[0], (b, 7.0));
        assert_eq!(graph.neighbours(a).len(), 3);
    }

    /// Two squares side by side, the left one within the city
    fn two_patches() -> (VertexArena, Patches) {
        let mut arena = VertexArena::new();
        let mut patches = Patches::new();
        for x in [0.0, 10.0] {
            let mut patch = Patch::new(arena.intern_polygon(&Polygon::new(vec![
                Point::new(x, 0.0),
                Point::new(x + 10.0, 0.0),
                Point::new(x + 10.0, 10.0),
                Point::new(x, 10.0),
            ])));
            patch.within_city = x == 0.0;
            patches.push(patch);
        }
        (arena, patches)
    }

    #[test]
    fn test_topology_pools_and_paths() {
        let (arena, patches) = two_patches();
        let v = |x: f64, y: f64| arena.lookup(Point::new(x, y)).unwrap();

        let topology = Topology::new(&patches, &arena, &Outline::default(), &[]);
        assert_eq!(topology.graph().len(), 6);
        assert_eq!(topology.inner.len(), 4);
        assert_eq!(topology.outer.len(), 4);

        let path = topology.build_path(v(0.0, 0.0), v(20.0, 10.0), &HashSet::new()).unwrap();
        assert_eq!(path.first(), Some(&v(0.0, 0.0)));
        assert_eq!(path.last(), Some(&v(20.0, 10.0)));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_topology_blocked_vertices() {
        let (arena, patches) = two_patches();
        let v = |x: f64, y: f64| arena.lookup(Point::new(x, y)).unwrap();

        // Block the shared edge: the two halves become disconnected
        let blocked = [v(10.0, 0.0), v(10.0, 10.0)];
        let topology = Topology::new(&patches, &arena, &Outline::default(), &blocked);

        assert_eq!(topology.graph().len(), 6);
        assert!(topology.node(v(10.0, 0.0)).is_none());
        assert!(topology.build_path(v(0.0, 0.0), v(10.0, 0.0), &HashSet::new()).is_none());
        assert!(topology.build_path(v(0.0, 0.0), v(20.0, 0.0), &HashSet::new()).is_none());
        assert!(topology.build_path(v(0.0, 0.0), v(0.0, 10.0), &HashSet::new()).is_some());
        assert!(topology
            .build_path_between(&arena, Point::new(0.0, 0.0), Point::new(5.0, 5.0), &HashSet::new())
            .is_none());
    }

    #[test]
    fn test_border_vertices_join_no_pool() {
        let (arena, patches) = two_patches();
        let border = patches[patches.ids()[0]].shape.clone();
        let topology = Topology::new(&patches, &arena, &border, &[]);

        assert!(topology.inner.is_empty());
        assert_eq!(topology.outer.len(), 2);
    }

    #[test]
    fn test_nearest_vertex_skips_blocked() {
        let (arena, patches) = two_patches();
        let v = |x: f64, y: f64| arena.lookup(Point::new(x, y)).unwrap();
        let topology = Topology::new(&patches, &arena, &Outline::default(), &[v(20.0, 10.0)]);

        assert_eq!(topology.nearest_vertex(Point::new(-50.0, -1.0)), Some(v(0.0, 0.0)));
        assert_eq!(topology.nearest_vertex(Point::new(1000.0, 1000.0)), Some(v(10.0, 10.0)));
    }
}
