//! City blocks and outskirts thinning

use crate::geom::{distance_to_line, Point, Polygon};
use crate::model::Model;
use crate::patch::PatchId;
use crate::random::Random;
use crate::vertex::VertexId;

use super::{ALLEY, MAIN_STREET, REGULAR_STREET};

/// Whether some artery runs through both `v0` and `v1`
fn on_artery(model: &Model, v0: VertexId, v1: VertexId) -> bool {
    model
        .arteries()
        .iter()
        .any(|street| street.contains(&v0) && street.contains(&v1))
}

/// Buildable interior of patch `id`
///
/// Each edge is inset by half the width of the street running along it: a
/// main street on the wall, the plaza front and arteries, a regular street
/// between patches inside the walls and an alley elsewhere. An empty polygon
/// means nothing is left to build on.
pub fn city_block(model: &Model, id: PatchId) -> Polygon {
    let patch = &model.patches()[id];
    let wall = model.wall();
    let inner_patch = wall.is_none() || patch.within_walls;
    let plaza = model.plaza().map(|p| &model.patches()[p].shape);

    let inset: Vec<f64> = patch
        .shape
        .edges()
        .map(|(v0, v1)| {
            if wall.is_some_and(|w| w.borders_by(id, v0, v1)) {
                return MAIN_STREET / 2.0;
            }

            let on_street = (inner_patch && plaza.is_some_and(|s| s.find_edge(v1, v0).is_some()))
                || on_artery(model, v0, v1);
            let width = if on_street {
                MAIN_STREET
            } else if inner_patch {
                REGULAR_STREET
            } else {
                ALLEY
            };
            width / 2.0
        })
        .collect();

    let shape = model.polygon(id);
    let block = if shape.is_convex() {
        shape.shrink(&inset)
    } else {
        shape.buffer(&inset)
    };

    if block.len() < 3 || block.square() <= 0.0 {
        return Polygon::default();
    }
    block
}

/// An edge that draws buildings towards it
struct PopulatedEdge {
    origin: Point,
    dir: Point,
    /// Depth of the patch behind the edge, scaled by how populated it is
    depth: f64,
}

/// Thin out the buildings of a patch on the edge of the city
///
/// Buildings near arteries and near enclosed city patches are likely to stay;
/// the farther a building is from such an edge, and the lower the sampled
/// density around it, the likelier it is dropped.
pub fn filter_outskirts(model: &Model, id: PatchId, buildings: Vec<Polygon>, rng: &mut Random) -> Vec<Polygon> {
    let patch = &model.patches()[id];
    let shape = model.polygon(id);

    let mut populated = Vec::new();
    for (i, (v1, v2)) in patch.shape.edges().enumerate() {
        let factor = if on_artery(model, v1, v2) {
            Some(1.0)
        } else {
            model
                .get_neighbour(id, v1)
                .filter(|&n| model.patches()[n].within_city)
                .map(|n| if model.is_enclosed(n) { 1.0 } else { 0.4 })
        };
        let Some(factor) = factor else { continue };

        let origin = shape.at(i);
        let dir = shape.at(i + 1) - origin;
        let depth = patch
            .shape
            .iter()
            .zip(&shape.vertices)
            .filter(|(v, _)| *v != v1 && *v != v2)
            .map(|(_, &p)| distance_to_line(origin, dir, p) * factor)
            .fold(0.0, f64::max);
        populated.push(PopulatedEdge { origin, dir, depth });
    }

    let density: Vec<f64> = patch
        .shape
        .iter()
        .map(|v| {
            if model.gates().contains(&v) {
                1.0
            } else if model
                .patch_by_vertex(v)
                .iter()
                .all(|&p| model.patches()[p].within_city)
            {
                2.0 * rng.float()
            } else {
                0.0
            }
        })
        .collect();

    buildings
        .into_iter()
        .filter(|building| {
            let mut min_dist: f64 = 1.0;
            for edge in &populated {
                for &v in &building.vertices {
                    let dist = distance_to_line(edge.origin, edge.dir, v) / edge.depth;
                    if dist < min_dist {
                        min_dist = dist;
                    }
                }
            }

            let weights = shape.interpolate(building.center());
            let p: f64 = density.iter().zip(&weights).map(|(d, w)| d * w).sum();
            min_dist /= p;

            rng.fuzzy(1.0) > min_dist
        })
        .collect()
}
