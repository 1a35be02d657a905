//! Recursive block subdivision into building footprints

use tracing::warn;

use crate::geom::cutter::bisect;
use crate::geom::{Point, Polygon};
use crate::random::Random;

use super::ALLEY;

/// Maximum recursion depth of a subdivision
const MAX_DEPTH: usize = 24;

/// Maximum number of attempts at a non-empty orthogonal layout
const MAX_ORTHO_ATTEMPTS: usize = 20;

/// Split a block into lots separated by alleys
///
/// Each step cuts across the longest edge at a ratio near its middle, turned
/// off the perpendicular by up to 30° scaled by `grid_chaos` (no turn for
/// blocks under four lots). Halves smaller than a randomized multiple of
/// `min_sq` become lots, left empty with probability `empty_prob`; larger
/// halves are split again, with an alley only if they are big enough.
///
/// # Arguments
///
/// * `poly` - Block to subdivide
/// * `min_sq` - Typical lot area
/// * `grid_chaos` - Irregularity of the cuts, in `[0, 1]`
/// * `size_chaos` - Irregularity of the lot sizes, in `[0, 1]`
/// * `empty_prob` - Probability of an empty lot
/// * `split` - Whether the first cut leaves an alley
/// * `rng` - Random stream of the run
pub fn create_alleys(
    poly: &Polygon,
    min_sq: f64,
    grid_chaos: f64,
    size_chaos: f64,
    empty_prob: f64,
    split: bool,
    rng: &mut Random,
) -> Vec<Polygon> {
    let params = AlleyParams {
        min_sq,
        grid_chaos,
        size_chaos,
        empty_prob,
    };
    let mut buildings = Vec::new();
    alleys(poly, &params, split, 0, rng, &mut buildings);
    buildings
}

struct AlleyParams {
    min_sq: f64,
    grid_chaos: f64,
    size_chaos: f64,
    empty_prob: f64,
}

fn alleys(poly: &Polygon, params: &AlleyParams, split: bool, depth: usize, rng: &mut Random, out: &mut Vec<Polygon>) {
    let Some(longest) = poly.longest_edge() else {
        return;
    };
    if depth >= MAX_DEPTH {
        out.push(poly.clone());
        return;
    }

    let spread = 0.8 * params.grid_chaos;
    let ratio = (1.0 - spread) / 2.0 + rng.float() * spread;

    let square = poly.square();
    let angle_spread = if square < params.min_sq * 4.0 {
        0.0
    } else {
        std::f64::consts::PI / 6.0 * params.grid_chaos
    };
    let angle = (rng.float() - 0.5) * angle_spread;

    let halves = bisect(poly, longest, ratio, angle, if split { ALLEY } else { 0.0 });
    if halves.len() < 2 {
        out.push(poly.clone());
        return;
    }

    for half in halves {
        let half_sq = half.square();
        let threshold = params.min_sq * 2f64.powf(4.0 * params.size_chaos * (rng.float() - 0.5));
        if half_sq < threshold {
            if !rng.bool(params.empty_prob) {
                out.push(half);
            }
        } else {
            let split = half_sq > params.min_sq / (rng.float() * rng.float());
            alleys(&half, params, split, depth + 1, rng, out);
        }
    }
}

/// Split a block into rectangular-ish buildings
///
/// Cuts run across the longest edge, always along one of two fixed
/// directions: the longest edge of the original block and its perpendicular.
/// Pieces smaller than a randomized multiple of `min_block_sq` are kept with
/// probability `fill`. Blocks already smaller than `min_block_sq` are one
/// building. If every piece is dropped the layout is drawn again; after too
/// many empty attempts the block stays empty.
pub fn create_ortho_building(poly: &Polygon, min_block_sq: f64, fill: f64, rng: &mut Random) -> Vec<Polygon> {
    let Some(longest) = poly.longest_edge() else {
        return Vec::new();
    };
    if poly.square() < min_block_sq {
        return vec![poly.clone()];
    }

    let c1 = poly.vector_at(longest);
    let c2 = c1.perp();
    for _ in 0..MAX_ORTHO_ATTEMPTS {
        let mut blocks = Vec::new();
        ortho_slice(poly, c1, c2, min_block_sq, fill, 0, rng, &mut blocks);
        if !blocks.is_empty() {
            return blocks;
        }
    }

    warn!(
        attempts = MAX_ORTHO_ATTEMPTS,
        area = poly.square(),
        "orthogonal layout stayed empty"
    );
    Vec::new()
}

#[allow(clippy::too_many_arguments)]
fn ortho_slice(
    poly: &Polygon,
    c1: Point,
    c2: Point,
    min_block_sq: f64,
    fill: f64,
    depth: usize,
    rng: &mut Random,
    out: &mut Vec<Polygon>,
) {
    let Some(i) = poly.longest_edge() else {
        return;
    };
    if depth >= MAX_DEPTH {
        out.push(poly.clone());
        return;
    }

    let v0 = poly.at(i);
    let v1 = poly.at(i + 1);
    let v = v1 - v0;

    let ratio = 0.4 + rng.float() * 0.2;
    let p1 = v0.lerp(v1, ratio);
    let c = if v.dot(c1).abs() < v.dot(c2).abs() { c1 } else { c2 };

    let halves = poly.cut(p1, p1 + c, 0.0);
    if halves.len() < 2 {
        out.push(poly.clone());
        return;
    }

    for half in halves {
        if half.square() < min_block_sq * 2f64.powf(rng.normal() * 2.0 - 1.0) {
            if rng.bool(fill) {
                out.push(half);
            }
        } else {
            ortho_slice(&half, c1, c2, min_block_sq, fill, depth + 1, rng, out);
        }
    }
}
