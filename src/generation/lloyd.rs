//! Lloyd's Relaxation for rounder central patches
//!
//! Lloyd's Relaxation moves a seed to the centroid of its Voronoi cell and
//! re-tessellates. Applied to the plaza, its first neighbours and the citadel
//! seed, it rounds off the shapes that matter most for the city core without
//! touching the rest of the spiral.

use std::time::Instant;

use tracing::{debug, trace};

use super::voronoi::{tessellate, Bounds};
use crate::error::Result;
use crate::geom::{Point, Polygon};

/// Indices of the seeds relaxed for a city of `patch_count` patches
///
/// The three seeds closest to the origin and the citadel seed (the first one
/// outside the city).
pub fn central_seeds(patch_count: usize, seed_count: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..3.min(seed_count)).collect();
    if patch_count < seed_count && !indices.contains(&patch_count) {
        indices.push(patch_count);
    }
    indices
}

/// Relax the selected seeds `iterations` times
///
/// Returns the final cells (one per point, in input order). With zero
/// iterations this is a plain tessellation.
///
/// # Arguments
///
/// * `points` - Seed points; the selected ones are moved in place
/// * `indices` - Seeds to relax
/// * `bounds` - Clipping rectangle of the tessellation
/// * `iterations` - Number of relaxation passes
pub fn lloyd_relaxation(
    points: &mut [Point],
    indices: &[usize],
    bounds: Bounds,
    iterations: usize,
) -> Result<Vec<Polygon>> {
    let start = Instant::now();
    let mut cells = tessellate(points, bounds)?;

    for iteration in 0..iterations {
        let mut max_displacement: f64 = 0.0;
        for &i in indices {
            let Some(cell) = cells.get(i) else { continue };
            if cell.len() < 3 {
                continue;
            }
            let centroid = cell.centroid();
            max_displacement = max_displacement.max(centroid.distance(points[i]));
            points[i] = centroid;
        }

        cells = tessellate(points, bounds)?;
        trace!(iteration = iteration + 1, max_displacement, "lloyd pass");
    }

    if iterations > 0 {
        debug!(
            iterations,
            seeds = indices.len(),
            elapsed = ?start.elapsed(),
            "relaxed central seeds"
        );
    }

    Ok(cells)
}
