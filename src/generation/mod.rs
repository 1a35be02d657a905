//! Patch tessellation
//!
//! Generates the patch shapes of a city: spiral seeds around the origin,
//! Voronoi cells via Delaunay triangulation, and optional Lloyd relaxation of
//! the central seeds.

mod lloyd;
mod spiral;
mod voronoi;

pub use lloyd::{central_seeds, lloyd_relaxation};
pub use spiral::{generate_spiral_points, SEEDS_PER_PATCH};
pub use voronoi::{tessellate, Bounds};

use crate::error::Result;
use crate::geom::{Polygon, Point};
use crate::random::Random;

/// Minimum half-size of the tessellation frame
const MIN_HALF_SIZE: f64 = 1000.0;

/// Frame enclosing every seed with margin to spare
pub fn bounds_for(points: &[Point]) -> Bounds {
    let max_r = points.iter().map(|p| p.length()).fold(0.0, f64::max);
    Bounds::square(MIN_HALF_SIZE.max(max_r * 1.5))
}

/// Generate the patch shapes for a city of `patch_count` patches
///
/// Returns one shape per seed, ordered by seed distance from the origin: the
/// first `patch_count` shapes are the city, the one after is the citadel
/// candidate, and the rest is countryside.
pub fn generate_patch_shapes(
    patch_count: usize,
    relax_iterations: usize,
    rng: &mut Random,
) -> Result<Vec<Polygon>> {
    let seed_count = patch_count * SEEDS_PER_PATCH;

    // Step 1: Spiral seeds, sorted by distance from the origin
    let mut points = generate_spiral_points(seed_count, rng);

    // Step 2: Tessellate, relaxing the central seeds if asked to
    let bounds = bounds_for(&points);
    let indices = central_seeds(patch_count, seed_count);
    lloyd_relaxation(&mut points, &indices, bounds, relax_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_patch_shapes() {
        let shapes = generate_patch_shapes(15, 0, &mut Random::new(1)).unwrap();
        assert_eq!(shapes.len(), 15 * SEEDS_PER_PATCH);
        // Patch 0 holds the origin seed
        assert!(shapes[0].len() >= 3);
        assert!(shapes[0].square() > 0.0);
    }

    #[test]
    fn test_bounds_grow_with_seeds() {
        assert_eq!(bounds_for(&[Point::new(10.0, 0.0)]), Bounds::square(1000.0));
        assert_eq!(bounds_for(&[Point::new(0.0, 2000.0)]), Bounds::square(3000.0));
    }
}
