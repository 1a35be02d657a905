//! Spatial indexing for nearest-vertex lookups
//!
//! This module is only available with the `spatial-index` feature.

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::geom::Point;

/// Wrapper around a 2D KD-tree of positions
///
/// Answers "which of these points is closest to `p`" in O(log n). Used by
/// the street router to snap far-away road origins onto the graph.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
}

impl SpatialIndex {
    /// Build the index over `positions`; an empty slice gives no index
    ///
    /// # Example
    ///
    /// ```
    /// use rust_voronoi_city::spatial::SpatialIndex;
    /// use rust_voronoi_city::Point;
    ///
    /// let positions = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
    /// let index = SpatialIndex::new(&positions).unwrap();
    /// assert_eq!(index.find_nearest(Point::new(8.0, 1.0)), 1);
    /// ```
    pub fn new(positions: &[Point]) -> Option<Self> {
        if positions.is_empty() {
            return None;
        }

        let points: Vec<[f64; 2]> = positions.iter().map(|p| [p.x, p.y]).collect();
        Some(Self {
            tree: ImmutableKdTree::new_from_slice(&points),
        })
    }

    /// Index (into the construction slice) of the position closest to `p`
    pub fn find_nearest(&self, p: Point) -> usize {
        let result = self.tree.nearest_one::<SquaredEuclidean>(&[p.x, p.y]);
        result.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_index_nearest() {
        let positions = vec![
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(-100.0, 0.0),
            Point::new(0.0, -100.0),
        ];
        let index = SpatialIndex::new(&positions).unwrap();

        assert_eq!(index.find_nearest(Point::new(90.0, 10.0)), 0);
        assert_eq!(index.find_nearest(Point::new(5.0, 95.0)), 1);
        assert_eq!(index.find_nearest(Point::new(-1000.0, 3.0)), 2);
        assert_eq!(index.find_nearest(Point::new(0.0, -100.0)), 3);
    }

    #[test]
    fn test_spatial_index_empty() {
        assert!(SpatialIndex::new(&[]).is_none());
    }
}
