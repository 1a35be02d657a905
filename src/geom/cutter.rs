//! Stateless polygon subdivision primitives

use std::cmp::Ordering;

use super::point::{rotate, with_length, Point};
use super::polygon::Polygon;

/// Cut `poly` across the edge starting at vertex `i`
///
/// The cut passes through the point at `ratio` along the edge, perpendicular
/// to the edge when `angle` is zero and rotated by `angle` otherwise. Returns
/// the two halves, or the input alone if the cut failed.
pub fn bisect(poly: &Polygon, i: usize, ratio: f64, angle: f64, gap: f64) -> Vec<Polygon> {
    let vertex = poly.at(i);
    let next = poly.at(i + 1);

    let p1 = vertex.lerp(next, ratio);
    let d = rotate(next - vertex, angle);
    let p2 = p1 + d.perp();

    poly.cut(p1, p2, gap)
}

/// Split into triangular sectors around `center` (the centroid by default)
///
/// Neighbouring sectors are separated by `gap`.
pub fn radial(poly: &Polygon, center: Option<Point>, gap: f64) -> Vec<Polygon> {
    let center = center.unwrap_or_else(|| poly.centroid());
    poly.edges()
        .map(|(v0, v1)| {
            let sector = Polygon::new(vec![center, v0, v1]);
            if gap > 0.0 {
                sector.shrink(&[gap / 2.0, 0.0, gap / 2.0])
            } else {
                sector
            }
        })
        .collect()
}

/// Split into sectors fanning out from one of the polygon's own vertices
///
/// Without an explicit `center` the vertex nearest the centroid is used.
/// Sector sides lying on the polygon boundary get no gap.
pub fn semi_radial(poly: &Polygon, center: Option<Point>, gap: f64) -> Vec<Polygon> {
    let Some(center) = center.or_else(|| {
        let centroid = poly.centroid();
        poly.vertices
            .iter()
            .copied()
            .min_by(|a, b| {
                a.distance(centroid)
                    .partial_cmp(&b.distance(centroid))
                    .unwrap_or(Ordering::Equal)
            })
    }) else {
        return Vec::new();
    };

    let gap = gap / 2.0;
    poly.edges()
        .filter(|&(v0, v1)| v0 != center && v1 != center)
        .map(|(v0, v1)| {
            let sector = Polygon::new(vec![center, v0, v1]);
            if gap > 0.0 {
                let d = [
                    if poly.find_edge(center, v0).is_none() { gap } else { 0.0 },
                    0.0,
                    if poly.find_edge(v1, center).is_none() { gap } else { 0.0 },
                ];
                sector.shrink(&d)
            } else {
                sector
            }
        })
        .collect()
}

/// Peel a band of `thickness` off every edge, shortest edges first
///
/// Returns the peeled strips; the core left over is discarded.
pub fn ring(poly: &Polygon, thickness: f64) -> Vec<Polygon> {
    let mut slices: Vec<(Point, Point, f64)> = poly
        .edges()
        .map(|(v1, v2)| {
            let v = v2 - v1;
            let n = with_length(v.perp(), thickness);
            (v1 + n, v2 + n, v.length())
        })
        .collect();
    slices.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut peel = Vec::with_capacity(slices.len());
    let mut p = poly.clone();
    for (p1, p2, _) in slices {
        let mut halves = p.cut(p1, p2, 0.0);
        if halves.len() == 2 {
            peel.push(halves.swap_remove(1));
        }
        p = halves.swap_remove(0);
    }
    peel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square10() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
    }

    #[test]
    fn test_bisect_halves() {
        let halves = bisect(&square10(), 0, 0.3, 0.0, 0.0);
        assert_eq!(halves.len(), 2);
        let mut areas: Vec<f64> = halves.iter().map(Polygon::square).collect();
        areas.sort_by(f64::total_cmp);
        assert!((areas[0] - 30.0).abs() < 1e-9);
        assert!((areas[1] - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_bisect_with_gap_loses_area() {
        let halves = bisect(&square10(), 0, 0.5, 0.1, 1.0);
        assert_eq!(halves.len(), 2);
        let total: f64 = halves.iter().map(Polygon::square).sum();
        assert!(total < 100.0 && total > 85.0);
    }

    #[test]
    fn test_radial_sectors() {
        let sectors = radial(&square10(), None, 0.0);
        assert_eq!(sectors.len(), 4);
        let total: f64 = sectors.iter().map(Polygon::square).sum();
        assert!((total - 100.0).abs() < 1e-9);

        let gapped = radial(&square10(), None, 1.0);
        let total: f64 = gapped.iter().map(Polygon::square).sum();
        assert!(total < 100.0);
    }

    #[test]
    fn test_semi_radial_skips_center_edges() {
        let sq = square10();
        let sectors = semi_radial(&sq, Some(Point::new(0.0, 0.0)), 0.0);
        // Two of the four edges touch the fan center
        assert_eq!(sectors.len(), 2);
        let total: f64 = sectors.iter().map(Polygon::square).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_ring_peels_every_edge() {
        let strips = ring(&square10(), 2.0);
        assert_eq!(strips.len(), 4);
        let total: f64 = strips.iter().map(Polygon::square).sum();
        // 100 minus the 6x6 core
        assert!((total - 64.0).abs() < 1e-6);
    }
}
