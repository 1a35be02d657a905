//! Planar geometry: points, polygons and polygon subdivision

pub mod cutter;
mod point;
mod polygon;

pub use point::{bits, cross, distance_to_line, intersect_lines, rotate, with_length, Point};
pub use polygon::Polygon;
