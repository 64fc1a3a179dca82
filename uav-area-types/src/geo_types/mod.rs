//! Implementations of the crate traits for `geo-types` geometries.

mod coord;
mod linestring;
mod multi_polygon;
mod polygon;

pub use polygon::ProjectCoords;
