//! Value types shared by the UAV area measurement crates.
//!
//! * [`geo`] holds coordinate reference systems ([`geo::Crs`]), the process-wide CRS registry and the
//!   projections used to move geometries between geographic and metric coordinates.
//! * [`cartesian`] holds planar math over rings and polygons: signed area and bounding rectangles.
//! * [`contour`] and [`polygon`] are the traits that let that math run directly on `geo-types`
//!   geometries.

pub mod cartesian;
pub mod contour;
pub mod error;
pub mod geo;
mod geo_types;
pub mod polygon;

pub use contour::{ClosedContour, Contour};
pub use error::TypesError;
pub use self::geo_types::ProjectCoords;
pub use polygon::{MultiPolygon, Polygon};
