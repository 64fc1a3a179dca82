//! Geographic coordinates (latitude and longitude, see [`GeoPoint`]), coordinate reference systems ([`Crs`]) and
//! conversion between them ([`Projection`]).

mod crs;
mod datum;
pub mod impls;
mod registry;
mod traits;

pub use crs::{Crs, Hemisphere, ProjectionType};
pub use datum::Datum;
pub use registry::{parse_epsg_code, CrsDefinition, CrsRegistry};
pub use traits::point::{GeoPoint, NewGeoPoint};
pub use traits::projection::{ChainProjection, InvertedProjection, Projection};
