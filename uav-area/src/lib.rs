//! Measurement core of UAV Area: derives physical measurements from an aerial raster with an opacity band and a
//! vector region of interest (ROI).
//!
//! # Pipeline
//!
//! * [`MaskPolygonizer`] traces the opaque cells of the raster's alpha band into polygons.
//! * [`GeometryUnifier`] dissolves a polygon set into one geometry.
//! * [`ProjectionSelector`] picks the UTM zone of the geometry's centroid, falling back to Web Mercator with a
//!   [`ProjectionWarning`] when no zone can be resolved.
//! * [`MeasurementEngine`] reprojects both inputs into one metric CRS and computes areas and the ROI's
//!   [minimum rotated rectangle](RotatedRectangle).
//!
//! # Sources
//!
//! Rasters implement [`raster::RasterSource`]: `ImageRaster` (PNG, JPEG or TIFF with a world file, feature `image`)
//! and `GeoTiffRaster` (georeferenced by its GeoTIFF tags, feature `geotiff`). ROIs implement
//! [`vector::VectorSource`]: `GeoJsonRoi` and `ShapefileRoi` (feature `shapefile`).
//!
//! ```no_run
//! use uav_area::raster::ImageRaster;
//! use uav_area::vector::GeoJsonRoi;
//! use uav_area::{MeasurementEngine, MeasurementOptions};
//! use uav_area_types::geo::Crs;
//!
//! # fn main() -> Result<(), uav_area::MeasureError> {
//! let raster = ImageRaster::open("ortho.png", Crs::from_epsg(32633)?)?;
//! let roi = GeoJsonRoi::from_path("field.geojson")?;
//!
//! let result = MeasurementEngine::new(MeasurementOptions::default()).measure(&raster, &roi)?;
//! println!("{} m² inside of {}", result.raster_area_m2, result.crs);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod geometry;
pub mod polygonize;
pub mod projection_selector;
pub mod raster;
pub mod rotated_rect;
pub mod unify;
pub mod units;
pub mod vector;

pub use engine::{
    MeasurementEngine, MeasurementOptions, MeasurementResult, RasterMeasurement,
    ReferenceGeometry, RoiMeasurement,
};
pub use error::{ErrorKind, MeasureError, MeasureResult};
pub use geometry::CrsGeometry;
pub use polygonize::MaskPolygonizer;
pub use projection_selector::{ProjectionChoice, ProjectionSelector, ProjectionWarning};
pub use rotated_rect::{RectangleSide, RotatedRectangle};
pub use unify::GeometryUnifier;
pub use units::AreaUnit;

// Reexport uav_area_types
pub use uav_area_types;
