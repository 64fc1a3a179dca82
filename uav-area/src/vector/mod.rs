//! Vector inputs: polygon boundaries of the region of interest.

use crate::error::MeasureResult;
use crate::geometry::CrsGeometry;
use geo_types::Polygon;
use uav_area_types::geo::Crs;

mod geojson;
#[cfg(feature = "shapefile")]
mod shapefile;

pub use self::geojson::GeoJsonRoi;
#[cfg(feature = "shapefile")]
pub use self::shapefile::{crs_from_wkt, ShapefileRoi};

/// Source of polygon features in one CRS.
pub trait VectorSource {
    /// CRS of the feature coordinates.
    fn crs(&self) -> Crs;
    /// Polygons of all features. Features without area geometry are not included.
    fn features(&self) -> MeasureResult<Vec<Polygon>>;

    /// Reads all features into one geometry.
    fn read(&self) -> MeasureResult<CrsGeometry> {
        Ok(CrsGeometry::from_polygons(self.features()?, self.crs()))
    }
}

/// Polygons held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRoi {
    polygons: Vec<Polygon>,
    crs: Crs,
}

impl MemoryRoi {
    /// Creates a new source.
    pub fn new(polygons: Vec<Polygon>, crs: Crs) -> Self {
        Self { polygons, crs }
    }
}

impl VectorSource for MemoryRoi {
    fn crs(&self) -> Crs {
        self.crs
    }

    fn features(&self) -> MeasureResult<Vec<Polygon>> {
        Ok(self.polygons.clone())
    }
}

impl VectorSource for CrsGeometry {
    fn crs(&self) -> Crs {
        CrsGeometry::crs(self)
    }

    fn features(&self) -> MeasureResult<Vec<Polygon>> {
        Ok(self.geometry().0.clone())
    }

    fn read(&self) -> MeasureResult<CrsGeometry> {
        Ok(self.clone())
    }
}
