//! Geometry tagged with its coordinate reference system.

use crate::error::{MeasureError, MeasureResult};
use geo_types::{Coord, MultiPolygon, Polygon};
use uav_area_types::cartesian::{CartesianMultiPolygon, Rect};
use uav_area_types::geo::Crs;
use uav_area_types::ProjectCoords;

/// Polygon set together with the CRS of its coordinates.
///
/// Geometries are never modified in place: reprojection produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsGeometry {
    geometry: MultiPolygon,
    crs: Crs,
}

impl CrsGeometry {
    /// Creates a new geometry.
    pub fn new(geometry: MultiPolygon, crs: Crs) -> Self {
        Self { geometry, crs }
    }

    /// Creates a geometry from a list of polygons.
    pub fn from_polygons(polygons: Vec<Polygon>, crs: Crs) -> Self {
        Self::new(MultiPolygon::new(polygons), crs)
    }

    /// Polygons of the geometry.
    pub fn geometry(&self) -> &MultiPolygon {
        &self.geometry
    }

    /// CRS of the coordinates.
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Deconstructs into the polygons and the CRS.
    pub fn into_inner(self) -> (MultiPolygon, Crs) {
        (self.geometry, self.crs)
    }

    /// Returns true if the geometry has no polygons.
    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }

    /// Bounding rectangle of all exterior rings. Returns `None` for an empty geometry.
    pub fn extent(&self) -> Option<Rect> {
        Rect::from_points(
            self.geometry
                .0
                .iter()
                .flat_map(|polygon| polygon.exterior().0.iter()),
        )
    }

    /// Returns a copy of the geometry with all coordinates converted into `target`.
    pub fn reproject(&self, target: &Crs) -> MeasureResult<CrsGeometry> {
        if self.crs == *target {
            return Ok(self.clone());
        }

        let transformation = self.crs.transformation_to::<Coord>(target)?;
        let geometry = self
            .geometry
            .project_coords(&transformation)
            .ok_or(MeasureError::Reprojection {
                from: self.crs,
                to: *target,
            })?;

        log::trace!(
            "Reprojected {} polygons from {} to {target}",
            geometry.0.len(),
            self.crs
        );

        Ok(CrsGeometry::new(geometry, *target))
    }

    /// Planar area in square meters. Only valid for projected CRSs.
    pub fn area_m2(&self) -> MeasureResult<f64> {
        if self.crs.is_geographic() {
            return Err(MeasureError::GeographicCrs(self.crs));
        }

        Ok(CartesianMultiPolygon::area(&self.geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use geo_types::polygon;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]
    }

    #[test]
    fn extent_and_area() {
        let geometry = CrsGeometry::from_polygons(
            vec![square(0.0, 0.0, 2.0), square(10.0, 5.0, 1.0)],
            Crs::EPSG3857,
        );

        assert_eq!(geometry.extent(), Some(Rect::new(0.0, 0.0, 11.0, 6.0)));
        assert_abs_diff_eq!(geometry.area_m2().expect("projected"), 5.0);
    }

    #[test]
    fn empty_geometry() {
        let geometry = CrsGeometry::from_polygons(vec![], Crs::WGS84);
        assert!(geometry.is_empty());
        assert!(geometry.extent().is_none());
    }

    #[test]
    fn geographic_area_is_rejected() {
        let geometry = CrsGeometry::from_polygons(vec![square(0.0, 0.0, 1.0)], Crs::WGS84);
        assert_matches!(geometry.area_m2(), Err(MeasureError::GeographicCrs(crs)) if crs == Crs::WGS84);
    }

    #[test]
    fn reproject_round_trip() {
        let geometry = CrsGeometry::from_polygons(vec![square(14.0, 50.0, 0.01)], Crs::WGS84);
        let projected = geometry.reproject(&Crs::EPSG3857).expect("valid");
        assert_eq!(projected.crs(), Crs::EPSG3857);
        assert!(projected.extent().expect("not empty").x_min > 1_000_000.0);

        let back = projected.reproject(&Crs::WGS84).expect("valid");
        for (a, b) in back.geometry().0[0]
            .exterior()
            .0
            .iter()
            .zip(geometry.geometry().0[0].exterior().0.iter())
        {
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
        }

        assert_eq!(geometry.reproject(&Crs::WGS84).expect("same crs"), geometry);
    }

    #[test]
    fn reproject_out_of_domain() {
        let geometry = CrsGeometry::from_polygons(vec![square(0.0, 86.0, 1.0)], Crs::WGS84);
        assert_matches!(
            geometry.reproject(&Crs::EPSG3857),
            Err(MeasureError::Reprojection { .. })
        );
    }
}
