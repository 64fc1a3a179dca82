//! Choice of a metric CRS for a geometry at an arbitrary location.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::CrsGeometry;
use geo_types::Coord;
use serde::Serialize;
use std::fmt;
use uav_area_types::geo::impls::GeoPoint2d;
use uav_area_types::geo::{Crs, CrsRegistry, GeoPoint, Hemisphere, NewGeoPoint};

/// Non-fatal notice that the local UTM zone could not be used and the geometry is measured in Web Mercator instead.
///
/// Web Mercator distorts areas away from the equator, so results obtained with this fallback are approximate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionWarning {
    /// Description of the failure.
    pub message: String,
    /// EPSG code of the UTM zone that was attempted, if the geometry location could be determined.
    pub attempted: Option<u32>,
}

impl fmt::Display for ProjectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.attempted {
            Some(code) => write!(
                f,
                "could not use EPSG:{code} ({}), falling back to EPSG:3857",
                self.message
            ),
            None => write!(f, "{}, falling back to EPSG:3857", self.message),
        }
    }
}

/// Outcome of [`ProjectionSelector::select`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionChoice {
    /// Selected metric CRS.
    pub crs: Crs,
    /// Set if the fallback CRS was selected.
    pub warning: Option<ProjectionWarning>,
}

/// Selects the UTM zone of a geometry.
///
/// The zone is determined by the center of the geometry's bounding box in geographic coordinates:
///
/// * zone number is `floor((lon + 180) / 6) + 1`, clamped to `1..=60`;
/// * latitude `>= 0` selects the northern zone (EPSG `326zz`), otherwise the southern one (EPSG `327zz`).
///
/// Geometries spanning several zones are projected into the zone of their center. If the zone cannot be determined or
/// resolved, Web Mercator (EPSG:3857) is selected and a [`ProjectionWarning`] is returned together with it. Selection
/// never fails and always gives the same result for the same geometry.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionSelector<'a> {
    registry: &'a CrsRegistry,
}

impl Default for ProjectionSelector<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionSelector<'static> {
    /// Selector resolving codes through the global registry.
    pub fn new() -> Self {
        Self {
            registry: CrsRegistry::global(),
        }
    }
}

impl<'a> ProjectionSelector<'a> {
    /// Selector resolving codes through the given registry.
    pub fn with_registry(registry: &'a CrsRegistry) -> Self {
        Self { registry }
    }

    /// Selects a metric CRS for the geometry.
    pub fn select(&self, geometry: &CrsGeometry) -> ProjectionChoice {
        let center = match geographic_center(geometry) {
            Ok(center) => center,
            Err(err) => return fallback(err.to_string(), None),
        };

        let code = utm_epsg(center.lon(), center.lat());
        match self.validate(code) {
            Ok(crs) => {
                log::info!(
                    "Selected {crs} for geometry centered at ({:.6}, {:.6})",
                    center.lon(),
                    center.lat()
                );
                ProjectionChoice { crs, warning: None }
            }
            Err(err) => fallback(err.to_string(), Some(code)),
        }
    }

    /// Selects a metric CRS for a point given in geographic coordinates.
    pub fn select_for_point(&self, lon: f64, lat: f64) -> ProjectionChoice {
        if let Err(err) = check_location(lon, lat) {
            return fallback(err.to_string(), None);
        }

        let code = utm_epsg(lon, lat);
        match self.validate(code) {
            Ok(crs) => ProjectionChoice { crs, warning: None },
            Err(err) => fallback(err.to_string(), Some(code)),
        }
    }

    fn validate(&self, code: u32) -> MeasureResult<Crs> {
        let crs = self
            .registry
            .resolve(code)
            .map_err(|err| MeasureError::InvalidProjection(err.to_string()))?;
        crs.get_projection::<GeoPoint2d, Coord>()
            .map_err(|err| MeasureError::InvalidProjection(err.to_string()))?;

        Ok(crs)
    }
}

fn fallback(message: String, attempted: Option<u32>) -> ProjectionChoice {
    let warning = ProjectionWarning { message, attempted };
    log::warn!("{warning}");

    ProjectionChoice {
        crs: Crs::EPSG3857,
        warning: Some(warning),
    }
}

fn geographic_center(geometry: &CrsGeometry) -> MeasureResult<GeoPoint2d> {
    let geographic = geometry.reproject(&Crs::WGS84)?;
    let extent = geographic.extent().ok_or(MeasureError::EmptyGeometry)?;
    let center = extent.center();
    check_location(center.x, center.y)?;

    Ok(GeoPoint2d::latlon(center.y, center.x))
}

fn check_location(lon: f64, lat: f64) -> MeasureResult<()> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(MeasureError::InvalidProjection(format!(
            "geometry center ({lon}, {lat}) is not a finite location"
        )));
    }

    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(MeasureError::InvalidProjection(format!(
            "geometry center ({lon}, {lat}) is outside of the valid longitude/latitude range"
        )));
    }

    Ok(())
}

/// UTM zone number for the longitude, clamped to `1..=60`.
pub fn utm_zone(lon: f64) -> u8 {
    let zone = ((lon + 180.0) / 6.0).floor() + 1.0;
    zone.clamp(1.0, 60.0) as u8
}

/// Hemisphere of the latitude. The equator belongs to the northern hemisphere.
pub fn hemisphere(lat: f64) -> Hemisphere {
    if lat >= 0.0 {
        Hemisphere::North
    } else {
        Hemisphere::South
    }
}

/// EPSG code of the WGS84 UTM zone containing the point.
pub fn utm_epsg(lon: f64, lat: f64) -> u32 {
    let base = match hemisphere(lat) {
        Hemisphere::North => 32600,
        Hemisphere::South => 32700,
    };

    base + utm_zone(lon) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use geo_types::polygon;

    fn patch(lon: f64, lat: f64) -> CrsGeometry {
        CrsGeometry::from_polygons(
            vec![polygon![
                (x: lon - 0.001, y: lat - 0.001),
                (x: lon + 0.001, y: lat - 0.001),
                (x: lon + 0.001, y: lat + 0.001),
                (x: lon - 0.001, y: lat + 0.001),
            ]],
            Crs::WGS84,
        )
    }

    #[test]
    fn zone_boundaries() {
        assert_eq!(utm_zone(-180.0), 1);
        assert_eq!(utm_zone(-174.000_001), 1);
        assert_eq!(utm_zone(-174.0), 2);
        assert_eq!(utm_zone(0.0), 31);
        assert_eq!(utm_zone(14.9), 33);
        assert_eq!(utm_zone(179.999), 60);
        assert_eq!(utm_zone(180.0), 60);
    }

    #[test]
    fn hemispheres() {
        assert_eq!(hemisphere(0.0), Hemisphere::North);
        assert_eq!(hemisphere(-0.000_001), Hemisphere::South);
        assert_eq!(utm_epsg(14.4, 50.1), 32633);
        assert_eq!(utm_epsg(-70.6, -33.4), 32719);
        assert_eq!(utm_epsg(180.0, 0.0), 32660);
        assert_eq!(utm_epsg(-180.0, -1.0), 32701);
    }

    #[test]
    fn select_geographic_geometry() {
        let choice = ProjectionSelector::new().select(&patch(14.42, 50.08));
        assert_eq!(choice.crs, Crs::from_epsg(32633).expect("known code"));
        assert!(choice.warning.is_none());

        let choice = ProjectionSelector::new().select(&patch(151.2, -33.87));
        assert_eq!(choice.crs.epsg(), 32756);
    }

    #[test]
    fn select_projected_geometry() {
        let projected = patch(-3.7, 40.4)
            .reproject(&Crs::EPSG3857)
            .expect("valid");
        let choice = ProjectionSelector::new().select(&projected);
        assert_eq!(choice.crs.epsg(), 32630);
    }

    #[test]
    fn selection_is_idempotent() {
        let selector = ProjectionSelector::new();
        let geometry = patch(10.0, 45.0);
        let first = selector.select(&geometry);
        let reprojected = geometry.reproject(&first.crs).expect("valid");

        assert_eq!(selector.select(&geometry), first);
        assert_eq!(selector.select(&reprojected).crs, first.crs);
    }

    #[test]
    fn unknown_zone_falls_back() {
        let registry = CrsRegistry::new();
        let choice = ProjectionSelector::with_registry(&registry).select(&patch(14.42, 50.08));

        assert_eq!(choice.crs, Crs::EPSG3857);
        let warning = choice.warning.expect("fallback");
        assert_eq!(warning.attempted, Some(32633));
        assert!(warning.to_string().contains("EPSG:32633"));
    }

    #[test]
    fn invalid_location_falls_back() {
        let selector = ProjectionSelector::new();

        let choice = selector.select_for_point(f64::NAN, 10.0);
        assert_eq!(choice.crs, Crs::EPSG3857);
        assert_matches!(choice.warning, Some(ProjectionWarning { attempted: None, .. }));

        let choice = selector.select_for_point(200.0, 10.0);
        assert_eq!(choice.crs, Crs::EPSG3857);
        assert!(choice.warning.is_some());

        let choice = selector.select_for_point(10.0, -95.0);
        assert_eq!(choice.crs, Crs::EPSG3857);

        let choice = selector.select(&CrsGeometry::from_polygons(vec![], Crs::WGS84));
        assert_eq!(choice.crs, Crs::EPSG3857);
        assert!(choice.warning.is_some());
    }

    #[test]
    fn out_of_range_geographic_geometry_falls_back() {
        let choice = ProjectionSelector::new().select(&patch(250.0, 10.0));
        assert_eq!(choice.crs, Crs::EPSG3857);
        assert!(choice.warning.is_some());
    }

    #[test]
    fn select_for_point() {
        let choice = ProjectionSelector::new().select_for_point(-180.0, 0.0);
        assert_eq!(choice.crs.epsg(), 32601);
        assert!(choice.warning.is_none());

        let choice = ProjectionSelector::new().select_for_point(180.0, 0.0);
        assert_eq!(choice.crs.epsg(), 32660);
    }

    #[test]
    fn center_point_type() {
        let center = geographic_center(&patch(1.0, 2.0)).expect("valid");
        let expected = GeoPoint2d::latlon(2.0, 1.0);
        approx::assert_abs_diff_eq!(center, expected, epsilon = 1e-9);
    }
}
