//! Measurement of rasters and regions of interest in a common metric CRS.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::CrsGeometry;
use crate::polygonize::MaskPolygonizer;
use crate::projection_selector::{ProjectionChoice, ProjectionSelector, ProjectionWarning};
use crate::raster::RasterSource;
use crate::rotated_rect::{minimum_rotated_rectangle, RotatedRectangle};
use crate::unify::GeometryUnifier;
use crate::vector::VectorSource;
use serde::{Deserialize, Serialize};
use uav_area_types::geo::Crs;

/// Geometry whose location determines the CRS of a combined measurement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceGeometry {
    /// Opaque footprint of the raster.
    #[default]
    Raster,
    /// Region of interest.
    Roi,
}

/// Parameters of [`MeasurementEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementOptions {
    /// Geometry the common CRS of [`MeasurementEngine::measure`] is selected for.
    pub reference: ReferenceGeometry,
    /// Areas below this value (in m²) are considered empty.
    pub min_area_m2: f64,
    /// Relative difference under which the two sides of a rectangle are considered equal.
    pub side_tolerance: f64,
}

impl Default for MeasurementOptions {
    fn default() -> Self {
        Self {
            reference: ReferenceGeometry::Raster,
            min_area_m2: 1e-6,
            side_tolerance: 1e-9,
        }
    }
}

/// Opaque area of a raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterMeasurement {
    /// Area in square meters.
    pub area_m2: f64,
    /// CRS the area was measured in.
    pub crs: Crs,
    /// Set if the CRS is the Web Mercator fallback.
    pub warning: Option<ProjectionWarning>,
    /// Dissolved opaque footprint in `crs`.
    #[serde(skip)]
    pub geometry: CrsGeometry,
}

/// Area and dimensions of a region of interest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiMeasurement {
    /// Area in square meters.
    pub area_m2: f64,
    /// Shorter side of the minimum rotated rectangle in meters.
    pub width_m: f64,
    /// Longer side of the minimum rotated rectangle in meters.
    pub height_m: f64,
    /// Minimum rotated rectangle in `crs`.
    pub rectangle: RotatedRectangle,
    /// CRS the values were measured in.
    pub crs: Crs,
    /// Set if the CRS is the Web Mercator fallback.
    pub warning: Option<ProjectionWarning>,
    /// Dissolved ROI in `crs`.
    #[serde(skip)]
    pub geometry: CrsGeometry,
}

/// Raster and ROI measured in the same CRS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementResult {
    /// Opaque area of the raster in square meters.
    pub raster_area_m2: f64,
    /// Area of the ROI in square meters.
    pub roi_area_m2: f64,
    /// Width of the ROI in meters.
    pub roi_width_m: f64,
    /// Height of the ROI in meters.
    pub roi_height_m: f64,
    /// Minimum rotated rectangle of the ROI.
    pub roi_rectangle: RotatedRectangle,
    /// CRS shared by all values.
    pub crs: Crs,
    /// Geometry the CRS was selected for.
    pub reference: ReferenceGeometry,
    /// Set if the CRS is the Web Mercator fallback.
    pub warning: Option<ProjectionWarning>,
    /// Dissolved opaque footprint of the raster in `crs`.
    #[serde(skip)]
    pub raster_footprint: CrsGeometry,
    /// Dissolved ROI in `crs`.
    #[serde(skip)]
    pub roi_geometry: CrsGeometry,
}

/// Runs the measurement pipeline: polygonize, unify, select a CRS, reproject and measure.
///
/// The engine holds no state between requests, so one instance can serve any number of them.
#[derive(Debug, Clone)]
pub struct MeasurementEngine<'a> {
    options: MeasurementOptions,
    selector: ProjectionSelector<'a>,
    polygonizer: MaskPolygonizer,
    unifier: GeometryUnifier,
}

impl Default for MeasurementEngine<'static> {
    fn default() -> Self {
        Self::new(MeasurementOptions::default())
    }
}

impl MeasurementEngine<'static> {
    /// Creates an engine selecting CRSs from the global registry.
    pub fn new(options: MeasurementOptions) -> Self {
        Self::with_selector(options, ProjectionSelector::new())
    }
}

impl<'a> MeasurementEngine<'a> {
    /// Creates an engine with a custom projection selector.
    pub fn with_selector(options: MeasurementOptions, selector: ProjectionSelector<'a>) -> Self {
        Self {
            options,
            selector,
            polygonizer: MaskPolygonizer::new(),
            unifier: GeometryUnifier::new(),
        }
    }

    /// Options of the engine.
    pub fn options(&self) -> &MeasurementOptions {
        &self.options
    }

    /// Dissolved opaque footprint of the raster in the raster CRS.
    pub fn raster_footprint<S>(&self, raster: &S) -> MeasureResult<CrsGeometry>
    where
        S: RasterSource + ?Sized,
    {
        let polygons = self.polygonizer.polygonize_source(raster)?;
        match self.unifier.unify(&polygons) {
            Err(MeasureError::EmptyGeometry) => Err(MeasureError::NoOpaqueRegion),
            result => result,
        }
    }

    /// Dissolved ROI in the CRS of the source.
    pub fn roi_footprint<V>(&self, roi: &V) -> MeasureResult<CrsGeometry>
    where
        V: VectorSource + ?Sized,
    {
        let geometry = roi.read()?;
        if geometry.is_empty() {
            return Err(MeasureError::EmptyGeometry);
        }

        self.unifier.unify(&geometry)
    }

    /// Measures the opaque area of the raster in the UTM zone of its footprint.
    pub fn measure_raster_area<S>(&self, raster: &S) -> MeasureResult<RasterMeasurement>
    where
        S: RasterSource + ?Sized,
    {
        let footprint = self.raster_footprint(raster)?;
        let choice = self.selector.select(&footprint);
        self.raster_measurement(&footprint, choice)
    }

    /// Measures the area and dimensions of the ROI in its UTM zone.
    pub fn measure_roi<V>(&self, roi: &V) -> MeasureResult<RoiMeasurement>
    where
        V: VectorSource + ?Sized,
    {
        let footprint = self.roi_footprint(roi)?;
        let choice = self.selector.select(&footprint);
        self.roi_measurement(&footprint, choice)
    }

    /// Measures the raster and the ROI in one CRS, selected for the
    /// [reference geometry](MeasurementOptions::reference).
    pub fn measure<S, V>(&self, raster: &S, roi: &V) -> MeasureResult<MeasurementResult>
    where
        S: RasterSource + ?Sized,
        V: VectorSource + ?Sized,
    {
        let raster_footprint = self.raster_footprint(raster)?;
        let roi_footprint = self.roi_footprint(roi)?;

        let choice = match self.options.reference {
            ReferenceGeometry::Raster => self.selector.select(&raster_footprint),
            ReferenceGeometry::Roi => self.selector.select(&roi_footprint),
        };

        let raster = self.raster_measurement(&raster_footprint, choice.clone())?;
        let roi = self.roi_measurement(&roi_footprint, choice.clone())?;

        Ok(MeasurementResult {
            raster_area_m2: raster.area_m2,
            roi_area_m2: roi.area_m2,
            roi_width_m: roi.width_m,
            roi_height_m: roi.height_m,
            roi_rectangle: roi.rectangle,
            crs: choice.crs,
            reference: self.options.reference,
            warning: choice.warning,
            raster_footprint: raster.geometry,
            roi_geometry: roi.geometry,
        })
    }

    fn raster_measurement(
        &self,
        footprint: &CrsGeometry,
        choice: ProjectionChoice,
    ) -> MeasureResult<RasterMeasurement> {
        let geometry = footprint.reproject(&choice.crs)?;
        let area_m2 = geometry.area_m2()?;
        if area_m2 < self.options.min_area_m2 {
            return Err(MeasureError::NoOpaqueRegion);
        }

        log::info!("Raster opaque area: {area_m2:.2} m² in {}", choice.crs);

        Ok(RasterMeasurement {
            area_m2,
            crs: choice.crs,
            warning: choice.warning,
            geometry,
        })
    }

    fn roi_measurement(
        &self,
        footprint: &CrsGeometry,
        choice: ProjectionChoice,
    ) -> MeasureResult<RoiMeasurement> {
        let geometry = footprint.reproject(&choice.crs)?;
        let area_m2 = geometry.area_m2()?;
        if area_m2 < self.options.min_area_m2 {
            return Err(MeasureError::EmptyGeometry);
        }

        let rectangle = minimum_rotated_rectangle(geometry.geometry(), self.options.side_tolerance)?;
        log::info!(
            "ROI area: {area_m2:.2} m², {:.2} x {:.2} m in {}",
            rectangle.width(),
            rectangle.height(),
            choice.crs
        );

        Ok(RoiMeasurement {
            area_m2,
            width_m: rectangle.width(),
            height_m: rectangle.height(),
            rectangle,
            crs: choice.crs,
            warning: choice.warning,
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Band, GeoTransform, MemoryRaster};
    use crate::vector::MemoryRoi;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use geo_types::polygon;
    use uav_area_types::geo::CrsRegistry;

    fn utm33() -> Crs {
        Crs::from_epsg(32633).expect("known code")
    }

    fn raster(alpha: Band<u8>) -> MemoryRaster<u8> {
        MemoryRaster::from_alpha(
            alpha,
            255,
            GeoTransform::new(500_000.0, 5_500_000.0, 0.1, -0.1),
            utm33(),
        )
    }

    fn roi() -> MemoryRoi {
        MemoryRoi::new(
            vec![polygon![
                (x: 500_000.0, y: 5_499_950.0),
                (x: 500_030.0, y: 5_499_950.0),
                (x: 500_030.0, y: 5_500_000.0),
                (x: 500_000.0, y: 5_500_000.0),
            ]],
            utm33(),
        )
    }

    #[test]
    fn options_defaults_and_serde() {
        let options: MeasurementOptions =
            serde_json::from_str(r#"{"reference": "roi"}"#).expect("valid json");
        assert_eq!(options.reference, ReferenceGeometry::Roi);
        assert_eq!(options.min_area_m2, 1e-6);
        assert_eq!(options.side_tolerance, 1e-9);
        assert_eq!(
            MeasurementOptions::default().reference,
            ReferenceGeometry::Raster
        );
    }

    #[test]
    fn raster_area() {
        let mut alpha = Band::filled(20, 20, 0u8);
        for row in 5..15 {
            for col in 2..12 {
                alpha.set(row, col, 255);
            }
        }

        let measurement = MeasurementEngine::default()
            .measure_raster_area(&raster(alpha))
            .expect("opaque");
        assert_relative_eq!(measurement.area_m2, 1.0, max_relative = 1e-4);
        assert_eq!(measurement.crs, utm33());
        assert!(measurement.warning.is_none());
    }

    #[test]
    fn transparent_raster() {
        assert_matches!(
            MeasurementEngine::default().measure_raster_area(&raster(Band::filled(5, 5, 0))),
            Err(MeasureError::NoOpaqueRegion)
        );
    }

    #[test]
    fn tiny_area_is_empty() {
        let options = MeasurementOptions {
            min_area_m2: 10.0,
            ..Default::default()
        };
        assert_matches!(
            MeasurementEngine::new(options).measure_raster_area(&raster(Band::filled(3, 3, 1))),
            Err(MeasureError::NoOpaqueRegion)
        );
        assert_matches!(
            MeasurementEngine::new(MeasurementOptions {
                min_area_m2: 2000.0,
                ..Default::default()
            })
            .measure_roi(&roi()),
            Err(MeasureError::EmptyGeometry)
        );
    }

    #[test]
    fn roi_dimensions() {
        let measurement = MeasurementEngine::default()
            .measure_roi(&roi())
            .expect("valid roi");

        assert_relative_eq!(measurement.area_m2, 1500.0, max_relative = 1e-3);
        assert_relative_eq!(measurement.width_m, 30.0, max_relative = 1e-3);
        assert_relative_eq!(measurement.height_m, 50.0, max_relative = 1e-3);
        assert!(measurement.width_m <= measurement.height_m);
        assert_eq!(measurement.geometry.crs(), measurement.crs);
    }

    #[test]
    fn empty_roi() {
        assert_matches!(
            MeasurementEngine::default().measure_roi(&MemoryRoi::new(vec![], Crs::WGS84)),
            Err(MeasureError::EmptyGeometry)
        );
    }

    #[test]
    fn combined_measurement_uses_one_crs() {
        let options = MeasurementOptions {
            reference: ReferenceGeometry::Roi,
            ..Default::default()
        };
        let result = MeasurementEngine::new(options)
            .measure(&raster(Band::filled(100, 100, 255)), &roi())
            .expect("valid inputs");

        assert_eq!(result.crs, utm33());
        assert_eq!(result.reference, ReferenceGeometry::Roi);
        assert_eq!(result.raster_footprint.crs(), result.crs);
        assert_eq!(result.roi_geometry.crs(), result.crs);
        assert_relative_eq!(result.raster_area_m2, 100.0, max_relative = 1e-4);
        assert_relative_eq!(result.roi_area_m2, 1500.0, max_relative = 1e-3);

        let json = serde_json::to_value(&result).expect("serializable");
        assert_eq!(json["crs"], "EPSG:32633");
        assert_eq!(json["reference"], "roi");
        assert!(json.get("raster_footprint").is_none());
        assert!(json["warning"].is_null());
    }

    #[test]
    fn fallback_warning_is_reported() {
        let registry = CrsRegistry::new();
        let engine = MeasurementEngine::with_selector(
            MeasurementOptions::default(),
            ProjectionSelector::with_registry(&registry),
        );

        let result = engine
            .measure(&raster(Band::filled(10, 10, 255)), &roi())
            .expect("fallback is not an error");
        assert_eq!(result.crs, Crs::EPSG3857);
        assert_eq!(
            result.warning.expect("fallback warning").attempted,
            Some(32633)
        );
    }
}
