use approx::{assert_abs_diff_eq, assert_relative_eq};
use assert_matches::assert_matches;
use geo_types::{coord, Coord, LineString, Polygon};
use uav_area::raster::{Band, GeoTransform, MemoryRaster};
use uav_area::vector::{GeoJsonRoi, MemoryRoi, VectorSource};
use uav_area::{
    CrsGeometry, ErrorKind, MeasureError, MeasurementEngine, MeasurementOptions,
    ProjectionSelector, ReferenceGeometry,
};
use uav_area_types::geo::{Crs, Projection};
use uav_area_types::ProjectCoords;

fn utm33() -> Crs {
    Crs::from_epsg(32633).expect("known code")
}

fn block_raster(size: usize, block: usize) -> MemoryRaster<u8> {
    let mut alpha = Band::filled(size, size, 0u8);
    for row in 0..block {
        for col in 0..block {
            alpha.set(row, col, 255);
        }
    }

    MemoryRaster::from_alpha(
        alpha,
        255,
        GeoTransform::new(500_000.0, 5_500_000.0, 0.1, -0.1),
        utm33(),
    )
}

/// Rectangle `a` by `b` meters centered at `center` and rotated by `angle_deg`, built in `crs` and returned in WGS84.
fn geographic_rectangle(crs: Crs, center: Coord, a: f64, b: f64, angle_deg: f64) -> Polygon {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let corner = |x: f64, y: f64| coord! {
        x: center.x + x * cos - y * sin,
        y: center.y + x * sin + y * cos,
    };
    let projected = Polygon::new(
        LineString::new(vec![
            corner(-a / 2.0, -b / 2.0),
            corner(a / 2.0, -b / 2.0),
            corner(a / 2.0, b / 2.0),
            corner(-a / 2.0, b / 2.0),
            corner(-a / 2.0, -b / 2.0),
        ]),
        vec![],
    );

    let transformation = Crs::WGS84
        .transformation_to::<Coord>(&crs)
        .expect("supported projection");
    projected
        .unproject_coords(&transformation)
        .expect("valid coordinates")
}

#[test]
fn opaque_block_area() {
    let measurement = MeasurementEngine::default()
        .measure_raster_area(&block_raster(200, 100))
        .expect("opaque block");

    assert_eq!(measurement.crs, utm33());
    assert_relative_eq!(measurement.area_m2, 100.0, max_relative = 1e-4);
    assert!(measurement.warning.is_none());
}

#[test]
fn rotated_roi_dimensions() {
    let polygon = geographic_rectangle(
        utm33(),
        coord! { x: 480_000.0, y: 5_540_000.0 },
        50.0,
        30.0,
        35.0,
    );
    let roi = MemoryRoi::new(vec![polygon], Crs::WGS84);

    let measurement = MeasurementEngine::default()
        .measure_roi(&roi)
        .expect("valid roi");

    assert_eq!(measurement.crs, utm33());
    assert_relative_eq!(measurement.width_m, 30.0, max_relative = 1e-3);
    assert_relative_eq!(measurement.height_m, 50.0, max_relative = 1e-3);
    assert_relative_eq!(measurement.area_m2, 1500.0, max_relative = 1e-3);
    assert!(measurement.width_m <= measurement.height_m);
}

#[test]
fn measurements_survive_reprojection_round_trip() {
    let polygon = geographic_rectangle(
        utm33(),
        coord! { x: 510_000.0, y: 5_300_000.0 },
        120.0,
        40.0,
        -20.0,
    );
    let engine = MeasurementEngine::default();
    let geometry = CrsGeometry::from_polygons(vec![polygon], Crs::WGS84);
    let first = engine.measure_roi(&geometry).expect("valid roi");

    let round_trip = geometry
        .reproject(&first.crs)
        .and_then(|g| g.reproject(&Crs::WGS84))
        .expect("valid reprojection");
    let second = engine.measure_roi(&round_trip).expect("valid roi");

    assert_eq!(first.crs, second.crs);
    assert_relative_eq!(first.area_m2, second.area_m2, max_relative = 1e-7);
    assert_relative_eq!(first.width_m, second.width_m, max_relative = 1e-7);
    assert_relative_eq!(first.height_m, second.height_m, max_relative = 1e-7);
}

#[test]
fn raster_without_alpha() {
    let raster = MemoryRaster::new(
        vec![Band::filled(4, 4, 255u8); 3],
        GeoTransform::new(500_000.0, 5_500_000.0, 0.1, -0.1),
        utm33(),
    )
    .expect("valid raster");

    let err = MeasurementEngine::default()
        .measure(&raster, &MemoryRoi::new(vec![], Crs::WGS84))
        .expect_err("no alpha channel");
    assert_matches!(err, MeasureError::MissingAlphaChannel { bands: 3 });
    assert_eq!(err.kind(), ErrorKind::MissingAlphaChannel);
}

#[test]
fn fully_transparent_raster() {
    let err = MeasurementEngine::default()
        .measure_raster_area(&block_raster(10, 0))
        .expect_err("nothing opaque");
    assert_matches!(err, MeasureError::NoOpaqueRegion);
    assert_eq!(err.kind(), ErrorKind::NoOpaqueRegion);
}

#[test]
fn zone_selection_edges() {
    let selector = ProjectionSelector::new();

    assert_eq!(selector.select_for_point(-180.0, 10.0).crs.epsg(), 32601);
    assert_eq!(selector.select_for_point(180.0, 10.0).crs.epsg(), 32660);
    assert_eq!(selector.select_for_point(20.0, 0.0).crs.epsg(), 32634);
    assert_eq!(selector.select_for_point(20.0, -0.5).crs.epsg(), 32734);

    let fallback = selector.select_for_point(f64::INFINITY, 0.0);
    assert_eq!(fallback.crs, Crs::EPSG3857);
    assert!(fallback.warning.is_some());
}

#[cfg(feature = "image")]
#[test]
fn combined_measurement_from_files() -> anyhow::Result<()> {
    use image::{Rgba, RgbaImage};

    let dir = tempfile::tempdir()?;

    // 100 x 50 opaque cells of 0.1 m: 50 m².
    let mut image = RgbaImage::from_pixel(120, 80, Rgba([0, 0, 0, 0]));
    for y in 10..60 {
        for x in 10..110 {
            image.put_pixel(x, y, Rgba([40, 120, 40, 255]));
        }
    }
    let image_path = dir.path().join("ortho.png");
    image.save(&image_path)?;
    std::fs::write(
        dir.path().join("ortho.pgw"),
        "0.1\n0\n0\n-0.1\n500000.05\n5499999.95\n",
    )?;

    let roi_path = dir.path().join("roi.geojson");
    std::fs::write(
        &roi_path,
        r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "EPSG:32633"}},
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [500000, 5499992], [500012, 5499992], [500012, 5500000], [500000, 5500000], [500000, 5499992]
                    ]]
                }
            }]
        }"#,
    )?;

    let raster = uav_area::raster::ImageRaster::open(&image_path, utm33())?;
    let roi = GeoJsonRoi::from_path(&roi_path)?;
    assert_eq!(roi.crs(), utm33());

    let result = MeasurementEngine::new(MeasurementOptions {
        reference: ReferenceGeometry::Raster,
        ..Default::default()
    })
    .measure(&raster, &roi)?;

    assert_eq!(result.crs, utm33());
    assert_relative_eq!(result.raster_area_m2, 50.0, max_relative = 1e-4);
    assert_relative_eq!(result.roi_area_m2, 96.0, max_relative = 1e-6);
    assert_abs_diff_eq!(result.roi_width_m, 8.0, epsilon = 1e-6);
    assert_abs_diff_eq!(result.roi_height_m, 12.0, epsilon = 1e-6);

    Ok(())
}

#[test]
fn projection_of_unprojected_rectangle_is_exact() {
    let polygon = geographic_rectangle(
        utm33(),
        coord! { x: 500_000.0, y: 5_000_000.0 },
        10.0,
        10.0,
        0.0,
    );
    let transformation = Crs::WGS84
        .transformation_to::<Coord>(&utm33())
        .expect("supported projection");
    let back = transformation
        .project(&polygon.exterior().0[0])
        .expect("valid point");

    assert_abs_diff_eq!(back.x, 499_995.0, epsilon = 1e-6);
    assert_abs_diff_eq!(back.y, 4_999_995.0, epsilon = 1e-6);
}
