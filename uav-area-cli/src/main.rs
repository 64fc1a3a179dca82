//! Measures the opaque area of a UAV raster and the area and dimensions of a region of interest.
//!
//! ```shell
//! uav-area --raster ortho.png --raster-crs EPSG:32633 --roi field.geojson --unit m2
//! uav-area --raster ortho.tif --roi field.shp
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uav_area::raster::{read_world_file, GeoTiffRaster, GeoTransform, ImageRaster, RasterSource};
use uav_area::units::format_length;
use uav_area::vector::{GeoJsonRoi, ShapefileRoi, VectorSource};
use uav_area::{
    AreaUnit, MeasurementEngine, MeasurementOptions, MeasurementResult, ProjectionWarning,
    RasterMeasurement, ReferenceGeometry, RoiMeasurement,
};
use uav_area_types::geo::Crs;

#[derive(Parser, Debug)]
#[command(name = "uav-area", version)]
#[command(about = "Measures UAV raster footprints and regions of interest in their local UTM zone")]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["raster", "roi"])))]
struct Args {
    /// Raster with an alpha channel: a GeoTIFF, or a PNG, JPEG or TIFF image with a world file
    #[arg(long)]
    raster: Option<PathBuf>,

    /// World file of the raster (default: next to the raster, e.g. `.pgw`, `.tfw` or `.wld`).
    /// A `.tif` raster is read as a plain image only if this is given
    #[arg(long, requires = "raster")]
    world_file: Option<PathBuf>,

    /// CRS of the raster coordinates (default: the GeoKeys of a GeoTIFF or EPSG:4326)
    #[arg(long, requires = "raster")]
    raster_crs: Option<Crs>,

    /// GeoJSON file or ESRI shapefile (`.shp`) with the region of interest
    #[arg(long)]
    roi: Option<PathBuf>,

    /// CRS of the ROI coordinates (default: the `crs` member of a GeoJSON document, the `.prj` file of a
    /// shapefile, or EPSG:4326)
    #[arg(long, requires = "roi")]
    roi_crs: Option<Crs>,

    /// Geometry the common CRS is selected for when both inputs are given
    #[arg(long, value_enum, default_value_t = Reference::Raster)]
    reference: Reference,

    /// Unit of the printed areas: `ha` or `m2`
    #[arg(long, default_value = "ha")]
    unit: AreaUnit,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Reference {
    Raster,
    Roi,
}

impl From<Reference> for ReferenceGeometry {
    fn from(value: Reference) -> Self {
        match value {
            Reference::Raster => ReferenceGeometry::Raster,
            Reference::Roi => ReferenceGeometry::Roi,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum Report {
    Raster(RasterMeasurement),
    Roi(RoiMeasurement),
    Combined(MeasurementResult),
}

impl Report {
    fn warning(&self) -> Option<&ProjectionWarning> {
        match self {
            Report::Raster(m) => m.warning.as_ref(),
            Report::Roi(m) => m.warning.as_ref(),
            Report::Combined(m) => m.warning.as_ref(),
        }
    }

    fn to_text(&self, unit: AreaUnit) -> String {
        let mut lines = vec![];
        match self {
            Report::Raster(m) => {
                lines.push(format!("Raster area: {}", unit.format(m.area_m2)));
                lines.push(format!("CRS: {}", m.crs));
            }
            Report::Roi(m) => {
                lines.push(format!("ROI area: {}", unit.format(m.area_m2)));
                lines.push(format!("ROI width: {}", format_length(m.width_m)));
                lines.push(format!("ROI height: {}", format_length(m.height_m)));
                lines.push(format!("CRS: {}", m.crs));
            }
            Report::Combined(m) => {
                lines.push(format!("Raster area: {}", unit.format(m.raster_area_m2)));
                lines.push(format!("ROI area: {}", unit.format(m.roi_area_m2)));
                lines.push(format!("ROI width: {}", format_length(m.roi_width_m)));
                lines.push(format!("ROI height: {}", format_length(m.roi_height_m)));
                lines.push(format!("CRS: {}", m.crs));
            }
        }

        lines.join("\n")
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extensions
                .iter()
                .any(|candidate| extension.eq_ignore_ascii_case(candidate))
        })
}

/// A `.tif` raster without an explicit world file is read as a GeoTIFF.
fn is_geotiff(args: &Args, path: &Path) -> bool {
    args.world_file.is_none() && has_extension(path, &["tif", "tiff"])
}

fn open_geotiff(args: &Args, path: &Path) -> Result<GeoTiffRaster> {
    let raster = match args.raster_crs {
        Some(crs) => GeoTiffRaster::open_with_crs(path, crs),
        None => GeoTiffRaster::open(path),
    };

    raster.with_context(|| format!("failed to open GeoTIFF {}", path.display()))
}

fn open_image(args: &Args, path: &Path) -> Result<ImageRaster> {
    let transform = match &args.world_file {
        Some(world_file) => {
            let contents = std::fs::read_to_string(world_file)
                .with_context(|| format!("failed to read {}", world_file.display()))?;
            GeoTransform::from_world_file(&contents)?
        }
        None => read_world_file(path)?,
    };

    ImageRaster::open_with_transform(path, transform, args.raster_crs.unwrap_or(Crs::WGS84))
        .with_context(|| format!("failed to open raster {}", path.display()))
}

fn open_roi(args: &Args, path: &Path) -> Result<Box<dyn VectorSource>> {
    let context = || format!("failed to read ROI {}", path.display());

    if has_extension(path, &["shp"]) {
        let roi = match args.roi_crs {
            Some(crs) => ShapefileRoi::from_path_with_crs(path, crs),
            None => ShapefileRoi::from_path(path),
        };
        return Ok(Box::new(roi.with_context(context)?));
    }

    let roi = GeoJsonRoi::from_path(path).with_context(context)?;
    Ok(Box::new(match args.roi_crs {
        Some(crs) => roi.with_crs(crs),
        None => roi,
    }))
}

fn measure_with_raster<S: RasterSource>(
    engine: &MeasurementEngine,
    raster: &S,
    roi: Option<&dyn VectorSource>,
) -> Result<Report> {
    Ok(match roi {
        Some(roi) => {
            log::info!(
                "Measuring raster in {} and ROI in {} in one CRS",
                raster.crs(),
                roi.crs()
            );
            Report::Combined(engine.measure(raster, roi)?)
        }
        None => Report::Raster(engine.measure_raster_area(raster)?),
    })
}

fn run(args: &Args) -> Result<Report> {
    let engine = MeasurementEngine::new(MeasurementOptions {
        reference: args.reference.into(),
        ..Default::default()
    });

    let roi = args
        .roi
        .as_deref()
        .map(|path| open_roi(args, path))
        .transpose()?;

    match &args.raster {
        Some(path) if is_geotiff(args, path) => {
            measure_with_raster(&engine, &open_geotiff(args, path)?, roi.as_deref())
        }
        Some(path) => measure_with_raster(&engine, &open_image(args, path)?, roi.as_deref()),
        None => {
            let roi = roi.ok_or_else(|| anyhow!("either --raster or --roi must be given"))?;
            Ok(Report::Roi(engine.measure_roi(roi.as_ref())?))
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let report = run(&args)?;

    if let Some(warning) = report.warning() {
        eprintln!("Warning: {warning}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.to_text(args.unit));
    }

    Ok(())
}
