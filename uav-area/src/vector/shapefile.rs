use crate::error::{MeasureError, MeasureResult};
use crate::vector::VectorSource;
use geo_types::{Coord, LineString, Polygon};
use shapefile::{PolygonRing, Shape, ShapeReader};
use std::io::{Read, Seek};
use std::path::Path;
use uav_area_types::geo::{Crs, Hemisphere};

/// Region of interest read from an ESRI shapefile.
///
/// `Polygon`, `PolygonM` and `PolygonZ` shapes are used, other shapes are skipped. Every outer ring starts a new
/// polygon and the inner rings that follow it become its holes.
///
/// The CRS is read from the `.prj` file next to the `.shp` file. Without one the coordinates are taken as WGS84
/// longitude and latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileRoi {
    polygons: Vec<Polygon>,
    crs: Crs,
}

impl ShapefileRoi {
    /// Reads a `.shp` file and the CRS from its `.prj` file.
    pub fn from_path(path: impl AsRef<Path>) -> MeasureResult<Self> {
        let path = path.as_ref();
        let prj = path.with_extension("prj");
        let crs = if prj.is_file() {
            let crs = crs_from_wkt(&std::fs::read_to_string(&prj)?)?;
            log::debug!("{} declares {crs}", prj.display());
            crs
        } else {
            log::warn!(
                "{} has no .prj file, coordinates are taken as {}",
                path.display(),
                Crs::WGS84
            );
            Crs::WGS84
        };

        Self::from_path_with_crs(path, crs)
    }

    /// Reads a `.shp` file with the given CRS. The `.prj` file is not read.
    pub fn from_path_with_crs(path: impl AsRef<Path>, crs: Crs) -> MeasureResult<Self> {
        let path = path.as_ref();
        log::debug!("Reading ROI from {}", path.display());
        let shapes = ShapeReader::from_path(path)?.read()?;
        Self::from_shapes(shapes, crs)
    }

    /// Reads the shapes of a `.shp` stream.
    pub fn from_reader<R: Read + Seek>(shp: R, crs: Crs) -> MeasureResult<Self> {
        let shapes = ShapeReader::new(shp)?.read()?;
        Self::from_shapes(shapes, crs)
    }

    /// Overrides the CRS of the coordinates.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    fn from_shapes(shapes: Vec<Shape>, crs: Crs) -> MeasureResult<Self> {
        let mut polygons = vec![];
        for (index, shape) in shapes.iter().enumerate() {
            match shape {
                Shape::Polygon(polygon) => {
                    collect_polygons(polygon.rings(), |p| Coord { x: p.x, y: p.y }, &mut polygons)?
                }
                Shape::PolygonM(polygon) => {
                    collect_polygons(polygon.rings(), |p| Coord { x: p.x, y: p.y }, &mut polygons)?
                }
                Shape::PolygonZ(polygon) => {
                    collect_polygons(polygon.rings(), |p| Coord { x: p.x, y: p.y }, &mut polygons)?
                }
                other => log::debug!("Shape {index} is a {:?}, skipped", other.shapetype()),
            }
        }

        log::debug!("Read {} ROI polygons in {crs}", polygons.len());
        Ok(Self { polygons, crs })
    }
}

impl VectorSource for ShapefileRoi {
    fn crs(&self) -> Crs {
        self.crs
    }

    fn features(&self) -> MeasureResult<Vec<Polygon>> {
        Ok(self.polygons.clone())
    }
}

fn collect_polygons<P>(
    rings: &[PolygonRing<P>],
    xy: impl Fn(&P) -> Coord,
    polygons: &mut Vec<Polygon>,
) -> MeasureResult<()> {
    let mut current: Option<(LineString, Vec<LineString>)> = None;
    for ring in rings {
        let line = convert_ring(ring.points(), &xy)?;
        match ring {
            PolygonRing::Outer(_) => {
                if let Some((exterior, holes)) = current.replace((line, vec![])) {
                    polygons.push(Polygon::new(exterior, holes));
                }
            }
            PolygonRing::Inner(_) => match &mut current {
                Some((_, holes)) => holes.push(line),
                None => log::warn!("Inner ring before any outer ring, skipped"),
            },
        }
    }

    if let Some((exterior, holes)) = current {
        polygons.push(Polygon::new(exterior, holes));
    }

    Ok(())
}

fn convert_ring<P>(points: &[P], xy: impl Fn(&P) -> Coord) -> MeasureResult<LineString> {
    let coords = points.iter().map(xy).collect::<Vec<_>>();
    if let Some(coord) = coords.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(MeasureError::InvalidVector(format!(
            "non-finite shapefile coordinate ({}, {})",
            coord.x, coord.y
        )));
    }

    Ok(LineString::new(coords))
}

/// CRS named by the WKT of a `.prj` file.
///
/// The last `AUTHORITY["EPSG", ...]` (or WKT2 `ID["EPSG", ...]`) is used if present. ESRI files carry no authority,
/// for them the CRS name is matched: WGS84, the WGS84 UTM zones and Web Mercator are recognized.
pub fn crs_from_wkt(wkt: &str) -> MeasureResult<Crs> {
    if let Some(code) = epsg_authority(wkt) {
        return Ok(Crs::from_epsg(code)?);
    }

    let name = root_name(wkt).ok_or_else(|| {
        MeasureError::InvalidVector("projection file does not contain a WKT CRS".into())
    })?;
    let normalized: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if let Some(zone) = normalized.split_once("UTMZONE").map(|(_, zone)| zone) {
        let digits: String = zone.chars().take_while(char::is_ascii_digit).collect();
        let hemisphere = match zone[digits.len()..].chars().next() {
            Some('S') => Hemisphere::South,
            _ => Hemisphere::North,
        };
        if normalized.starts_with("WGS84") || normalized.starts_with("WGS1984") {
            if let Ok(zone) = digits.parse::<u8>() {
                return Ok(Crs::utm(zone, hemisphere)?);
            }
        }
    }

    if normalized.contains("WEBMERCATOR") || normalized.contains("PSEUDOMERCATOR") {
        return Ok(Crs::EPSG3857);
    }

    if matches!(normalized.as_str(), "WGS84" | "GCSWGS1984" | "WGS1984") {
        return Ok(Crs::WGS84);
    }

    Err(MeasureError::InvalidVector(format!(
        "unsupported projection '{name}'"
    )))
}

fn epsg_authority(wkt: &str) -> Option<u32> {
    ["AUTHORITY[", "ID["]
        .iter()
        .filter_map(|keyword| {
            wkt.rmatch_indices(keyword)
                .map(|(position, _)| position + keyword.len())
                .find(|&start| quoted_value(&wkt[start..]).is_some_and(|v| v.eq_ignore_ascii_case("EPSG")))
        })
        .max()
        .and_then(|start| {
            let rest = &wkt[start..];
            let (_, code) = rest.split_once(',')?;
            let code: String = code
                .trim_start()
                .trim_start_matches('"')
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            code.parse().ok()
        })
}

fn root_name(wkt: &str) -> Option<&str> {
    let (_, rest) = wkt.split_once('[')?;
    quoted_value(rest)
}

fn quoted_value(text: &str) -> Option<&str> {
    let rest = text.trim_start().strip_prefix('"')?;
    let (value, _) = rest.split_once('"')?;
    Some(value)
}
