use crate::error::{MeasureError, MeasureResult};
use crate::vector::VectorSource;
use geo_types::{Coord, LineString, Polygon};
use geojson::{GeoJson, Geometry, JsonObject, PolygonType, Position, Value};
use std::path::Path;
use std::str::FromStr;
use uav_area_types::geo::Crs;

/// Region of interest read from a GeoJSON document.
///
/// The document can be a `FeatureCollection`, a single `Feature` or a bare geometry. `Polygon` and `MultiPolygon`
/// geometries (also inside of geometry collections) are used, other geometries are skipped.
///
/// Coordinates are WGS84 longitude and latitude unless the document has a legacy `crs` member naming an EPSG code, or
/// the CRS is set explicitly with [`GeoJsonRoi::with_crs`].
#[derive(Debug, Clone)]
pub struct GeoJsonRoi {
    document: GeoJson,
    crs: Crs,
}

impl GeoJsonRoi {
    /// Reads a GeoJSON file.
    pub fn from_path(path: impl AsRef<Path>) -> MeasureResult<Self> {
        let path = path.as_ref();
        log::debug!("Reading ROI from {}", path.display());
        std::fs::read_to_string(path)?.parse()
    }

    /// Wraps a parsed document.
    pub fn from_document(document: GeoJson) -> MeasureResult<Self> {
        let crs = match document_crs(&document)? {
            Some(crs) => crs,
            None => Crs::WGS84,
        };

        Ok(Self { document, crs })
    }

    /// Overrides the CRS of the coordinates.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    /// The parsed document.
    pub fn document(&self) -> &GeoJson {
        &self.document
    }
}

impl FromStr for GeoJsonRoi {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_document(s.parse::<GeoJson>()?)
    }
}

impl VectorSource for GeoJsonRoi {
    fn crs(&self) -> Crs {
        self.crs
    }

    fn features(&self) -> MeasureResult<Vec<Polygon>> {
        let mut polygons = vec![];
        match &self.document {
            GeoJson::Geometry(geometry) => collect_polygons(geometry, &mut polygons)?,
            GeoJson::Feature(feature) => {
                if let Some(geometry) = &feature.geometry {
                    collect_polygons(geometry, &mut polygons)?;
                }
            }
            GeoJson::FeatureCollection(collection) => {
                for (index, feature) in collection.features.iter().enumerate() {
                    match &feature.geometry {
                        Some(geometry) => collect_polygons(geometry, &mut polygons)?,
                        None => log::debug!("Feature {index} has no geometry, skipped"),
                    }
                }
            }
        }

        log::debug!("Read {} ROI polygons in {}", polygons.len(), self.crs);
        Ok(polygons)
    }
}

/// CRS named by the legacy (2008) `crs` member, e.g.
/// `"crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::32633"}}`.
fn document_crs(document: &GeoJson) -> MeasureResult<Option<Crs>> {
    let foreign_members = match document {
        GeoJson::Geometry(geometry) => &geometry.foreign_members,
        GeoJson::Feature(feature) => &feature.foreign_members,
        GeoJson::FeatureCollection(collection) => &collection.foreign_members,
    };

    let Some(name) = foreign_members.as_ref().and_then(crs_name) else {
        return Ok(None);
    };

    let crs = name.parse::<Crs>()?;
    log::debug!("GeoJSON document declares {crs}");
    Ok(Some(crs))
}

fn crs_name(members: &JsonObject) -> Option<&str> {
    members
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
}

fn collect_polygons(geometry: &Geometry, polygons: &mut Vec<Polygon>) -> MeasureResult<()> {
    match &geometry.value {
        Value::Polygon(polygon) => polygons.push(convert_polygon(polygon)?),
        Value::MultiPolygon(multi_polygon) => {
            for polygon in multi_polygon {
                polygons.push(convert_polygon(polygon)?);
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_polygons(geometry, polygons)?;
            }
        }
        other => log::debug!("Skipping {} geometry", geometry_type(other)),
    }

    Ok(())
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn convert_position(position: &Position) -> MeasureResult<Coord> {
    match position[..] {
        [x, y, ..] => Ok(Coord { x, y }),
        _ => Err(MeasureError::InvalidVector(format!(
            "position {position:?} must have at least 2 coordinates"
        ))),
    }
}

fn convert_ring(ring: &[Position]) -> MeasureResult<LineString> {
    Ok(LineString::new(
        ring.iter()
            .map(convert_position)
            .collect::<MeasureResult<Vec<_>>>()?,
    ))
}

fn convert_polygon(polygon: &PolygonType) -> MeasureResult<Polygon> {
    let Some((exterior, interiors)) = polygon.split_first() else {
        return Err(MeasureError::InvalidVector(
            "polygon must have an exterior ring".into(),
        ));
    };

    Ok(Polygon::new(
        convert_ring(exterior)?,
        interiors
            .iter()
            .map(|ring| convert_ring(ring))
            .collect::<MeasureResult<Vec<_>>>()?,
    ))
}
