//! Dissolving of polygon sets into a single geometry.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::CrsGeometry;
use geo::{Area, BooleanOps};
use geo_types::{MultiPolygon, Polygon};

/// Merges polygons sharing one CRS into one geometry.
///
/// Overlapping areas are counted once and shared boundaries between adjacent polygons are removed. The geometry is
/// not reprojected.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeometryUnifier;

impl GeometryUnifier {
    /// Creates a new unifier.
    pub fn new() -> Self {
        Self
    }

    /// Dissolves all polygons of the geometry.
    pub fn unify(&self, geometry: &CrsGeometry) -> MeasureResult<CrsGeometry> {
        let unified = self.unify_polygons(geometry.geometry().0.iter().cloned())?;
        Ok(CrsGeometry::new(unified, geometry.crs()))
    }

    /// Dissolves a set of polygons into one multipolygon.
    ///
    /// Polygons without area are ignored. Fails with [`MeasureError::EmptyGeometry`] if nothing is left.
    ///
    /// Polygons are merged pairwise in a balanced tree, so each union operates on inputs of similar complexity. The
    /// order of merging depends only on the order of the input, so the result is deterministic.
    pub fn unify_polygons(
        &self,
        polygons: impl IntoIterator<Item = Polygon>,
    ) -> MeasureResult<MultiPolygon> {
        let mut parts: Vec<MultiPolygon> = polygons
            .into_iter()
            .filter(|polygon| polygon.unsigned_area() > 0.0)
            .map(|polygon| MultiPolygon::new(vec![polygon]))
            .collect();

        if parts.is_empty() {
            return Err(MeasureError::EmptyGeometry);
        }

        let input_count = parts.len();
        while parts.len() > 1 {
            let mut merged = Vec::with_capacity(parts.len().div_ceil(2));
            let mut iter = parts.into_iter();
            while let Some(first) = iter.next() {
                match iter.next() {
                    Some(second) => merged.push(first.union(&second)),
                    None => merged.push(first),
                }
            }
            parts = merged;
        }

        let unified = parts.pop().ok_or(MeasureError::EmptyGeometry)?;
        log::debug!(
            "Unified {input_count} polygons into {} parts",
            unified.0.len()
        );

        if unified.0.is_empty() {
            return Err(MeasureError::EmptyGeometry);
        }

        Ok(unified)
    }
}
