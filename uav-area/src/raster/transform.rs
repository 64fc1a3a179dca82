//! Affine georeferencing of raster grids.

use crate::error::{MeasureError, MeasureResult};
use geo_types::{coord, Coord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Affine transformation from grid positions to CRS coordinates.
///
/// Grid positions are `(col, row)` pairs where integer values are cell *corners*, so cell `(row, col)` spans from
/// `(col, row)` to `(col + 1, row + 1)`:
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up images the rotation terms are 0 and `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner of the grid.
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner of the grid.
    pub origin_y: f64,
    /// Cell size along the row direction.
    pub pixel_width: f64,
    /// Cell size along the column direction, usually negative.
    pub pixel_height: f64,
    /// Rotation term applied to the row index for x.
    pub row_rotation: f64,
    /// Rotation term applied to the column index for y.
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform without rotation.
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Creates from GDAL-ordered coefficients
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// GDAL-ordered coefficients.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Parses an ESRI world file.
    ///
    /// A world file has six lines `A D B E C F` where `C` and `F` locate the *center* of the upper-left cell. The
    /// returned transform is shifted by half a cell to the corner.
    pub fn from_world_file(contents: &str) -> MeasureResult<Self> {
        let values = contents
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    MeasureError::InvalidTransform(format!("invalid world file value '{token}'"))
                })
            })
            .collect::<MeasureResult<Vec<f64>>>()?;

        let [a, d, b, e, c, f] = values[..] else {
            return Err(MeasureError::InvalidTransform(format!(
                "world file must contain 6 values, found {}",
                values.len()
            )));
        };

        let transform = Self {
            origin_x: c - a / 2.0 - b / 2.0,
            origin_y: f - d / 2.0 - e / 2.0,
            pixel_width: a,
            pixel_height: e,
            row_rotation: b,
            col_rotation: d,
        };
        transform.validate()?;

        Ok(transform)
    }

    /// Coordinates of the grid position `(col, row)`.
    pub fn apply(&self, col: f64, row: f64) -> Coord {
        coord! {
            x: self.origin_x + col * self.pixel_width + row * self.row_rotation,
            y: self.origin_y + col * self.col_rotation + row * self.pixel_height,
        }
    }

    /// Determinant of the linear part. Its absolute value is the area of one cell.
    pub fn determinant(&self) -> f64 {
        self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation
    }

    /// Checks that all coefficients are finite and the transform is invertible.
    pub fn validate(&self) -> MeasureResult<()> {
        if self.to_gdal().iter().any(|v| !v.is_finite()) {
            return Err(MeasureError::InvalidTransform(format!(
                "non-finite coefficients {:?}",
                self.to_gdal()
            )));
        }

        if self.determinant() == 0.0 {
            return Err(MeasureError::InvalidTransform(
                "transform collapses cells to zero area".into(),
            ));
        }

        Ok(())
    }
}

/// Paths where a world file for the raster at `path` can be found, in the order of preference.
///
/// For `ortho.tif` these are `ortho.tfw`, `ortho.tifw` and `ortho.wld`.
pub fn world_file_candidates(path: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![];
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let mut chars = ext.chars();
        if let (Some(first), Some(last)) = (chars.next(), chars.last()) {
            candidates.push(path.with_extension(format!("{first}{last}w")));
        }
        candidates.push(path.with_extension(format!("{ext}w")));
    }
    candidates.push(path.with_extension("wld"));

    candidates
}

/// Reads the first world file found next to the raster.
pub fn read_world_file(raster_path: &Path) -> MeasureResult<GeoTransform> {
    for candidate in world_file_candidates(raster_path) {
        if candidate.is_file() {
            log::debug!("Reading world file {}", candidate.display());
            return GeoTransform::from_world_file(&std::fs::read_to_string(&candidate)?);
        }
    }

    Err(MeasureError::InvalidTransform(format!(
        "no world file found for {}",
        raster_path.display()
    )))
}
