//! Raster inputs: band data, georeferencing and the opacity mask.

use crate::error::{MeasureError, MeasureResult};
use num_traits::Zero;
use uav_area_types::geo::Crs;

#[cfg(feature = "geotiff")]
mod geotiff;
#[cfg(feature = "image")]
mod image;
mod transform;

#[cfg(feature = "geotiff")]
pub use self::geotiff::{transform_from_tags, GeoKeys, GeoTiffRaster};
#[cfg(feature = "image")]
pub use self::image::ImageRaster;
pub use transform::{read_world_file, world_file_candidates, GeoTransform};

/// 1-based index of the band holding the opacity of the cells.
pub const ALPHA_BAND: usize = 4;

/// Single band of raster samples stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Band<T> {
    width: usize,
    height: usize,
    samples: Vec<T>,
}

impl<T: Copy> Band<T> {
    /// Creates a band. Fails if the number of samples does not equal `width * height`.
    pub fn new(width: usize, height: usize, samples: Vec<T>) -> MeasureResult<Self> {
        if width.checked_mul(height) != Some(samples.len()) {
            return Err(MeasureError::InvalidRaster(format!(
                "band of {width}x{height} cells cannot hold {} samples",
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Creates a band with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width * height],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at the given cell, or `None` outside of the band.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.height || col >= self.width {
            return None;
        }

        self.samples.get(row * self.width + col).copied()
    }

    /// Sets the sample at the given cell. Cells outside of the band are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        if row < self.height && col < self.width {
            self.samples[row * self.width + col] = value;
        }
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[T] {
        &self.samples
    }
}

/// Georeferenced multi-band raster.
pub trait RasterSource {
    /// Numeric type of the samples.
    type Sample: Copy + PartialOrd + Zero;

    /// Number of bands.
    fn band_count(&self) -> usize;
    /// Reads the band with the given 1-based index.
    fn read_band(&self, index: usize) -> MeasureResult<Band<Self::Sample>>;
    /// Grid to CRS transformation.
    fn transform(&self) -> GeoTransform;
    /// CRS of the transformed coordinates.
    fn crs(&self) -> Crs;
}

/// Raster with all bands held in memory.
#[derive(Debug, Clone)]
pub struct MemoryRaster<T> {
    bands: Vec<Band<T>>,
    transform: GeoTransform,
    crs: Crs,
}

impl<T: Copy> MemoryRaster<T> {
    /// Creates a raster. All bands must have the same size.
    pub fn new(bands: Vec<Band<T>>, transform: GeoTransform, crs: Crs) -> MeasureResult<Self> {
        if let Some(first) = bands.first() {
            if bands
                .iter()
                .any(|b| b.width() != first.width() || b.height() != first.height())
            {
                return Err(MeasureError::InvalidRaster(
                    "all bands must have the same size".into(),
                ));
            }
        }

        Ok(Self {
            bands,
            transform,
            crs,
        })
    }

    /// Creates an RGBA raster with the given opacity band and fully saturated color bands.
    pub fn from_alpha(alpha: Band<T>, max: T, transform: GeoTransform, crs: Crs) -> Self {
        let color = Band::filled(alpha.width(), alpha.height(), max);
        Self {
            bands: vec![color.clone(), color.clone(), color, alpha],
            transform,
            crs,
        }
    }
}

impl<T: Copy + PartialOrd + Zero> RasterSource for MemoryRaster<T> {
    type Sample = T;

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn read_band(&self, index: usize) -> MeasureResult<Band<T>> {
        index
            .checked_sub(1)
            .and_then(|i| self.bands.get(i))
            .cloned()
            .ok_or_else(|| {
                MeasureError::InvalidRaster(format!(
                    "band {index} requested, raster has {} bands",
                    self.bands.len()
                ))
            })
    }

    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn crs(&self) -> Crs {
        self.crs
    }
}

/// Opacity band of a raster with its georeferencing.
#[derive(Debug, Clone)]
pub struct RasterMask<T> {
    band: Band<T>,
    transform: GeoTransform,
    crs: Crs,
}

impl<T: Copy + PartialOrd + Zero> RasterMask<T> {
    /// Creates a mask from a band.
    pub fn new(band: Band<T>, transform: GeoTransform, crs: Crs) -> Self {
        Self {
            band,
            transform,
            crs,
        }
    }

    /// Reads the opacity band of the source.
    ///
    /// Fails with [`MeasureError::MissingAlphaChannel`] if the source has fewer than [`ALPHA_BAND`] bands.
    pub fn from_source<S>(source: &S) -> MeasureResult<Self>
    where
        S: RasterSource<Sample = T> + ?Sized,
    {
        let bands = source.band_count();
        if bands < ALPHA_BAND {
            return Err(MeasureError::MissingAlphaChannel { bands });
        }

        let transform = source.transform();
        transform.validate()?;

        let band = source.read_band(ALPHA_BAND)?;
        log::debug!(
            "Read opacity band of {}x{} cells in {}",
            band.width(),
            band.height(),
            source.crs()
        );

        Ok(Self::new(band, transform, source.crs()))
    }

    /// Returns true if the cell is opaque. Cells outside of the band are transparent.
    pub fn is_opaque(&self, row: usize, col: usize) -> bool {
        self.band
            .get(row, col)
            .map(|v| v > T::zero())
            .unwrap_or(false)
    }

    /// Opacity samples.
    pub fn band(&self) -> &Band<T> {
        &self.band
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.band.width()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.band.height()
    }

    /// Grid to CRS transformation.
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// CRS of the transformed coordinates.
    pub fn crs(&self) -> Crs {
        self.crs
    }
}
