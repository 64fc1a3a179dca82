//! Error types used by the crate.

use thiserror::Error;
use uav_area_types::geo::Crs;
use uav_area_types::TypesError;

/// Result type alias using [`MeasureError`].
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Error of a measurement request.
///
/// All errors are fatal for the request that produced them and for that request only. The computations are
/// deterministic, so repeating a failed request with the same input fails the same way.
#[derive(Debug, Error)]
pub enum MeasureError {
    /// The raster has no opacity band.
    #[error("raster must have an alpha channel (4 bands required, found {bands})")]
    MissingAlphaChannel {
        /// Number of bands the raster has.
        bands: usize,
    },
    /// No raster cell has an opacity above zero, or the opaque region has no measurable area.
    #[error("no opaque areas with value > 0 found in the raster")]
    NoOpaqueRegion,
    /// The geometry is empty or degenerate (collinear or a single point).
    #[error("geometry is empty or has no measurable area")]
    EmptyGeometry,
    /// A UTM CRS could not be built for the geometry. Only produced inside of
    /// [`ProjectionSelector`](crate::ProjectionSelector), which recovers from it.
    #[error("invalid projection: {0}")]
    InvalidProjection(String),
    /// Some points of the geometry cannot be represented in the target CRS.
    #[error("failed to reproject geometry from {from} to {to}")]
    Reprojection {
        /// Source CRS.
        from: Crs,
        /// Target CRS.
        to: Crs,
    },
    /// Areas and lengths cannot be computed in angular units.
    #[error("cannot measure geometry in geographic CRS {0}")]
    GeographicCrs(Crs),
    /// Raster data is inconsistent.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),
    /// Affine transform is degenerate or cannot be read.
    #[error("invalid geotransform: {0}")]
    InvalidTransform(String),
    /// Vector data cannot be interpreted as polygons.
    #[error("invalid vector data: {0}")]
    InvalidVector(String),
    /// CRS lookup or projection setup error.
    #[error(transparent)]
    Types(#[from] TypesError),
    /// Image decoding error.
    #[cfg(feature = "image")]
    #[error("image decode error: {0:?}")]
    Image(#[from] image::ImageError),
    /// GeoTIFF decoding error.
    #[cfg(feature = "geotiff")]
    #[error("GeoTIFF decode error: {0}")]
    Tiff(#[from] tiff::TiffError),
    /// Shapefile reading error.
    #[cfg(feature = "shapefile")]
    #[error("failed to read shapefile: {0}")]
    Shapefile(#[from] shapefile::Error),
    /// GeoJSON parsing error.
    #[error("failed to parse GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    /// Error reading data from the FS.
    #[error("failed to read file")]
    Io(#[from] std::io::Error),
}

/// Category of a [`MeasureError`], for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`MeasureError::MissingAlphaChannel`].
    MissingAlphaChannel,
    /// See [`MeasureError::NoOpaqueRegion`].
    NoOpaqueRegion,
    /// See [`MeasureError::EmptyGeometry`].
    EmptyGeometry,
    /// See [`MeasureError::InvalidProjection`].
    InvalidProjection,
    /// See [`MeasureError::Reprojection`] and [`MeasureError::GeographicCrs`].
    Reprojection,
    /// Input data cannot be read or interpreted.
    InvalidInput,
    /// File system error.
    Io,
}

impl MeasureError {
    /// Category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeasureError::MissingAlphaChannel { .. } => ErrorKind::MissingAlphaChannel,
            MeasureError::NoOpaqueRegion => ErrorKind::NoOpaqueRegion,
            MeasureError::EmptyGeometry => ErrorKind::EmptyGeometry,
            MeasureError::InvalidProjection(_) => ErrorKind::InvalidProjection,
            MeasureError::Reprojection { .. } | MeasureError::GeographicCrs(_) => {
                ErrorKind::Reprojection
            }
            MeasureError::Io(_) => ErrorKind::Io,
            _ => ErrorKind::InvalidInput,
        }
    }
}
