use crate::error::{MeasureError, MeasureResult};
use crate::raster::transform::read_world_file;
use crate::raster::{Band, GeoTransform, RasterSource};
use image::{DynamicImage, GenericImageView};
use std::path::Path;
use uav_area_types::geo::Crs;

/// Raster decoded from a PNG, JPEG or TIFF image.
///
/// Every color channel of the image is a band, so only images with an alpha channel stored as RGBA have the opacity
/// band. Samples are normalized to `0.0..=1.0`.
#[derive(Debug, Clone)]
pub struct ImageRaster {
    image: DynamicImage,
    transform: GeoTransform,
    crs: Crs,
}

impl ImageRaster {
    /// Opens the image and reads its transformation from the world file next to it.
    pub fn open(path: impl AsRef<Path>, crs: Crs) -> MeasureResult<Self> {
        let path = path.as_ref();
        let transform = read_world_file(path)?;
        Self::open_with_transform(path, transform, crs)
    }

    /// Opens the image with an explicitly given transformation.
    pub fn open_with_transform(
        path: impl AsRef<Path>,
        transform: GeoTransform,
        crs: Crs,
    ) -> MeasureResult<Self> {
        let path = path.as_ref();
        log::debug!("Decoding raster {}", path.display());
        let image = image::open(path)?;
        Ok(Self::from_image(image, transform, crs))
    }

    /// Decodes an image from memory.
    pub fn from_bytes(bytes: &[u8], transform: GeoTransform, crs: Crs) -> MeasureResult<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(image, transform, crs))
    }

    /// Wraps an already decoded image.
    pub fn from_image(image: DynamicImage, transform: GeoTransform, crs: Crs) -> Self {
        Self {
            image,
            transform,
            crs,
        }
    }

    fn interleaved_samples(&self) -> Vec<f32> {
        match self.band_count() {
            1 => self.image.to_luma32f().into_raw(),
            2 => self.image.to_luma_alpha32f().into_raw(),
            3 => self.image.to_rgb32f().into_raw(),
            _ => self.image.to_rgba32f().into_raw(),
        }
    }
}

impl RasterSource for ImageRaster {
    type Sample = f32;

    fn band_count(&self) -> usize {
        self.image.color().channel_count() as usize
    }

    fn read_band(&self, index: usize) -> MeasureResult<Band<f32>> {
        let bands = self.band_count();
        if index == 0 || index > bands {
            return Err(MeasureError::InvalidRaster(format!(
                "band {index} requested, image has {bands} bands"
            )));
        }

        let (width, height) = self.image.dimensions();
        let samples = self
            .interleaved_samples()
            .into_iter()
            .skip(index - 1)
            .step_by(bands)
            .collect();

        Band::new(width as usize, height as usize, samples)
    }

    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn crs(&self) -> Crs {
        self.crs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterMask;
    use assert_matches::assert_matches;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn transform() -> GeoTransform {
        GeoTransform::new(500_000.0, 5_500_000.0, 0.1, -0.1)
    }

    fn utm() -> Crs {
        Crs::from_epsg(32633).expect("known code")
    }

    #[test]
    fn rgba_image_has_alpha_band() {
        let mut image = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 0]));
        image.put_pixel(2, 1, Rgba([10, 20, 30, 255]));
        let raster = ImageRaster::from_image(DynamicImage::ImageRgba8(image), transform(), utm());

        assert_eq!(raster.band_count(), 4);
        let alpha = raster.read_band(4).expect("exists");
        assert_eq!(alpha.width(), 4);
        assert_eq!(alpha.height(), 3);
        assert_eq!(alpha.get(1, 2), Some(1.0));
        assert_eq!(alpha.get(0, 0), Some(0.0));

        let mask = RasterMask::from_source(&raster).expect("has alpha");
        assert!(mask.is_opaque(1, 2));
        assert!(!mask.is_opaque(1, 1));
    }

    #[test]
    fn rgb_image_has_no_alpha() {
        let image = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        let raster = ImageRaster::from_image(DynamicImage::ImageRgb8(image), transform(), utm());

        assert_eq!(raster.band_count(), 3);
        assert_matches!(raster.read_band(4), Err(MeasureError::InvalidRaster(_)));
        assert_matches!(
            RasterMask::from_source(&raster),
            Err(MeasureError::MissingAlphaChannel { bands: 3 })
        );
    }

    #[test]
    fn open_png_with_world_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ortho.png");
        RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))
            .save(&path)
            .expect("png encoding");
        std::fs::write(
            dir.path().join("ortho.pgw"),
            "0.1\n0.0\n0.0\n-0.1\n500000.05\n5499999.95\n",
        )
        .expect("write world file");

        let raster = ImageRaster::open(&path, utm()).expect("valid raster");
        let t = raster.transform();
        approx::assert_abs_diff_eq!(t.origin_x, 500_000.0, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(t.origin_y, 5_500_000.0, epsilon = 1e-6);
        assert_eq!(raster.read_band(4).expect("exists").get(1, 1), Some(1.0));
    }

    #[test]
    fn open_without_world_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ortho.png");
        RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]))
            .save(&path)
            .expect("png encoding");

        assert_matches!(
            ImageRaster::open(&path, utm()),
            Err(MeasureError::InvalidTransform(_))
        );
    }
}
