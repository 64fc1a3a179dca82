use crate::error::{MeasureError, MeasureResult};
use crate::raster::{Band, GeoTransform, MemoryRaster, RasterSource};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use uav_area_types::geo::Crs;

const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_POINT: u16 = 2;
const USER_DEFINED: u16 = 32767;

/// GeoTIFF keys describing the CRS and the raster space of the image.
///
/// Only the keys stored inline in the key directory are read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeys {
    /// `GTModelTypeGeoKey`: 1 projected, 2 geographic.
    pub model_type: Option<u16>,
    /// `GTRasterTypeGeoKey`: 1 pixel is area, 2 pixel is point.
    pub raster_type: Option<u16>,
    /// `GeographicTypeGeoKey`: EPSG code of the geographic CRS.
    pub geographic_type: Option<u16>,
    /// `ProjectedCSTypeGeoKey`: EPSG code of the projected CRS.
    pub projected_type: Option<u16>,
}

impl GeoKeys {
    /// Parses the values of the `GeoKeyDirectoryTag`.
    pub fn parse(directory: &[u16]) -> MeasureResult<Self> {
        let [_version, _revision, _minor, count, entries @ ..] = directory else {
            return Err(MeasureError::InvalidRaster(
                "GeoKey directory has no header".into(),
            ));
        };

        let count = *count as usize;
        if entries.len() < count * 4 {
            return Err(MeasureError::InvalidRaster(format!(
                "GeoKey directory declares {count} keys but holds {} values",
                entries.len()
            )));
        }

        let mut keys = Self::default();
        for entry in entries.chunks_exact(4).take(count) {
            let [id, location, _count, value] = [entry[0], entry[1], entry[2], entry[3]];
            if location != 0 {
                continue;
            }

            match id {
                GT_MODEL_TYPE => keys.model_type = Some(value),
                GT_RASTER_TYPE => keys.raster_type = Some(value),
                GEOGRAPHIC_TYPE => keys.geographic_type = Some(value),
                PROJECTED_CS_TYPE => keys.projected_type = Some(value),
                _ => {}
            }
        }

        Ok(keys)
    }

    /// Returns true if the tie point refers to the center of a cell.
    pub fn pixel_is_point(&self) -> bool {
        self.raster_type == Some(RASTER_PIXEL_IS_POINT)
    }

    /// CRS named by the keys. `None` if the image has no EPSG code or a user-defined CRS.
    pub fn crs(&self) -> MeasureResult<Option<Crs>> {
        let code = match (self.projected_type, self.model_type) {
            (Some(code), _) if code != USER_DEFINED && code != 0 => Some(code),
            (None, Some(MODEL_TYPE_GEOGRAPHIC)) => self
                .geographic_type
                .filter(|&code| code != USER_DEFINED && code != 0),
            _ => None,
        };

        Ok(code.map(|code| Crs::from_epsg(code as u32)).transpose()?)
    }
}

/// Builds the grid transformation from the GeoTIFF model tags.
///
/// `ModelTransformationTag` takes precedence over the `ModelPixelScaleTag` and `ModelTiepointTag` pair. For
/// pixel-is-point images the origin is moved by half a cell to the corner of the first cell.
pub fn transform_from_tags(
    pixel_scale: Option<&[f64]>,
    tiepoint: Option<&[f64]>,
    transformation: Option<&[f64]>,
    pixel_is_point: bool,
) -> MeasureResult<GeoTransform> {
    let mut transform = match (transformation, pixel_scale, tiepoint) {
        (Some(m), _, _) if m.len() >= 16 => {
            GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]])
        }
        (_, Some(&[sx, sy, ..]), Some(&[i, j, _k, x, y, ..])) => {
            GeoTransform::new(x - i * sx, y + j * sy, sx, -sy)
        }
        _ => {
            return Err(MeasureError::InvalidTransform(
                "GeoTIFF has neither a model transformation nor pixel scale and tie point tags".into(),
            ))
        }
    };

    if pixel_is_point {
        let corner = transform.apply(-0.5, -0.5);
        transform.origin_x = corner.x;
        transform.origin_y = corner.y;
    }

    transform.validate()?;
    Ok(transform)
}

/// Raster read from a GeoTIFF file, georeferenced by its own tags.
///
/// All bands are decoded into memory as `f64` samples. Interleaved (chunky) images with any sample type are
/// supported.
#[derive(Debug, Clone)]
pub struct GeoTiffRaster {
    raster: MemoryRaster<f64>,
    keys: GeoKeys,
}

impl GeoTiffRaster {
    /// Opens a GeoTIFF. Fails if the file does not name an EPSG code.
    pub fn open(path: impl AsRef<Path>) -> MeasureResult<Self> {
        let path = path.as_ref();
        log::debug!("Decoding GeoTIFF {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?), None)
    }

    /// Opens a GeoTIFF with the given CRS, ignoring the CRS keys of the file.
    pub fn open_with_crs(path: impl AsRef<Path>, crs: Crs) -> MeasureResult<Self> {
        let path = path.as_ref();
        log::debug!("Decoding GeoTIFF {} in {crs}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?), Some(crs))
    }

    /// Decodes a GeoTIFF. If `crs` is `None`, the CRS is taken from the GeoKeys.
    pub fn from_reader<R: Read + Seek>(reader: R, crs: Option<Crs>) -> MeasureResult<Self> {
        let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

        let keys = match decoder.find_tag(Tag::GeoKeyDirectoryTag)? {
            Some(value) => GeoKeys::parse(&value.into_u16_vec()?)?,
            None => GeoKeys::default(),
        };

        let pixel_scale = f64_tag(&mut decoder, Tag::ModelPixelScaleTag)?;
        let tiepoint = f64_tag(&mut decoder, Tag::ModelTiepointTag)?;
        let transformation = f64_tag(&mut decoder, Tag::ModelTransformationTag)?;
        let transform = transform_from_tags(
            pixel_scale.as_deref(),
            tiepoint.as_deref(),
            transformation.as_deref(),
            keys.pixel_is_point(),
        )?;

        let crs = match crs {
            Some(crs) => crs,
            None => keys.crs()?.ok_or_else(|| {
                MeasureError::InvalidRaster(
                    "GeoTIFF does not name an EPSG code, the CRS must be given explicitly".into(),
                )
            })?,
        };

        let band_count = match decoder.find_tag(Tag::SamplesPerPixel)? {
            Some(value) => value.into_u16()? as usize,
            None => 1,
        };
        if band_count == 0 {
            return Err(MeasureError::InvalidRaster("GeoTIFF has no samples".into()));
        }
        if let Some(planar) = decoder.find_tag(Tag::PlanarConfiguration)? {
            if planar.into_u16()? == 2 {
                return Err(MeasureError::InvalidRaster(
                    "planar GeoTIFF sample layout is not supported".into(),
                ));
            }
        }

        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);
        let samples = decoded_samples(decoder.read_image()?)?;
        if samples.len() != width * height * band_count {
            return Err(MeasureError::InvalidRaster(format!(
                "GeoTIFF of {width}x{height} cells and {band_count} bands decoded into {} samples",
                samples.len()
            )));
        }

        let bands = (0..band_count)
            .map(|band| {
                let values = samples.iter().skip(band).step_by(band_count).copied().collect();
                Band::new(width, height, values)
            })
            .collect::<MeasureResult<Vec<_>>>()?;

        log::debug!("GeoTIFF has {band_count} bands of {width}x{height} cells in {crs}");

        Ok(Self {
            raster: MemoryRaster::new(bands, transform, crs)?,
            keys,
        })
    }

    /// GeoKeys of the file.
    pub fn geo_keys(&self) -> &GeoKeys {
        &self.keys
    }
}

impl RasterSource for GeoTiffRaster {
    type Sample = f64;

    fn band_count(&self) -> usize {
        self.raster.band_count()
    }

    fn read_band(&self, index: usize) -> MeasureResult<Band<f64>> {
        self.raster.read_band(index)
    }

    fn transform(&self) -> GeoTransform {
        self.raster.transform()
    }

    fn crs(&self) -> Crs {
        self.raster.crs()
    }
}

fn f64_tag<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> MeasureResult<Option<Vec<f64>>> {
    Ok(decoder
        .find_tag(tag)?
        .map(|value| value.into_f64_vec())
        .transpose()?)
}

fn decoded_samples(result: DecodingResult) -> MeasureResult<Vec<f64>> {
    fn widen<T: Copy + Into<f64>>(values: Vec<T>) -> Vec<f64> {
        values.into_iter().map(Into::into).collect()
    }

    #[allow(unreachable_patterns)]
    let samples = match result {
        DecodingResult::U8(v) => widen(v),
        DecodingResult::U16(v) => widen(v),
        DecodingResult::U32(v) => widen(v),
        DecodingResult::U64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::I8(v) => widen(v),
        DecodingResult::I16(v) => widen(v),
        DecodingResult::I32(v) => widen(v),
        DecodingResult::I64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::F32(v) => widen(v),
        DecodingResult::F64(v) => v,
        _ => {
            return Err(MeasureError::InvalidRaster(
                "unsupported GeoTIFF sample format".into(),
            ))
        }
    };

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MeasurementEngine;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use std::io::Cursor;
    use tiff::encoder::{colortype, TiffEncoder};

    const UTM33_KEYS: [u16; 16] = [
        1, 1, 0, 3, //
        GT_MODEL_TYPE, 0, 1, 1, //
        GT_RASTER_TYPE, 0, 1, 1, //
        PROJECTED_CS_TYPE, 0, 1, 32633,
    ];

    /// RGBA GeoTIFF of 4x3 cells of 0.5 m with two opaque cells.
    fn geotiff(keys: &[u16]) -> Vec<u8> {
        let mut data = vec![0u8; 4 * 3 * 4];
        for cell in [5, 6] {
            data[cell * 4 + 3] = 255;
        }

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buffer).expect("encoder");
            let mut image = encoder
                .new_image::<colortype::RGBA8>(4, 3)
                .expect("image");
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[0.5f64, 0.5, 0.0][..])
                .expect("pixel scale");
            image
                .encoder()
                .write_tag(
                    Tag::ModelTiepointTag,
                    &[0.0f64, 0.0, 0.0, 500_000.0, 5_500_000.0, 0.0][..],
                )
                .expect("tie point");
            image
                .encoder()
                .write_tag(Tag::GeoKeyDirectoryTag, keys)
                .expect("geo keys");
            image.write_data(&data).expect("image data");
        }

        buffer.into_inner()
    }

    #[test]
    fn parse_geo_keys() {
        let keys = GeoKeys::parse(&UTM33_KEYS).expect("valid directory");
        assert_eq!(keys.model_type, Some(1));
        assert_eq!(keys.projected_type, Some(32633));
        assert!(!keys.pixel_is_point());
        assert_eq!(keys.crs().expect("known code").map(|c| c.epsg()), Some(32633));

        assert_matches!(GeoKeys::parse(&[1, 1]), Err(MeasureError::InvalidRaster(_)));
        assert_matches!(
            GeoKeys::parse(&[1, 1, 0, 2, GT_MODEL_TYPE, 0, 1, 1]),
            Err(MeasureError::InvalidRaster(_))
        );
    }

    #[test]
    fn geographic_and_user_defined_keys() {
        let geographic = GeoKeys::parse(&[1, 1, 0, 2, GT_MODEL_TYPE, 0, 1, 2, GEOGRAPHIC_TYPE, 0, 1, 4326])
            .expect("valid directory");
        assert_eq!(geographic.crs().expect("known code"), Some(Crs::WGS84));

        let user_defined = GeoKeys::parse(&[1, 1, 0, 1, PROJECTED_CS_TYPE, 0, 1, USER_DEFINED])
            .expect("valid directory");
        assert_eq!(user_defined.crs().expect("no code"), None);

        let unknown = GeoKeys::parse(&[1, 1, 0, 1, PROJECTED_CS_TYPE, 0, 1, 2154])
            .expect("valid directory");
        assert_matches!(unknown.crs(), Err(MeasureError::Types(_)));
    }

    #[test]
    fn transform_from_scale_and_tiepoint() {
        let transform = transform_from_tags(
            Some(&[0.5, 0.25, 0.0][..]),
            Some(&[10.0, 20.0, 0.0, 1000.0, 2000.0, 0.0][..]),
            None,
            false,
        )
        .expect("valid tags");

        assert_eq!(transform, GeoTransform::new(995.0, 2005.0, 0.5, -0.25));
    }

    #[test]
    fn pixel_is_point_shifts_to_corner() {
        let transform = transform_from_tags(
            Some(&[2.0, 2.0, 0.0][..]),
            Some(&[0.0, 0.0, 0.0, 100.0, 200.0, 0.0][..]),
            None,
            true,
        )
        .expect("valid tags");

        assert_abs_diff_eq!(transform.origin_x, 99.0);
        assert_abs_diff_eq!(transform.origin_y, 201.0);
    }

    #[test]
    fn transformation_matrix_takes_precedence() {
        let matrix = [
            1.0, 0.5, 0.0, 300.0, //
            0.25, -1.0, 0.0, 400.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let transform = transform_from_tags(
            Some(&[9.0, 9.0, 0.0][..]),
            Some(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0][..]),
            Some(&matrix[..]),
            false,
        )
        .expect("valid tags");

        assert_eq!(
            transform.to_gdal(),
            [300.0, 1.0, 0.5, 400.0, 0.25, -1.0]
        );
    }

    #[test]
    fn missing_model_tags() {
        assert_matches!(
            transform_from_tags(Some(&[1.0, 1.0, 0.0][..]), None, None, false),
            Err(MeasureError::InvalidTransform(_))
        );
    }

    #[test]
    fn read_georeferenced_tiff() {
        let raster =
            GeoTiffRaster::from_reader(Cursor::new(geotiff(&UTM33_KEYS)), None).expect("valid GeoTIFF");

        assert_eq!(raster.band_count(), 4);
        assert_eq!(raster.crs().epsg(), 32633);
        assert_eq!(
            raster.transform(),
            GeoTransform::new(500_000.0, 5_500_000.0, 0.5, -0.5)
        );

        let alpha = raster.read_band(4).expect("alpha band");
        assert_eq!(alpha.get(1, 1), Some(255.0));
        assert_eq!(alpha.get(1, 2), Some(255.0));
        assert_eq!(alpha.get(0, 0), Some(0.0));

        let measurement = MeasurementEngine::default()
            .measure_raster_area(&raster)
            .expect("opaque cells");
        assert_eq!(measurement.crs.epsg(), 32633);
        assert_abs_diff_eq!(measurement.area_m2, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn crs_is_required_without_keys() {
        let bytes = geotiff(&[1, 1, 0, 1, PROJECTED_CS_TYPE, 0, 1, USER_DEFINED]);
        assert_matches!(
            GeoTiffRaster::from_reader(Cursor::new(bytes.clone()), None),
            Err(MeasureError::InvalidRaster(_))
        );

        let utm = Crs::from_epsg(32633).expect("known code");
        let raster = GeoTiffRaster::from_reader(Cursor::new(bytes), Some(utm)).expect("explicit CRS");
        assert_eq!(raster.crs(), utm);
        assert_eq!(raster.geo_keys().projected_type, Some(USER_DEFINED));
    }

    #[test]
    fn open_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ortho.tif");
        std::fs::write(&path, geotiff(&UTM33_KEYS)).expect("write file");

        let raster = GeoTiffRaster::open(&path).expect("valid GeoTIFF");
        assert_eq!(raster.crs().epsg(), 32633);
        assert_matches!(
            GeoTiffRaster::open(dir.path().join("missing.tif")),
            Err(MeasureError::Io(_))
        );
    }
}
