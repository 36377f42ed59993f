//! Conversion between image files and [`RasterBuffer`]s.
//!
//! Decoded images are normalized to 8 bits per channel with 1 (luma),
//! 3 (RGB) or 4 (RGBA) channels. Luma with alpha becomes RGBA so the alpha
//! channel stays last. The encoder picks the format from the file extension;
//! JPEG has no alpha, so 4-channel rasters lose it there.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageError};
use rowpipe::{Error, RasterBuffer, RasterView};

use crate::error::BatchError;

pub fn decode(path: &Path) -> Result<RasterBuffer, BatchError> {
    let img = image::open(path).map_err(|source| BatchError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let width = img.width() as usize;
    let height = img.height() as usize;
    let (channels, data) = match img {
        DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
        other if other.color().has_alpha() => (4, other.into_rgba8().into_raw()),
        other if other.color().has_color() => (3, other.into_rgb8().into_raw()),
        other => (1, other.into_luma8().into_raw()),
    };
    Ok(RasterBuffer::from_vec(width, height, channels, data)?)
}

/// Reads only the header of `path`.
pub fn probe_dimensions(path: &Path) -> Result<(usize, usize), BatchError> {
    let (w, h) = image::image_dimensions(path).map_err(|source| BatchError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((w as usize, h as usize))
}

/// Writes `raster` to `path`; `quality` applies to JPEG only.
pub fn encode(path: &Path, raster: &RasterView<'_>, quality: u8) -> Result<(), BatchError> {
    let (width, height) = dims_u32(raster)?;
    let color = match raster.channels() {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        _ => ExtendedColorType::Rgba8,
    };
    let encode_err = |source: ImageError| BatchError::Encode {
        path: path.to_path_buf(),
        source,
    };

    if !is_jpeg(path) {
        return image::save_buffer(path, raster.data(), width, height, color).map_err(encode_err);
    }

    let file = File::create(path).map_err(|e| encode_err(ImageError::IoError(e)))?;
    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    if raster.has_alpha() {
        let rgb = strip_alpha(raster.data());
        encoder
            .encode(&rgb, width, height, ExtendedColorType::Rgb8)
            .map_err(encode_err)?;
    } else {
        encoder
            .encode(raster.data(), width, height, color)
            .map_err(encode_err)?;
    }
    writer
        .flush()
        .map_err(|e| encode_err(ImageError::IoError(e)))
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

fn strip_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect()
}

fn dims_u32(raster: &RasterView<'_>) -> Result<(u32, u32), BatchError> {
    let invalid = || Error::InvalidDimensions {
        width: raster.width(),
        height: raster.height(),
        channels: raster.channels(),
    };
    let w = u32::try_from(raster.width()).map_err(|_| invalid())?;
    let h = u32::try_from(raster.height()).map_err(|_| invalid())?;
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::ExtendedColorType;
    use rowpipe::RasterBuffer;

    use super::{decode, encode, probe_dimensions};
    use crate::error::BatchError;

    fn rgba(width: usize, height: usize) -> RasterBuffer {
        let data = (0..width * height)
            .flat_map(|i| [(i * 9) as u8, (i * 3) as u8, 200, (i % 7 * 30) as u8])
            .collect();
        RasterBuffer::from_vec(width, height, 4, data).expect("valid")
    }

    #[test]
    fn png_keeps_every_channel() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("img.png");
        let src = rgba(7, 5);
        encode(&path, &src.as_view(), 100).expect("encode");

        assert_eq!(probe_dimensions(&path).expect("probe"), (7, 5));
        assert_eq!(decode(&path).expect("decode"), src);
    }

    #[test]
    fn jpeg_drops_alpha() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("img.JPG");
        encode(&path, &rgba(16, 8).as_view(), 90).expect("encode");

        let back = decode(&path).expect("decode");
        assert_eq!((back.width(), back.height(), back.channels()), (16, 8, 3));
    }

    #[test]
    fn luma_alpha_is_widened_to_rgba() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("la.png");
        image::save_buffer(&path, &[10, 250, 90, 0], 2, 1, ExtendedColorType::La8).expect("save");

        let back = decode(&path).expect("decode");
        assert_eq!(back.channels(), 4);
        assert_eq!(back.data(), &[10, 10, 10, 250, 90, 90, 90, 0]);

        let gray = dir.path().join("l.png");
        image::save_buffer(&gray, &[1, 2, 3], 3, 1, ExtendedColorType::L8).expect("save");
        assert_eq!(decode(&gray).expect("decode").channels(), 1);
    }

    #[test]
    fn unwritable_jpeg_is_an_encode_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("taken.jpg");
        fs::create_dir(&path).expect("mkdir");

        let err = encode(&path, &rgba(4, 4).as_view(), 90).expect_err("directory in the way");
        assert!(matches!(err, BatchError::Encode { .. }));
        assert!(err.is_per_image());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").expect("write");
        assert!(matches!(decode(&path), Err(BatchError::Decode { .. })));
        assert!(matches!(probe_dimensions(&path), Err(BatchError::Decode { .. })));
    }
}
