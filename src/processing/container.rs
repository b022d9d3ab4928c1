//! # PNG Container Codec
//!
//! Converts between PNG bytes and the pair (raster, text entries) the rest of
//! the pipeline works with.
//!
//! ## Decoding
//! Pixels are decoded with the `image` crate and normalised to 8-bit RGB, or
//! 8-bit RGBA when the source carries alpha. Text entries (`tEXt`, `zTXt`,
//! `iTXt`) are read with the `png` crate, since `image` does not expose them.
//!
//! ## Encoding
//! Output is always PNG, written with the `png` crate so the text entries land
//! in `tEXt` chunks ahead of the image data. A lossy re-encode would destroy
//! the embedded LSBs, so no other output format is offered.

use image::{GenericImageView, ImageFormat};
use serde::Serialize;
use std::io::Cursor;

use crate::error::{Result, StegoError};
use crate::processing::params::TextEntry;
use crate::processing::steganography::{self, ColorLayout, RasterImage};

/// A decoded PNG: pixel data plus its text metadata.
#[derive(Debug, Clone)]
pub struct Container {
    pub raster: RasterImage,
    pub text: Vec<TextEntry>,
}

/// Returns true if `bytes` start with the PNG signature.
pub fn is_png(bytes: &[u8]) -> bool {
    matches!(image::guess_format(bytes), Ok(ImageFormat::Png))
}

/// Decode PNG bytes into a [`Container`].
///
/// # Errors
/// - [`StegoError::UnsupportedFormat`] if the bytes are not a PNG
/// - [`StegoError::InvalidImage`] if the PNG is truncated or malformed
pub fn decode_png(bytes: &[u8]) -> Result<Container> {
    if !is_png(bytes) {
        return Err(StegoError::UnsupportedFormat);
    }

    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| StegoError::InvalidImage(e.to_string()))?;
    let (width, height) = img.dimensions();

    // Convert to a fixed 8-bit layout for consistent sample addressing
    let raster = if img.color().has_alpha() {
        RasterImage::new(width, height, ColorLayout::Rgba, img.to_rgba8().into_raw())
    } else {
        RasterImage::new(width, height, ColorLayout::Rgb, img.to_rgb8().into_raw())
    };

    let text = read_text_entries(bytes)?;

    Ok(Container { raster, text })
}

/// Read every text entry in the PNG, before or after the image data.
pub fn read_text_entries(bytes: &[u8]) -> Result<Vec<TextEntry>> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder.read_info().map_err(invalid_image)?;

    // read_info stops at the first IDAT; text may also follow the image data
    let mut frame = vec![0u8; reader.output_buffer_size()];
    reader.next_frame(&mut frame).map_err(invalid_image)?;
    reader.finish().map_err(invalid_image)?;
    let info = reader.info();

    let mut entries = Vec::new();
    for chunk in &info.uncompressed_latin1_text {
        entries.push((chunk.keyword.clone(), chunk.text.clone()));
    }
    for chunk in &info.compressed_latin1_text {
        let text = chunk.get_text().map_err(invalid_image)?;
        entries.push((chunk.keyword.clone(), text));
    }
    for chunk in &info.utf8_text {
        let text = chunk.get_text().map_err(invalid_image)?;
        entries.push((chunk.keyword.clone(), text));
    }

    Ok(entries)
}

fn invalid_image(e: png::DecodingError) -> StegoError {
    StegoError::InvalidImage(e.to_string())
}

/// Encode a raster and its text entries as PNG bytes.
///
/// # Errors
/// Only fails if the raster is inconsistent with its dimensions, which
/// indicates a bug upstream; reported as [`StegoError::Io`].
pub fn encode_png(raster: &RasterImage, text: &[TextEntry]) -> Result<Vec<u8>> {
    let mut output_bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut output_bytes, raster.width, raster.height);
        encoder.set_color(match raster.layout {
            ColorLayout::Rgb => png::ColorType::Rgb,
            ColorLayout::Rgba => png::ColorType::Rgba,
        });
        encoder.set_depth(png::BitDepth::Eight);

        for (keyword, value) in text {
            encoder
                .add_text_chunk(keyword.clone(), value.clone())
                .map_err(encoding_error)?;
        }

        let mut writer = encoder.write_header().map_err(encoding_error)?;
        writer
            .write_image_data(&raster.pixels)
            .map_err(encoding_error)?;
        writer.finish().map_err(encoding_error)?;
    }
    Ok(output_bytes)
}

fn encoding_error(e: png::EncodingError) -> StegoError {
    StegoError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Summary of a PNG as seen by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerReport {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub has_alpha: bool,
    pub capacity_bits: u64,
    pub max_message_bytes: u64,
    pub salt: Option<String>,
    pub iv: Option<String>,
    #[serde(rename = "authTag")]
    pub auth_tag: Option<String>,
}

/// Describe a PNG: dimensions, embedding capacity and any parameter entries.
pub fn inspect(bytes: &[u8]) -> Result<ContainerReport> {
    let container = decode_png(bytes)?;
    let raster = &container.raster;
    let find = |key: &str| {
        container
            .text
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    Ok(ContainerReport {
        width: raster.width,
        height: raster.height,
        channels: raster.layout.channels(),
        has_alpha: raster.layout == ColorLayout::Rgba,
        capacity_bits: steganography::capacity(raster),
        max_message_bytes: steganography::max_payload_bytes(raster),
        salt: find("salt"),
        iv: find("iv"),
        auth_tag: find("authTag"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_rejects_non_png() {
        let img = image::DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        let mut bmp = Vec::new();
        img.write_to(&mut Cursor::new(&mut bmp), ImageFormat::Bmp)
            .unwrap();
        assert!(matches!(decode_png(&bmp), Err(StegoError::UnsupportedFormat)));
        assert!(matches!(decode_png(b"not an image"), Err(StegoError::UnsupportedFormat)));
    }

    #[test]
    fn test_truncated_png_is_invalid() {
        let bytes = png_bytes(RgbImage::from_pixel(10, 10, Rgb([9, 9, 9])).into());
        assert!(matches!(
            decode_png(&bytes[..bytes.len() / 2]),
            Err(StegoError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_layout_follows_alpha() {
        let rgb = decode_png(&png_bytes(RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])).into())).unwrap();
        assert_eq!(rgb.raster.layout, ColorLayout::Rgb);
        assert_eq!(rgb.raster.pixels.len(), 18);

        let rgba =
            decode_png(&png_bytes(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4])).into())).unwrap();
        assert_eq!(rgba.raster.layout, ColorLayout::Rgba);
        assert_eq!(rgba.raster.pixels.len(), 24);
    }

    #[test]
    fn test_pixels_and_text_survive_reencode() {
        let source = decode_png(&png_bytes(RgbImage::from_pixel(5, 5, Rgb([200, 100, 50])).into()))
            .unwrap();
        let text = vec![
            ("salt".to_string(), "00".repeat(16)),
            ("Comment".to_string(), "hello".to_string()),
        ];
        let bytes = encode_png(&source.raster, &text).unwrap();
        let back = decode_png(&bytes).unwrap();
        assert_eq!(back.raster, source.raster);
        assert_eq!(back.text, text);
    }

    #[test]
    fn test_reads_text_after_image_data() {
        let raster = RasterImage::new(4, 4, ColorLayout::Rgb, vec![7; 48]);
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 4, 4);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&raster.pixels).unwrap();
            writer
                .write_text_chunk(&png::text_metadata::TEXtChunk::new("salt", "ab".repeat(16)))
                .unwrap();
            writer
                .write_text_chunk(&png::text_metadata::ITXtChunk::new("authTag", "cd".repeat(16)))
                .unwrap();
            writer.finish().unwrap();
        }

        let container = decode_png(&bytes).unwrap();
        assert_eq!(container.raster, raster);
        assert_eq!(
            container.text,
            vec![
                ("salt".to_string(), "ab".repeat(16)),
                ("authTag".to_string(), "cd".repeat(16)),
            ]
        );
    }

    #[test]
    fn test_inspect_reports_capacity_and_params() {
        let raster = RasterImage::new(10, 10, ColorLayout::Rgb, vec![0; 300]);
        let bytes = encode_png(&raster, &[("iv".to_string(), "ab".repeat(12))]).unwrap();
        let report = inspect(&bytes).unwrap();
        assert_eq!(report.capacity_bits, 300);
        assert_eq!(report.max_message_bytes, 33);
        assert_eq!(report.iv.as_deref(), Some("ab".repeat(12).as_str()));
        assert!(report.salt.is_none());
    }
}
