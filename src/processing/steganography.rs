//! # LSB Steganography Implementation
//!
//! Hides an arbitrary byte payload in the least significant bits of an
//! 8-bit raster and recovers it exactly.
//!
//! ## Algorithm
//!
//! The payload is prefixed with its length (4 bytes, big-endian) and the
//! resulting bit stream is written MSB first, one bit per eligible sample.
//!
//! ### Traversal order
//! Pixels are visited row-major; within each pixel the color channels are
//! visited in order (R → G → B). The alpha channel, when present, is never
//! touched, so transparent regions keep their exact values.
//!
//! ### Capacity
//! `capacity = width * height * 3` bits. The usable payload is
//! `(capacity - 32) / 8` bytes once the length header is accounted for.
//!
//! Example: a 100x100 RGB image holds 30 000 bits, i.e. 3 746 payload bytes.

use crate::error::{Result, StegoError};

/// Width of the length header in bits.
pub const HEADER_BITS: u64 = 32;

/// Sample layout of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLayout {
    Rgb,
    Rgba,
}

impl ColorLayout {
    /// Samples per pixel, including alpha.
    pub fn channels(self) -> usize {
        match self {
            ColorLayout::Rgb => 3,
            ColorLayout::Rgba => 4,
        }
    }

    /// Samples per pixel that may carry payload bits.
    pub fn color_channels(self) -> usize {
        3
    }
}

/// An 8-bit-per-sample pixel buffer in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub layout: ColorLayout,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, layout: ColorLayout, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            layout,
            pixels,
        }
    }
}

/// Indices into the sample buffer that carry payload bits, in traversal order.
fn eligible_samples(sample_count: usize, layout: ColorLayout) -> impl Iterator<Item = usize> {
    let channels = layout.channels();
    let color = layout.color_channels();
    (0..sample_count).filter(move |i| i % channels < color)
}

/// Number of sample bits available for embedding (header included).
pub fn capacity(raster: &RasterImage) -> u64 {
    let pixel_count = raster.pixels.len() / raster.layout.channels();
    (pixel_count * raster.layout.color_channels()) as u64
}

/// Largest payload, in bytes, that [`embed`] will accept for this raster.
pub fn max_payload_bytes(raster: &RasterImage) -> u64 {
    capacity(raster).saturating_sub(HEADER_BITS) / 8
}

/// Embed `payload` into the raster's LSBs.
///
/// The capacity check happens before the first sample is written, so on
/// error the raster is left exactly as it was.
///
/// # Errors
/// - [`StegoError::CapacityExceeded`] if `len(payload) * 8 + 32` exceeds
///   [`capacity`]
///
/// # Example
/// ```ignore
/// let mut raster = container::decode_png(&cover_bytes)?.raster;
/// steganography::embed(&mut raster, &ciphertext)?;
/// ```
pub fn embed(raster: &mut RasterImage, payload: &[u8]) -> Result<()> {
    let capacity_bits = capacity(raster);
    let required_bits = HEADER_BITS + payload.len() as u64 * 8;

    let length = match u32::try_from(payload.len()) {
        Ok(length) if required_bits <= capacity_bits => length,
        _ => {
            return Err(StegoError::CapacityExceeded {
                required_bits,
                capacity_bits,
            })
        }
    };

    // Prepare data to embed: [4 bytes length][payload bytes]
    let mut data_to_embed = Vec::with_capacity(4 + payload.len());
    data_to_embed.extend_from_slice(&length.to_be_bytes());
    data_to_embed.extend_from_slice(payload);

    let bits = data_to_embed
        .iter()
        .flat_map(|byte| (0..8u32).rev().map(move |shift| (byte >> shift) & 1));

    for (sample, bit) in eligible_samples(raster.pixels.len(), raster.layout).zip(bits) {
        raster.pixels[sample] = (raster.pixels[sample] & 0xFE) | bit;
    }

    Ok(())
}

/// Recover a payload written by [`embed`].
///
/// # Errors
/// - [`StegoError::CorruptPayload`] if the raster is too small to hold a
///   header, or the header declares more bits than the raster holds
pub fn extract(raster: &RasterImage) -> Result<Vec<u8>> {
    let capacity_bits = capacity(raster);
    if capacity_bits < HEADER_BITS {
        return Err(StegoError::CorruptPayload {
            declared_bits: HEADER_BITS,
            capacity_bits,
        });
    }

    let mut bits = eligible_samples(raster.pixels.len(), raster.layout)
        .map(|sample| raster.pixels[sample] & 1);

    // ========== STEP 1: Extract length (first 32 bits) ==========
    let mut length_bytes = [0u8; 4];
    read_bytes(&mut bits, &mut length_bytes);
    let length = u32::from_be_bytes(length_bytes) as u64;

    let declared_bits = HEADER_BITS + length * 8;
    if declared_bits > capacity_bits {
        return Err(StegoError::CorruptPayload {
            declared_bits,
            capacity_bits,
        });
    }

    // ========== STEP 2: Extract payload ==========
    let mut payload = vec![0u8; length as usize];
    read_bytes(&mut bits, &mut payload);

    Ok(payload)
}

/// Fill `out` from a bit stream, MSB first. Callers have already checked
/// that enough bits remain.
fn read_bytes(bits: &mut impl Iterator<Item = u8>, out: &mut [u8]) {
    for byte in out.iter_mut() {
        for bit in bits.by_ref().take(8) {
            *byte = (*byte << 1) | bit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32, layout: ColorLayout) -> RasterImage {
        let len = width as usize * height as usize * layout.channels();
        let pixels = (0..len).map(|i| (i * 37 % 251) as u8).collect();
        RasterImage::new(width, height, layout, pixels)
    }

    #[test]
    fn test_capacity_excludes_alpha() {
        assert_eq!(capacity(&gradient(100, 100, ColorLayout::Rgb)), 30_000);
        assert_eq!(capacity(&gradient(100, 100, ColorLayout::Rgba)), 30_000);
        assert_eq!(max_payload_bytes(&gradient(100, 100, ColorLayout::Rgb)), 3_746);
    }

    #[test]
    fn test_embed_extract() {
        let mut raster = gradient(20, 10, ColorLayout::Rgb);
        embed(&mut raster, b"hidden bytes \x00\xff").unwrap();
        assert_eq!(extract(&raster).unwrap(), b"hidden bytes \x00\xff");
    }

    #[test]
    fn test_only_lsbs_change() {
        let original = gradient(16, 16, ColorLayout::Rgb);
        let mut raster = original.clone();
        embed(&mut raster, &[0xA5; 64]).unwrap();
        for (before, after) in original.pixels.iter().zip(&raster.pixels) {
            assert_eq!(before & 0xFE, after & 0xFE);
        }
    }

    #[test]
    fn test_alpha_untouched() {
        let original = gradient(8, 8, ColorLayout::Rgba);
        let mut raster = original.clone();
        embed(&mut raster, &[0xFF; 20]).unwrap();
        for i in (3..raster.pixels.len()).step_by(4) {
            assert_eq!(raster.pixels[i], original.pixels[i]);
        }
        assert_eq!(extract(&raster).unwrap(), vec![0xFF; 20]);
    }

    #[test]
    fn test_exact_capacity_fits() {
        // 4x4 RGB = 48 bits = 32 header + 2 bytes
        let mut raster = gradient(4, 4, ColorLayout::Rgb);
        embed(&mut raster, b"ok").unwrap();
        assert_eq!(extract(&raster).unwrap(), b"ok");
    }

    #[test]
    fn test_one_byte_over_capacity_leaves_raster_untouched() {
        let original = gradient(4, 4, ColorLayout::Rgb);
        let mut raster = original.clone();
        match embed(&mut raster, b"abc") {
            Err(StegoError::CapacityExceeded {
                required_bits,
                capacity_bits,
            }) => {
                assert_eq!(required_bits, 56);
                assert_eq!(capacity_bits, 48);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
        assert_eq!(raster, original);
    }

    #[test]
    fn test_extract_rejects_oversized_header() {
        // All LSBs set: header reads as u32::MAX bytes
        let raster = RasterImage::new(10, 10, ColorLayout::Rgb, vec![0xFF; 300]);
        assert!(matches!(
            extract(&raster),
            Err(StegoError::CorruptPayload { capacity_bits: 300, .. })
        ));
    }

    #[test]
    fn test_extract_rejects_tiny_raster() {
        let raster = RasterImage::new(2, 2, ColorLayout::Rgb, vec![0; 12]);
        assert!(matches!(extract(&raster), Err(StegoError::CorruptPayload { .. })));
    }

    #[test]
    fn test_empty_payload() {
        let mut raster = gradient(4, 4, ColorLayout::Rgb);
        embed(&mut raster, b"").unwrap();
        assert!(extract(&raster).unwrap().is_empty());
    }
}
