//! # Image Processing and Steganography
//!
//! Everything that touches image bytes:
//!
//! - [`steganography`]: LSB payload embedding and extraction on raw rasters
//! - [`params`]: the `salt` / `iv` / `authTag` metadata codec
//! - [`container`]: PNG decoding/encoding, including text metadata

pub mod container;
pub mod params;
pub mod steganography;

// Re-export main functions for convenience
pub use container::{decode_png, encode_png, inspect, Container, ContainerReport};
pub use params::{decode_params, encode_params, TextEntry};
pub use steganography::{capacity, embed, extract, ColorLayout, RasterImage};
