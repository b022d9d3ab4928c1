//! # steg-vault
//!
//! Hides an encrypted text message inside a PNG image and recovers it, both
//! operations gated behind a secret key.
//!
//! - The message is encrypted with AES-256-GCM under a PBKDF2-HMAC-SHA256 key.
//! - The ciphertext goes into the least significant bits of the pixels.
//! - Salt, nonce and authentication tag go into PNG text metadata
//!   (`salt`, `iv`, `authTag`, lowercase hex).
//!
//! ```rust,ignore
//! use steg_vault::{PipelineConfig, StegoPipeline};
//!
//! let pipeline = StegoPipeline::new(PipelineConfig::default());
//! let cover = std::fs::read("cover.png")?;
//! let stego = pipeline.encode(&cover, "Hello from server test!", "test_password_123")?;
//! let message = pipeline.decode(&stego, "test_password_123")?;
//! ```

pub mod common;
pub mod encryption;
pub mod error;
pub mod pipeline;
pub mod processing;
pub mod server;

pub use common::config::PipelineConfig;
pub use error::{ErrorCategory, StegoError};
pub use pipeline::StegoPipeline;
