//! # Pipeline Orchestrator
//!
//! The two public operations, encode and decode, and the bookkeeping that
//! makes them safe against partial failure.
//!
//! ## Modules
//!
//! - [`orchestrator`]: [`StegoPipeline`] and the encode/decode state machines
//! - [`artifacts`]: per-request file tracking, temporary names and cleanup

pub mod artifacts;
pub mod orchestrator;

pub use self::artifacts::RequestArtifacts;
pub use self::orchestrator::{DecodeStage, EncodeStage, StegoPipeline};
