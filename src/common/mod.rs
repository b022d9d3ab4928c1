//! # Common Components
//!
//! Shared utilities used by the library and both binaries.
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing utilities and pipeline settings
//! - [`logging`]: Logger initialisation for the binaries

pub mod config;
pub mod logging;
