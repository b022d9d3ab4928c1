//! # Web Server Components
//!
//! HTTP caller of the pipeline. Account management, sessions and rate
//! limiting live outside this crate; this layer only turns multipart
//! uploads into pipeline calls and pipeline errors into status codes.
//!
//! - [`api`]: router, handlers and error mapping
//! - [`config`]: TOML configuration for the web server binary

pub mod api;
pub mod config;

pub use api::router;
pub use config::WebServerConfig;
