//! # Web Server Binary Entry Point
//!
//! Serves the encode/decode HTTP API over a [`StegoPipeline`].
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin web_server -- --config config/web_server.toml
//! ```

use clap::Parser;
use log::info;

use steg_vault::common::logging::init_logger;
use steg_vault::server::{router, WebServerConfig};
use steg_vault::StegoPipeline;

/// Command-line arguments for the web server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the web server configuration file (TOML format)
    #[arg(short, long, default_value = "config/web_server.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = WebServerConfig::from_file(&args.config)?;

    init_logger(&config.server.log_level);

    info!("🚀 Initializing web server...");
    info!("📁 Work directory: {}", config.pipeline.work_dir.display());

    let pipeline = StegoPipeline::new(config.pipeline.clone());
    let app = router(pipeline, config.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.server.address).await?;
    info!("🌐 Web server running on http://{}", config.server.address);
    info!("📡 API endpoints: POST /encode, POST /decode");

    axum::serve(listener, app).await?;

    Ok(())
}
