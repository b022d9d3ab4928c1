//! # Command-Line Encoder / Decoder
//!
//! ```bash
//! stego encode --input cover.png --output secret.png --message "hi" --key "passphrase"
//! stego decode --input secret.png --key "passphrase"
//! stego inspect --input secret.png
//! ```
//!
//! Exit status is 0 on success, 1 on any error; errors go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use steg_vault::common::logging::init_logger;
use steg_vault::processing::inspect;
use steg_vault::{PipelineConfig, StegoPipeline};

#[derive(Parser, Debug)]
#[command(author, version, about = "Hide encrypted messages in PNG images", long_about = None)]
struct Args {
    /// Log level ("warn", "info", "debug", ...)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a message and hide it in a PNG
    Encode {
        /// Cover image (PNG)
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the stego image
        #[arg(short, long)]
        output: PathBuf,
        /// Message to hide
        #[arg(short, long)]
        message: String,
        /// Secret key (at least 8 characters)
        #[arg(short, long)]
        key: String,
    },
    /// Recover a hidden message
    Decode {
        /// Stego image (PNG)
        #[arg(short, long)]
        input: PathBuf,
        /// Secret key used when encoding
        #[arg(short, long)]
        key: String,
    },
    /// Print dimensions, capacity and embedded parameters as JSON
    Inspect {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);

    let pipeline = StegoPipeline::new(PipelineConfig::default());

    match args.command {
        Command::Encode {
            input,
            output,
            message,
            key,
        } => {
            let cover = fs::read(&input)
                .with_context(|| format!("Input image not found: {}", input.display()))?;
            pipeline
                .encode_to_path(&cover, &message, &key, &output)
                .map_err(|e| anyhow::anyhow!(e.public_message()))?;
            println!("Successfully encoded message into {}", output.display());
        }
        Command::Decode { input, key } => {
            let stego = fs::read(&input)
                .with_context(|| format!("Input image not found: {}", input.display()))?;
            let message = pipeline
                .decode(&stego, &key)
                .map_err(|e| anyhow::anyhow!(e.public_message()))?;
            println!("{}", message);
        }
        Command::Inspect { input } => {
            let bytes = fs::read(&input)
                .with_context(|| format!("Input image not found: {}", input.display()))?;
            let report = inspect(&bytes)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
