mod commands;
mod manifest;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "binweave")]
#[command(about = "Binweave - Field-based binary image builder with per-field ECC", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a binary image from a manifest
    Build {
        /// Input JSON manifest
        #[arg(short, long)]
        input: String,

        /// Output file for the assembled image
        #[arg(short, long)]
        output: String,

        /// Emit a mask image: nibble-parity fields become a uniform fill
        #[arg(long)]
        mask: bool,
    },

    /// Parse a manifest and dump the resolved field layout
    Inspect {
        /// Input JSON manifest
        #[arg(short, long)]
        input: String,

        /// Hex-dump each field's materialized data
        #[arg(long)]
        hex: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Build {
            input,
            output,
            mask,
        } => commands::build::execute(&input, &output, mask),

        Commands::Inspect { input, hex } => commands::inspect::execute(&input, hex),
    }
}
