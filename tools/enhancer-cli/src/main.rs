//! Call Enhancer CLI: drive the gesture control loop from the terminal.
//!
//! Usage:
//!   enhancer demo [OPTIONS]                          Run on a synthetic scene
//!   enhancer replay <FRAMES_DIR> <DETECTIONS_JSONL>  Replay recorded frames
//!   enhancer config [--write]                        Show or save configuration
//!   enhancer shape <DX>...                           Rotate the shape viewer

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use enhancer_common::config::{AppConfig, LoggingConfig};

mod commands;

use commands::present::PresentArgs;

#[derive(Parser)]
#[command(
    name = "enhancer",
    about = "Gesture-driven zoom and volume for video calls",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop on a procedural test scene
    Demo {
        /// Number of frames to generate
        #[arg(long, default_value = "300")]
        frames: u64,

        /// Frame width (overrides config)
        #[arg(long)]
        width: Option<u32>,

        /// Frame height (overrides config)
        #[arg(long)]
        height: Option<u32>,

        /// Frame rate (overrides config)
        #[arg(long)]
        fps: Option<u32>,

        /// Number of faces in the scene
        #[arg(long, default_value = "2")]
        faces: usize,

        /// Background music file (overrides config)
        #[arg(long)]
        music: Option<PathBuf>,

        #[command(flatten)]
        present: PresentArgs,
    },

    /// Replay a directory of frames against recorded detections
    Replay {
        /// Directory of PNG/JPEG frames, read in file name order
        frames_dir: PathBuf,

        /// JSON Lines file with one detection set per frame
        detections: PathBuf,

        /// Frame rate of the recording (overrides config)
        #[arg(long)]
        fps: Option<u32>,

        /// Background music file (overrides config)
        #[arg(long)]
        music: Option<PathBuf>,

        #[command(flatten)]
        present: PresentArgs,
    },

    /// Print the effective configuration
    Config {
        /// Save it to the config location instead
        #[arg(long)]
        write: bool,
    },

    /// Apply horizontal drag deltas to the shape viewer
    Shape {
        /// Drag distances in pixels
        #[arg(required = true, allow_hyphen_values = true)]
        deltas: Vec<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        // Writing a fresh config file starts from defaults.
        Some(path) if !path.exists() && matches!(cli.command, Commands::Config { write: true }) => {
            AppConfig::default()
        }
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    // Initialize logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    enhancer_common::logging::init_logging(&LoggingConfig {
        level,
        ..config.logging.clone()
    });

    match cli.command {
        Commands::Demo {
            frames,
            width,
            height,
            fps,
            faces,
            music,
            present,
        } => commands::demo::run(
            config,
            commands::demo::DemoOptions {
                frames,
                width,
                height,
                fps,
                faces,
                music,
            },
            present,
        ),
        Commands::Replay {
            frames_dir,
            detections,
            fps,
            music,
            present,
        } => commands::replay::run(config, frames_dir, detections, fps, music, present),
        Commands::Config { write } => commands::config::run(&config, cli.config, write),
        Commands::Shape { deltas } => commands::shape::run(&deltas),
    }
}
