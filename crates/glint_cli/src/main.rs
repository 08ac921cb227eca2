//! Glint CLI
//!
//! Scaffold a `glint.toml` and preview motion components headlessly.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod preview;

use config::GlintConfig;
use preview::{PreviewSettings, Scene};

#[derive(Parser)]
#[command(name = "glint")]
#[command(about = "Glint motion engine - configure and preview motion components")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default glint.toml
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing glint.toml
        #[arg(long)]
        force: bool,
    },

    /// Simulate a component and print its style per frame as JSON lines
    Preview {
        /// Component to simulate
        #[arg(value_enum)]
        scene: Scene,

        /// Config file or directory containing glint.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames (overrides config)
        #[arg(long)]
        frames: Option<usize>,

        /// Synthetic frame rate (overrides config)
        #[arg(long)]
        fps: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { path, force } => cmd_init(path, force),
        Commands::Preview {
            scene,
            config,
            frames,
            fps,
        } => cmd_preview(scene, config, frames, fps),
    }
}

fn cmd_init(path: PathBuf, force: bool) -> Result<()> {
    let written = config::write_default(&path, force)?;
    info!("Created {}", written.display());
    Ok(())
}

fn cmd_preview(
    scene: Scene,
    config_path: Option<PathBuf>,
    frames: Option<usize>,
    fps: Option<u32>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => GlintConfig::load(&path)?,
        None => GlintConfig::default(),
    };

    let mut settings = PreviewSettings::from_config(&config);
    if let Some(frames) = frames {
        settings.frames = frames;
    }
    if let Some(fps) = fps {
        if fps == 0 {
            anyhow::bail!("--fps must be positive");
        }
        settings.fps = fps;
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = preview::run(scene, &config, settings, &mut out)?;
    out.flush()?;

    info!(
        frames = summary.frames,
        live = summary.live_at_end,
        failed = summary.failed,
        "preview finished"
    );
    if summary.leaked > 0 {
        tracing::warn!(leaked = summary.leaked, "tickables still registered after unmount");
    }
    Ok(())
}
