//! pinch_draw: interactive entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pinch_draw::config::DEFAULT_CONFIG_FILE;
use pinch_draw::source::ModelKind;
use pinch_draw::{run, AppConfig};

#[derive(Parser)]
#[command(name = "pinch_draw")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Draw by pinching in front of the camera", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Skip the configuration file and use built-in defaults
    #[arg(long)]
    quick: bool,

    /// Pinch threshold in canvas pixels
    #[arg(long)]
    threshold: Option<f32>,

    /// Directory exported drawings are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Landmark model
    #[arg(long, value_enum)]
    model: Option<ModelKind>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Pinch Draw: draw with your fingers              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut cfg = if cli.quick {
        AppConfig::default()
    } else {
        AppConfig::load(&cli.config)
            .with_context(|| format!("reading {}", cli.config.display()))?
    };
    if let Some(t) = cli.threshold   { cfg.pinch_threshold = t; }
    if let Some(d) = cli.export_dir  { cfg.export_dir = d; }
    if let Some(m) = cli.model       { cfg.model = m; }
    cfg.validate().context("invalid settings")?;

    match cfg.model {
        ModelKind::Sim  => println!("  Model: simulated hand (mouse + P)"),
        ModelKind::Leap => println!("  Model: LeapMotion hardware"),
    }
    println!("  Space = camera, P = pinch, S = save, Q = quit");
    println!();

    run(cfg).context("pinch_draw failed")?;
    Ok(())
}
