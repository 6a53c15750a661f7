//! coin-counter CLI: count coins in a photo and print their value.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coin_counter::config::CoinCounterConfig;
use coin_counter::core::{MeasureUnits, DEFAULT_PX_PER_MM};
use coin_counter::pipeline;
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "coin-counter")]
#[command(about = "Detect coins in a photo, classify them by size and sum their value")]
#[command(version)]
struct Cli {
    /// Log level for stderr output (error, warn, info, debug, trace, off).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON (only with the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the coins in an image and print the report.
    Count(CountArgs),

    /// Print the default configuration as JSON.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct CountArgs {
    /// Input image. Overrides `image_path` from the config.
    #[arg(long)]
    image: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report as JSON to this path.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the annotated image to this path.
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Font used for overlay labels.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write the grayscale intermediate to this path.
    #[arg(long)]
    gray: Option<PathBuf>,

    /// Write the blurred intermediate to this path.
    #[arg(long)]
    blurred: Option<PathBuf>,

    /// Report physical units instead of pixels.
    #[arg(long)]
    calibrated: bool,

    /// Pixels per physical unit in calibrated mode.
    #[arg(long, requires = "calibrated")]
    px_per_unit: Option<f64>,

    /// Smallest coin radius searched for, in pixels.
    #[arg(long)]
    min_radius: Option<u32>,

    /// Largest coin radius searched for, in pixels.
    #[arg(long)]
    max_radius: Option<u32>,

    /// Minimum distance between coin centers, in pixels.
    #[arg(long)]
    min_dist: Option<f32>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    match cli.command {
        Commands::Count(args) => run_count(&args),
        Commands::DefaultConfig => run_default_config(),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_level: &str, json: bool) {
    let _ = LogTracer::init();
    coin_counter::core::init_tracing(json);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: &str, _json: bool) {
    let _ = coin_counter::core::init_with_level(coin_counter::core::parse_level(level));
}

fn run_default_config() -> CliResult<()> {
    println!("{}", CoinCounterConfig::default().to_json_pretty()?);
    Ok(())
}

fn run_count(args: &CountArgs) -> CliResult<()> {
    let mut cfg = match &args.config {
        Some(path) => CoinCounterConfig::load_json(path)?,
        None => CoinCounterConfig::default(),
    };
    apply_overrides(&mut cfg, args);

    let result = pipeline::run(&cfg)?;
    print!("{}", result.report.to_text());
    Ok(())
}

fn apply_overrides(cfg: &mut CoinCounterConfig, args: &CountArgs) {
    let path_string = |p: &PathBuf| p.to_string_lossy().into_owned();

    if let Some(p) = &args.image {
        cfg.image_path = Some(path_string(p));
    }
    if let Some(p) = &args.json {
        cfg.output_path = Some(path_string(p));
    }
    if let Some(p) = &args.overlay {
        cfg.overlay_path = Some(path_string(p));
    }
    if let Some(p) = &args.font {
        cfg.font_path = Some(path_string(p));
    }
    if let Some(p) = &args.gray {
        cfg.gray_path = Some(path_string(p));
    }
    if let Some(p) = &args.blurred {
        cfg.blurred_path = Some(path_string(p));
    }
    if args.calibrated {
        let px_per_unit = args.px_per_unit.unwrap_or(match &cfg.units {
            MeasureUnits::Calibrated { px_per_unit, .. } => *px_per_unit,
            MeasureUnits::Pixels => DEFAULT_PX_PER_MM,
        });
        cfg.units = match &cfg.units {
            MeasureUnits::Calibrated { unit, .. } => MeasureUnits::Calibrated {
                px_per_unit,
                unit: unit.clone(),
            },
            MeasureUnits::Pixels => MeasureUnits::calibrated_mm(px_per_unit),
        };
    }
    if let Some(r) = args.min_radius {
        cfg.hough.min_radius = r;
    }
    if let Some(r) = args.max_radius {
        cfg.hough.max_radius = r;
    }
    if let Some(d) = args.min_dist {
        cfg.hough.min_dist = d;
    }
}
