use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};

use tick_compositor::{
    composition::CompositionEngine,
    config::Config,
    runner::{CommandRunner, DryRunRunner, FfmpegRunner},
};

#[derive(Parser)]
#[command(
    name = "tick-compositor",
    version,
    about = "Stitch tick-coded runs into rendered videos with ffmpeg",
    long_about = "Tick-Compositor reads timing files that mark checkpoints and speed changes in recordings, then builds and runs one ffmpeg trim/speed/concat command per output listed in the manifest."
)]
struct Cli {
    /// Folder containing timing files, recordings and the output manifest
    #[arg(short, long)]
    input: PathBuf,

    /// Folder for rendered outputs (defaults to the input folder)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the ffmpeg commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Log every parsed run and exit
    #[arg(long)]
    show: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Tick-Compositor v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    config.validate()?;

    let engine = CompositionEngine::new(config);

    if cli.show {
        engine.load_timings(&cli.input)?.summary();
        return Ok(());
    }

    let output_dir = cli.output.unwrap_or_else(|| cli.input.clone());

    let mut runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner::new())
    } else {
        if !FfmpegRunner::check_available(&engine.config().ffmpeg.program) {
            warn!("{} does not respond to -version", engine.config().ffmpeg.program);
        }
        std::fs::create_dir_all(&output_dir)?;
        Box::new(FfmpegRunner::new())
    };

    let report = engine
        .compose(&cli.input, &output_dir, runner.as_mut())
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    info!("Done: {} converted, {} skipped", report.converted.len(), report.skipped.len());
    Ok(())
}
