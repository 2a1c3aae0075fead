//! # exo-cli entry point
//!
//! Runs the transit detection pipeline over local files and writes
//! synthetic sample light curves.
//!
//! ```bash
//! exo-cli sample --seed 7 --output sample.csv
//! exo-cli analyze sample.csv --depth-threshold 0.005 --pretty
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exo_transit::config::AppConfig;
use exo_transit::services::analysis_processor::{analyze_text, AnalysisRequest};
use exo_transit::services::report::Mission;
use exo_transit::services::pipeline::{DetectionParams, PipelineOptions, StageEvent};
use exo_transit::services::synthetic::{generate, to_csv, write_csv, SyntheticCurveSpec};

/// Exo Transit CLI
///
/// Detects exoplanet transit candidates in `time,flux[,flux_err]` light curves.
#[derive(Parser, Debug)]
#[command(name = "exo-cli", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (overrides EXO_CONFIG).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a light-curve CSV and print the detection report as JSON.
    Analyze(AnalyzeArgs),

    /// Write a synthetic light curve as CSV.
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Light-curve CSV file.
    file: PathBuf,

    /// Fractional dip depth threshold, in (0, 1).
    #[arg(long)]
    depth_threshold: Option<f64>,

    /// Minimum in-dip samples per candidate.
    #[arg(long = "min-duration")]
    min_duration: Option<usize>,

    /// Rolling-median window in samples (odd, at least 5).
    #[arg(long = "window")]
    window: Option<usize>,

    /// Mission the curve came from (kepler, tess or custom).
    #[arg(long)]
    mission: Option<Mission>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Noise seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of evenly spaced transits (3 days apart); one transit when absent.
    #[arg(long)]
    transits: Option<usize>,

    /// Gaussian noise sigma on the flux; 0 writes an exact curve.
    #[arg(long)]
    noise: Option<f64>,

    /// Output file; stdout when absent.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Analyze(args) => run_analyze(&args, &config),
        Commands::Sample(args) => run_sample(&args),
    });

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => AppConfig::load().context("loading config"),
    }
}

/// Run the pipeline over a file and return the report JSON.
fn run_analyze(args: &AnalyzeArgs, config: &AppConfig) -> anyhow::Result<String> {
    let size = fs::metadata(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?
        .len();
    if size > config.limits.max_input_bytes as u64 {
        bail!(
            "{} is {} bytes, above the {} byte input limit",
            args.file.display(),
            size,
            config.limits.max_input_bytes
        );
    }

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;

    let options = PipelineOptions {
        depth_threshold: args.depth_threshold,
        min_duration_samples: args.min_duration,
        normalize_window: args.window,
    };
    let params = DetectionParams::resolve(&options, &config.pipeline)?;
    let request = AnalysisRequest::new(params).with_mission(args.mission);

    let progress = |event: &StageEvent| {
        tracing::info!("{} ({:.1} ms): {}", event.stage, event.elapsed_ms, event.detail);
    };
    let report = analyze_text(&text, &request, &progress)
        .with_context(|| format!("analyzing {}", args.file.display()))?;

    let json = if args.pretty {
        report.to_json_pretty()?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

/// Generate a synthetic curve, writing it to a file or returning it.
fn run_sample(args: &SampleArgs) -> anyhow::Result<String> {
    let spec = match args.transits {
        Some(count) => SyntheticCurveSpec::periodic(1.5, 3.0, 0.2, 0.015, count),
        None => SyntheticCurveSpec::default(),
    }
    .with_seed(args.seed);
    let spec = match args.noise {
        Some(sigma) if !(sigma >= 0.0 && sigma.is_finite()) => {
            bail!("noise must be a finite value >= 0, got {}", sigma)
        }
        Some(sigma) => spec.with_noise(sigma),
        None => spec,
    };
    let samples = generate(&spec);

    match &args.output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_csv(&samples, file).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {} samples to {}", samples.len(), path.display());
            Ok(String::new())
        }
        None => Ok(to_csv(&samples)?.trim_end().to_string()),
    }
}
