//! Run the simulated device for a fixed duration and print its predictions

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use edgepulse_core::constants::FEATURE_VECTOR_LEN;
use edgepulse_core::{InferenceEngine, SensorSource};
use edgepulse_ml::{FixedOutputEngine, ModelArtifact};
use edgepulse_sim::{dataset_source, ConsoleReporter, Device, SimConfig, SyntheticSensor};
use tokio::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "edgepulse-sim", version, about = "Dual-core sense/infer pipeline simulator")]
struct Cli {
    /// Model artifact (JSON dense softmax layer)
    #[arg(long, required_unless_present_any = ["dry_run", "print_config"])]
    model: Option<PathBuf>,

    /// Run with a uniform fixed-output engine instead of a model
    #[arg(long, conflicts_with = "model")]
    dry_run: bool,

    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to run before shutting down
    #[arg(long, default_value_t = 30)]
    duration_secs: u64,

    /// Replay a recorded `ir,red` CSV instead of the synthetic sensor
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Seed for the synthetic sensor
    #[arg(long)]
    seed: Option<u64>,

    /// Write the shutdown report as JSON to this file
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Log every prediction and queue drop
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let mut config = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.sensor.seed = Some(seed);
    }
    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }
    let device = Device::new(config)?;

    let (engine, model_bytes): (Box<dyn InferenceEngine + Send>, usize) = match &cli.model {
        Some(path) => {
            let artifact = ModelArtifact::load(path)?;
            let size = artifact.size_bytes();
            let engine = artifact.into_engine()?;
            log::debug!("model carries {} parameter bytes", engine.parameter_bytes());
            (Box::new(engine), size)
        }
        None => {
            log::warn!("dry run: no model loaded, predictions are uniform");
            (Box::new(FixedOutputEngine::uniform(FEATURE_VECTOR_LEN)), 0)
        }
    };

    let duration = Duration::from_secs(cli.duration_secs);
    match &cli.dataset {
        Some(path) => {
            let source = dataset_source(path)
                .with_context(|| format!("loading dataset {}", path.display()))?;
            run(device, source, engine, model_bytes, duration, cli.report_json.as_deref()).await
        }
        None => {
            let source = SyntheticSensor::new(device.config().sensor.clone());
            run(device, source, engine, model_bytes, duration, cli.report_json.as_deref()).await
        }
    }
}

async fn run<S>(
    device: Device,
    source: S,
    engine: Box<dyn InferenceEngine + Send>,
    model_bytes: usize,
    duration: Duration,
    report_json: Option<&Path>,
) -> anyhow::Result<()>
where
    S: SensorSource + Send + 'static,
{
    let mut running = device
        .boot(source, engine, model_bytes)
        .context("device failed to boot")?;
    let mut reporter = ConsoleReporter::stdout();

    let started = Instant::now();
    reporter.run_for(running.results(), duration).await?;
    let elapsed = started.elapsed();

    let report = running.shutdown().await?;
    for result in &report.remaining {
        reporter.report(result)?;
    }

    reporter.summary(elapsed)?;
    reporter.shutdown(&report)?;

    if let Some(path) = report_json {
        let file = File::create(path)
            .with_context(|| format!("creating report {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        log::info!("shutdown report written to {}", path.display());
    }
    Ok(())
}
