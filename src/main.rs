use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use podcastify::feed::FfprobeProber;
use podcastify::{Config, Generator};

#[derive(Parser, Debug)]
#[command(
    name = "podcastify",
    about = "Generate iTunes podcast RSS feeds from YAML configs and MP3 directories"
)]
struct Args {
    /// Run feed generation now, regardless of RUN_ON_START
    #[arg(value_enum)]
    trigger: Option<Trigger>,

    /// TOML config file (environment variables override its values)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Trigger {
    Generate,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    config
        .apply_env(|key| std::env::var(key).ok())
        .context("Invalid environment configuration")?;

    let should_run = args.trigger == Some(Trigger::Generate) || config.run_on_start;
    if !should_run {
        tracing::info!("RUN_ON_START is disabled and no trigger given; ready");
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!(
        podcasts_root = %config.podcasts_root.display(),
        public_root = %config.public_root.display(),
        base_url = %config.base_url,
        publish_xml = config.publish_xml,
        "Starting feed generation"
    );

    let prober = FfprobeProber::new(&config.ffprobe_path, config.probe_timeout())
        .context("Failed to start runtime for duration probing")?;
    let generator = Generator::new(&config, &prober).context("Invalid configuration")?;
    let summary = generator.process_all();

    if summary.any_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!("No feeds were generated");
        Ok(ExitCode::FAILURE)
    }
}
