//! `growthlimit`: pick parcels for development under an acreage limit.

use clap::Parser;
use growthlimit_runner::{App, InMemoryRecorder, Result, RunnerError, SessionConfig, SessionEvent};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "growthlimit", version, about)]
struct Args {
    /// YAML session config.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Development limit in acres.
    #[arg(long)]
    budget: Option<f64>,

    /// Base URL of the neighborhood GeoJSON documents.
    #[arg(long)]
    base_url: Option<String>,

    /// Read neighborhood documents from this directory instead of the network.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep downloaded documents in this directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// File the selection is exported to.
    #[arg(long)]
    export_path: Option<PathBuf>,

    /// Write recorded metrics as JSON to this file on exit.
    #[arg(long)]
    metrics_output: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn apply(&self, config: &mut SessionConfig) {
        if let Some(budget) = self.budget {
            config.default_budget = budget;
        }
        if let Some(base_url) = &self.base_url {
            config.catalog.base_url = base_url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.catalog.data_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.cache_dir {
            config.catalog.cache_dir = Some(dir.clone());
        }
        if let Some(path) = &self.export_path {
            config.export_path = path.clone();
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let recorder = Arc::new(InMemoryRecorder::new());
    if metrics::set_global_recorder(recorder.clone()).is_ok() {
        growthlimit_metrics::describe_metrics();
    }

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let source = config.build_source()?;
    info!(source = %source.describe(), budget = config.default_budget, "starting session");

    let (mut app, input_tx) = App::new(&config, source, io::stdout())?;

    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if input_tx.send(SessionEvent::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!(%err, "failed to read input");
                        break;
                    }
                }
            }
            let _ = input_tx.send(SessionEvent::InputClosed);
        })
        .map_err(RunnerError::Io)?;

    app.run()?;

    if let Some(path) = &args.metrics_output {
        recorder.write_json(path)?;
        info!(path = %path.display(), "metrics written");
    }
    Ok(())
}
