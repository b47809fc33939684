use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use span_waterfall::app::TraceViewerApp;
use span_waterfall::config::ViewerConfig;

const DEFAULT_LOG_FILTER: &str = "span_waterfall=info";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Trace event JSON file.
    trace_file: PathBuf,

    /// Viewer settings as JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial divider position between 0 and 1.
    #[arg(long)]
    divider: Option<f64>,

    #[arg(long)]
    row_height: Option<f32>,

    /// Overrides RUST_LOG, e.g. `span_waterfall=debug`.
    #[arg(long)]
    log_filter: Option<String>,
}

fn init_logging(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}

fn load_config(args: &Args) -> Result<ViewerConfig> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::default(),
    };

    if let Some(divider) = args.divider {
        config.divider_position = divider;
    }
    if let Some(row_height) = args.row_height {
        config.row_height = row_height;
    }

    config.validate().context("invalid command line overrides")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_filter.as_deref())?;
    let config = load_config(&args)?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size(config.window_size),
        ..Default::default()
    };

    let trace_file = args.trace_file;
    eframe::run_native(
        "span-waterfall",
        options,
        Box::new(move |cc| Ok(Box::new(TraceViewerApp::new(cc, trace_file, config)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
