use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use super::parse::{ParsedTrace, parse_trace};
use super::span::TraceEvent;

#[derive(Debug, Error)]
pub enum TraceLoadError {
    #[error("failed to read trace file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid trace JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load_trace_event(path: &Path) -> Result<TraceEvent, TraceLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| TraceLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    TraceEvent::from_json_str(&raw).map_err(|source| TraceLoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Clone, Debug)]
pub struct LoadedTrace {
    pub title: Option<String>,
    pub trace: ParsedTrace,
}

pub fn load_trace(path: &Path) -> Result<LoadedTrace> {
    let event = load_trace_event(path)
        .with_context(|| format!("failed to load trace from {}", path.display()))?;
    let trace = parse_trace(&event);

    info!(
        path = %path.display(),
        spans = trace.num_of_spans,
        "loaded trace event"
    );

    Ok(LoadedTrace {
        title: event.title,
        trace,
    })
}
