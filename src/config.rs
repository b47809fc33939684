use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::timeline::{DEFAULT_DIVIDER_POSITION, MinimapGeometry};

const MINIMAP_AXIS_HEIGHT: f32 = 20.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub minimap_height: f32,
    pub minimap_bar_height: f32,
    pub row_height: f32,
    pub divider_position: f64,
    pub window_size: [f32; 2],
    /// Derive the minimap margin from observed layout instead of the reported scale.
    pub infer_zoom: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            minimap_height: 120.0,
            minimap_bar_height: 5.0,
            row_height: 24.0,
            divider_position: DEFAULT_DIVIDER_POSITION,
            window_size: [1440.0, 920.0],
            infer_zoom: false,
        }
    }
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), ?config, "read viewer config");
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("minimap_height", self.minimap_height),
            ("minimap_bar_height", self.minimap_bar_height),
            ("row_height", self.row_height),
            ("window_size.width", self.window_size[0]),
            ("window_size.height", self.window_size[1]),
        ];
        for (field, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: f64::from(value),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.divider_position) {
            return Err(ConfigError::OutOfRange {
                field: "divider_position",
                value: self.divider_position,
            });
        }

        Ok(())
    }

    pub fn minimap_geometry(&self) -> MinimapGeometry {
        MinimapGeometry {
            strip_height: self.minimap_height,
            bar_height: self.minimap_bar_height,
            axis_height: MINIMAP_AXIS_HEIGHT,
        }
    }
}
