use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::brush::{BrushSettings, BrushSize, DEFAULT_BRUSH_SIZE_DP};
use crate::color::parse_color;
use crate::error::DrawingError;
use crate::history::RedoPolicy;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "DRAWING_APP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(#[from] DrawingError),
}

/// Sizes offered by the brush chooser, in density-independent units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSizePresets {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl Default for BrushSizePresets {
    fn default() -> Self {
        Self {
            small: 10.0,
            medium: 20.0,
            large: 30.0,
        }
    }
}

impl BrushSizePresets {
    pub fn dp(&self, size: BrushSize) -> f32 {
        match size {
            BrushSize::Small => self.small,
            BrushSize::Medium => self.medium,
            BrushSize::Large => self.large,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub brush_size_dp: f32,
    pub brush_color: String,
    pub brush_sizes_dp: BrushSizePresets,
    pub palette: Vec<String>,
    /// Where exports are written; defaults to the user cache directory
    pub export_dir: Option<PathBuf>,
    pub redo_policy: RedoPolicy,
    pub background_color: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            brush_size_dp: DEFAULT_BRUSH_SIZE_DP,
            brush_color: "#000000".to_owned(),
            brush_sizes_dp: BrushSizePresets::default(),
            palette: [
                "#000000", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF8800", "#8800FF",
                "#FFFFFF",
            ]
            .map(str::to_owned)
            .to_vec(),
            export_dir: None,
            redo_policy: RedoPolicy::default(),
            background_color: "#FFFFFF".to_owned(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the file named by `DRAWING_APP_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Palette entries are checked when clicked, so only the brush fields are
    /// required to be valid up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.initial_brush(1.0)?;
        parse_color(&self.background_color)?;
        Ok(())
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(default_export_dir)
    }

    /// The palette entry picked in an earlier session, if it still exists.
    /// With nothing picked the brush keeps `brush_color`.
    pub fn palette_color(&self, selected: Option<usize>) -> Option<&str> {
        self.palette.get(selected?).map(String::as_str)
    }

    pub fn initial_brush(&self, density: f32) -> Result<BrushSettings, DrawingError> {
        let mut brush = BrushSettings::new(parse_color(&self.brush_color)?, 1.0)?;
        brush.set_size_dp(self.brush_size_dp, density)?;
        Ok(brush)
    }
}

fn default_export_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("drawing_app")
}
