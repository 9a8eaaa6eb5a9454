//! Dashboard configuration loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid payload slider: {0}")]
    InvalidSlider(String),
}

/// One entry of the site dropdown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SiteOption {
    /// Value matched against the `Launch Site` column.
    pub value: String,
    /// Text shown in the dropdown.
    pub label: String,
}

impl SiteOption {
    fn new(value: &str, label: &str) -> Self {
        SiteOption {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Payload slider domain in kilograms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SliderConfig {
    fn default() -> Self {
        SliderConfig {
            min: 0.0,
            max: 10_000.0,
            step: 1_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DashboardConfig {
    /// Dataset opened at startup when no `--data` argument is given.
    pub data_path: PathBuf,
    pub payload_slider: SliderConfig,
    /// Known sites, in dropdown order. Sites found only in the data are
    /// appended after these.
    pub sites: Vec<SiteOption>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("spacex_launch_dash.csv"),
            payload_slider: SliderConfig::default(),
            sites: vec![
                SiteOption::new(
                    "CCAFS LC-40",
                    "Cape Canaveral Launch Complex 40 [CCAFS LC-40]",
                ),
                SiteOption::new(
                    "CCAFS SLC-40",
                    "Cape Canaveral Space Launch Complex 40 [CCAFS SLC-40]",
                ),
                SiteOption::new(
                    "VAFB SLC-4E",
                    "Vandenberg Space Launch Complex 4E [VAFB SLC-4E]",
                ),
                SiteOption::new(
                    "KSC LC-39A",
                    "Kennedy Space Center Launch Complex [KSC LC-39A]",
                ),
            ],
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for startup.
    ///
    /// An explicit path must load. Otherwise [`DEFAULT_CONFIG_PATH`] is used
    /// when present, and built-in defaults when it is not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            Self::load(default_path)
        } else {
            log::debug!("No {DEFAULT_CONFIG_PATH} found, using built-in defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.payload_slider;
        if !(s.min.is_finite() && s.max.is_finite() && s.min < s.max) {
            return Err(ConfigError::InvalidSlider(format!(
                "min ({}) must be below max ({})",
                s.min, s.max
            )));
        }
        if !(s.step.is_finite() && s.step > 0.0) {
            return Err(ConfigError::InvalidSlider(format!(
                "step must be positive, got {}",
                s.step
            )));
        }
        Ok(())
    }
}
