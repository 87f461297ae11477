//! Configuration for Shotline.
//!
//! Values come from TOML with layered overrides:
//! - Bundled defaults (`shotline.toml` shipped with the library)
//! - `~/.config/shotline/shotline.toml`
//! - `./shotline.toml`
//!
//! Every section and field has a default, so override files only need the
//! values they change.

use crate::SectionMarkers;
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use shotline_error::{ConfigError, ShotlineError, ShotlineResult};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Reconciliation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct ReconcileConfig {
    /// First shot number given to shots a reply leaves unnumbered
    default_shot_number: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            default_shot_number: 1,
        }
    }
}

/// Generation settings for the batch pipeline.
///
/// # Example
///
/// ```toml
/// [pipeline]
/// model = "gemini-2.5-flash"
/// temperature = 0.4
///
/// [pipeline.markers]
/// project = "## PROJECT"
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[serde(default)]
#[setters(prefix = "with_")]
pub struct PipelineConfig {
    /// Model requested from the driver
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum tokens per reply
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Markers separating the context sections
    markers: SectionMarkers,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: Some(0.7),
            max_tokens: Some(8192),
            markers: SectionMarkers::default(),
        }
    }
}

/// Where episode workspaces are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory; a leading `~/` is the home directory
    path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "~/.local/share/shotline".to_string(),
        }
    }
}

impl StorageConfig {
    /// Base directory with `~/` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        match (self.path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.path),
        }
    }
}

/// Root configuration.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[serde(default)]
#[setters(prefix = "with_")]
pub struct ShotlineConfig {
    /// Reconciliation settings
    reconcile: ReconcileConfig,
    /// Batch pipeline settings
    pipeline: PipelineConfig,
    /// Storage settings
    storage: StorageConfig,
}

impl ShotlineConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ShotlineResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ShotlineError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ShotlineError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: current dir > home dir > bundled.
    ///
    /// Override files are optional and silently skipped when absent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shotline_pipeline::ShotlineConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ShotlineConfig::load()?;
    /// println!("storing under {}", config.storage().resolved_path().display());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> ShotlineResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../shotline.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/shotline/shotline.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("shotline").required(false));

        builder
            .build()
            .map_err(|e| {
                ShotlineError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ShotlineError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
