//! Configuration management for sessions and the CLI
//!
//! This module provides runtime configuration loading from JSON files so
//! class names, band count, dataset paths and the actuator table can be
//! changed without recompiling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::actuator::{ChannelKind, SerialSettings};
use crate::dataset::labels::{DEFAULT_CLASS_NAMES, DEFAULT_NEUTRAL_CLASS};
use crate::dataset::{ClassSet, DEFAULT_BANDS};
use crate::error::DatasetError;

/// Default location of the config file
pub const DEFAULT_CONFIG_PATH: &str = "assets/vibe_config.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub classes: ClassConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub actuator: ActuatorConfig,
}

/// Class vocabulary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConfig {
    /// Class names in display/capture order
    pub names: Vec<String>,
    /// Name of the class that means "no gesture"
    pub neutral: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            names: DEFAULT_CLASS_NAMES.iter().map(|n| n.to_string()).collect(),
            neutral: DEFAULT_NEUTRAL_CLASS.to_string(),
        }
    }
}

impl ClassConfig {
    /// Validate into a `ClassSet`
    pub fn class_set(&self) -> Result<ClassSet, DatasetError> {
        ClassSet::new(self.names.iter().cloned(), &self.neutral)
    }
}

/// Spectral front-end parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Magnitude bands per frame (feature vector length)
    pub bands: usize,
    /// Expected input sample rate in Hz
    pub sample_rate: u32,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS,
            sample_rate: 44100,
        }
    }
}

impl FrontendConfig {
    /// Samples consumed per frame (two per band)
    pub fn frame_size(&self) -> usize {
        self.bands * 2
    }
}

/// Dataset file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// File written by save requests
    pub save_path: PathBuf,
    /// File read by load requests
    pub load_path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("test2.csv"),
            load_path: PathBuf::from("test.csv"),
        }
    }
}

/// Actuator output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// Device node to write codes to; `None` disables actuation
    #[serde(default)]
    pub device: Option<PathBuf>,
    /// Serial port or plain file
    #[serde(default)]
    pub channel: ChannelKind,
    /// Line settings used when `channel` is serial
    #[serde(default)]
    pub serial: SerialSettings,
    /// Pause between decision and emission in milliseconds
    pub settling_delay_ms: u64,
    /// Output code per gesture class name
    pub codes: BTreeMap<String, u8>,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            device: None,
            channel: ChannelKind::Serial,
            serial: SerialSettings::default(),
            settling_delay_ms: 800,
            codes: BTreeMap::from([("Scratch".to_string(), 0), ("Tap".to_string(), 1)]),
        }
    }
}

impl ActuatorConfig {
    pub fn settling_delay(&self) -> Duration {
        Duration::from_millis(self.settling_delay_ms)
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or invalid.
    /// Missing sections fall back to their own defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }
}
