// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::DEFAULT_TIME_INTERVAL;
use crate::error::{self, ensure_count_above, ensure_positive};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level used when no command line override is given
    pub log_level: String,

    /// Measurement generator configuration
    pub generator: GeneratorConfig,

    /// Synthetic stream configuration
    pub simulation: SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            generator: GeneratorConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.generator.validate()?;
        config.simulation.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("imucal"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Static/dynamic interval detector configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Number of samples in the moving classification window (> 2)
    pub window_size: usize,

    /// Samples consumed by initialization while the device is assumed still (> 1)
    pub initial_static_samples: usize,

    /// Threshold = base noise level * threshold_factor (> 0)
    pub threshold_factor: f64,

    /// Maximum ratio between the windowed and the base noise level tolerated
    /// during initialization (> 0)
    pub instantaneous_noise_level_factor: f64,

    /// Upper bound for the base noise level, in base units of the detected
    /// quantity (> 0)
    pub base_noise_level_absolute_threshold: f64,

    /// Sampling interval in seconds (> 0)
    pub time_interval: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: 101,
            initial_static_samples: 5000,
            threshold_factor: 2.0,
            instantaneous_noise_level_factor: 3.0,
            base_noise_level_absolute_threshold: 0.05,
            time_interval: DEFAULT_TIME_INTERVAL,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> error::Result<()> {
        ensure_count_above("window_size", self.window_size, 2, "greater than 2")?;
        ensure_count_above("initial_static_samples", self.initial_static_samples, 1, "greater than 1")?;
        ensure_positive("threshold_factor", self.threshold_factor)?;
        ensure_positive("instantaneous_noise_level_factor", self.instantaneous_noise_level_factor)?;
        ensure_positive("base_noise_level_absolute_threshold", self.base_noise_level_absolute_threshold)?;
        ensure_positive("time_interval", self.time_interval)?;
        Ok(())
    }
}

/// Measurement generator configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Shortest static run admitted as a measurement source (> 1)
    pub min_static_samples: usize,

    /// Longest dynamic run kept before it is discarded (> 1)
    pub max_dynamic_samples: usize,

    /// Interval detector configuration
    pub detector: DetectorConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_static_samples: 2500,
            max_dynamic_samples: 5000,
            detector: DetectorConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> error::Result<()> {
        ensure_count_above("min_static_samples", self.min_static_samples, 1, "greater than 1")?;
        ensure_count_above("max_dynamic_samples", self.max_dynamic_samples, 1, "greater than 1")?;
        self.detector.validate()
    }
}

/// Synthetic IMU stream configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Sampling interval in seconds
    pub time_interval: f64,

    /// Gravity magnitude in m/s²
    pub gravity: f64,

    /// Accelerometer white noise standard deviation per axis (m/s²)
    pub accelerometer_noise: f64,

    /// Gyroscope white noise standard deviation per axis (rad/s)
    pub gyroscope_noise: f64,

    /// Magnetometer white noise standard deviation per axis (T)
    pub magnetometer_noise: f64,

    /// Angular rate magnitude while moving (rad/s)
    pub rotation_rate: f64,

    /// Local Earth magnetic field in the navigation frame (T)
    pub magnetic_field: [f64; 3],

    /// Samples per static run
    pub static_samples: usize,

    /// Samples per dynamic run
    pub dynamic_samples: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_interval: 0.02,
            gravity: crate::units::STANDARD_GRAVITY,
            accelerometer_noise: 0.005,
            gyroscope_noise: 0.001,
            magnetometer_noise: 1e-7,
            rotation_rate: 1.0,
            magnetic_field: [2.0e-5, 0.0, 4.5e-5],
            static_samples: 3000,
            dynamic_samples: 200,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> error::Result<()> {
        ensure_positive("time_interval", self.time_interval)?;
        ensure_positive("gravity", self.gravity)?;
        ensure_positive("accelerometer_noise", self.accelerometer_noise)?;
        ensure_positive("gyroscope_noise", self.gyroscope_noise)?;
        ensure_positive("magnetometer_noise", self.magnetometer_noise)?;
        ensure_positive("rotation_rate", self.rotation_rate)?;
        ensure_count_above("static_samples", self.static_samples, 0, "greater than 0")?;
        ensure_count_above("dynamic_samples", self.dynamic_samples, 0, "greater than 0")?;
        Ok(())
    }
}
