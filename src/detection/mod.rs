// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Detection module - static/dynamic interval classification

mod detector;

pub use detector::IntervalDetector;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectorStatus {
    /// Nothing processed since construction or the last reset
    Idle,
    /// Measuring the base noise level; the device must be still
    Initializing,
    /// Sensor is stationary
    StaticInterval,
    /// Sensor is moving
    DynamicInterval,
    /// Initialization failed; only a reset leaves this state
    Failed,
}

impl DetectorStatus {
    /// Whether samples in this state belong to a static run.
    /// Initialization counts as static.
    pub fn is_static(self) -> bool {
        matches!(self, DetectorStatus::Initializing | DetectorStatus::StaticInterval)
    }
}

/// Why initialization failed
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DetectionFailure {
    /// Noise over the whole initialization window exceeded the absolute limit
    #[error("excessive overall noise: base noise level {base_noise_level:e} exceeds {limit:e}")]
    ExcessiveOverallNoise { base_noise_level: f64, limit: f64 },

    /// Some window during initialization was much noisier than the whole
    #[error("sudden excessive movement: windowed noise level {instantaneous_noise_level:e} exceeds {limit:e}")]
    SuddenExcessiveMovement { instantaneous_noise_level: f64, limit: f64 },
}

/// Result of feeding one triad to the detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorStep {
    /// False when the sample was refused because the detector is failed
    pub accepted: bool,
    /// Transition caused by this sample, if any
    pub transition: Option<DetectorTransition>,
}

/// State transition reported by [`IntervalDetector::process`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectorTransition {
    /// First sample received
    InitializationStarted,
    /// Initialization accepted. The detector is now in a static interval.
    InitializationCompleted { base_noise_level: f64 },
    /// Initialization rejected. The detector is now failed.
    Failed(DetectionFailure),
    /// Flip from dynamic to static
    StaticIntervalDetected,
    /// Flip from static to dynamic
    DynamicIntervalDetected,
}
