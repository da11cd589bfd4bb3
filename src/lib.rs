// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! imucal - Streaming IMU Calibration Preprocessing
//!
//! Turns a raw, time-ordered inertial sample stream into calibration-ready
//! artifacts:
//! - Adaptive static/dynamic interval detection with noise-based thresholds
//! - Run-length admission policy (too-short rest, too-long motion)
//! - Accelerometer and magnetometer averages per admitted rest period
//! - Gyroscope motion sequences bracketed by the rest before and after
//! - Numerically stable incremental and windowed statistics
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Measurement Generator                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐  ┌──────────┐  ┌───────────┐  ┌────────────┐  │
//! │  │ Sample  │→ │ Interval │→ │ Admission │→ │  Strategy  │  │
//! │  │ Stream  │  │ Detector │  │  Policy   │  │ (acc/mag/  │  │
//! │  │         │  │          │  │           │  │   gyro)    │  │
//! │  └─────────┘  └──────────┘  └───────────┘  └────────────┘  │
//! │       ↓            ↓             ↓              ↓          │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │                     Listener                         │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod analysis;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod generators;
pub mod sensors;
pub mod units;

// Re-exports for convenience
pub use config::{Config, DetectorConfig, GeneratorConfig};
pub use crate::core::{EventRecorder, GeneratorEvent, GeneratorListener, MeasurementGenerator, MeasurementStrategy};
pub use detection::{DetectionFailure, DetectorStatus, IntervalDetector};
pub use error::CalibrationError;
pub use generators::{
    AccelerometerGenerator, GyroscopeGenerator, KinematicsSequence, MagnetometerGenerator, StaticMeasurement,
};
pub use sensors::ImuSimulator;
pub use units::{AccelerationTriad, AngularSpeedTriad, MagneticFluxDensityTriad, Triad};

/// imucal version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// imucal name
pub const NAME: &str = "imucal";
