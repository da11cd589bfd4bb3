// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Accelerometer measurement generation

use super::StaticMeasurement;
use crate::analysis::TriadStatistics;
use crate::core::{MeasurementGenerator, MeasurementStrategy};
use crate::sensors::TimedBodyKinematics;
use crate::units::{AccelerationTriad, AccelerationUnit};

/// Emits the mean specific force of every admitted static run
#[derive(Debug, Clone, Copy, Default)]
pub struct AccelerometerStrategy;

impl AccelerometerStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl MeasurementStrategy for AccelerometerStrategy {
    type Sample = TimedBodyKinematics;
    type Measurement = StaticMeasurement<AccelerationUnit>;

    const NAME: &'static str = "accelerometer";
    const DEFAULT_BASE_NOISE_LEVEL_ABSOLUTE_THRESHOLD: f64 = 0.05;

    fn specific_force(sample: &Self::Sample) -> AccelerationTriad {
        *sample.specific_force()
    }

    fn timestamp(sample: &Self::Sample) -> f64 {
        sample.timestamp_seconds
    }

    fn on_static_run_finished(
        &mut self,
        run: &TriadStatistics<AccelerationUnit>,
        admitted: bool,
    ) -> Option<Self::Measurement> {
        admitted.then(|| StaticMeasurement::from_statistics(run))
    }

    fn reset(&mut self) {}
}

/// Accelerometer calibration measurement generator
pub type AccelerometerGenerator = MeasurementGenerator<AccelerometerStrategy>;
