// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Generators module - sensor specific measurement strategies
//!
//! - Accelerometer and magnetometer: one [`StaticMeasurement`] per admitted
//!   static run
//! - Gyroscope: one [`KinematicsSequence`] per admitted dynamic run

mod accelerometer;
mod gyroscope;
mod magnetometer;

pub use accelerometer::{AccelerometerGenerator, AccelerometerStrategy};
pub use gyroscope::{GyroscopeGenerator, GyroscopeStrategy};
pub use magnetometer::{MagnetometerGenerator, MagnetometerStrategy};

use crate::analysis::TriadStatistics;
use crate::sensors::TimedBodyKinematics;
use crate::units::{AccelerationTriad, PhysicalUnit, Triad};

/// Average of a triad over a static run, with its dispersion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticMeasurement<U: PhysicalUnit> {
    /// Mean triad over the run
    pub average: Triad<U>,
    /// Per-axis standard deviation over the run
    pub standard_deviation: Triad<U>,
    /// Number of samples in the run
    pub samples: usize,
}

impl<U: PhysicalUnit> StaticMeasurement<U> {
    /// Snapshot of an accumulator
    pub fn from_statistics(statistics: &TriadStatistics<U>) -> Self {
        Self {
            average: statistics.average(),
            standard_deviation: statistics.standard_deviation(),
            samples: statistics.count(),
        }
    }
}

/// Timestamped motion between two periods of rest
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KinematicsSequence {
    /// Samples of the dynamic run in arrival order
    pub samples: Vec<TimedBodyKinematics>,
    /// Mean specific force of the static run before the motion
    pub before_mean_specific_force: AccelerationTriad,
    /// Mean specific force once the body settled after the motion
    pub after_mean_specific_force: AccelerationTriad,
}

impl KinematicsSequence {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time spanned by the samples, in seconds
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp_seconds - first.timestamp_seconds,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for the strategy scenario tests

    use crate::config::{DetectorConfig, GeneratorConfig, SimulationConfig};
    use crate::sensors::{ImuSimulator, TimedBodyKinematicsAndMagneticFluxDensity};

    pub const STATIC_SAMPLES: usize = 300;
    pub const DYNAMIC_SAMPLES: usize = 50;
    pub const SHORT_STATIC_SAMPLES: usize = 60;
    pub const LONG_DYNAMIC_SAMPLES: usize = 200;

    pub fn config() -> GeneratorConfig {
        GeneratorConfig {
            min_static_samples: 100,
            max_dynamic_samples: 150,
            detector: DetectorConfig {
                window_size: 20,
                initial_static_samples: 200,
                threshold_factor: 3.0,
                instantaneous_noise_level_factor: 3.0,
                base_noise_level_absolute_threshold: 1.0,
                time_interval: 0.02,
            },
        }
    }

    pub fn simulator(seed: u64) -> ImuSimulator {
        ImuSimulator::new(SimulationConfig::default(), seed).unwrap()
    }

    /// Alternating runs, starting with a static one long enough to initialize
    pub fn stream(seed: u64, runs: &[usize]) -> Vec<TimedBodyKinematicsAndMagneticFluxDensity> {
        let mut simulator = simulator(seed);
        let mut samples = Vec::new();
        for (i, &length) in runs.iter().enumerate() {
            if i % 2 == 0 {
                samples.extend(simulator.static_run(length));
            } else {
                samples.extend(simulator.dynamic_run(length));
            }
        }
        samples
    }

    /// `cycles` repetitions of a static run followed by a dynamic run
    pub fn cycles(cycles: usize) -> Vec<usize> {
        (0..cycles).flat_map(|_| [STATIC_SAMPLES, DYNAMIC_SAMPLES]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::BodyKinematics;
    use crate::units::AccelerationUnit;

    #[test]
    fn test_static_measurement_from_statistics() {
        let mut statistics = TriadStatistics::new(AccelerationUnit::MetersPerSquaredSecond);
        for z in [9.0, 10.0, 11.0] {
            statistics.add(&AccelerationTriad::new(1.0, 0.0, z, AccelerationUnit::MetersPerSquaredSecond));
        }

        let measurement = StaticMeasurement::from_statistics(&statistics);
        assert_eq!(measurement.samples, 3);
        assert!((measurement.average.z() - 10.0).abs() < 1e-12);
        assert!((measurement.average.x() - 1.0).abs() < 1e-12);
        assert!((measurement.standard_deviation.z() - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(measurement.standard_deviation.x(), 0.0);
    }

    #[test]
    fn test_sequence_duration() {
        let mut sequence = KinematicsSequence::default();
        assert!(sequence.is_empty());
        assert_eq!(sequence.duration(), 0.0);

        for t in [1.0, 1.5, 2.25] {
            sequence
                .samples
                .push(TimedBodyKinematics::new(BodyKinematics::default(), t));
        }
        assert_eq!(sequence.len(), 3);
        assert!((sequence.duration() - 1.25).abs() < 1e-12);
    }
}
