// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Magnetometer measurement generation
//!
//! Static runs are still detected on the specific force; the magnetic flux
//! density sensed over each admitted run is averaged into a measurement.

use super::StaticMeasurement;
use crate::analysis::TriadStatistics;
use crate::core::{MeasurementGenerator, MeasurementStrategy, RunPhase};
use crate::error::Result;
use crate::sensors::TimedBodyKinematicsAndMagneticFluxDensity;
use crate::units::{AccelerationTriad, AccelerationUnit, MagneticFluxDensityUnit};

/// Emits the mean magnetic flux density of every admitted static run
#[derive(Debug, Clone)]
pub struct MagnetometerStrategy {
    flux: TriadStatistics<MagneticFluxDensityUnit>,
}

impl MagnetometerStrategy {
    pub fn new() -> Self {
        Self {
            flux: TriadStatistics::new(MagneticFluxDensityUnit::Tesla),
        }
    }

    /// Samples accumulated in the open static run
    pub fn accumulated_samples(&self) -> usize {
        self.flux.count()
    }
}

impl Default for MagnetometerStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementStrategy for MagnetometerStrategy {
    type Sample = TimedBodyKinematicsAndMagneticFluxDensity;
    type Measurement = StaticMeasurement<MagneticFluxDensityUnit>;

    const NAME: &'static str = "magnetometer";
    const DEFAULT_BASE_NOISE_LEVEL_ABSOLUTE_THRESHOLD: f64 = 0.1;

    fn specific_force(sample: &Self::Sample) -> AccelerationTriad {
        *sample.specific_force()
    }

    fn timestamp(sample: &Self::Sample) -> f64 {
        sample.timestamp_seconds
    }

    fn on_sample(&mut self, sample: &Self::Sample, phase: RunPhase) {
        if phase != RunPhase::Dynamic {
            self.flux.add(&sample.magnetic_flux_density);
        }
    }

    fn on_static_run_finished(
        &mut self,
        _run: &TriadStatistics<AccelerationUnit>,
        admitted: bool,
    ) -> Option<Self::Measurement> {
        let measurement = admitted.then(|| StaticMeasurement::from_statistics(&self.flux));
        self.flux.reset();
        measurement
    }

    fn set_time_interval(&mut self, time_interval: f64) -> Result<()> {
        self.flux.set_time_interval(time_interval)
    }

    fn reset(&mut self) {
        self.flux.reset();
    }
}

/// Magnetometer calibration measurement generator
pub type MagnetometerGenerator = MeasurementGenerator<MagnetometerStrategy>;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{EventRecorder, EventType, GeneratorEvent};
    use crate::detection::DetectorStatus;
    use crate::generators::testing::{self, *};
    use crate::units::MagneticFluxDensityTriad;

    type Recorder = EventRecorder<StaticMeasurement<MagneticFluxDensityUnit>>;

    fn generator() -> (MagnetometerGenerator, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::new());
        let generator = MagnetometerGenerator::with_config(MagnetometerStrategy::new(), testing::config())
            .unwrap()
            .with_listener(recorder.clone());
        (generator, recorder)
    }

    fn feed(generator: &MagnetometerGenerator, samples: &[TimedBodyKinematicsAndMagneticFluxDensity]) {
        for sample in samples {
            assert!(generator.process(sample).unwrap());
        }
    }

    #[test]
    fn test_default_threshold_differs_from_accelerometer() {
        let generator = MagnetometerGenerator::default();
        assert_eq!(generator.base_noise_level_absolute_threshold(), 0.1);
        assert_eq!(generator.min_static_samples(), crate::config::GeneratorConfig::default().min_static_samples);
    }

    #[test]
    fn test_happy_path() {
        const N: usize = 3;
        let (generator, recorder) = generator();
        feed(&generator, &stream(61, &cycles(N)));

        assert_eq!(recorder.count(EventType::InitializationCompleted), 1);
        assert_eq!(recorder.count(EventType::StaticIntervalDetected), N);
        assert_eq!(recorder.count(EventType::DynamicIntervalDetected), N);
        assert_eq!(recorder.count(EventType::StaticIntervalSkipped), 0);
        assert_eq!(recorder.count(EventType::DynamicIntervalSkipped), 0);

        let measurements = recorder.measurements();
        assert_eq!(measurements.len(), N);

        // The body only rotates, so the sensed field keeps the Earth field magnitude
        let field = MagneticFluxDensityTriad::from_base(testing::simulator(0).config().magnetic_field.into());
        for measurement in &measurements {
            assert_eq!(measurement.average.unit(), MagneticFluxDensityUnit::Tesla);
            assert!((measurement.average.norm() - field.norm()).abs() < 1e-7);
            assert!(measurement.standard_deviation.norm() < 1e-6);
            assert!(measurement.samples >= testing::config().min_static_samples);
        }

        // Attitude changes between runs, so do the averages
        assert!((measurements[0].average.as_vector() - measurements[1].average.as_vector()).norm() > 1e-6);
        assert_eq!(generator.with_strategy(|s| s.accumulated_samples()), 0);
    }

    #[test]
    fn test_short_static_run_is_skipped() {
        let (generator, recorder) = generator();
        feed(&generator, &stream(62, &[STATIC_SAMPLES, DYNAMIC_SAMPLES, SHORT_STATIC_SAMPLES, DYNAMIC_SAMPLES]));

        assert_eq!(recorder.count(EventType::StaticIntervalSkipped), 1);
        assert_eq!(recorder.count(EventType::DynamicIntervalDetected), 2);
        assert_eq!(recorder.measurements().len(), 1);
    }

    #[test]
    fn test_reset_clears_accumulated_flux() {
        let (generator, recorder) = generator();
        feed(&generator, &stream(63, &[STATIC_SAMPLES]));
        assert_eq!(generator.with_strategy(|s| s.accumulated_samples()), STATIC_SAMPLES);
        assert_eq!(generator.status(), DetectorStatus::StaticInterval);

        generator.reset().unwrap();
        assert_eq!(generator.with_strategy(|s| s.accumulated_samples()), 0);
        assert_eq!(recorder.drain().last(), Some(&GeneratorEvent::Reset));
    }
}
