// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Gyroscope sequence generation
//!
//! Gyroscope calibration integrates attitude over the motion, so every
//! sample of a dynamic run is kept. A run produces a [`KinematicsSequence`]
//! when the static run before it was admitted and the run itself stayed
//! within its maximum length. The sequence is bracketed by the mean specific
//! force before the motion and the windowed one that confirmed rest after it.

use super::KinematicsSequence;
use crate::analysis::TriadStatistics;
use crate::core::{MeasurementGenerator, MeasurementStrategy, RunPhase};
use crate::error::Result;
use crate::sensors::TimedBodyKinematics;
use crate::units::{AccelerationTriad, AccelerationUnit, AngularSpeedTriad, AngularSpeedUnit};

/// Emits the samples of every admitted dynamic run
#[derive(Debug, Clone)]
pub struct GyroscopeStrategy {
    initial_angular_rate: TriadStatistics<AngularSpeedUnit>,
    before: Option<AccelerationTriad>,
    samples: Vec<TimedBodyKinematics>,
    collecting: bool,
}

impl GyroscopeStrategy {
    pub fn new() -> Self {
        Self {
            initial_angular_rate: TriadStatistics::new(AngularSpeedUnit::RadiansPerSecond),
            before: None,
            samples: Vec::new(),
            collecting: false,
        }
    }

    /// Angular rate average over the initialization window
    pub fn initial_angular_rate_average(&self) -> AngularSpeedTriad {
        self.initial_angular_rate.average()
    }

    pub fn initial_angular_rate_standard_deviation(&self) -> AngularSpeedTriad {
        self.initial_angular_rate.standard_deviation()
    }

    /// Angular rate noise level over the initialization window (rad/s)
    pub fn angular_rate_base_noise_level(&self) -> f64 {
        self.initial_angular_rate.noise_level()
    }

    pub fn angular_rate_base_noise_level_psd(&self) -> f64 {
        self.initial_angular_rate.psd()
    }

    pub fn angular_rate_base_noise_level_root_psd(&self) -> f64 {
        self.initial_angular_rate.root_psd()
    }

    /// Samples buffered for the open dynamic run
    pub fn buffered_samples(&self) -> usize {
        self.samples.len()
    }
}

impl Default for GyroscopeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementStrategy for GyroscopeStrategy {
    type Sample = TimedBodyKinematics;
    type Measurement = KinematicsSequence;

    const NAME: &'static str = "gyroscope";
    const DEFAULT_BASE_NOISE_LEVEL_ABSOLUTE_THRESHOLD: f64 = 0.05;

    fn specific_force(sample: &Self::Sample) -> AccelerationTriad {
        *sample.specific_force()
    }

    fn timestamp(sample: &Self::Sample) -> f64 {
        sample.timestamp_seconds
    }

    fn on_sample(&mut self, sample: &Self::Sample, phase: RunPhase) {
        match phase {
            RunPhase::Initialization => self.initial_angular_rate.add(sample.angular_rate()),
            RunPhase::Dynamic if self.collecting => self.samples.push(*sample),
            _ => {}
        }
    }

    fn on_static_run_finished(
        &mut self,
        run: &TriadStatistics<AccelerationUnit>,
        admitted: bool,
    ) -> Option<Self::Measurement> {
        self.before = admitted.then(|| run.average());
        self.samples.clear();
        self.collecting = admitted;
        None
    }

    fn on_dynamic_run_finished(
        &mut self,
        settled: &AccelerationTriad,
        admitted: bool,
    ) -> Option<Self::Measurement> {
        let sequence = match (self.before.take(), admitted && self.collecting) {
            (Some(before), true) => Some(KinematicsSequence {
                samples: self.samples.clone(),
                before_mean_specific_force: before,
                after_mean_specific_force: *settled,
            }),
            _ => None,
        };
        self.samples.clear();
        self.collecting = false;
        sequence
    }

    fn on_dynamic_run_skipped(&mut self) {
        self.samples.clear();
        self.collecting = false;
    }

    fn set_time_interval(&mut self, time_interval: f64) -> Result<()> {
        self.initial_angular_rate.set_time_interval(time_interval)
    }

    fn reset(&mut self) {
        self.initial_angular_rate.reset();
        self.before = None;
        self.samples.clear();
        self.collecting = false;
    }
}

/// Gyroscope calibration sequence generator
pub type GyroscopeGenerator = MeasurementGenerator<GyroscopeStrategy>;

impl GyroscopeGenerator {
    pub fn initial_angular_rate_average(&self) -> AngularSpeedTriad {
        self.with_strategy(GyroscopeStrategy::initial_angular_rate_average)
    }

    pub fn initial_angular_rate_standard_deviation(&self) -> AngularSpeedTriad {
        self.with_strategy(GyroscopeStrategy::initial_angular_rate_standard_deviation)
    }

    pub fn angular_rate_base_noise_level(&self) -> f64 {
        self.with_strategy(GyroscopeStrategy::angular_rate_base_noise_level)
    }

    pub fn angular_rate_base_noise_level_psd(&self) -> f64 {
        self.with_strategy(GyroscopeStrategy::angular_rate_base_noise_level_psd)
    }

    pub fn angular_rate_base_noise_level_root_psd(&self) -> f64 {
        self.with_strategy(GyroscopeStrategy::angular_rate_base_noise_level_root_psd)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{EventRecorder, EventType};
    use crate::detection::DetectorStatus;
    use crate::generators::testing::{self, *};
    use crate::sensors::TimedBodyKinematicsAndMagneticFluxDensity;

    type Recorder = EventRecorder<KinematicsSequence>;

    fn generator() -> (GyroscopeGenerator, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::new());
        let generator = GyroscopeGenerator::with_config(GyroscopeStrategy::new(), testing::config())
            .unwrap()
            .with_listener(recorder.clone());
        (generator, recorder)
    }

    fn feed(generator: &GyroscopeGenerator, samples: &[TimedBodyKinematicsAndMagneticFluxDensity]) {
        for sample in samples {
            assert!(generator.process(&sample.timed_kinematics()).unwrap());
        }
    }

    #[test]
    fn test_happy_path() {
        const N: usize = 3;
        let (generator, recorder) = generator();
        let mut runs = cycles(N);
        runs.push(STATIC_SAMPLES);
        feed(&generator, &stream(71, &runs));

        assert_eq!(recorder.count(EventType::InitializationCompleted), 1);
        assert_eq!(recorder.count(EventType::DynamicIntervalDetected), N);
        // Initialization plus one return to rest per motion
        assert_eq!(recorder.count(EventType::StaticIntervalDetected), N + 1);
        assert_eq!(recorder.count(EventType::StaticIntervalSkipped), 0);
        assert_eq!(recorder.count(EventType::DynamicIntervalSkipped), 0);

        let sequences = recorder.measurements();
        assert_eq!(sequences.len(), N);

        let dt = testing::config().detector.time_interval;
        let rate = testing::simulator(0).config().rotation_rate;
        for sequence in &sequences {
            // Detection lags the motion by at most one window
            assert!(sequence.len() >= DYNAMIC_SAMPLES - 2);
            assert!(sequence.len() <= DYNAMIC_SAMPLES + testing::config().detector.window_size);
            assert!(sequence.duration() > 0.0);
            for pair in sequence.samples.windows(2) {
                assert!((pair[1].timestamp_seconds - pair[0].timestamp_seconds - dt).abs() < 1e-9);
            }

            // The body turned between the two rest periods
            let before = sequence.before_mean_specific_force;
            let after = sequence.after_mean_specific_force;
            assert!((before.norm() - crate::units::STANDARD_GRAVITY).abs() < 0.05);
            assert!((after.norm() - crate::units::STANDARD_GRAVITY).abs() < 0.05);
            let angle = before.as_vector().angle(after.as_vector());
            assert!((angle - rate * dt * DYNAMIC_SAMPLES as f64).abs() < 0.01);
        }

        assert_eq!(generator.status(), DetectorStatus::StaticInterval);
        assert_eq!(generator.with_strategy(|s| s.buffered_samples()), 0);
    }

    #[test]
    fn test_initial_angular_rate_noise() {
        let (generator, _recorder) = generator();
        feed(&generator, &stream(72, &[STATIC_SAMPLES]));

        let sigma = testing::simulator(0).config().gyroscope_noise;
        let dt = testing::config().detector.time_interval;
        assert!(generator.initial_angular_rate_average().norm() < 5.0 * sigma);
        assert!((generator.initial_angular_rate_standard_deviation().x() - sigma).abs() < 0.3 * sigma);
        assert!((generator.angular_rate_base_noise_level() - sigma * 3f64.sqrt()).abs() < 0.3 * sigma);

        let noise = generator.angular_rate_base_noise_level();
        assert!((generator.angular_rate_base_noise_level_psd() - noise * noise * dt).abs() < 1e-15);
        assert!(
            (generator.angular_rate_base_noise_level_root_psd() - generator.angular_rate_base_noise_level_psd().sqrt())
                .abs()
                < 1e-15
        );

        generator.reset().unwrap();
        assert_eq!(generator.angular_rate_base_noise_level(), 0.0);
        assert_eq!(generator.initial_angular_rate_average().norm(), 0.0);
    }

    #[test]
    fn test_time_interval_reaches_angular_rate_psd() {
        let generator = GyroscopeGenerator::new(GyroscopeStrategy::new());
        generator.set_config(testing::config()).unwrap();
        generator.set_time_interval(0.05).unwrap();
        assert!(generator.set_time_interval(0.0).is_err());
        assert_eq!(generator.with_strategy(|s| s.initial_angular_rate.time_interval()), 0.05);

        feed(&generator, &stream(76, &[STATIC_SAMPLES]));
        let noise = generator.angular_rate_base_noise_level();
        assert!(noise > 0.0);
        assert!((generator.angular_rate_base_noise_level_psd() - noise * noise * 0.05).abs() < 1e-15);
    }

    #[test]
    fn test_failing_sample_joins_initial_angular_rate() {
        const INITIAL: usize = 10;
        let mut config = testing::config();
        config.detector.initial_static_samples = INITIAL;
        config.detector.base_noise_level_absolute_threshold = f64::MIN_POSITIVE;
        let generator = GyroscopeGenerator::with_config(GyroscopeStrategy::new(), config).unwrap();

        let samples = stream(75, &[INITIAL]);
        feed(&generator, &samples);
        assert_eq!(generator.status(), DetectorStatus::Failed);

        let mean = samples.iter().map(|s| s.kinematics.angular_rate.x()).sum::<f64>() / INITIAL as f64;
        assert!((generator.initial_angular_rate_average().x() - mean).abs() < 1e-12);
    }

    #[test]
    fn test_motion_after_short_static_run_is_not_emitted() {
        let (generator, recorder) = generator();
        feed(
            &generator,
            &stream(73, &[STATIC_SAMPLES, DYNAMIC_SAMPLES, SHORT_STATIC_SAMPLES, DYNAMIC_SAMPLES, STATIC_SAMPLES]),
        );

        assert_eq!(recorder.count(EventType::StaticIntervalSkipped), 1);
        assert_eq!(recorder.count(EventType::DynamicIntervalDetected), 2);
        // Only the first motion had an admitted rest before it
        assert_eq!(recorder.measurements().len(), 1);
    }

    #[test]
    fn test_long_dynamic_run_is_skipped() {
        let (generator, recorder) = generator();
        let mut simulator = testing::simulator(74);
        feed(&generator, &simulator.static_run(STATIC_SAMPLES));
        feed(&generator, &simulator.dynamic_run(LONG_DYNAMIC_SAMPLES));

        assert_eq!(recorder.count(EventType::DynamicIntervalDetected), 1);
        assert_eq!(recorder.count(EventType::DynamicIntervalSkipped), 1);
        assert!(generator.is_dynamic_interval_skipped());
        assert_eq!(generator.with_strategy(|s| s.buffered_samples()), 0);

        feed(&generator, &simulator.static_run(STATIC_SAMPLES));
        assert_eq!(recorder.count(EventType::GeneratedMeasurement), 0);
        assert!(!generator.is_dynamic_interval_skipped());
    }
}
