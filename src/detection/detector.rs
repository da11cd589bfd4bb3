// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Static/dynamic interval detector
//!
//! The detector first measures the sensor noise while the device is assumed
//! to be still, then classifies every sample by comparing the noise level of
//! a moving window against a threshold proportional to that base noise level.
//! The noise level of a set of triads is the norm of their per-axis standard
//! deviation, so a change of orientation registers even when the magnitude of
//! the sensed quantity does not change.

use tracing::{debug, info, warn};

use super::{DetectionFailure, DetectorStatus, DetectorStep, DetectorTransition};
use crate::analysis::{TriadStatistics, WindowedTriadStatistics};
use crate::config::DetectorConfig;
use crate::error::{ensure_count_above, ensure_positive, CalibrationError, Result};
use crate::units::{PhysicalUnit, Triad};

/// Classifies a stream of triads into static and dynamic intervals
#[derive(Debug, Clone)]
pub struct IntervalDetector<U: PhysicalUnit> {
    config: DetectorConfig,
    unit: U,
    status: DetectorStatus,
    processed_samples: usize,

    accumulated: TriadStatistics<U>,
    windowed: WindowedTriadStatistics<U>,
    max_instantaneous_noise_level: Option<f64>,

    base_noise_level: f64,
    threshold: f64,
    initial_average: Triad<U>,
    initial_standard_deviation: Triad<U>,
    failure: Option<DetectionFailure>,
}

impl<U: PhysicalUnit> IntervalDetector<U> {
    /// Detector working in the base unit of `U`
    pub fn new(config: DetectorConfig) -> Result<Self> {
        Self::with_unit(config, U::BASE)
    }

    /// Detector working in `unit`. Thresholds are interpreted in that unit.
    pub fn with_unit(config: DetectorConfig, unit: U) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config, unit))
    }

    /// Detector for a configuration the caller already validated
    pub(crate) fn from_validated(config: DetectorConfig, unit: U) -> Self {
        Self {
            config,
            unit,
            status: DetectorStatus::Idle,
            processed_samples: 0,
            accumulated: TriadStatistics::new(unit),
            windowed: WindowedTriadStatistics::allocate(config.window_size, unit),
            max_instantaneous_noise_level: None,
            base_noise_level: 0.0,
            threshold: 0.0,
            initial_average: Triad::from_vector(Default::default(), unit),
            initial_standard_deviation: Triad::from_vector(Default::default(), unit),
            failure: None,
        }
    }

    /// Feed one triad.
    ///
    /// Refused without any state change while failed.
    pub fn process(&mut self, triad: &Triad<U>) -> DetectorStep {
        if self.status == DetectorStatus::Failed {
            return DetectorStep {
                accepted: false,
                transition: None,
            };
        }

        self.processed_samples += 1;
        self.windowed.add(triad);

        let transition = match self.status {
            DetectorStatus::Idle => {
                self.status = DetectorStatus::Initializing;
                debug!("Interval detector initialization started");
                self.accumulate_initialization(triad);
                if self.processed_samples >= self.config.initial_static_samples {
                    self.complete_initialization()
                } else {
                    Some(DetectorTransition::InitializationStarted)
                }
            }
            DetectorStatus::Initializing => {
                self.accumulate_initialization(triad);
                if self.processed_samples >= self.config.initial_static_samples {
                    self.complete_initialization()
                } else {
                    None
                }
            }
            DetectorStatus::StaticInterval | DetectorStatus::DynamicInterval => self.classify(),
            DetectorStatus::Failed => None,
        };

        DetectorStep {
            accepted: true,
            transition,
        }
    }

    fn accumulate_initialization(&mut self, triad: &Triad<U>) {
        self.accumulated.add(triad);
        if self.windowed.is_full() {
            let level = self.windowed.noise_level();
            let max = self.max_instantaneous_noise_level.get_or_insert(level);
            if level > *max {
                *max = level;
            }
        }
    }

    fn complete_initialization(&mut self) -> Option<DetectorTransition> {
        self.base_noise_level = self.accumulated.noise_level();
        self.threshold = self.base_noise_level * self.config.threshold_factor;
        self.initial_average = self.accumulated.average();
        self.initial_standard_deviation = self.accumulated.standard_deviation();

        let absolute_limit = self.config.base_noise_level_absolute_threshold;
        let instantaneous = self
            .max_instantaneous_noise_level
            .unwrap_or_else(|| self.windowed.noise_level());
        let instantaneous_limit = self.base_noise_level * self.config.instantaneous_noise_level_factor;

        let failure = if self.base_noise_level > absolute_limit {
            Some(DetectionFailure::ExcessiveOverallNoise {
                base_noise_level: self.base_noise_level,
                limit: absolute_limit,
            })
        } else if instantaneous > instantaneous_limit {
            Some(DetectionFailure::SuddenExcessiveMovement {
                instantaneous_noise_level: instantaneous,
                limit: instantaneous_limit,
            })
        } else {
            None
        };

        match failure {
            Some(reason) => {
                warn!("Interval detector initialization failed: {}", reason);
                self.status = DetectorStatus::Failed;
                self.failure = Some(reason);
                Some(DetectorTransition::Failed(reason))
            }
            None => {
                info!(
                    "Interval detector initialized: base noise level {:e}, threshold {:e}",
                    self.base_noise_level, self.threshold
                );
                self.status = DetectorStatus::StaticInterval;
                Some(DetectorTransition::InitializationCompleted {
                    base_noise_level: self.base_noise_level,
                })
            }
        }
    }

    fn classify(&mut self) -> Option<DetectorTransition> {
        // Ties go to dynamic so borderline motion never pollutes a static run
        let next = if self.windowed.noise_level() < self.threshold {
            DetectorStatus::StaticInterval
        } else {
            DetectorStatus::DynamicInterval
        };

        if next == self.status {
            return None;
        }
        self.status = next;
        match next {
            DetectorStatus::StaticInterval => Some(DetectorTransition::StaticIntervalDetected),
            _ => Some(DetectorTransition::DynamicIntervalDetected),
        }
    }

    /// Return to idle, discarding every statistic. Returns whether anything
    /// changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.status != DetectorStatus::Idle || self.processed_samples != 0;
        self.status = DetectorStatus::Idle;
        self.processed_samples = 0;
        self.accumulated.reset();
        self.windowed.reset();
        self.max_instantaneous_noise_level = None;
        self.base_noise_level = 0.0;
        self.threshold = 0.0;
        self.initial_average = Triad::from_vector(Default::default(), self.unit);
        self.initial_standard_deviation = Triad::from_vector(Default::default(), self.unit);
        self.failure = None;
        changed
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.status == DetectorStatus::Idle {
            Ok(())
        } else {
            Err(CalibrationError::Locked)
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Replace the whole configuration. Only allowed while idle.
    pub fn set_config(&mut self, config: DetectorConfig) -> Result<()> {
        self.ensure_idle()?;
        config.validate()?;
        if config.window_size != self.windowed.window_size() {
            self.windowed = WindowedTriadStatistics::allocate(config.window_size, self.unit);
        }
        self.config = config;
        Ok(())
    }

    pub fn set_window_size(&mut self, window_size: usize) -> Result<()> {
        self.ensure_idle()?;
        ensure_count_above("window_size", window_size, 2, "greater than 2")?;
        self.set_config(DetectorConfig {
            window_size,
            ..self.config
        })
    }

    pub fn set_initial_static_samples(&mut self, samples: usize) -> Result<()> {
        self.ensure_idle()?;
        ensure_count_above("initial_static_samples", samples, 1, "greater than 1")?;
        self.config.initial_static_samples = samples;
        Ok(())
    }

    pub fn set_threshold_factor(&mut self, factor: f64) -> Result<()> {
        self.ensure_idle()?;
        ensure_positive("threshold_factor", factor)?;
        self.config.threshold_factor = factor;
        Ok(())
    }

    pub fn set_instantaneous_noise_level_factor(&mut self, factor: f64) -> Result<()> {
        self.ensure_idle()?;
        ensure_positive("instantaneous_noise_level_factor", factor)?;
        self.config.instantaneous_noise_level_factor = factor;
        Ok(())
    }

    pub fn set_base_noise_level_absolute_threshold(&mut self, threshold: f64) -> Result<()> {
        self.ensure_idle()?;
        ensure_positive("base_noise_level_absolute_threshold", threshold)?;
        self.config.base_noise_level_absolute_threshold = threshold;
        Ok(())
    }

    pub fn set_time_interval(&mut self, time_interval: f64) -> Result<()> {
        self.ensure_idle()?;
        ensure_positive("time_interval", time_interval)?;
        self.set_config(DetectorConfig {
            time_interval,
            ..self.config
        })
    }

    pub fn unit(&self) -> U {
        self.unit
    }

    pub fn status(&self) -> DetectorStatus {
        self.status
    }

    /// Reason of the last initialization failure, until reset
    pub fn failure(&self) -> Option<DetectionFailure> {
        self.failure
    }

    pub fn processed_samples(&self) -> usize {
        self.processed_samples
    }

    /// Noise level measured during initialization; zero before that
    pub fn base_noise_level(&self) -> f64 {
        self.base_noise_level
    }

    pub fn base_noise_level_psd(&self) -> f64 {
        self.base_noise_level * self.base_noise_level * self.config.time_interval
    }

    pub fn base_noise_level_root_psd(&self) -> f64 {
        self.base_noise_level_psd().sqrt()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Noise level of the current window
    pub fn instantaneous_noise_level(&self) -> f64 {
        self.windowed.noise_level()
    }

    pub fn instantaneous_average(&self) -> Triad<U> {
        self.windowed.average()
    }

    pub fn instantaneous_standard_deviation(&self) -> Triad<U> {
        self.windowed.standard_deviation()
    }

    /// Average over the initialization window
    pub fn initial_average(&self) -> Triad<U> {
        self.initial_average
    }

    pub fn initial_standard_deviation(&self) -> Triad<U> {
        self.initial_standard_deviation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{AccelerationTriad, AccelerationUnit};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rand_distr::{Distribution, Normal};

    const UNIT: AccelerationUnit = AccelerationUnit::MetersPerSquaredSecond;

    fn config() -> DetectorConfig {
        DetectorConfig {
            window_size: 20,
            initial_static_samples: 200,
            threshold_factor: 3.0,
            instantaneous_noise_level_factor: 3.0,
            base_noise_level_absolute_threshold: 1.0,
            time_interval: 0.01,
        }
    }

    struct Source {
        rng: ChaCha8Rng,
        noise: Normal<f64>,
    }

    impl Source {
        fn new(seed: u64) -> Self {
            Self {
                rng: ChaCha8Rng::seed_from_u64(seed),
                noise: Normal::new(0.0, 0.01).unwrap(),
            }
        }

        fn still(&mut self) -> AccelerationTriad {
            AccelerationTriad::new(
                self.noise.sample(&mut self.rng),
                self.noise.sample(&mut self.rng),
                9.81 + self.noise.sample(&mut self.rng),
                UNIT,
            )
        }

        fn shaking(&mut self, i: usize) -> AccelerationTriad {
            let swing = if i % 2 == 0 { 2.0 } else { -2.0 };
            AccelerationTriad::new(swing, -swing, 9.81, UNIT)
        }
    }

    fn initialize(detector: &mut IntervalDetector<AccelerationUnit>, source: &mut Source) -> Vec<DetectorTransition> {
        (0..detector.config().initial_static_samples)
            .filter_map(|_| detector.process(&source.still()).transition)
            .collect()
    }

    #[test]
    fn test_fresh_detector_is_idle() {
        let detector = IntervalDetector::<AccelerationUnit>::new(config()).unwrap();
        assert_eq!(detector.status(), DetectorStatus::Idle);
        assert_eq!(detector.base_noise_level(), 0.0);
        assert_eq!(detector.threshold(), 0.0);
        assert_eq!(detector.processed_samples(), 0);
        assert_eq!(detector.initial_average().norm(), 0.0);
        assert!(detector.failure().is_none());
    }

    #[test]
    fn test_initialization_then_classification() {
        let mut detector = IntervalDetector::new(config()).unwrap();
        let mut source = Source::new(3);

        let transitions = initialize(&mut detector, &mut source);
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0], DetectorTransition::InitializationStarted);
        assert!(matches!(
            transitions[1],
            DetectorTransition::InitializationCompleted { base_noise_level } if base_noise_level > 0.0
        ));
        assert_eq!(detector.status(), DetectorStatus::StaticInterval);

        // Three axes of 0.01 noise
        assert!((detector.base_noise_level() - 0.01 * 3f64.sqrt()).abs() < 0.003);
        assert!((detector.threshold() - 3.0 * detector.base_noise_level()).abs() < 1e-12);
        assert!((detector.initial_average().z() - 9.81).abs() < 0.005);
        assert!(
            (detector.base_noise_level_psd() - detector.base_noise_level().powi(2) * 0.01).abs() < 1e-15
        );

        let mut moved = Vec::new();
        for i in 0..50 {
            moved.extend(detector.process(&source.shaking(i)).transition);
        }
        assert_eq!(moved, vec![DetectorTransition::DynamicIntervalDetected]);
        assert_eq!(detector.status(), DetectorStatus::DynamicInterval);

        let mut settled = Vec::new();
        for _ in 0..100 {
            settled.extend(detector.process(&source.still()).transition);
        }
        assert_eq!(settled, vec![DetectorTransition::StaticIntervalDetected]);
        assert_eq!(detector.status(), DetectorStatus::StaticInterval);
    }

    #[test]
    fn test_excessive_noise_fails_and_sticks() {
        let mut cfg = config();
        cfg.base_noise_level_absolute_threshold = f64::MIN_POSITIVE;
        let mut detector = IntervalDetector::new(cfg).unwrap();
        let mut source = Source::new(5);

        let transitions = initialize(&mut detector, &mut source);
        assert!(matches!(
            transitions.last(),
            Some(DetectorTransition::Failed(DetectionFailure::ExcessiveOverallNoise { .. }))
        ));
        assert_eq!(detector.status(), DetectorStatus::Failed);

        let processed = detector.processed_samples();
        let step = detector.process(&source.still());
        assert!(!step.accepted);
        assert_eq!(detector.processed_samples(), processed);

        assert!(detector.reset());
        assert_eq!(detector.status(), DetectorStatus::Idle);
        assert!(detector.process(&source.still()).accepted);
    }

    #[test]
    fn test_sudden_movement_during_initialization() {
        let mut cfg = config();
        cfg.initial_static_samples = 1000;
        let mut detector = IntervalDetector::new(cfg).unwrap();
        let mut source = Source::new(8);

        let mut transitions = Vec::new();
        for i in 0..1000 {
            let triad = if (500..510).contains(&i) {
                source.shaking(i)
            } else {
                source.still()
            };
            transitions.extend(detector.process(&triad).transition);
        }
        assert!(matches!(
            transitions.last(),
            Some(DetectorTransition::Failed(DetectionFailure::SuddenExcessiveMovement { .. }))
        ));
        assert!(detector.failure().is_some());
    }

    #[test]
    fn test_config_locked_after_first_sample() {
        let mut detector = IntervalDetector::new(config()).unwrap();
        detector.set_window_size(30).unwrap();
        assert_eq!(detector.config().window_size, 30);

        detector.process(&Source::new(1).still());
        assert_eq!(detector.set_window_size(40), Err(CalibrationError::Locked));
        assert_eq!(detector.set_threshold_factor(1.0), Err(CalibrationError::Locked));

        detector.reset();
        detector.set_window_size(40).unwrap();
    }

    #[test]
    fn test_setter_validation() {
        let mut detector = IntervalDetector::<AccelerationUnit>::new(config()).unwrap();
        assert!(detector.set_window_size(2).is_err());
        assert!(detector.set_initial_static_samples(1).is_err());
        assert!(detector.set_threshold_factor(0.0).is_err());
        assert!(detector.set_instantaneous_noise_level_factor(-1.0).is_err());
        assert!(detector.set_base_noise_level_absolute_threshold(0.0).is_err());
        assert!(detector.set_time_interval(0.0).is_err());
        assert_eq!(*detector.config(), config());
    }

    #[test]
    fn test_detector_in_non_base_unit() {
        let mut cfg = config();
        cfg.base_noise_level_absolute_threshold = 0.1;
        let mut detector = IntervalDetector::with_unit(cfg, AccelerationUnit::G).unwrap();
        let mut source = Source::new(4);
        initialize(&mut detector, &mut source);

        assert_eq!(detector.status(), DetectorStatus::StaticInterval);
        assert_eq!(detector.initial_average().unit(), AccelerationUnit::G);
        assert!((detector.initial_average().z() - 9.81 / crate::units::STANDARD_GRAVITY).abs() < 1e-3);
    }
}
