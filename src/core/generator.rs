// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Measurement generator pipeline
//!
//! [`MeasurementGenerator`] drives an [`IntervalDetector`] with the specific
//! force of every sample, tracks the run currently open, applies the
//! admission policy (static runs shorter than `min_static_samples` and
//! dynamic runs longer than `max_dynamic_samples` are skipped) and lets a
//! [`MeasurementStrategy`] turn admitted runs into measurements.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::events::{dispatch, GeneratorEvent, GeneratorListener};
use super::guard::RunningGuard;
use crate::analysis::TriadStatistics;
use crate::config::{DetectorConfig, GeneratorConfig};
use crate::detection::{DetectionFailure, DetectorStatus, DetectorTransition, IntervalDetector};
use crate::error::{ensure_count_above, CalibrationError, Result};
use crate::units::{AccelerationTriad, AccelerationUnit};

/// Which run a processed sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Consumed by detector initialization (also the first static run)
    Initialization,
    /// Part of a static run
    Static,
    /// Part of a dynamic run
    Dynamic,
}

/// Sensor specific part of a generator: what to collect and what to emit
pub trait MeasurementStrategy: Send + 'static {
    /// Input sample
    type Sample: Send + Sync;
    /// Emitted artifact
    type Measurement: Clone + Debug + Send + Sync + 'static;

    /// Name used in logs
    const NAME: &'static str;

    /// Default tolerance on the base noise level of the specific force (m/s²)
    const DEFAULT_BASE_NOISE_LEVEL_ABSOLUTE_THRESHOLD: f64;

    /// Triad fed to the interval detector
    fn specific_force(sample: &Self::Sample) -> AccelerationTriad;

    fn timestamp(sample: &Self::Sample) -> f64;

    /// Called once per accepted sample, after any run boundary it caused
    fn on_sample(&mut self, _sample: &Self::Sample, _phase: RunPhase) {}

    /// A static run just ended. `run` holds its specific force statistics.
    fn on_static_run_finished(
        &mut self,
        run: &TriadStatistics<AccelerationUnit>,
        admitted: bool,
    ) -> Option<Self::Measurement>;

    /// A dynamic run just ended. `settled` is the windowed specific force
    /// average that confirmed the return to rest; `admitted` is false if the
    /// run was skipped.
    fn on_dynamic_run_finished(
        &mut self,
        _settled: &AccelerationTriad,
        _admitted: bool,
    ) -> Option<Self::Measurement> {
        None
    }

    /// The open dynamic run exceeded its maximum length
    fn on_dynamic_run_skipped(&mut self) {}

    /// Sampling interval change. Strategy statistics start at
    /// [`DEFAULT_TIME_INTERVAL`](crate::analysis::DEFAULT_TIME_INTERVAL), the default detector interval.
    fn set_time_interval(&mut self, _time_interval: f64) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self);
}

/// Generator default configuration for a strategy
pub fn default_config<S: MeasurementStrategy>() -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.detector.base_noise_level_absolute_threshold = S::DEFAULT_BASE_NOISE_LEVEL_ABSOLUTE_THRESHOLD;
    config
}

struct GeneratorState<S: MeasurementStrategy> {
    min_static_samples: usize,
    max_dynamic_samples: usize,
    detector: IntervalDetector<AccelerationUnit>,

    static_run: TriadStatistics<AccelerationUnit>,
    processed_static_samples: usize,
    processed_dynamic_samples: usize,
    static_interval_skipped: bool,
    dynamic_interval_skipped: bool,
    last_timestamp: Option<f64>,

    strategy: S,
    listener: Option<Arc<dyn GeneratorListener<S>>>,
    events: Vec<GeneratorEvent<S::Measurement>>,
}

impl<S: MeasurementStrategy> GeneratorState<S> {
    fn process(&mut self, sample: &S::Sample) -> bool {
        if self.detector.status() == DetectorStatus::Failed {
            return false;
        }

        let timestamp = S::timestamp(sample);
        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                warn!("{} sample out of order: {} s after {} s", S::NAME, timestamp, last);
            }
        }
        self.last_timestamp = Some(timestamp);

        let triad = S::specific_force(sample).to_base();
        let previous = self.detector.status();
        let step = self.detector.process(&triad);
        if !step.accepted {
            return false;
        }

        match step.transition {
            Some(DetectorTransition::InitializationStarted) => {
                self.events.push(GeneratorEvent::InitializationStarted);
            }
            Some(DetectorTransition::InitializationCompleted { base_noise_level }) => {
                self.events.push(GeneratorEvent::InitializationCompleted { base_noise_level });
                self.events.push(GeneratorEvent::StaticIntervalDetected);
            }
            Some(DetectorTransition::Failed(reason)) => {
                self.events.push(GeneratorEvent::Error(reason));
            }
            Some(DetectorTransition::DynamicIntervalDetected) => self.finish_static_run(),
            Some(DetectorTransition::StaticIntervalDetected) => self.finish_dynamic_run(),
            None => {}
        }

        let phase = match (previous, self.detector.status()) {
            (DetectorStatus::Idle | DetectorStatus::Initializing, _) => RunPhase::Initialization,
            (_, DetectorStatus::DynamicInterval) => RunPhase::Dynamic,
            _ => RunPhase::Static,
        };

        match phase {
            RunPhase::Initialization | RunPhase::Static => {
                self.processed_static_samples += 1;
                self.static_run.add(&triad);
            }
            RunPhase::Dynamic => self.processed_dynamic_samples += 1,
        }
        self.strategy.on_sample(sample, phase);

        if phase == RunPhase::Dynamic
            && !self.dynamic_interval_skipped
            && self.processed_dynamic_samples > self.max_dynamic_samples
        {
            debug!(
                "{} dynamic interval skipped after {} samples",
                S::NAME,
                self.processed_dynamic_samples
            );
            self.dynamic_interval_skipped = true;
            self.strategy.on_dynamic_run_skipped();
            self.events.push(GeneratorEvent::DynamicIntervalSkipped);
        }

        true
    }

    fn finish_static_run(&mut self) {
        debug!(
            "{} dynamic interval detected after {} static samples",
            S::NAME,
            self.processed_static_samples
        );
        self.events.push(GeneratorEvent::DynamicIntervalDetected);

        let admitted = self.processed_static_samples >= self.min_static_samples;
        self.static_interval_skipped = !admitted;
        self.dynamic_interval_skipped = false;
        if !admitted {
            debug!(
                "{} static interval skipped: {} < {} samples",
                S::NAME,
                self.processed_static_samples,
                self.min_static_samples
            );
            self.events.push(GeneratorEvent::StaticIntervalSkipped);
        }

        if let Some(measurement) = self.strategy.on_static_run_finished(&self.static_run, admitted) {
            debug!("{} measurement generated: {:?}", S::NAME, measurement);
            self.events.push(GeneratorEvent::GeneratedMeasurement(measurement));
        }

        self.static_run.reset();
        self.processed_static_samples = 0;
        self.processed_dynamic_samples = 0;
    }

    fn finish_dynamic_run(&mut self) {
        debug!(
            "{} static interval detected after {} dynamic samples",
            S::NAME,
            self.processed_dynamic_samples
        );
        self.events.push(GeneratorEvent::StaticIntervalDetected);

        let admitted = !self.dynamic_interval_skipped;
        let settled = self.detector.instantaneous_average();
        if let Some(measurement) = self.strategy.on_dynamic_run_finished(&settled, admitted) {
            debug!("{} measurement generated: {:?}", S::NAME, measurement);
            self.events.push(GeneratorEvent::GeneratedMeasurement(measurement));
        }

        self.static_interval_skipped = false;
        self.dynamic_interval_skipped = false;
        self.static_run.reset();
        self.processed_static_samples = 0;
        self.processed_dynamic_samples = 0;
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.static_run.reset();
        self.processed_static_samples = 0;
        self.processed_dynamic_samples = 0;
        self.static_interval_skipped = false;
        self.dynamic_interval_skipped = false;
        self.last_timestamp = None;
        self.strategy.reset();
        self.events.clear();
    }
}

/// Streaming static/dynamic run detector emitting calibration measurements.
///
/// Calls are serialized by a running flag: `process`, `reset` and every
/// setter fail with [`CalibrationError::Locked`] while another call (or a
/// listener invoked by it) is in progress. Configuration can only change
/// before the first sample after construction or reset.
pub struct MeasurementGenerator<S: MeasurementStrategy> {
    state: Mutex<GeneratorState<S>>,
    running: AtomicBool,
}

impl<S: MeasurementStrategy> MeasurementGenerator<S> {
    /// Generator using the strategy's default configuration
    pub fn new(strategy: S) -> Self {
        let config = default_config::<S>();
        let unit = AccelerationUnit::MetersPerSquaredSecond;

        Self {
            state: Mutex::new(GeneratorState {
                min_static_samples: config.min_static_samples,
                max_dynamic_samples: config.max_dynamic_samples,
                detector: IntervalDetector::from_validated(config.detector, unit),
                static_run: TriadStatistics::new(unit),
                processed_static_samples: 0,
                processed_dynamic_samples: 0,
                static_interval_skipped: false,
                dynamic_interval_skipped: false,
                last_timestamp: None,
                strategy,
                listener: None,
                events: Vec::new(),
            }),
            running: AtomicBool::new(false),
        }
    }

    pub fn with_config(strategy: S, config: GeneratorConfig) -> Result<Self> {
        let generator = Self::new(strategy);
        generator.set_config(config)?;
        Ok(generator)
    }

    pub fn with_listener(self, listener: Arc<dyn GeneratorListener<S>>) -> Self {
        self.state.lock().listener = Some(listener);
        self
    }

    /// Process one sample.
    ///
    /// Returns `Ok(false)` without touching any state if the detector failed
    /// during initialization; call [`Self::reset`] to start over.
    pub fn process(&self, sample: &S::Sample) -> Result<bool> {
        let _guard = RunningGuard::acquire(&self.running)?;

        let (accepted, events, listener) = {
            let mut state = self.state.lock();
            let accepted = state.process(sample);
            let events = std::mem::take(&mut state.events);
            (accepted, events, state.listener.clone())
        };

        self.notify(listener, events);
        Ok(accepted)
    }

    /// Discard every statistic and run, returning to idle
    pub fn reset(&self) -> Result<()> {
        let _guard = RunningGuard::acquire(&self.running)?;

        let listener = {
            let mut state = self.state.lock();
            state.reset();
            state.listener.clone()
        };
        info!("{} measurement generator reset", S::NAME);

        self.notify(listener, vec![GeneratorEvent::Reset]);
        Ok(())
    }

    fn notify(
        &self,
        listener: Option<Arc<dyn GeneratorListener<S>>>,
        events: Vec<GeneratorEvent<S::Measurement>>,
    ) {
        if let Some(listener) = listener {
            for event in events {
                dispatch(listener.as_ref(), self, event);
            }
        }
    }

    /// Apply a configuration change if not running and still idle
    fn configure<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut GeneratorState<S>) -> Result<()>,
    {
        if self.running.load(Ordering::Acquire) {
            return Err(CalibrationError::Locked);
        }
        let mut state = self.state.lock();
        if state.detector.status() != DetectorStatus::Idle {
            return Err(CalibrationError::Locked);
        }
        apply(&mut state)
    }

    fn configure_detector<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut DetectorConfig),
    {
        self.configure(|state| {
            let mut config = *state.detector.config();
            apply(&mut config);
            state.detector.set_config(config)?;
            state.strategy.set_time_interval(config.time_interval)
        })
    }

    pub fn set_config(&self, config: GeneratorConfig) -> Result<()> {
        self.configure(|state| {
            config.validate()?;
            state.detector.set_config(config.detector)?;
            state.strategy.set_time_interval(config.detector.time_interval)?;
            state.min_static_samples = config.min_static_samples;
            state.max_dynamic_samples = config.max_dynamic_samples;
            Ok(())
        })
    }

    pub fn set_min_static_samples(&self, samples: usize) -> Result<()> {
        self.configure(|state| {
            ensure_count_above("min_static_samples", samples, 1, "greater than 1")?;
            state.min_static_samples = samples;
            Ok(())
        })
    }

    pub fn set_max_dynamic_samples(&self, samples: usize) -> Result<()> {
        self.configure(|state| {
            ensure_count_above("max_dynamic_samples", samples, 1, "greater than 1")?;
            state.max_dynamic_samples = samples;
            Ok(())
        })
    }

    pub fn set_window_size(&self, window_size: usize) -> Result<()> {
        self.configure_detector(|c| c.window_size = window_size)
    }

    pub fn set_initial_static_samples(&self, samples: usize) -> Result<()> {
        self.configure_detector(|c| c.initial_static_samples = samples)
    }

    pub fn set_threshold_factor(&self, factor: f64) -> Result<()> {
        self.configure_detector(|c| c.threshold_factor = factor)
    }

    pub fn set_instantaneous_noise_level_factor(&self, factor: f64) -> Result<()> {
        self.configure_detector(|c| c.instantaneous_noise_level_factor = factor)
    }

    pub fn set_base_noise_level_absolute_threshold(&self, threshold: f64) -> Result<()> {
        self.configure_detector(|c| c.base_noise_level_absolute_threshold = threshold)
    }

    pub fn set_time_interval(&self, time_interval: f64) -> Result<()> {
        self.configure_detector(|c| c.time_interval = time_interval)
    }

    /// Replace or remove the listener. Allowed at any time except while running.
    pub fn set_listener(&self, listener: Option<Arc<dyn GeneratorListener<S>>>) -> Result<()> {
        if self.running.load(Ordering::Acquire) {
            return Err(CalibrationError::Locked);
        }
        self.state.lock().listener = listener;
        Ok(())
    }

    pub fn listener(&self) -> Option<Arc<dyn GeneratorListener<S>>> {
        self.state.lock().listener.clone()
    }

    pub fn config(&self) -> GeneratorConfig {
        let state = self.state.lock();
        GeneratorConfig {
            min_static_samples: state.min_static_samples,
            max_dynamic_samples: state.max_dynamic_samples,
            detector: *state.detector.config(),
        }
    }

    pub fn min_static_samples(&self) -> usize {
        self.state.lock().min_static_samples
    }

    pub fn max_dynamic_samples(&self) -> usize {
        self.state.lock().max_dynamic_samples
    }

    pub fn window_size(&self) -> usize {
        self.state.lock().detector.config().window_size
    }

    pub fn initial_static_samples(&self) -> usize {
        self.state.lock().detector.config().initial_static_samples
    }

    pub fn threshold_factor(&self) -> f64 {
        self.state.lock().detector.config().threshold_factor
    }

    pub fn instantaneous_noise_level_factor(&self) -> f64 {
        self.state.lock().detector.config().instantaneous_noise_level_factor
    }

    pub fn base_noise_level_absolute_threshold(&self) -> f64 {
        self.state.lock().detector.config().base_noise_level_absolute_threshold
    }

    pub fn time_interval(&self) -> f64 {
        self.state.lock().detector.config().time_interval
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn status(&self) -> DetectorStatus {
        self.state.lock().detector.status()
    }

    /// Reason of the initialization failure, until reset
    pub fn failure(&self) -> Option<DetectionFailure> {
        self.state.lock().detector.failure()
    }

    /// Length of the static run currently open
    pub fn processed_static_samples(&self) -> usize {
        self.state.lock().processed_static_samples
    }

    /// Length of the dynamic run currently open
    pub fn processed_dynamic_samples(&self) -> usize {
        self.state.lock().processed_dynamic_samples
    }

    /// Whether the static run that ended last was too short
    pub fn is_static_interval_skipped(&self) -> bool {
        self.state.lock().static_interval_skipped
    }

    /// Whether the open dynamic run grew too long
    pub fn is_dynamic_interval_skipped(&self) -> bool {
        self.state.lock().dynamic_interval_skipped
    }

    /// Specific force noise level measured during initialization (m/s²)
    pub fn base_noise_level(&self) -> f64 {
        self.state.lock().detector.base_noise_level()
    }

    pub fn base_noise_level_psd(&self) -> f64 {
        self.state.lock().detector.base_noise_level_psd()
    }

    pub fn base_noise_level_root_psd(&self) -> f64 {
        self.state.lock().detector.base_noise_level_root_psd()
    }

    /// Classification threshold (m/s²)
    pub fn threshold(&self) -> f64 {
        self.state.lock().detector.threshold()
    }

    /// Windowed specific force noise level of the latest sample (m/s²)
    pub fn instantaneous_noise_level(&self) -> f64 {
        self.state.lock().detector.instantaneous_noise_level()
    }

    /// Specific force average over the initialization window
    pub fn initial_specific_force_average(&self) -> AccelerationTriad {
        self.state.lock().detector.initial_average()
    }

    pub fn initial_specific_force_standard_deviation(&self) -> AccelerationTriad {
        self.state.lock().detector.initial_standard_deviation()
    }

    /// Read strategy specific state
    pub fn with_strategy<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        read(&self.state.lock().strategy)
    }
}

impl<S: MeasurementStrategy + Default> Default for MeasurementGenerator<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
