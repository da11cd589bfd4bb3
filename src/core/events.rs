// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Generator events and listeners
//!
//! Events are collected while a sample is being processed and delivered to
//! the listener afterwards, still inside the call and with the generator
//! marked as running. Listeners may read any getter of the generator they
//! receive; every mutation attempted from a listener fails with
//! [`CalibrationError::Locked`](crate::error::CalibrationError::Locked).

use parking_lot::Mutex;

use super::{MeasurementGenerator, MeasurementStrategy};
use crate::detection::DetectionFailure;

/// Event types emitted by a generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    InitializationStarted,
    InitializationCompleted,
    Error,
    StaticIntervalDetected,
    DynamicIntervalDetected,
    StaticIntervalSkipped,
    DynamicIntervalSkipped,
    GeneratedMeasurement,
    Reset,
}

/// Event with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorEvent<M> {
    InitializationStarted,
    InitializationCompleted { base_noise_level: f64 },
    Error(DetectionFailure),
    StaticIntervalDetected,
    DynamicIntervalDetected,
    StaticIntervalSkipped,
    DynamicIntervalSkipped,
    GeneratedMeasurement(M),
    Reset,
}

impl<M> GeneratorEvent<M> {
    pub fn event_type(&self) -> EventType {
        match self {
            GeneratorEvent::InitializationStarted => EventType::InitializationStarted,
            GeneratorEvent::InitializationCompleted { .. } => EventType::InitializationCompleted,
            GeneratorEvent::Error(_) => EventType::Error,
            GeneratorEvent::StaticIntervalDetected => EventType::StaticIntervalDetected,
            GeneratorEvent::DynamicIntervalDetected => EventType::DynamicIntervalDetected,
            GeneratorEvent::StaticIntervalSkipped => EventType::StaticIntervalSkipped,
            GeneratorEvent::DynamicIntervalSkipped => EventType::DynamicIntervalSkipped,
            GeneratorEvent::GeneratedMeasurement(_) => EventType::GeneratedMeasurement,
            GeneratorEvent::Reset => EventType::Reset,
        }
    }
}

/// Receives generator events. Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait GeneratorListener<S: MeasurementStrategy>: Send + Sync {
    fn on_initialization_started(&self, generator: &MeasurementGenerator<S>) {}

    fn on_initialization_completed(&self, generator: &MeasurementGenerator<S>, base_noise_level: f64) {}

    fn on_error(&self, generator: &MeasurementGenerator<S>, reason: DetectionFailure) {}

    fn on_static_interval_detected(&self, generator: &MeasurementGenerator<S>) {}

    fn on_dynamic_interval_detected(&self, generator: &MeasurementGenerator<S>) {}

    fn on_static_interval_skipped(&self, generator: &MeasurementGenerator<S>) {}

    fn on_dynamic_interval_skipped(&self, generator: &MeasurementGenerator<S>) {}

    /// Ownership of the measurement passes to the listener
    fn on_generated_measurement(&self, generator: &MeasurementGenerator<S>, measurement: S::Measurement) {}

    fn on_reset(&self, generator: &MeasurementGenerator<S>) {}
}

pub(crate) fn dispatch<S: MeasurementStrategy>(
    listener: &dyn GeneratorListener<S>,
    generator: &MeasurementGenerator<S>,
    event: GeneratorEvent<S::Measurement>,
) {
    match event {
        GeneratorEvent::InitializationStarted => listener.on_initialization_started(generator),
        GeneratorEvent::InitializationCompleted { base_noise_level } => {
            listener.on_initialization_completed(generator, base_noise_level)
        }
        GeneratorEvent::Error(reason) => listener.on_error(generator, reason),
        GeneratorEvent::StaticIntervalDetected => listener.on_static_interval_detected(generator),
        GeneratorEvent::DynamicIntervalDetected => listener.on_dynamic_interval_detected(generator),
        GeneratorEvent::StaticIntervalSkipped => listener.on_static_interval_skipped(generator),
        GeneratorEvent::DynamicIntervalSkipped => listener.on_dynamic_interval_skipped(generator),
        GeneratorEvent::GeneratedMeasurement(measurement) => {
            listener.on_generated_measurement(generator, measurement)
        }
        GeneratorEvent::Reset => listener.on_reset(generator),
    }
}

/// Listener queueing every event for later draining
pub struct EventRecorder<M> {
    events: Mutex<Vec<GeneratorEvent<M>>>,
}

impl<M> EventRecorder<M> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, event: GeneratorEvent<M>) {
        self.events.lock().push(event);
    }

    /// Remove and return every queued event, oldest first
    pub fn drain(&self) -> Vec<GeneratorEvent<M>> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Number of queued events of the given type
    pub fn count(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    pub fn event_types(&self) -> Vec<EventType> {
        self.events.lock().iter().map(GeneratorEvent::event_type).collect()
    }
}

impl<M: Clone> EventRecorder<M> {
    /// Copy of the queued events
    pub fn events(&self) -> Vec<GeneratorEvent<M>> {
        self.events.lock().clone()
    }

    /// Copy of the queued measurements
    pub fn measurements(&self) -> Vec<M> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                GeneratorEvent::GeneratedMeasurement(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<M> Default for EventRecorder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MeasurementStrategy> GeneratorListener<S> for EventRecorder<S::Measurement> {
    fn on_initialization_started(&self, _generator: &MeasurementGenerator<S>) {
        self.record(GeneratorEvent::InitializationStarted);
    }

    fn on_initialization_completed(&self, _generator: &MeasurementGenerator<S>, base_noise_level: f64) {
        self.record(GeneratorEvent::InitializationCompleted { base_noise_level });
    }

    fn on_error(&self, _generator: &MeasurementGenerator<S>, reason: DetectionFailure) {
        self.record(GeneratorEvent::Error(reason));
    }

    fn on_static_interval_detected(&self, _generator: &MeasurementGenerator<S>) {
        self.record(GeneratorEvent::StaticIntervalDetected);
    }

    fn on_dynamic_interval_detected(&self, _generator: &MeasurementGenerator<S>) {
        self.record(GeneratorEvent::DynamicIntervalDetected);
    }

    fn on_static_interval_skipped(&self, _generator: &MeasurementGenerator<S>) {
        self.record(GeneratorEvent::StaticIntervalSkipped);
    }

    fn on_dynamic_interval_skipped(&self, _generator: &MeasurementGenerator<S>) {
        self.record(GeneratorEvent::DynamicIntervalSkipped);
    }

    fn on_generated_measurement(&self, _generator: &MeasurementGenerator<S>, measurement: S::Measurement) {
        self.record(GeneratorEvent::GeneratedMeasurement(measurement));
    }

    fn on_reset(&self, _generator: &MeasurementGenerator<S>) {
        self.record(GeneratorEvent::Reset);
    }
}
