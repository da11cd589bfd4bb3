// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Core module - measurement generation pipeline and its events

mod events;
mod generator;
mod guard;

pub use events::{EventRecorder, EventType, GeneratorEvent, GeneratorListener};
pub use generator::{default_config, MeasurementGenerator, MeasurementStrategy, RunPhase};
