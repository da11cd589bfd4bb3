// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! imucal - Streaming IMU Calibration Preprocessing
//!
//! Runs a simulated IMU through a measurement generator and reports the
//! calibration artifacts it produces.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use imucal::core::{GeneratorListener, MeasurementGenerator, MeasurementStrategy};
use imucal::detection::DetectionFailure;
use imucal::generators::{AccelerometerStrategy, GyroscopeStrategy, MagnetometerStrategy};
use imucal::sensors::{ImuSimulator, TimedBodyKinematicsAndMagneticFluxDensity};
use imucal::{Config, VERSION};

/// Sensor whose measurements are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sensor {
    Accelerometer,
    Gyroscope,
    Magnetometer,
}

/// imucal - Streaming IMU Calibration Preprocessing
#[derive(Parser, Debug)]
#[command(name = "imucal")]
#[command(author = "bad-antics")]
#[command(version = VERSION)]
#[command(about = "Static/dynamic interval detection and calibration measurement generation")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sensor to generate measurements for
    #[arg(short, long, value_enum, default_value = "accelerometer")]
    sensor: Sensor,

    /// Number of rest/motion cycles to simulate
    #[arg(long, default_value = "5")]
    cycles: usize,

    /// Simulator seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; the configured level replaces the default once loaded
    let cli_level = if args.trace {
        Some("trace")
    } else if args.debug {
        Some("debug")
    } else {
        None
    };

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(cli_level.unwrap_or("info")))
        .with_filter_reloading();
    let filter = builder.reload_handle();
    tracing::subscriber::set_global_default(builder.finish())?;

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_create(&config_path)?;

    if cli_level.is_none() {
        match EnvFilter::try_new(&config.log_level) {
            Ok(level) => filter.reload(level)?,
            Err(e) => warn!("Ignoring log level {:?}: {}", config.log_level, e),
        }
    }

    info!("imucal v{} - Streaming IMU Calibration Preprocessing", VERSION);
    info!("Configuration loaded from {:?}", config_path);

    let samples = simulate(&config, args.cycles, args.seed)?;
    info!("Simulated {} samples over {} cycles", samples.len(), args.cycles);

    match args.sensor {
        Sensor::Accelerometer => run(AccelerometerStrategy::new(), &config, &samples, |s| s.timed_kinematics()),
        Sensor::Gyroscope => run(GyroscopeStrategy::new(), &config, &samples, |s| s.timed_kinematics()),
        Sensor::Magnetometer => run(MagnetometerStrategy::new(), &config, &samples, |s| *s),
    }
}

/// Rest long enough to initialize and be admitted, then `cycles` motions
/// each followed by rest
fn simulate(config: &Config, cycles: usize, seed: u64) -> Result<Vec<TimedBodyKinematicsAndMagneticFluxDensity>> {
    let mut simulator = ImuSimulator::new(config.simulation, seed)?;
    let rest = config.simulation.static_samples;
    let motion = config.simulation.dynamic_samples;

    let mut samples = simulator.static_run(config.generator.detector.initial_static_samples + rest);
    for _ in 0..cycles {
        samples.extend(simulator.dynamic_run(motion));
        samples.extend(simulator.static_run(rest));
    }
    Ok(samples)
}

fn run<S, F>(
    strategy: S,
    config: &Config,
    samples: &[TimedBodyKinematicsAndMagneticFluxDensity],
    convert: F,
) -> Result<()>
where
    S: MeasurementStrategy,
    F: Fn(&TimedBodyKinematicsAndMagneticFluxDensity) -> S::Sample,
{
    let listener = Arc::new(LoggingListener::default());
    let generator = MeasurementGenerator::with_config(strategy, config.generator)?.with_listener(listener.clone());

    let mut refused = 0;
    for sample in samples {
        if !generator.process(&convert(sample))? {
            refused += 1;
        }
    }
    if refused > 0 {
        warn!("{} samples refused after a detection failure", refused);
    }

    info!("{} summary:", S::NAME);
    info!("   Status: {:?}", generator.status());
    info!(
        "   Base noise level: {:e} (PSD {:e}, root PSD {:e})",
        generator.base_noise_level(),
        generator.base_noise_level_psd(),
        generator.base_noise_level_root_psd()
    );
    info!("   Threshold: {:e}", generator.threshold());
    info!("   Measurements: {}", listener.measurements.load(Ordering::Relaxed));
    info!(
        "   Skipped: {} static, {} dynamic",
        listener.skipped_static.load(Ordering::Relaxed),
        listener.skipped_dynamic.load(Ordering::Relaxed)
    );
    if let Some(reason) = generator.failure() {
        warn!("   Initialization failed: {}", reason);
    }

    Ok(())
}

/// Logs generator events and counts the outcomes
#[derive(Default)]
struct LoggingListener {
    measurements: AtomicUsize,
    skipped_static: AtomicUsize,
    skipped_dynamic: AtomicUsize,
}

impl<S: MeasurementStrategy> GeneratorListener<S> for LoggingListener {
    fn on_initialization_started(&self, _generator: &MeasurementGenerator<S>) {
        info!("{} initialization started, keep the device still", S::NAME);
    }

    fn on_initialization_completed(&self, generator: &MeasurementGenerator<S>, base_noise_level: f64) {
        info!(
            "{} initialized: base noise level {:e}, threshold {:e}",
            S::NAME,
            base_noise_level,
            generator.threshold()
        );
    }

    fn on_error(&self, _generator: &MeasurementGenerator<S>, reason: DetectionFailure) {
        warn!("{} initialization failed: {}", S::NAME, reason);
    }

    fn on_static_interval_detected(&self, _generator: &MeasurementGenerator<S>) {
        debug!("{} at rest", S::NAME);
    }

    fn on_dynamic_interval_detected(&self, generator: &MeasurementGenerator<S>) {
        debug!(
            "{} moving, windowed noise level {:e}",
            S::NAME,
            generator.instantaneous_noise_level()
        );
    }

    fn on_static_interval_skipped(&self, _generator: &MeasurementGenerator<S>) {
        self.skipped_static.fetch_add(1, Ordering::Relaxed);
        info!("{} rest period too short, skipped", S::NAME);
    }

    fn on_dynamic_interval_skipped(&self, _generator: &MeasurementGenerator<S>) {
        self.skipped_dynamic.fetch_add(1, Ordering::Relaxed);
        info!("{} motion too long, skipped", S::NAME);
    }

    fn on_generated_measurement(&self, _generator: &MeasurementGenerator<S>, measurement: S::Measurement) {
        let count = self.measurements.fetch_add(1, Ordering::Relaxed) + 1;
        info!("{} measurement #{}", S::NAME, count);
        debug!("{:?}", measurement);
    }

    fn on_reset(&self, _generator: &MeasurementGenerator<S>) {
        info!("{} generator reset", S::NAME);
    }
}
