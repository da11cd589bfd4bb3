// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! IMU stream simulator for demo/testing
//!
//! Produces alternating still and rotating periods of a rigid body carrying an
//! accelerometer, a gyroscope and a magnetometer. Streams are reproducible for
//! a given seed.

use nalgebra::{UnitQuaternion, Vector3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Normal, StandardNormal};

use super::{BodyKinematics, TimedBodyKinematics, TimedBodyKinematicsAndMagneticFluxDensity};
use crate::config::SimulationConfig;
use crate::error::{CalibrationError, Result};
use crate::units::MagneticFluxDensityTriad;

/// Simulates a noisy IMU alternating between rest and rotation
pub struct ImuSimulator {
    config: SimulationConfig,
    rng: ChaCha8Rng,
    accelerometer_noise: Normal<f64>,
    gyroscope_noise: Normal<f64>,
    magnetometer_noise: Normal<f64>,

    // Body to navigation frame
    attitude: UnitQuaternion<f64>,
    time: f64,
}

impl ImuSimulator {
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            accelerometer_noise: normal("accelerometer_noise", config.accelerometer_noise)?,
            gyroscope_noise: normal("gyroscope_noise", config.gyroscope_noise)?,
            magnetometer_noise: normal("magnetometer_noise", config.magnetometer_noise)?,
            attitude: UnitQuaternion::identity(),
            time: 0.0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Timestamp the next sample will carry
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Samples of the body held still at its current attitude
    pub fn static_run(&mut self, samples: usize) -> Vec<TimedBodyKinematicsAndMagneticFluxDensity> {
        (0..samples).map(|_| self.sample(Vector3::zeros())).collect()
    }

    /// Samples of the body rotating at the configured rate about a random
    /// axis orthogonal to gravity, so the sensed specific force always turns
    pub fn dynamic_run(&mut self, samples: usize) -> Vec<TimedBodyKinematicsAndMagneticFluxDensity> {
        let vertical = self.attitude.inverse() * Vector3::z();
        let axis = loop {
            let v = self.random_axis();
            let horizontal = v - vertical * v.dot(&vertical);
            let norm = horizontal.norm();
            if norm > 1e-3 {
                break horizontal / norm;
            }
        };
        let angular_rate = axis * self.config.rotation_rate;
        (0..samples).map(|_| self.sample(angular_rate)).collect()
    }

    /// Same as [`Self::static_run`] without the magnetometer
    pub fn static_kinematics(&mut self, samples: usize) -> Vec<TimedBodyKinematics> {
        self.static_run(samples).iter().map(|s| s.timed_kinematics()).collect()
    }

    /// Same as [`Self::dynamic_run`] without the magnetometer
    pub fn dynamic_kinematics(&mut self, samples: usize) -> Vec<TimedBodyKinematics> {
        self.dynamic_run(samples).iter().map(|s| s.timed_kinematics()).collect()
    }

    fn random_axis(&mut self) -> Vector3<f64> {
        loop {
            let v = Vector3::new(
                self.rng.sample::<f64, _>(StandardNormal),
                self.rng.sample::<f64, _>(StandardNormal),
                self.rng.sample::<f64, _>(StandardNormal),
            );
            let norm = v.norm();
            if norm > 1e-6 {
                return v / norm;
            }
        }
    }

    fn noise(&mut self, distribution: Normal<f64>) -> Vector3<f64> {
        Vector3::new(
            distribution.sample(&mut self.rng),
            distribution.sample(&mut self.rng),
            distribution.sample(&mut self.rng),
        )
    }

    fn sample(&mut self, angular_rate: Vector3<f64>) -> TimedBodyKinematicsAndMagneticFluxDensity {
        let dt = self.config.time_interval;
        let to_body = self.attitude.inverse();

        // At rest the accelerometer senses the reaction to gravity
        let specific_force = to_body * Vector3::new(0.0, 0.0, self.config.gravity)
            + self.noise(self.accelerometer_noise);
        let sensed_rate = angular_rate + self.noise(self.gyroscope_noise);
        let field = to_body * Vector3::from(self.config.magnetic_field) + self.noise(self.magnetometer_noise);

        let kinematics = BodyKinematics::from_base(specific_force.into(), sensed_rate.into());
        let sample = TimedBodyKinematicsAndMagneticFluxDensity::new(
            kinematics,
            MagneticFluxDensityTriad::from_base(field),
            self.time,
        );

        self.attitude *= UnitQuaternion::from_scaled_axis(angular_rate * dt);
        self.time += dt;
        sample
    }
}

fn normal(name: &'static str, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std_dev).map_err(|e| CalibrationError::invalid(name, e, "a valid standard deviation"))
}
