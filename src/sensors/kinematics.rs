// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Inertial sample types

use crate::units::{
    AccelerationTriad, AccelerationUnit, AngularSpeedTriad, AngularSpeedUnit, MagneticFluxDensityTriad,
};

/// Specific force and angular rate sensed at one instant in body frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyKinematics {
    pub specific_force: AccelerationTriad,
    pub angular_rate: AngularSpeedTriad,
}

impl BodyKinematics {
    pub fn new(specific_force: AccelerationTriad, angular_rate: AngularSpeedTriad) -> Self {
        Self {
            specific_force,
            angular_rate,
        }
    }

    /// Build from raw components in m/s² and rad/s
    pub fn from_base(f: [f64; 3], w: [f64; 3]) -> Self {
        Self {
            specific_force: AccelerationTriad::new(f[0], f[1], f[2], AccelerationUnit::MetersPerSquaredSecond),
            angular_rate: AngularSpeedTriad::new(w[0], w[1], w[2], AngularSpeedUnit::RadiansPerSecond),
        }
    }
}

/// Body kinematics with the time they were sampled at
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimedBodyKinematics {
    pub kinematics: BodyKinematics,
    /// Seconds since an arbitrary origin; non-decreasing along a stream
    pub timestamp_seconds: f64,
}

impl TimedBodyKinematics {
    pub fn new(kinematics: BodyKinematics, timestamp_seconds: f64) -> Self {
        Self {
            kinematics,
            timestamp_seconds,
        }
    }

    pub fn specific_force(&self) -> &AccelerationTriad {
        &self.kinematics.specific_force
    }

    pub fn angular_rate(&self) -> &AngularSpeedTriad {
        &self.kinematics.angular_rate
    }
}

/// Timed body kinematics co-located with a magnetometer reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimedBodyKinematicsAndMagneticFluxDensity {
    pub kinematics: BodyKinematics,
    pub magnetic_flux_density: MagneticFluxDensityTriad,
    pub timestamp_seconds: f64,
}

impl TimedBodyKinematicsAndMagneticFluxDensity {
    pub fn new(
        kinematics: BodyKinematics,
        magnetic_flux_density: MagneticFluxDensityTriad,
        timestamp_seconds: f64,
    ) -> Self {
        Self {
            kinematics,
            magnetic_flux_density,
            timestamp_seconds,
        }
    }

    pub fn specific_force(&self) -> &AccelerationTriad {
        &self.kinematics.specific_force
    }

    /// Drop the magnetometer reading
    pub fn timed_kinematics(&self) -> TimedBodyKinematics {
        TimedBodyKinematics::new(self.kinematics, self.timestamp_seconds)
    }
}
