// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Physical units and unit-tagged triads
//!
//! A [`Triad`] stores three components of one physical quantity together with
//! the unit they are expressed in. Conversions are explicit: nothing is ever
//! converted behind the caller's back, and the interval detector only sees
//! triads already brought to the base unit of their quantity.

use std::fmt::{self, Debug};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Standard gravity in m/s², used for the `g` acceleration unit
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// A unit of some physical quantity
pub trait PhysicalUnit: Copy + PartialEq + Debug + Send + Sync + 'static {
    /// SI (or SI-derived) unit of the quantity
    const BASE: Self;

    /// Factor converting a value in this unit into the base unit
    fn to_base_factor(self) -> f64;

    /// Short printable symbol
    fn symbol(self) -> &'static str;

    /// Convert a scalar from `self` to `target`
    fn convert(self, value: f64, target: Self) -> f64 {
        if self == target {
            value
        } else {
            value * self.to_base_factor() / target.to_base_factor()
        }
    }
}

/// Specific force / acceleration units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccelerationUnit {
    MetersPerSquaredSecond,
    G,
    FeetPerSquaredSecond,
}

impl PhysicalUnit for AccelerationUnit {
    const BASE: Self = AccelerationUnit::MetersPerSquaredSecond;

    fn to_base_factor(self) -> f64 {
        match self {
            AccelerationUnit::MetersPerSquaredSecond => 1.0,
            AccelerationUnit::G => STANDARD_GRAVITY,
            AccelerationUnit::FeetPerSquaredSecond => 0.3048,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            AccelerationUnit::MetersPerSquaredSecond => "m/s²",
            AccelerationUnit::G => "g",
            AccelerationUnit::FeetPerSquaredSecond => "ft/s²",
        }
    }
}

/// Angular rate units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AngularSpeedUnit {
    RadiansPerSecond,
    DegreesPerSecond,
}

impl PhysicalUnit for AngularSpeedUnit {
    const BASE: Self = AngularSpeedUnit::RadiansPerSecond;

    fn to_base_factor(self) -> f64 {
        match self {
            AngularSpeedUnit::RadiansPerSecond => 1.0,
            AngularSpeedUnit::DegreesPerSecond => std::f64::consts::PI / 180.0,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            AngularSpeedUnit::RadiansPerSecond => "rad/s",
            AngularSpeedUnit::DegreesPerSecond => "°/s",
        }
    }
}

/// Magnetic flux density units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MagneticFluxDensityUnit {
    Tesla,
    Microtesla,
    Nanotesla,
    Gauss,
}

impl PhysicalUnit for MagneticFluxDensityUnit {
    const BASE: Self = MagneticFluxDensityUnit::Tesla;

    fn to_base_factor(self) -> f64 {
        match self {
            MagneticFluxDensityUnit::Tesla => 1.0,
            MagneticFluxDensityUnit::Microtesla => 1e-6,
            MagneticFluxDensityUnit::Nanotesla => 1e-9,
            MagneticFluxDensityUnit::Gauss => 1e-4,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            MagneticFluxDensityUnit::Tesla => "T",
            MagneticFluxDensityUnit::Microtesla => "µT",
            MagneticFluxDensityUnit::Nanotesla => "nT",
            MagneticFluxDensityUnit::Gauss => "G",
        }
    }
}

/// Three components of one physical quantity in a single unit
#[derive(Clone, Copy, PartialEq)]
pub struct Triad<U: PhysicalUnit> {
    values: Vector3<f64>,
    unit: U,
}

/// Specific force triad
pub type AccelerationTriad = Triad<AccelerationUnit>;
/// Angular rate triad
pub type AngularSpeedTriad = Triad<AngularSpeedUnit>;
/// Magnetic flux density triad
pub type MagneticFluxDensityTriad = Triad<MagneticFluxDensityUnit>;

impl<U: PhysicalUnit> Triad<U> {
    pub fn new(x: f64, y: f64, z: f64, unit: U) -> Self {
        Self {
            values: Vector3::new(x, y, z),
            unit,
        }
    }

    /// Triad with values in the base unit
    pub fn from_base(values: Vector3<f64>) -> Self {
        Self { values, unit: U::BASE }
    }

    pub fn from_vector(values: Vector3<f64>, unit: U) -> Self {
        Self { values, unit }
    }

    /// All-zero triad in the base unit
    pub fn zero() -> Self {
        Self::from_base(Vector3::zeros())
    }

    pub fn x(&self) -> f64 {
        self.values.x
    }

    pub fn y(&self) -> f64 {
        self.values.y
    }

    pub fn z(&self) -> f64 {
        self.values.z
    }

    pub fn unit(&self) -> U {
        self.unit
    }

    pub fn as_vector(&self) -> &Vector3<f64> {
        &self.values
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.values.x, self.values.y, self.values.z]
    }

    /// Euclidean norm, in this triad's unit
    pub fn norm(&self) -> f64 {
        self.values.norm()
    }

    /// Copy of this triad expressed in `target`
    pub fn to_unit(&self, target: U) -> Self {
        if self.unit == target {
            return *self;
        }
        let factor = self.unit.to_base_factor() / target.to_base_factor();
        Self {
            values: self.values * factor,
            unit: target,
        }
    }

    /// Copy of this triad expressed in the base unit
    pub fn to_base(&self) -> Self {
        self.to_unit(U::BASE)
    }

    /// Overwrite this triad with the values and unit of `other`
    pub fn copy_from(&mut self, other: &Self) {
        self.values = other.values;
        self.unit = other.unit;
    }
}

impl<U: PhysicalUnit> Default for Triad<U> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<U: PhysicalUnit> Debug for Triad<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.6}) {}",
            self.values.x,
            self.values.y,
            self.values.z,
            self.unit.symbol()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceleration_conversion() {
        let triad = AccelerationTriad::new(1.0, 0.0, -1.0, AccelerationUnit::G);
        let base = triad.to_base();
        assert_eq!(base.unit(), AccelerationUnit::MetersPerSquaredSecond);
        assert!((base.x() - STANDARD_GRAVITY).abs() < 1e-12);
        assert!((base.z() + STANDARD_GRAVITY).abs() < 1e-12);

        let back = base.to_unit(AccelerationUnit::G);
        assert!((back.x() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_angular_speed_conversion() {
        let triad = AngularSpeedTriad::new(180.0, 90.0, 0.0, AngularSpeedUnit::DegreesPerSecond);
        let base = triad.to_base();
        assert!((base.x() - std::f64::consts::PI).abs() < 1e-12);
        assert!((base.y() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_flux_scalar_conversion() {
        let gauss = MagneticFluxDensityUnit::Microtesla.convert(50.0, MagneticFluxDensityUnit::Gauss);
        assert!((gauss - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_norm_and_copy() {
        let a = AccelerationTriad::new(3.0, 4.0, 0.0, AccelerationUnit::MetersPerSquaredSecond);
        assert!((a.norm() - 5.0).abs() < 1e-12);

        let mut b = AccelerationTriad::zero();
        b.copy_from(&a);
        assert_eq!(a, b);
        assert_eq!(AccelerationTriad::default().norm(), 0.0);
    }
}
