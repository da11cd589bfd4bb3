// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Error types

use thiserror::Error;

/// Programmer errors raised synchronously by configuration mutators and by
/// `process`/`reset` calls made at the wrong time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalibrationError {
    /// A parameter was outside its valid range. State is left unchanged.
    #[error("invalid {name} = {value}: must be {constraint}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: String,
        /// Human readable constraint
        constraint: &'static str,
    },

    /// A mutation, `process` or `reset` was attempted while the generator was
    /// running, or a configuration change was attempted after the first sample
    /// of the current epoch.
    #[error("generator is locked")]
    Locked,
}

impl CalibrationError {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, constraint: &'static str) -> Self {
        CalibrationError::InvalidParameter {
            name,
            value: value.to_string(),
            constraint,
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, CalibrationError>;

/// Checks that a count is strictly greater than `min`.
pub(crate) fn ensure_count_above(name: &'static str, value: usize, min: usize, constraint: &'static str) -> Result<()> {
    if value > min {
        Ok(())
    } else {
        Err(CalibrationError::invalid(name, value, constraint))
    }
}

/// Checks that a real value is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CalibrationError::invalid(name, value, "greater than 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = CalibrationError::invalid("window_size", 2usize, "greater than 2");
        assert_eq!(err.to_string(), "invalid window_size = 2: must be greater than 2");
    }

    #[test]
    fn test_positive_bounds() {
        assert!(ensure_positive("x", f64::MIN_POSITIVE).is_ok());
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", -1.0).is_err());
        assert!(ensure_positive("x", f64::NAN).is_err());
        assert!(ensure_count_above("n", 2, 1, "greater than 1").is_ok());
        assert!(ensure_count_above("n", 1, 1, "greater than 1").is_err());
    }
}
