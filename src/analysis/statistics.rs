// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Incremental statistics over unbounded histories and fixed windows
//!
//! Unbounded accumulators use Welford's update so that long static runs never
//! lose precision to sum-of-squares cancellation. Windowed accumulators keep
//! the raw samples in a [`RingBuffer`] and recompute their statistics over the
//! buffer contents on every addition.
//!
//! All variances are population variances. Power spectral density is
//! `variance * time_interval` and root PSD is its square root.

use nalgebra::Vector3;

use super::RingBuffer;
use crate::error::{ensure_count_above, ensure_positive, Result};
use crate::units::{PhysicalUnit, Triad};

/// Default sampling interval in seconds (50 Hz)
pub const DEFAULT_TIME_INTERVAL: f64 = 0.02;

/// Online mean/variance of a scalar signal
#[derive(Debug, Clone, PartialEq)]
pub struct RunningStatistics {
    count: usize,
    mean: f64,
    m2: f64,
    time_interval: f64,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            time_interval: DEFAULT_TIME_INTERVAL,
        }
    }

    pub fn with_time_interval(time_interval: f64) -> Result<Self> {
        let mut stats = Self::new();
        stats.set_time_interval(time_interval)?;
        Ok(stats)
    }

    pub fn time_interval(&self) -> f64 {
        self.time_interval
    }

    pub fn set_time_interval(&mut self, time_interval: f64) -> Result<()> {
        ensure_positive("time_interval", time_interval)?;
        self.time_interval = time_interval;
        Ok(())
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Clear all accumulated state. Returns whether anything was cleared.
    pub fn reset(&mut self) -> bool {
        let changed = self.count != 0;
        self.count = 0;
        self.mean = 0.0;
        self.m2 = 0.0;
        changed
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn psd(&self) -> f64 {
        self.variance() * self.time_interval
    }

    pub fn root_psd(&self) -> f64 {
        self.psd().sqrt()
    }
}

impl Default for RunningStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean/variance over the last `window_size` values of a scalar signal
#[derive(Debug, Clone)]
pub struct WindowedStatistics {
    window: RingBuffer<f64>,
    mean: f64,
    variance: f64,
    time_interval: f64,
}

impl WindowedStatistics {
    pub fn new(window_size: usize) -> Result<Self> {
        ensure_count_above("window_size", window_size, 0, "greater than 0")?;
        Ok(Self {
            window: RingBuffer::new(window_size),
            mean: 0.0,
            variance: 0.0,
            time_interval: DEFAULT_TIME_INTERVAL,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    pub fn time_interval(&self) -> f64 {
        self.time_interval
    }

    pub fn set_time_interval(&mut self, time_interval: f64) -> Result<()> {
        ensure_positive("time_interval", time_interval)?;
        self.time_interval = time_interval;
        Ok(())
    }

    /// Add a value, evicting the oldest one once the window is full
    pub fn add(&mut self, value: f64) {
        self.window.push(value);
        self.recompute();
    }

    fn recompute(&mut self) {
        let n = self.window.len() as f64;
        if n == 0.0 {
            self.mean = 0.0;
            self.variance = 0.0;
            return;
        }
        self.mean = self.window.iter().sum::<f64>() / n;
        let mean = self.mean;
        self.variance = self.window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    }

    pub fn reset(&mut self) -> bool {
        let changed = !self.window.is_empty();
        self.window.clear();
        self.mean = 0.0;
        self.variance = 0.0;
        changed
    }

    /// Number of values currently held
    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn is_full(&self) -> bool {
        self.window.is_full()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn standard_deviation(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn psd(&self) -> f64 {
        self.variance * self.time_interval
    }

    pub fn root_psd(&self) -> f64 {
        self.psd().sqrt()
    }
}

/// Per-axis online mean/variance of a triad signal.
///
/// The noise level of a triad is the norm of its per-axis standard deviation,
/// so its PSD is the sum of the axis variances times the time interval.
#[derive(Debug, Clone, PartialEq)]
pub struct TriadStatistics<U: PhysicalUnit> {
    count: usize,
    mean: Vector3<f64>,
    m2: Vector3<f64>,
    unit: U,
    time_interval: f64,
}

impl<U: PhysicalUnit> TriadStatistics<U> {
    /// Accumulator reporting in `unit`; added triads are converted to it
    pub fn new(unit: U) -> Self {
        Self {
            count: 0,
            mean: Vector3::zeros(),
            m2: Vector3::zeros(),
            unit,
            time_interval: DEFAULT_TIME_INTERVAL,
        }
    }

    pub fn time_interval(&self) -> f64 {
        self.time_interval
    }

    pub fn set_time_interval(&mut self, time_interval: f64) -> Result<()> {
        ensure_positive("time_interval", time_interval)?;
        self.time_interval = time_interval;
        Ok(())
    }

    pub fn add(&mut self, triad: &Triad<U>) {
        let value = *triad.to_unit(self.unit).as_vector();
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta.component_mul(&(value - self.mean));
    }

    pub fn reset(&mut self) -> bool {
        let changed = self.count != 0;
        self.count = 0;
        self.mean = Vector3::zeros();
        self.m2 = Vector3::zeros();
        changed
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn average(&self) -> Triad<U> {
        Triad::from_vector(self.mean, self.unit)
    }

    /// Per-axis population variance
    pub fn variance(&self) -> Vector3<f64> {
        if self.count == 0 {
            Vector3::zeros()
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Per-axis standard deviation
    pub fn standard_deviation(&self) -> Triad<U> {
        Triad::from_vector(self.variance().map(f64::sqrt), self.unit)
    }

    /// Norm of the per-axis standard deviation
    pub fn noise_level(&self) -> f64 {
        self.variance().sum().sqrt()
    }

    pub fn psd(&self) -> f64 {
        self.variance().sum() * self.time_interval
    }

    pub fn root_psd(&self) -> f64 {
        self.psd().sqrt()
    }
}

/// Per-axis mean/variance over the last `window_size` triads
#[derive(Debug, Clone)]
pub struct WindowedTriadStatistics<U: PhysicalUnit> {
    window: RingBuffer<[f64; 3]>,
    mean: Vector3<f64>,
    variance: Vector3<f64>,
    unit: U,
    time_interval: f64,
}

impl<U: PhysicalUnit> WindowedTriadStatistics<U> {
    pub fn new(window_size: usize, unit: U) -> Result<Self> {
        ensure_count_above("window_size", window_size, 0, "greater than 0")?;
        Ok(Self::allocate(window_size, unit))
    }

    /// Window for a size the caller already validated
    pub(crate) fn allocate(window_size: usize, unit: U) -> Self {
        Self {
            window: RingBuffer::new(window_size),
            mean: Vector3::zeros(),
            variance: Vector3::zeros(),
            unit,
            time_interval: DEFAULT_TIME_INTERVAL,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    pub fn time_interval(&self) -> f64 {
        self.time_interval
    }

    pub fn set_time_interval(&mut self, time_interval: f64) -> Result<()> {
        ensure_positive("time_interval", time_interval)?;
        self.time_interval = time_interval;
        Ok(())
    }

    pub fn add(&mut self, triad: &Triad<U>) {
        self.window.push(triad.to_unit(self.unit).to_array());
        self.recompute();
    }

    fn recompute(&mut self) {
        let n = self.window.len() as f64;
        if n == 0.0 {
            self.mean = Vector3::zeros();
            self.variance = Vector3::zeros();
            return;
        }
        let sum = self
            .window
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + Vector3::from(v));
        self.mean = sum / n;
        let mean = self.mean;
        let squares = self.window.iter().fold(Vector3::zeros(), |acc, v| {
            let d = Vector3::from(v) - mean;
            acc + d.component_mul(&d)
        });
        self.variance = squares / n;
    }

    pub fn reset(&mut self) -> bool {
        let changed = !self.window.is_empty();
        self.window.clear();
        self.mean = Vector3::zeros();
        self.variance = Vector3::zeros();
        changed
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn is_full(&self) -> bool {
        self.window.is_full()
    }

    pub fn average(&self) -> Triad<U> {
        Triad::from_vector(self.mean, self.unit)
    }

    pub fn variance(&self) -> Vector3<f64> {
        self.variance
    }

    pub fn standard_deviation(&self) -> Triad<U> {
        Triad::from_vector(self.variance.map(f64::sqrt), self.unit)
    }

    /// Norm of the per-axis standard deviation over the window
    pub fn noise_level(&self) -> f64 {
        self.variance.sum().sqrt()
    }

    pub fn psd(&self) -> f64 {
        self.variance.sum() * self.time_interval
    }

    pub fn root_psd(&self) -> f64 {
        self.psd().sqrt()
    }
}
