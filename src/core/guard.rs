// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Running guard

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{CalibrationError, Result};

/// Holds the running flag for its lifetime and clears it on drop, including
/// on early returns and unwinding.
pub(crate) struct RunningGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunningGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| CalibrationError::Locked)?;
        Ok(Self { flag })
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_locked() {
        let flag = AtomicBool::new(false);
        let guard = RunningGuard::acquire(&flag).unwrap();
        assert!(flag.load(Ordering::SeqCst));
        assert!(matches!(RunningGuard::acquire(&flag), Err(CalibrationError::Locked)));
        drop(guard);
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_released_on_early_return() {
        fn work(flag: &AtomicBool, fail: bool) -> Result<()> {
            let _guard = RunningGuard::acquire(flag)?;
            if fail {
                return Err(CalibrationError::Locked);
            }
            Ok(())
        }

        let flag = AtomicBool::new(false);
        assert!(work(&flag, true).is_err());
        assert!(!flag.load(Ordering::SeqCst));
        assert!(work(&flag, false).is_ok());
    }
}
