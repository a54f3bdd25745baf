//! Retry policies for operations that answer [DeviceError::Busy].
//!
//! The devices never block, it is up to the caller to decide how to wait.
use std::time::Duration;

use crate::error::DeviceError;

/// Retries `op` for as long as it reports `Busy`.
///
/// Any other error is returned straight away. Polling the PPU's `update` this way paces the
/// caller to the frame rate.
pub fn spin<T>(mut op: impl FnMut() -> Result<T, DeviceError>) -> Result<T, DeviceError> {
    loop {
        match op() {
            Err(DeviceError::Busy) => std::hint::spin_loop(),
            result => return result,
        }
    }
}

/// Like [spin], but gives up after `attempts` tries with the last `Busy`.
pub fn bounded<T>(attempts: usize, mut op: impl FnMut() -> Result<T, DeviceError>) -> Result<T, DeviceError> {
    let mut last = Err(DeviceError::Busy);
    for _ in 0..attempts {
        last = op();
        if !matches!(last, Err(DeviceError::Busy)) {
            break;
        }
    }
    last
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    /// `None` retries forever.
    pub attempts: Option<usize>,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            initial: Duration::from_micros(500),
            max: Duration::from_millis(4),
            attempts: None,
        }
    }
}

/// Retries `op` while `Busy`, sleeping between attempts. The sleep doubles every attempt up to
/// `policy.max`.
pub fn with_backoff<T>(policy: Backoff, mut op: impl FnMut() -> Result<T, DeviceError>) -> Result<T, DeviceError> {
    let mut delay = policy.initial;
    let mut attempt = 0;
    loop {
        let result = op();
        attempt += 1;
        match result {
            Err(DeviceError::Busy) if policy.attempts.map_or(true, |max| attempt < max) => {
                std::thread::sleep(delay);
                delay = (delay * 2).min(policy.max);
            }
            result => return result,
        }
    }
}
