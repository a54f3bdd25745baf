use std::time::Duration;

use crate::scheduler::{AUDIO_PERIOD_NS, FRAME_PERIOD_NS};

pub use crate::console::{Console, ConsoleRunner};
pub use crate::error::{AssetError, DeviceError};
pub use crate::hardware::lock::OwnerId;
pub use crate::io::controller::{Buttons, Controller, ControllerState};

/// Logs and aborts on an invalid argument. These are caller bugs, never runtime conditions.
macro_rules! invalid_argument {
    ($($arg:tt)+) => {{
        let message = format!($($arg)+);
        log::error!("{}", message);
        panic!("{}", message)
    }};
}

pub mod assets;
pub mod console;
pub mod error;
pub mod hardware;
pub mod io;
pub mod retry;
pub mod scheduler;

/// Struct for wrapping all the various options for the `Console`
#[derive(Debug, Copy, Clone)]
pub struct ConsoleOptions {
    pub frame_period: Duration,
    pub audio_period: Duration,
}

#[derive(Debug)]
pub struct ConsoleOptionsBuilder {
    frame_period: Duration,
    audio_period: Duration,
}

impl ConsoleOptionsBuilder {
    pub fn new() -> Self {
        ConsoleOptionsBuilder {
            frame_period: Duration::from_nanos(FRAME_PERIOD_NS),
            audio_period: Duration::from_nanos(AUDIO_PERIOD_NS),
        }
    }

    /// Time between two PPU frame boundaries, 1/60th of a second by default.
    pub fn frame_period(mut self, period: Duration) -> Self {
        self.frame_period = period;
        self
    }

    /// Time between two APU buffer boundaries, 16 ms by default.
    pub fn audio_period(mut self, period: Duration) -> Self {
        self.audio_period = period;
        self
    }

    pub fn build(self) -> ConsoleOptions {
        if self.frame_period.as_nanos() == 0 || self.audio_period.as_nanos() == 0 {
            invalid_argument!(
                "Clock periods must be non-zero, got {:?} and {:?}",
                self.frame_period,
                self.audio_period
            );
        }
        ConsoleOptions {
            frame_period: self.frame_period,
            audio_period: self.audio_period,
        }
    }
}

impl Default for ConsoleOptionsBuilder {
    fn default() -> Self {
        ConsoleOptionsBuilder::new()
    }
}
