//! The audio processing unit.
//!
//! Playback is double-buffered: while one buffer of [APU_BUF_MAX] samples is playing, the
//! owner's [SampleSource] fills the next one. Every buffer boundary (16 ms at 32 kHz) the
//! queued buffer becomes the active one and the source is asked for the next buffer.
//!
//! The source runs on the console clock's thread, much like an interrupt handler. It should
//! return quickly and never block. State shared between the source and the rest of the
//! program can be protected by masking the refill with [ApuSession::callback_disable].
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::DeviceError;
use crate::hardware::apu::sink::{AudioSink, NullSink};
use crate::hardware::lock::{DeviceLock, OwnerId};

pub mod sink;
pub mod sources;

/// Samples per buffer.
pub const APU_BUF_MAX: usize = 512;
/// Samples per second.
pub const APU_SAMPLE_RATE: u32 = 32000;

/// Produces audio for the APU.
///
/// `fill` writes up to `buffer.len()` samples and returns how many it wrote. Anything after
/// that count is played as silence, so returning `0` silences the whole buffer. Counts
/// larger than the buffer are clamped.
pub trait SampleSource: Send {
    fn fill(&mut self, buffer: &mut [i8]) -> usize;
}

impl<F> SampleSource for F
where
    F: FnMut(&mut [i8]) -> usize + Send,
{
    fn fill(&mut self, buffer: &mut [i8]) -> usize {
        self(buffer)
    }
}

struct ApuState {
    lock: DeviceLock,
    sink: Box<dyn AudioSink>,
    /// The next buffer to be played, `None` when there is nothing to play.
    queued: Option<Vec<i8>>,
    /// Whether a buffer is playing until the next boundary.
    playing: bool,
    /// Set when the owner disabled the APU while a buffer was still playing.
    draining: Option<OwnerId>,
    /// A refill fell due while the callback was masked.
    refill_pending: bool,
    boundaries: u64,
}

/// What asked for a refill.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Refill {
    /// Priming on enable, or a buffer boundary.
    Scheduled,
    /// Unmasking, only runs if a refill is still outstanding.
    Deferred,
}

struct ApuShared {
    state: Mutex<ApuState>,
    /// Held for the duration of a refill.
    source: Mutex<Option<Box<dyn SampleSource>>>,
    masked: AtomicBool,
}

/// Handle to the (simulated) APU device. Cloning yields another handle to the same device.
#[derive(Clone)]
pub struct Apu {
    shared: Arc<ApuShared>,
}

impl Apu {
    /// An APU whose output goes nowhere.
    pub fn new() -> Self {
        Apu::with_sink(NullSink)
    }

    pub fn with_sink(sink: impl AudioSink + 'static) -> Self {
        Apu {
            shared: Arc::new(ApuShared {
                state: Mutex::new(ApuState {
                    lock: DeviceLock::new(),
                    sink: Box::new(sink),
                    queued: None,
                    playing: false,
                    draining: None,
                    refill_pending: false,
                    boundaries: 0,
                }),
                source: Mutex::new(None),
                masked: AtomicBool::new(false),
            }),
        }
    }

    /// Locks the APU to `owner` and starts streaming from `source`.
    ///
    /// The first buffer is requested from `source` before this returns. Fails with
    /// [DeviceError::OwnershipConflict] while the APU is owned, which includes the time a
    /// previous owner's last buffer is still playing.
    pub fn enable(&self, owner: OwnerId, source: impl SampleSource + 'static) -> Result<ApuSession, DeviceError> {
        self.shared.state.lock().lock.acquire(owner)?;
        *self.shared.source.lock() = Some(Box::new(source));
        self.shared.masked.store(false, Ordering::SeqCst);
        log::debug!("APU enabled by {}", owner);

        self.refill(Refill::Scheduled);

        Ok(ApuSession {
            apu: self.clone(),
            owner,
        })
    }

    /// Called every 16 ms by the console clock.
    pub fn buffer_boundary(&self) {
        let needs_refill = {
            let mut state = self.shared.state.lock();
            state.boundaries += 1;

            match state.queued.take() {
                Some(buffer) => {
                    state.sink.play(&buffer);
                    state.playing = true;
                }
                None => state.playing = false,
            }

            // The previous owner's last buffer finished playing.
            if let Some(owner) = state.draining.take() {
                state.lock.release(owner);
                log::debug!("APU released by {} after draining", owner);
            }

            #[cfg(feature = "apu-logging")]
            log::trace!("Buffer boundary {}, playing: {}", state.boundaries, state.playing);
            state.lock.is_locked()
        };

        if needs_refill {
            self.refill(Refill::Scheduled);
        }
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.shared.state.lock().lock.owner()
    }

    /// Whether a buffer is playing until the next boundary.
    pub fn is_playing(&self) -> bool {
        self.shared.state.lock().playing
    }

    /// A copy of the buffer which plays after the next boundary.
    pub fn queued_buffer(&self) -> Option<Vec<i8>> {
        self.shared.state.lock().queued.clone()
    }

    pub fn refill_pending(&self) -> bool {
        self.shared.state.lock().refill_pending
    }

    /// Asks the source for the next buffer, or defers the request while masked.
    ///
    /// A deferred refill is checked for while holding the source, so a boundary that got
    /// there first satisfies it and the source is not asked twice for the same buffer.
    fn refill(&self, reason: Refill) {
        let mut guard = self.shared.source.lock();
        let source = match guard.as_mut() {
            Some(source) => source,
            None => return,
        };
        if reason == Refill::Deferred && !self.shared.state.lock().refill_pending {
            return;
        }

        if self.shared.masked.load(Ordering::SeqCst) {
            let mut state = self.shared.state.lock();
            state.queued = Some(vec![0; APU_BUF_MAX]);
            state.refill_pending = true;
            return;
        }

        let mut buffer = vec![0i8; APU_BUF_MAX];
        let count = source.fill(&mut buffer).min(APU_BUF_MAX);
        // Never replay whatever the source left past its count.
        buffer[count..].iter_mut().for_each(|sample| *sample = 0);

        #[cfg(feature = "apu-logging")]
        log::trace!("Refilled {} samples", count);

        let mut state = self.shared.state.lock();
        state.queued = Some(buffer);
        state.refill_pending = false;
    }

    fn release(&self, owner: OwnerId) {
        // Waits for an in-flight refill, the source is gone afterwards.
        let source = self.shared.source.lock().take();
        drop(source);
        self.shared.masked.store(false, Ordering::SeqCst);

        let mut state = self.shared.state.lock();
        if state.lock.owner() != Some(owner) {
            log::warn!("{} tried to release an APU held by {:?}", owner, state.lock.owner());
            return;
        }
        state.queued = None;
        state.refill_pending = false;
        if state.playing {
            state.draining = Some(owner);
            log::debug!("APU disabled by {}, releasing after the active buffer", owner);
        } else {
            state.lock.release(owner);
            log::debug!("APU released by {}", owner);
        }
    }
}

impl Default for Apu {
    fn default() -> Self {
        Apu::new()
    }
}

impl fmt::Debug for Apu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Apu")
            .field("owner", &state.lock.owner())
            .field("playing", &state.playing)
            .field("boundaries", &state.boundaries)
            .finish()
    }
}

/// Exclusive access to the APU.
///
/// Released by [ApuSession::disable], or when dropped.
#[derive(Debug)]
pub struct ApuSession {
    apu: Apu,
    owner: OwnerId,
}

impl ApuSession {
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Stops requesting audio. The queued buffer is discarded and the source dropped.
    ///
    /// The lock is held until the currently playing buffer finishes.
    pub fn disable(self) {
        // Drop does the work.
    }

    /// Masks the refill callback.
    ///
    /// Returns once any refill in progress has finished, after which the source is not
    /// called until [ApuSession::callback_enable]. A refill falling due in the meantime
    /// leaves the queued buffer silent and runs once unmasked.
    pub fn callback_disable(&self) {
        self.apu.shared.masked.store(true, Ordering::SeqCst);
        // The refill holds the source for its whole duration.
        drop(self.apu.shared.source.lock());
    }

    /// Unmasks the refill callback, running a deferred refill on the calling thread.
    pub fn callback_enable(&self) {
        self.apu.shared.masked.store(false, Ordering::SeqCst);
        self.apu.refill(Refill::Deferred);
    }

    /// [ApuSession::callback_disable] until the returned guard is dropped.
    pub fn mask_callback(&self) -> CallbackMask<'_> {
        self.callback_disable();
        CallbackMask { session: self }
    }
}

impl Drop for ApuSession {
    fn drop(&mut self) {
        self.apu.release(self.owner);
    }
}

/// Keeps the refill callback masked while alive.
#[derive(Debug)]
pub struct CallbackMask<'a> {
    session: &'a ApuSession,
}

impl Drop for CallbackMask<'_> {
    fn drop(&mut self) {
        self.session.callback_enable();
    }
}
