use std::sync::Arc;

use crossbeam::channel::Sender;
use parking_lot::Mutex;

/// The audio output behind the APU. Receives each buffer as it becomes active.
pub trait AudioSink: Send {
    fn play(&mut self, samples: &[i8]);
}

/// Discards everything.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _samples: &[i8]) {}
}

/// Records every played buffer, clones share the recording.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    buffers: Arc<Mutex<Vec<Vec<i8>>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        CaptureSink::default()
    }

    pub fn played(&self) -> Vec<Vec<i8>> {
        self.buffers.lock().clone()
    }

    pub fn last(&self) -> Option<Vec<i8>> {
        self.buffers.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.buffers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AudioSink for CaptureSink {
    fn play(&mut self, samples: &[i8]) {
        self.buffers.lock().push(samples.to_vec());
    }
}

/// Forwards played buffers to another thread.
///
/// A disconnected receiver is not an error, the audio is dropped in that case.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Vec<i8>>,
}

impl ChannelSink {
    pub fn new(sender: Sender<Vec<i8>>) -> Self {
        ChannelSink { sender }
    }
}

impl AudioSink for ChannelSink {
    fn play(&mut self, samples: &[i8]) {
        if self.sender.try_send(samples.to_vec()).is_err() {
            log::trace!("Audio receiver gone or full, dropping {} samples", samples.len());
        }
    }
}
