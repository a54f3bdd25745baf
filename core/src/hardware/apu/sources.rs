use crate::hardware::apu::{SampleSource, APU_BUF_MAX};

/// One period of a sine wave with the given amplitude, `[-127, 127]` at most.
pub fn sine_table(len: usize, amplitude: i8) -> Vec<i8> {
    let amplitude = amplitude.saturating_abs() as f64;
    (0..len)
        .map(|i| {
            let phase = i as f64 / len as f64 * std::f64::consts::PI * 2.0;
            (phase.sin() * amplitude).round() as i8
        })
        .collect()
}

/// Plays a sample table over and over again.
#[derive(Debug, Clone)]
pub struct LoopingSource {
    samples: Vec<i8>,
    position: usize,
}

impl LoopingSource {
    pub fn new(samples: Vec<i8>) -> Self {
        LoopingSource { samples, position: 0 }
    }
}

impl SampleSource for LoopingSource {
    fn fill(&mut self, buffer: &mut [i8]) -> usize {
        if self.samples.is_empty() {
            return 0;
        }
        for sample in buffer.iter_mut() {
            *sample = self.samples[self.position];
            self.position = (self.position + 1) % self.samples.len();
        }
        buffer.len()
    }
}

/// Plays a sample once each time it is triggered, silence otherwise.
#[derive(Debug, Clone, Default)]
pub struct OneShotSource {
    samples: Vec<i8>,
    position: Option<usize>,
}

impl OneShotSource {
    pub fn new(samples: Vec<i8>) -> Self {
        OneShotSource { samples, position: None }
    }

    /// Restarts playback from the first sample.
    pub fn trigger(&mut self) {
        self.position = Some(0);
    }

    pub fn is_playing(&self) -> bool {
        self.position.is_some()
    }
}

impl SampleSource for OneShotSource {
    fn fill(&mut self, buffer: &mut [i8]) -> usize {
        let position = match self.position {
            Some(position) => position,
            None => return 0,
        };
        let remaining = &self.samples[position..];
        let count = remaining.len().min(buffer.len()).min(APU_BUF_MAX);
        buffer[..count].copy_from_slice(&remaining[..count]);

        let next = position + count;
        self.position = if next >= self.samples.len() { None } else { Some(next) };
        count
    }
}
