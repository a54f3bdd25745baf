use std::cmp::Ordering;

use binary_heap_plus::{BinaryHeap, MinComparator};

/// Nanoseconds between two frame boundaries (60 Hz).
pub const FRAME_PERIOD_NS: u64 = 16_666_667;
/// Nanoseconds between two audio buffer boundaries, 512 samples at 32 kHz.
pub const AUDIO_PERIOD_NS: u64 = 16_000_000;

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub enum EventType {
    FrameBoundary = 0,
    AudioBoundary = 1,
}

#[derive(Debug, Copy, Clone, Eq)]
pub struct Event {
    /// Virtual time in nanoseconds.
    pub timestamp: u64,
    pub event_type: EventType,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    /// Events at the same timestamp are ordered by type, so runs are reproducible.
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.event_type.cmp(&other.event_type))
    }
}

#[derive(Debug)]
pub struct Scheduler {
    // Want the smallest timestamp first, so MinComparator
    event_queue: BinaryHeap<Event, MinComparator>,
    pub current_time: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            event_queue: BinaryHeap::with_capacity_min(8),
            current_time: 0,
        }
    }

    /// Returns the earliest event if its timestamp is at or below `until`, and moves the
    /// current time forward to that timestamp.
    #[inline]
    pub fn pop_until(&mut self, until: u64) -> Option<Event> {
        if self.event_queue.peek()?.timestamp > until {
            return None;
        }
        let event = self.event_queue.pop()?;
        self.current_time = self.current_time.max(event.timestamp);
        Some(event)
    }

    /// Add an event to the `Scheduler`.
    #[inline]
    pub fn push_event(&mut self, event_type: EventType, timestamp: u64) {
        self.event_queue.push(Event { timestamp, event_type });
    }

    #[inline]
    pub fn advance_to(&mut self, time: u64) {
        self.current_time = self.current_time.max(time);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::new()
    }
}
