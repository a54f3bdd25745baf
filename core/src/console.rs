use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, select, tick, Sender};
use log::*;

use crate::hardware::apu::sink::AudioSink;
use crate::hardware::apu::Apu;
use crate::hardware::ppu::Ppu;
use crate::io::controller::Controller;
use crate::scheduler::{EventType, Scheduler};
use crate::ConsoleOptions;

/// The simulated console: the three devices plus the clock which drives their boundaries.
///
/// Time is virtual. Nothing happens unless [Console::advance] is called, either directly
/// (deterministic, what the tests use) or by a [ConsoleRunner] in real time.
#[derive(Debug)]
pub struct Console {
    ppu: Ppu,
    apu: Apu,
    controller: Controller,
    scheduler: Scheduler,
    frame_period: u64,
    audio_period: u64,
}

impl Console {
    pub fn new(options: ConsoleOptions) -> Self {
        Console::with_apu(options, Apu::new())
    }

    pub fn with_sink(options: ConsoleOptions, sink: impl AudioSink + 'static) -> Self {
        Console::with_apu(options, Apu::with_sink(sink))
    }

    fn with_apu(options: ConsoleOptions, apu: Apu) -> Self {
        let frame_period = duration_ns(options.frame_period);
        let audio_period = duration_ns(options.audio_period);
        let mut scheduler = Scheduler::new();
        scheduler.push_event(EventType::FrameBoundary, frame_period);
        scheduler.push_event(EventType::AudioBoundary, audio_period);

        Console {
            ppu: Ppu::new(),
            apu,
            controller: Controller::new(),
            scheduler,
            frame_period,
            audio_period,
        }
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Virtual time since power on.
    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.scheduler.current_time)
    }

    /// Moves the clock forward by `duration`, firing every boundary which falls due in order.
    ///
    /// Returns the number of frame boundaries that passed.
    pub fn advance(&mut self, duration: Duration) -> u64 {
        let target = self.scheduler.current_time + duration_ns(duration);
        self.advance_to(target)
    }

    /// Advances up to and including the next frame boundary.
    pub fn step_frame(&mut self) {
        let next_frame = self.frame_period - self.scheduler.current_time % self.frame_period;
        self.advance(Duration::from_nanos(next_frame));
    }

    fn advance_to(&mut self, target: u64) -> u64 {
        let mut frames = 0;
        while let Some(event) = self.scheduler.pop_until(target) {
            match event.event_type {
                EventType::FrameBoundary => {
                    self.ppu.frame_boundary();
                    frames += 1;
                    self.scheduler
                        .push_event(EventType::FrameBoundary, event.timestamp + self.frame_period);
                }
                EventType::AudioBoundary => {
                    self.apu.buffer_boundary();
                    self.scheduler
                        .push_event(EventType::AudioBoundary, event.timestamp + self.audio_period);
                }
            }
        }
        self.scheduler.advance_to(target);
        frames
    }
}

fn duration_ns(duration: Duration) -> u64 {
    duration.as_nanos() as u64
}

/// Runs a [Console] on a background thread in real time.
///
/// The devices stay reachable through the handles returned by the accessors, the runner
/// only owns the clock. Stopped by [ConsoleRunner::stop] or when dropped.
#[derive(Debug)]
pub struct ConsoleRunner {
    current_thread: Option<JoinHandle<()>>,
    stop_sender: Sender<()>,
    ppu: Ppu,
    apu: Apu,
    controller: Controller,
}

impl ConsoleRunner {
    /// Starts the clock thread, advancing the console every `tick_interval`.
    pub fn start(console: Console, tick_interval: Duration) -> Self {
        let (stop_sender, stop_receiver) = bounded::<()>(1);
        let ppu = console.ppu.clone();
        let apu = console.apu.clone();
        let controller = console.controller.clone();

        let clock_thread = std::thread::spawn(move || {
            let mut console = console;
            let ticker = tick(tick_interval);
            let start = Instant::now();
            let offset = console.scheduler.current_time;
            loop {
                select! {
                    recv(stop_receiver) -> _ => break,
                    recv(ticker) -> _ => {
                        let target = offset + duration_ns(start.elapsed());
                        console.advance_to(target);
                    }
                }
            }
            debug!("Console clock stopped at {:?}", console.now());
        });

        ConsoleRunner {
            current_thread: Some(clock_thread),
            stop_sender,
            ppu,
            apu,
            controller,
        }
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn is_running(&self) -> bool {
        self.current_thread.is_some()
    }

    /// Stops the clock thread and blocks until it has completed.
    pub fn stop(&mut self) {
        if let Some(thread) = self.current_thread.take() {
            // A full channel means a stop is already on its way.
            let _ = self.stop_sender.try_send(());
            if thread.join().is_err() {
                error!("Console clock thread panicked");
            }
        }
    }
}

impl Drop for ConsoleRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
