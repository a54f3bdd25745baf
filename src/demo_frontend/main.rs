use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use crossbeam::channel::bounded;
use fpgame::storage::{FileStorage, Storage};
use fpgame_core::hardware::apu::sink::ChannelSink;
use fpgame_core::{Console, ConsoleOptionsBuilder, ConsoleRunner, OwnerId};
use gumdrop::Options;
use log::*;
use simplelog::{CombinedLogger, Config, TermLogger, TerminalMode};

use crate::demos::{Demo, DemoContext};
use crate::options::{AppOptions, DemoConfig};

mod demos;
mod options;
mod screenshot;

const CONFIG_FILENAME: &str = "demo_config.json";
/// How often the clock thread catches up with real time.
const TICK_INTERVAL: Duration = Duration::from_millis(1);
/// About a second of audio.
const AUDIO_QUEUE: usize = 64;

fn main() -> anyhow::Result<()> {
    let mut options = AppOptions::parse_args_default_or_exit();
    let level = LevelFilter::from_str(&options.log_level)
        .map_err(|_| anyhow!("Invalid log level {:?}", options.log_level))?;
    CombinedLogger::init(vec![TermLogger::new(level, Config::default(), TerminalMode::Mixed)])?;

    let storage = FileStorage::new();
    if storage.is_none() {
        warn!("No config directory available, settings will not be remembered");
    }
    if options.load_config {
        match storage.as_ref().and_then(|s| s.get_value::<DemoConfig>(CONFIG_FILENAME)) {
            Some(config) => options.apply(config),
            None => warn!("No saved settings found, using the command line"),
        }
    }
    if options.save_config {
        if let Some(storage) = &storage {
            storage.save_value(CONFIG_FILENAME, &options.demo_config())?;
            info!("Saved settings to {:?}", storage.config_dir().join(CONFIG_FILENAME));
        }
    }

    let demo = Demo::from_str(&options.demo)?;
    let (audio_sender, audio_receiver) = bounded(AUDIO_QUEUE);
    let console = Console::with_sink(ConsoleOptionsBuilder::new().build(), ChannelSink::new(audio_sender));
    let mut runner = ConsoleRunner::start(console, TICK_INTERVAL);

    let context = DemoContext {
        runner: &runner,
        audio: audio_receiver,
        owner: OwnerId::current_process(),
        frames: options.frames,
        colour: &options.colour,
        asset_dir: Path::new(&options.asset_dir),
    };

    let start = Instant::now();
    let result = demos::run(demo, &context);
    drop(context);
    runner.stop();
    result?;

    let frame = runner.ppu().snapshot();
    info!(
        "Finished after {:?}, {} frames, {} commits",
        start.elapsed(),
        runner.ppu().frame_count(),
        runner.ppu().commit_count()
    );
    info!("Frame digest: {}", screenshot::digest(&frame));
    if let Some(path) = &options.screenshot {
        screenshot::save(&frame, path)?;
        info!("Saved screenshot to {}", path);
    }

    Ok(())
}
