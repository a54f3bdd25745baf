use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use crossbeam::channel::Receiver;
use fpgame_core::assets::{load_palette_file, load_pattern_file, load_tilemap_file};
use fpgame_core::hardware::apu::sources::{sine_table, LoopingSource, OneShotSource};
use fpgame_core::hardware::apu::{SampleSource, APU_SAMPLE_RATE};
use fpgame_core::hardware::ppu::register_flags::{Layer, LayerFlags};
use fpgame_core::hardware::ppu::sprite::{RenderPriority, Sprite};
use fpgame_core::hardware::ppu::tiledata::pattern_address;
use fpgame_core::retry;
use fpgame_core::scheduler::{AUDIO_PERIOD_NS, FRAME_PERIOD_NS};
use fpgame_core::{Buttons, ConsoleRunner, OwnerId};
use log::*;
use parking_lot::Mutex;

const SINE_PERIOD: usize = 64;
const BARK_LENGTH: usize = 2400;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Demo {
    BgColour,
    Sine,
    Controller,
    Scroll,
}

impl FromStr for Demo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bgcolor" | "bgcolour" => Ok(Demo::BgColour),
            "sine" => Ok(Demo::Sine),
            "controller" => Ok(Demo::Controller),
            "scroll" => Ok(Demo::Scroll),
            other => Err(anyhow!("Unknown demo {:?}, expected bgcolor, sine, controller or scroll", other)),
        }
    }
}

pub struct DemoContext<'a> {
    pub runner: &'a ConsoleRunner,
    pub audio: Receiver<Vec<i8>>,
    pub owner: OwnerId,
    pub frames: u64,
    pub colour: &'a str,
    pub asset_dir: &'a Path,
}

pub fn run(demo: Demo, context: &DemoContext) -> anyhow::Result<()> {
    info!("Running the {:?} demo for {} frames", demo, context.frames);
    match demo {
        Demo::BgColour => bgcolour(context),
        Demo::Sine => sine(context),
        Demo::Controller => controller(context),
        Demo::Scroll => scroll(context),
    }
}

/// Sets the background colour once and then keeps committing empty frames.
fn bgcolour(context: &DemoContext) -> anyhow::Result<()> {
    let colour = u32::from_str_radix(context.colour.trim_start_matches('#'), 16)
        .with_context(|| format!("Invalid colour {:?}, expected RRGGBB", context.colour))?;
    let mut ppu = context.runner.ppu().enable(context.owner)?;

    retry::spin(|| ppu.set_layer_enable(0))?;
    ppu.set_bgcolor(colour)?;
    for _ in 0..context.frames {
        retry::spin(|| ppu.update())?;
    }

    info!("Background colour is now {:06X}", context.runner.ppu().registers().bg_colour.to_u32());
    ppu.disable();
    Ok(())
}

/// Streams a sine tone and reports what reached the audio output.
fn sine(context: &DemoContext) -> anyhow::Result<()> {
    let apu = context
        .runner
        .apu()
        .enable(context.owner, LoopingSource::new(sine_table(SINE_PERIOD, 100)))?;
    let buffers = context.frames * FRAME_PERIOD_NS / AUDIO_PERIOD_NS;

    let mut peak = 0u8;
    for _ in 0..buffers {
        let buffer = context.audio.recv_timeout(Duration::from_secs(1))?;
        peak = buffer.iter().map(|s| s.unsigned_abs()).fold(peak, u8::max);
    }

    info!(
        "Streamed {} buffers of a {} Hz tone, peak amplitude {}",
        buffers,
        APU_SAMPLE_RATE as usize / SINE_PERIOD,
        peak
    );
    apu.disable();
    Ok(())
}

/// Buttons held by the scripted player on a given frame.
fn scripted_input(frame: u64) -> Buttons {
    match frame % 90 {
        10..=19 => Buttons::A,
        30..=44 => Buttons::UP | Buttons::LEFT,
        60..=61 => Buttons::START | Buttons::SELECT,
        _ => Buttons::empty(),
    }
}

/// Prints every change of the controller state, paced by the PPU.
fn controller(context: &DemoContext) -> anyhow::Result<()> {
    let controller = context.runner.controller();
    let mut ppu = context.runner.ppu().enable(context.owner)?;
    let mut last = None;

    for frame in 0..context.frames {
        controller.set_pressed(scripted_input(frame));
        match controller.state() {
            Ok(state) if last != Some(state) => {
                info!("Frame {:>4}: {}", frame, state);
                last = Some(state);
            }
            Ok(_) => {}
            Err(e) => warn!("Frame {:>4}: {}", frame, e),
        }
        retry::spin(|| ppu.update())?;
    }

    ppu.disable();
    Ok(())
}

fn bark_sample() -> Vec<i8> {
    (0..BARK_LENGTH)
        .map(|i| {
            let decay = 1.0 - i as f64 / BARK_LENGTH as f64;
            let saw = ((i * 7) % 40) as f64 - 20.0;
            (saw * 5.0 * decay) as i8
        })
        .collect()
}

/// Pans a tilemap loaded from disk, walks a sprite and barks whenever A is pressed.
fn scroll(context: &DemoContext) -> anyhow::Result<()> {
    let dir = context.asset_dir;
    let tiles = load_tilemap_file(dir.join("demo.tilemap"), 64 * 64).context("Failed to load the tilemap")?;
    let patterns = load_pattern_file(dir.join("demo.pattern"), 2, 1).context("Failed to load the patterns")?;
    let palette = load_palette_file(dir.join("demo.palette")).context("Failed to load the palette")?;

    let mut ppu = context.runner.ppu().enable(context.owner)?;
    let bark = Arc::new(Mutex::new(OneShotSource::new(bark_sample())));
    let source_bark = bark.clone();
    let apu = context
        .runner
        .apu()
        .enable(context.owner, move |buffer: &mut [i8]| source_bark.lock().fill(buffer))?;

    retry::spin(|| ppu.write_pattern(&patterns, 2, 1, pattern_address(1, 0)))?;
    for (y, row) in tiles.chunks(64).enumerate() {
        ppu.write_tiles_horizontal(row, Layer::Background, 0, y, 64)?;
    }
    ppu.write_palette(&palette, Layer::Background, 0)?;
    ppu.write_palette(&palette, Layer::Sprite, 0)?;
    ppu.set_layer_enable((LayerFlags::BG | LayerFlags::SPR).bits() as u32)?;

    let controller = context.runner.controller();
    let mut sprite = Sprite {
        pattern_addr: pattern_address(1, 0),
        priority: RenderPriority::Front,
        x: 16,
        y: 112,
        width: 2,
        ..Sprite::default()
    };
    let mut scroll_x = 0u16;
    let mut barking = false;

    for frame in 0..context.frames {
        controller.set_pressed(scripted_input(frame) | Buttons::RIGHT);
        let state = controller.state()?;

        if state.is_pressed(Buttons::A) && !barking {
            // Exclusive access to the sample while the refill is masked.
            let _mask = apu.mask_callback();
            bark.lock().trigger();
            info!("Frame {:>4}: woof", frame);
        }
        barking = state.is_pressed(Buttons::A);
        if state.is_pressed(Buttons::RIGHT) {
            sprite.x = (sprite.x + 1) % 320;
        }
        scroll_x = (scroll_x + 1) % 512;

        retry::spin(|| ppu.set_scroll(Layer::Background, scroll_x, 0))?;
        ppu.write_sprites(&[sprite], 0)?;
        retry::spin(|| ppu.update())?;
    }

    apu.disable();
    ppu.disable();
    Ok(())
}
