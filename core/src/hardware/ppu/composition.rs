//! Software model of how the PPU composes the three layers into the 320x240 screen.
//!
//! Front to back: front sprites, foreground, middle sprites, background, back sprites and
//! finally the background colour. A pixel value of `0` is transparent and lets the layer
//! behind it show through.
use itertools::Itertools;

use crate::hardware::ppu::memory_binds::{
    PATTERN_GRID_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH, SPRITE_COUNT, TILELAYER_HEIGHT, TILELAYER_WIDTH,
};
use crate::hardware::ppu::palette::{PaletteSection, RGB};
use crate::hardware::ppu::register_flags::{Layer, LayerFlags};
use crate::hardware::ppu::sprite::{RenderPriority, Sprite};
use crate::hardware::ppu::tiledata::{Mirror, PatternAddress};
use crate::hardware::ppu::FrameView;

const LAYER_PIXEL_WIDTH: u16 = (TILELAYER_WIDTH * 8) as u16;
const LAYER_PIXEL_HEIGHT: u16 = (TILELAYER_HEIGHT * 8) as u16;

/// Where a composed pixel came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelSource {
    /// The sprite in the given Sprite RAM slot.
    Sprite(usize),
    Foreground,
    Background,
    /// Every enabled layer was transparent, the background colour shows.
    Backdrop,
}

/// Resolves a single screen pixel, `x < 320` and `y < 240`.
pub fn resolve_pixel(view: &FrameView, x: u16, y: u16) -> (PixelSource, RGB) {
    if x as usize >= SCREEN_WIDTH || y as usize >= SCREEN_HEIGHT {
        invalid_argument!("Screen pixel ({}, {}) outside of 320x240", x, y);
    }
    let layers = view.registers.layers;
    let sprites = if layers.contains(LayerFlags::SPR) {
        visible_sprites(view, x, y)
    } else {
        Vec::new()
    };

    let sprite_layer = |priority: RenderPriority| {
        sprites
            .iter()
            .filter(|(_, sprite)| sprite.priority == priority)
            .find_map(|(slot, sprite)| sprite_pixel(view, sprite, x, y).map(|rgb| (PixelSource::Sprite(*slot), rgb)))
    };
    let tile_layer = |layer: Layer, source: PixelSource| {
        if layers.contains(layer.flag()) {
            tile_layer_pixel(view, layer, x, y).map(|rgb| (source, rgb))
        } else {
            None
        }
    };

    sprite_layer(RenderPriority::Front)
        .or_else(|| tile_layer(Layer::Foreground, PixelSource::Foreground))
        .or_else(|| sprite_layer(RenderPriority::Middle))
        .or_else(|| tile_layer(Layer::Background, PixelSource::Background))
        .or_else(|| sprite_layer(RenderPriority::Back))
        .unwrap_or((PixelSource::Backdrop, view.registers.bg_colour))
}

/// Composes the whole screen, row by row.
pub fn render_frame(view: &FrameView) -> Vec<RGB> {
    let mut result = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT);
    for y in 0..SCREEN_HEIGHT as u16 {
        for x in 0..SCREEN_WIDTH as u16 {
            result.push(resolve_pixel(view, x, y).1);
        }
    }
    result
}

/// Sprites covering `(x, y)` in slot order, so the lowest slot is found first.
fn visible_sprites(view: &FrameView, x: u16, y: u16) -> Vec<(usize, Sprite)> {
    (0..SPRITE_COUNT)
        .map(|slot| (slot, view.vram.sprite(slot)))
        .filter(|(_, sprite)| sprite.covers(x, y))
        .collect_vec()
}

fn sprite_pixel(view: &FrameView, sprite: &Sprite, x: u16, y: u16) -> Option<RGB> {
    let width = sprite.width as usize * 8;
    let height = sprite.height as usize * 8;
    let (local_x, local_y) = mirrored(
        (x - sprite.x) as usize,
        (y - sprite.y) as usize,
        width,
        height,
        sprite.mirror,
    );
    let pattern = sprite
        .pattern_addr
        .offset_wrapping((local_y / 8) * PATTERN_GRID_WIDTH + local_x / 8);

    let value = pattern_pixel(view, pattern, local_x % 8, local_y % 8);
    view.vram
        .palette(PaletteSection::Sprite, sprite.palette_id as usize)
        .colour(value)
}

fn tile_layer_pixel(view: &FrameView, layer: Layer, x: u16, y: u16) -> Option<RGB> {
    let (scroll_x, scroll_y) = view.registers.scroll(layer);
    let layer_x = ((x + scroll_x) % LAYER_PIXEL_WIDTH) as usize;
    let layer_y = ((y + scroll_y) % LAYER_PIXEL_HEIGHT) as usize;

    let tile = view.vram.tile(layer, layer_x / 8, layer_y / 8);
    let (local_x, local_y) = mirrored(layer_x % 8, layer_y % 8, 8, 8, tile.mirror());

    let value = pattern_pixel(view, tile.pattern(), local_x, local_y);
    view.vram
        .palette(PaletteSection::from(layer), tile.palette_id() as usize)
        .colour(value)
}

fn pattern_pixel(view: &FrameView, address: PatternAddress, x: usize, y: usize) -> u8 {
    view.vram.pattern(address).pixel(x, y)
}

#[inline]
fn mirrored(x: usize, y: usize, width: usize, height: usize, mirror: Mirror) -> (usize, usize) {
    let x = if mirror.flips_x() { width - 1 - x } else { x };
    let y = if mirror.flips_y() { height - 1 - y } else { y };
    (x, y)
}
