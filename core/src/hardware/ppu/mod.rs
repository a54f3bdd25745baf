//! The picture processing unit.
//!
//! Modifications are staged in a pending copy of VRAM held by the device and only become
//! visible once [PpuSession::update] is accepted. After an accepted update the device spends
//! the rest of the frame transferring it, and every write or update during that time is
//! answered with [DeviceError::Busy] without any effect. The next frame boundary opens the
//! device up again.
//!
//! Callers are expected to poll: `while session.update().is_err() {}` both flushes the
//! pending frame and locks the caller to the console's 60 FPS cadence.
//!
//! Invalid arguments (see the documentation of each operation) are logged and abort the
//! caller, to surface bugs early.
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::DeviceError;
use crate::hardware::lock::{DeviceLock, OwnerId};
use crate::hardware::ppu::memory_binds::*;
use crate::hardware::ppu::palette::{Palette, PaletteSection, RGB};
use crate::hardware::ppu::register_flags::{Layer, LayerFlags};
use crate::hardware::ppu::sprite::Sprite;
use crate::hardware::ppu::tiledata::{Pattern, PatternAddress, Tile};
use crate::hardware::ppu::vram::Vram;

pub mod composition;
pub mod memory_binds;
pub mod palette;
pub mod register_flags;
pub mod sprite;
pub mod tiledata;
pub mod vram;

#[cfg(test)]
mod tests;

/// Registers which live outside of VRAM.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PpuRegisters {
    /// Shown wherever every enabled layer is transparent.
    pub bg_colour: RGB,
    bg_scroll: (u16, u16),
    fg_scroll: (u16, u16),
    pub layers: LayerFlags,
}

impl PpuRegisters {
    pub fn scroll(&self, layer: Layer) -> (u16, u16) {
        match layer {
            Layer::Background => self.bg_scroll,
            Layer::Foreground => self.fg_scroll,
            Layer::Sprite => (0, 0),
        }
    }
}

impl Default for PpuRegisters {
    fn default() -> Self {
        PpuRegisters {
            bg_colour: RGB::default(),
            bg_scroll: (0, 0),
            fg_scroll: (0, 0),
            layers: LayerFlags::empty(),
        }
    }
}

#[derive(Debug, PartialOrd, PartialEq, Copy, Clone)]
pub enum FrameState {
    /// Writes and updates are accepted.
    Accepting,
    /// A committed frame is in flight, everything is `Busy` until the next frame boundary.
    Transferring,
}

/// A consistent copy of everything the PPU renders from.
#[derive(Debug, Clone)]
pub struct FrameView {
    pub vram: Vram,
    pub registers: PpuRegisters,
}

#[derive(Debug)]
struct PpuState {
    lock: DeviceLock,
    frame_state: FrameState,
    /// What the hardware currently displays.
    vram: Vram,
    registers: PpuRegisters,
    /// Staged by the owner, becomes `vram`/`registers` on an accepted update.
    pending_vram: Vram,
    pending_registers: PpuRegisters,
    dirty: bool,
    frames: u64,
    commits: u64,
}

impl PpuState {
    fn discard_pending(&mut self) {
        self.pending_vram.copy_from(&self.vram);
        self.pending_registers = self.registers;
        self.dirty = false;
    }
}

/// Handle to the (simulated) PPU device. Cloning yields another handle to the same device.
#[derive(Debug, Clone)]
pub struct Ppu {
    state: Arc<Mutex<PpuState>>,
}

impl Ppu {
    pub fn new() -> Self {
        Ppu {
            state: Arc::new(Mutex::new(PpuState {
                lock: DeviceLock::new(),
                frame_state: FrameState::Accepting,
                vram: Vram::new(),
                registers: PpuRegisters::default(),
                pending_vram: Vram::new(),
                pending_registers: PpuRegisters::default(),
                dirty: false,
                frames: 0,
                commits: 0,
            })),
        }
    }

    /// Attempts to lock the PPU to `owner`. Only the returned session can modify the PPU.
    ///
    /// Fails with [DeviceError::OwnershipConflict] if the PPU is already owned.
    pub fn enable(&self, owner: OwnerId) -> Result<PpuSession, DeviceError> {
        let mut state = self.state.lock();
        state.lock.acquire(owner)?;
        state.discard_pending();
        log::debug!("PPU enabled by {}", owner);

        Ok(PpuSession {
            ppu: self.clone(),
            owner,
        })
    }

    /// Called once per frame (~60 Hz) by the console clock.
    pub fn frame_boundary(&self) {
        let mut state = self.state.lock();
        state.frames += 1;
        if state.frame_state == FrameState::Transferring {
            #[cfg(feature = "ppu-logging")]
            log::trace!("Frame {} transferred", state.frames);
            state.frame_state = FrameState::Accepting;
        }
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.state.lock().lock.owner()
    }

    pub fn is_accepting(&self) -> bool {
        self.state.lock().frame_state == FrameState::Accepting
    }

    /// Number of frame boundaries seen so far.
    pub fn frame_count(&self) -> u64 {
        self.state.lock().frames
    }

    /// Number of accepted updates which carried changes.
    pub fn commit_count(&self) -> u64 {
        self.state.lock().commits
    }

    // Diagnostics, these all read the committed (displayed) state.

    // Diagnostics take the same argument ranges as the matching write operations.

    pub fn read_vram(&self, offset: usize, len: usize) -> Vec<u8> {
        check_vram_range(offset, len);
        self.state.lock().vram.bytes(offset, len).to_vec()
    }

    pub fn read_tile(&self, layer: Layer, x: usize, y: usize) -> Tile {
        check_tile_position(layer, x, y);
        self.state.lock().vram.tile(layer, x, y)
    }

    pub fn read_pattern(&self, address: PatternAddress) -> Pattern {
        self.state.lock().vram.pattern(address)
    }

    pub fn read_palette(&self, section: PaletteSection, palette_id: usize) -> Palette {
        check_palette_id(section, palette_id);
        self.state.lock().vram.palette(section, palette_id)
    }

    pub fn read_sprite(&self, slot: usize) -> Sprite {
        check_sprite_slots(slot, 1);
        self.state.lock().vram.sprite(slot)
    }

    pub fn registers(&self) -> PpuRegisters {
        self.state.lock().registers
    }

    pub fn snapshot(&self) -> FrameView {
        let state = self.state.lock();
        FrameView {
            vram: state.vram.clone(),
            registers: state.registers,
        }
    }

    fn release(&self, owner: OwnerId) {
        let mut state = self.state.lock();
        if state.lock.release(owner) {
            // Anything not yet committed dies with the session.
            state.discard_pending();
            log::debug!("PPU released by {}", owner);
        }
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Ppu::new()
    }
}

/// Exclusive write access to the PPU.
///
/// Released by [PpuSession::disable], or when dropped.
#[derive(Debug)]
pub struct PpuSession {
    ppu: Ppu,
    owner: OwnerId,
}

impl PpuSession {
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Releases the lock on the PPU so other processes may reserve it.
    /// Writes which were never committed through [PpuSession::update] are discarded.
    pub fn disable(self) {
        // Drop does the work.
    }

    /// Request for the pending changes to be sent to the PPU.
    ///
    /// Every change staged since the last successful update is visible once this returns
    /// `Ok`. Returns `Busy` while the previous frame is still being transferred, in which
    /// case the staged changes are kept for the next attempt.
    pub fn update(&mut self) -> Result<(), DeviceError> {
        let mut state = self.ppu.state.lock();
        if state.frame_state == FrameState::Transferring {
            return Err(DeviceError::Busy);
        }

        if state.dirty {
            let PpuState {
                vram, pending_vram, ..
            } = &mut *state;
            vram.copy_from(pending_vram);
            state.registers = state.pending_registers;
            state.dirty = false;
            state.commits += 1;
            #[cfg(feature = "ppu-logging")]
            log::trace!("Committed frame #{}", state.commits);
        }
        state.frame_state = FrameState::Transferring;
        Ok(())
    }

    /// Writes directly into VRAM at the byte `offset`.
    ///
    /// Lower level than the typed write operations, nothing but the total bounds are
    /// checked: `offset + bytes.len()` must not exceed the 64 KiB region.
    pub fn write_vram(&mut self, bytes: &[u8], offset: usize) -> Result<(), DeviceError> {
        check_vram_range(offset, bytes.len());
        self.stage(|state| state.pending_vram.write_bytes(offset, bytes))
    }

    /// Writes `count` tiles into a row of `layer` starting at `(x, y)` and moving right.
    ///
    /// Passing column 63 wraps around to column 0 of the *same* row. If fewer tiles than
    /// `count` are given they are repeated. Both `tiles.len()` and `count` are clamped to 64.
    /// `layer` must be a tile layer and `x`, `y` must be in `[0, 63]`.
    ///
    /// Tile RAM is stored row by row, so this is cheaper than [Self::write_tiles_vertical].
    /// When filling a rectangle make this the inner loop and the row the outer one.
    pub fn write_tiles_horizontal(
        &mut self,
        tiles: &[Tile],
        layer: Layer,
        x: usize,
        y: usize,
        count: usize,
    ) -> Result<(), DeviceError> {
        let (tiles, count) = validate_tile_write(tiles, layer, x, y, count);
        // Whole segments of the row go in as at most two block copies.
        let row: Vec<u8> = tiles
            .iter()
            .cycle()
            .take(count)
            .flat_map(|tile| tile.raw().to_le_bytes().to_vec())
            .collect();
        let first_len = (TILELAYER_WIDTH - x).min(count) * TILE_ENTRY_BSIZE;

        self.stage(|state| {
            let (head, wrapped) = row.split_at(first_len);
            state.pending_vram.write_bytes(tile_offset(layer, x, y), head);
            if !wrapped.is_empty() {
                state.pending_vram.write_bytes(tile_offset(layer, 0, y), wrapped);
            }
        })
    }

    /// Writes `count` tiles into a column of `layer` starting at `(x, y)` and moving down.
    ///
    /// Passing row 63 wraps around to row 0 of the same column. Repetition, clamping and
    /// argument ranges are the same as for [Self::write_tiles_horizontal], but every entry
    /// lands in a different row of the row-major Tile RAM, making this the slower variant.
    pub fn write_tiles_vertical(
        &mut self,
        tiles: &[Tile],
        layer: Layer,
        x: usize,
        y: usize,
        count: usize,
    ) -> Result<(), DeviceError> {
        let (tiles, count) = validate_tile_write(tiles, layer, x, y, count);

        self.stage(|state| {
            for (i, tile) in tiles.iter().cycle().take(count).enumerate() {
                state
                    .pending_vram
                    .set_tile(layer, x, (y + i) % TILELAYER_HEIGHT, *tile);
            }
        })
    }

    /// Writes a `width` x `height` block of patterns into Pattern RAM, top-left at `start`.
    ///
    /// `patterns` are laid out row by row and must hold at least `width * height` entries.
    /// The block may run off the edge of Pattern RAM, the addresses wrap around
    /// (`(31, 0)` is followed by `(0, 1)`), only the start itself has to be in bounds.
    pub fn write_pattern(
        &mut self,
        patterns: &[Pattern],
        width: usize,
        height: usize,
        start: PatternAddress,
    ) -> Result<(), DeviceError> {
        if width == 0 || height == 0 {
            invalid_argument!("Pattern block of {}x{} must be at least 1x1", width, height);
        }
        if width.checked_mul(height).map_or(true, |needed| needed > patterns.len()) {
            invalid_argument!(
                "Pattern block of {}x{} needs more than the {} patterns given",
                width,
                height,
                patterns.len()
            );
        }

        self.stage(|state| {
            for row in 0..height {
                for column in 0..width {
                    let address = start.offset_wrapping(row * PATTERN_GRID_WIDTH + column);
                    state
                        .pending_vram
                        .set_pattern(address, &patterns[row * width + column]);
                }
            }
        })
    }

    /// Overwrites the palette `palette_id` in the Palette RAM section of `layer`.
    ///
    /// The background and foreground sections hold 16 palettes, the sprite section 32.
    pub fn write_palette(&mut self, palette: &Palette, layer: Layer, palette_id: usize) -> Result<(), DeviceError> {
        let section = PaletteSection::from(layer);
        check_palette_id(section, palette_id);
        self.stage(|state| state.pending_vram.set_palette(section, palette_id, palette))
    }

    /// Overwrites `sprites.len()` consecutive Sprite RAM entries starting at `start_slot`.
    ///
    /// `start_slot + sprites.len()` must not exceed 64, and every sprite must be valid.
    pub fn write_sprites(&mut self, sprites: &[Sprite], start_slot: usize) -> Result<(), DeviceError> {
        check_sprite_slots(start_slot, sprites.len());
        sprites.iter().for_each(Sprite::validate);

        self.stage(|state| {
            for (i, sprite) in sprites.iter().enumerate() {
                state.pending_vram.set_sprite(start_slot + i, sprite);
            }
        })
    }

    /// Sets the colour displayed where every layer is transparent.
    /// `colour` is `0xRRGGBB`, bits `[31:24]` are ignored.
    pub fn set_bgcolor(&mut self, colour: u32) -> Result<(), DeviceError> {
        self.stage(|state| state.pending_registers.bg_colour = RGB::from_u32(colour))
    }

    /// Sets the pixel scroll of a tile layer. The sprite layer cannot scroll.
    /// Both values must be in `[0, 511]`.
    pub fn set_scroll(&mut self, layer: Layer, scroll_x: u16, scroll_y: u16) -> Result<(), DeviceError> {
        if scroll_x > SCROLL_MAX || scroll_y > SCROLL_MAX {
            invalid_argument!("Scroll ({}, {}) outside of [0, 511]", scroll_x, scroll_y);
        }
        let scroll = (scroll_x, scroll_y);
        match layer {
            Layer::Background => self.stage(|state| state.pending_registers.bg_scroll = scroll),
            Layer::Foreground => self.stage(|state| state.pending_registers.fg_scroll = scroll),
            Layer::Sprite => invalid_argument!("The sprite layer doesn't support scrolling"),
        }
    }

    /// Enables or disables the render layers with a mask of [LayerFlags] bits.
    /// Any bits above bit 2 are ignored.
    pub fn set_layer_enable(&mut self, enable_mask: u32) -> Result<(), DeviceError> {
        let layers = LayerFlags::from_mask(enable_mask);
        self.stage(|state| state.pending_registers.layers = layers)
    }

    fn stage(&mut self, change: impl FnOnce(&mut PpuState)) -> Result<(), DeviceError> {
        let mut state = self.ppu.state.lock();
        if state.frame_state == FrameState::Transferring {
            return Err(DeviceError::Busy);
        }
        change(&mut state);
        state.dirty = true;
        Ok(())
    }
}

impl Drop for PpuSession {
    fn drop(&mut self) {
        self.ppu.release(self.owner);
    }
}

fn check_vram_range(offset: usize, len: usize) {
    if offset.checked_add(len).map_or(true, |end| end > VRAM_SIZE) {
        invalid_argument!(
            "VRAM access of {} bytes at {:#06X} exceeds the {:#X} byte region",
            len,
            offset,
            VRAM_SIZE
        );
    }
}

fn check_tile_position(layer: Layer, x: usize, y: usize) {
    if layer == Layer::Sprite {
        invalid_argument!("Tiles only exist in LAYER_BG or LAYER_FG");
    }
    if x >= TILELAYER_WIDTH || y >= TILELAYER_HEIGHT {
        invalid_argument!("Tile position ({}, {}) outside of [0, 63]", x, y);
    }
}

fn check_palette_id(section: PaletteSection, palette_id: usize) {
    if palette_id >= section.max_palettes() {
        invalid_argument!(
            "Palette id {} out of bounds for the {:?} section ({} palettes)",
            palette_id,
            section,
            section.max_palettes()
        );
    }
}

/// `len` consecutive slots from `start_slot` must all lie within Sprite RAM.
fn check_sprite_slots(start_slot: usize, len: usize) {
    if start_slot.checked_add(len).map_or(true, |end| end > SPRITE_COUNT) {
        invalid_argument!(
            "{} sprites from slot {} run past the {} Sprite RAM entries",
            len,
            start_slot,
            SPRITE_COUNT
        );
    }
}

/// Shared argument checks of the tile writes, returns the clamped tiles and count.
fn validate_tile_write(tiles: &[Tile], layer: Layer, x: usize, y: usize, count: usize) -> (&[Tile], usize) {
    check_tile_position(layer, x, y);
    let count = count.min(TILELAYER_WIDTH);
    let tiles = &tiles[..tiles.len().min(TILELAYER_WIDTH)];
    if tiles.is_empty() && count > 0 {
        invalid_argument!("Cannot write {} tiles from an empty buffer", count);
    }
    (tiles, count)
}
