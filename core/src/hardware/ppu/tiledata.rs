//! Pattern RAM is organised as a 32x32 grid of 8x8 pixel patterns, addressed row by row
//! starting from the top-left pattern:
//!
//! ```text
//!  (0,0)  (1,0)  ...  (31,0)      address 0    ..  31
//!  (0,1)  (1,1)  ...  (31,1)      address 32   ..  63
//!   ...
//!  (0,31)        ...  (31,31)     address 992  .. 1023
//! ```
//!
//! When addressing groups of patterns (sprites larger than 8x8) the top left-most pattern
//! is the one to address; the rest follow to the right and downward.
//!
//! Tile entries reference a pattern, a palette and a mirror state, packed in 16 bits:
//! `[9:0]` pattern address, `[13:10]` palette id, `[15:14]` mirror.

use crate::hardware::ppu::memory_binds::{
    PATTERN_GRID_WIDTH, PATTERN_COUNT, TILELAYER_MAX_PALETTES, TILEPATTERN_HEIGHT,
};

const TILE_PATTERN_MASK: u16 = 0x03FF;
const TILE_PALETTE_SHIFT: u16 = 10;
const TILE_PALETTE_MASK: u16 = 0x0F;
const TILE_MIRROR_SHIFT: u16 = 14;

/// Mirror state for graphics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Mirror {
    None = 0,
    /// Horizontally flipped
    X = 1,
    /// Vertically flipped
    Y = 2,
    XY = 3,
}

impl Mirror {
    /// Decodes the two mirror bits, anything above is ignored.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => Mirror::None,
            1 => Mirror::X,
            2 => Mirror::Y,
            _ => Mirror::XY,
        }
    }

    #[inline]
    pub fn flips_x(self) -> bool {
        matches!(self, Mirror::X | Mirror::XY)
    }

    #[inline]
    pub fn flips_y(self) -> bool {
        matches!(self, Mirror::Y | Mirror::XY)
    }
}

impl Default for Mirror {
    fn default() -> Self {
        Mirror::None
    }
}

/// Address of a single pattern in Pattern RAM, range `0..1024`.
///
/// Generate these with [pattern_address].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternAddress(u16);

impl PatternAddress {
    /// Wraps a raw address, fatal when it lies outside of Pattern RAM.
    pub fn new(address: u16) -> Self {
        if address as usize >= PATTERN_COUNT {
            invalid_argument!("Pattern address {} outside of Pattern RAM (max {})", address, PATTERN_COUNT - 1);
        }
        PatternAddress(address)
    }

    #[inline]
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Inverse of [pattern_address], returns `(x, y)`.
    pub fn coordinates(&self) -> (u16, u16) {
        (self.0 % PATTERN_GRID_WIDTH as u16, self.0 / PATTERN_GRID_WIDTH as u16)
    }

    /// The address `steps` patterns further along, wrapping past the end of Pattern RAM.
    #[inline]
    pub fn offset_wrapping(&self, steps: usize) -> Self {
        PatternAddress(((self.0 as usize + steps) % PATTERN_COUNT) as u16)
    }
}

/// Generates a [PatternAddress] from `(x, y)` grid coordinates, both in the range `[0, 31]`.
pub fn pattern_address(x: u16, y: u16) -> PatternAddress {
    let width = PATTERN_GRID_WIDTH as u16;
    if x >= width || y >= width {
        invalid_argument!("Pattern coordinates ({}, {}) outside of the 32x32 Pattern RAM grid", x, y);
    }
    PatternAddress(y * width + x)
}

/// Packs a tile entry for use with the tile write operations.
///
/// The palette id must lie in `[0, 15]`. It selects from the background or foreground
/// palette section depending on the layer the tile ends up in.
pub fn make_tile(pattern: PatternAddress, palette_id: u8, mirror: Mirror) -> Tile {
    if palette_id as usize >= TILELAYER_MAX_PALETTES {
        invalid_argument!(
            "Tile palette id {} exceeds the tile layer maximum of {}",
            palette_id,
            TILELAYER_MAX_PALETTES
        );
    }
    Tile(
        pattern.value()
            | ((palette_id as u16) << TILE_PALETTE_SHIFT)
            | ((mirror as u16) << TILE_MIRROR_SHIFT),
    )
}

/// One 16-bit Tile RAM entry.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Tile(u16);

impl Tile {
    pub const fn from_raw(raw: u16) -> Self {
        Tile(raw)
    }

    #[inline]
    pub fn raw(&self) -> u16 {
        self.0
    }

    pub fn pattern(&self) -> PatternAddress {
        PatternAddress(self.0 & TILE_PATTERN_MASK)
    }

    pub fn palette_id(&self) -> u8 {
        ((self.0 >> TILE_PALETTE_SHIFT) & TILE_PALETTE_MASK) as u8
    }

    pub fn mirror(&self) -> Mirror {
        Mirror::from_bits((self.0 >> TILE_MIRROR_SHIFT) as u32)
    }
}

/// 8x8 pixels at 4 bits per pixel => 32 bytes.
///
/// Each row is one `u32` holding eight pixels, the leftmost pixel in the lowest nibble.
/// Pixel value `0` is transparent, `1..=15` index into the palette.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub rows: [u32; TILEPATTERN_HEIGHT],
}

impl Pattern {
    pub const fn new(rows: [u32; TILEPATTERN_HEIGHT]) -> Self {
        Pattern { rows }
    }

    /// A pattern with every pixel set to `value` (only the low nibble is used).
    pub fn filled(value: u8) -> Self {
        let nibble = (value & 0xF) as u32;
        let row = (0..8).fold(0u32, |acc, i| acc | (nibble << (i * 4)));
        Pattern { rows: [row; TILEPATTERN_HEIGHT] }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        ((self.rows[y] >> (x * 4)) & 0xF) as u8
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        let shift = x * 4;
        self.rows[y] = (self.rows[y] & !(0xF << shift)) | (((value & 0xF) as u32) << shift);
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut result = [0u8; 32];
        for (chunk, row) in result.chunks_exact_mut(4).zip(self.rows.iter()) {
            chunk.copy_from_slice(&row.to_le_bytes());
        }
        result
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut rows = [0u32; TILEPATTERN_HEIGHT];
        for (row, chunk) in rows.iter_mut().zip(bytes.chunks_exact(4)) {
            *row = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Pattern { rows }
    }
}
