//! The fixed VRAM layout, and typed access to each of its sections.
//!
//! None of the accessors here validate their arguments, that is the job of the session's
//! write operations.
use crate::hardware::ppu::palette::{Palette, PaletteSection, RGB};
use crate::hardware::ppu::register_flags::Layer;
use crate::hardware::ppu::sprite::Sprite;
use crate::hardware::ppu::tiledata::{PatternAddress, Pattern, Tile};
use crate::hardware::ppu::vram::Vram;

/// 64 KiB of VRAM in total.
pub const VRAM_SIZE: usize = 0x10000;

/// Tile RAM, two 64x64 grids of 16-bit tile entries stored row by row.
pub const TILERAM_BGOFFSET: usize = 0x0000;
pub const TILERAM_FGOFFSET: usize = 0x2000;
pub const TILELAYER_WIDTH: usize = 64;
pub const TILELAYER_HEIGHT: usize = 64;
pub const TILE_ENTRY_BSIZE: usize = 2;

/// Pattern RAM, a 32x32 grid of 8x8 4bpp patterns.
pub const VRAM_PATTERNOFFSET: usize = 0x4000;
pub const TILEPATTERN_BSIZE: usize = 32;
pub const TILEPATTERN_HEIGHT: usize = 8;
pub const PATTERN_GRID_WIDTH: usize = 32;
pub const PATTERN_COUNT: usize = PATTERN_GRID_WIDTH * PATTERN_GRID_WIDTH;

/// Palette RAM, split into a background, foreground and sprite section.
pub const VRAM_PALETTEOFFSET: usize = 0xC000;
pub const PALETTERAM_BGOFFSET: usize = 0x000;
pub const PALETTERAM_FGOFFSET: usize = 0x400;
pub const PALETTERAM_SPROFFSET: usize = 0x800;
pub const PALETTE_COLOURS: usize = 15;
pub const PALETTE_BSIZE: usize = PALETTE_COLOURS * 4;
pub const TILELAYER_MAX_PALETTES: usize = 16;
pub const SPRLAYER_MAX_PALETTES: usize = 32;

/// Sprite RAM, one main word per sprite followed by the extra attribute words at +0x100.
pub const VRAM_SPRITESOFFSET: usize = 0xD000;
pub const SPRRAM_EXTRAOFFSET: usize = 0x100;
pub const SPRITE_COUNT: usize = 64;
pub const SPRITE_ENTRY_BSIZE: usize = 4;
pub const SPRITE_MAX_X: u16 = 511;
pub const SPRITE_MAX_Y: u16 = 255;
pub const SPRITE_MAX_SIZE: u8 = 4;

/// Scroll offsets of the tile layers are pixel values in `[0, 511]`.
pub const SCROLL_MAX: u16 = 511;
pub const SCREEN_WIDTH: usize = 320;
pub const SCREEN_HEIGHT: usize = 240;

#[inline]
pub fn tile_offset(layer: Layer, x: usize, y: usize) -> usize {
    layer.tile_ram_offset() + (y * TILELAYER_WIDTH + x) * TILE_ENTRY_BSIZE
}

#[inline]
pub fn pattern_offset(address: PatternAddress) -> usize {
    VRAM_PATTERNOFFSET + address.value() as usize * TILEPATTERN_BSIZE
}

#[inline]
pub fn palette_offset(section: PaletteSection, palette_id: usize) -> usize {
    VRAM_PALETTEOFFSET + section.offset() + palette_id * PALETTE_BSIZE
}

#[inline]
pub fn sprite_offset(slot: usize) -> usize {
    VRAM_SPRITESOFFSET + slot * SPRITE_ENTRY_BSIZE
}

#[inline]
pub fn sprite_extra_offset(slot: usize) -> usize {
    VRAM_SPRITESOFFSET + SPRRAM_EXTRAOFFSET + slot * SPRITE_ENTRY_BSIZE
}

impl Vram {
    pub fn tile(&self, layer: Layer, x: usize, y: usize) -> Tile {
        Tile::from_raw(self.read_u16(tile_offset(layer, x, y)))
    }

    pub fn set_tile(&mut self, layer: Layer, x: usize, y: usize, tile: Tile) {
        self.write_u16(tile_offset(layer, x, y), tile.raw());
    }

    pub fn pattern(&self, address: PatternAddress) -> Pattern {
        Pattern::from_bytes(self.bytes(pattern_offset(address), TILEPATTERN_BSIZE))
    }

    pub fn set_pattern(&mut self, address: PatternAddress, pattern: &Pattern) {
        self.write_bytes(pattern_offset(address), &pattern.to_bytes());
    }

    pub fn palette(&self, section: PaletteSection, palette_id: usize) -> Palette {
        let base = palette_offset(section, palette_id);
        let mut result = Palette::default();
        for (i, colour) in result.colours.iter_mut().enumerate() {
            *colour = RGB::from_u32(self.read_u32(base + i * 4));
        }
        result
    }

    pub fn set_palette(&mut self, section: PaletteSection, palette_id: usize, palette: &Palette) {
        let base = palette_offset(section, palette_id);
        for (i, colour) in palette.colours.iter().enumerate() {
            self.write_u32(base + i * 4, colour.to_u32());
        }
    }

    pub fn sprite(&self, slot: usize) -> Sprite {
        Sprite::from_words(self.read_u32(sprite_offset(slot)), self.read_u32(sprite_extra_offset(slot)))
    }

    pub fn set_sprite(&mut self, slot: usize, sprite: &Sprite) {
        self.write_u32(sprite_offset(slot), sprite.main_word());
        self.write_u32(sprite_extra_offset(slot), sprite.extra_word());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_are_disjoint() {
        // Last byte of each section must stay in front of the next section.
        assert_eq!(tile_offset(Layer::Background, 63, 63) + 2, TILERAM_FGOFFSET);
        assert_eq!(tile_offset(Layer::Foreground, 63, 63) + 2, VRAM_PATTERNOFFSET);
        assert_eq!(pattern_offset(PatternAddress::new(1023)) + TILEPATTERN_BSIZE, VRAM_PALETTEOFFSET);
        let fg_palettes = VRAM_PALETTEOFFSET + PALETTERAM_FGOFFSET;
        let spr_palettes = VRAM_PALETTEOFFSET + PALETTERAM_SPROFFSET;
        assert!(palette_offset(PaletteSection::Background, 15) + PALETTE_BSIZE <= fg_palettes);
        assert!(palette_offset(PaletteSection::Foreground, 15) + PALETTE_BSIZE <= spr_palettes);
        assert!(palette_offset(PaletteSection::Sprite, 31) + PALETTE_BSIZE <= VRAM_SPRITESOFFSET);
        assert_eq!(sprite_offset(63) + SPRITE_ENTRY_BSIZE, VRAM_SPRITESOFFSET + SPRRAM_EXTRAOFFSET);
        assert!(sprite_extra_offset(63) + SPRITE_ENTRY_BSIZE <= VRAM_SIZE);
    }

    #[test]
    fn test_palette_high_byte_is_dropped() {
        let mut vram = Vram::new();
        let mut palette = Palette::default();
        palette.colours[3] = RGB(1, 2, 3);
        vram.set_palette(PaletteSection::Sprite, 31, &palette);

        assert_eq!(vram.read_u32(palette_offset(PaletteSection::Sprite, 31) + 12), 0x0001_0203);
        assert_eq!(vram.palette(PaletteSection::Sprite, 31), palette);
    }
}
