use crate::hardware::ppu::memory_binds::{
    PALETTERAM_BGOFFSET, PALETTERAM_FGOFFSET, PALETTERAM_SPROFFSET, PALETTE_COLOURS, SPRLAYER_MAX_PALETTES,
    TILELAYER_MAX_PALETTES,
};
use crate::hardware::ppu::register_flags::Layer;

#[derive(Copy, Clone, Debug, Default, PartialOrd, PartialEq, Eq, Hash)]
pub struct RGB(pub u8, pub u8, pub u8);

impl RGB {
    /// Interprets the low 24 bits as `0xRRGGBB`, the high byte is ignored.
    pub const fn from_u32(colour: u32) -> Self {
        RGB((colour >> 16) as u8, (colour >> 8) as u8, colour as u8)
    }

    pub const fn to_u32(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }
}

/// A palette of 15 colours. Pixel value `0` is always transparent and therefore has no entry,
/// pixel value `n` uses `colours[n - 1]`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Palette {
    pub colours: [RGB; PALETTE_COLOURS],
}

impl Palette {
    pub const fn new(colours: [RGB; PALETTE_COLOURS]) -> Self {
        Palette { colours }
    }

    /// Builds a palette from `0xRRGGBB` values, any higher order bits are ignored.
    pub fn from_u32s(colours: [u32; PALETTE_COLOURS]) -> Self {
        let mut result = Palette::default();
        for (slot, colour) in result.colours.iter_mut().zip(colours.iter()) {
            *slot = RGB::from_u32(*colour);
        }
        result
    }

    /// Retrieve the colour for a pixel value, `None` for the transparent value `0`.
    #[inline]
    pub fn colour(&self, pixel_value: u8) -> Option<RGB> {
        match pixel_value & 0xF {
            0 => None,
            value => Some(self.colours[value as usize - 1]),
        }
    }
}

/// The three sub-sections of Palette RAM.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PaletteSection {
    Background,
    Foreground,
    Sprite,
}

impl PaletteSection {
    /// Byte offset from the start of Palette RAM.
    pub const fn offset(self) -> usize {
        match self {
            PaletteSection::Background => PALETTERAM_BGOFFSET,
            PaletteSection::Foreground => PALETTERAM_FGOFFSET,
            PaletteSection::Sprite => PALETTERAM_SPROFFSET,
        }
    }

    pub const fn max_palettes(self) -> usize {
        match self {
            PaletteSection::Sprite => SPRLAYER_MAX_PALETTES,
            _ => TILELAYER_MAX_PALETTES,
        }
    }
}

impl From<Layer> for PaletteSection {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Background => PaletteSection::Background,
            Layer::Foreground => PaletteSection::Foreground,
            Layer::Sprite => PaletteSection::Sprite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_lookup_skips_transparent() {
        let mut colours = [0u32; PALETTE_COLOURS];
        colours[0] = 0xFF00_0000 | 0xFF0000;
        colours[14] = 0x0000FF;
        let palette = Palette::from_u32s(colours);

        assert_eq!(palette.colour(0), None);
        assert_eq!(palette.colour(1), Some(RGB(0xFF, 0, 0)));
        assert_eq!(palette.colour(15), Some(RGB(0, 0, 0xFF)));
    }

    #[test]
    fn test_section_bounds() {
        assert_eq!(PaletteSection::from(Layer::Sprite).max_palettes(), 32);
        assert_eq!(PaletteSection::from(Layer::Foreground).offset(), 0x400);
    }
}
