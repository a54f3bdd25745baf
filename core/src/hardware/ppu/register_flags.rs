use bitflags::*;

use crate::hardware::ppu::memory_binds::{TILERAM_BGOFFSET, TILERAM_FGOFFSET};

/// One of the three render layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Layer {
    Background = 1,
    Foreground = 2,
    Sprite = 4,
}

impl Layer {
    /// Byte offset of this layer's Tile RAM section.
    ///
    /// Only the two tile layers own Tile RAM, asking for the sprite layer is fatal.
    pub fn tile_ram_offset(self) -> usize {
        match self {
            Layer::Background => TILERAM_BGOFFSET,
            Layer::Foreground => TILERAM_FGOFFSET,
            Layer::Sprite => invalid_argument!("The sprite layer has no Tile RAM, use LAYER_BG or LAYER_FG"),
        }
    }

    pub fn flag(self) -> LayerFlags {
        LayerFlags::from_bits_truncate(self as u8)
    }
}

bitflags! {
    /// Layer enable mask.
    /// Bit 0: background tile layer, bit 1: foreground tile layer, bit 2: sprite layer.
    #[derive(Default)]
    pub struct LayerFlags: u8 {
        const BG  = 0b0000_0001;
        const FG  = 0b0000_0010;
        const SPR = 0b0000_0100;
    }
}

impl LayerFlags {
    /// Any higher order bits of the mask are ignored.
    pub fn from_mask(mask: u32) -> Self {
        LayerFlags::from_bits_truncate((mask & 0x7) as u8)
    }
}
