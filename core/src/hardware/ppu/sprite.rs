use crate::hardware::ppu::memory_binds::{SPRITE_MAX_SIZE, SPRITE_MAX_X, SPRITE_MAX_Y, SPRLAYER_MAX_PALETTES};
use crate::hardware::ppu::tiledata::{Mirror, PatternAddress};

/// Rendering priority of a sprite relative to the two tile layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderPriority {
    /// Behind both the background and foreground tile layers.
    Back = 0,
    /// In front of the background but behind the foreground tile layer.
    Middle = 1,
    /// In front of both tile layers.
    Front = 2,
}

impl RenderPriority {
    fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => RenderPriority::Back,
            1 => RenderPriority::Middle,
            _ => RenderPriority::Front,
        }
    }
}

impl Default for RenderPriority {
    fn default() -> Self {
        RenderPriority::Back
    }
}

/// A sprite entry as written to Sprite RAM.
///
/// The main word holds `[8:0]` x, `[16:9]` y, `[26:17]` pattern address, `[28:27]` mirror,
/// `[30:29]` priority. The extra word holds `[4:0]` palette id, `[6:5]` width - 1 and
/// `[8:7]` height - 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Sprite {
    /// Top-left pattern of this sprite, the remaining patterns follow right and down.
    pub pattern_addr: PatternAddress,
    pub palette_id: u8,
    pub mirror: Mirror,
    pub priority: RenderPriority,
    /// x coordinate relative to the top-left of the screen, `[0, 511]`.
    pub x: u16,
    /// y coordinate relative to the top-left of the screen, `[0, 255]`.
    pub y: u16,
    /// Width in 8x8 tiles, `[1, 4]`.
    pub width: u8,
    /// Height in 8x8 tiles, `[1, 4]`.
    pub height: u8,
}

impl Default for Sprite {
    fn default() -> Self {
        Sprite {
            pattern_addr: PatternAddress::default(),
            palette_id: 0,
            mirror: Mirror::None,
            priority: RenderPriority::Back,
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        }
    }
}

impl Sprite {
    /// Fatal if any field lies outside of its documented range.
    pub fn validate(&self) {
        if self.palette_id as usize >= SPRLAYER_MAX_PALETTES {
            invalid_argument!(
                "Sprite palette id {} exceeds the sprite maximum of {}",
                self.palette_id,
                SPRLAYER_MAX_PALETTES
            );
        }
        if self.x > SPRITE_MAX_X || self.y > SPRITE_MAX_Y {
            invalid_argument!("Sprite position ({}, {}) outside of [0, 511]x[0, 255]", self.x, self.y);
        }
        if !(1..=SPRITE_MAX_SIZE).contains(&self.width) || !(1..=SPRITE_MAX_SIZE).contains(&self.height) {
            invalid_argument!("Sprite size {}x{} outside of [1, 4] tiles", self.width, self.height);
        }
    }

    pub fn main_word(&self) -> u32 {
        (self.x as u32 & 0x1FF)
            | ((self.y as u32 & 0xFF) << 9)
            | ((self.pattern_addr.value() as u32 & 0x3FF) << 17)
            | ((self.mirror as u32) << 27)
            | ((self.priority as u32) << 29)
    }

    pub fn extra_word(&self) -> u32 {
        (self.palette_id as u32 & 0x1F)
            | (((self.width as u32 - 1) & 0x3) << 5)
            | (((self.height as u32 - 1) & 0x3) << 7)
    }

    pub fn from_words(main: u32, extra: u32) -> Self {
        Sprite {
            pattern_addr: PatternAddress::new(((main >> 17) & 0x3FF) as u16),
            palette_id: (extra & 0x1F) as u8,
            mirror: Mirror::from_bits(main >> 27),
            priority: RenderPriority::from_bits(main >> 29),
            x: (main & 0x1FF) as u16,
            y: ((main >> 9) & 0xFF) as u16,
            width: (((extra >> 5) & 0x3) + 1) as u8,
            height: (((extra >> 7) & 0x3) + 1) as u8,
        }
    }

    /// Whether the screen pixel `(x, y)` lies within this sprite's bounds.
    pub fn covers(&self, x: u16, y: u16) -> bool {
        let width_px = self.width as u16 * 8;
        let height_px = self.height as u16 * 8;
        x >= self.x && x < self.x + width_px && y >= self.y && y < self.y + height_px
    }
}
