use pretty_assertions::assert_eq;

use crate::hardware::ppu::memory_binds::VRAM_SIZE;
use crate::hardware::ppu::palette::PaletteSection;
use crate::hardware::ppu::register_flags::Layer;
use crate::hardware::ppu::tests::{commit, enabled_ppu, tile};
use crate::hardware::ppu::Ppu;

#[test]
fn test_reads_at_the_edges() {
    let (ppu, mut session) = enabled_ppu();
    session.write_tiles_horizontal(&[tile(5)], Layer::Foreground, 63, 63, 1).unwrap();
    commit(&ppu, &mut session);

    assert_eq!(ppu.read_tile(Layer::Foreground, 63, 63), tile(5));
    assert_eq!(ppu.read_vram(VRAM_SIZE - 4, 4).len(), 4);
    assert_eq!(ppu.read_vram(VRAM_SIZE, 0), Vec::<u8>::new());
    let _ = ppu.read_palette(PaletteSection::Sprite, 31);
    let _ = ppu.read_sprite(63);
}

#[test]
#[should_panic(expected = "Tile position (64, 0) outside of [0, 63]")]
fn test_tile_read_does_not_alias_next_row() {
    let (ppu, mut session) = enabled_ppu();
    session.write_tiles_horizontal(&[tile(5)], Layer::Background, 0, 1, 1).unwrap();
    commit(&ppu, &mut session);

    ppu.read_tile(Layer::Background, 64, 0);
}

#[test]
#[should_panic(expected = "1 sprites from slot 64")]
fn test_sprite_read_past_last_slot() {
    Ppu::new().read_sprite(64);
}

#[test]
#[should_panic(expected = "out of bounds for the Sprite section")]
fn test_sprite_palette_read_range() {
    Ppu::new().read_palette(PaletteSection::Sprite, 40);
}

#[test]
#[should_panic(expected = "out of bounds for the Foreground section")]
fn test_tile_palette_read_range() {
    Ppu::new().read_palette(PaletteSection::Foreground, 16);
}

#[test]
#[should_panic(expected = "exceeds the 0x10000 byte region")]
fn test_vram_read_bounds() {
    Ppu::new().read_vram(VRAM_SIZE - 1, 2);
}

#[test]
#[should_panic(expected = "exceeds the 0x10000 byte region")]
fn test_vram_read_length_overflow() {
    Ppu::new().read_vram(1, usize::MAX);
}
