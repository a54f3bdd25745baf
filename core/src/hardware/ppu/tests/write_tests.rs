use pretty_assertions::assert_eq;

use crate::hardware::ppu::memory_binds::*;
use crate::hardware::ppu::palette::{Palette, PaletteSection, RGB};
use crate::hardware::ppu::register_flags::{Layer, LayerFlags};
use crate::hardware::ppu::sprite::{RenderPriority, Sprite};
use crate::hardware::ppu::tests::{commit, enabled_ppu, row, tile};
use crate::hardware::ppu::tiledata::{pattern_address, Mirror, Pattern, Tile};

#[test]
fn test_horizontal_write_wraps_in_same_row() {
    let (ppu, mut session) = enabled_ppu();
    let tiles = [tile(1), tile(2), tile(3)];

    session.write_tiles_horizontal(&tiles, Layer::Background, 60, 5, 70).unwrap();
    commit(&ppu, &mut session);

    let written = row(&ppu, Layer::Background, 5);
    // Count is clamped to 64, so every column of the row is written exactly once.
    for i in 0..64 {
        assert_eq!(written[(60 + i) % 64], tiles[i % 3], "column {}", (60 + i) % 64);
    }
    assert!(row(&ppu, Layer::Background, 6).iter().all(|t| *t == Tile::default()));
    assert!(row(&ppu, Layer::Background, 4).iter().all(|t| *t == Tile::default()));
}

#[test]
fn test_horizontal_write_repeats_short_input() {
    let (ppu, mut session) = enabled_ppu();

    session
        .write_tiles_horizontal(&[tile(7), tile(8)], Layer::Foreground, 62, 63, 5)
        .unwrap();
    commit(&ppu, &mut session);

    let written = row(&ppu, Layer::Foreground, 63);
    assert_eq!(&written[62..], &[tile(7), tile(8)]);
    assert_eq!(&written[..4], &[tile(7), tile(8), tile(7), Tile::default()]);
    // Background is a separate section of Tile RAM.
    assert_eq!(ppu.read_tile(Layer::Background, 62, 63), Tile::default());
}

#[test]
fn test_vertical_write_wraps_in_same_column() {
    let (ppu, mut session) = enabled_ppu();

    session.write_tiles_vertical(&[tile(4)], Layer::Background, 10, 62, 3).unwrap();
    commit(&ppu, &mut session);

    assert_eq!(ppu.read_tile(Layer::Background, 10, 62), tile(4));
    assert_eq!(ppu.read_tile(Layer::Background, 10, 63), tile(4));
    assert_eq!(ppu.read_tile(Layer::Background, 10, 0), tile(4));
    assert_eq!(ppu.read_tile(Layer::Background, 10, 1), Tile::default());
    assert_eq!(ppu.read_tile(Layer::Background, 11, 0), Tile::default());
}

#[test]
fn test_horizontal_and_vertical_agree() {
    let (ppu, mut session) = enabled_ppu();
    let tiles: Vec<Tile> = (0..64).map(tile).collect();

    for y in 0..64 {
        session.write_tiles_horizontal(&tiles, Layer::Background, 0, y, 64).unwrap();
    }
    for x in 0..64 {
        let column: Vec<Tile> = (0..64).map(|_| tiles[x]).collect();
        session.write_tiles_vertical(&column, Layer::Foreground, x, 0, 64).unwrap();
    }
    commit(&ppu, &mut session);

    assert_eq!(
        ppu.read_vram(TILERAM_BGOFFSET, 0x2000),
        ppu.read_vram(TILERAM_FGOFFSET, 0x2000)
    );
}

#[test]
fn test_zero_count_writes_nothing() {
    let (ppu, mut session) = enabled_ppu();

    session.write_tiles_horizontal(&[], Layer::Background, 0, 0, 0).unwrap();
    commit(&ppu, &mut session);

    assert!(ppu.read_vram(0, 0x4000).iter().all(|b| *b == 0));
}

#[test]
#[should_panic(expected = "empty buffer")]
fn test_empty_tiles_with_count_is_fatal() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.write_tiles_horizontal(&[], Layer::Background, 0, 0, 1);
}

#[test]
#[should_panic(expected = "LAYER_BG or LAYER_FG")]
fn test_tiles_on_sprite_layer_are_fatal() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.write_tiles_vertical(&[tile(0)], Layer::Sprite, 0, 0, 1);
}

#[test]
#[should_panic(expected = "outside of [0, 63]")]
fn test_tile_position_is_checked() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.write_tiles_horizontal(&[tile(0)], Layer::Background, 64, 0, 1);
}

#[test]
fn test_pattern_block_wraps_to_next_row() {
    let (ppu, mut session) = enabled_ppu();
    let patterns = [Pattern::filled(1), Pattern::filled(2)];

    session.write_pattern(&patterns, 2, 1, pattern_address(31, 0)).unwrap();
    commit(&ppu, &mut session);

    assert_eq!(ppu.read_pattern(pattern_address(31, 0)), patterns[0]);
    assert_eq!(ppu.read_pattern(pattern_address(0, 1)), patterns[1]);
    assert_eq!(ppu.read_pattern(pattern_address(0, 0)), Pattern::default());
}

#[test]
fn test_pattern_block_wraps_past_end_of_pattern_ram() {
    let (ppu, mut session) = enabled_ppu();
    let patterns: Vec<Pattern> = (1..=4).map(Pattern::filled).collect();

    session.write_pattern(&patterns, 2, 2, pattern_address(31, 31)).unwrap();
    commit(&ppu, &mut session);

    assert_eq!(ppu.read_pattern(pattern_address(31, 31)), patterns[0]);
    assert_eq!(ppu.read_pattern(pattern_address(0, 0)), patterns[1]);
    assert_eq!(ppu.read_pattern(pattern_address(31, 0)), patterns[2]);
    assert_eq!(ppu.read_pattern(pattern_address(0, 1)), patterns[3]);
}

#[test]
#[should_panic(expected = "needs more than the 3 patterns")]
fn test_short_pattern_block_is_fatal() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.write_pattern(&[Pattern::default(); 3], 2, 2, pattern_address(0, 0));
}

#[test]
#[should_panic(expected = "needs more than the 1 patterns")]
fn test_huge_pattern_block_does_not_wrap() {
    let (_ppu, mut session) = enabled_ppu();
    // usize::MAX * 2 wraps to usize::MAX - 1 without the overflow check.
    let _ = session.write_pattern(&[Pattern::default()], usize::MAX, 2, pattern_address(0, 0));
}

#[test]
fn test_palette_sections() {
    let (ppu, mut session) = enabled_ppu();
    let mut palette = Palette::default();
    palette.colours[0] = RGB(0xFF, 0, 0);
    palette.colours[14] = RGB(0, 0, 0xFF);

    session.write_palette(&palette, Layer::Foreground, 15).unwrap();
    session.write_palette(&palette, Layer::Sprite, 31).unwrap();
    commit(&ppu, &mut session);

    assert_eq!(ppu.read_palette(PaletteSection::Foreground, 15), palette);
    assert_eq!(ppu.read_palette(PaletteSection::Sprite, 31), palette);
    assert_eq!(ppu.read_palette(PaletteSection::Background, 15), Palette::default());
}

#[test]
#[should_panic(expected = "out of bounds for the Background section")]
fn test_tile_layer_palette_range() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.write_palette(&Palette::default(), Layer::Background, 16);
}

#[test]
fn test_sprite_roundtrip() {
    let (ppu, mut session) = enabled_ppu();
    let sprites = [
        Sprite {
            pattern_addr: pattern_address(3, 4),
            palette_id: 17,
            mirror: Mirror::Y,
            priority: RenderPriority::Front,
            x: 300,
            y: 200,
            width: 2,
            height: 4,
        },
        Sprite {
            x: 511,
            y: 255,
            ..Sprite::default()
        },
    ];

    session.write_sprites(&sprites, 62).unwrap();
    commit(&ppu, &mut session);

    assert_eq!(ppu.read_sprite(62), sprites[0]);
    assert_eq!(ppu.read_sprite(63), sprites[1]);
}

#[test]
#[should_panic(expected = "run past")]
fn test_sprite_slots_are_checked() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.write_sprites(&[Sprite::default(); 2], 63);
}

#[test]
#[should_panic(expected = "run past the 64 Sprite RAM entries")]
fn test_huge_sprite_slot_does_not_wrap() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.write_sprites(&[Sprite::default()], usize::MAX);
}

#[test]
fn test_rejected_sprite_write_leaves_vram_alone() {
    let (ppu, mut session) = enabled_ppu();
    let last = Sprite {
        x: 100,
        ..Sprite::default()
    };
    session.write_sprites(&[last], 63).unwrap();
    commit(&ppu, &mut session);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = session.write_sprites(&[Sprite { x: 7, ..Sprite::default() }], usize::MAX);
    }));
    assert!(result.is_err());

    session.update().unwrap();
    assert_eq!(ppu.read_sprite(63), last);
}

#[test]
fn test_registers() {
    let (ppu, mut session) = enabled_ppu();

    session.set_bgcolor(0xAB12_3456).unwrap();
    session.set_scroll(Layer::Foreground, 511, 3).unwrap();
    session.set_layer_enable(0xF5).unwrap();
    commit(&ppu, &mut session);

    let registers = ppu.registers();
    assert_eq!(registers.bg_colour, RGB(0x12, 0x34, 0x56));
    assert_eq!(registers.scroll(Layer::Foreground), (511, 3));
    assert_eq!(registers.scroll(Layer::Background), (0, 0));
    assert_eq!(registers.layers, LayerFlags::BG | LayerFlags::SPR);
}

#[test]
#[should_panic(expected = "doesn't support scrolling")]
fn test_sprite_layer_cannot_scroll() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.set_scroll(Layer::Sprite, 0, 0);
}

#[test]
#[should_panic(expected = "exceeds the 0x10000 byte region")]
fn test_raw_write_bounds() {
    let (_ppu, mut session) = enabled_ppu();
    let _ = session.write_vram(&[0; 2], VRAM_SIZE - 1);
}

#[test]
fn test_raw_write_reaches_last_byte() {
    let (ppu, mut session) = enabled_ppu();

    session.write_vram(&[0xAA, 0xBB], VRAM_SIZE - 2).unwrap();
    commit(&ppu, &mut session);

    assert_eq!(ppu.read_vram(VRAM_SIZE - 2, 2), vec![0xAA, 0xBB]);
}
