use pretty_assertions::assert_eq;

use crate::error::DeviceError;
use crate::hardware::ppu::palette::RGB;
use crate::hardware::ppu::register_flags::Layer;
use crate::hardware::ppu::tests::{commit, enabled_ppu, tile, OTHER, OWNER};
use crate::hardware::ppu::tiledata::Tile;
use crate::hardware::ppu::Ppu;

#[test]
fn test_ownership_conflict() {
    let ppu = Ppu::new();
    let session = ppu.enable(OWNER).unwrap();

    assert_eq!(ppu.enable(OTHER).unwrap_err(), DeviceError::OwnershipConflict { owner: OWNER });
    // There is only ever one handle, the owner can't enable twice either.
    assert_eq!(ppu.enable(OWNER).unwrap_err(), DeviceError::OwnershipConflict { owner: OWNER });

    session.disable();
    assert_eq!(ppu.owner(), None);

    let session = ppu.enable(OTHER).unwrap();
    assert_eq!(ppu.owner(), Some(OTHER));
    assert_eq!(session.owner(), OTHER);
}

#[test]
fn test_dropping_session_releases_lock() {
    let ppu = Ppu::new();
    {
        let _session = ppu.enable(OWNER).unwrap();
        assert_eq!(ppu.owner(), Some(OWNER));
    }
    assert_eq!(ppu.owner(), None);
    assert!(ppu.enable(OTHER).is_ok());
}

#[test]
fn test_writes_invisible_until_update() {
    let (ppu, mut session) = enabled_ppu();

    session.set_bgcolor(0x00FF_0000).unwrap();
    session.write_tiles_horizontal(&[tile(5)], Layer::Background, 0, 0, 1).unwrap();

    assert_eq!(ppu.registers().bg_colour, RGB(0, 0, 0));
    assert_eq!(ppu.read_tile(Layer::Background, 0, 0), Tile::default());

    session.update().unwrap();

    assert_eq!(ppu.registers().bg_colour, RGB(0xFF, 0, 0));
    assert_eq!(ppu.read_tile(Layer::Background, 0, 0), tile(5));
    assert_eq!(ppu.commit_count(), 1);
}

#[test]
fn test_busy_until_frame_boundary() {
    let (ppu, mut session) = enabled_ppu();
    assert!(ppu.is_accepting());

    session.update().unwrap();
    assert!(!ppu.is_accepting());
    assert_eq!(session.update(), Err(DeviceError::Busy));

    ppu.frame_boundary();
    assert!(ppu.is_accepting());
    assert_eq!(ppu.frame_count(), 1);
    assert!(session.update().is_ok());
}

#[test]
fn test_busy_writes_have_no_effect() {
    let (ppu, mut session) = enabled_ppu();
    session.update().unwrap();

    assert_eq!(session.set_bgcolor(0x0012_3456), Err(DeviceError::Busy));
    assert_eq!(
        session.write_tiles_horizontal(&[tile(1)], Layer::Background, 0, 0, 1),
        Err(DeviceError::Busy)
    );
    assert_eq!(session.write_vram(&[1, 2, 3], 0x100), Err(DeviceError::Busy));

    ppu.frame_boundary();
    commit(&ppu, &mut session);

    assert_eq!(ppu.registers().bg_colour, RGB(0, 0, 0));
    assert!(ppu.read_vram(0, 0x4000).iter().all(|b| *b == 0));
}

#[test]
#[should_panic(expected = "outside of [0, 63]")]
fn test_invalid_argument_is_fatal_even_when_busy() {
    let (_ppu, mut session) = enabled_ppu();
    session.update().unwrap();
    let _ = session.write_tiles_vertical(&[tile(1)], Layer::Background, 0, 99, 1);
}

#[test]
fn test_writes_accumulate_into_one_commit() {
    let (ppu, mut session) = enabled_ppu();

    session.set_bgcolor(0x0000_FF00).unwrap();
    session.write_tiles_vertical(&[tile(3)], Layer::Foreground, 1, 1, 1).unwrap();
    session.set_scroll(Layer::Background, 16, 0).unwrap();
    session.set_bgcolor(0x0000_00FF).unwrap();
    session.update().unwrap();

    assert_eq!(ppu.commit_count(), 1);
    assert_eq!(ppu.registers().bg_colour, RGB(0, 0, 0xFF));
    assert_eq!(ppu.registers().scroll(Layer::Background), (16, 0));
    assert_eq!(ppu.read_tile(Layer::Foreground, 1, 1), tile(3));
}

#[test]
fn test_empty_update_keeps_vram() {
    let (ppu, mut session) = enabled_ppu();
    session.write_vram(&[9; 16], 0x4000).unwrap();
    commit(&ppu, &mut session);
    let before = ppu.snapshot();

    session.update().unwrap();

    let after = ppu.snapshot();
    assert_eq!(after.vram, before.vram);
    assert_eq!(after.registers, before.registers);
    assert_eq!(ppu.commit_count(), 1);
    assert!(!ppu.is_accepting());
}

#[test]
fn test_disable_discards_uncommitted_writes() {
    let (ppu, mut session) = enabled_ppu();
    session.set_bgcolor(0x00AB_CDEF).unwrap();
    session.disable();

    let mut session = ppu.enable(OTHER).unwrap();
    session.update().unwrap();

    assert_eq!(ppu.registers().bg_colour, RGB(0, 0, 0));
}

#[test]
fn test_committed_frame_survives_owner_change() {
    let (ppu, mut session) = enabled_ppu();
    session.write_tiles_horizontal(&[tile(9)], Layer::Foreground, 3, 3, 1).unwrap();
    commit(&ppu, &mut session);
    session.disable();

    let mut session = ppu.enable(OTHER).unwrap();
    session.set_bgcolor(0x0000_0001).unwrap();
    session.update().unwrap();

    assert_eq!(ppu.read_tile(Layer::Foreground, 3, 3), tile(9));
}
