use crate::hardware::lock::OwnerId;
use crate::hardware::ppu::register_flags::Layer;
use crate::hardware::ppu::tiledata::{make_tile, pattern_address, Mirror, Tile};
use crate::hardware::ppu::{Ppu, PpuSession};

mod protocol_tests;
mod read_tests;
mod write_tests;

// Common functionality for the tests.

const OWNER: OwnerId = OwnerId::new(1);
const OTHER: OwnerId = OwnerId::new(2);

fn enabled_ppu() -> (Ppu, PpuSession) {
    let ppu = Ppu::new();
    let session = ppu.enable(OWNER).unwrap();
    (ppu, session)
}

/// Commits the pending frame and lets the transfer finish.
fn commit(ppu: &Ppu, session: &mut PpuSession) {
    session.update().unwrap();
    ppu.frame_boundary();
}

fn tile(id: u16) -> Tile {
    make_tile(pattern_address(id % 32, id / 32), 0, Mirror::None)
}

fn row(ppu: &Ppu, layer: Layer, y: usize) -> Vec<Tile> {
    (0..64).map(|x| ppu.read_tile(layer, x, y)).collect()
}
