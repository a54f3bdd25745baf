pub mod apu;
pub mod lock;
pub mod ppu;
