use std::fmt;

use crate::hardware::ppu::memory_binds::VRAM_SIZE;

/// The unified 64 KiB video memory region.
///
/// This is a plain byte store, the section layout lives in `memory_binds`.
#[derive(Clone, PartialEq, Eq)]
pub struct Vram {
    memory: Box<[u8]>,
}

impl Vram {
    pub fn new() -> Self {
        Vram {
            memory: vec![0u8; VRAM_SIZE].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn read_byte(&self, offset: usize) -> u8 {
        self.memory[offset]
    }

    #[inline]
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.memory[offset..offset + len]
    }

    #[inline]
    pub fn write_bytes(&mut self, offset: usize, values: &[u8]) {
        self.memory[offset..offset + values.len()].copy_from_slice(values);
    }

    pub fn read_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.memory[offset], self.memory[offset + 1]])
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) {
        self.write_bytes(offset, &value.to_le_bytes());
    }

    pub fn read_u32(&self, offset: usize) -> u32 {
        let b = self.bytes(offset, 4);
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.write_bytes(offset, &value.to_le_bytes());
    }

    /// Overwrite the entire region with the contents of `other`.
    pub fn copy_from(&mut self, other: &Vram) {
        self.memory.copy_from_slice(&other.memory);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }
}

impl Default for Vram {
    fn default() -> Self {
        Vram::new()
    }
}

impl fmt::Debug for Vram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.memory.iter().filter(|b| **b != 0).count();
        f.debug_struct("Vram")
            .field("size", &self.memory.len())
            .field("non_zero_bytes", &used)
            .finish()
    }
}
