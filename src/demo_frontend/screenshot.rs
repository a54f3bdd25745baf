use std::path::Path;

use anyhow::{anyhow, Context};
use blake2::{Blake2s, Digest};
use fpgame_core::hardware::ppu::composition::render_frame;
use fpgame_core::hardware::ppu::memory_binds::{SCREEN_HEIGHT, SCREEN_WIDTH};
use fpgame_core::hardware::ppu::FrameView;
use image::ImageBuffer;

fn frame_pixels(view: &FrameView) -> Vec<u8> {
    let frame = render_frame(view);
    let mut result = vec![0u8; frame.len() * 3];

    for (i, colour) in frame.iter().enumerate() {
        let offset = i * 3;
        result[offset] = colour.0;
        result[offset + 1] = colour.1;
        result[offset + 2] = colour.2;
    }
    result
}

pub fn save(view: &FrameView, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let buffer: ImageBuffer<image::Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, frame_pixels(view))
            .ok_or_else(|| anyhow!("Frame does not fit a {}x{} image", SCREEN_WIDTH, SCREEN_HEIGHT))?;

    buffer
        .save(path.as_ref())
        .with_context(|| format!("Failed to save screenshot to {:?}", path.as_ref()))
}

/// Blake2s hash of the composed frame, to compare runs without keeping images around.
pub fn digest(view: &FrameView) -> String {
    let mut hasher = Blake2s::new();
    hasher.update(&frame_pixels(view));
    format!("{:x}", hasher.finalize())
}
