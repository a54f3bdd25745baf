//! Loaders for the plain text asset formats produced by the art tools.
//!
//! * `.tilemap`: entries `(PPP,P,M)` in hex (pattern address, palette id, mirror), separated
//!   by spaces or newlines.
//! * `.pattern`: `height * 8` lines of `width * 8` hex digits, one digit per pixel.
//! * `.palette`: 15 lines of `RRGGBB`.
use std::fs::read_to_string;
use std::path::Path;

use crate::error::AssetError;
use crate::hardware::ppu::memory_binds::{
    PALETTE_COLOURS, PATTERN_COUNT, TILELAYER_MAX_PALETTES, TILEPATTERN_HEIGHT,
};
use crate::hardware::ppu::palette::{Palette, RGB};
use crate::hardware::ppu::tiledata::{make_tile, Mirror, Pattern, PatternAddress, Tile};

const PATTERN_WIDTH: usize = 8;

/// Parses the first `len` tile entries of a tilemap.
pub fn load_tilemap(text: &str, len: usize) -> Result<Vec<Tile>, AssetError> {
    let mut result = Vec::with_capacity(len);

    'lines: for (index, line) in text.lines().enumerate() {
        for entry in line.split_whitespace() {
            if result.len() == len {
                break 'lines;
            }
            result.push(parse_tile(index + 1, entry)?);
        }
    }

    if result.len() < len {
        return Err(AssetError::Length {
            what: "tiles",
            expected: len,
            found: result.len(),
        });
    }
    Ok(result)
}

/// Parses a block of `width` x `height` patterns, returned row by row.
pub fn load_pattern(text: &str, width: usize, height: usize) -> Result<Vec<Pattern>, AssetError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();
    let expected_lines = height * TILEPATTERN_HEIGHT;
    if lines.len() != expected_lines {
        return Err(AssetError::Length {
            what: "pattern lines",
            expected: expected_lines,
            found: lines.len(),
        });
    }

    let mut result = vec![Pattern::default(); width * height];
    for (row, (line_number, line)) in lines.into_iter().enumerate() {
        let digits = line.chars().count();
        if digits != width * PATTERN_WIDTH {
            return Err(AssetError::parse(
                line_number,
                format!("expected {} pixels, found {}", width * PATTERN_WIDTH, digits),
            ));
        }

        for (column, digit) in line.chars().enumerate() {
            let value = digit
                .to_digit(16)
                .ok_or_else(|| AssetError::parse(line_number, format!("invalid pixel {:?}", digit)))?;
            let pattern = (row / TILEPATTERN_HEIGHT) * width + column / PATTERN_WIDTH;
            result[pattern].set_pixel(column % PATTERN_WIDTH, row % TILEPATTERN_HEIGHT, value as u8);
        }
    }
    Ok(result)
}

pub fn load_palette(text: &str) -> Result<Palette, AssetError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();
    if lines.len() != PALETTE_COLOURS {
        return Err(AssetError::Length {
            what: "palette colours",
            expected: PALETTE_COLOURS,
            found: lines.len(),
        });
    }

    let mut palette = Palette::default();
    for (colour, (line_number, line)) in palette.colours.iter_mut().zip(lines) {
        if line.len() != 6 {
            return Err(AssetError::parse(line_number, format!("expected RRGGBB, found {:?}", line)));
        }
        let value = u32::from_str_radix(line, 16)
            .map_err(|e| AssetError::parse(line_number, format!("invalid colour {:?}: {}", line, e)))?;
        *colour = RGB::from_u32(value);
    }
    Ok(palette)
}

pub fn load_tilemap_file(path: impl AsRef<Path>, len: usize) -> Result<Vec<Tile>, AssetError> {
    load_tilemap(&read_asset(path)?, len)
}

pub fn load_pattern_file(path: impl AsRef<Path>, width: usize, height: usize) -> Result<Vec<Pattern>, AssetError> {
    load_pattern(&read_asset(path)?, width, height)
}

pub fn load_palette_file(path: impl AsRef<Path>) -> Result<Palette, AssetError> {
    load_palette(&read_asset(path)?)
}

fn read_asset(path: impl AsRef<Path>) -> Result<String, AssetError> {
    let path = path.as_ref();
    log::debug!("Loading asset {:?}", path);
    read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_tile(line: usize, entry: &str) -> Result<Tile, AssetError> {
    let fields: Vec<&str> = entry
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| AssetError::parse(line, format!("malformed tile entry {:?}", entry)))?
        .split(',')
        .collect();
    if fields.len() != 3 {
        return Err(AssetError::parse(line, format!("expected 3 fields in {:?}", entry)));
    }

    let field = |index: usize, name: &str| {
        u16::from_str_radix(fields[index], 16)
            .map_err(|e| AssetError::parse(line, format!("invalid {} in {:?}: {}", name, entry, e)))
    };
    let pattern = field(0, "pattern address")?;
    let palette_id = field(1, "palette id")?;
    let mirror = field(2, "mirror")?;

    if pattern as usize >= PATTERN_COUNT {
        return Err(AssetError::parse(line, format!("pattern address {:#X} out of range", pattern)));
    }
    if palette_id as usize >= TILELAYER_MAX_PALETTES {
        return Err(AssetError::parse(line, format!("palette id {:#X} out of range", palette_id)));
    }
    if mirror > 3 {
        return Err(AssetError::parse(line, format!("mirror {} out of range", mirror)));
    }

    Ok(make_tile(
        PatternAddress::new(pattern),
        palette_id as u8,
        Mirror::from_bits(mirror as u32),
    ))
}
