//! Minimal bitmap-font text drawing for the canvas panels.

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};

/// Glyph cell width/height in the 8x8 base font.
pub const GLYPH: u32 = 8;

/// Blit one line of ASCII text onto the canvas at (x, y), top-left anchored.
/// Non-ASCII characters and pixels outside the canvas are skipped.
pub fn draw_text(canvas: &mut RgbaImage, text: &str, x: i64, y: i64, scale: u32, color: Rgba<u8>) {
    let (w, h) = canvas.dimensions();
    let mut pen_x = x;
    for ch in text.chars() {
        let idx = ch as usize;
        if idx < BASIC_LEGACY.len() {
            let glyph = BASIC_LEGACY[idx];
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = pen_x + (col * scale + dx) as i64;
                            let py = y + (row as u32 * scale + dy) as i64;
                            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                                canvas.put_pixel(px as u32, py as u32, color);
                            }
                        }
                    }
                }
            }
        }
        pen_x += (GLYPH * scale) as i64;
    }
}

/// Blit a multi-line block, top/left aligned, with a one-pixel-per-scale
/// leading between lines.
pub fn draw_block(canvas: &mut RgbaImage, text: &str, x: i64, y: i64, scale: u32, color: Rgba<u8>) {
    let line_height = ((GLYPH + 1) * scale) as i64;
    for (i, line) in text.lines().enumerate() {
        draw_text(canvas, line, x, y + i as i64 * line_height, scale, color);
    }
}
