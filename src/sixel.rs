//! Encoding an RGBA canvas as a sixel terminal escape sequence.
//!
//! The pipeline is the classic one: median-cut palette quantization to at
//! most 256 colors, Floyd-Steinberg error diffusion onto that palette, then
//! band encoding six rows at a time with run-length compression. Nothing is
//! written until the whole canvas has been encoded.

use std::collections::HashMap;
use std::io::Write;

use image::RgbaImage;

use crate::error::{PreviewError, Result};

/// Sixel palettes hold at most 256 registers.
pub const MAX_COLORS: usize = 256;

/// Encode a full canvas into a self-contained sixel sequence
/// (DCS introducer through string terminator). Output is ASCII-safe.
pub fn encode(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return Err(PreviewError::InvalidGeometry(format!(
            "cannot encode a {} x {} canvas",
            w, h
        )));
    }
    let palette = build_palette(canvas);
    let indexed = dither(canvas, &palette);
    Ok(emit(&palette, &indexed, w as usize, h as usize))
}

/// Reduce the canvas colors to a palette of at most [`MAX_COLORS`] entries
/// using median cut over the color histogram. Small histograms are kept
/// as-is (sorted, for deterministic register numbering).
fn build_palette(canvas: &RgbaImage) -> Vec<[u8; 3]> {
    let mut hist: HashMap<[u8; 3], u32> = HashMap::new();
    for p in canvas.pixels() {
        *hist.entry([p[0], p[1], p[2]]).or_insert(0) += 1;
    }
    if hist.len() <= MAX_COLORS {
        let mut colors: Vec<[u8; 3]> = hist.keys().copied().collect();
        colors.sort_unstable();
        return colors;
    }

    let mut first: Vec<([u8; 3], u32)> = hist.into_iter().collect();
    first.sort_unstable();
    let mut boxes: Vec<Vec<([u8; 3], u32)>> = vec![first];
    while boxes.len() < MAX_COLORS {
        // split the box with the widest channel range at its population median
        let mut widest: Option<(usize, usize)> = None;
        let mut widest_range = 0u32;
        for (i, b) in boxes.iter().enumerate() {
            if b.len() < 2 {
                continue;
            }
            for chan in 0..3 {
                let lo = b.iter().map(|&(c, _)| c[chan]).min().unwrap_or(0);
                let hi = b.iter().map(|&(c, _)| c[chan]).max().unwrap_or(0);
                let range = (hi - lo) as u32;
                if range > widest_range {
                    widest_range = range;
                    widest = Some((i, chan));
                }
            }
        }
        let Some((i, chan)) = widest else { break };
        let mut b = boxes.swap_remove(i);
        b.sort_unstable_by_key(|&(c, _)| (c[chan], c));
        let total: u64 = b.iter().map(|&(_, n)| n as u64).sum();
        let mut acc = 0u64;
        let mut split = b.len() - 1;
        for (j, &(_, n)) in b.iter().enumerate() {
            acc += n as u64;
            if acc * 2 >= total {
                split = j + 1;
                break;
            }
        }
        let split = split.clamp(1, b.len() - 1);
        let right = b.split_off(split);
        boxes.push(b);
        boxes.push(right);
    }

    let mut palette: Vec<[u8; 3]> = boxes
        .iter()
        .map(|b| {
            let total: u64 = b.iter().map(|&(_, n)| n as u64).sum();
            let mut sum = [0u64; 3];
            for &(c, n) in b {
                for chan in 0..3 {
                    sum[chan] += c[chan] as u64 * n as u64;
                }
            }
            [
                (sum[0] / total) as u8,
                (sum[1] / total) as u8,
                (sum[2] / total) as u8,
            ]
        })
        .collect();
    palette.sort_unstable();
    palette.dedup();
    palette
}

fn nearest(palette: &[[u8; 3]], c: [u8; 3]) -> u8 {
    let mut best = 0usize;
    let mut best_d = u32::MAX;
    for (i, p) in palette.iter().enumerate() {
        let d = (0..3).fold(0u32, |acc, chan| {
            let delta = p[chan] as i32 - c[chan] as i32;
            acc + (delta * delta) as u32
        });
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best as u8
}

/// Map every pixel to a palette register with Floyd-Steinberg diffusion
/// (7/16 right, 3/16 down-left, 5/16 down, 1/16 down-right).
fn dither(canvas: &RgbaImage, palette: &[[u8; 3]]) -> Vec<u8> {
    let (w, h) = canvas.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut err = vec![[0f32; 3]; w * h];
    let mut out = vec![0u8; w * h];
    let mut cache: HashMap<[u8; 3], u8> = HashMap::new();

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let p = canvas.get_pixel(x as u32, y as u32);
            let want = [
                (p[0] as f32 + err[i][0]).clamp(0.0, 255.0),
                (p[1] as f32 + err[i][1]).clamp(0.0, 255.0),
                (p[2] as f32 + err[i][2]).clamp(0.0, 255.0),
            ];
            let key = [
                want[0].round() as u8,
                want[1].round() as u8,
                want[2].round() as u8,
            ];
            let idx = *cache
                .entry(key)
                .or_insert_with(|| nearest(palette, key));
            out[i] = idx;

            let chosen = palette[idx as usize];
            let e = [
                want[0] - chosen[0] as f32,
                want[1] - chosen[1] as f32,
                want[2] - chosen[2] as f32,
            ];
            let mut spread = |target: usize, weight: f32| {
                for chan in 0..3 {
                    err[target][chan] += e[chan] * weight;
                }
            };
            if x + 1 < w {
                spread(i + 1, 7.0 / 16.0);
            }
            if y + 1 < h {
                if x > 0 {
                    spread(i + w - 1, 3.0 / 16.0);
                }
                spread(i + w, 5.0 / 16.0);
                if x + 1 < w {
                    spread(i + w + 1, 1.0 / 16.0);
                }
            }
        }
    }
    out
}

fn to_percent(v: u8) -> u32 {
    (v as u32 * 100 + 127) / 255
}

fn flush_run(out: &mut Vec<u8>, ch: u8, len: usize) {
    if len == 0 {
        return;
    }
    if len >= 4 {
        let _ = write!(out, "!{}", len);
        out.push(ch);
    } else {
        for _ in 0..len {
            out.push(ch);
        }
    }
}

/// Serialize palette and indexed pixels as sixel bands.
fn emit(palette: &[[u8; 3]], indexed: &[u8], w: usize, h: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(w * h / 4 + 1024);
    out.extend_from_slice(b"\x1bP0;0;8q");
    let _ = write!(out, "\"1;1;{};{}", w, h);
    for (i, c) in palette.iter().enumerate() {
        let _ = write!(
            out,
            "#{};2;{};{};{}",
            i,
            to_percent(c[0]),
            to_percent(c[1]),
            to_percent(c[2])
        );
    }

    let bands = (h + 5) / 6;
    for band in 0..bands {
        let top = band * 6;
        let rows = (h - top).min(6);
        let mut present = vec![false; palette.len()];
        for r in 0..rows {
            for x in 0..w {
                present[indexed[(top + r) * w + x] as usize] = true;
            }
        }

        let mut first = true;
        for (color, seen) in present.iter().enumerate() {
            if !seen {
                continue;
            }
            if !first {
                // carriage return: next color overprints the same band
                out.push(b'$');
            }
            first = false;
            let _ = write!(out, "#{}", color);

            let mut run_char = 0u8;
            let mut run_len = 0usize;
            for x in 0..w {
                let mut mask = 0u8;
                for r in 0..rows {
                    if indexed[(top + r) * w + x] as usize == color {
                        mask |= 1 << r;
                    }
                }
                let ch = b'?' + mask;
                if ch == run_char {
                    run_len += 1;
                } else {
                    flush_run(&mut out, run_char, run_len);
                    run_char = ch;
                    run_len = 1;
                }
            }
            // a trailing run of empty sixels carries no pixels, drop it
            if run_char != b'?' {
                flush_run(&mut out, run_char, run_len);
            }
        }
        if band + 1 < bands {
            out.push(b'-');
        }
    }
    out.extend_from_slice(b"\x1b\\");
    out
}
