//! Compositing slices, crosshairs and metadata into one raster canvas.

use image::{imageops, DynamicImage, Rgba, RgbaImage};
use ndarray::Array2;

use crate::error::{PreviewError, Result};
use crate::font;
use crate::meta;
use crate::orient::OrientationLabels;
use crate::slice::SlicePlanes;
use crate::volume::Volume;

/// Rendering configuration. One value per render, no global state.
#[derive(Debug, Clone)]
pub struct Style {
    pub dpi: u32,
    /// Logical figure size in inches, 5 x 4 like the classic preview layout.
    pub fig_width: f64,
    pub fig_height: f64,
    pub background: Rgba<u8>,
    pub crosshair: Rgba<u8>,
    pub label: Rgba<u8>,
    pub text: Rgba<u8>,
}

impl Default for Style {
    fn default() -> Self {
        Self::new(crate::DEFAULT_DPI)
    }
}

impl Style {
    pub fn new(dpi: u32) -> Self {
        Self {
            dpi,
            fig_width: 5.0,
            fig_height: 4.0,
            background: Rgba([0, 0, 0, 255]),
            crosshair: Rgba([255, 0, 0, 255]),
            label: Rgba([255, 0, 0, 255]),
            text: Rgba([255, 255, 255, 255]),
        }
    }

    /// Canvas size in pixels.
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            (self.fig_width * self.dpi as f64).round() as u32,
            (self.fig_height * self.dpi as f64).round() as u32,
        )
    }

    fn text_scale(&self) -> u32 {
        (self.dpi / 96).max(1)
    }

    fn label_scale(&self) -> u32 {
        (self.dpi / 100).max(1)
    }
}

fn safe_spacing(s: f64) -> f64 {
    if s.is_finite() && s > 0.0 {
        s
    } else {
        1.0
    }
}

/// Bilinear sample with half-pixel-centered, clamped coordinates.
fn bilinear(slice: &Array2<f64>, sy: f64, sx: f64) -> f64 {
    let (rows, cols) = slice.dim();
    let y0 = sy.floor().max(0.0) as usize;
    let x0 = sx.floor().max(0.0) as usize;
    let y1 = (y0 + 1).min(rows - 1);
    let x1 = (x0 + 1).min(cols - 1);
    let fy = (sy - y0 as f64).clamp(0.0, 1.0);
    let fx = (sx - x0 as f64).clamp(0.0, 1.0);
    let top = slice[(y0, x0)] * (1.0 - fx) + slice[(y0, x1)] * fx;
    let bottom = slice[(y1, x0)] * (1.0 - fx) + slice[(y1, x1)] * fx;
    top * (1.0 - fy) + bottom * fy
}

/// The rectangle a slice occupies inside its panel: aspect-corrected, fit
/// to the panel and centered (letterboxed on the background color).
fn fit_rect(rows: usize, cols: usize, aspect: f64, pw: u32, ph: u32) -> (u32, u32, u32, u32) {
    let eff_h = rows as f64 * aspect;
    let scale = (pw as f64 / cols as f64).min(ph as f64 / eff_h);
    let dw = ((cols as f64 * scale).round() as u32).max(1).min(pw);
    let dh = ((eff_h * scale).round() as u32).max(1).min(ph);
    let ox = (pw - dw) / 2;
    let oy = (ph - dh) / 2;
    (ox, oy, dw, dh)
}

/// Draw one grayscale slice panel with its dotted crosshair lines.
///
/// `cross` is (row, col) in display-slice coordinates; its lines span the
/// drawn image rectangle, 2 pixels on / 2 pixels off.
fn draw_slice_panel(
    canvas: &mut RgbaImage,
    panel_x: u32,
    panel_y: u32,
    pw: u32,
    ph: u32,
    slice: &Array2<f64>,
    aspect: f64,
    cross: (usize, usize),
    style: &Style,
) -> Result<()> {
    let (rows, cols) = slice.dim();
    if rows == 0 || cols == 0 {
        return Err(PreviewError::InvalidGeometry(format!(
            "cannot render an empty {} x {} slice",
            rows, cols
        )));
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in slice.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    let span = if max > min { max - min } else { 1.0 };

    let (ox, oy, dw, dh) = fit_rect(rows, cols, aspect, pw, ph);
    for py in 0..dh {
        let sy = ((py as f64 + 0.5) / dh as f64 * rows as f64 - 0.5)
            .clamp(0.0, (rows - 1) as f64);
        for px in 0..dw {
            let sx = ((px as f64 + 0.5) / dw as f64 * cols as f64 - 0.5)
                .clamp(0.0, (cols - 1) as f64);
            let v = bilinear(slice, sy, sx);
            let gray = (((v - min) / span) * 255.0).clamp(0.0, 255.0) as u8;
            canvas.put_pixel(
                panel_x + ox + px,
                panel_y + oy + py,
                Rgba([gray, gray, gray, 255]),
            );
        }
    }

    // dotted crosshair, mapped through the same scaling as the image
    let line_y = (((cross.0 as f64 + 0.5) / rows as f64 * dh as f64) as u32).min(dh - 1);
    let line_x = (((cross.1 as f64 + 0.5) / cols as f64 * dw as f64) as u32).min(dw - 1);
    for px in 0..dw {
        if (px / 2) % 2 == 0 {
            canvas.put_pixel(panel_x + ox + px, panel_y + oy + line_y, style.crosshair);
        }
    }
    for py in 0..dh {
        if (py / 2) % 2 == 0 {
            canvas.put_pixel(panel_x + ox + line_x, panel_y + oy + py, style.crosshair);
        }
    }
    Ok(())
}

/// Lay out the three slice panels and the metadata panel on one canvas.
pub fn compose(
    volume: &Volume,
    planes: &SlicePlanes,
    labels: OrientationLabels,
    style: &Style,
) -> Result<RgbaImage> {
    let (width, height) = style.canvas_size();
    let mut canvas = RgbaImage::from_pixel(width, height, style.background);
    let (pw, ph) = (width / 2, height / 2);
    log::debug!("composing {}x{} canvas", width, height);

    let sx = safe_spacing(volume.spacing[0]);
    let sy = safe_spacing(volume.spacing[1]);
    let sz = safe_spacing(volume.spacing[2]);
    let (_, ly, lz) = volume.shape();
    let ch = planes.crosshair;

    // coronal: rows = Z (flipped for display), cols = X
    draw_slice_panel(
        &mut canvas,
        0,
        0,
        pw,
        ph,
        &planes.coronal,
        sz / sx,
        (lz - 1 - ch.z, ch.x),
        style,
    )?;
    // sagittal: rows = Z, cols = Y
    draw_slice_panel(
        &mut canvas,
        pw,
        0,
        pw,
        ph,
        &planes.sagittal,
        sz / sy,
        (lz - 1 - ch.z, ch.y),
        style,
    )?;
    // axial: rows = Y, cols = X
    draw_slice_panel(
        &mut canvas,
        0,
        ph,
        pw,
        ph,
        &planes.axial,
        sy / sx,
        (ly - 1 - ch.y, ch.x),
        style,
    )?;

    // left-side anatomical label on the axial panel
    let (left, _right) = labels;
    if !left.is_empty() {
        let scale = style.label_scale();
        font::draw_text(
            &mut canvas,
            left,
            2,
            (ph + ph / 2) as i64,
            scale,
            style.label,
        );
    }

    let text = meta::format_metadata(volume);
    font::draw_block(
        &mut canvas,
        &text,
        (pw + pw / 8) as i64,
        (ph + ph / 20) as i64,
        style.text_scale(),
        style.text,
    );

    Ok(canvas)
}

/// Degenerate single-panel composition for a flat raster image: native
/// color, letterboxed to fill the canvas, no metadata.
pub fn compose_flat(img: &DynamicImage, style: &Style) -> Result<RgbaImage> {
    let (iw, ih) = (img.width(), img.height());
    if iw == 0 || ih == 0 {
        return Err(PreviewError::InvalidGeometry(
            "cannot render an empty image".into(),
        ));
    }
    let (width, height) = style.canvas_size();
    let mut canvas = RgbaImage::from_pixel(width, height, style.background);

    let scale = (width as f64 / iw as f64).min(height as f64 / ih as f64);
    let dw = ((iw as f64 * scale).round() as u32).clamp(1, width);
    let dh = ((ih as f64 * scale).round() as u32).clamp(1, height);
    let resized = imageops::resize(img, dw, dh, imageops::FilterType::Triangle);
    imageops::overlay(
        &mut canvas,
        &resized,
        ((width - dw) / 2) as i64,
        ((height - dh) / 2) as i64,
    );
    Ok(canvas)
}
