//! Formatting the header metadata panel text.

use nalgebra::Matrix4;

use crate::volume::Volume;

/// Round to 2 decimals and print the way numpy reprs a float: whole
/// numbers keep a trailing ".0" ("2.0"), everything else drops trailing
/// zeros ("0.98", "2.25").
pub fn round2(v: f64) -> String {
    let r = (v * 100.0).round() / 100.0;
    if r.fract() == 0.0 {
        format!("{:.1}", r)
    } else {
        format!("{}", r)
    }
}

/// Render a 4x4 affine as a fixed-width grid, 2 decimals per value.
/// Columns stay visually aligned by giving negative values one fewer
/// leading space than positive ones.
pub fn matrix_text(m: &Matrix4<f64>) -> String {
    let mut lines = Vec::with_capacity(4);
    for i in 0..4 {
        let mut line = String::new();
        for j in 0..4 {
            let cell = format!("{:.2}", m[(i, j)]);
            if cell.starts_with('-') {
                line.push_str("  ");
            } else {
                line.push_str("   ");
            }
            line.push_str(&cell);
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// The text block for the fourth panel: dimensions, spacing, volume count,
/// data type, value range, then both affines.
pub fn format_metadata(volume: &Volume) -> String {
    let (lx, ly, lz) = volume.shape();
    let [sx, sy, sz] = volume.spacing;
    let (min, max) = volume.value_range();
    format!(
        "Dimensions: {} x {} x {}\n\
         Spacing: {} x {} x {} mm\n\
         Volumes: {}\n\
         Data type: {}\n\
         Range: {} - {}\n\
         \n\
         sform code:\n\
         {}\n\
         \n\
         qform code:\n\
         {}",
        lx,
        ly,
        lz,
        round2(sx),
        round2(sy),
        round2(sz),
        volume.volumes,
        volume.datatype,
        round2(min),
        round2(max),
        matrix_text(&volume.sform),
        matrix_text(&volume.qform),
    )
}
