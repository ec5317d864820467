//! Writing the composed canvas to the terminal.
//!
//! Three mutually exclusive strategies, selected once at the CLI boundary:
//! the built-in sixel encoder, piping through `img2sixel` (libsixel), or
//! piping through iTerm2's `imgcat`.

use std::env;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::{DynamicImage, ImageOutputFormat, RgbaImage};

use crate::error::{PreviewError, Result};
use crate::sixel;

/// How the canvas reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSink {
    /// In-process sixel encoding, raw bytes on stdout.
    Sixel,
    /// Pipe a PNG through `img2sixel` from libsixel.
    SixelBinary,
    /// Pipe a PNG through iTerm2's `imgcat`.
    Imgcat,
}

impl OutputSink {
    /// Render the canvas to the terminal, one flush per encode.
    pub fn write(&self, canvas: &RgbaImage) -> Result<()> {
        match self {
            OutputSink::Sixel => {
                let bytes = sixel::encode(canvas)?;
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(&bytes)?;
                lock.flush()?;
                Ok(())
            }
            OutputSink::SixelBinary => pipe_png(
                canvas,
                "img2sixel",
                "Install libsixel-bin to make it available.",
            ),
            OutputSink::Imgcat => pipe_png(
                canvas,
                "imgcat",
                "Install iTerm2's imgcat script to make it available.",
            ),
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Check whether `name` is on PATH and marked as executable.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn pipe_png(canvas: &RgbaImage, command: &str, hint: &str) -> Result<()> {
    if find_executable(command).is_none() {
        return Err(PreviewError::CapabilityUnavailable(format!(
            "the command '{}' is not available in your PATH. {}",
            command, hint
        )));
    }

    // encode fully before spawning so the helper never sees partial data
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(canvas.clone())
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;

    let mut child = Command::new(command)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| PreviewError::ExternalProcess {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
    child
        .stdin
        .take()
        .ok_or_else(|| PreviewError::ExternalProcess {
            command: command.to_string(),
            reason: "could not open stdin".to_string(),
        })?
        .write_all(&png)
        .map_err(|e| PreviewError::ExternalProcess {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
    let status = child.wait().map_err(|e| PreviewError::ExternalProcess {
        command: command.to_string(),
        reason: e.to_string(),
    })?;
    if !status.success() {
        return Err(PreviewError::ExternalProcess {
            command: command.to_string(),
            reason: format!("exited with {}", status),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn finds_a_shell_on_path() {
        assert!(find_executable("sh").is_some());
    }

    #[test]
    fn missing_helper_reports_capability_with_remediation() {
        let canvas = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let err = pipe_png(&canvas, "definitely-not-a-real-binary", "Install it.").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("definitely-not-a-real-binary"), "{msg}");
        assert!(msg.contains("Install it."), "{msg}");
    }
}
