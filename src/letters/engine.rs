//! Typst rasterizing engine.
//!
//! Handles the low-level details of writing Typst source to temporary files,
//! invoking the compiler, and reading back the PNG it produces.

use log::debug;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

use super::{LetterError, LetterLayout};

/// CSS reference resolution; a scale of 1.0 renders one pixel per CSS pixel.
pub const CSS_PPI: f32 = 96.0;

/// Renders a letter layout into a PNG bitmap.
pub trait Rasterizer: Send + Sync {
    /// `scale` multiplies the CSS reference resolution.
    fn rasterize(&self, layout: &LetterLayout, scale: f32) -> Result<Vec<u8>, LetterError>;
}

/// Rasterizer backed by the `typst` CLI.
#[derive(Debug, Clone)]
pub struct TypstRasterizer {
    binary: String,
}

impl TypstRasterizer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TypstRasterizer {
    fn default() -> Self {
        Self::new("typst")
    }
}

impl Rasterizer for TypstRasterizer {
    fn rasterize(&self, layout: &LetterLayout, scale: f32) -> Result<Vec<u8>, LetterError> {
        let temp_dir = tempdir().map_err(LetterError::TempDir)?;
        let typ_path = temp_dir.path().join(layout.kind.template_file());
        let png_path = temp_dir.path().join(format!("{}.png", layout.kind.slug()));

        fs::write(&typ_path, &layout.source).map_err(LetterError::WriteTypst)?;

        let ppi = (CSS_PPI * scale).round();
        debug!("Rasterizing {} at {} ppi", layout.kind.slug(), ppi);

        let status = Command::new(&self.binary)
            .arg("compile")
            .arg("--format")
            .arg("png")
            .arg("--ppi")
            .arg(ppi.to_string())
            .arg(&typ_path)
            .arg(&png_path)
            .current_dir(temp_dir.path())
            .status()
            .map_err(LetterError::TypstIo)?;

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            return Err(LetterError::TypstExit(code));
        }

        fs::read(&png_path).map_err(LetterError::ReadBitmap)
    }
}
