//! PNG export of the drawing surface.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::Canvas;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("canvas has no pixels to export")]
    EmptyCanvas,

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("could not write drawing: {0}")]
    Io(#[from] std::io::Error),
}

/// `drawing-YYYY-MM-DD.png`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("drawing-{}.png", date.format("%Y-%m-%d"))
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Encode the canvas as PNG bytes, alpha preserved.
pub fn export_png(canvas: &Canvas) -> Result<Vec<u8>, ExportError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(ExportError::EmptyCanvas);
    }

    let mut rgba = Vec::with_capacity(canvas.pixels().len() * 4);
    for &px in canvas.pixels() {
        rgba.extend_from_slice(&[(px >> 16) as u8, (px >> 8) as u8, px as u8, (px >> 24) as u8]);
    }
    let img = RgbaImage::from_raw(canvas.width(), canvas.height(), rgba)
        .ok_or(ExportError::EmptyCanvas)?;

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// Write the canvas to `dir/drawing-<date>.png`, returning the path.
pub fn save_png(canvas: &Canvas, dir: &Path, date: NaiveDate) -> Result<PathBuf, ExportError> {
    let bytes = export_png(canvas)?;
    let path = dir.join(export_file_name(date));
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), "drawing exported");
    Ok(path)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
