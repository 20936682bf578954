//! Presentation of the raster surface as an 8-bit PNG

use std::path::Path;

use fxcanvas_effects::{CompositingMode, RasterSurface, Rgba};
use image::RgbaImage;

use crate::error::AppError;

/// Checker cell size in pixels
const CHECKER_SIZE: u32 = 16;

const CHECKER_LIGHT: Rgba = [0.95, 0.85, 0.35, 1.0];
const CHECKER_DARK: Rgba = [0.85, 0.45, 0.15, 1.0];

/// The static layer an erased cover reveals
pub fn checkerboard(x: u32, y: u32) -> Rgba {
    if (x / CHECKER_SIZE + y / CHECKER_SIZE) % 2 == 0 {
        CHECKER_LIGHT
    } else {
        CHECKER_DARK
    }
}

/// Flatten the surface to RGBA8. Erase-mode surfaces are shown over the
/// checkerboard so the revealed area is visible.
pub fn present(surface: &RasterSurface) -> Vec<u8> {
    match surface.compositing_mode() {
        CompositingMode::Erase => surface.pixels().to_rgba8_over(checkerboard),
        CompositingMode::PaintOver | CompositingMode::AdditiveGlow => surface.pixels().to_rgba8(),
    }
}

/// Encode the presented surface and write it to `path`
pub fn write_png(surface: &RasterSurface, path: &Path) -> Result<(), AppError> {
    let (width, height) = (surface.width(), surface.height());
    let image = RgbaImage::from_raw(width, height, present(surface))
        .ok_or(AppError::BufferSize { width, height })?;
    image.save(path)?;
    tracing::info!("Wrote {}x{} frame to {}", width, height, path.display());
    Ok(())
}
