//! Error types for the host binary.

use fxcanvas_effects::EffectsError;

/// Errors that can end a host run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse profile file: {0}")]
    ProfileFile(#[from] serde_json::Error),

    #[error("Unknown preset '{0}' (expected scratch, spray, glow, ripple, sparkle, flame or rain)")]
    UnknownPreset(String),

    #[error(transparent)]
    Effects(#[from] EffectsError),

    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Raster buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },
}
