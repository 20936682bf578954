//! Error types for engine construction.
//!
//! Only construction can fail. Emission, ticks and session transitions are
//! infallible once a profile has been validated.

use crate::constants::MAX_SURFACE_SIZE;

/// Invalid Effect Profile configuration, reported at construction time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("{option}: min {min} exceeds max {max}")]
    InvertedRange {
        option: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{option}: value {value} is out of range ({expected})")]
    OutOfRange {
        option: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("glyph charset must not be empty")]
    EmptyCharset,

    #[error("Failed to parse profile: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors building an engine or surface.
#[derive(Debug, thiserror::Error)]
pub enum EffectsError {
    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("Invalid surface size {width}x{height} (each edge must be 1..={})", MAX_SURFACE_SIZE)]
    InvalidSurfaceSize { width: u32, height: u32 },
}
