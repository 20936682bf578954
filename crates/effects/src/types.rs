use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color, each channel 0.0-1.0
pub type Rgba = [f32; 4];

/// How a stamp's color and alpha combine with the pixels under it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CompositingMode {
    /// Standard alpha blend of the stamp over the destination
    #[default]
    PaintOver = 0,
    /// Stamp alpha is subtracted from the destination alpha only
    Erase = 1,
    /// Stamp color is added to the destination and clamped
    AdditiveGlow = 2,
}

/// One atomic mark, produced at emission time and written once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamp {
    /// X position in surface-local coordinates
    pub x: f32,
    /// Y position in surface-local coordinates
    pub y: f32,
    /// Radius in pixels (always positive)
    pub radius: f32,
    /// Stamp color; the alpha channel is the stamp opacity
    pub color: Rgba,
    /// Edge hardness: 0.0 = linear falloff, 1.0 = hard disc
    pub hardness: f32,
}

impl Stamp {
    /// Opacity carried in the color's alpha channel
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.color[3]
    }
}

/// Phase of a raw pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

/// A raw device pointer event in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub screen_x: f32,
    pub screen_y: f32,
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: u64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, screen_x: f32, screen_y: f32, timestamp_ms: u64) -> Self {
        Self {
            phase,
            screen_x,
            screen_y,
            timestamp_ms,
        }
    }
}
