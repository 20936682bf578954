//! Pointer session: the state machine bounding one drag gesture
//!
//! A session only ever leaves `Dragging` on release, leave or an explicit
//! cancel. There is no timeout; a gesture whose terminal event never arrives
//! stays `Dragging`.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{MAX_INTERPOLATION_STEPS, MIN_MOVE_DISTANCE};

/// One surface-local pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: u64,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self { x, y, timestamp_ms }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Dragging,
}

/// Why a gesture ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Release,
    Leave,
    /// Host-initiated, e.g. on focus loss
    Cancel,
}

/// Tracks one drag gesture and interpolates sparse move samples
#[derive(Debug, Clone)]
pub struct PointerSession {
    state: SessionState,
    last_sample: Option<PointerSample>,
    max_step_px: f32,
}

impl PointerSession {
    /// `max_step_px` must be positive; profiles validate it
    pub fn new(max_step_px: f32) -> Self {
        Self {
            state: SessionState::Idle,
            last_sample: None,
            max_step_px,
        }
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Dragging
    }

    #[inline]
    pub fn last_sample(&self) -> Option<PointerSample> {
        self.last_sample
    }

    /// Start a gesture. Returns true when this press began a new gesture;
    /// a press during a drag only re-anchors the last sample.
    pub fn press(&mut self, sample: PointerSample) -> bool {
        let started = self.state == SessionState::Idle;
        self.state = SessionState::Dragging;
        self.last_sample = Some(sample);
        if started {
            debug!("PointerSession: press at ({:.1}, {:.1})", sample.x, sample.y);
        }
        started
    }

    /// Feed a move sample and get the points to emit, in order.
    ///
    /// Returns `ceil(distance / max_step_px)` evenly spaced points ending at
    /// the sample (at most `MAX_INTERPOLATION_STEPS`), or nothing when idle
    /// or stationary. `last_sample` is
    /// updated after the points are computed.
    pub fn move_to(&mut self, sample: PointerSample) -> Vec<Vec2> {
        if self.state != SessionState::Dragging {
            return Vec::new();
        }
        let Some(last) = self.last_sample else {
            self.last_sample = Some(sample);
            return vec![sample.position()];
        };

        let from = last.position();
        let to = sample.position();
        let distance = from.distance(to);
        let points = if distance < MIN_MOVE_DISTANCE {
            Vec::new()
        } else {
            let steps = ((distance / self.max_step_px).ceil().max(1.0) as u32)
                .min(MAX_INTERPOLATION_STEPS);
            let delta = to - from;
            if steps > 1 {
                debug!(
                    "PointerSession: {:.1}px move interpolated into {} points",
                    distance, steps
                );
            }
            (1..=steps)
                .map(|i| {
                    if i == steps {
                        to
                    } else {
                        from + delta * i as f32 / steps as f32
                    }
                })
                .collect()
        };

        self.last_sample = Some(sample);
        points
    }

    /// Pointer released. Returns true if this ended the gesture.
    pub fn release(&mut self) -> bool {
        self.end(EndReason::Release)
    }

    /// Pointer left the surface; treated exactly like a release.
    pub fn leave(&mut self) -> bool {
        self.end(EndReason::Leave)
    }

    /// Host-initiated end of the gesture. Never called automatically.
    pub fn cancel(&mut self) -> bool {
        self.end(EndReason::Cancel)
    }

    fn end(&mut self, reason: EndReason) -> bool {
        if self.state == SessionState::Idle {
            return false;
        }
        self.state = SessionState::Idle;
        self.last_sample = None;
        debug!("PointerSession: gesture ended ({:?})", reason);
        true
    }
}
