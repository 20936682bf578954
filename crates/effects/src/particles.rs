//! Time-driven particle entities and their per-kind update functions
//!
//! Ripple, sparkle and glyph state is a pure function of age and the spawn
//! parameters. Flames are the exception: their height is a bounded random
//! walk resampled every tick.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::profile::{
    FlameParams, GlyphParams, ParticleKind, ProfileConfig, RippleParams, SparkleParams,
};
use crate::types::Rgba;

impl RippleParams {
    /// Ring radius after `age_ms`
    pub fn radius_at(&self, age_ms: u64) -> f32 {
        self.initial_radius + self.growth_rate * age_ms as f32 / 1000.0
    }

    /// Linear fade from 1 at birth to 0 at `ttl_ms`
    pub fn opacity_at(&self, age_ms: u64, ttl_ms: u64) -> f32 {
        if ttl_ms == 0 {
            return 0.0;
        }
        (1.0 - age_ms as f32 / ttl_ms as f32).max(0.0)
    }

    /// Expired once faded out or grown past the max radius, whichever is first
    pub fn is_expired(&self, age_ms: u64, ttl_ms: u64) -> bool {
        age_ms >= ttl_ms || self.radius_at(age_ms) > self.max_radius
    }
}

impl SparkleParams {
    /// Pulsing scale, `min_scale` at birth and 1.0 at the top of each pulse
    pub fn scale_at(&self, age_ms: u64) -> f32 {
        let phase = TAU * self.pulse_hz * age_ms as f32 / 1000.0;
        let pulse = 0.5 - 0.5 * phase.cos();
        self.min_scale + (1.0 - self.min_scale) * pulse
    }
}

impl FlameParams {
    /// One step of the bounded random walk
    pub fn step<R: Rng + ?Sized>(&self, height: f32, rng: &mut R) -> f32 {
        let delta = if self.step > 0.0 {
            rng.random_range(-self.step..=self.step)
        } else {
            0.0
        };
        (height + delta).clamp(self.min_height, self.max_height)
    }
}

impl GlyphParams {
    /// Distance fallen after `age_ms`
    pub fn offset_at(&self, age_ms: u64) -> f32 {
        self.fall_speed * age_ms as f32 / 1000.0
    }

    /// Character shown after `age_ms`, cycling through the charset
    pub fn glyph_at(&self, seed: u32, age_ms: u64) -> char {
        let count = self.charset.chars().count().max(1) as u64;
        let index = (u64::from(seed) + age_ms / self.change_every_ms.max(1)) % count;
        self.charset.chars().nth(index as usize).unwrap_or(' ')
    }

    /// Time for a glyph starting one glyph above the top to clear `surface_height`
    pub fn ttl_for(&self, surface_height: u32) -> u64 {
        let distance = surface_height as f32 + self.glyph_size;
        (distance * 1000.0 / self.fall_speed).ceil() as u64
    }
}

/// What bounds a particle's life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Removed once `age >= ttl_ms`
    Timed { ttl_ms: u64 },
    /// Lives as long as the owning toggle is on
    WhileLit,
}

/// Variant-specific mutable state, recomputed every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleState {
    Ripple { radius: f32, opacity: f32 },
    Sparkle { scale: f32 },
    Flame { height: f32 },
    Glyph { offset: f32, glyph: char },
}

/// One live time-driven entity
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub kind: ParticleKind,
    pub origin: Vec2,
    pub birth_ms: u64,
    pub age_ms: u64,
    pub lifetime: Lifetime,
    pub state: ParticleState,
    /// Recycling slot for pooled kinds (glyph column, flame anchor)
    pub slot: Option<u32>,
    pub(crate) seed: u32,
}

/// The per-kind parameter blocks a particle update reads
#[derive(Debug, Clone, Copy)]
pub struct KindParams<'a> {
    pub ripple: &'a RippleParams,
    pub sparkle: &'a SparkleParams,
    pub flame: &'a FlameParams,
    pub glyph: &'a GlyphParams,
}

impl ProfileConfig {
    /// Borrow the per-kind parameter blocks
    pub fn kind_params(&self) -> KindParams<'_> {
        KindParams {
            ripple: &self.ripple,
            sparkle: &self.sparkle,
            flame: &self.flame,
            glyph: &self.glyph,
        }
    }
}

impl Particle {
    /// Initial state for a freshly spawned particle of `kind`
    pub fn initial_state(kind: ParticleKind, params: KindParams<'_>, seed: u32) -> ParticleState {
        match kind {
            ParticleKind::Ripple => ParticleState::Ripple {
                radius: params.ripple.initial_radius,
                opacity: 1.0,
            },
            ParticleKind::Sparkle => ParticleState::Sparkle {
                scale: params.sparkle.scale_at(0),
            },
            ParticleKind::Flame => ParticleState::Flame {
                height: (params.flame.min_height + params.flame.max_height) / 2.0,
            },
            ParticleKind::Glyph => ParticleState::Glyph {
                offset: 0.0,
                glyph: params.glyph.glyph_at(seed, 0),
            },
        }
    }

    /// Advance to `now_ms` and recompute the state
    pub fn update<R: Rng + ?Sized>(&mut self, now_ms: u64, params: KindParams<'_>, rng: &mut R) {
        self.age_ms = now_ms.saturating_sub(self.birth_ms);
        let age = self.age_ms;
        self.state = match self.state {
            ParticleState::Ripple { .. } => ParticleState::Ripple {
                radius: params.ripple.radius_at(age),
                opacity: params.ripple.opacity_at(age, self.ttl_ms()),
            },
            ParticleState::Sparkle { .. } => ParticleState::Sparkle {
                scale: params.sparkle.scale_at(age),
            },
            ParticleState::Flame { height } => ParticleState::Flame {
                height: params.flame.step(height, rng),
            },
            ParticleState::Glyph { .. } => ParticleState::Glyph {
                offset: params.glyph.offset_at(age),
                glyph: params.glyph.glyph_at(self.seed, age),
            },
        };
    }

    /// TTL for timed particles; `u64::MAX` for toggle-bound ones
    pub fn ttl_ms(&self) -> u64 {
        match self.lifetime {
            Lifetime::Timed { ttl_ms } => ttl_ms,
            Lifetime::WhileLit => u64::MAX,
        }
    }

    /// Whether the particle must leave the live set
    pub fn is_expired(&self, params: KindParams<'_>, lit: bool) -> bool {
        match self.lifetime {
            Lifetime::WhileLit => !lit,
            Lifetime::Timed { ttl_ms } => match self.kind {
                ParticleKind::Ripple => params.ripple.is_expired(self.age_ms, ttl_ms),
                _ => self.age_ms >= ttl_ms,
            },
        }
    }

    /// Current position; glyphs move, everything else stays at its origin
    pub fn position(&self) -> Vec2 {
        match self.state {
            ParticleState::Glyph { offset, .. } => self.origin + Vec2::new(0.0, offset),
            _ => self.origin,
        }
    }

    /// Derived style for view-rendered output
    pub fn style(&self, params: KindParams<'_>) -> ParticleStyle {
        match self.state {
            ParticleState::Ripple { radius, opacity } => ParticleStyle::Ripple {
                radius,
                opacity,
                thickness: params.ripple.thickness,
            },
            ParticleState::Sparkle { scale } => ParticleStyle::Sparkle {
                radius: params.sparkle.size * scale,
                scale,
            },
            ParticleState::Flame { height } => ParticleStyle::Flame {
                width: params.flame.width,
                height,
            },
            ParticleState::Glyph { glyph, .. } => ParticleStyle::Glyph {
                glyph,
                size: params.glyph.glyph_size,
            },
        }
    }
}

/// Visual parameters the view layer maps to primitives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticleStyle {
    Ripple {
        radius: f32,
        opacity: f32,
        thickness: f32,
    },
    Sparkle {
        radius: f32,
        scale: f32,
    },
    Flame {
        width: f32,
        height: f32,
    },
    Glyph {
        glyph: char,
        size: f32,
    },
}

/// One view-rendered particle for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub id: u64,
    pub kind: ParticleKind,
    pub x: f32,
    pub y: f32,
    pub color: Rgba,
    pub style: ParticleStyle,
}
