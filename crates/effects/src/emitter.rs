//! Stamp emitter: turns one surface-local point into stamps
//!
//! Emission assumes a validated [`EffectProfile`]; nothing here can fail.
//! Randomness comes from the caller so tests can seed it.

use std::f32::consts::TAU;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::profile::{EffectProfile, EmissionKind};
use crate::tiles::RasterSurface;
use crate::types::Stamp;

/// Generates stamps for pointer samples according to a profile
#[derive(Debug, Clone)]
pub struct StampEmitter {
    profile: Arc<EffectProfile>,
}

impl StampEmitter {
    pub fn new(profile: Arc<EffectProfile>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &EffectProfile {
        &self.profile
    }

    /// Produce the stamps for one point without touching any surface.
    ///
    /// `surface_size` is used only for the clipping policy.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        x: f32,
        y: f32,
        surface_size: (u32, u32),
        rng: &mut R,
    ) -> Vec<Stamp> {
        let profile = &self.profile;
        let mut stamps = match profile.emission {
            EmissionKind::Off => Vec::new(),
            EmissionKind::Single => vec![Stamp {
                x,
                y,
                radius: profile.radius_range.max,
                color: with_alpha(profile.color, profile.alpha_range.max),
                hardness: profile.hardness,
            }],
            EmissionKind::Spray => (0..profile.stamps_per_emission)
                .map(|_| {
                    let (dx, dy) = disc_offset(profile.jitter_radius, rng);
                    Stamp {
                        x: x + dx,
                        y: y + dy,
                        radius: profile.radius_range.sample(rng),
                        color: with_alpha(profile.color, profile.alpha_range.sample(rng)),
                        hardness: profile.hardness,
                    }
                })
                .collect(),
        };

        if profile.clip_to_surface {
            let (width, height) = surface_size;
            stamps.retain(|s| {
                s.x >= 0.0 && s.y >= 0.0 && s.x < width as f32 && s.y < height as f32
            });
        }
        // Zero-radius draws from a degenerate range are not marks
        stamps.retain(|s| s.radius > 0.0);
        stamps
    }

    /// Generate stamps for a point and write them to the surface with the
    /// profile's compositing mode. Returns the stamps that were written.
    pub fn emit<R: Rng + ?Sized>(
        &self,
        x: f32,
        y: f32,
        surface: &mut RasterSurface,
        rng: &mut R,
    ) -> Vec<Stamp> {
        let stamps = self.generate(x, y, (surface.width(), surface.height()), rng);
        for stamp in &stamps {
            surface.draw(stamp, self.profile.compositing_mode);
        }
        if !stamps.is_empty() {
            debug!(
                "StampEmitter::emit: {} stamps at ({:.1}, {:.1}) mode={:?}",
                stamps.len(),
                x,
                y,
                self.profile.compositing_mode
            );
        }
        stamps
    }
}

/// Uniform random point inside a disc of the given radius
fn disc_offset<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> (f32, f32) {
    if radius <= 0.0 {
        return (0.0, 0.0);
    }
    let angle = rng.random_range(0.0..TAU);
    let distance = radius * rng.random::<f32>().sqrt();
    (angle.cos() * distance, angle.sin() * distance)
}

#[inline]
fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}
