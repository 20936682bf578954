//! Effect engine: one widget's surface, gesture and particle clock
//!
//! The engine is the single owner of the widget's mutable state. Pointer
//! handling and clock ticks both take `&mut self`, so a tick can never run
//! while a pointer event is half-applied.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::clock::ParticleClock;
use crate::emitter::StampEmitter;
use crate::error::EffectsError;
use crate::mapper::{SurfaceBounds, to_surface_pixels};
use crate::particles::ParticleSnapshot;
use crate::profile::{EffectProfile, ProfileConfig};
use crate::session::{PointerSample, PointerSession};
use crate::tiles::{RasterSurface, TileCoord};
use crate::types::{PointerEvent, PointerPhase};

/// Per-widget effects engine, generic over its randomness source
#[derive(Debug)]
pub struct EffectEngine<R: Rng = StdRng> {
    profile: Arc<EffectProfile>,
    surface: RasterSurface,
    session: PointerSession,
    emitter: StampEmitter,
    clock: ParticleClock,
    rng: R,
}

impl EffectEngine<StdRng> {
    /// Validate `config` and build an engine with an OS-seeded generator
    pub fn new(config: ProfileConfig, width: u32, height: u32) -> Result<Self, EffectsError> {
        Self::with_rng(config, width, height, StdRng::from_os_rng())
    }

    /// Build an engine whose randomness is reproducible from `seed`
    pub fn seeded(
        config: ProfileConfig,
        width: u32,
        height: u32,
        seed: u64,
    ) -> Result<Self, EffectsError> {
        Self::with_rng(config, width, height, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EffectEngine<R> {
    /// Build an engine with a caller-supplied generator
    pub fn with_rng(
        config: ProfileConfig,
        width: u32,
        height: u32,
        rng: R,
    ) -> Result<Self, EffectsError> {
        let profile = EffectProfile::new(config)?;
        Self::from_profile(Arc::new(profile), width, height, rng)
    }

    /// Build an engine from an already validated profile, which may be shared
    /// with other widgets
    pub fn from_profile(
        profile: Arc<EffectProfile>,
        width: u32,
        height: u32,
        rng: R,
    ) -> Result<Self, EffectsError> {
        let surface = RasterSurface::new(
            width,
            height,
            profile.surface_fill,
            profile.compositing_mode,
        )?;
        info!(
            "EffectEngine: profile '{}' on {}x{} surface ({:?})",
            profile.name, width, height, profile.compositing_mode
        );

        Ok(Self {
            session: PointerSession::new(profile.max_step_px),
            emitter: StampEmitter::new(Arc::clone(&profile)),
            clock: ParticleClock::new(Arc::clone(&profile)),
            profile,
            surface,
            rng,
        })
    }

    #[inline]
    pub fn profile(&self) -> &EffectProfile {
        &self.profile
    }

    #[inline]
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    #[inline]
    pub fn session(&self) -> &PointerSession {
        &self.session
    }

    #[inline]
    pub fn clock(&self) -> &ParticleClock {
        &self.clock
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.session.is_active()
    }

    /// View-rendered particles as of the last tick
    #[inline]
    pub fn snapshot(&self) -> &[ParticleSnapshot] {
        self.clock.snapshot()
    }

    /// Apply one raw pointer event. Returns the number of stamps written.
    ///
    /// `bounds` is the surface's on-screen rect at the time of the event.
    pub fn handle_pointer(&mut self, event: PointerEvent, bounds: &SurfaceBounds) -> usize {
        let (x, y) = to_surface_pixels(
            event.screen_x,
            event.screen_y,
            bounds,
            self.surface.width(),
            self.surface.height(),
        );
        let sample = PointerSample::new(x, y, event.timestamp_ms);

        match event.phase {
            PointerPhase::Down => {
                if !self.session.press(sample) {
                    return 0;
                }
                if self.profile.spawn_on_press {
                    self.clock
                        .trigger(x, y, event.timestamp_ms, &self.surface, &mut self.rng);
                }
                if self.profile.stamp_on_press {
                    self.emitter.emit(x, y, &mut self.surface, &mut self.rng).len()
                } else {
                    0
                }
            }
            PointerPhase::Move => {
                let points = self.session.move_to(sample);
                points
                    .iter()
                    .map(|p| {
                        self.emitter
                            .emit(p.x, p.y, &mut self.surface, &mut self.rng)
                            .len()
                    })
                    .sum()
            }
            PointerPhase::Up => {
                self.session.release();
                0
            }
            PointerPhase::Leave => {
                self.session.leave();
                0
            }
        }
    }

    /// End the current gesture from the host side (e.g. focus loss)
    pub fn cancel_gesture(&mut self) -> bool {
        self.session.cancel()
    }

    /// Start the particle clock. No-op if already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        self.clock.start(now_ms)
    }

    /// Stop the particle clock. No-op if already stopped.
    pub fn stop(&mut self) -> bool {
        self.clock.stop()
    }

    /// Run every particle tick due at `now_ms`
    pub fn advance(&mut self, now_ms: u64) -> u32 {
        self.clock.advance(now_ms, &mut self.surface, &mut self.rng)
    }

    pub fn set_lit(&mut self, lit: bool) {
        self.clock.set_lit(lit);
    }

    /// Restore the surface fill, drop live particles and end any gesture.
    /// The clock keeps its running state.
    pub fn reset(&mut self) {
        self.session.cancel();
        self.clock.clear();
        self.surface.reset();
        debug!("EffectEngine: reset '{}'", self.profile.name);
    }

    /// Tiles changed since the last call, for partial texture upload
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.surface.take_dirty_tiles()
    }
}
