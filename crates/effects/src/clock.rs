//! Particle clock: fixed-period, time-driven particle lifecycle
//!
//! The clock owns no timer. The host reports the current time through
//! [`ParticleClock::advance`], which runs every tick whose deadline has
//! passed. Stopping clears the pending deadline, so no tick can run after
//! `stop()` returns until the clock is started again.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::constants::MAX_CATCH_UP_TICKS;
use crate::particles::{Lifetime, Particle, ParticleSnapshot, ParticleState};
use crate::profile::{EffectProfile, ParticleKind, ParticleRender};
use crate::tiles::RasterSurface;
use crate::types::{Rgba, Stamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
}

/// Owns the live particle set of one widget and advances it per tick
#[derive(Debug)]
pub struct ParticleClock {
    profile: Arc<EffectProfile>,
    state: ClockState,
    next_tick_ms: Option<u64>,
    particles: Vec<Particle>,
    snapshot: Vec<ParticleSnapshot>,
    next_id: u64,
    /// External on/off toggle bounding flame lifetimes
    lit: bool,
    ticks: u64,
}

impl ParticleClock {
    pub fn new(profile: Arc<EffectProfile>) -> Self {
        Self {
            profile,
            state: ClockState::Stopped,
            next_tick_ms: None,
            particles: Vec::new(),
            snapshot: Vec::new(),
            next_id: 1,
            lit: true,
            ticks: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> ClockState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Live particles in spawn order
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// View-rendered particles as of the last tick
    #[inline]
    pub fn snapshot(&self) -> &[ParticleSnapshot] {
        &self.snapshot
    }

    /// Total ticks run since creation
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Deadline of the next tick, None while stopped
    #[inline]
    pub fn next_tick_ms(&self) -> Option<u64> {
        self.next_tick_ms
    }

    /// Start ticking; the first tick is due one period after `now_ms`.
    /// Returns false if the clock was already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state == ClockState::Running {
            return false;
        }
        self.state = ClockState::Running;
        self.next_tick_ms = Some(now_ms.saturating_add(self.profile.tick_period_ms));
        info!(
            "ParticleClock: started at {}ms (period {}ms, profile '{}')",
            now_ms, self.profile.tick_period_ms, self.profile.name
        );
        true
    }

    /// Stop ticking and cancel the pending tick.
    /// Returns false if the clock was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == ClockState::Stopped {
            return false;
        }
        self.state = ClockState::Stopped;
        self.next_tick_ms = None;
        info!(
            "ParticleClock: stopped after {} ticks ({} live particles)",
            self.ticks,
            self.particles.len()
        );
        true
    }

    /// Set the owning toggle. Flames live only while it is on.
    pub fn set_lit(&mut self, lit: bool) {
        if self.lit != lit {
            debug!("ParticleClock: toggle {}", if lit { "on" } else { "off" });
        }
        self.lit = lit;
    }

    /// Drop every live particle
    pub fn clear(&mut self) {
        self.particles.clear();
        self.snapshot.clear();
    }

    /// Run all ticks due at `now_ms`. Returns how many ran.
    ///
    /// At most [`MAX_CATCH_UP_TICKS`] run per call; older deadlines are
    /// skipped so a stalled host does not replay a backlog.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        surface: &mut RasterSurface,
        rng: &mut R,
    ) -> u32 {
        let period = self.profile.tick_period_ms;
        let mut ran = 0;

        while let Some(due) = self.next_tick_ms {
            if due > now_ms {
                break;
            }
            if ran == MAX_CATCH_UP_TICKS {
                let skipped = (now_ms - due) / period + 1;
                warn!(
                    "ParticleClock: {}ms behind, skipping {} ticks",
                    now_ms - due,
                    skipped
                );
                self.next_tick_ms = Some(due.saturating_add(skipped.saturating_mul(period)));
                break;
            }
            self.tick(due, surface, rng);
            self.next_tick_ms = Some(due.saturating_add(period));
            ran += 1;
        }
        ran
    }

    /// Spawn one particle at a point (e.g. a click ripple).
    ///
    /// Returns None when the profile has no particle kind or the population
    /// is already at `max_concurrent`.
    pub fn trigger<R: Rng + ?Sized>(
        &mut self,
        x: f32,
        y: f32,
        now_ms: u64,
        surface: &RasterSurface,
        rng: &mut R,
    ) -> Option<u64> {
        let kind = self.profile.particle_kind?;
        if self.particles.len() >= self.profile.max_concurrent {
            debug!("ParticleClock: trigger skipped, at capacity");
            return None;
        }
        let id = self.spawn(kind, Vec2::new(x, y), None, now_ms, surface.height(), rng);
        Some(id)
    }

    fn tick<R: Rng + ?Sized>(&mut self, now_ms: u64, surface: &mut RasterSurface, rng: &mut R) {
        let profile = Arc::clone(&self.profile);
        let params = profile.kind_params();

        for particle in &mut self.particles {
            particle.update(now_ms, params, rng);
        }

        let before = self.particles.len();
        let lit = self.lit;
        self.particles.retain(|p| !p.is_expired(params, lit));
        let expired = before - self.particles.len();

        let spawned = if profile.continuous_emission {
            self.spawn_continuous(now_ms, surface, rng)
        } else {
            0
        };

        match profile.particle_render {
            ParticleRender::Raster => self.render_raster(surface),
            ParticleRender::View => {
                self.snapshot = self
                    .particles
                    .iter()
                    .map(|p| {
                        let pos = p.position();
                        ParticleSnapshot {
                            id: p.id,
                            kind: p.kind,
                            x: pos.x,
                            y: pos.y,
                            color: particle_color(profile.particle_color, p),
                            style: p.style(params),
                        }
                    })
                    .collect();
            }
        }

        self.ticks += 1;
        if expired > 0 || spawned > 0 {
            debug!(
                "ParticleClock: tick {} at {}ms, -{} +{} -> {} live",
                self.ticks,
                now_ms,
                expired,
                spawned,
                self.particles.len()
            );
        }
    }

    fn spawn_continuous<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        surface: &RasterSurface,
        rng: &mut R,
    ) -> usize {
        let Some(kind) = self.profile.particle_kind else {
            return 0;
        };
        if kind == ParticleKind::Flame && !self.lit {
            return 0;
        }

        let mut spawned = 0;
        for _ in 0..self.profile.spawn_attempts_per_tick {
            if self.particles.len() >= self.profile.max_concurrent {
                break;
            }
            if !rng.random_bool(self.profile.spawn_probability) {
                continue;
            }
            let Some((origin, slot)) = self.spawn_point(kind, surface, rng) else {
                break;
            };
            self.spawn(kind, origin, slot, now_ms, surface.height(), rng);
            spawned += 1;
        }
        spawned
    }

    /// Where an ambient particle of `kind` starts, plus its pool slot.
    /// None when every slot of a pooled kind is taken.
    fn spawn_point<R: Rng + ?Sized>(
        &self,
        kind: ParticleKind,
        surface: &RasterSurface,
        rng: &mut R,
    ) -> Option<(Vec2, Option<u32>)> {
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        match kind {
            ParticleKind::Ripple | ParticleKind::Sparkle => Some((
                Vec2::new(rng.random_range(0.0..width), rng.random_range(0.0..height)),
                None,
            )),
            ParticleKind::Flame => {
                // Anchors spread evenly along the bottom edge, lowest free first
                let anchors = self.profile.max_concurrent as u32;
                let slot = (0..anchors).find(|s| !self.slot_taken(*s))?;
                let x = (slot as f32 + 0.5) * width / anchors as f32;
                Some((Vec2::new(x, height), Some(slot)))
            }
            ParticleKind::Glyph => {
                // A random free column; its previous glyph has fallen off
                let columns = self.profile.glyph.columns;
                let free: Vec<u32> = (0..columns).filter(|c| !self.slot_taken(*c)).collect();
                if free.is_empty() {
                    return None;
                }
                let column = free[rng.random_range(0..free.len())];
                let x = (column as f32 + 0.5) * width / columns as f32;
                Some((Vec2::new(x, -self.profile.glyph.glyph_size), Some(column)))
            }
        }
    }

    fn slot_taken(&self, slot: u32) -> bool {
        self.particles.iter().any(|p| p.slot == Some(slot))
    }

    fn spawn<R: Rng + ?Sized>(
        &mut self,
        kind: ParticleKind,
        origin: Vec2,
        slot: Option<u32>,
        now_ms: u64,
        surface_height: u32,
        rng: &mut R,
    ) -> u64 {
        let lifetime = match kind {
            ParticleKind::Flame => Lifetime::WhileLit,
            ParticleKind::Glyph => Lifetime::Timed {
                ttl_ms: self.profile.glyph.ttl_for(surface_height),
            },
            ParticleKind::Ripple | ParticleKind::Sparkle => Lifetime::Timed {
                ttl_ms: self.profile.particle_ttl_ms,
            },
        };
        let seed: u32 = rng.random();
        let id = self.next_id;
        self.next_id += 1;

        self.particles.push(Particle {
            id,
            kind,
            origin,
            birth_ms: now_ms,
            age_ms: 0,
            lifetime,
            state: Particle::initial_state(kind, self.profile.kind_params(), seed),
            slot,
            seed,
        });
        id
    }

    fn render_raster(&self, surface: &mut RasterSurface) {
        let profile = &self.profile;
        surface.fade(profile.fade_per_tick);
        let mode = profile.particle_mode;

        for particle in &self.particles {
            let pos = particle.position();
            let color = particle_color(profile.particle_color, particle);
            match particle.state {
                ParticleState::Ripple { radius, .. } => {
                    surface.draw_ring(pos.x, pos.y, radius, profile.ripple.thickness, color, mode);
                }
                ParticleState::Sparkle { scale } => {
                    let stamp = Stamp {
                        x: pos.x,
                        y: pos.y,
                        radius: profile.sparkle.size * scale,
                        color,
                        hardness: 0.0,
                    };
                    surface.draw(&stamp, mode);
                }
                ParticleState::Flame { height } => {
                    // Base at the anchor, growing upward
                    let half = height / 2.0;
                    surface.draw_ellipse(
                        pos.x,
                        pos.y - half,
                        half,
                        color,
                        0.3,
                        mode,
                        FRAC_PI_2,
                        (profile.flame.width / height).min(1.0),
                    );
                }
                ParticleState::Glyph { .. } => {
                    let stamp = Stamp {
                        x: pos.x,
                        y: pos.y,
                        radius: profile.glyph.glyph_size / 2.0,
                        color,
                        hardness: 1.0,
                    };
                    surface.draw(&stamp, mode);
                }
            }
        }
    }
}

/// Particle color with kind-specific opacity applied
fn particle_color(base: Rgba, particle: &Particle) -> Rgba {
    match particle.state {
        ParticleState::Ripple { opacity, .. } => [base[0], base[1], base[2], base[3] * opacity],
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ParticleStyle;
    use crate::profile::{ProfileConfig, RippleParams};
    use crate::types::CompositingMode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn clock(config: ProfileConfig) -> ParticleClock {
        ParticleClock::new(Arc::new(EffectProfile::new(config).unwrap()))
    }

    fn surface() -> RasterSurface {
        RasterSurface::new(200, 200, [0.0; 4], CompositingMode::PaintOver).unwrap()
    }

    fn ripple_config() -> ProfileConfig {
        ProfileConfig {
            tick_period_ms: 100,
            particle_ttl_ms: 1000,
            ripple: RippleParams {
                initial_radius: 5.0,
                growth_rate: 40.0,
                max_radius: 500.0,
                thickness: 2.0,
            },
            ..ProfileConfig::ripple()
        }
    }

    #[test]
    fn test_start_stop_idempotent() {
        let mut clock = clock(ProfileConfig::sparkle());
        assert!(clock.start(0));
        assert!(!clock.start(10));
        assert_eq!(clock.next_tick_ms(), Some(50));
        assert!(clock.stop());
        assert!(!clock.stop());
        assert_eq!(clock.next_tick_ms(), None);
    }

    #[test]
    fn test_no_tick_after_stop() {
        let mut clock = clock(ProfileConfig::sparkle());
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(1);

        clock.start(0);
        assert_eq!(clock.advance(120, &mut surface, &mut rng), 2);
        clock.stop();
        assert_eq!(clock.advance(10_000, &mut surface, &mut rng), 0);
        assert_eq!(clock.tick_count(), 2);
    }

    #[test]
    fn test_advance_runs_due_ticks_in_order() {
        let mut clock = clock(ProfileConfig::sparkle());
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(1);

        clock.start(1000);
        assert_eq!(clock.advance(1049, &mut surface, &mut rng), 0);
        assert_eq!(clock.advance(1050, &mut surface, &mut rng), 1);
        assert_eq!(clock.advance(1200, &mut surface, &mut rng), 3);
        assert_eq!(clock.next_tick_ms(), Some(1250));
    }

    #[test]
    fn test_catch_up_is_bounded() {
        let mut clock = clock(ProfileConfig::sparkle());
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(1);

        clock.start(0);
        let ran = clock.advance(60_000, &mut surface, &mut rng);
        assert_eq!(ran, MAX_CATCH_UP_TICKS);
        // The backlog is dropped, not deferred
        assert!(clock.next_tick_ms().unwrap() > 60_000);
        assert_eq!(clock.advance(60_000, &mut surface, &mut rng), 0);
    }

    #[test]
    fn test_ripple_expires_on_next_tick_past_ttl() {
        let mut clock = clock(ripple_config());
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(1);

        clock.start(0);
        let id = clock.trigger(100.0, 100.0, 0, &surface, &mut rng).unwrap();

        for t in (100..=900).step_by(100) {
            clock.advance(t, &mut surface, &mut rng);
        }
        let ripple = clock.particles().iter().find(|p| p.id == id).unwrap();
        match ripple.state {
            ParticleState::Ripple { radius, opacity } => {
                assert!((radius - 41.0).abs() < 1e-3);
                assert!((opacity - 0.1).abs() < 1e-3);
            }
            other => panic!("unexpected state {other:?}"),
        }

        // Tick at 1000ms: age == ttl, evicted before render
        clock.advance(1000, &mut surface, &mut rng);
        assert!(clock.particles().iter().all(|p| p.id != id));

        for t in (1100..3000).step_by(100) {
            clock.advance(t, &mut surface, &mut rng);
            assert!(clock.particles().iter().all(|p| p.id != id));
        }
    }

    #[test]
    fn test_population_never_exceeds_max() {
        let config = ProfileConfig {
            max_concurrent: 4,
            spawn_probability: 1.0,
            spawn_attempts_per_tick: 10,
            particle_ttl_ms: 5000,
            ..ProfileConfig::sparkle()
        };
        let mut clock = clock(config);
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(11);

        clock.start(0);
        for t in (0..10_000).step_by(50) {
            clock.advance(t, &mut surface, &mut rng);
            assert!(clock.live_count() <= 4);
        }
        assert_eq!(clock.live_count(), 4);
        // Triggers at capacity are skipped, not errors
        assert_eq!(clock.trigger(1.0, 1.0, 10_000, &surface, &mut rng), None);
    }

    #[test]
    fn test_view_profile_produces_snapshots() {
        let mut clock = clock(ProfileConfig {
            spawn_probability: 1.0,
            ..ProfileConfig::sparkle()
        });
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(2);

        clock.start(0);
        clock.advance(2000, &mut surface, &mut rng);
        clock.advance(4000, &mut surface, &mut rng);
        assert!(!clock.snapshot().is_empty());
        assert_eq!(clock.snapshot().len(), clock.live_count());
        assert!(
            clock
                .snapshot()
                .iter()
                .all(|s| matches!(s.style, ParticleStyle::Sparkle { .. }))
        );
        // View-rendered particles never touch the raster
        assert!(!surface.has_dirty_tiles());
    }

    #[test]
    fn test_raster_ripple_draws_and_clears_each_tick() {
        let mut clock = clock(ripple_config());
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(3);

        clock.start(0);
        clock.trigger(100.0, 100.0, 0, &surface, &mut rng);
        clock.advance(100, &mut surface, &mut rng);

        // radius 9 at 100ms: the ring passes through (109, 100)
        let on_ring = surface.pixels().get_pixel(108, 99).unwrap()[3];
        assert!(on_ring > 0.0);

        // Once expired, the full fade leaves nothing behind
        for t in (200..=1100).step_by(100) {
            clock.advance(t, &mut surface, &mut rng);
        }
        assert_eq!(clock.live_count(), 0);
        assert_eq!(surface.pixels().revealed_fraction(0.0), 1.0);
    }

    #[test]
    fn test_start_near_end_of_time_saturates() {
        let mut clock = clock(ProfileConfig::sparkle());
        clock.start(u64::MAX - 10);
        assert_eq!(clock.next_tick_ms(), Some(u64::MAX));
    }

    #[test]
    fn test_glow_sparkle_draws_then_fades_partially() {
        let config = ProfileConfig {
            continuous_emission: false,
            ..ProfileConfig::glow_trail()
        };
        let mut clock = clock(config);
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(6);

        clock.start(0);
        clock.trigger(100.0, 100.0, 0, &surface, &mut rng).unwrap();
        clock.advance(33, &mut surface, &mut rng);
        let drawn = surface.pixels().get_pixel(100, 100).unwrap()[3];
        assert!(drawn > 0.0);

        // Nothing left to draw: the next tick only fades by 6%
        clock.clear();
        clock.advance(66, &mut surface, &mut rng);
        let faded = surface.pixels().get_pixel(100, 100).unwrap()[3];
        assert!((faded - drawn * 0.94).abs() < 1e-5);
    }

    #[test]
    fn test_raster_flames_draw_upward_from_anchors() {
        let config = ProfileConfig {
            particle_render: ParticleRender::Raster,
            ..ProfileConfig::flame()
        };
        let mut clock = clock(config);
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(7);

        clock.start(0);
        clock.advance(100, &mut surface, &mut rng);
        assert_eq!(clock.live_count(), 5);

        // Anchors at x = 20, 60, 100, 140, 180 on the bottom edge
        assert!(surface.pixels().get_pixel(100, 195).unwrap()[3] > 0.0);
        assert_eq!(surface.pixels().get_pixel(80, 195).unwrap()[3], 0.0);
        // Taller than max_height is never reached
        assert_eq!(surface.pixels().get_pixel(100, 150).unwrap()[3], 0.0);
        assert!(clock.snapshot().is_empty());
    }

    #[test]
    fn test_raster_glyphs_enter_from_top() {
        let mut config = ProfileConfig {
            particle_render: ParticleRender::Raster,
            spawn_probability: 1.0,
            max_concurrent: 4,
            ..ProfileConfig::data_rain()
        };
        config.glyph.columns = 4;
        let mut clock = clock(config);
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(8);

        clock.start(0);
        clock.advance(50, &mut surface, &mut rng);
        assert_eq!(clock.live_count(), 4);
        // Spawned one glyph above the top edge
        assert!(!surface.has_dirty_tiles());

        for t in (100..=200).step_by(50) {
            clock.advance(t, &mut surface, &mut rng);
        }
        // 150ms at 120 px/s puts every column's glyph centre at y = 6
        for x in [25, 75, 125, 175] {
            assert!(surface.pixels().get_pixel(x, 6).unwrap()[3] > 0.0);
        }
    }

    #[test]
    fn test_flames_follow_toggle() {
        let mut clock = clock(ProfileConfig::flame());
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(4);

        clock.start(0);
        clock.advance(100, &mut surface, &mut rng);
        assert_eq!(clock.live_count(), 5);

        // Far beyond any ttl, still burning
        clock.advance(1_000_000, &mut surface, &mut rng);
        assert_eq!(clock.live_count(), 5);

        let slots: Vec<_> = clock.particles().iter().map(|p| p.slot).collect();
        for s in 0..5 {
            assert!(slots.contains(&Some(s)));
        }

        clock.set_lit(false);
        clock.advance(1_000_100, &mut surface, &mut rng);
        assert_eq!(clock.live_count(), 0);
        clock.advance(1_000_200, &mut surface, &mut rng);
        assert_eq!(clock.live_count(), 0);
    }

    #[test]
    fn test_glyph_slots_recycle() {
        let mut config = ProfileConfig {
            spawn_probability: 1.0,
            tick_period_ms: 50,
            max_concurrent: 4,
            spawn_attempts_per_tick: 4,
            ..ProfileConfig::data_rain()
        };
        config.glyph.columns = 4;
        config.glyph.fall_speed = 400.0;
        config.glyph.glyph_size = 10.0;
        let mut clock = clock(config);
        let mut surface = surface();
        let mut rng = StdRng::seed_from_u64(5);

        clock.start(0);
        clock.advance(50, &mut surface, &mut rng);
        assert_eq!(clock.live_count(), 4);
        let first_ids: Vec<u64> = clock.particles().iter().map(|p| p.id).collect();

        // (200 + 10) px at 400 px/s = 525ms to fall off; slots then refill
        for t in (100..=650).step_by(50) {
            clock.advance(t, &mut surface, &mut rng);
        }
        assert_eq!(clock.live_count(), 4);
        assert!(clock.particles().iter().all(|p| !first_ids.contains(&p.id)));
        for p in clock.particles() {
            assert!(p.position().y <= 200.0);
            assert!(p.slot.unwrap() < 4);
        }
    }
}
