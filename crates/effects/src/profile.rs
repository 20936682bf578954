//! Effect Profiles: the declarative per-widget configuration
//!
//! [`ProfileConfig`] is the plain, serde-friendly option set. It is validated
//! once and frozen into an [`EffectProfile`], which is what the emitter and
//! the particle clock consume. Swapping effects means building a new profile.

use std::ops::Deref;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_TICK_PERIOD_MS;
use crate::error::ProfileError;
use crate::types::{CompositingMode, Rgba};

/// Inclusive randomization bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A range that always yields `value`
    pub fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Uniform sample within the bounds
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }

    fn validate(&self, option: &'static str) -> Result<(), ProfileError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ProfileError::OutOfRange {
                option,
                value: f64::from(if self.min.is_finite() { self.max } else { self.min }),
                expected: "finite",
            });
        }
        if self.min > self.max {
            return Err(ProfileError::InvertedRange {
                option,
                min: self.min,
                max: self.max,
            });
        }
        if self.min < 0.0 {
            return Err(ProfileError::OutOfRange {
                option,
                value: f64::from(self.min),
                expected: ">= 0",
            });
        }
        Ok(())
    }
}

/// How a pointer sample turns into stamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmissionKind {
    /// Pointer input draws nothing (particle-only widgets)
    Off,
    /// One stamp at the sample with the fixed radius (scratch erase)
    #[default]
    Single,
    /// Several jittered, randomized stamps per sample (spray paint)
    Spray,
}

/// Which update function governs spawned particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Ripple,
    Sparkle,
    Flame,
    Glyph,
}

/// Where live particles are rendered each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticleRender {
    /// Drawn into the raster surface
    #[default]
    Raster,
    /// Exposed as style snapshots for view elements
    View,
}

/// Expanding ring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleParams {
    pub initial_radius: f32,
    /// Pixels per second
    pub growth_rate: f32,
    pub max_radius: f32,
    pub thickness: f32,
}

impl Default for RippleParams {
    fn default() -> Self {
        Self {
            initial_radius: 5.0,
            growth_rate: 40.0,
            max_radius: 200.0,
            thickness: 3.0,
        }
    }
}

/// Pulsing sparkle parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkleParams {
    /// Radius at scale 1.0
    pub size: f32,
    /// Pulses per second
    pub pulse_hz: f32,
    /// Scale at the bottom of a pulse
    pub min_scale: f32,
}

impl Default for SparkleParams {
    fn default() -> Self {
        Self {
            size: 4.0,
            pulse_hz: 1.5,
            min_scale: 0.3,
        }
    }
}

/// Flickering flame parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameParams {
    pub min_height: f32,
    pub max_height: f32,
    /// Largest height change per tick
    pub step: f32,
    pub width: f32,
}

impl Default for FlameParams {
    fn default() -> Self {
        Self {
            min_height: 14.0,
            max_height: 26.0,
            step: 3.0,
            width: 10.0,
        }
    }
}

/// Falling glyph (data rain) parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphParams {
    /// Number of recycling slots, one per column
    pub columns: u32,
    /// Pixels per second
    pub fall_speed: f32,
    pub glyph_size: f32,
    pub charset: String,
    /// How often a falling glyph changes character
    pub change_every_ms: u64,
}

impl Default for GlyphParams {
    fn default() -> Self {
        Self {
            columns: 16,
            fall_speed: 120.0,
            glyph_size: 12.0,
            charset: "01アイウエオカキクケコ".to_string(),
            change_every_ms: 150,
        }
    }
}

/// The full option set of an Effect Profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub name: String,

    // Pointer-driven stamping
    pub emission: EmissionKind,
    pub stamps_per_emission: u32,
    pub jitter_radius: f32,
    pub radius_range: ValueRange,
    pub alpha_range: ValueRange,
    pub color: Rgba,
    pub hardness: f32,
    pub compositing_mode: CompositingMode,
    /// Drop stamps whose centre falls outside the surface
    pub clip_to_surface: bool,
    /// Emit at the press point, not only along moves
    pub stamp_on_press: bool,
    pub max_step_px: f32,
    /// Fill the surface is created with and reset to
    pub surface_fill: Rgba,

    // Time-driven particles
    pub particle_kind: Option<ParticleKind>,
    pub particle_render: ParticleRender,
    pub particle_color: Rgba,
    pub particle_mode: CompositingMode,
    /// Spawn a particle where the pointer is pressed
    pub spawn_on_press: bool,
    pub continuous_emission: bool,
    pub tick_period_ms: u64,
    pub particle_ttl_ms: u64,
    pub max_concurrent: usize,
    pub spawn_probability: f64,
    pub spawn_attempts_per_tick: u32,
    /// Share of surface alpha removed before each raster render
    pub fade_per_tick: f32,

    pub ripple: RippleParams,
    pub sparkle: SparkleParams,
    pub flame: FlameParams,
    pub glyph: GlyphParams,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            emission: EmissionKind::Single,
            stamps_per_emission: 1,
            jitter_radius: 0.0,
            radius_range: ValueRange::fixed(10.0),
            alpha_range: ValueRange::fixed(1.0),
            color: [0.0, 0.0, 0.0, 1.0],
            hardness: 1.0,
            compositing_mode: CompositingMode::PaintOver,
            clip_to_surface: false,
            stamp_on_press: true,
            max_step_px: 5.0,
            surface_fill: [0.0, 0.0, 0.0, 0.0],
            particle_kind: None,
            particle_render: ParticleRender::Raster,
            particle_color: [1.0, 1.0, 1.0, 1.0],
            particle_mode: CompositingMode::PaintOver,
            spawn_on_press: false,
            continuous_emission: false,
            tick_period_ms: 50,
            particle_ttl_ms: 1000,
            max_concurrent: 32,
            spawn_probability: 1.0,
            spawn_attempts_per_tick: 1,
            fade_per_tick: 0.0,
            ripple: RippleParams::default(),
            sparkle: SparkleParams::default(),
            flame: FlameParams::default(),
            glyph: GlyphParams::default(),
        }
    }
}

impl ProfileConfig {
    /// Silver cover erased to reveal the prize underneath
    pub fn scratch_card() -> Self {
        Self {
            name: "scratch".to_string(),
            emission: EmissionKind::Single,
            radius_range: ValueRange::fixed(16.0),
            alpha_range: ValueRange::fixed(1.0),
            compositing_mode: CompositingMode::Erase,
            max_step_px: 6.0,
            surface_fill: [0.75, 0.75, 0.78, 1.0],
            ..Default::default()
        }
    }

    /// Graffiti spray can: randomized dots clipped at the edge
    pub fn spray_paint() -> Self {
        Self {
            name: "spray".to_string(),
            emission: EmissionKind::Spray,
            stamps_per_emission: 20,
            jitter_radius: 18.0,
            radius_range: ValueRange::new(0.8, 2.2),
            alpha_range: ValueRange::new(0.3, 0.9),
            color: [0.95, 0.2, 0.6, 1.0],
            clip_to_surface: true,
            max_step_px: 8.0,
            ..Default::default()
        }
    }

    /// Additive trail that fades out over time while sparkles drift around it
    pub fn glow_trail() -> Self {
        Self {
            name: "glow".to_string(),
            emission: EmissionKind::Spray,
            stamps_per_emission: 3,
            jitter_radius: 3.0,
            radius_range: ValueRange::new(3.0, 6.0),
            alpha_range: ValueRange::new(0.15, 0.35),
            color: [0.3, 0.8, 1.0, 1.0],
            hardness: 0.2,
            compositing_mode: CompositingMode::AdditiveGlow,
            max_step_px: 4.0,
            particle_kind: Some(ParticleKind::Sparkle),
            particle_render: ParticleRender::Raster,
            particle_color: [1.0, 0.95, 0.6, 0.8],
            particle_mode: CompositingMode::AdditiveGlow,
            continuous_emission: true,
            tick_period_ms: 33,
            particle_ttl_ms: 900,
            max_concurrent: 12,
            spawn_probability: 0.25,
            fade_per_tick: 0.06,
            ..Default::default()
        }
    }

    /// Click-to-ripple rings, redrawn from scratch every tick
    pub fn ripple() -> Self {
        Self {
            name: "ripple".to_string(),
            emission: EmissionKind::Off,
            stamp_on_press: false,
            particle_kind: Some(ParticleKind::Ripple),
            particle_render: ParticleRender::Raster,
            particle_color: [0.4, 0.7, 1.0, 1.0],
            spawn_on_press: true,
            tick_period_ms: 30,
            particle_ttl_ms: 1000,
            max_concurrent: 12,
            fade_per_tick: 1.0,
            ..Default::default()
        }
    }

    /// Ambient pulsing sparkles rendered as view elements
    pub fn sparkle() -> Self {
        Self {
            name: "sparkle".to_string(),
            emission: EmissionKind::Off,
            stamp_on_press: false,
            particle_kind: Some(ParticleKind::Sparkle),
            particle_render: ParticleRender::View,
            particle_color: [1.0, 0.9, 0.4, 1.0],
            continuous_emission: true,
            tick_period_ms: 50,
            particle_ttl_ms: 1200,
            max_concurrent: 20,
            spawn_probability: 0.3,
            ..Default::default()
        }
    }

    /// Candle flames that flicker while their toggle is on
    pub fn flame() -> Self {
        Self {
            name: "flame".to_string(),
            emission: EmissionKind::Off,
            stamp_on_press: false,
            particle_kind: Some(ParticleKind::Flame),
            particle_render: ParticleRender::View,
            particle_color: [1.0, 0.55, 0.1, 0.9],
            continuous_emission: true,
            tick_period_ms: 100,
            max_concurrent: 5,
            spawn_probability: 1.0,
            spawn_attempts_per_tick: 5,
            ..Default::default()
        }
    }

    /// Falling glyph columns with recycling slots
    pub fn data_rain() -> Self {
        Self {
            name: "rain".to_string(),
            emission: EmissionKind::Off,
            stamp_on_press: false,
            particle_kind: Some(ParticleKind::Glyph),
            particle_render: ParticleRender::View,
            particle_color: [0.2, 1.0, 0.4, 1.0],
            continuous_emission: true,
            tick_period_ms: 50,
            max_concurrent: 16,
            spawn_probability: 0.05,
            spawn_attempts_per_tick: 16,
            ..Default::default()
        }
    }

    /// Look up a built-in preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "scratch" => Some(Self::scratch_card()),
            "spray" => Some(Self::spray_paint()),
            "glow" => Some(Self::glow_trail()),
            "ripple" => Some(Self::ripple()),
            "sparkle" => Some(Self::sparkle()),
            "flame" => Some(Self::flame()),
            "rain" => Some(Self::data_rain()),
            _ => None,
        }
    }

    /// Check every option; the first problem found is reported
    pub fn validate(&self) -> Result<(), ProfileError> {
        self.radius_range.validate("radius_range")?;
        self.alpha_range.validate("alpha_range")?;
        if self.radius_range.max <= 0.0 {
            return Err(ProfileError::NotPositive("radius_range.max"));
        }
        if self.alpha_range.max > 1.0 {
            return Err(ProfileError::OutOfRange {
                option: "alpha_range",
                value: f64::from(self.alpha_range.max),
                expected: "0..=1",
            });
        }
        unit_interval("hardness", f64::from(self.hardness))?;
        unit_interval("fade_per_tick", f64::from(self.fade_per_tick))?;
        unit_interval("spawn_probability", self.spawn_probability)?;
        if !self.jitter_radius.is_finite() || self.jitter_radius < 0.0 {
            return Err(ProfileError::OutOfRange {
                option: "jitter_radius",
                value: f64::from(self.jitter_radius),
                expected: ">= 0",
            });
        }
        if self.stamps_per_emission == 0 {
            return Err(ProfileError::NotPositive("stamps_per_emission"));
        }
        if !self.max_step_px.is_finite() || self.max_step_px <= 0.0 {
            return Err(ProfileError::NotPositive("max_step_px"));
        }
        if self.tick_period_ms == 0 {
            return Err(ProfileError::NotPositive("tick_period_ms"));
        }
        if self.tick_period_ms > MAX_TICK_PERIOD_MS {
            return Err(ProfileError::OutOfRange {
                option: "tick_period_ms",
                value: self.tick_period_ms as f64,
                expected: "<= 3600000",
            });
        }

        let Some(kind) = self.particle_kind else {
            return Ok(());
        };
        if self.max_concurrent == 0 {
            return Err(ProfileError::NotPositive("max_concurrent"));
        }
        match kind {
            ParticleKind::Ripple => {
                positive("particle_ttl_ms", self.particle_ttl_ms as f32)?;
                positive("ripple.growth_rate", self.ripple.growth_rate)?;
                positive("ripple.max_radius", self.ripple.max_radius)?;
                positive("ripple.thickness", self.ripple.thickness)?;
                if self.ripple.initial_radius < 0.0 {
                    return Err(ProfileError::OutOfRange {
                        option: "ripple.initial_radius",
                        value: f64::from(self.ripple.initial_radius),
                        expected: ">= 0",
                    });
                }
            }
            ParticleKind::Sparkle => {
                positive("particle_ttl_ms", self.particle_ttl_ms as f32)?;
                positive("sparkle.size", self.sparkle.size)?;
                positive("sparkle.pulse_hz", self.sparkle.pulse_hz)?;
                unit_interval("sparkle.min_scale", f64::from(self.sparkle.min_scale))?;
            }
            ParticleKind::Flame => {
                ValueRange::new(self.flame.min_height, self.flame.max_height)
                    .validate("flame.height")?;
                positive("flame.max_height", self.flame.max_height)?;
                positive("flame.width", self.flame.width)?;
                let span = self.flame.max_height - self.flame.min_height;
                let step = self.flame.step;
                if !step.is_finite() || step < 0.0 || step > span {
                    return Err(ProfileError::OutOfRange {
                        option: "flame.step",
                        value: f64::from(self.flame.step),
                        expected: "0..=max_height - min_height",
                    });
                }
            }
            ParticleKind::Glyph => {
                if self.glyph.columns == 0 {
                    return Err(ProfileError::NotPositive("glyph.columns"));
                }
                positive("glyph.fall_speed", self.glyph.fall_speed)?;
                positive("glyph.glyph_size", self.glyph.glyph_size)?;
                if self.glyph.change_every_ms == 0 {
                    return Err(ProfileError::NotPositive("glyph.change_every_ms"));
                }
                if self.glyph.charset.is_empty() {
                    return Err(ProfileError::EmptyCharset);
                }
            }
        }
        Ok(())
    }
}

fn positive(option: &'static str, value: f32) -> Result<(), ProfileError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ProfileError::NotPositive(option))
    }
}

fn unit_interval(option: &'static str, value: f64) -> Result<(), ProfileError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ProfileError::OutOfRange {
            option,
            value,
            expected: "0..=1",
        })
    }
}

/// A validated, immutable Effect Profile.
///
/// Options are readable through `Deref`; there is no way to change them.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectProfile {
    config: ProfileConfig,
}

impl EffectProfile {
    /// Validate and freeze a configuration
    pub fn new(config: ProfileConfig) -> Result<Self, ProfileError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Parse a JSON profile and validate it
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }
}

impl Deref for EffectProfile {
    type Target = ProfileConfig;

    fn deref(&self) -> &ProfileConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_presets_are_valid() {
        for name in ["scratch", "spray", "glow", "ripple", "sparkle", "flame", "rain"] {
            let config = ProfileConfig::preset(name).unwrap();
            assert_eq!(config.name, name);
            assert!(EffectProfile::new(config).is_ok(), "preset {name} should validate");
        }
        assert!(ProfileConfig::preset("confetti").is_none());
    }

    #[test]
    fn test_inverted_radius_range_rejected() {
        let config = ProfileConfig {
            radius_range: ValueRange::new(5.0, 2.0),
            ..Default::default()
        };
        assert_eq!(
            EffectProfile::new(config),
            Err(ProfileError::InvertedRange {
                option: "radius_range",
                min: 5.0,
                max: 2.0
            })
        );
    }

    #[test]
    fn test_zero_tick_period_rejected() {
        let config = ProfileConfig {
            tick_period_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            EffectProfile::new(config),
            Err(ProfileError::NotPositive("tick_period_ms"))
        );
    }

    #[test]
    fn test_bad_probability_and_step_rejected() {
        let config = ProfileConfig {
            spawn_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            EffectProfile::new(config),
            Err(ProfileError::OutOfRange { option: "spawn_probability", .. })
        ));

        let config = ProfileConfig {
            max_step_px: 0.0,
            ..Default::default()
        };
        assert_eq!(
            EffectProfile::new(config),
            Err(ProfileError::NotPositive("max_step_px"))
        );
    }

    #[test]
    fn test_flame_step_must_fit_height_span() {
        for step in [2e38, f32::INFINITY, f32::NAN, 3.0, -1.0] {
            let config = ProfileConfig {
                flame: FlameParams {
                    min_height: 1.0,
                    max_height: 2.0,
                    step,
                    width: 4.0,
                },
                ..ProfileConfig::flame()
            };
            assert!(
                matches!(
                    EffectProfile::new(config),
                    Err(ProfileError::OutOfRange { option: "flame.step", .. })
                ),
                "step {step} should be rejected"
            );
        }

        // JSON overflowing f32 parses to infinity and is rejected too
        assert!(matches!(
            EffectProfile::from_json(
                r#"{ "particle_kind": "flame", "flame": { "min_height": 1.0, "max_height": 2.0, "step": 1e39, "width": 4.0 } }"#
            ),
            Err(ProfileError::OutOfRange { option: "flame.step", .. })
        ));
    }

    #[test]
    fn test_tick_period_upper_bound() {
        let config = ProfileConfig {
            tick_period_ms: u64::MAX,
            ..ProfileConfig::sparkle()
        };
        assert!(matches!(
            EffectProfile::new(config),
            Err(ProfileError::OutOfRange { option: "tick_period_ms", .. })
        ));

        let config = ProfileConfig {
            tick_period_ms: MAX_TICK_PERIOD_MS,
            ..ProfileConfig::sparkle()
        };
        assert!(EffectProfile::new(config).is_ok());
    }

    #[test]
    fn test_particle_kind_requires_capacity() {
        let config = ProfileConfig {
            max_concurrent: 0,
            ..ProfileConfig::sparkle()
        };
        assert_eq!(
            EffectProfile::new(config),
            Err(ProfileError::NotPositive("max_concurrent"))
        );
    }

    #[test]
    fn test_empty_charset_rejected() {
        let mut config = ProfileConfig::data_rain();
        config.glyph.charset.clear();
        assert_eq!(EffectProfile::new(config), Err(ProfileError::EmptyCharset));
    }

    #[test]
    fn test_from_json_with_defaults() {
        let profile = EffectProfile::from_json(
            r#"{
                "name": "custom",
                "emission": "spray",
                "stamps_per_emission": 4,
                "compositing_mode": "additive_glow",
                "radius_range": { "min": 1.0, "max": 3.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(profile.name, "custom");
        assert_eq!(profile.emission, EmissionKind::Spray);
        assert_eq!(profile.compositing_mode, CompositingMode::AdditiveGlow);
        // Unspecified options keep their defaults
        assert_eq!(profile.tick_period_ms, 50);
    }

    #[test]
    fn test_from_json_reports_parse_and_validation_errors() {
        assert!(matches!(
            EffectProfile::from_json("{ not json"),
            Err(ProfileError::Parse(_))
        ));
        assert_eq!(
            EffectProfile::from_json(r#"{ "tick_period_ms": 0 }"#),
            Err(ProfileError::NotPositive("tick_period_ms"))
        );
    }

    #[test]
    fn test_value_range_sample_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = ValueRange::new(0.25, 0.75);
        for _ in 0..200 {
            let v = range.sample(&mut rng);
            assert!((0.25..=0.75).contains(&v));
        }
        assert_eq!(ValueRange::fixed(3.0).sample(&mut rng), 3.0);
    }
}
