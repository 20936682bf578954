//! fxcanvas - headless host for the effects engine
//!
//! Drives one engine with a scripted gesture and a simulated clock, then
//! writes the presented surface as a PNG.

use fxcanvas_effects::{EffectEngine, ParticleRender};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod input;
mod render;

use config::AppConfig;
use error::AppError;

/// Resolution of the simulated timeline
const CLOCK_STEP_MS: u64 = 1;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run(AppConfig::from_env()) {
        tracing::error!("fxcanvas failed: {}", err);
        std::process::exit(1);
    }
}

fn run(config: AppConfig) -> Result<(), AppError> {
    info!(
        "Starting fxcanvas: profile {:?}, {}x{}, {}ms",
        config.profile, config.width, config.height, config.run_ms
    );

    let profile = config.profile.load()?;
    let mut engine = match config.seed {
        Some(seed) => EffectEngine::seeded(profile, config.width, config.height, seed)?,
        None => EffectEngine::new(profile, config.width, config.height)?,
    };
    let bounds = input::surface_bounds(config.width, config.height);

    engine.start(0);

    // Gesture
    let drag = input::zigzag_drag(&bounds, 0);
    let mut stamps = 0;
    for event in &drag {
        stamps += engine.handle_pointer(*event, &bounds);
    }
    let gesture_end = drag.last().map_or(0, |e| e.timestamp_ms);
    info!(
        "Replayed {} pointer events: {} stamps, dragging={}",
        drag.len(),
        stamps,
        engine.is_dragging()
    );

    // One particle at the centre
    for event in input::click_center(&bounds, gesture_end + 10) {
        stamps += engine.handle_pointer(event, &bounds);
    }

    // Simulated timeline
    let mut ticks = 0;
    let mut now = 0;
    while now <= config.run_ms {
        ticks += engine.advance(now);
        now += CLOCK_STEP_MS;
    }
    engine.stop();
    // Nothing may tick once stopped
    let late = engine.advance(config.run_ms + 10_000);

    let profile = engine.profile();
    let live = engine.clock().live_count();
    info!(
        "Clock stopped: {} ticks, {} live particles ({:?}), {} late ticks",
        ticks, live, profile.particle_kind, late
    );
    if profile.particle_render == ParticleRender::View {
        info!(
            "View snapshot: {}",
            serde_json::to_string(engine.snapshot())?
        );
    }

    let revealed = engine.surface().pixels().revealed_fraction(0.0);
    let dirty = engine.take_dirty_tiles().len();
    info!(
        "Surface: {} stamps total, {} dirty tiles, {:.1}% transparent",
        stamps,
        dirty,
        revealed * 100.0
    );

    render::write_png(engine.surface(), &config.output)
}
