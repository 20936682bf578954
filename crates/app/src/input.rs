//! Scripted pointer input standing in for a real device
//!
//! Produces the raw event stream a browser or windowing layer would deliver:
//! screen coordinates, a fixed sample interval, and the overlapping
//! leave/release pair common to pointer hardware.

use fxcanvas_effects::{PointerEvent, PointerPhase, SurfaceBounds};

/// Interval between move samples (~60 Hz)
pub const MOVE_INTERVAL_MS: u64 = 16;

/// Screen offset the surface is "displayed" at
pub const SURFACE_LEFT: f32 = 40.0;
pub const SURFACE_TOP: f32 = 30.0;

/// On-screen bounds of a surface shown at its native size
pub fn surface_bounds(width: u32, height: u32) -> SurfaceBounds {
    SurfaceBounds::new(SURFACE_LEFT, SURFACE_TOP, width as f32, height as f32)
}

/// A zig-zag drag across the surface that exits past the right edge.
///
/// Segments are sampled every `MOVE_INTERVAL_MS`. The third segment is
/// covered by a single sample, the kind of jump a fast flick produces.
pub fn zigzag_drag(bounds: &SurfaceBounds, start_ms: u64) -> Vec<PointerEvent> {
    let at = |fx: f32, fy: f32| {
        (
            bounds.left + bounds.width * fx,
            bounds.top + bounds.height * fy,
        )
    };
    // (x fraction, y fraction, samples to reach it)
    let waypoints = [
        (0.30, 0.80, 12),
        (0.50, 0.20, 12),
        (0.70, 0.80, 1),
        (0.90, 0.20, 10),
        (1.15, 0.50, 6),
    ];

    let mut events = Vec::new();
    let mut t = start_ms;
    let (mut x, mut y) = at(0.10, 0.20);
    events.push(PointerEvent::new(PointerPhase::Down, x, y, t));

    for (fx, fy, samples) in waypoints {
        let (tx, ty) = at(fx, fy);
        for i in 1..=samples {
            t += MOVE_INTERVAL_MS;
            let s = i as f32 / samples as f32;
            let (sx, sy) = (x + (tx - x) * s, y + (ty - y) * s);
            if bounds.contains(sx, sy) {
                events.push(PointerEvent::new(PointerPhase::Move, sx, sy, t));
            } else {
                // The device reports leave first, then the release outside
                events.push(PointerEvent::new(PointerPhase::Leave, sx, sy, t));
                events.push(PointerEvent::new(PointerPhase::Up, sx, sy, t + 1));
                return events;
            }
        }
        (x, y) = (tx, ty);
    }

    events.push(PointerEvent::new(PointerPhase::Up, x, y, t + 1));
    events
}

/// Press and release at the surface centre
pub fn click_center(bounds: &SurfaceBounds, t: u64) -> [PointerEvent; 2] {
    let x = bounds.left + bounds.width / 2.0;
    let y = bounds.top + bounds.height / 2.0;
    [
        PointerEvent::new(PointerPhase::Down, x, y, t),
        PointerEvent::new(PointerPhase::Up, x, y, t + 40),
    ]
}
