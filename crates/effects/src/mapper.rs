//! Screen to surface-local coordinate conversion
//!
//! Bounds are never cached: callers measure the surface's on-screen rect for
//! every event, since layout and scrolling can move it between events.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_BOUNDS_SIZE;

/// On-screen rectangle occupied by a surface, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceBounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether a screen point lies inside the rect (right/bottom edges exclusive)
    pub fn contains(&self, screen_x: f32, screen_y: f32) -> bool {
        screen_x >= self.left
            && screen_y >= self.top
            && screen_x < self.left + self.width
            && screen_y < self.top + self.height
    }
}

/// Convert screen coordinates to surface-local coordinates.
///
/// Out-of-bounds results are passed through unclamped.
#[inline]
pub fn to_local(screen_x: f32, screen_y: f32, bounds: &SurfaceBounds) -> (f32, f32) {
    (screen_x - bounds.left, screen_y - bounds.top)
}

/// Convert screen coordinates to surface pixel coordinates when the surface
/// is displayed at a size different from its pixel size.
///
/// Degenerate bounds (under `MIN_BOUNDS_SIZE` on either edge) fall back to
/// the unscaled local point.
pub fn to_surface_pixels(
    screen_x: f32,
    screen_y: f32,
    bounds: &SurfaceBounds,
    surface_width: u32,
    surface_height: u32,
) -> (f32, f32) {
    let (local_x, local_y) = to_local(screen_x, screen_y, bounds);
    if !(bounds.width >= MIN_BOUNDS_SIZE && bounds.height >= MIN_BOUNDS_SIZE) {
        return (local_x, local_y);
    }
    (
        local_x * surface_width as f32 / bounds.width,
        local_y * surface_height as f32 / bounds.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_local_offsets_by_bounds() {
        let bounds = SurfaceBounds::new(100.0, 50.0, 200.0, 200.0);
        assert_eq!(to_local(150.0, 75.0, &bounds), (50.0, 25.0));
    }

    #[test]
    fn test_to_local_passes_out_of_bounds_through() {
        let bounds = SurfaceBounds::new(100.0, 50.0, 200.0, 200.0);
        assert_eq!(to_local(90.0, 300.0, &bounds), (-10.0, 250.0));
    }

    #[test]
    fn test_to_surface_pixels_scales() {
        // 200x100 surface displayed at 400x200
        let bounds = SurfaceBounds::new(10.0, 10.0, 400.0, 200.0);
        let (x, y) = to_surface_pixels(210.0, 110.0, &bounds, 200, 100);
        assert!((x - 100.0).abs() < 1e-4);
        assert!((y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_to_surface_pixels_degenerate_bounds() {
        let bounds = SurfaceBounds::new(10.0, 10.0, 0.0, 0.0);
        assert_eq!(to_surface_pixels(15.0, 20.0, &bounds, 64, 64), (5.0, 10.0));
    }

    #[test]
    fn test_to_surface_pixels_tiny_bounds_not_rescaled() {
        let bounds = SurfaceBounds::new(10.0, 10.0, 0.001, 0.001);
        assert_eq!(to_surface_pixels(15.0, 20.0, &bounds, 64, 64), (5.0, 10.0));
    }

    #[test]
    fn test_contains() {
        let bounds = SurfaceBounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains(0.0, 0.0));
        assert!(bounds.contains(9.9, 9.9));
        assert!(!bounds.contains(10.0, 5.0));
        assert!(!bounds.contains(-0.1, 5.0));
    }
}
