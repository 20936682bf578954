//! Stamp rasterization and per-mode compositing

use tracing::debug;

use super::{RasterSurface, Region};
use crate::types::{CompositingMode, Rgba, Stamp};

impl RasterSurface {
    /// Write one circular stamp with the given compositing mode.
    ///
    /// Returns the affected region, or None when the stamp misses the surface.
    pub fn draw(&mut self, stamp: &Stamp, mode: CompositingMode) -> Option<Region> {
        self.draw_ellipse(
            stamp.x,
            stamp.y,
            stamp.radius,
            stamp.color,
            stamp.hardness,
            mode,
            0.0, // angle
            1.0, // aspect_ratio (1.0 = circle)
        )
    }

    /// Write a rotated elliptical stamp.
    ///
    /// # Arguments
    /// * `center_x`, `center_y` - Center in surface pixel coordinates
    /// * `radius` - Radius along the major axis
    /// * `color` - RGBA color; alpha is the stamp opacity
    /// * `hardness` - Edge hardness (0.0 = soft, 1.0 = hard)
    /// * `mode` - How to combine with existing pixels
    /// * `angle` - Rotation of the major axis in radians
    /// * `aspect_ratio` - Minor to major axis ratio (1.0 = circle)
    #[allow(clippy::too_many_arguments)]
    pub fn draw_ellipse(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: Rgba,
        hardness: f32,
        mode: CompositingMode,
        angle: f32,
        aspect_ratio: f32,
    ) -> Option<Region> {
        if radius <= 0.0 || color[3] <= 0.0 || aspect_ratio <= 0.0 {
            return None;
        }
        let aspect_ratio = aspect_ratio.clamp(0.01, 1.0);

        // Half extents of the rotated ellipse's bounding box
        let (sin_a, cos_a) = angle.sin_cos();
        let radius_major = radius;
        let radius_minor = radius * aspect_ratio;
        let r_major_sq = radius_major * radius_major;
        let r_minor_sq = radius_minor * radius_minor;
        let half_w = (r_major_sq * cos_a * cos_a + r_minor_sq * sin_a * sin_a).sqrt();
        let half_h = (r_major_sq * sin_a * sin_a + r_minor_sq * cos_a * cos_a).sqrt();

        let (x_min, y_min, x_max, y_max) =
            self.clamp_box(center_x - half_w, center_y - half_h, center_x + half_w, center_y + half_h)?;

        for py in y_min..y_max {
            for px in x_min..x_max {
                let dx = (px as f32 + 0.5) - center_x;
                let dy = (py as f32 + 0.5) - center_y;

                // Rotate into ellipse axes, then normalize to the unit circle
                let nx = (dx * cos_a + dy * sin_a) / radius_major;
                let ny = (-dx * sin_a + dy * cos_a) / radius_minor;
                let dist_sq = nx * nx + ny * ny;
                if dist_sq > 1.0 {
                    continue;
                }

                let falloff = calculate_hardness_falloff(dist_sq.sqrt(), hardness);
                self.composite(px, py, color, falloff, mode);
            }
        }

        Some(self.finish_region(x_min, y_min, x_max, y_max))
    }

    /// Write an annulus centred on a point, with a linear falloff from the
    /// ring's midline to its inner and outer edges.
    pub fn draw_ring(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        thickness: f32,
        color: Rgba,
        mode: CompositingMode,
    ) -> Option<Region> {
        if radius <= 0.0 || thickness <= 0.0 || color[3] <= 0.0 {
            return None;
        }
        let half = thickness / 2.0;
        let outer = radius + half;

        let (x_min, y_min, x_max, y_max) =
            self.clamp_box(center_x - outer, center_y - outer, center_x + outer, center_y + outer)?;

        for py in y_min..y_max {
            for px in x_min..x_max {
                let dx = (px as f32 + 0.5) - center_x;
                let dy = (py as f32 + 0.5) - center_y;
                let from_midline = ((dx * dx + dy * dy).sqrt() - radius).abs();
                if from_midline > half {
                    continue;
                }
                self.composite(px, py, color, 1.0 - from_midline / half, mode);
            }
        }

        Some(self.finish_region(x_min, y_min, x_max, y_max))
    }

    #[inline]
    fn composite(&mut self, px: u32, py: u32, color: Rgba, coverage: f32, mode: CompositingMode) {
        if coverage <= 0.0 {
            return;
        }
        match mode {
            CompositingMode::PaintOver => self.buffer.blend_pixel(px, py, color, coverage),
            CompositingMode::Erase => self.buffer.erase_pixel(px, py, color[3] * coverage),
            CompositingMode::AdditiveGlow => self.buffer.add_pixel(px, py, color, coverage),
        }
    }

    /// Clamp a float bounding box to the surface, None when fully outside
    fn clamp_box(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(u32, u32, u32, u32)> {
        let x_min = (x0.floor().max(0.0) as u32).min(self.width());
        let y_min = (y0.floor().max(0.0) as u32).min(self.height());
        let x_max = (x1.ceil().max(0.0) as u32).min(self.width());
        let y_max = (y1.ceil().max(0.0) as u32).min(self.height());
        if x_min >= x_max || y_min >= y_max {
            debug!("  -> stamp outside surface bounds");
            return None;
        }
        Some((x_min, y_min, x_max, y_max))
    }

    fn finish_region(&mut self, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Region {
        let width = x_max - x_min;
        let height = y_max - y_min;
        self.mark_region_dirty(x_min, y_min, width, height);
        (x_min, y_min, width, height)
    }
}

/// Calculate falloff based on hardness
/// distance_normalized is 0 at center, 1 at edge
/// hardness is 0.0 (soft) to 1.0 (hard)
#[inline]
pub fn calculate_hardness_falloff(distance_normalized: f32, hardness: f32) -> f32 {
    if distance_normalized > 1.0 {
        return 0.0;
    }
    if hardness >= 1.0 {
        return 1.0;
    }
    let soft = 1.0 - distance_normalized.clamp(0.0, 1.0);
    soft * (1.0 - hardness) + hardness
}
