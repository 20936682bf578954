//! CPU pixel buffer with the per-pixel compositing primitives

use crate::types::Rgba;

/// A straight-alpha RGBA pixel buffer
/// Stores pixels as [f32; 4] in row-major order
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Create a new buffer filled with the given color
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![fill; pixel_count],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Fill every pixel with one color
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Get a pixel, or None when out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel; out of bounds writes are ignored
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Alpha-blend a color over the pixel (source-over, straight alpha)
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba, opacity: f32) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let dst = self.pixels[i];
        let src_alpha = (color[3] * opacity).clamp(0.0, 1.0);
        let dst_weight = dst[3] * (1.0 - src_alpha);
        let out_alpha = src_alpha + dst_weight;
        if out_alpha <= 0.0 {
            self.pixels[i] = [0.0, 0.0, 0.0, 0.0];
            return;
        }
        self.pixels[i] = [
            (color[0] * src_alpha + dst[0] * dst_weight) / out_alpha,
            (color[1] * src_alpha + dst[1] * dst_weight) / out_alpha,
            (color[2] * src_alpha + dst[2] * dst_weight) / out_alpha,
            out_alpha,
        ];
    }

    /// Subtract from the pixel's alpha only, clamped at zero
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32, amount: f32) {
        if let Some(i) = self.index(x, y) {
            let alpha = &mut self.pixels[i][3];
            *alpha = (*alpha - amount).max(0.0);
        }
    }

    /// Add the source color (weighted by its alpha) to the pixel, clamped at 1
    #[inline]
    pub fn add_pixel(&mut self, x: u32, y: u32, color: Rgba, opacity: f32) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let src_alpha = (color[3] * opacity).clamp(0.0, 1.0);
        let dst = &mut self.pixels[i];
        for c in 0..3 {
            dst[c] = (dst[c] + color[c] * src_alpha).min(1.0);
        }
        dst[3] = (dst[3] + src_alpha).min(1.0);
    }

    /// Scale every pixel's alpha toward transparent by `amount` (0-1)
    pub fn fade(&mut self, amount: f32) {
        let keep = (1.0 - amount).clamp(0.0, 1.0);
        for pixel in &mut self.pixels {
            pixel[3] *= keep;
        }
    }

    /// Raw pixel data as bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Share of pixels whose alpha is at or below `threshold`
    pub fn revealed_fraction(&self, threshold: f32) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let revealed = self.pixels.iter().filter(|p| p[3] <= threshold).count();
        revealed as f32 / self.pixels.len() as f32
    }

    /// Convert to 8-bit straight-alpha RGBA
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.map(to_u8)).collect()
    }

    /// Composite this buffer over an opaque underlay layer and convert to
    /// 8-bit RGBA. `underlay` is sampled once per pixel.
    pub fn to_rgba8_over(&self, underlay: impl Fn(u32, u32) -> Rgba) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let src = self.pixels[(y as usize) * (self.width as usize) + (x as usize)];
                let below = underlay(x, y);
                let a = src[3];
                out.extend_from_slice(&[
                    to_u8(src[0] * a + below[0] * (1.0 - a)),
                    to_u8(src[1] * a + below[1] * (1.0 - a)),
                    to_u8(src[2] * a + below[2] * (1.0 - a)),
                    255,
                ]);
            }
        }
        out
    }
}

#[inline]
fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_new_buffer() {
        let buffer = PixelBuffer::new(100, 50, [0.0; 4]);
        assert_eq!(buffer.width(), 100);
        assert_eq!(buffer.height(), 50);
        assert_eq!(buffer.pixels().len(), 5000);
    }

    #[test]
    fn test_get_set_pixel() {
        let mut buffer = PixelBuffer::new(10, 10, [0.0; 4]);
        let color = [1.0, 0.5, 0.25, 1.0];

        buffer.set_pixel(5, 5, color);
        assert_eq!(buffer.get_pixel(5, 5), Some(color));

        // Out of bounds reads return None and writes are ignored
        assert_eq!(buffer.get_pixel(100, 100), None);
        buffer.set_pixel(100, 100, color);
    }

    #[test]
    fn test_blend_pixel_over_white() {
        let mut buffer = PixelBuffer::new(10, 10, WHITE);
        buffer.blend_pixel(5, 5, [1.0, 0.0, 0.0, 1.0], 0.5);

        let result = buffer.get_pixel(5, 5).unwrap();
        assert!((result[0] - 1.0).abs() < 0.01);
        assert!((result[1] - 0.5).abs() < 0.01);
        assert!((result[2] - 0.5).abs() < 0.01);
        assert!((result[3] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_blend_pixel_over_transparent_keeps_color() {
        let mut buffer = PixelBuffer::new(4, 4, [0.0; 4]);
        buffer.blend_pixel(1, 1, [0.2, 0.4, 0.6, 1.0], 0.25);

        let result = buffer.get_pixel(1, 1).unwrap();
        assert!((result[0] - 0.2).abs() < 1e-5);
        assert!((result[2] - 0.6).abs() < 1e-5);
        assert!((result[3] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_erase_pixel_subtracts_alpha_only() {
        let mut buffer = PixelBuffer::new(4, 4, [0.3, 0.3, 0.3, 1.0]);
        buffer.erase_pixel(2, 2, 0.4);

        let result = buffer.get_pixel(2, 2).unwrap();
        assert!((result[3] - 0.6).abs() < 1e-6);
        assert_eq!(&result[..3], &[0.3, 0.3, 0.3]);

        // Clamped at zero
        buffer.erase_pixel(2, 2, 5.0);
        assert_eq!(buffer.get_pixel(2, 2).unwrap()[3], 0.0);
    }

    #[test]
    fn test_add_pixel_clamps() {
        let mut buffer = PixelBuffer::new(4, 4, [0.8, 0.1, 0.0, 0.9]);
        buffer.add_pixel(0, 0, [1.0, 0.5, 0.0, 1.0], 0.5);

        let result = buffer.get_pixel(0, 0).unwrap();
        assert_eq!(result[0], 1.0);
        assert!((result[1] - 0.35).abs() < 1e-6);
        assert_eq!(result[2], 0.0);
        assert_eq!(result[3], 1.0);
    }

    #[test]
    fn test_fade() {
        let mut buffer = PixelBuffer::new(2, 2, [1.0, 1.0, 1.0, 0.8]);
        buffer.fade(0.25);
        assert!((buffer.get_pixel(1, 1).unwrap()[3] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_revealed_fraction() {
        let mut buffer = PixelBuffer::new(2, 2, WHITE);
        assert_eq!(buffer.revealed_fraction(0.0), 0.0);
        buffer.erase_pixel(0, 0, 1.0);
        assert!((buffer.revealed_fraction(0.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_as_bytes() {
        let buffer = PixelBuffer::new(2, 2, [0.0; 4]);
        // 4 pixels * 4 components * 4 bytes per f32 = 64 bytes
        assert_eq!(buffer.as_bytes().len(), 64);
    }

    #[test]
    fn test_to_rgba8_over_shows_underlay_where_erased() {
        let mut buffer = PixelBuffer::new(2, 1, [0.0, 0.0, 0.0, 1.0]);
        buffer.erase_pixel(1, 0, 1.0);

        let out = buffer.to_rgba8_over(|_, _| [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(&out[0..4], &[0, 0, 0, 255]);
        assert_eq!(&out[4..8], &[255, 0, 0, 255]);
    }
}
