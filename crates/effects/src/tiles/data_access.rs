//! Tile data access for presentation uploads

use super::{RasterSurface, Region, TileCoord};
use crate::types::Rgba;

impl RasterSurface {
    /// Pixel bounds of a tile; edge tiles may be smaller than `tile_size`
    pub fn tile_bounds(&self, coord: TileCoord) -> Region {
        let start_x = coord.x * self.tile_size;
        let start_y = coord.y * self.tile_size;
        let w = self.tile_size.min(self.width().saturating_sub(start_x));
        let h = self.tile_size.min(self.height().saturating_sub(start_y));
        (start_x, start_y, w, h)
    }

    /// Pixel data of a tile in row-major order
    pub fn tile_data(&self, coord: TileCoord) -> Vec<Rgba> {
        let (x, y, w, h) = self.tile_bounds(coord);
        self.region_data(x, y, w, h)
    }

    /// Pixel data for a rectangular region, clamped to the surface
    pub fn region_data(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<Rgba> {
        let x_end = x.saturating_add(width).min(self.width());
        let y_end = y.saturating_add(height).min(self.height());
        if x_end <= x || y_end <= y {
            return Vec::new();
        }

        let mut data = Vec::with_capacity(((x_end - x) * (y_end - y)) as usize);
        for row in y..y_end {
            for col in x..x_end {
                if let Some(pixel) = self.buffer.get_pixel(col, row) {
                    data.push(pixel);
                }
            }
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use crate::tiles::{RasterSurface, TileCoord};
    use crate::types::CompositingMode;

    #[test]
    fn test_edge_tile_bounds() {
        let surface =
            RasterSurface::with_tile_size(100, 70, [0.0; 4], CompositingMode::PaintOver, 64)
                .unwrap();
        assert_eq!(surface.tile_bounds(TileCoord { x: 1, y: 1 }), (64, 64, 36, 6));
        assert_eq!(surface.tile_data(TileCoord { x: 1, y: 1 }).len(), 36 * 6);
    }

    #[test]
    fn test_region_data_clamped() {
        let surface =
            RasterSurface::with_tile_size(10, 10, [1.0; 4], CompositingMode::PaintOver, 64)
                .unwrap();
        assert_eq!(surface.region_data(8, 8, 5, 5).len(), 4);
        assert!(surface.region_data(20, 0, 5, 5).is_empty());
    }
}
