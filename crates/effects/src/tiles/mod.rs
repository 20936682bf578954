//! The raster surface a widget draws into, with tile-level dirty tracking

mod data_access;
mod dirty_tracking;
mod stamp_application;

use std::collections::HashSet;

use tracing::info;

use crate::constants::{DEFAULT_TILE_SIZE, MAX_SURFACE_SIZE};
use crate::error::EffectsError;
use crate::surface::PixelBuffer;
use crate::types::{CompositingMode, Rgba};

pub use stamp_application::calculate_hardness_falloff;

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Affected pixel region as (x, y, width, height)
pub type Region = (u32, u32, u32, u32);

/// A fixed-size drawable raster target.
///
/// Dimensions are fixed at creation. Resizing means building a new surface.
#[derive(Debug)]
pub struct RasterSurface {
    pub(crate) buffer: PixelBuffer,
    compositing_mode: CompositingMode,
    initial_fill: Rgba,
    pub(crate) tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
}

impl RasterSurface {
    /// Create a surface filled with `fill`, using the default tile size
    pub fn new(
        width: u32,
        height: u32,
        fill: Rgba,
        compositing_mode: CompositingMode,
    ) -> Result<Self, EffectsError> {
        Self::with_tile_size(width, height, fill, compositing_mode, DEFAULT_TILE_SIZE)
    }

    /// Create a surface with an explicit tile size
    pub fn with_tile_size(
        width: u32,
        height: u32,
        fill: Rgba,
        compositing_mode: CompositingMode,
        tile_size: u32,
    ) -> Result<Self, EffectsError> {
        if width == 0 || height == 0 || width > MAX_SURFACE_SIZE || height > MAX_SURFACE_SIZE {
            return Err(EffectsError::InvalidSurfaceSize { width, height });
        }
        let tile_size = tile_size.max(1);

        Ok(Self {
            buffer: PixelBuffer::new(width, height, fill),
            compositing_mode,
            initial_fill: fill,
            tile_size,
            tiles_x: width.div_ceil(tile_size),
            tiles_y: height.div_ceil(tile_size),
            dirty_tiles: HashSet::new(),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Compositing mode stamps use unless a caller overrides it
    #[inline]
    pub fn compositing_mode(&self) -> CompositingMode {
        self.compositing_mode
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    /// Underlying pixels for presentation
    #[inline]
    pub fn pixels(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Fill the whole surface with one color
    pub fn clear(&mut self, color: Rgba) {
        self.buffer.clear(color);
        self.mark_all_dirty();
    }

    /// Restore the fill the surface was created with (e.g. re-cover a scratch card)
    pub fn reset(&mut self) {
        info!(
            "RasterSurface::reset: {}x{} back to {:?}",
            self.width(),
            self.height(),
            self.initial_fill
        );
        self.clear(self.initial_fill);
    }

    /// Decay every pixel toward transparent; used for particle trails
    pub fn fade(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        self.buffer.fade(amount);
        self.mark_all_dirty();
    }
}
