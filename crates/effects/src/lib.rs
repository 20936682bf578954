//! fxcanvas effects engine - pointer-driven stamps and time-driven particles
//!
//! This crate provides everything one interactive effects widget needs:
//! - [`mapper`] - Screen to surface-local coordinate conversion
//! - [`surface`] - CPU straight-alpha RGBA pixel buffer
//! - [`tiles`] - Raster surface with stamp compositing and dirty tracking
//! - [`session`] - Pointer gesture state machine with move interpolation
//! - [`emitter`] - Stamp generation from pointer samples
//! - [`particles`] / [`clock`] - Time-driven particles and their scheduler
//! - [`profile`] - Validated, immutable Effect Profiles and presets
//! - [`engine`] - Per-widget facade tying the above together

pub mod clock;
pub mod constants;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod particles;
pub mod profile;
pub mod session;
pub mod surface;
pub mod tiles;
pub mod types;

pub use clock::*;
pub use constants::*;
pub use emitter::*;
pub use engine::*;
pub use error::*;
pub use mapper::*;
pub use particles::*;
pub use profile::*;
pub use session::*;
pub use surface::*;
pub use tiles::*;
pub use types::*;
