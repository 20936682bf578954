/// Largest accepted surface edge in pixels. Widgets are small; this keeps a
/// bad size from allocating gigabytes.
pub const MAX_SURFACE_SIZE: u32 = 4096;

/// Default tile size for dirty tracking.
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Maximum ticks a single `advance` call will run before dropping deadlines.
pub const MAX_CATCH_UP_TICKS: u32 = 8;

/// Longest accepted tick period (one hour).
pub const MAX_TICK_PERIOD_MS: u64 = 3_600_000;

/// Most points a single pointer move is interpolated into.
pub const MAX_INTERPOLATION_STEPS: u32 = 8192;

/// On-screen bounds narrower or shorter than this are not rescaled.
pub const MIN_BOUNDS_SIZE: f32 = 1.0;

/// Below this distance a pointer move is treated as stationary.
pub const MIN_MOVE_DISTANCE: f32 = 0.001;
