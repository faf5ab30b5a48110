//! Ledge - a 2D platformer engine with a level editor
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (collision, ground attachment, paths, particles)
//! - `render`: Drawing-surface boundary and per-entity drawing
//! - `level`: Textual level description codec
//! - `editor`: Level editor document model
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Data-driven tuning

pub mod editor;
pub mod level;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Engine-wide constants
pub mod consts {
    /// Nominal frame length in milliseconds. One unit of `dt` is one frame.
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Ticks with `dt` at or above this many frames are skipped outright
    /// (tab backgrounding, debugger pauses).
    pub const MAX_FRAME_DT: f32 = 6.0;
    /// Default frame count between path waypoints
    pub const DEFAULT_PATH_FRAMES: f32 = 120.0;

    /// Player box size
    pub const PLAYER_SIZE: f32 = 20.0;
    /// Enemy box size (before any shrinking)
    pub const ENEMY_SIZE: f32 = 20.0;
    /// Victory zone diameter
    pub const VICTORY_SIZE: f32 = 30.0;
}

/// Convert a wall-clock delta in milliseconds into frame units
#[inline]
pub fn frames_from_millis(ms: f64) -> f32 {
    (ms / consts::FRAME_MS) as f32
}
