//! Platform abstraction layer
//!
//! - `input`: key codes to held actions, shared by every host
//! - `canvas`: HTML canvas drawing surface (web only)

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod input;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use input::{Action, HeldKeys, KeyMap};
