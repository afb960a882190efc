//! minimax engine crate.
//!
//! Core of a real-time 3D viewer: a frame clock, spring animation, a
//! two-pass render pipeline (geometry then UI overlay) and the viewport
//! reconciliation that keeps the backbuffer, the pass targets and the
//! device-pixel-ratio coherent across window resizes.

pub mod anim;
pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;
pub mod render;
pub mod scene;
pub mod time;
pub mod ui;
pub mod viewport;
pub mod window;

pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
