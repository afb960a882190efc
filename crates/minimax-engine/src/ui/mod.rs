//! Overlay UI drawn by the UI pass on top of the scene.
//!
//! The overlay authors everything in logical pixels. The UI pass scales the
//! quads by the viewport's device-pixel-ratio right before upload, so a panel
//! keeps its apparent size when the window moves to a denser display.

mod overlay;

pub use overlay::{Overlay, UiQuad};
