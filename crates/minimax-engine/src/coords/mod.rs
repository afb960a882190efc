//! Size, color and rectangle types shared by the viewport, the passes and the UI.
//!
//! Two pixel spaces are in play:
//! - logical pixels: what the window system reports before DPI scaling
//! - device (physical) pixels: framebuffer pixels after DPI scaling
//!
//! UI geometry is authored in logical pixels, origin top-left, +Y down, and is
//! converted to device pixels with the viewport's device-pixel-ratio.

mod color;
mod extent;
mod rect;

pub use color::ColorRgba;
pub use extent::Extent;
pub use rect::Rect;
