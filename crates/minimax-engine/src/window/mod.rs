//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and wires them to the viewer.
//! [`WindowSurface`] is the only window API the rest of the crate sees.

mod runtime;
mod surface;

pub use runtime::Runtime;
pub use surface::WindowSurface;
