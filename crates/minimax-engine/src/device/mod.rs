//! Graphics device abstraction.
//!
//! The orchestration layer only talks to [`GraphicsDevice`]; [`WgpuDevice`] is
//! the production implementation. This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue (device init)
//! - configuring the surface (swapchain) and resetting it on resize
//! - the begin/submit bracket around each frame

mod config;
mod frame;
mod gpu;
mod surface;

pub use config::{Backend, DeviceCaps, DeviceConfig, ResetFlags};
pub use frame::GpuFrame;
pub use gpu::WgpuDevice;
pub use surface::SurfaceErrorAction;

use crate::coords::Extent;
use crate::error::DeviceError;

/// Device-side collaborator of the render pipeline.
///
/// Construction is device init and `Drop` is shutdown. A frame returned by
/// [`begin_frame`](GraphicsDevice::begin_frame) must always be handed back to
/// [`submit_frame`](GraphicsDevice::submit_frame); the pipeline enforces that
/// with a scope guard.
pub trait GraphicsDevice {
    /// In-flight frame: whatever the passes record into.
    type Frame;

    fn caps(&self) -> DeviceCaps;

    /// Current backbuffer size in physical pixels.
    fn backbuffer_size(&self) -> Extent;

    /// Resizes the backbuffer. On error the previous backbuffer stays in use.
    fn reset(&mut self, size: Extent, flags: ResetFlags) -> Result<(), DeviceError>;

    fn begin_frame(&mut self) -> Result<Self::Frame, DeviceError>;

    /// Submits and presents a frame started by `begin_frame`.
    fn submit_frame(&mut self, frame: Self::Frame);
}
