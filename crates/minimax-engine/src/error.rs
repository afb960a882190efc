//! Error types.
//!
//! Failures are grouped the way the viewer reacts to them:
//! - [`InitError`]: window, device or pass setup failed; fatal before the loop runs
//! - [`ResizeError`]: a viewport reconciliation was rejected; the last-known-good
//!   viewport stays in effect
//! - [`AssetError`]: the scene could not be loaded; rendering goes on with an
//!   empty scene
//! - [`RenderError`]: a frame could not be issued
//!
//! Nothing here is retried transparently.

use std::path::PathBuf;

use thiserror::Error;

use crate::coords::Extent;
use crate::device::SurfaceErrorAction;
use crate::render::PassKind;

/// Errors reported by a graphics device.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Backbuffer size is empty or exceeds the device limits.
    #[error("backbuffer size {size} is not supported (max dimension {max_dimension})")]
    UnsupportedSize { size: Extent, max_dimension: u32 },

    /// No surface texture could be acquired for this frame.
    #[error("surface frame unavailable ({0:?})")]
    FrameUnavailable(SurfaceErrorAction),

    /// Backend-specific rejection.
    #[error("device rejected the request: {0}")]
    Rejected(String),
}

impl DeviceError {
    /// True when the device cannot continue rendering at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::FrameUnavailable(SurfaceErrorAction::Fatal))
    }
}

/// Errors raised by a render pass while creating or using its resources.
#[derive(Error, Debug)]
pub enum PassError {
    #[error("{pass} pass used before init")]
    NotInitialized { pass: PassKind },

    #[error("{pass} pass cannot size its targets to {size}")]
    InvalidSize { pass: PassKind, size: Extent },

    #[error("{pass} pass failed: {source}")]
    Device {
        pass: PassKind,
        #[source]
        source: DeviceError,
    },
}

/// Startup failures. Always fatal.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("window has zero size")]
    ZeroSizedWindow,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find a suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("initial backbuffer reset failed: {0}")]
    Reset(#[source] DeviceError),

    #[error("render pass initialization failed: {0}")]
    Pass(#[from] PassError),
}

/// Scene loading failures.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to import {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("{path} contains no scene")]
    NoScene { path: PathBuf },
}

/// A rejected viewport reconciliation.
#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("device reset to {size} rejected: {source}")]
    DeviceReset {
        size: Extent,
        #[source]
        source: DeviceError,
    },

    #[error("resizing pass targets to {size} failed: {source}")]
    PassResize {
        size: Extent,
        #[source]
        source: PassError,
    },

    /// Rolling back to the last-known-good size failed as well.
    #[error("rollback to {size} failed after a rejected resize: {source}")]
    Rollback {
        size: Extent,
        #[source]
        source: Box<ResizeError>,
    },
}

/// Errors that stop a frame from being issued.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Passes only run while the viewport is stable.
    #[error("viewport is being reconciled")]
    NotStable,

    #[error("backbuffer is {backbuffer} but the viewport is {expected}")]
    StaleBackbuffer { expected: Extent, backbuffer: Extent },

    #[error("{pass} pass targets are {target:?} but the viewport is {expected}")]
    StalePass {
        pass: PassKind,
        target: Option<Extent>,
        expected: Extent,
    },

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Pass(#[from] PassError),
}

impl RenderError {
    /// True when the pipeline cannot render again without a restart.
    pub fn is_fatal(&self) -> bool {
        match self {
            RenderError::Device(err) => err.is_fatal(),
            RenderError::Pass(PassError::Device { source, .. }) => source.is_fatal(),
            _ => false,
        }
    }

    /// True when a reconciliation would bring the pipeline back in line.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            RenderError::StaleBackbuffer { .. } | RenderError::StalePass { .. }
        )
    }
}

/// Top-level error surfaced to the caller of the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("initialization failed: {0}")]
    Initialization(#[from] InitError),

    #[error("viewport reconciliation failed: {0}")]
    Resize(#[from] ResizeError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
