//! Mock window, device and passes shared by the integration tests.
//!
//! Every mock writes to one shared [`Log`], so tests can assert on the exact
//! order of begin/execute/submit/reset/drop events.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use minimax_engine::coords::Extent;
use minimax_engine::device::{DeviceCaps, GraphicsDevice, ResetFlags, SurfaceErrorAction};
use minimax_engine::error::{DeviceError, PassError};
use minimax_engine::render::{PassInput, PassKind, RenderPass};
use minimax_engine::window::WindowSurface;

// ============================================================================
// Log
// ============================================================================

#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.borrow().iter().any(|e| e == entry)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

// ============================================================================
// Window
// ============================================================================

#[derive(Clone, Copy)]
struct Sizes {
    logical: Extent,
    physical: Extent,
}

/// Lets a test change what the window reports after the window was moved.
#[derive(Clone)]
pub struct WindowHandle(Rc<RefCell<Sizes>>);

impl WindowHandle {
    pub fn resize(&self, logical: Extent, dpr: u32) {
        *self.0.borrow_mut() = Sizes {
            logical,
            physical: Extent::new(logical.width * dpr, logical.height * dpr),
        };
    }
}

pub struct MockWindow {
    sizes: Rc<RefCell<Sizes>>,
    log: Log,
}

impl MockWindow {
    pub fn new(logical: Extent, dpr: u32, log: &Log) -> (Self, WindowHandle) {
        let sizes = Rc::new(RefCell::new(Sizes {
            logical,
            physical: Extent::new(logical.width * dpr, logical.height * dpr),
        }));
        let handle = WindowHandle(sizes.clone());
        (
            Self {
                sizes,
                log: log.clone(),
            },
            handle,
        )
    }
}

impl WindowSurface for MockWindow {
    fn framebuffer_size(&self) -> Extent {
        self.sizes.borrow().physical
    }

    fn logical_size(&self) -> Extent {
        self.sizes.borrow().logical
    }
}

impl Drop for MockWindow {
    fn drop(&mut self) {
        self.log.push("window dropped");
    }
}

// ============================================================================
// Device
// ============================================================================

#[derive(Default)]
pub struct DeviceBehavior {
    /// Every reset fails.
    pub reject_resets: bool,
    /// Resets larger than this in either dimension fail.
    pub max_dimension: Option<u32>,
    /// The next `begin_frame` fails with this action.
    pub begin_failure: Option<SurfaceErrorAction>,
}

#[derive(Clone, Default)]
pub struct DeviceHandle(Rc<RefCell<DeviceBehavior>>);

impl DeviceHandle {
    pub fn set(&self, f: impl FnOnce(&mut DeviceBehavior)) {
        f(&mut self.0.borrow_mut());
    }
}

pub struct MockFrame {
    pub index: u64,
    pub passes: Vec<PassKind>,
}

pub struct MockDevice {
    backbuffer: Extent,
    behavior: Rc<RefCell<DeviceBehavior>>,
    frames: u64,
    log: Log,
}

impl MockDevice {
    pub fn new(backbuffer: Extent, log: &Log) -> (Self, DeviceHandle) {
        let handle = DeviceHandle::default();
        (
            Self {
                backbuffer,
                behavior: handle.0.clone(),
                frames: 0,
                log: log.clone(),
            },
            handle,
        )
    }
}

impl GraphicsDevice for MockDevice {
    type Frame = MockFrame;

    fn caps(&self) -> DeviceCaps {
        DeviceCaps {
            backend: "mock".into(),
            homogeneous_depth: false,
            max_texture_dimension: 16384,
            msaa_samples: 4,
            surface_format: wgpu::TextureFormat::Bgra8UnormSrgb,
        }
    }

    fn backbuffer_size(&self) -> Extent {
        self.backbuffer
    }

    fn reset(&mut self, size: Extent, _flags: ResetFlags) -> Result<(), DeviceError> {
        let behavior = self.behavior.borrow();
        let too_big = behavior
            .max_dimension
            .is_some_and(|max| !size.fits_within(max));
        if behavior.reject_resets || too_big {
            self.log.push(format!("reset {size} rejected"));
            return Err(DeviceError::Rejected(format!("cannot reset to {size}")));
        }
        self.log.push(format!("reset {size}"));
        self.backbuffer = size;
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<MockFrame, DeviceError> {
        if let Some(action) = self.behavior.borrow_mut().begin_failure.take() {
            self.log.push("begin failed");
            return Err(DeviceError::FrameUnavailable(action));
        }
        self.frames += 1;
        self.log.push("begin");
        Ok(MockFrame {
            index: self.frames,
            passes: Vec::new(),
        })
    }

    fn submit_frame(&mut self, frame: MockFrame) {
        self.log.push(format!("submit {}", frame.passes.len()));
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.log.push("device dropped");
    }
}

// ============================================================================
// Passes
// ============================================================================

#[derive(Default)]
pub struct PassBehavior {
    pub fail_init: bool,
    pub fail_execute: bool,
    /// Every resize fails.
    pub fail_resize: bool,
    /// Resizes larger than this in either dimension fail.
    pub max_dimension: Option<u32>,
}

#[derive(Clone, Default)]
pub struct PassHandle(Rc<RefCell<PassBehavior>>);

impl PassHandle {
    pub fn set(&self, f: impl FnOnce(&mut PassBehavior)) {
        f(&mut self.0.borrow_mut());
    }
}

pub struct MockPass {
    kind: PassKind,
    size: Option<Extent>,
    behavior: Rc<RefCell<PassBehavior>>,
    log: Log,
}

impl MockPass {
    pub fn new(kind: PassKind, log: &Log) -> (Box<Self>, PassHandle) {
        let handle = PassHandle::default();
        (
            Box::new(Self {
                kind,
                size: None,
                behavior: handle.0.clone(),
                log: log.clone(),
            }),
            handle,
        )
    }

    fn check(&self, size: Extent) -> Result<(), PassError> {
        let behavior = self.behavior.borrow();
        let too_big = behavior
            .max_dimension
            .is_some_and(|max| !size.fits_within(max));
        if behavior.fail_resize || too_big {
            return Err(PassError::InvalidSize {
                pass: self.kind,
                size,
            });
        }
        Ok(())
    }
}

impl RenderPass<MockDevice> for MockPass {
    fn kind(&self) -> PassKind {
        self.kind
    }

    fn init(&mut self, _device: &MockDevice, size: Extent) -> Result<(), PassError> {
        if self.behavior.borrow().fail_init {
            self.log.push(format!("{} init failed", self.kind));
            return Err(PassError::InvalidSize {
                pass: self.kind,
                size,
            });
        }
        self.log.push(format!("{} init {size}", self.kind));
        self.size = Some(size);
        Ok(())
    }

    fn resize(&mut self, _device: &MockDevice, size: Extent) -> Result<(), PassError> {
        if let Err(err) = self.check(size) {
            self.log.push(format!("{} resize {size} rejected", self.kind));
            return Err(err);
        }
        self.log.push(format!("{} resize {size}", self.kind));
        self.size = Some(size);
        Ok(())
    }

    fn target_size(&self) -> Option<Extent> {
        self.size
    }

    fn execute(
        &mut self,
        _device: &MockDevice,
        frame: &mut MockFrame,
        input: &PassInput<'_>,
    ) -> Result<(), PassError> {
        if self.behavior.borrow().fail_execute {
            self.log.push(format!("{} failed", self.kind));
            return Err(PassError::Device {
                pass: self.kind,
                source: DeviceError::Rejected("execute failed".into()),
            });
        }
        frame.passes.push(self.kind);
        self.log.push(format!(
            "{} {} at {}",
            self.kind,
            frame.index,
            input.viewport.physical()
        ));
        Ok(())
    }
}

impl Drop for MockPass {
    fn drop(&mut self) {
        self.log.push(format!("{} dropped", self.kind));
    }
}
