use std::fmt;

use crate::coords::Extent;
use crate::device::GraphicsDevice;
use crate::error::PassError;
use crate::scene::{Camera, Scene};
use crate::ui::Overlay;
use crate::viewport::ViewportState;

/// Identifies a pass in logs and frame records.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PassKind {
    /// 3D scene pass: clears and draws geometry with depth.
    Geometry,
    /// 2D overlay composited on top with blending.
    Ui,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::Geometry => f.write_str("geometry"),
            PassKind::Ui => f.write_str("ui"),
        }
    }
}

/// Everything a frame draws, borrowed for the duration of the frame.
#[derive(Clone, Copy)]
pub struct FrameContent<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub overlay: &'a Overlay,
}

/// Per-pass input for one frame.
pub struct PassInput<'a> {
    pub viewport: &'a ViewportState,
    pub content: FrameContent<'a>,
    pub frame_index: u64,
}

/// One stage of the render pipeline.
///
/// A pass owns device resources sized to the viewport's physical extent.
/// Until [`init`](RenderPass::init) has run, [`target_size`](RenderPass::target_size)
/// is `None` and the pass must not be executed.
pub trait RenderPass<D: GraphicsDevice> {
    fn kind(&self) -> PassKind;

    /// Creates the pass resources for `size`.
    fn init(&mut self, device: &D, size: Extent) -> Result<(), PassError>;

    /// Recreates size-dependent resources. On error the old ones stay valid.
    fn resize(&mut self, device: &D, size: Extent) -> Result<(), PassError>;

    /// Size of the pass targets, `None` before init.
    fn target_size(&self) -> Option<Extent>;

    /// Records the pass into `frame`.
    fn execute(
        &mut self,
        device: &D,
        frame: &mut D::Frame,
        input: &PassInput<'_>,
    ) -> Result<(), PassError>;
}
