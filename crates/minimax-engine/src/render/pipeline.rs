use std::time::Instant;

use crate::coords::Extent;
use crate::device::GraphicsDevice;
use crate::error::{PassError, RenderError};
use crate::scene::{Camera, Scene};
use crate::time::FrameClock;
use crate::ui::Overlay;
use crate::viewport::{ReconcilePhase, ViewportState};

use super::{FrameContent, PassInput, PassKind, RenderPass};

/// One executed pass within a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PassRecord {
    pub kind: PassKind,
    pub frame: u64,
    /// Monotonic across all frames; later passes get larger numbers.
    pub sequence: u64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// Both passes ran and the frame was submitted.
    Rendered { frame_index: u64 },
    /// Nothing was drawn (empty viewport or no surface texture this time).
    Skipped,
}

/// Fixed two-pass frame orchestration.
///
/// Per frame: step the clock, step the overlay springs with the clamped dt,
/// begin a device frame, run the geometry pass, run the UI pass, submit.
/// The passes are two named fields rather than a list, so the order cannot
/// be changed or a pass skipped.
pub struct RenderPipeline<D: GraphicsDevice> {
    clock: FrameClock,
    max_dt: f64,

    // Fields drop top to bottom: UI pass first, then geometry.
    ui: Box<dyn RenderPass<D>>,
    geometry: Box<dyn RenderPass<D>>,

    frame_index: u64,
    sequence: u64,
    last_frame: Vec<PassRecord>,
}

impl<D: GraphicsDevice> RenderPipeline<D> {
    /// Initializes both passes at `size`, geometry first.
    ///
    /// If the UI pass fails, the already-initialized geometry pass is
    /// released before the error is returned.
    pub fn new(
        device: &D,
        size: Extent,
        mut geometry: Box<dyn RenderPass<D>>,
        mut ui: Box<dyn RenderPass<D>>,
        max_dt: f64,
    ) -> Result<Self, PassError> {
        geometry.init(device, size)?;
        ui.init(device, size)?;
        log::info!("render pipeline initialized at {size}");

        Ok(Self {
            clock: FrameClock::new(),
            max_dt,
            ui,
            geometry,
            frame_index: 0,
            sequence: 0,
            last_frame: Vec::with_capacity(2),
        })
    }

    /// Replaces the frame clock, e.g. with one started at a known instant.
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Resizes every pass's targets to `size`, in pipeline order.
    pub fn resize(&mut self, device: &D, size: Extent) -> Result<(), PassError> {
        self.geometry.resize(device, size)?;
        self.ui.resize(device, size)?;
        Ok(())
    }

    /// Runs one full frame timed by the monotonic clock.
    ///
    /// Refuses to run while the viewport is being reconciled; the coordinator
    /// issues its own synchronous render in that window.
    pub fn frame(
        &mut self,
        device: &mut D,
        viewport: &ViewportState,
        phase: ReconcilePhase,
        overlay: &mut Overlay,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<FrameOutcome, RenderError> {
        self.frame_at(Instant::now(), device, viewport, phase, overlay, scene, camera)
    }

    /// Runs one full frame as if the clock read `now`.
    ///
    /// Animations advance by the elapsed time clamped to `max_dt`.
    #[allow(clippy::too_many_arguments)]
    pub fn frame_at(
        &mut self,
        now: Instant,
        device: &mut D,
        viewport: &ViewportState,
        phase: ReconcilePhase,
        overlay: &mut Overlay,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<FrameOutcome, RenderError> {
        if phase != ReconcilePhase::Stable {
            return Err(RenderError::NotStable);
        }

        let time = self.clock.step_at(now);
        let dt = time.clamped(self.max_dt);
        if dt < time.dt {
            log::debug!("frame took {:.3}s, animations step {dt:.3}s", time.dt);
        }
        overlay.step(dt);

        let content = FrameContent { scene, camera, overlay };
        self.render(device, viewport, content)
    }

    /// Re-renders the current content without advancing time. Reserved for
    /// the resize coordinator.
    pub(crate) fn render_reconciled(
        &mut self,
        device: &mut D,
        viewport: &ViewportState,
        content: FrameContent<'_>,
    ) -> Result<FrameOutcome, RenderError> {
        self.render(device, viewport, content)
    }

    fn render(
        &mut self,
        device: &mut D,
        viewport: &ViewportState,
        content: FrameContent<'_>,
    ) -> Result<FrameOutcome, RenderError> {
        let expected = viewport.physical();
        if expected.is_empty() {
            return Ok(FrameOutcome::Skipped);
        }
        self.check_coherent(device, expected)?;

        let mut scope = match FrameScope::begin(device) {
            Ok(scope) => scope,
            Err(err) if !err.is_fatal() => {
                log::debug!("frame skipped: {err}");
                return Ok(FrameOutcome::Skipped);
            }
            Err(err) => return Err(err.into()),
        };

        self.frame_index += 1;
        let frame_index = self.frame_index;
        self.last_frame.clear();

        let input = PassInput {
            viewport,
            content,
            frame_index,
        };

        let Self {
            geometry,
            ui,
            sequence,
            last_frame,
            ..
        } = self;

        let recorded = scope.record(|device, frame| {
            for pass in [&mut **geometry, &mut **ui] {
                *sequence += 1;
                let seq = *sequence;
                pass.execute(device, frame, &input)?;
                last_frame.push(PassRecord {
                    kind: pass.kind(),
                    frame: frame_index,
                    sequence: seq,
                });
            }
            Ok::<(), PassError>(())
        });

        // Submits, whatever the passes returned.
        drop(scope);

        if let Some(Err(err)) = recorded {
            return Err(err.into());
        }
        Ok(FrameOutcome::Rendered { frame_index })
    }

    /// Backbuffer and every pass target must match the viewport.
    fn check_coherent(&self, device: &D, expected: Extent) -> Result<(), RenderError> {
        let backbuffer = device.backbuffer_size();
        if backbuffer != expected {
            return Err(RenderError::StaleBackbuffer { expected, backbuffer });
        }

        for pass in [&*self.geometry, &*self.ui] {
            let target = pass.target_size();
            if target != Some(expected) {
                return Err(RenderError::StalePass {
                    pass: pass.kind(),
                    target,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Passes executed in the most recent frame, in execution order.
    pub fn last_frame(&self) -> &[PassRecord] {
        &self.last_frame
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Target sizes of the geometry and UI passes, in pipeline order.
    pub fn pass_sizes(&self) -> [(PassKind, Option<Extent>); 2] {
        [
            (self.geometry.kind(), self.geometry.target_size()),
            (self.ui.kind(), self.ui.target_size()),
        ]
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }
}

/// Begin/submit bracket around one device frame.
///
/// The frame is submitted when the scope drops, so early returns and
/// unwinding out of a pass still hand the frame back to the device.
struct FrameScope<'d, D: GraphicsDevice> {
    device: &'d mut D,
    frame: Option<D::Frame>,
}

impl<'d, D: GraphicsDevice> FrameScope<'d, D> {
    fn begin(device: &'d mut D) -> Result<Self, crate::error::DeviceError> {
        let frame = device.begin_frame()?;
        Ok(Self {
            device,
            frame: Some(frame),
        })
    }

    fn record<R>(&mut self, f: impl FnOnce(&D, &mut D::Frame) -> R) -> Option<R> {
        let frame = self.frame.as_mut()?;
        Some(f(&*self.device, frame))
    }
}

impl<D: GraphicsDevice> Drop for FrameScope<'_, D> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.device.submit_frame(frame);
        }
    }
}
