use crate::coords::Extent;
use crate::device::{GraphicsDevice, ResetFlags};
use crate::error::{ResizeError, ViewerError};
use crate::render::{FrameContent, RenderPipeline};
use crate::window::WindowSurface;

use super::state::query_sizes;
use super::ViewportState;

/// Whether the viewport may be read by the passes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ReconcilePhase {
    #[default]
    Stable,
    /// Between a resize notification and the end of its synchronous render.
    Reconciling,
}

/// Result of one reconciliation.
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// Device, passes and viewport now agree on `current`.
    Applied { previous: Extent, current: Extent },

    /// The framebuffer is empty (minimized window). Nothing was touched and
    /// the last-known-good viewport stays in effect.
    Deferred,

    /// The new size was rejected; everything stays at the last-known-good size.
    Reverted(ResizeError),
}

/// Keeps the viewport, the device backbuffer and the pass targets in step.
///
/// Every call re-derives the viewport from the window system instead of
/// patching the previous one, so a resize that arrives while another is
/// being handled simply runs the whole sequence again.
#[derive(Debug)]
pub struct ResizeCoordinator {
    phase: ReconcilePhase,
    flags: ResetFlags,
    suspended: bool,
    reconciles: u64,
    reverts: u64,
}

impl ResizeCoordinator {
    /// `flags` are re-applied on every device reset.
    pub fn new(flags: ResetFlags) -> Self {
        Self {
            phase: ReconcilePhase::Stable,
            flags,
            suspended: false,
            reconciles: 0,
            reverts: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> ReconcilePhase {
        self.phase
    }

    #[inline]
    pub fn flags(&self) -> ResetFlags {
        self.flags
    }

    /// True while the window reports an empty framebuffer.
    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Number of reconciliations started.
    pub fn reconciles(&self) -> u64 {
        self.reconciles
    }

    /// Number of reconciliations that fell back to the last-known-good size.
    pub fn reverts(&self) -> u64 {
        self.reverts
    }

    /// Entry point for the window system's framebuffer-size notifications.
    pub fn on_viewport_changed<W, D>(
        &mut self,
        window: &W,
        device: &mut D,
        viewport: &mut ViewportState,
        pipeline: &mut RenderPipeline<D>,
        content: FrameContent<'_>,
    ) -> Result<ReconcileOutcome, ViewerError>
    where
        W: WindowSurface + ?Sized,
        D: GraphicsDevice,
    {
        log::debug!("viewport change notified (current {})", viewport.physical());
        self.reconcile_and_render_once(window, device, viewport, pipeline, content)
    }

    /// Re-queries the window, resets the device, resizes the passes, commits
    /// the viewport and renders one frame at the new size.
    ///
    /// Always ends in [`ReconcilePhase::Stable`]. Only a failed rollback is an
    /// error; a rejected size is reported as [`ReconcileOutcome::Reverted`].
    pub fn reconcile_and_render_once<W, D>(
        &mut self,
        window: &W,
        device: &mut D,
        viewport: &mut ViewportState,
        pipeline: &mut RenderPipeline<D>,
        content: FrameContent<'_>,
    ) -> Result<ReconcileOutcome, ViewerError>
    where
        W: WindowSurface + ?Sized,
        D: GraphicsDevice,
    {
        self.phase = ReconcilePhase::Reconciling;
        self.reconciles += 1;
        let outcome = self.reconcile(window, device, viewport, pipeline, content);
        self.phase = ReconcilePhase::Stable;

        if matches!(outcome, Ok(ReconcileOutcome::Reverted(_)) | Err(_)) {
            self.reverts += 1;
        }
        outcome
    }

    fn reconcile<W, D>(
        &mut self,
        window: &W,
        device: &mut D,
        viewport: &mut ViewportState,
        pipeline: &mut RenderPipeline<D>,
        content: FrameContent<'_>,
    ) -> Result<ReconcileOutcome, ViewerError>
    where
        W: WindowSurface + ?Sized,
        D: GraphicsDevice,
    {
        // 1. re-query
        let (logical, physical) = query_sizes(window, self.flags);
        if logical.is_empty() || physical.is_empty() {
            log::debug!("framebuffer is empty; keeping {}", viewport.physical());
            self.suspended = true;
            return Ok(ReconcileOutcome::Deferred);
        }
        self.suspended = false;

        // 2. derive the candidate (ratio included) without committing it
        let previous = *viewport;
        let candidate = ViewportState::from_query(logical, physical, previous.background());
        log::debug!(
            "reconciling viewport {} -> {} (logical {}, dpr {:.3})",
            previous.physical(),
            candidate.physical(),
            candidate.logical(),
            candidate.device_pixel_ratio()
        );

        // 3. device backbuffer
        if let Err(source) = device.reset(physical, self.flags) {
            log::warn!(
                "device reset to {physical} rejected, staying at {}: {source}",
                previous.physical()
            );
            return Ok(ReconcileOutcome::Reverted(ResizeError::DeviceReset {
                size: physical,
                source,
            }));
        }

        // 4. pass targets
        if let Err(source) = pipeline.resize(device, physical) {
            log::warn!(
                "pass resize to {physical} failed, rolling back to {}: {source}",
                previous.physical()
            );
            let rejected = ResizeError::PassResize { size: physical, source };
            self.roll_back(device, pipeline, previous.physical(), &rejected)?;
            return Ok(ReconcileOutcome::Reverted(rejected));
        }

        // 5. commit and render once at the new size
        viewport.apply(candidate.logical(), candidate.physical());
        if let Err(err) = pipeline.render_reconciled(device, viewport, content) {
            log::warn!("render after resize to {physical} failed: {err}");
        }

        Ok(ReconcileOutcome::Applied {
            previous: previous.physical(),
            current: physical,
        })
    }

    fn roll_back<D: GraphicsDevice>(
        &self,
        device: &mut D,
        pipeline: &mut RenderPipeline<D>,
        size: Extent,
        rejected: &ResizeError,
    ) -> Result<(), ResizeError> {
        let restored = device
            .reset(size, self.flags)
            .map_err(|source| ResizeError::DeviceReset { size, source })
            .and_then(|()| {
                pipeline
                    .resize(device, size)
                    .map_err(|source| ResizeError::PassResize { size, source })
            });

        restored.map_err(|err| {
            log::error!("rollback to {size} failed after '{rejected}': {err}");
            ResizeError::Rollback {
                size,
                source: Box::new(err),
            }
        })
    }
}
