//! Render pipeline tests
//!
//! Tests for:
//! - fixed pass order (geometry strictly before UI, every frame)
//! - the begin/submit bracket, including failing passes
//! - refusal to render while reconciling or with stale targets
//! - animation time taken from the frame clock, clamped after stalls

mod support;

use std::time::{Duration, Instant};

use minimax_engine::coords::{ColorRgba, Extent};
use minimax_engine::device::{GraphicsDevice, ResetFlags, SurfaceErrorAction};
use minimax_engine::error::RenderError;
use minimax_engine::render::{FrameOutcome, PassKind, RenderPipeline};
use minimax_engine::scene::{Camera, Scene};
use minimax_engine::time::{FrameClock, MAX_FRAME_DT};
use minimax_engine::ui::Overlay;
use minimax_engine::viewport::{ReconcilePhase, ViewportState};

use support::{DeviceHandle, Log, MockDevice, MockPass, PassHandle};

const LOGICAL: Extent = Extent { width: 800, height: 600 };
const PHYSICAL: Extent = Extent { width: 1600, height: 1200 };

struct Fixture {
    log: Log,
    start: Instant,
    device: MockDevice,
    device_handle: DeviceHandle,
    geometry: PassHandle,
    ui: PassHandle,
    pipeline: RenderPipeline<MockDevice>,
    viewport: ViewportState,
    overlay: Overlay,
    scene: Scene,
    camera: Camera,
}

impl Fixture {
    fn new() -> Self {
        let log = Log::default();
        let (device, device_handle) = MockDevice::new(PHYSICAL, &log);
        let (geometry_pass, geometry) = MockPass::new(PassKind::Geometry, &log);
        let (ui_pass, ui) = MockPass::new(PassKind::Ui, &log);
        let start = Instant::now();
        let pipeline =
            RenderPipeline::new(&device, PHYSICAL, geometry_pass, ui_pass, MAX_FRAME_DT)
                .unwrap()
                .with_clock(FrameClock::starting_at(start));
        log.clear();

        Self {
            log,
            start,
            device,
            device_handle,
            geometry,
            ui,
            pipeline,
            viewport: ViewportState::from_query(LOGICAL, PHYSICAL, ColorRgba::black()),
            overlay: Overlay::default(),
            scene: Scene::empty(),
            camera: Camera::default(),
        }
    }

    fn frame(&mut self, phase: ReconcilePhase) -> Result<FrameOutcome, RenderError> {
        self.pipeline.frame(
            &mut self.device,
            &self.viewport,
            phase,
            &mut self.overlay,
            &self.scene,
            &self.camera,
        )
    }

    /// Renders a frame stamped `elapsed` after the clock's start.
    fn frame_after(&mut self, elapsed: Duration) -> Result<FrameOutcome, RenderError> {
        self.pipeline.frame_at(
            self.start + elapsed,
            &mut self.device,
            &self.viewport,
            ReconcilePhase::Stable,
            &mut self.overlay,
            &self.scene,
            &self.camera,
        )
    }
}

// ============================================================================
// Pass order
// ============================================================================

#[test]
fn geometry_runs_before_ui_inside_one_bracket() {
    let mut f = Fixture::new();

    let outcome = f.frame(ReconcilePhase::Stable).unwrap();

    assert_eq!(outcome, FrameOutcome::Rendered { frame_index: 1 });
    assert_eq!(
        f.log.entries(),
        vec![
            "begin".to_string(),
            "geometry 1 at 1600x1200".to_string(),
            "ui 1 at 1600x1200".to_string(),
            "submit 2".to_string(),
        ]
    );
}

#[test]
fn ui_sequence_is_after_geometry_on_every_frame() {
    let mut f = Fixture::new();

    for expected in 1..=5u64 {
        f.frame(ReconcilePhase::Stable).unwrap();
        let records = f.pipeline.last_frame();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, PassKind::Geometry);
        assert_eq!(records[1].kind, PassKind::Ui);
        assert!(records[1].sequence > records[0].sequence);
        assert!(records.iter().all(|r| r.frame == expected));
    }
    assert_eq!(f.pipeline.frame_index(), 5);
}

// ============================================================================
// Begin/submit bracket
// ============================================================================

#[test]
fn frame_is_submitted_when_a_pass_fails() {
    let mut f = Fixture::new();
    f.ui.set(|b| b.fail_execute = true);

    let err = f.frame(ReconcilePhase::Stable).unwrap_err();

    assert!(matches!(err, RenderError::Pass(_)));
    assert_eq!(f.log.entries().last().map(String::as_str), Some("submit 1"));
    assert_eq!(f.log.count_prefix("begin"), 1);
}

#[test]
fn geometry_failure_skips_ui_but_still_submits() {
    let mut f = Fixture::new();
    f.geometry.set(|b| b.fail_execute = true);

    assert!(f.frame(ReconcilePhase::Stable).is_err());

    assert_eq!(f.log.count_prefix("ui"), 0);
    assert!(f.log.contains("submit 0"));
}

#[test]
fn transient_acquire_failure_skips_the_frame() {
    let mut f = Fixture::new();
    f.device_handle
        .set(|b| b.begin_failure = Some(SurfaceErrorAction::SkipFrame));

    assert_eq!(f.frame(ReconcilePhase::Stable).unwrap(), FrameOutcome::Skipped);
    assert_eq!(f.log.count_prefix("geometry"), 0);

    // The next frame goes through.
    assert!(matches!(
        f.frame(ReconcilePhase::Stable).unwrap(),
        FrameOutcome::Rendered { .. }
    ));
}

#[test]
fn fatal_acquire_failure_is_reported() {
    let mut f = Fixture::new();
    f.device_handle
        .set(|b| b.begin_failure = Some(SurfaceErrorAction::Fatal));

    let err = f.frame(ReconcilePhase::Stable).unwrap_err();
    assert!(err.is_fatal());
}

// ============================================================================
// Guards
// ============================================================================

#[test]
fn nothing_runs_while_reconciling() {
    let mut f = Fixture::new();

    let err = f.frame(ReconcilePhase::Reconciling).unwrap_err();

    assert!(matches!(err, RenderError::NotStable));
    assert!(f.log.entries().is_empty());
    assert_eq!(f.pipeline.frame_index(), 0);
}

#[test]
fn stale_backbuffer_is_refused() {
    let mut f = Fixture::new();
    f.viewport = ViewportState::from_query(
        Extent::new(1000, 750),
        Extent::new(2000, 1500),
        ColorRgba::black(),
    );

    let err = f.frame(ReconcilePhase::Stable).unwrap_err();

    assert!(err.is_stale());
    assert!(matches!(err, RenderError::StaleBackbuffer { .. }));
    assert!(f.log.entries().is_empty());
}

#[test]
fn stale_pass_target_is_refused() {
    let mut f = Fixture::new();
    let size = Extent::new(2000, 1500);
    f.device.reset(size, ResetFlags::default()).unwrap();
    f.viewport = ViewportState::from_query(Extent::new(1000, 750), size, ColorRgba::black());

    let err = f.frame(ReconcilePhase::Stable).unwrap_err();

    match err {
        RenderError::StalePass { pass, target, expected } => {
            assert_eq!(pass, PassKind::Geometry);
            assert_eq!(target, Some(PHYSICAL));
            assert_eq!(expected, size);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn empty_viewport_skips() {
    let mut f = Fixture::new();
    f.viewport = ViewportState::from_query(Extent::default(), Extent::default(), ColorRgba::black());

    assert_eq!(f.frame(ReconcilePhase::Stable).unwrap(), FrameOutcome::Skipped);
    assert!(f.log.entries().is_empty());
}

// ============================================================================
// Animation timing
// ============================================================================

#[test]
fn stalled_frame_steps_animations_by_the_clamped_dt() {
    let mut f = Fixture::new();
    f.overlay.toggle();
    let mut expected = f.overlay.clone();
    expected.step(MAX_FRAME_DT);

    f.frame_after(Duration::from_secs(3)).unwrap();

    assert_eq!(f.overlay.slide(), expected.slide());
    assert_eq!(f.overlay.opacity(), expected.opacity());
    assert_eq!(f.pipeline.clock().dt(), 3.0);
}

#[test]
fn short_frame_steps_animations_by_the_elapsed_time() {
    let mut f = Fixture::new();
    f.overlay.toggle();
    let elapsed = Duration::from_millis(16);
    let mut expected = f.overlay.clone();
    expected.step(elapsed.as_secs_f64());

    f.frame_after(elapsed).unwrap();

    assert_eq!(f.overlay.slide(), expected.slide());
    assert!(f.overlay.slide() < 1.0);
    assert!(f.overlay.is_animating());
}

#[test]
fn animation_time_accumulates_across_frames() {
    let mut f = Fixture::new();
    f.overlay.toggle();
    let mut expected = f.overlay.clone();

    for ms in [16u64, 33, 50] {
        f.frame_after(Duration::from_millis(ms)).unwrap();
    }
    for dt in [0.016, 0.017, 0.017] {
        expected.step(dt);
    }

    assert!((f.overlay.slide() - expected.slide()).abs() < 1e-9);
}
