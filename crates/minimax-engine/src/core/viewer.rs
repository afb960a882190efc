use std::path::Path;

use crate::config::ViewerConfig;
use crate::device::GraphicsDevice;
use crate::error::{InitError, RenderError, ViewerError};
use crate::render::{FrameContent, FrameOutcome, RenderPass, RenderPipeline};
use crate::scene::{self, Camera, Scene};
use crate::ui::Overlay;
use crate::viewport::{ReconcileOutcome, ResizeCoordinator, ViewportState};
use crate::window::WindowSurface;

/// A running viewer: window, device, passes, scene and camera.
///
/// Startup acquires them in that order. Fields are declared in the opposite
/// order, so dropping a `Viewer` releases the scene first, then the
/// passes (UI before geometry), the device and finally the window.
pub struct Viewer<W: WindowSurface, D: GraphicsDevice> {
    camera: Camera,
    scene: Scene,
    overlay: Overlay,
    pipeline: RenderPipeline<D>,
    coordinator: ResizeCoordinator,
    viewport: ViewportState,
    device: D,
    window: W,
}

impl<W: WindowSurface, D: GraphicsDevice> Viewer<W, D> {
    /// Finishes startup on an already created window and device.
    ///
    /// On failure everything acquired so far is released, device before
    /// window, and the error is returned. A scene that fails to load is not
    /// a startup failure: the viewer starts with an empty scene.
    pub fn start(
        window: W,
        mut device: D,
        geometry: Box<dyn RenderPass<D>>,
        ui: Box<dyn RenderPass<D>>,
        config: &ViewerConfig,
    ) -> Result<Self, InitError> {
        let flags = config.device.reset;
        let viewport = ViewportState::query(&window, flags, config.background);
        let physical = viewport.physical();
        if physical.is_empty() {
            release(device, window);
            return Err(InitError::ZeroSizedWindow);
        }
        log::info!(
            "viewport {} (logical {}, dpr {:.2})",
            physical,
            viewport.logical(),
            viewport.device_pixel_ratio()
        );

        if device.backbuffer_size() != physical {
            if let Err(err) = device.reset(physical, flags) {
                release(device, window);
                return Err(InitError::Reset(err));
            }
        }

        let pipeline = match RenderPipeline::new(&device, physical, geometry, ui, config.max_dt) {
            Ok(p) => p,
            Err(err) => {
                log::error!("render pass initialization failed: {err}");
                release(device, window);
                return Err(err.into());
            }
        };

        let scene = match config.asset.as_deref() {
            Some(path) => load_or_empty(path),
            None => {
                log::info!("no asset given; rendering an empty scene");
                Scene::empty()
            }
        };

        let camera = scene.bounds().map(|b| Camera::framing(&b)).unwrap_or_default();
        log::debug!("camera at {} looking at {}", camera.eye, camera.target);

        log::info!("viewer started");
        Ok(Self {
            camera,
            scene,
            overlay: Overlay::new(config.spring, config.overlay_visible),
            pipeline,
            coordinator: ResizeCoordinator::new(flags),
            viewport,
            device,
            window,
        })
    }

    /// Renders one frame. Skips while the window is minimized.
    pub fn frame(&mut self) -> Result<FrameOutcome, RenderError> {
        if self.coordinator.is_suspended() {
            return Ok(FrameOutcome::Skipped);
        }
        self.pipeline.frame(
            &mut self.device,
            &self.viewport,
            self.coordinator.phase(),
            &mut self.overlay,
            &self.scene,
            &self.camera,
        )
    }

    /// Reconciles the viewport with the window after a size or scale change.
    pub fn on_viewport_changed(&mut self) -> Result<ReconcileOutcome, ViewerError> {
        let content = FrameContent {
            scene: &self.scene,
            camera: &self.camera,
            overlay: &self.overlay,
        };
        self.coordinator.on_viewport_changed(
            &self.window,
            &mut self.device,
            &mut self.viewport,
            &mut self.pipeline,
            content,
        )
    }

    pub fn toggle_overlay(&mut self) {
        self.overlay.toggle();
        log::debug!("overlay {}", if self.overlay.is_visible() { "shown" } else { "hidden" });
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn pipeline(&self) -> &RenderPipeline<D> {
        &self.pipeline
    }

    pub fn coordinator(&self) -> &ResizeCoordinator {
        &self.coordinator
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Tears everything down in reverse startup order, logging each step.
    pub fn shutdown(self) {
        let Self {
            camera: _,
            scene,
            overlay,
            pipeline,
            coordinator,
            viewport,
            device,
            window,
        } = self;
        log::info!("shutting down");

        drop(scene);
        drop(overlay);
        log::debug!("scene released");
        drop(pipeline);
        log::debug!("passes released");
        drop((coordinator, viewport));
        release(device, window);
    }
}

fn load_or_empty(path: &Path) -> Scene {
    match scene::load(path) {
        Ok(scene) => scene,
        Err(err) => {
            log::warn!("{err}; continuing with an empty scene");
            Scene::empty()
        }
    }
}

fn release<W, D>(device: D, window: W) {
    drop(device);
    log::debug!("device released");
    drop(window);
    log::debug!("window released");
}
