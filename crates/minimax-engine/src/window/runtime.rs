use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::ViewerConfig;
use crate::core::Viewer;
use crate::device::WgpuDevice;
use crate::error::{InitError, ViewerError};
use crate::render::{GeometryPass, UiPass};
use crate::viewport::{ReconcileOutcome, ViewportState};

type WgpuViewer = Viewer<Arc<Window>, WgpuDevice>;

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and runs the event loop until the viewer exits.
    ///
    /// Returns the startup error if initialization failed, or the error that
    /// stopped rendering.
    pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
        let event_loop = EventLoop::new()?;
        let mut state = AppState::new(config);

        event_loop.run_app(&mut state)?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct AppState {
    config: ViewerConfig,
    viewer: Option<WgpuViewer>,
    failure: Option<ViewerError>,
    exit_requested: bool,
}

impl AppState {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            viewer: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        log::error!("{err}");
        self.failure.get_or_insert(err);
        self.request_exit(event_loop);
    }

    /// window -> device -> passes -> scene -> camera.
    fn start(&self, event_loop: &ActiveEventLoop) -> Result<WgpuViewer, InitError> {
        let size = self.config.size;
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(size.width as f64, size.height as f64));

        let window = Arc::new(event_loop.create_window(attrs)?);
        log::info!("window created");

        let mut device_config = self.config.device.clone();
        device_config.resolution =
            ViewportState::query(&window, device_config.reset, self.config.background).physical();

        let device = pollster::block_on(WgpuDevice::new(window.clone(), &device_config))?;
        log::info!("graphics device ready ({})", device_config.backend);

        Viewer::start(
            window,
            device,
            Box::new(GeometryPass::new()),
            Box::new(UiPass::new()),
            &self.config,
        )
    }

    fn reconcile(&mut self, event_loop: &ActiveEventLoop) {
        let Some(viewer) = self.viewer.as_mut() else { return };

        match viewer.on_viewport_changed() {
            Ok(ReconcileOutcome::Applied { previous, current }) => {
                log::debug!("viewport {previous} -> {current}");
            }
            Ok(ReconcileOutcome::Deferred) => {}
            Ok(ReconcileOutcome::Reverted(err)) => {
                log::warn!("keeping last-known-good viewport: {err}");
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(viewer) = self.viewer.as_mut() else { return };

        match viewer.frame() {
            Ok(_) => {}
            Err(err) if err.is_stale() => {
                log::debug!("{err}; reconciling");
                self.reconcile(event_loop);
            }
            Err(err) if err.is_fatal() => self.fail(event_loop, err.into()),
            Err(err) => log::warn!("frame failed: {err}"),
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Space) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.toggle_overlay();
                }
            }
            PhysicalKey::Code(KeyCode::Escape) => self.request_exit(event_loop),
            _ => {}
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() || self.exit_requested {
            return;
        }

        match self.start(event_loop) {
            Ok(viewer) => {
                viewer.window().request_redraw();
                self.viewer = Some(viewer);
            }
            Err(err) => self.fail(event_loop, err.into()),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the overlay animates every frame.
        if let Some(viewer) = self.viewer.as_ref() {
            viewer.window().request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.reconcile(event_loop);
            }

            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, event),

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = self.viewer.take() {
            viewer.shutdown();
        }
    }
}
