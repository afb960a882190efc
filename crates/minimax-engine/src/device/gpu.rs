use std::sync::Arc;

use winit::window::Window;

use crate::coords::Extent;
use crate::error::{DeviceError, InitError};

use super::{surface, DeviceCaps, DeviceConfig, GpuFrame, GraphicsDevice, ResetFlags};

/// wgpu implementation of [`GraphicsDevice`].
///
/// Owns the wgpu core objects and the surface configuration:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - acquires frames and provides an encoder + view for the passes
pub struct WgpuDevice {
    /// Kept alive for the surface's sake.
    _instance: wgpu::Instance,

    /// Surface bound to the window. Holds an `Arc<Window>`, so the window
    /// outlives it.
    surface: wgpu::Surface<'static>,

    window: Arc<Window>,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    present_modes: Vec<wgpu::PresentMode>,
    msaa_samples: u32,
    flags: ResetFlags,

    /// Current backbuffer size in physical pixels.
    size: Extent,
}

impl WgpuDevice {
    /// Creates a device bound to `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: Arc<Window>, init: &DeviceConfig) -> Result<Self, InitError> {
        let size = if init.resolution.is_empty() {
            Extent::from(window.inner_size())
        } else {
            init.resolution
        };
        if size.is_empty() {
            return Err(InitError::ZeroSizedWindow);
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backend.to_wgpu(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("minimax device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, init.prefer_srgb)
            .ok_or(InitError::NoSurfaceFormat)?;

        let msaa_samples = supported_sample_count(&adapter, format, init.reset.msaa);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: surface::choose_present_mode(&surface_caps.present_modes, init.reset.vsync),
            alpha_mode: surface::choose_alpha_mode(&surface_caps),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        log::debug!(
            "surface configured: {size}, {format:?}, {:?}, msaa x{msaa_samples}",
            config.present_mode
        );

        Ok(Self {
            _instance: instance,
            surface,
            window,
            adapter,
            device,
            queue,
            config,
            present_modes: surface_caps.present_modes,
            msaa_samples,
            flags: init.reset,
            size,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn flags(&self) -> ResetFlags {
        self.flags
    }
}

impl GraphicsDevice for WgpuDevice {
    type Frame = GpuFrame;

    fn caps(&self) -> DeviceCaps {
        DeviceCaps {
            backend: format!("{:?}", self.adapter.get_info().backend),
            // wgpu normalizes clip-space depth to [0, 1] on every backend.
            homogeneous_depth: false,
            max_texture_dimension: self.device.limits().max_texture_dimension_2d,
            msaa_samples: self.msaa_samples,
            surface_format: self.config.format,
        }
    }

    fn backbuffer_size(&self) -> Extent {
        self.size
    }

    /// Reconfigures the surface for `size`.
    ///
    /// wgpu cannot configure an empty surface or one larger than the texture
    /// limit; both are rejected up front and leave the current configuration
    /// untouched. The sample count is fixed at init, so `flags.msaa` changes
    /// are ignored here.
    fn reset(&mut self, size: Extent, flags: ResetFlags) -> Result<(), DeviceError> {
        let max_dimension = self.device.limits().max_texture_dimension_2d;
        if size.is_empty() || !size.fits_within(max_dimension) {
            return Err(DeviceError::UnsupportedSize { size, max_dimension });
        }

        if flags.msaa != self.flags.msaa {
            log::debug!("msaa change to x{} ignored until restart", flags.msaa);
        }

        self.config.width = size.width;
        self.config.height = size.height;
        self.config.present_mode = surface::choose_present_mode(&self.present_modes, flags.vsync);
        self.surface.configure(&self.device, &self.config);

        self.size = size;
        self.flags = ResetFlags { msaa: self.flags.msaa, ..flags };
        Ok(())
    }

    /// Acquires the next surface texture and creates an encoder.
    fn begin_frame(&mut self) -> Result<GpuFrame, DeviceError> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let action = surface::map_surface_error(
                    &self.surface,
                    &self.device,
                    &self.config,
                    self.size,
                    err,
                );
                return Err(DeviceError::FrameUnavailable(action));
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("minimax frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    fn submit_frame(&mut self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);

        self.window.pre_present_notify();
        surface_texture.present();
    }
}

impl Drop for WgpuDevice {
    fn drop(&mut self) {
        log::debug!("graphics device shut down");
    }
}

/// Highest sample count `<= requested` the format supports for rendering.
fn supported_sample_count(adapter: &wgpu::Adapter, format: wgpu::TextureFormat, requested: u32) -> u32 {
    let flags = adapter.get_texture_format_features(format).flags;
    let mut count = requested.max(1).next_power_of_two();
    while count > 1 && !flags.sample_count_supported(count) {
        count /= 2;
    }
    if count != requested.max(1) {
        log::warn!("msaa x{requested} unsupported for {format:?}; using x{count}");
    }
    count
}
