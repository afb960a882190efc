use std::sync::Arc;

use winit::dpi::LogicalSize;
use winit::window::Window;

use crate::coords::Extent;

/// Window-system queries the viewport is derived from.
///
/// The core only reads sizes through this trait; window creation and event
/// delivery stay with the runtime.
pub trait WindowSurface {
    /// Framebuffer size in physical pixels.
    fn framebuffer_size(&self) -> Extent;

    /// Window size in logical (pre-DPI-scaling) units.
    fn logical_size(&self) -> Extent;
}

impl WindowSurface for Window {
    fn framebuffer_size(&self) -> Extent {
        self.inner_size().into()
    }

    fn logical_size(&self) -> Extent {
        let logical: LogicalSize<f64> = self.inner_size().to_logical(self.scale_factor());
        Extent::new(logical.width.round() as u32, logical.height.round() as u32)
    }
}

impl<T: WindowSurface + ?Sized> WindowSurface for Arc<T> {
    fn framebuffer_size(&self) -> Extent {
        (**self).framebuffer_size()
    }

    fn logical_size(&self) -> Extent {
        (**self).logical_size()
    }
}
