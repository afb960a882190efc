use crate::coords::{ColorRgba, Extent};
use crate::device::ResetFlags;
use crate::window::WindowSurface;

/// Authoritative record of the window's logical size, the framebuffer's
/// physical size and the ratio between them.
///
/// Every pass reads it; only the [`ResizeCoordinator`](super::ResizeCoordinator)
/// writes it, and only with sizes it has just queried from the window system.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    logical: Extent,
    physical: Extent,
    device_pixel_ratio: f64,
    background: ColorRgba,
}

impl ViewportState {
    /// Builds a viewport from a framebuffer query.
    pub fn from_query(logical: Extent, physical: Extent, background: ColorRgba) -> Self {
        Self {
            logical,
            physical,
            device_pixel_ratio: derive_dpr(logical, physical),
            background,
        }
    }

    /// Queries `window` for the current sizes.
    ///
    /// With `flags.hidpi` off the backbuffer is sized in logical units and the
    /// ratio collapses to 1.
    pub fn query<W>(window: &W, flags: ResetFlags, background: ColorRgba) -> Self
    where
        W: WindowSurface + ?Sized,
    {
        let (logical, physical) = query_sizes(window, flags);
        Self::from_query(logical, physical, background)
    }

    #[inline]
    pub fn logical(&self) -> Extent {
        self.logical
    }

    #[inline]
    pub fn physical(&self) -> Extent {
        self.physical
    }

    #[inline]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    #[inline]
    pub fn background(&self) -> ColorRgba {
        self.background
    }

    /// Aspect ratio of the physical framebuffer.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.physical.aspect()
    }

    /// Converts a logical length to device pixels.
    #[inline]
    pub fn to_device_px(&self, logical: f32) -> f32 {
        logical * self.device_pixel_ratio as f32
    }

    /// Replaces both sizes and re-derives the ratio.
    pub(super) fn apply(&mut self, logical: Extent, physical: Extent) {
        self.logical = logical;
        self.physical = physical;
        self.device_pixel_ratio = derive_dpr(logical, physical);
    }
}

pub(super) fn query_sizes<W>(window: &W, flags: ResetFlags) -> (Extent, Extent)
where
    W: WindowSurface + ?Sized,
{
    let logical = window.logical_size();
    let physical = if flags.hidpi {
        window.framebuffer_size()
    } else {
        logical
    };
    (logical, physical)
}

fn derive_dpr(logical: Extent, physical: Extent) -> f64 {
    if logical.width == 0 {
        1.0
    } else {
        physical.width as f64 / logical.width as f64
    }
}
