use std::fmt;
use std::str::FromStr;

use crate::coords::Extent;

/// Renderer backend selection.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Backend {
    /// Let wgpu pick the platform's preferred backend.
    #[default]
    Auto,
    Vulkan,
    Metal,
    Dx12,
    Gl,
}

impl Backend {
    pub fn to_wgpu(self) -> wgpu::Backends {
        match self {
            Backend::Auto => wgpu::Backends::all(),
            Backend::Vulkan => wgpu::Backends::VULKAN,
            Backend::Metal => wgpu::Backends::METAL,
            Backend::Dx12 => wgpu::Backends::DX12,
            Backend::Gl => wgpu::Backends::GL,
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "vulkan" | "vk" => Ok(Backend::Vulkan),
            "metal" => Ok(Backend::Metal),
            "dx12" | "d3d12" => Ok(Backend::Dx12),
            "gl" | "opengl" | "gles" => Ok(Backend::Gl),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Auto => "auto",
            Backend::Vulkan => "vulkan",
            Backend::Metal => "metal",
            Backend::Dx12 => "dx12",
            Backend::Gl => "gl",
        };
        f.write_str(name)
    }
}

/// Flags applied on every backbuffer reset.
///
/// The resize path re-applies the same flags it was started with, so vsync
/// and multisampling survive every reconciliation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResetFlags {
    /// Present in sync with the display refresh.
    pub vsync: bool,

    /// Size the backbuffer in physical pixels. When off, the backbuffer uses
    /// the logical window size and the device-pixel-ratio is 1.
    pub hidpi: bool,

    /// Requested sample count for the geometry targets (1 disables MSAA).
    pub msaa: u32,
}

impl Default for ResetFlags {
    fn default() -> Self {
        Self {
            vsync: true,
            hidpi: true,
            msaa: 4,
        }
    }
}

/// Initialization parameters for the graphics device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub backend: Backend,

    /// Initial backbuffer size in physical pixels. An empty extent means
    /// "use the window's current framebuffer size".
    pub resolution: Extent,

    pub reset: ResetFlags,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Desired maximum frame latency for the surface. A hint; support
    /// depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Auto,
            resolution: Extent::default(),
            reset: ResetFlags::default(),
            prefer_srgb: true,
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Capabilities queried from the device. Read-only during a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCaps {
    /// Backend name as reported by the adapter.
    pub backend: String,

    /// Clip-space depth spans [-1, 1] (GL convention) rather than [0, 1].
    pub homogeneous_depth: bool,

    /// Largest supported 2D texture dimension.
    pub max_texture_dimension: u32,

    /// Sample count actually used for multisampled targets.
    pub msaa_samples: u32,

    /// Color format of the backbuffer.
    pub surface_format: wgpu::TextureFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_aliases_case_insensitively() {
        assert_eq!("Vulkan".parse::<Backend>(), Ok(Backend::Vulkan));
        assert_eq!("d3d12".parse::<Backend>(), Ok(Backend::Dx12));
        assert_eq!("GLES".parse::<Backend>(), Ok(Backend::Gl));
        assert!("glide".parse::<Backend>().is_err());
    }

    #[test]
    fn backend_display_round_trips_through_parse() {
        for b in [Backend::Auto, Backend::Vulkan, Backend::Metal, Backend::Dx12, Backend::Gl] {
            assert_eq!(b.to_string().parse::<Backend>(), Ok(b));
        }
    }

    #[test]
    fn default_flags_match_the_viewer_defaults() {
        let f = ResetFlags::default();
        assert!(f.vsync && f.hidpi);
        assert_eq!(f.msaa, 4);
    }
}
