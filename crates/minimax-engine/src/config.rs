//! Viewer configuration.
//!
//! Built once at startup, usually from the command line through [`CliArgs`]:
//!
//! ```text
//! minimax-viewer [PATH] [--width N] [--height N] [--no-vsync] [--no-hidpi]
//!                [--msaa N] [--backend auto|vulkan|metal|dx12|gl]
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::anim::SpringConfig;
use crate::coords::{ColorRgba, Extent};
use crate::device::{Backend, DeviceConfig};
use crate::time::MAX_FRAME_DT;

/// Environment variable consulted when no asset path is given.
pub const ASSET_ENV: &str = "MINIMAX_ASSET";

/// Command line of the viewer binary.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "minimax-viewer", version)]
#[command(about = "Real-time glTF/GLB viewer with a springy overlay panel")]
pub struct CliArgs {
    /// Path to a .gltf or .glb file; an empty scene is shown without one
    #[arg(env = "MINIMAX_ASSET", value_name = "PATH")]
    pub asset: Option<PathBuf>,

    /// Initial window width in logical pixels
    #[arg(long, value_name = "N", default_value_t = 800,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, value_name = "N", default_value_t = 600,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Present without waiting for vertical blank
    #[arg(long)]
    pub no_vsync: bool,

    /// Size the backbuffer in logical pixels, ignoring the display scale
    #[arg(long)]
    pub no_hidpi: bool,

    /// MSAA sample count: 1, 2, 4, 8 or 16
    #[arg(long, value_name = "N", default_value_t = 4, value_parser = parse_msaa)]
    pub msaa: u32,

    /// Renderer backend: auto, vulkan, metal, dx12 or gl
    #[arg(long, value_name = "NAME", default_value_t = Backend::Auto)]
    pub backend: Backend,
}

fn parse_msaa(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(n @ (1 | 2 | 4 | 8 | 16)) => Ok(n),
        _ => Err(format!("'{value}' is not one of 1, 2, 4, 8, 16")),
    }
}

impl From<CliArgs> for ViewerConfig {
    fn from(args: CliArgs) -> Self {
        let mut config = ViewerConfig {
            size: Extent::new(args.width, args.height),
            asset: args.asset.filter(|p| !p.as_os_str().is_empty()),
            ..ViewerConfig::default()
        };
        config.device.backend = args.backend;
        config.device.reset.vsync = !args.no_vsync;
        config.device.reset.hidpi = !args.no_hidpi;
        config.device.reset.msaa = args.msaa;
        config
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub size: Extent,
    /// glTF/GLB file to display. `None` renders an empty scene.
    pub asset: Option<PathBuf>,
    pub background: ColorRgba,
    pub device: DeviceConfig,
    /// Spring used by the overlay animations.
    pub spring: SpringConfig,
    /// Upper bound on the dt fed to animations.
    pub max_dt: f64,
    pub overlay_visible: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "minimax viewer".to_string(),
            size: Extent::new(800, 600),
            asset: None,
            background: ColorRgba::from_rgba8_hex(0x303030ff),
            device: DeviceConfig::default(),
            spring: SpringConfig::gentle(),
            max_dt: MAX_FRAME_DT,
            overlay_visible: true,
        }
    }
}

impl ViewerConfig {
    /// Parses a full command line, program name first.
    ///
    /// Help and version requests come back as errors too; `clap::Error::exit`
    /// prints them and exits with the matching status.
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        CliArgs::try_parse_from(args).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("minimax-viewer").chain(args.iter().copied()))
    }

    fn kind(args: &[&str]) -> ErrorKind {
        match parse(args) {
            Ok(parsed) => panic!("{args:?} parsed as {parsed:?}"),
            Err(err) => err.kind(),
        }
    }

    #[test]
    fn defaults_match_the_demo() {
        let c = ViewerConfig::default();
        assert_eq!(c.size, Extent::new(800, 600));
        assert!(c.asset.is_none());
        assert!(c.device.reset.vsync && c.device.reset.hidpi);
        assert_eq!(c.device.reset.msaa, 4);
        assert_eq!(c.max_dt, MAX_FRAME_DT);
    }

    #[test]
    fn empty_command_line_gives_default_device_settings() {
        let c = ViewerConfig::from(parse(&[]).unwrap());
        let d = ViewerConfig::default();
        assert_eq!(c.size, d.size);
        assert_eq!(c.device.reset, d.device.reset);
        assert_eq!(c.device.backend, Backend::Auto);
    }

    #[test]
    fn parses_path_and_flags() {
        let c = ViewerConfig::try_from_args([
            "minimax-viewer", "model.glb", "--width", "1024", "--height", "768", "--no-vsync",
            "--msaa", "1", "--backend", "gl", "--no-hidpi",
        ])
        .unwrap();
        assert_eq!(c.asset, Some(PathBuf::from("model.glb")));
        assert_eq!(c.size, Extent::new(1024, 768));
        assert!(!c.device.reset.vsync);
        assert!(!c.device.reset.hidpi);
        assert_eq!(c.device.reset.msaa, 1);
        assert_eq!(c.device.backend, Backend::Gl);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["--width"]).is_err());
        assert_eq!(kind(&["--width", "0"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--height", "tall"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--msaa", "3"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--backend", "glide"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["--fullscreen"]), ErrorKind::UnknownArgument);
        assert!(parse(&["a.glb", "b.glb"]).is_err());
    }

    #[test]
    fn help_is_reported_as_its_own_kind() {
        assert_eq!(kind(&["--help"]), ErrorKind::DisplayHelp);
        assert_eq!(kind(&["-h"]), ErrorKind::DisplayHelp);
    }

    #[test]
    fn bad_arguments_exit_with_usage_status() {
        let err = parse(&["--msaa", "3"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn asset_argument_is_bound_to_the_env_variable() {
        let cmd = <CliArgs as clap::CommandFactory>::command();
        let asset = cmd
            .get_arguments()
            .find(|a| a.get_id().as_str() == "asset")
            .unwrap();
        assert_eq!(asset.get_env(), Some(std::ffi::OsStr::new(ASSET_ENV)));
    }

    #[test]
    fn command_definition_is_consistent() {
        <CliArgs as clap::CommandFactory>::command().debug_assert();
    }
}
