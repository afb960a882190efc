use std::process::ExitCode;

use anyhow::Context;

use minimax_engine::config::ASSET_ENV;
use minimax_engine::logging::{LoggingConfig, init_logging};
use minimax_engine::window::Runtime;
use minimax_engine::{ViewerConfig, ViewerError};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    // Help exits 0, bad arguments exit 2.
    let config = match ViewerConfig::try_from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => err.exit(),
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: ViewerConfig) -> anyhow::Result<()> {
    match &config.asset {
        Some(path) => log::info!("minimax viewer: {}", path.display()),
        None => log::info!("minimax viewer: no asset (set {ASSET_ENV} or pass a path)"),
    }

    let result = Runtime::run(config);
    let what = match &result {
        Err(ViewerError::Initialization(_)) => "viewer failed to start",
        _ => "viewer stopped with an error",
    };
    result.context(what)
}
