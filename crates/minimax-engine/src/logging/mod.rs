//! Logger setup for the viewer.
//!
//! Everything logs through the `log` facade; `env_logger` is installed once
//! by [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
