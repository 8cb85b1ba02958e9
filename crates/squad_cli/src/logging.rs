//! Tracing subscriber setup; also captures `log` records from the engine crates.

use squad_core::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins over the configured level.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
        _ => {
            fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}
