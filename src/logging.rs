//! `tracing` subscriber setup.
//!
//! `RUST_LOG` controls the filter (default `info`). The TUI owns the terminal,
//! so it logs to a file instead of stderr.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

pub const TUI_LOG_FILE: &str = "drugdash.log";

#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

pub fn init(target: LogTarget) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = File::create(&path).map_err(|e| {
                AppError::runtime(format!("Failed to create log file '{}': {e}", path.display()))
            })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };

    result.map_err(|e| AppError::runtime(format!("Failed to initialize logging: {e}")))
}
