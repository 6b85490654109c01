use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "EXAMR_LOG";
const DEFAULT_DIRECTIVE: &str = "examr=info";

/// Installs a file-backed subscriber. The terminal belongs to the TUI, so
/// nothing is written to stdout/stderr. Returns false (and logs nothing)
/// when the file cannot be opened or a subscriber is already set.
pub fn init_tracing(log_path: &Path) -> bool {
    if let Some(parent) = log_path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    let file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .is_ok()
}
