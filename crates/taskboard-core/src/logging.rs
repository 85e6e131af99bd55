//! Tracing subscriber setup shared by the binaries.

use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::BoardResult;

/// Environment variable that redirects debug output to a file.
pub const DEBUG_LOG_ENV: &str = "TASKBOARD_DEBUG_LOG";

/// Install the global subscriber.
///
/// Writes to stderr so stdout stays reserved for command output. `RUST_LOG`
/// wins over `default_level`.
pub fn init_tracing(default_level: &str) -> BoardResult<()> {
    if let Ok(log_path) = std::env::var(DEBUG_LOG_ENV) {
        return init_file_tracing(Path::new(&log_path));
    }

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    Ok(())
}

fn init_file_tracing(path: &Path) -> BoardResult<()> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let _ = tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_max_level(tracing::Level::DEBUG)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .try_init();
    Ok(())
}
