//! Tracing initialization for binaries embedding the client.
//!
//! The library itself never installs a subscriber; it only emits `tracing` events
//! (almost all at `debug`). Filter with `WRAITH_LOG`, e.g. `WRAITH_LOG=wraith_client=debug`.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::constants::ENV_LOG;
use crate::paths;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr. Safe to call more than once; later calls are no-ops.
pub fn init_cli_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init();
}

/// Append to `{home}/.infraiq/wraith-client.log`, falling back to stderr
/// when the file cannot be opened.
pub fn init_file_tracing(home: &Path) {
    let dir = paths::infraiq_dir(home);
    std::fs::create_dir_all(&dir).ok();
    let log_path = paths::log_path(home);

    // Append mode: several tool processes may share the file.
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(f) => f,
        Err(_) => return init_cli_tracing(),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_ansi(false)
        .try_init();
}
