//! Environment facts attached to every event.
//!
//! Non-identifying: never includes hostname or username.

use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN;

/// Client runtime identifier reported as `runtime_version`.
pub const RUNTIME_VERSION: &str = concat!("rust/wraith-client-", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub installation_id: String,
    pub tool_version: String,
    pub runtime_version: String,
    pub os: String,
    pub os_version: String,
}

impl EventContext {
    /// Build the context for one event. No failure path: missing facts become `"unknown"`.
    pub fn build(installation_id: &str, tool_version: &str) -> Self {
        Self {
            installation_id: installation_id.to_string(),
            tool_version: tool_version.to_string(),
            runtime_version: RUNTIME_VERSION.to_string(),
            os: os_name(),
            os_version: os_version(),
        }
    }
}

fn os_name() -> String {
    non_empty_or_unknown(Some(std::env::consts::OS.to_string()))
}

/// Kernel release, e.g. `6.8.0-45-generic` on Linux or `23.4.0` on macOS.
fn os_version() -> String {
    non_empty_or_unknown(sysinfo::System::kernel_version())
}

fn non_empty_or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => UNKNOWN.to_string(),
    }
}
