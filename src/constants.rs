use std::time::Duration;

// === Locations (relative to the home directory) ===
pub const INFRAIQ_DIR_NAME: &str = ".infraiq";
pub const SOCKET_FILE: &str = "wraith.sock";
pub const CONFIG_FILE: &str = "config.json";
pub const INSTALLATION_ID_FILE: &str = "installation_id";
pub const LOG_FILE: &str = "wraith-client.log";
pub const USER_BIN_DIR: &str = "bin";

// === Collector discovery ===
pub const COLLECTOR_BINARY: &str = "wraith";
pub const SYSTEM_BIN_DIRS: [&str; 2] = ["/usr/local/bin", "/usr/bin"];
pub const PARENT_PID_FLAG: &str = "--parent-pid";

// === Environment ===
pub const ENV_TELEMETRY: &str = "INFRAIQ_TELEMETRY";
pub const ENV_HOME: &str = "INFRAIQ_HOME";
pub const ENV_TOOL_VERSION: &str = "INFRAIQ_VERSION";
pub const ENV_LOG: &str = "WRAITH_LOG";

/// Override values (compared case-insensitively) that force telemetry off.
pub const DISABLED_VALUES: [&str; 4] = ["0", "false", "no", "off"];

// === Budgets ===
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);
pub const SPAWN_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const SPAWN_POLL_ATTEMPTS: u32 = 10; // ~1s total

// === Context sentinels ===
pub const UNKNOWN: &str = "unknown";
