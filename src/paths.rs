use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_FILE, ENV_HOME, INFRAIQ_DIR_NAME, INSTALLATION_ID_FILE, LOG_FILE, SOCKET_FILE,
    USER_BIN_DIR,
};

/// Home directory holding `.infraiq/`.
/// `INFRAIQ_HOME` wins, then the user's home, then the current directory.
pub fn home_dir() -> PathBuf {
    std::env::var_os(ENV_HOME)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `{home}/.infraiq/`
pub fn infraiq_dir(home: &Path) -> PathBuf {
    home.join(INFRAIQ_DIR_NAME)
}

/// Collector endpoint: `{home}/.infraiq/wraith.sock`
pub fn socket_path(home: &Path) -> PathBuf {
    infraiq_dir(home).join(SOCKET_FILE)
}

/// Consent configuration: `{home}/.infraiq/config.json`
pub fn config_path(home: &Path) -> PathBuf {
    infraiq_dir(home).join(CONFIG_FILE)
}

/// Persisted identity: `{home}/.infraiq/installation_id`
pub fn installation_id_path(home: &Path) -> PathBuf {
    infraiq_dir(home).join(INSTALLATION_ID_FILE)
}

/// Per-user collector directory: `{home}/.infraiq/bin/`
pub fn user_bin_dir(home: &Path) -> PathBuf {
    infraiq_dir(home).join(USER_BIN_DIR)
}

/// Optional client log: `{home}/.infraiq/wraith-client.log`
pub fn log_path(home: &Path) -> PathBuf {
    infraiq_dir(home).join(LOG_FILE)
}
