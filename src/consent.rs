//! Consent resolution — is telemetry permitted for this process?
//!
//! Precedence:
//!   1. `INFRAIQ_TELEMETRY` in {0, false, no, off} (any case) → disabled
//!   2. `{home}/.infraiq/config.json` with `"telemetry": false` → disabled
//!   3. otherwise enabled
//!
//! Any read or parse failure on the config file fails open to enabled.

use std::path::Path;

use serde::Deserialize;

use crate::constants::{DISABLED_VALUES, ENV_TELEMETRY};
use crate::error::{WraithError, WraithResult};
use crate::paths;

/// Only the consent key is recognized; every other key is ignored.
#[derive(Debug, Default, Deserialize)]
struct ConsentConfig {
    #[serde(default)]
    telemetry: Option<serde_json::Value>,
}

/// Resolve consent from the real environment and `{home}/.infraiq/config.json`.
pub fn is_enabled(home: &Path) -> bool {
    let env_value = std::env::var(ENV_TELEMETRY).ok();
    resolve(env_value.as_deref(), &paths::config_path(home))
}

/// Pure form of [`is_enabled`]: override value passed in, config read from `config_path`.
pub fn resolve(env_override: Option<&str>, config_path: &Path) -> bool {
    if env_override.is_some_and(is_disabled_value) {
        tracing::debug!(var = ENV_TELEMETRY, "Telemetry disabled by environment");
        return false;
    }

    match read_opt_out(config_path) {
        Ok(true) => {
            tracing::debug!(path = %config_path.display(), "Telemetry disabled by config");
            false
        }
        Ok(false) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Consent config unreadable, telemetry stays enabled");
            true
        }
    }
}

/// `0`, `false`, `no`, `off`, case-insensitive. Values are matched as given, not trimmed.
pub fn is_disabled_value(value: &str) -> bool {
    let v = value.to_ascii_lowercase();
    DISABLED_VALUES.contains(&v.as_str())
}

/// True only when the file exists, parses, and has a boolean `telemetry` equal to false.
fn read_opt_out(config_path: &Path) -> WraithResult<bool> {
    if !config_path.exists() {
        return Ok(false);
    }
    let content = std::fs::read_to_string(config_path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    if !value.is_object() {
        return Err(WraithError::Config("config root is not an object".into()));
    }
    let config: ConsentConfig = serde_json::from_value(value)?;
    Ok(matches!(config.telemetry, Some(serde_json::Value::Bool(false))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("config.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_no_config_is_enabled() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve(None, &dir.path().join("config.json")));
    }

    #[test]
    fn test_env_override_disables() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"telemetry": true}"#);
        for v in ["0", "False", "no", "OFF"] {
            assert!(!resolve(Some(v), &path), "override {:?} should disable", v);
        }
    }

    #[test]
    fn test_env_other_values_do_not_disable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        for v in ["1", "true", "yes", "", "disabled", " off ", "false\n"] {
            assert!(
                resolve(Some(v), &path),
                "override {:?} should not disable",
                v
            );
        }
    }

    #[test]
    fn test_config_opt_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"telemetry": false, "theme": "dark"}"#);
        assert!(!resolve(None, &path));
    }

    #[test]
    fn test_config_non_bool_telemetry_is_enabled() {
        let dir = tempfile::tempdir().unwrap();
        for content in [
            r#"{"telemetry": "false"}"#,
            r#"{"telemetry": 0}"#,
            r#"{"telemetry": null}"#,
            "{}",
        ] {
            let path = write_config(dir.path(), content);
            assert!(resolve(None, &path), "{} should stay enabled", content);
        }
    }

    #[test]
    fn test_malformed_config_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{ not json");
        assert!(resolve(None, &path));
        let path = write_config(dir.path(), "[false]");
        assert!(resolve(None, &path));
    }

    #[test]
    fn test_unreadable_config_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be: read_to_string fails.
        let path = dir.path().join("config.json");
        std::fs::create_dir(&path).unwrap();
        assert!(resolve(None, &path));
    }
}
