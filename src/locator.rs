//! Collector discovery.
//!
//! Search order: PATH, `{home}/.infraiq/bin/`, `/usr/local/bin/`, `/usr/bin/`.
//! The first candidate that exists and is executable wins.

use std::path::{Path, PathBuf};

use crate::constants::{COLLECTOR_BINARY, SYSTEM_BIN_DIRS};
use crate::paths;

/// Locate the collector executable. PATH lookup failures count as "not found".
pub fn locate(home: &Path) -> Option<PathBuf> {
    let on_path = which::which(COLLECTOR_BINARY).ok();
    first_executable(candidates(on_path, home))
}

/// Ordered candidate list; the PATH hit (if any) goes first.
pub fn candidates(on_path: Option<PathBuf>, home: &Path) -> Vec<PathBuf> {
    let mut list: Vec<PathBuf> = on_path.into_iter().collect();
    list.push(paths::user_bin_dir(home).join(COLLECTOR_BINARY));
    list.extend(
        SYSTEM_BIN_DIRS
            .iter()
            .map(|dir| Path::new(dir).join(COLLECTOR_BINARY)),
    );
    list
}

fn first_executable(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    let found = candidates.into_iter().find(|p| is_executable(p));
    match &found {
        Some(p) => tracing::debug!(path = %p.display(), "Collector located"),
        None => tracing::debug!("No collector executable found"),
    }
    found
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
