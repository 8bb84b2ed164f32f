//! Persistent installation id, one random UUID per installation.
//!
//! Storage file: `{home}/.infraiq/installation_id`

use std::path::Path;

use uuid::Uuid;

use crate::error::{WraithError, WraithResult};

/// Read the persisted id, or generate and try to persist a new one.
/// A failed write still returns the fresh id; it just won't survive the process.
pub fn get_or_create(id_path: &Path) -> String {
    if let Some(existing) = read_existing(id_path) {
        return existing;
    }

    let installation_id = Uuid::new_v4().to_string();
    if let Err(e) = persist(id_path, &installation_id) {
        tracing::debug!(error = %e, "Installation id not persisted, using ephemeral id");
    }
    installation_id
}

fn read_existing(id_path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(id_path).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn persist(id_path: &Path, installation_id: &str) -> WraithResult<()> {
    if let Some(parent) = id_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| WraithError::Identity(format!("{}: {}", parent.display(), e)))?;
    }
    std::fs::write(id_path, installation_id)
        .map_err(|e| WraithError::Identity(format!("{}: {}", id_path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".infraiq").join("installation_id");

        let first = get_or_create(&path);
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

        let second = get_or_create(&path);
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_value_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("installation_id");
        std::fs::write(&path, "  abc-123\n").unwrap();
        assert_eq!(get_or_create(&path), "abc-123");
    }

    #[test]
    fn test_blank_file_regenerates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("installation_id");
        std::fs::write(&path, "   \n").unwrap();

        let id = get_or_create(&path);
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), id);
    }

    #[test]
    fn test_unwritable_location_returns_ephemeral_id() {
        let dir = tempfile::tempdir().unwrap();
        // Parent "directory" is a regular file, so create_dir_all fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("installation_id");

        let a = get_or_create(&path);
        let b = get_or_create(&path);
        assert!(Uuid::parse_str(&a).is_ok());
        assert_ne!(a, b);
    }
}
