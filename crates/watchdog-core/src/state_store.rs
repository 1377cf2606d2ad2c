//! Atomic read/write of the full `WatchdogState` snapshot to disk (§4.5).

use crate::types::WatchdogState;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Owns the on-disk path for the state file and performs atomic writes.
/// A disabled store never touches disk, so dry-run mode can satisfy "no
/// state file is written" (§8 "Dry-run isolation") without the scheduler
/// having to know about dry-run at all.
pub struct StateStore {
    path: PathBuf,
    enabled: bool,
}

impl StateStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        StateStore {
            path: path.into(),
            enabled: true,
        }
    }

    /// A store that silently discards every load/save. Used in dry-run mode.
    pub fn disabled() -> Self {
        StateStore {
            path: PathBuf::new(),
            enabled: false,
        }
    }

    /// Loads the persisted state. A missing or unparseable file is not
    /// fatal; the caller is expected to start with fresh state instead.
    pub fn load(&self) -> Option<WatchdogState> {
        if !self.enabled {
            return None;
        }
        let content = fs::read_to_string(&self.path).ok()?;
        toml::from_str(&content).ok()
    }

    /// Writes `state` to a temp file in the same directory, then renames it
    /// into place, so a crash mid-write cannot corrupt the prior snapshot.
    /// A no-op when the store is disabled.
    pub fn save(&self, state: &WatchdogState) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = toml::to_string_pretty(state)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StateStore::new(tmp.path().join("state.toml"));
        assert!(store.load().is_none());
    }

    #[test]
    fn round_trips_state() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StateStore::new(tmp.path().join("state.toml"));
        let mut state = WatchdogState::new(100);
        state.service_mut("api").consecutive_failures = 2;
        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.started_at, 100);
        assert_eq!(loaded.services["api"].consecutive_failures, 2);
    }

    #[test]
    fn unparseable_file_loads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.toml");
        fs::write(&path, "not = [valid").unwrap();
        let store = StateStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn save_does_not_leave_a_temp_file_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.toml");
        let store = StateStore::new(path.clone());
        store.save(&WatchdogState::new(1)).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn disabled_store_never_touches_disk() {
        let store = StateStore::disabled();
        assert!(store.load().is_none());
        store.save(&WatchdogState::new(1)).unwrap();
    }
}
