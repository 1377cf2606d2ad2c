//! Writes and removes the daemon's PID file (§5 "Shared resources", §6).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Writes the current process id, overwriting any stale file left by an
    /// unclean previous shutdown.
    pub fn write<P: Into<PathBuf>>(path: P) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, format!("{}\n", std::process::id()))?;
        Ok(PidFile { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the PID file on clean shutdown.
    pub fn remove(self) -> io::Result<()> {
        fs::remove_file(&self.path)
    }
}
