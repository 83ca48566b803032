//! Directory helpers.

use crate::error::{Result, WkrError};
use log::{debug, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Create `path` and any missing parents, like `mkdir -p`.
///
/// An existing directory is fine; an existing non-directory is an error.
pub fn mkdir_p(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| WkrError::path_error("Failed to create directory", path, e))
}

/// Changes the process working directory and restores it when dropped.
///
/// The working directory is process-wide state. Do not hold two of these at
/// once from different threads; restoration assumes nobody else changed it.
#[derive(Debug)]
#[must_use = "the previous directory is restored when this guard is dropped"]
pub struct MomentaryChdir {
    previous: PathBuf,
    restored: bool,
}

impl MomentaryChdir {
    /// Enter `path`. Fails without changing anything if `path` cannot be entered.
    pub fn enter(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let previous = env::current_dir()
            .map_err(|e| WkrError::file_error("Failed to read working directory", e))?;
        env::set_current_dir(path)
            .map_err(|e| WkrError::path_error("Failed to change directory to", path, e))?;
        debug!("chdir {} -> {}", previous.display(), path.display());
        Ok(Self {
            previous,
            restored: false,
        })
    }

    /// Directory that will be restored
    pub fn previous(&self) -> &Path {
        &self.previous
    }

    /// Restore the previous directory now, reporting failure
    pub fn restore(mut self) -> Result<()> {
        self.restored = true;
        env::set_current_dir(&self.previous)
            .map_err(|e| WkrError::path_error("Failed to restore directory", &self.previous, e))
    }
}

impl Drop for MomentaryChdir {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(
                "Failed to restore working directory {}: {}",
                self.previous.display(),
                e
            );
        }
    }
}

/// Run `f` with the working directory set to `path`, restoring it afterwards
pub fn with_momentary_chdir<T, E, F>(path: impl AsRef<Path>, f: F) -> std::result::Result<T, E>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: From<WkrError>,
{
    let guard = MomentaryChdir::enter(path)?;
    let value = f()?;
    guard.restore()?;
    Ok(value)
}
