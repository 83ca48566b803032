//! Temporary file name reservation.
//!
//! A [`TempFileName`] creates an empty file under a unique name and closes it
//! immediately, so only the name is reserved. Nothing stops another process
//! from taking the name afterwards; this is not a security boundary.

use crate::error::{Result, WkrError};
use log::warn;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reserved temporary path, removed again when released
#[derive(Debug)]
pub struct TempFileName {
    path: PathBuf,
    released: bool,
}

impl TempFileName {
    /// Reserve a fresh name ending in `suffix`, in `directory` or the system temp dir
    pub fn new(suffix: &str, directory: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".wkr-").suffix(suffix);
        let file = match directory {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| WkrError::file_error("Failed to create temporary file", e))?;

        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| WkrError::file_error("Failed to reserve temporary file name", e.error))?;
        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete whatever is at the path now.
    ///
    /// A missing file is fine; any other failure is returned.
    pub fn close(mut self) -> Result<()> {
        self.released = true;
        remove_if_present(&self.path)
    }
}

impl Drop for TempFileName {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_if_present(&self.path) {
            warn!("{}", e);
        }
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WkrError::path_error(
            "Failed to remove temporary file",
            path,
            e,
        )),
    }
}

/// Run `f` with a reserved temporary name and release it afterwards.
///
/// The closure's error wins over a cleanup error.
pub fn with_temp_file_name<T, E, F>(
    suffix: &str,
    directory: Option<&Path>,
    f: F,
) -> std::result::Result<T, E>
where
    F: FnOnce(&Path) -> std::result::Result<T, E>,
    E: From<WkrError>,
{
    let name = TempFileName::new(suffix, directory)?;
    let value = f(name.path())?;
    name.close()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reserves_empty_file_in_directory() {
        let dir = TempDir::new().unwrap();
        let name = TempFileName::new(".gz", Some(dir.path())).unwrap();

        assert_eq!(name.path().parent(), Some(dir.path()));
        assert!(name.path().to_string_lossy().ends_with(".gz"));
        assert_eq!(fs::metadata(name.path()).unwrap().len(), 0);

        let path = name.path().to_path_buf();
        name.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_names_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let a = TempFileName::new("", Some(dir.path())).unwrap();
        let b = TempFileName::new("", Some(dir.path())).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_close_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let name = TempFileName::new("", Some(dir.path())).unwrap();
        fs::remove_file(name.path()).unwrap();
        assert!(name.close().is_ok());
    }

    #[test]
    fn test_close_reports_other_failures() {
        let dir = TempDir::new().unwrap();
        let name = TempFileName::new("", Some(dir.path())).unwrap();
        // a directory in its place cannot be removed with remove_file
        fs::remove_file(name.path()).unwrap();
        fs::create_dir(name.path()).unwrap();
        let path = name.path().to_path_buf();

        assert!(name.close().is_err());
        fs::remove_dir(path).unwrap();
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = {
            let name = TempFileName::new("", Some(dir.path())).unwrap();
            fs::write(name.path(), b"scratch").unwrap();
            name.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_scoped_form_removes_on_error() {
        let dir = TempDir::new().unwrap();
        let mut seen = PathBuf::new();
        let result: Result<()> = with_temp_file_name("", Some(dir.path()), |path| {
            seen = path.to_path_buf();
            Err(WkrError::invalid_argument("boom"))
        });
        assert!(result.is_err());
        assert!(!seen.exists());
    }
}
