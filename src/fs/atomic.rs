//! All-or-nothing file replacement.
//!
//! Writes go to a temporary file in the destination's directory, which is
//! renamed over the destination only when the writer commits. Readers of the
//! destination see the old contents until that rename. Two writers racing on
//! the same destination are not coordinated: the last rename wins.

use crate::error::{tilde_path, Result, WkrError};
use crate::fs::temp::TempFileName;
use crate::io::{open, Access, AccessMode, FileReference, OpenStream};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Options for [`write_atomic_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtomicWriteOptions {
    /// Copy the previous version to `<path>~` first
    pub backup: bool,
    /// Flush and fsync the temporary file before the rename
    pub fsync: bool,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self {
        Self {
            backup: true,
            fsync: false,
        }
    }
}

impl AtomicWriteOptions {
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }
}

/// An outstanding atomic write.
///
/// Dropping it without [`AtomicFile::commit`] discards the temporary file and
/// leaves the destination untouched.
pub struct AtomicFile {
    stream: Option<OpenStream<'static>>,
    temp: Option<TempFileName>,
    destination: PathBuf,
    fsync: bool,
}

impl AtomicFile {
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path of the staging file
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp.as_ref().map(TempFileName::path)
    }

    /// Finish writing, optionally fsync, and rename over the destination
    pub fn commit(mut self) -> Result<()> {
        let (stream, temp) = match (self.stream.take(), self.temp.take()) {
            (Some(stream), Some(temp)) => (stream, temp),
            _ => return Err(WkrError::invalid_operation("atomic file already finished")),
        };

        let file = stream
            .finish()
            .map_err(|e| WkrError::path_error("Failed to finish", temp.path(), e))?;
        if self.fsync {
            if let Some(file) = &file {
                file.sync_all()
                    .map_err(|e| WkrError::path_error("Failed to fsync", temp.path(), e))?;
            }
        }
        drop(file);

        fs::rename(temp.path(), &self.destination).map_err(|e| {
            WkrError::path_error("Failed to move temporary file onto", &self.destination, e)
        })?;
        debug!("committed atomic write to {}", self.destination.display());

        // the name no longer exists, so this only fails on unexpected errors
        temp.close()
    }

    /// Discard the staged contents, reporting cleanup failures
    pub fn abandon(mut self) -> Result<()> {
        self.stream = None;
        match self.temp.take() {
            Some(temp) => temp.close(),
            None => Ok(()),
        }
    }

    fn stream(&mut self) -> io::Result<&mut OpenStream<'static>> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "atomic file already finished"))
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream()?.flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if self.temp.is_some() {
            debug!(
                "abandoning atomic write to {}",
                self.destination.display()
            );
            // close the stream before the temp name removes the file
            self.stream = None;
        }
    }
}

impl std::fmt::Debug for AtomicFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicFile")
            .field("destination", &self.destination)
            .field("temp", &self.temp_path())
            .field("fsync", &self.fsync)
            .finish()
    }
}

/// Begin an atomic write to `path`.
///
/// The staging file lives next to `path` and carries its extension, so a
/// `.gz` or `.xz` destination is written through the same codec. In append
/// mode the staging file starts as a copy of the current destination.
///
/// # Errors
/// * [`WkrError::InvalidOperation`] - `mode` is a read mode
/// * [`WkrError::FileError`] - the staging file could not be created or seeded
pub fn open_atomic(path: impl AsRef<Path>, mode: AccessMode, fsync: bool) -> Result<AtomicFile> {
    let destination = path.as_ref().to_path_buf();
    if mode.is_read() {
        return Err(WkrError::invalid_operation(format!(
            "atomic files are write-only, got mode {}",
            mode
        )));
    }

    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let suffix = destination
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let temp = TempFileName::new(&suffix, Some(&directory))?;

    if mode.access() == Access::Append && destination.exists() {
        fs::copy(&destination, temp.path())
            .map_err(|e| WkrError::path_error("Failed to copy", &destination, e))?;
    }

    let stream = open(FileReference::Path(temp.path().to_path_buf()), mode)?;
    debug!(
        "staging {} in {}",
        destination.display(),
        temp.path().display()
    );
    Ok(AtomicFile {
        stream: Some(stream),
        temp: Some(temp),
        destination,
        fsync,
    })
}

/// Run `f` against an atomic file and commit if it returns `Ok`.
///
/// On `Err` the staging file is discarded and the error returned unchanged.
pub fn with_atomic<T, E, F>(
    path: impl AsRef<Path>,
    mode: AccessMode,
    fsync: bool,
    f: F,
) -> std::result::Result<T, E>
where
    F: FnOnce(&mut AtomicFile) -> std::result::Result<T, E>,
    E: From<WkrError>,
{
    let mut file = open_atomic(path, mode, fsync)?;
    let value = f(&mut file)?;
    file.commit()?;
    Ok(value)
}

/// Copy `path` to `path~`, replacing any earlier backup.
///
/// Returns the backup path, or `None` when `path` does not exist.
pub fn backup_file(path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let backup = tilde_path(path);
    if backup.exists() {
        fs::remove_file(&backup)
            .map_err(|e| WkrError::path_error("Failed to remove old backup", &backup, e))?;
    }
    fs::copy(path, &backup).map_err(|e| WkrError::path_error("Failed to back up", path, e))?;
    debug!("backed up {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}

/// Write `chunks` to `destination` atomically, backing up the old file if `backup`
pub fn write_atomic<I>(chunks: I, destination: impl AsRef<Path>, backup: bool) -> Result<()>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    write_atomic_with(
        chunks,
        destination,
        AtomicWriteOptions::default().with_backup(backup),
    )
}

/// [`write_atomic`] with explicit options
pub fn write_atomic_with<I>(
    chunks: I,
    destination: impl AsRef<Path>,
    options: AtomicWriteOptions,
) -> Result<()>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let destination = destination.as_ref();
    if options.backup {
        backup_file(destination)?;
    }

    let mut file = open_atomic(destination, AccessMode::WRITE, options.fsync)?;
    for chunk in chunks {
        file.write_all(chunk.as_ref())
            .map_err(|e| WkrError::path_error("Failed to write", destination, e))?;
    }
    file.commit()
}
