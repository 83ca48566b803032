//! Explicit memoization wrappers.
//!
//! - [`Memo`] caches every result in memory, keyed by argument value
//! - [`LruMemo`] does the same with a bounded least-recently-used cache
//! - [`CsvMemo`] caches a table of rows in a CSV file: load it if it can be
//!   opened, otherwise compute and persist it

use crate::error::{Result, WkrError};
use crate::fs::atomic::with_atomic;
use crate::io::{open, AccessMode, OpenStream};
use log::debug;
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Unbounded in-memory cache around a function
pub struct Memo<A, R, F> {
    func: F,
    cache: HashMap<A, R>,
}

impl<A, R, F> Memo<A, R, F>
where
    A: Eq + Hash + Clone,
    R: Clone,
    F: FnMut(&A) -> R,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            cache: HashMap::new(),
        }
    }

    /// Return the cached result for `args`, computing it on first use
    pub fn call(&mut self, args: A) -> R {
        if let Some(result) = self.cache.get(&args) {
            return result.clone();
        }
        let result = (self.func)(&args);
        self.cache.insert(args, result.clone());
        result
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Bounded in-memory cache around a function
pub struct LruMemo<A: Hash + Eq, R, F> {
    func: F,
    cache: LruCache<A, R>,
}

impl<A, R, F> LruMemo<A, R, F>
where
    A: Eq + Hash + Clone,
    R: Clone,
    F: FnMut(&A) -> R,
{
    /// Keep at most `capacity` results; `capacity` must be positive
    pub fn new(capacity: usize, func: F) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| WkrError::invalid_argument("memo capacity must be positive"))?;
        Ok(Self {
            func,
            cache: LruCache::new(capacity),
        })
    }

    pub fn call(&mut self, args: A) -> R {
        if let Some(result) = self.cache.get(&args) {
            return result.clone();
        }
        let result = (self.func)(&args);
        self.cache.put(args, result.clone());
        result
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// CSV dialect for [`CsvMemo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

/// Table of rows cached in a CSV file.
///
/// The path goes through the transparent opener, so `cache.csv.gz` is stored
/// compressed. The file is written atomically.
#[derive(Debug, Clone)]
pub struct CsvMemo {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvMemo {
    pub fn new(path: impl AsRef<Path>, options: CsvOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached rows, or run `producer` and persist its rows.
    ///
    /// Only a failure to open the cache counts as a miss; a cache file that
    /// opens but does not parse is an error.
    pub fn load_or_compute<T, E, F>(&self, producer: F) -> std::result::Result<Vec<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> std::result::Result<Vec<T>, E>,
        E: From<WkrError>,
    {
        match open(&self.path, AccessMode::READ) {
            Ok(stream) => {
                debug!("loading cached table from {}", self.path.display());
                return Ok(self.read_rows(stream)?);
            }
            Err(e) if e.io_kind().is_some() => {
                debug!("cache miss for {}: {}", self.path.display(), e);
            }
            Err(e) => return Err(e.into()),
        }

        let rows = producer()?;
        self.write_rows(&rows)?;
        Ok(rows)
    }

    fn read_rows<T: DeserializeOwned>(&self, stream: OpenStream<'_>) -> Result<Vec<T>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(self.options.has_headers)
            .from_reader(stream);
        let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
        Ok(rows)
    }

    fn write_rows<T: Serialize>(&self, rows: &[T]) -> Result<()> {
        with_atomic(&self.path, AccessMode::WRITE, false, |file| {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.options.delimiter)
                .has_headers(self.options.has_headers)
                .from_writer(file);
            for row in rows {
                writer.serialize(row)?;
            }
            writer
                .flush()
                .map_err(|e| WkrError::path_error("Failed to write", &self.path, e))
        })
    }
}
