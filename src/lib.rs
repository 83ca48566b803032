//! # wkr - File and Sequence Utilities for Data-Processing Scripts
//!
//! A grab bag of small, well-behaved helpers that data-wrangling code keeps
//! reimplementing.
//!
//! ## Features
//!
//! - **Transparent Opening**: One [`open`] for plain, gzip and xz files, zip
//!   archive members, the `-` stdio sentinel and already-open streams
//! - **Atomic Writes**: Replace a file all-or-nothing, with optional `~` backup
//!   and fsync
//! - **Line Helpers**: Decoded or raw line iteration, line counting and
//!   tab-separated tallies
//! - **Sequence Helpers**: Run-length encoding, chunking, grouping
//! - **Small Utilities**: Memoization, reservoir sampling, JSON flattening and
//!   human-readable byte counts
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`io`] - Reference resolution, codecs and the transparent opener
//! - [`fs`] - Atomic writes, temporary names and directory helpers
//! - [`seq`] - Iterator helpers
//! - [`memo`], [`sample`], [`flatten`], [`humanise`] - Standalone utilities

pub mod error;
pub mod flatten;
pub mod fs;
pub mod humanise;
pub mod io;
pub mod memo;
pub mod sample;
pub mod seq;

// Re-export commonly used types for convenience
pub use error::{Result, WkrError};

pub use flatten::{flatten_json, unflatten_json};
pub use fs::{mkdir_p, open_atomic, with_atomic, write_atomic, AtomicFile, AtomicWriteOptions};
pub use humanise::humanise_bytes;
pub use io::{count_lines, lines, load_counter, open, AccessMode, Encoding, FileReference, OpenStream};
pub use memo::{CsvMemo, LruMemo, Memo};
pub use sample::ReservoirSampler;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
