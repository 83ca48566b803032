//! Transparent file access.
//!
//! One entry point, [`open`], resolves plain paths, gzip and xz files, zip
//! archive members, the `-` stdio sentinel and already-open streams to a single
//! [`OpenStream`] type. Line iteration and tally loading are built on top.
//!
//! ```no_run
//! use std::io::Read;
//! use wkr::io::{open, AccessMode};
//!
//! let mut text = String::new();
//! open("corpus.zip:semcor000.txt", AccessMode::READ)?.read_to_string(&mut text)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compression;
pub mod counter;
pub mod lines;
pub mod opener;
pub mod reference;
pub mod stream;

pub use compression::CompressionType;
pub use counter::{load_counter, Tally, TallyKey};
pub use lines::{byte_lines, count_lines, lines, ByteLines, Encoding, Lines};
pub use opener::open;
pub use reference::{Access, AccessMode, FileReference, IntoFileReference, StreamRef};
pub use stream::{OpenStream, StreamOrigin};
