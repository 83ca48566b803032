//! Classification of open targets and access modes.
//!
//! A [`FileReference`] is resolved from the caller's value once, up front, so
//! that the opener can dispatch with an exhaustive `match` instead of probing
//! capabilities at runtime.

use crate::error::{Result, WkrError};
use std::any::{type_name, Any};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Sentinel naming standard input (read) or standard output (write/append)
pub const STDIO_SENTINEL: &str = "-";

/// Marker that turns a path into a compound zip-member reference
const ZIP_MARKER: &str = ".zip:";

/// Something the opener can resolve to a byte stream
pub enum FileReference<'a> {
    /// Plain filesystem path, possibly with a codec suffix
    Path(PathBuf),
    /// `-`: standard input or standard output depending on mode
    Stdio,
    /// `archive.zip:member`
    ZipMember { archive: PathBuf, member: String },
    /// A stream the caller already holds; never closed by the opener
    Stream(StreamRef<'a>),
}

/// Borrowed already-open stream
pub enum StreamRef<'a> {
    Reader(&'a mut dyn BufRead),
    Writer(&'a mut dyn Write),
}

impl<'a> FileReference<'a> {
    /// Classify a path string.
    ///
    /// `-` is the stdio sentinel. Any string containing `.zip:` (case-insensitive)
    /// is a zip member and must contain exactly one `:`.
    pub fn parse(reference: &str) -> Result<Self> {
        if reference == STDIO_SENTINEL {
            return Ok(Self::Stdio);
        }

        if reference.to_lowercase().contains(ZIP_MARKER) {
            let mut parts = reference.split(':');
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(archive), Some(member), None) => Ok(Self::ZipMember {
                    archive: PathBuf::from(archive),
                    member: member.to_string(),
                }),
                _ => Err(WkrError::InvalidReference {
                    reference: reference.to_string(),
                    reason: "zip member references must contain exactly one ':'".to_string(),
                }),
            };
        }

        Ok(Self::Path(PathBuf::from(reference)))
    }

    /// Classify a path. Non-UTF-8 paths are always plain paths.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.to_str() {
            Some(s) => Self::parse(s),
            None => Ok(Self::Path(path.to_path_buf())),
        }
    }

    /// Borrow an already-open reader
    pub fn reader(reader: &'a mut dyn BufRead) -> Self {
        Self::Stream(StreamRef::Reader(reader))
    }

    /// Borrow an already-open writer
    pub fn writer(writer: &'a mut dyn Write) -> Self {
        Self::Stream(StreamRef::Writer(writer))
    }

    /// Short name of the variant, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Stdio => "stdio",
            Self::ZipMember { .. } => "zip member",
            Self::Stream(StreamRef::Reader(_)) => "reader",
            Self::Stream(StreamRef::Writer(_)) => "writer",
        }
    }
}

impl FileReference<'static> {
    /// Classify a dynamically typed value.
    ///
    /// Strings and paths are accepted; anything else fails with
    /// [`WkrError::UnsupportedReferenceKind`] naming the concrete type.
    pub fn from_any<T: Any>(value: T) -> Result<Self> {
        let value: &dyn Any = &value;
        if let Some(s) = value.downcast_ref::<String>() {
            Self::parse(s)
        } else if let Some(s) = value.downcast_ref::<&'static str>() {
            Self::parse(s)
        } else if let Some(p) = value.downcast_ref::<PathBuf>() {
            Self::from_path(p)
        } else if let Some(p) = value.downcast_ref::<&'static Path>() {
            Self::from_path(p)
        } else {
            Err(WkrError::UnsupportedReferenceKind {
                type_name: type_name::<T>().to_string(),
            })
        }
    }
}

impl fmt::Debug for FileReference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Stdio => f.write_str("Stdio"),
            Self::ZipMember { archive, member } => f
                .debug_struct("ZipMember")
                .field("archive", archive)
                .field("member", member)
                .finish(),
            Self::Stream(StreamRef::Reader(_)) => f.write_str("Stream(Reader)"),
            Self::Stream(StreamRef::Writer(_)) => f.write_str("Stream(Writer)"),
        }
    }
}

/// Conversion into a [`FileReference`], accepted by [`crate::io::open`]
pub trait IntoFileReference<'a> {
    fn into_file_reference(self) -> Result<FileReference<'a>>;
}

impl<'a> IntoFileReference<'a> for FileReference<'a> {
    fn into_file_reference(self) -> Result<FileReference<'a>> {
        Ok(self)
    }
}

impl<'a> IntoFileReference<'a> for &str {
    fn into_file_reference(self) -> Result<FileReference<'a>> {
        FileReference::parse(self)
    }
}

impl<'a> IntoFileReference<'a> for &String {
    fn into_file_reference(self) -> Result<FileReference<'a>> {
        FileReference::parse(self)
    }
}

impl<'a> IntoFileReference<'a> for String {
    fn into_file_reference(self) -> Result<FileReference<'a>> {
        FileReference::parse(&self)
    }
}

impl<'a> IntoFileReference<'a> for &Path {
    fn into_file_reference(self) -> Result<FileReference<'a>> {
        FileReference::from_path(self)
    }
}

impl<'a> IntoFileReference<'a> for &PathBuf {
    fn into_file_reference(self) -> Result<FileReference<'a>> {
        FileReference::from_path(self)
    }
}

impl<'a> IntoFileReference<'a> for PathBuf {
    fn into_file_reference(self) -> Result<FileReference<'a>> {
        FileReference::from_path(&self)
    }
}

/// Direction of access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    Append,
}

/// Access direction crossed with a binary/text flag.
///
/// Streams are byte streams either way; the flag is carried for callers that
/// care and is otherwise informational. Text decoding happens in
/// [`crate::io::lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMode {
    access: Access,
    binary: bool,
}

impl AccessMode {
    pub const READ: Self = Self::new(Access::Read, true);
    pub const WRITE: Self = Self::new(Access::Write, true);
    pub const APPEND: Self = Self::new(Access::Append, true);

    pub const fn new(access: Access, binary: bool) -> Self {
        Self { access, binary }
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    pub fn is_read(&self) -> bool {
        self.access == Access::Read
    }

    /// True for write and append
    pub fn is_write(&self) -> bool {
        !self.is_read()
    }
}

impl Default for AccessMode {
    fn default() -> Self {
        Self::READ
    }
}

impl FromStr for AccessMode {
    type Err = WkrError;

    /// Parse `r`, `w` or `a`, optionally followed by `b` (binary) or `t` (text)
    fn from_str(mode: &str) -> Result<Self> {
        let invalid = || WkrError::InvalidMode {
            mode: mode.to_string(),
        };

        let mut chars = mode.chars();
        let access = match chars.next() {
            Some('r') => Access::Read,
            Some('w') => Access::Write,
            Some('a') => Access::Append,
            _ => return Err(invalid()),
        };
        let binary = match (chars.next(), chars.next()) {
            (None, None) | (Some('b'), None) => true,
            (Some('t'), None) => false,
            _ => return Err(invalid()),
        };
        Ok(Self::new(access, binary))
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match self.access {
            Access::Read => "r",
            Access::Write => "w",
            Access::Append => "a",
        };
        write!(f, "{}{}", access, if self.binary { "b" } else { "t" })
    }
}
