//! Compression format detection by file name suffix.
//!
//! Dispatch is purely syntactic: a gzip file renamed to `data.bin` is opened as
//! a plain file, and a plain file named `data.gz` fails when read through the
//! gzip decoder. No magic-number sniffing is done.

use std::path::Path;

/// Supported compression formats for transparent file access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// No compression - plain file
    None,
    /// Gzip compression (.gz files)
    Gzip,
    /// XZ / LZMA compression (.xz files)
    Xz,
}

impl CompressionType {
    /// Get human-readable name for the compression type
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
        }
    }

    /// Check if this type represents a compressed format
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Detect compression format from the path's suffix (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        detect_by_extension(path).unwrap_or(Self::None)
    }
}

/// Detect compression format from file extension
fn detect_by_extension(path: &Path) -> Option<CompressionType> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "gz" => Some(CompressionType::Gzip),
        "xz" => Some(CompressionType::Xz),
        _ => None,
    }
}
