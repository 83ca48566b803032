//! Resolution of file references to open streams.
//!
//! Rules, first match wins:
//!
//! 1. an already-open stream whose direction fits the mode is passed through
//! 2. `-` is standard input for reads and standard output otherwise
//! 3. `archive.zip:member` opens the member for reading only
//! 4. `.gz` / `.xz` suffixes go through the matching codec, anything else is a plain file

use crate::error::{Result, WkrError};
use crate::io::compression::CompressionType;
use crate::io::reference::{Access, AccessMode, FileReference, IntoFileReference, StreamRef};
use crate::io::stream::{OpenStream, Sink, Source, StreamOrigin};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Cursor, Read};
use std::path::Path;
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

/// Compression preset used when writing `.xz` files
const XZ_PRESET: u32 = 6;

/// Open a file reference with the given access mode.
///
/// # Errors
/// * [`WkrError::UnsupportedReferenceKind`] - a borrowed stream whose direction does not fit `mode`
/// * [`WkrError::InvalidOperation`] - a zip member opened for write or append
/// * [`WkrError::InvalidReference`] - a zip reference with more than one `:`
/// * [`WkrError::FileError`] / [`WkrError::ArchiveError`] - the backend could not be opened
pub fn open<'a>(target: impl IntoFileReference<'a>, mode: AccessMode) -> Result<OpenStream<'a>> {
    let reference = target.into_file_reference()?;
    debug!("opening {:?} with mode {}", reference, mode);

    match reference {
        FileReference::Stream(stream) => pass_through(stream, mode),
        FileReference::Stdio => Ok(open_stdio(mode)),
        FileReference::ZipMember { archive, member } => {
            if mode.is_write() {
                return Err(WkrError::invalid_operation(
                    "zip file syntax only supports reading from files",
                ));
            }
            open_zip_member(&archive, &member)
        }
        FileReference::Path(path) => open_path(&path, mode),
    }
}

fn pass_through(stream: StreamRef<'_>, mode: AccessMode) -> Result<OpenStream<'_>> {
    match (stream, mode.is_read()) {
        (StreamRef::Reader(reader), true) => Ok(OpenStream::from_source(Source::Borrowed(reader))),
        (StreamRef::Writer(writer), false) => Ok(OpenStream::from_sink(Sink::Borrowed(writer))),
        (StreamRef::Reader(_), false) => Err(WkrError::UnsupportedReferenceKind {
            type_name: format!("read-only stream (mode {})", mode),
        }),
        (StreamRef::Writer(_), true) => Err(WkrError::UnsupportedReferenceKind {
            type_name: format!("write-only stream (mode {})", mode),
        }),
    }
}

fn open_stdio<'s>(mode: AccessMode) -> OpenStream<'s> {
    if mode.is_read() {
        OpenStream::from_source(Source::Stdin(std::io::stdin().lock()))
    } else {
        OpenStream::from_sink(Sink::Stdout(std::io::stdout()))
    }
}

/// Extract a zip member into memory and close the archive.
///
/// The returned stream owns the decompressed bytes, not the archive handle.
fn open_zip_member<'s>(archive_path: &Path, member: &str) -> Result<OpenStream<'s>> {
    let file = File::open(archive_path)
        .map_err(|e| WkrError::path_error("Failed to open archive", archive_path, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| WkrError::archive(archive_path, e))?;

    let mut contents = Vec::new();
    {
        let mut entry = archive
            .by_name(member)
            .map_err(|e| WkrError::archive(archive_path, e))?;
        entry.read_to_end(&mut contents).map_err(|e| {
            WkrError::file_error(
                format!(
                    "Failed to read member '{}' of '{}'",
                    member,
                    archive_path.display()
                ),
                e,
            )
        })?;
    }
    drop(archive);

    debug!(
        "extracted {} bytes from {}:{}",
        contents.len(),
        archive_path.display(),
        member
    );
    Ok(OpenStream::from_source(Source::Memory(Cursor::new(contents))))
}

fn open_path<'s>(path: &Path, mode: AccessMode) -> Result<OpenStream<'s>> {
    let compression = CompressionType::from_path(path);

    if mode.is_read() {
        let file =
            File::open(path).map_err(|e| WkrError::path_error("Failed to open", path, e))?;
        if compression.is_compressed() && is_empty_file(&file, path)? {
            // a zero-byte file has no codec header; read it as empty
            let empty = OpenStream::from_source(Source::Memory(Cursor::new(Vec::new())));
            return Ok(empty.with_origin(codec_origin(compression)));
        }
        let source = match compression {
            CompressionType::None => Source::File(BufReader::new(file)),
            CompressionType::Gzip => Source::Gzip(BufReader::new(MultiGzDecoder::new(file))),
            CompressionType::Xz => Source::Xz(BufReader::new(XzDecoder::new_multi_decoder(file))),
        };
        return Ok(OpenStream::from_source(source));
    }

    let append = mode.access() == Access::Append;
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| WkrError::path_error("Failed to open for writing", path, e))?;
    let writer = BufWriter::new(file);
    let sink = match compression {
        CompressionType::None => Sink::File(writer),
        CompressionType::Gzip => Sink::Gzip(GzEncoder::new(writer, Compression::default())),
        CompressionType::Xz => Sink::Xz(XzEncoder::new(writer, XZ_PRESET)),
    };
    Ok(OpenStream::from_sink(sink))
}

fn codec_origin(compression: CompressionType) -> StreamOrigin {
    match compression {
        CompressionType::None => StreamOrigin::File,
        CompressionType::Gzip => StreamOrigin::Gzip,
        CompressionType::Xz => StreamOrigin::Xz,
    }
}

fn is_empty_file(file: &File, path: &Path) -> Result<bool> {
    let metadata = file
        .metadata()
        .map_err(|e| WkrError::path_error("Failed to stat", path, e))?;
    Ok(metadata.len() == 0)
}
