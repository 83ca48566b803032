//! Lazy line iteration over anything the opener understands.
//!
//! Lines keep their `\n` terminator. The underlying stream is released as soon
//! as the iterator is exhausted, hits an error, or is dropped.
//!
//! Byte-oriented encodings are split on raw `\n` bytes and decoded line by
//! line. UTF-16 has no single-byte newline, so it is transcoded to UTF-8 first
//! and split afterwards.

use crate::error::{Result, WkrError};
use crate::io::opener::open;
use crate::io::reference::{AccessMode, IntoFileReference};
use crate::io::stream::OpenStream;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use std::fmt;
use std::io::{BufRead, BufReader};
use std::str::FromStr;

/// Text encodings understood by [`lines`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Strict UTF-8
    #[default]
    Utf8,
    /// Strict 7-bit ASCII
    Ascii,
    /// ISO-8859-1; every byte maps to the code point of the same value
    Latin1,
    /// UTF-16 with byte order taken from the BOM, little-endian without one
    Utf16,
    Utf16Le,
    Utf16Be,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
            Self::Utf16 => "utf-16",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
        }
    }

    /// Decoder to run over the whole stream before splitting lines.
    ///
    /// Malformed UTF-16 is replaced with U+FFFD rather than reported.
    fn transcoder(&self) -> Option<&'static encoding_rs::Encoding> {
        match self {
            Self::Utf16 | Self::Utf16Le => Some(encoding_rs::UTF_16LE),
            Self::Utf16Be => Some(encoding_rs::UTF_16BE),
            Self::Utf8 | Self::Ascii | Self::Latin1 => None,
        }
    }

    fn decode(&self, bytes: Vec<u8>) -> std::result::Result<String, String> {
        match self {
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(format!(
                    "byte 0x{:02x} at offset {} is not ASCII",
                    bytes[pos], pos
                )),
                // ASCII is a subset of UTF-8
                None => String::from_utf8(bytes).map_err(|e| e.to_string()),
            },
            Self::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
            // transcoded encodings arrive here as UTF-8
            Self::Utf8 | Self::Utf16 | Self::Utf16Le | Self::Utf16Be => {
                String::from_utf8(bytes).map_err(|e| e.to_string())
            }
        }
    }
}

impl FromStr for Encoding {
    type Err = WkrError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "utf-16" | "utf16" => Ok(Self::Utf16),
            "utf-16le" | "utf-16-le" | "utf16le" => Ok(Self::Utf16Le),
            "utf-16be" | "utf-16-be" | "utf16be" => Ok(Self::Utf16Be),
            _ => Err(WkrError::invalid_argument(format!(
                "unsupported encoding: {}",
                name
            ))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

enum LineReader<'a> {
    Raw(OpenStream<'a>),
    Transcoded(BufReader<DecodeReaderBytes<OpenStream<'a>, Vec<u8>>>),
}

impl LineReader<'_> {
    fn as_buf_read(&mut self) -> &mut dyn BufRead {
        match self {
            Self::Raw(stream) => stream,
            Self::Transcoded(reader) => reader,
        }
    }
}

/// Forward-only iterator over raw lines
pub struct ByteLines<'a> {
    reader: Option<LineReader<'a>>,
    line_number: usize,
}

impl<'a> ByteLines<'a> {
    fn new(reader: LineReader<'a>) -> Self {
        Self {
            reader: Some(reader),
            line_number: 0,
        }
    }

    /// Number of lines yielded so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl Iterator for ByteLines<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut line = Vec::new();
        match reader.as_buf_read().read_until(b'\n', &mut line) {
            Ok(0) => {
                self.reader = None;
                None
            }
            Ok(_) => {
                self.line_number += 1;
                Some(Ok(line))
            }
            Err(e) => {
                self.reader = None;
                Some(Err(WkrError::file_error(
                    format!("Failed to read line {}", self.line_number + 1),
                    e,
                )))
            }
        }
    }
}

impl std::iter::FusedIterator for ByteLines<'_> {}

/// Forward-only iterator over decoded lines
pub struct Lines<'a> {
    inner: ByteLines<'a>,
    encoding: Encoding,
}

impl Iterator for Lines<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = match self.inner.next()? {
            Ok(bytes) => bytes,
            Err(e) => return Some(Err(e)),
        };
        Some(
            self.encoding
                .decode(bytes)
                .map_err(|message| WkrError::DecodeError {
                    line_number: self.inner.line_number(),
                    encoding: self.encoding.name(),
                    message,
                }),
        )
    }
}

impl std::iter::FusedIterator for Lines<'_> {}

/// Open `target` for binary reading and yield its lines decoded with `encoding`.
///
/// Decoding failures surface as [`WkrError::DecodeError`] items; iteration
/// may continue past them.
pub fn lines<'a>(target: impl IntoFileReference<'a>, encoding: Encoding) -> Result<Lines<'a>> {
    let stream = open(target, AccessMode::READ)?;
    let reader = match encoding.transcoder() {
        Some(source) => {
            let decoder = DecodeReaderBytesBuilder::new()
                .encoding(Some(source))
                .bom_override(encoding == Encoding::Utf16)
                .build(stream);
            LineReader::Transcoded(BufReader::new(decoder))
        }
        None => LineReader::Raw(stream),
    };
    Ok(Lines {
        inner: ByteLines::new(reader),
        encoding,
    })
}

/// Open `target` for binary reading and yield its raw lines
pub fn byte_lines<'a>(target: impl IntoFileReference<'a>) -> Result<ByteLines<'a>> {
    Ok(ByteLines::new(LineReader::Raw(open(target, AccessMode::READ)?)))
}

/// Count the newline-delimited records in `target`.
///
/// An empty input has zero lines; a final line without a terminator counts.
pub fn count_lines<'a>(target: impl IntoFileReference<'a>) -> Result<usize> {
    let mut count = 0;
    for line in byte_lines(target)? {
        line?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reference::FileReference;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut out = open(&path, AccessMode::WRITE).unwrap();
        out.write_all(content).unwrap();
        out.close().unwrap();
        path
    }

    #[test]
    fn test_lines_keep_terminators() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "text.txt", "één\ntwee\ndrie".as_bytes());

        let read: Vec<String> = lines(&path, Encoding::Utf8)
            .unwrap()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(read, vec!["één\n", "twee\n", "drie"]);
    }

    #[test]
    fn test_byte_lines_without_decoding() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "raw.bin", b"\xff\xfe\n\x00\n");

        let read: Vec<Vec<u8>> = byte_lines(&path).unwrap().map(|l| l.unwrap()).collect();
        assert_eq!(read, vec![b"\xff\xfe\n".to_vec(), b"\x00\n".to_vec()]);
    }

    #[test]
    fn test_latin1_decoding() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "latin.txt", b"caf\xe9\n");

        let read: Vec<String> = lines(&path, Encoding::Latin1)
            .unwrap()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(read, vec!["café\n"]);
    }

    #[test]
    fn test_decode_error_propagates() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.txt", b"ok\ncaf\xe9\n");

        let mut iter = lines(&path, Encoding::Utf8).unwrap();
        assert_eq!(iter.next().unwrap().unwrap(), "ok\n");
        match iter.next() {
            Some(Err(WkrError::DecodeError {
                line_number,
                encoding,
                ..
            })) => {
                assert_eq!(line_number, 2);
                assert_eq!(encoding, "utf-8");
            }
            other => panic!("Expected DecodeError, got {:?}", other),
        }
        assert!(iter.next().is_none());

        let mut ascii = lines(&path, Encoding::Ascii).unwrap();
        assert!(ascii.next().unwrap().is_ok());
        assert!(matches!(
            ascii.next(),
            Some(Err(WkrError::DecodeError { .. }))
        ));
    }

    #[test]
    fn test_lines_over_compressed_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "text.gz", b"alpha\nbeta\n");

        let read: Vec<String> = lines(&path, Encoding::Utf8)
            .unwrap()
            .map(|l| l.unwrap().trim_end().to_string())
            .collect();
        assert_eq!(read, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_lines_over_borrowed_reader() {
        let mut reader = Cursor::new(b"a\nb\n".to_vec());
        let read: Vec<String> = lines(FileReference::reader(&mut reader), Encoding::Utf8)
            .unwrap()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(read, vec!["a\n", "b\n"]);
    }

    #[test]
    fn test_count_lines() {
        let dir = TempDir::new().unwrap();
        assert_eq!(count_lines(&write_file(&dir, "empty.txt", b"")).unwrap(), 0);
        assert_eq!(count_lines(&write_file(&dir, "nl.txt", b"\n")).unwrap(), 1);
        assert_eq!(count_lines(&write_file(&dir, "one.txt", b"abc")).unwrap(), 1);
        assert_eq!(
            count_lines(&write_file(&dir, "three.txt", b"a\nb\nc\n")).unwrap(),
            3
        );
        assert_eq!(
            count_lines(&write_file(&dir, "three.xz", b"a\nb\nc")).unwrap(),
            3
        );
    }

    #[test]
    fn test_count_lines_on_empty_compressed_files() {
        let dir = TempDir::new().unwrap();
        for name in ["empty.gz", "empty.xz"] {
            let path = dir.path().join(name);
            std::fs::File::create(&path).unwrap();
            assert_eq!(count_lines(&path).unwrap(), 0, "{}", name);
            assert!(lines(&path, Encoding::Utf8).unwrap().next().is_none());
        }
    }

    fn utf16_bytes(text: &str, big_endian: bool, bom: bool) -> Vec<u8> {
        let units = std::iter::once(0xFEFF)
            .filter(|_| bom)
            .chain(text.encode_utf16());
        units
            .flat_map(|unit| {
                if big_endian {
                    unit.to_be_bytes()
                } else {
                    unit.to_le_bytes()
                }
            })
            .collect()
    }

    #[test]
    fn test_utf16_family_round_trips() {
        let dir = TempDir::new().unwrap();
        let text = "één\ntwee\n\u{1F600} drie\n";
        let expected = vec!["één\n", "twee\n", "\u{1F600} drie\n"];

        let cases = [
            ("bom-le.txt", Encoding::Utf16, false, true),
            ("bom-be.txt", Encoding::Utf16, true, true),
            ("plain-le.txt", Encoding::Utf16, false, false),
            ("le.txt", Encoding::Utf16Le, false, false),
            ("be.txt", Encoding::Utf16Be, true, false),
            ("le.txt.gz", Encoding::Utf16Le, false, false),
        ];
        for (name, encoding, big_endian, bom) in cases {
            let path = write_file(&dir, name, &utf16_bytes(text, big_endian, bom));
            let read: Vec<String> = lines(&path, encoding)
                .unwrap()
                .map(|l| l.unwrap())
                .collect();
            assert_eq!(read, expected, "{} as {}", name, encoding);
        }
    }

    #[test]
    fn test_utf16_over_borrowed_reader() {
        let mut reader = Cursor::new(utf16_bytes("a\nb", true, false));
        let read: Vec<String> = lines(FileReference::reader(&mut reader), Encoding::Utf16Be)
            .unwrap()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(read, vec!["a\n", "b"]);
    }

    #[test]
    fn test_parse_encoding_names() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("latin_1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("ISO-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("UTF-16".parse::<Encoding>().unwrap(), Encoding::Utf16);
        assert_eq!("utf_16_be".parse::<Encoding>().unwrap(), Encoding::Utf16Be);
        assert!(matches!(
            "utf-32".parse::<Encoding>(),
            Err(WkrError::InvalidArgument { .. })
        ));
    }
}
