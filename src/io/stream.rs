//! The byte stream handed out by the opener.
//!
//! An [`OpenStream`] is either readable or writable, never both. Owned
//! backends are released on drop; [`OpenStream::close`] does the same but
//! reports codec trailer and flush failures instead of swallowing them.

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Read, StdinLock, Stdout, Write};
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

/// Which backend the opener resolved a reference to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOrigin {
    Stdin,
    Stdout,
    File,
    Gzip,
    Xz,
    ZipMember,
    /// Caller-provided stream, returned unchanged
    PassThrough,
}

pub(crate) enum Source<'a> {
    Stdin(StdinLock<'static>),
    File(BufReader<File>),
    Gzip(BufReader<MultiGzDecoder<File>>),
    Xz(BufReader<XzDecoder<File>>),
    Memory(Cursor<Vec<u8>>),
    Borrowed(&'a mut dyn BufRead),
}

pub(crate) enum Sink<'a> {
    Stdout(Stdout),
    File(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Xz(XzEncoder<BufWriter<File>>),
    Borrowed(&'a mut dyn Write),
}

enum Inner<'a> {
    Source(Source<'a>),
    Sink(Sink<'a>),
}

/// Sequential read-or-write byte stream returned by [`crate::io::open`]
pub struct OpenStream<'a> {
    inner: Inner<'a>,
    origin: StreamOrigin,
}

impl<'a> OpenStream<'a> {
    pub(crate) fn from_source(source: Source<'a>) -> Self {
        let origin = match &source {
            Source::Stdin(_) => StreamOrigin::Stdin,
            Source::File(_) => StreamOrigin::File,
            Source::Gzip(_) => StreamOrigin::Gzip,
            Source::Xz(_) => StreamOrigin::Xz,
            Source::Memory(_) => StreamOrigin::ZipMember,
            Source::Borrowed(_) => StreamOrigin::PassThrough,
        };
        Self {
            inner: Inner::Source(source),
            origin,
        }
    }

    pub(crate) fn from_sink(sink: Sink<'a>) -> Self {
        let origin = match &sink {
            Sink::Stdout(_) => StreamOrigin::Stdout,
            Sink::File(_) => StreamOrigin::File,
            Sink::Gzip(_) => StreamOrigin::Gzip,
            Sink::Xz(_) => StreamOrigin::Xz,
            Sink::Borrowed(_) => StreamOrigin::PassThrough,
        };
        Self {
            inner: Inner::Sink(sink),
            origin,
        }
    }

    pub(crate) fn with_origin(mut self, origin: StreamOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Backend this stream was resolved to
    pub fn origin(&self) -> StreamOrigin {
        self.origin
    }

    pub fn is_readable(&self) -> bool {
        matches!(self.inner, Inner::Source(_))
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.inner, Inner::Sink(_))
    }

    /// Finish any codec, flush, and release the stream.
    ///
    /// Pass-through and stdio streams are flushed but not closed.
    pub fn close(self) -> io::Result<()> {
        self.finish().map(drop)
    }

    /// Finish the stream and hand back the underlying file, if it owns one.
    ///
    /// Used by atomic sessions to fsync after codec trailers are written.
    pub(crate) fn finish(self) -> io::Result<Option<File>> {
        match self.inner {
            Inner::Source(_) => Ok(None),
            Inner::Sink(Sink::Stdout(mut out)) => out.flush().map(|_| None),
            Inner::Sink(Sink::Borrowed(writer)) => writer.flush().map(|_| None),
            Inner::Sink(Sink::File(writer)) => into_file(writer).map(Some),
            Inner::Sink(Sink::Gzip(encoder)) => into_file(encoder.finish()?).map(Some),
            Inner::Sink(Sink::Xz(encoder)) => into_file(encoder.finish()?).map(Some),
        }
    }

    fn source(&mut self) -> io::Result<&mut dyn BufRead> {
        match &mut self.inner {
            Inner::Source(Source::Stdin(r)) => Ok(r),
            Inner::Source(Source::File(r)) => Ok(r),
            Inner::Source(Source::Gzip(r)) => Ok(r),
            Inner::Source(Source::Xz(r)) => Ok(r),
            Inner::Source(Source::Memory(r)) => Ok(r),
            Inner::Source(Source::Borrowed(r)) => Ok(&mut **r),
            Inner::Sink(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stream not opened for reading",
            )),
        }
    }

    fn sink(&mut self) -> io::Result<&mut dyn Write> {
        match &mut self.inner {
            Inner::Sink(Sink::Stdout(w)) => Ok(w),
            Inner::Sink(Sink::File(w)) => Ok(w),
            Inner::Sink(Sink::Gzip(w)) => Ok(w),
            Inner::Sink(Sink::Xz(w)) => Ok(w),
            Inner::Sink(Sink::Borrowed(w)) => Ok(&mut **w),
            Inner::Source(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stream not opened for writing",
            )),
        }
    }
}

fn into_file(writer: BufWriter<File>) -> io::Result<File> {
    writer.into_inner().map_err(|e| e.into_error())
}

impl Read for OpenStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.source()?.read(buf)
    }
}

impl BufRead for OpenStream<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.source()?.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        if let Ok(source) = self.source() {
            source.consume(amt);
        }
    }
}

impl Write for OpenStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner {
            Inner::Source(_) => Ok(()),
            Inner::Sink(_) => self.sink()?.flush(),
        }
    }
}

impl std::fmt::Debug for OpenStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStream")
            .field("origin", &self.origin)
            .field("readable", &self.is_readable())
            .finish()
    }
}
