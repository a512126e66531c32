//! Decompression applied to an archive before it reaches the decoder.
//!
//! Archives are commonly stored as `.warc.gz`, either as one gzip member covering the whole file
//! or as one member per record. [`ArchiveStream`] decodes both with a multi-member gzip decoder,
//! so the record decoder always sees plain WARC bytes.

use std::io::{self, BufRead, BufReader, Read};

use flate2::bufread::MultiGzDecoder;
use tracing::trace;

/// gzip magic bytes (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression of an archive stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Plain WARC bytes
    #[default]
    None,
    /// gzip, one or more members
    Gzip,
    /// gzip if the stream starts with the gzip magic bytes, plain otherwise
    Auto,
}

/// An archive stream with its compression removed.
#[derive(Debug)]
pub enum ArchiveStream<R> {
    Plain(R),
    Gzip(BufReader<MultiGzDecoder<R>>),
}

impl<R: BufRead> ArchiveStream<R> {
    /// Wraps `reader` according to `compression`.
    ///
    /// # Errors
    ///
    /// `Compression::Auto` peeks at the first bytes of the stream, which can fail.
    pub fn new(mut reader: R, compression: Compression) -> io::Result<Self> {
        let gzip = match compression {
            Compression::None => false,
            Compression::Gzip => true,
            Compression::Auto => is_gzip(&mut reader)?,
        };

        trace!(?compression, gzip, "opened archive stream");
        if gzip {
            Ok(ArchiveStream::Gzip(BufReader::new(MultiGzDecoder::new(reader))))
        } else {
            Ok(ArchiveStream::Plain(reader))
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, ArchiveStream::Gzip(_))
    }
}

/// Checks the gzip magic bytes without consuming them.
fn is_gzip<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    Ok(reader.fill_buf()?.starts_with(&GZIP_MAGIC))
}

impl<R: BufRead> Read for ArchiveStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ArchiveStream::Plain(reader) => reader.read(buf),
            ArchiveStream::Gzip(reader) => reader.read(buf),
        }
    }
}

impl<R: BufRead> BufRead for ArchiveStream<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            ArchiveStream::Plain(reader) => reader.fill_buf(),
            ArchiveStream::Gzip(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            ArchiveStream::Plain(reader) => reader.consume(amt),
            ArchiveStream::Gzip(reader) => reader.consume(amt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn read_all<R: BufRead>(mut stream: ArchiveStream<R>) -> String {
        let mut text = String::new();
        stream.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn plain_passthrough() {
        let stream = ArchiveStream::new(Cursor::new(&b"WARC/1.0\r\n"[..]), Compression::None).unwrap();
        assert!(!stream.is_compressed());
        assert_eq!(read_all(stream), "WARC/1.0\r\n");
    }

    #[test]
    fn auto_detects_gzip() {
        let data = gzip(b"WARC/1.0\r\n");
        let stream = ArchiveStream::new(Cursor::new(data), Compression::Auto).unwrap();
        assert!(stream.is_compressed());
        assert_eq!(read_all(stream), "WARC/1.0\r\n");

        let stream = ArchiveStream::new(Cursor::new(&b"WARC/1.0\r\n"[..]), Compression::Auto).unwrap();
        assert!(!stream.is_compressed());

        let stream = ArchiveStream::new(Cursor::new(&b""[..]), Compression::Auto).unwrap();
        assert!(!stream.is_compressed());
    }

    #[test]
    fn multiple_members() {
        let mut data = gzip(b"first ");
        data.extend(gzip(b"second"));

        let stream = ArchiveStream::new(Cursor::new(data), Compression::Gzip).unwrap();
        assert_eq!(read_all(stream), "first second");
    }

    #[test]
    fn corrupt_gzip_is_an_io_error() {
        let mut stream = ArchiveStream::new(Cursor::new(vec![0x1f, 0x8b, 0, 0, 0]), Compression::Gzip).unwrap();
        let mut buf = Vec::new();
        assert!(stream.read_to_end(&mut buf).is_err());
    }
}
