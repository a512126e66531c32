//! Length bounded reader over a shared stream.
//!
//! The remaining byte count lives outside the reader, in the record decoder, so that a view can be
//! dropped and rebuilt without losing track of where the current content block ends.

use std::cmp;
use std::fmt;
use std::io::{self, BufRead, Read};

use tracing::trace;

/// A read view limited to the remaining bytes of one content block.
///
/// Every read decrements the shared counter. Once it reaches zero the view reports end of data,
/// even if the underlying stream has more bytes.
pub struct BoundedReader<'a, R> {
    inner: &'a mut R,
    remaining: &'a mut u64,
}

impl<'a, R: BufRead> BoundedReader<'a, R> {
    /// Creates a view over the next `*remaining` bytes of `inner`.
    pub fn new(inner: &'a mut R, remaining: &'a mut u64) -> Self {
        Self { inner, remaining }
    }

    /// Number of bytes left before the boundary.
    pub fn remaining(&self) -> u64 {
        *self.remaining
    }

    /// Consumes and drops every byte up to the boundary.
    ///
    /// Returns the number of discarded bytes. If the underlying stream ends first, the count is
    /// smaller than the previous [`remaining`](Self::remaining) and the counter stays above zero.
    pub fn discard_remaining(&mut self) -> io::Result<u64> {
        let mut discarded = 0;
        while *self.remaining > 0 {
            let available = match self.fill_buf() {
                Ok(buf) => buf.len(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available == 0 {
                break;
            }
            self.consume(available);
            discarded += available as u64;
        }

        trace!(discarded, remaining = *self.remaining, "discarded payload bytes");
        Ok(discarded)
    }
}

impl<R: BufRead> Read for BoundedReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if *self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let len = cmp::min(*self.remaining, buf.len() as u64) as usize;
        let read = self.inner.read(&mut buf[..len])?;
        *self.remaining -= read as u64;
        Ok(read)
    }
}

impl<R: BufRead> BufRead for BoundedReader<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if *self.remaining == 0 {
            return Ok(&[]);
        }

        let remaining = *self.remaining;
        let buf = self.inner.fill_buf()?;
        let len = cmp::min(remaining, buf.len() as u64) as usize;
        Ok(&buf[..len])
    }

    fn consume(&mut self, amt: usize) {
        let amt = cmp::min(*self.remaining, amt as u64) as usize;
        *self.remaining -= amt as u64;
        self.inner.consume(amt);
    }
}

impl<R> fmt::Debug for BoundedReader<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedReader").field("remaining", &*self.remaining).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn stops_at_boundary() {
        let mut stream = Cursor::new(&b"0123456789WARC/1.0"[..]);
        let mut remaining = 10;

        let mut reader = BoundedReader::new(&mut stream, &mut remaining);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(reader.remaining(), 6);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"456789");
        assert_eq!(reader.read(&mut buf).unwrap(), 0);

        assert_eq!(remaining, 0);
        let mut after = String::new();
        stream.read_to_string(&mut after).unwrap();
        assert_eq!(after, "WARC/1.0");
    }

    #[test]
    fn fill_buf_is_clamped() {
        let mut stream = Cursor::new(&b"abcdef"[..]);
        let mut remaining = 3;

        let mut reader = BoundedReader::new(&mut stream, &mut remaining);
        assert_eq!(reader.fill_buf().unwrap(), b"abc");
        reader.consume(2);
        assert_eq!(reader.fill_buf().unwrap(), b"c");

        // consuming past the boundary is clamped
        reader.consume(10);
        assert_eq!(reader.fill_buf().unwrap(), b"");
        assert_eq!(stream.position(), 3);
    }

    #[test]
    fn lines_do_not_cross_boundary() {
        let mut stream = Cursor::new(&b"GET / HTTP/1.1\r\nnext"[..]);
        let mut remaining = 5;

        let mut line = String::new();
        BoundedReader::new(&mut stream, &mut remaining).read_line(&mut line).unwrap();
        assert_eq!(line, "GET /");
    }

    #[test]
    fn discard_remaining() {
        let mut stream = Cursor::new(vec![7u8; 100_000]);
        let mut remaining = 70_000;

        let mut reader = BoundedReader::new(&mut stream, &mut remaining);
        let mut buf = [0u8; 10];
        reader.read_exact(&mut buf).unwrap();

        assert_eq!(reader.discard_remaining().unwrap(), 69_990);
        assert_eq!(remaining, 0);
        assert_eq!(stream.position(), 70_000);
    }

    #[test]
    fn discard_truncated() {
        let mut stream = Cursor::new(&b"short"[..]);
        let mut remaining = 20;

        let mut reader = BoundedReader::new(&mut stream, &mut remaining);
        assert_eq!(reader.discard_remaining().unwrap(), 5);
        assert_eq!(reader.remaining(), 15);
    }
}
