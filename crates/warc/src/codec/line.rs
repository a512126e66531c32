//! Newline-terminated line reading over a forward-only byte stream.
//!
//! Lines end at `\n`; a preceding `\r` is stripped as well. A truncated last line (end of stream
//! without terminator) is returned as is. Zero bytes before end of stream means "no more data",
//! which is distinct from an empty line.

use std::io::{self, BufRead, Read};

use crate::protocol::Charset;

/// Appends one raw line, terminator included, to `buf`.
///
/// Reads at most `limit` bytes. Returns the number of bytes read, `0` at end of stream.
pub(crate) fn read_raw_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<usize> {
    let limit = u64::try_from(limit).unwrap_or(u64::MAX);
    reader.by_ref().take(limit).read_until(b'\n', buf)
}

/// Strips a trailing `\n` and, if present, the `\r` before it.
pub(crate) fn strip_line_ending(line: &[u8]) -> &[u8] {
    match line {
        [rest @ .., b'\r', b'\n'] | [rest @ .., b'\n'] => rest,
        _ => line,
    }
}

/// Returns true if the raw line ended with a line feed.
pub(crate) fn is_terminated(line: &[u8]) -> bool {
    line.last() == Some(&b'\n')
}

/// Reads one line of at most `limit` bytes and decodes it with `charset`.
///
/// Returns `Ok(None)` if the stream was exhausted before any byte was read.
pub fn read_line<R: BufRead>(reader: &mut R, charset: Charset, limit: usize) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if read_raw_line(reader, &mut buf, limit)? == 0 {
        return Ok(None);
    }
    Ok(Some(charset.decode(strip_line_ending(&buf))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LIMIT: usize = 1024;

    #[test]
    fn reads_crlf_and_lf_lines() {
        let mut reader = Cursor::new(&b"WARC/1.0\r\nfoo\n\r\nlast"[..]);
        let latin1 = Charset::latin1();

        assert_eq!(read_line(&mut reader, latin1, LIMIT).unwrap().as_deref(), Some("WARC/1.0"));
        assert_eq!(read_line(&mut reader, latin1, LIMIT).unwrap().as_deref(), Some("foo"));
        assert_eq!(read_line(&mut reader, latin1, LIMIT).unwrap().as_deref(), Some(""));
        assert_eq!(read_line(&mut reader, latin1, LIMIT).unwrap().as_deref(), Some("last"));
        assert_eq!(read_line(&mut reader, latin1, LIMIT).unwrap(), None);
        assert_eq!(read_line(&mut reader, latin1, LIMIT).unwrap(), None);
    }

    #[test]
    fn lone_cr_is_kept() {
        let mut reader = Cursor::new(&b"a\rb\n"[..]);
        assert_eq!(read_line(&mut reader, Charset::latin1(), LIMIT).unwrap().as_deref(), Some("a\rb"));
    }

    #[test]
    fn raw_line_respects_limit() {
        let mut reader = Cursor::new(&b"0123456789\nrest\n"[..]);
        let mut buf = Vec::new();

        assert_eq!(read_raw_line(&mut reader, &mut buf, 4).unwrap(), 4);
        assert_eq!(&buf[..], b"0123");
        assert!(!is_terminated(&buf));

        buf.clear();
        assert_eq!(read_raw_line(&mut reader, &mut buf, LIMIT).unwrap(), 7);
        assert_eq!(strip_line_ending(&buf), b"456789");
        assert!(is_terminated(&buf));
    }

    #[test]
    fn strip_only_line_ending() {
        assert_eq!(strip_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(strip_line_ending(b"abc\n"), b"abc");
        assert_eq!(strip_line_ending(b"abc\r"), b"abc\r");
        assert_eq!(strip_line_ending(b"\n"), b"");
        assert_eq!(strip_line_ending(b""), b"");
    }
}
