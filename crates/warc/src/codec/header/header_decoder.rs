//! Line based header block decoder.
//!
//! The decoder pulls lines straight from the stream, so it never reads past the blank line that
//! ends the block. Every consumed byte is appended to a caller supplied buffer, which lets callers
//! replay the raw bytes if the block turns out to be unusable.
//!
//! # Limits
//!
//! The total size of a block, and therefore of any single line, is capped by `max_header_bytes`.

use std::io::BufRead;

use tracing::trace;

use crate::codec::line::{is_terminated, read_raw_line, strip_line_ending};
use crate::ensure;
use crate::protocol::{Charset, HeaderError, Headers};

/// Default cap for a single header block.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 1024 * 1024;

/// Decoder for a block of header lines.
#[derive(Debug, Clone, Copy)]
pub struct HeaderDecoder {
    charset: Charset,
    max_header_bytes: usize,
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new(Charset::latin1(), DEFAULT_MAX_HEADER_BYTES)
    }
}

impl HeaderDecoder {
    pub fn new(charset: Charset, max_header_bytes: usize) -> Self {
        Self { charset, max_header_bytes }
    }

    /// Decodes header lines until a blank line or the end of the stream.
    ///
    /// # Arguments
    ///
    /// * `reader` - Stream positioned at the first header line
    /// * `raw` - Buffer the raw bytes of every consumed line are appended to
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` if:
    /// - A line is neither a continuation nor contains a colon
    /// - The block exceeds `max_header_bytes`
    /// - The underlying stream fails
    pub fn decode<R: BufRead>(&self, reader: &mut R, raw: &mut Vec<u8>) -> Result<Headers, HeaderError> {
        let start = raw.len();
        let mut headers = Headers::new();

        loop {
            let consumed = raw.len() - start;
            ensure!(consumed < self.max_header_bytes, HeaderError::too_large_header(consumed, self.max_header_bytes));

            let line_start = raw.len();
            if read_raw_line(reader, raw, self.max_header_bytes - consumed)? == 0 {
                // end of stream also ends the block
                break;
            }

            let line = &raw[line_start..];
            let consumed = raw.len() - start;
            ensure!(
                is_terminated(line) || consumed < self.max_header_bytes,
                HeaderError::too_large_header(consumed, self.max_header_bytes)
            );

            let text = self.charset.decode(strip_line_ending(line));
            if text.trim().is_empty() {
                break;
            }

            if text.starts_with([' ', '\t']) {
                if !headers.continue_last(text.trim()) {
                    trace!(line = %text, "dropped continuation line without a preceding header");
                }
                continue;
            }

            let Some((name, value)) = text.split_once(':') else {
                return Err(HeaderError::invalid_header(text));
            };
            headers.append(name.trim(), value.trim());
        }

        trace!(header_count = headers.len(), header_bytes = raw.len() - start, "parsed header block");
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::{Cursor, Read};

    fn decode(input: &str) -> Result<Headers, HeaderError> {
        HeaderDecoder::default().decode(&mut Cursor::new(input.as_bytes()), &mut Vec::new())
    }

    #[test]
    fn from_warc_header() {
        let str = indoc! {r##"
        WARC-Type: response
        WARC-Record-ID: <urn:uuid:2b4ef6f2-9e0b-4ad7-8f16-2c5e3ab1ab2f>
        Content-Length: 42

        payload"##};

        let mut reader = Cursor::new(str.as_bytes());
        let mut raw = Vec::new();
        let headers = HeaderDecoder::default().decode(&mut reader, &mut raw).unwrap();

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("WARC-Type"), Some("response"));
        assert_eq!(headers.get("warc-record-id"), Some("<urn:uuid:2b4ef6f2-9e0b-4ad7-8f16-2c5e3ab1ab2f>"));
        assert_eq!(headers.get("Content-Length"), Some("42"));

        // the blank line is consumed, the payload is not
        assert_eq!(raw.len(), str.len() - "payload".len());
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "payload");
    }

    #[test]
    fn folded_header() {
        let headers = decode("X-A: foo\r\n  bar\r\n\tbaz\r\nX-B: 1\r\n\r\n").unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-A"), Some("foo bar baz"));
        assert_eq!(headers.get("X-B"), Some("1"));
    }

    #[test]
    fn value_keeps_later_colons() {
        let headers = decode("WARC-Target-URI: http://example.com:8080/a\n\n").unwrap();
        assert_eq!(headers.get("WARC-Target-URI"), Some("http://example.com:8080/a"));
    }

    #[test]
    fn duplicates_preserved() {
        let headers = decode("Set-Cookie: a=1\nSet-Cookie: b=2\n\n").unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get_all("set-cookie").collect::<Vec<_>>(), vec!["a=1", "b=2"]);
    }

    #[test]
    fn whitespace_line_ends_block() {
        let headers = decode("A: 1\n   \nB: 2\n").unwrap();
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn end_of_stream_ends_block() {
        let headers = decode("A: 1\nB: 2").unwrap();
        assert_eq!(headers.get("B"), Some("2"));

        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn missing_colon() {
        let error = decode("A: 1\nnot a header\n\n").unwrap_err();
        assert!(matches!(error, HeaderError::InvalidHeader { line } if line == "not a header"));
    }

    #[test]
    fn too_large_block() {
        let decoder = HeaderDecoder::new(Charset::latin1(), 16);
        let error = decoder.decode(&mut Cursor::new(&b"Name: a value that is far too long\n\n"[..]), &mut Vec::new());
        assert!(matches!(error, Err(HeaderError::TooLargeHeader { max_size: 16, .. })));
    }

    #[test]
    fn latin1_values() {
        let headers = HeaderDecoder::default().decode(&mut Cursor::new(&b"X-Name: caf\xe9\n\n"[..]), &mut Vec::new());
        assert_eq!(headers.unwrap().get("X-Name"), Some("café"));
    }
}
