//! Decoder for the HTTP request embedded in a `request` record.
//!
//! The request line must have the shape `METHOD SP target SP protocol/major.minor`. Runs of
//! whitespace between the parts are tolerated.

use std::io::BufRead;

use tracing::trace;

use super::{HeadError, parse_protocol_version, read_start_line};
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Charset, ContentError, RequestHead};

/// Decodes the request line and headers, leaving the stream at the request body.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestHeadDecoder {
    charset: Charset,
    max_header_bytes: usize,
}

impl RequestHeadDecoder {
    pub(crate) fn new(charset: Charset, max_header_bytes: usize) -> Self {
        Self { charset, max_header_bytes }
    }

    pub(crate) fn decode<R: BufRead>(&self, reader: &mut R, raw: &mut Vec<u8>) -> Result<RequestHead, HeadError> {
        let start = raw.len();
        let line = read_start_line(reader, raw, self.charset, self.max_header_bytes)?.unwrap_or_default();

        let Some((method, target, protocol, major, minor)) = parse_request_line(&line) else {
            return Err(ContentError::invalid_request_line(line).into());
        };

        let budget = self.max_header_bytes - (raw.len() - start);
        let headers = HeaderDecoder::new(self.charset, budget).decode(reader, raw)?;

        trace!(%method, %target, header_count = headers.len(), "parsed http request head");
        Ok(RequestHead { method, target, protocol, major, minor, headers })
    }
}

fn parse_request_line(line: &str) -> Option<(String, String, String, u32, u32)> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (protocol, major, minor) = parse_protocol_version(version)?;
    Some((method.to_owned(), target.to_owned(), protocol, major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::header::DEFAULT_MAX_HEADER_BYTES;
    use indoc::indoc;
    use std::io::{Cursor, Read};

    fn decoder() -> RequestHeadDecoder {
        RequestHeadDecoder::new(Charset::latin1(), DEFAULT_MAX_HEADER_BYTES)
    }

    #[test]
    fn request_head() {
        let str = indoc! {r##"
        GET /index.html?q=1 HTTP/1.1
        Host: example.com
        User-Agent: curl/7.79.1
        Accept: */*

        body"##};

        let mut reader = Cursor::new(str.as_bytes());
        let mut raw = Vec::new();
        let head = decoder().decode(&mut reader, &mut raw).unwrap();

        assert_eq!(head.method(), "GET");
        assert_eq!(head.target(), "/index.html?q=1");
        assert_eq!(head.protocol(), "HTTP");
        assert_eq!((head.major_version(), head.minor_version()), (1, 1));
        assert_eq!(head.headers().len(), 3);
        assert_eq!(head.headers().get("user-agent"), Some("curl/7.79.1"));

        let mut body = String::new();
        reader.read_to_string(&mut body).unwrap();
        assert_eq!(body, "body");
        assert_eq!(raw.len(), str.len() - 4);
    }

    #[test]
    fn custom_method_is_kept() {
        let mut reader = Cursor::new(&b"PROPFIND /dav HTTP/1.0\r\n\r\n"[..]);
        let head = decoder().decode(&mut reader, &mut Vec::new()).unwrap();
        assert_eq!(head.method(), "PROPFIND");
        assert_eq!(head.minor_version(), 0);
    }

    #[test]
    fn invalid_request_line() {
        for line in ["GET /x\r\n\r\n", "GET /x HTTP\r\n\r\n", "GET /x HTTP/1.1 extra\r\n\r\n", ""] {
            let error = decoder().decode(&mut Cursor::new(line.as_bytes()), &mut Vec::new()).unwrap_err();
            assert!(matches!(error, HeadError::Content(ContentError::InvalidRequestLine { .. })), "{line:?}");
        }
    }

    #[test]
    fn invalid_header_line() {
        let mut reader = Cursor::new(&b"GET / HTTP/1.1\r\nHost example.com\r\n\r\n"[..]);
        let mut raw = Vec::new();
        let error = decoder().decode(&mut reader, &mut raw).unwrap_err();
        assert!(matches!(error, HeadError::Content(ContentError::InvalidHeader { .. })));
        assert_eq!(raw, b"GET / HTTP/1.1\r\nHost example.com\r\n");
    }
}
