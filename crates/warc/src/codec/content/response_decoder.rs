//! Decoder for the HTTP response embedded in a `response` record.
//!
//! Besides the status line and headers, the decoder derives the media type and charset of the body
//! from the `Content-Type` header. A charset that cannot be decoded does not fail the head; the
//! head is returned without media type and charset, together with a [`ContentError`] warning.

use std::io::BufRead;

use mime::Mime;
use tracing::trace;

use super::{HeadError, parse_protocol_version, read_start_line};
use crate::codec::parse_number;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Charset, ContentError, Headers, ResponseHead};

/// Decodes the status line and headers, leaving the stream at the response body.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResponseHeadDecoder {
    charset: Charset,
    max_header_bytes: usize,
}

struct StatusLine {
    protocol: String,
    major: u32,
    minor: u32,
    status_code: u16,
    reason: String,
}

impl ResponseHeadDecoder {
    pub(crate) fn new(charset: Charset, max_header_bytes: usize) -> Self {
        Self { charset, max_header_bytes }
    }

    pub(crate) fn decode<R: BufRead>(
        &self,
        reader: &mut R,
        raw: &mut Vec<u8>,
    ) -> Result<(ResponseHead, Option<ContentError>), HeadError> {
        let start = raw.len();
        let line = read_start_line(reader, raw, self.charset, self.max_header_bytes)?.unwrap_or_default();

        let Some(StatusLine { protocol, major, minor, status_code, reason }) = parse_status_line(&line) else {
            return Err(ContentError::invalid_status_line(line).into());
        };

        let budget = self.max_header_bytes - (raw.len() - start);
        let headers = HeaderDecoder::new(self.charset, budget).decode(reader, raw)?;

        let (mime_type, charset, warning) = match content_type(&headers) {
            Ok((mime_type, charset)) => (mime_type, charset, None),
            Err(e) => (String::new(), None, Some(e)),
        };

        trace!(status_code, %mime_type, header_count = headers.len(), "parsed http response head");
        let head = ResponseHead { protocol, major, minor, status_code, reason, headers, mime_type, charset };
        Ok((head, warning))
    }
}

/// Parses `protocol/major.minor SP status-code [SP reason-phrase]`. Any run of whitespace separates.
fn parse_status_line(line: &str) -> Option<StatusLine> {
    let (version, rest) = line.trim_start().split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let (code, reason) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

    let (protocol, major, minor) = parse_protocol_version(version)?;
    Some(StatusLine { protocol, major, minor, status_code: parse_number(code)?, reason: reason.trim().to_owned() })
}

/// Media type and charset of the `Content-Type` header, both empty if it is absent.
fn content_type(headers: &Headers) -> Result<(String, Option<Charset>), ContentError> {
    let Some(value) = headers.get("Content-Type") else {
        return Ok((String::new(), None));
    };

    let (mime_type, label) = match value.parse::<Mime>() {
        Ok(mime) => (mime.essence_str().to_owned(), mime.get_param(mime::CHARSET).map(|name| name.as_str().to_owned())),
        Err(_) => lenient_content_type(value),
    };

    match label {
        None => Ok((mime_type, None)),
        Some(label) => match Charset::for_label(&label) {
            Some(charset) => Ok((mime_type, Some(charset))),
            None => Err(ContentError::unsupported_charset(label)),
        },
    }
}

/// Splits a `Content-Type` value that is not a valid media type, e.g. `text/html; charset=utf-8;;`.
fn lenient_content_type(value: &str) -> (String, Option<String>) {
    let mut parts = value.split(';');
    let mime_type = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let charset = parts
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_owned());
    (mime_type, charset)
}
