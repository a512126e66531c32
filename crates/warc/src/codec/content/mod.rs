//! Parsers for the HTTP messages embedded in `request` and `response` records.
//!
//! Both parsers read the start line and the header block from the bounded content block and leave
//! the stream positioned at the first body byte. Every consumed byte is appended to a caller
//! supplied buffer so that a failed parse can fall back to the raw content.
//!
//! A malformed head is reported as a [`ContentError`]; only a failing stream is fatal.

mod request_decoder;
mod response_decoder;

pub(crate) use request_decoder::RequestHeadDecoder;
pub(crate) use response_decoder::ResponseHeadDecoder;

use std::io::{self, BufRead};

use thiserror::Error;

use crate::codec::line::{is_terminated, read_raw_line, strip_line_ending};
use crate::codec::parse_number;
use crate::ensure;
use crate::protocol::{Charset, ContentError, HeaderError};

#[derive(Debug, Error)]
pub(crate) enum HeadError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<HeaderError> for HeadError {
    fn from(e: HeaderError) -> Self {
        match e.into_content_error() {
            Ok(content) => HeadError::Content(content),
            Err(io) => HeadError::Io(io),
        }
    }
}

/// Reads the start line of an HTTP message, skipping blank lines in front of it.
///
/// Returns `Ok(None)` if the content ends before a non blank line.
fn read_start_line<R: BufRead>(
    reader: &mut R,
    raw: &mut Vec<u8>,
    charset: Charset,
    max_header_bytes: usize,
) -> Result<Option<String>, HeadError> {
    let start = raw.len();
    loop {
        let consumed = raw.len() - start;
        ensure!(consumed < max_header_bytes, ContentError::too_large_header(consumed, max_header_bytes).into());

        let line_start = raw.len();
        if read_raw_line(reader, raw, max_header_bytes - consumed)? == 0 {
            return Ok(None);
        }

        let line = &raw[line_start..];
        let consumed = raw.len() - start;
        ensure!(
            is_terminated(line) || consumed < max_header_bytes,
            ContentError::too_large_header(consumed, max_header_bytes).into()
        );

        let text = charset.decode(strip_line_ending(line));
        if !text.trim().is_empty() {
            return Ok(Some(text));
        }
    }
}

/// Parses `PROTOCOL/major.minor`. A missing minor version reads as `0`.
fn parse_protocol_version(value: &str) -> Option<(String, u32, u32)> {
    let (protocol, version) = value.split_once('/')?;
    if protocol.is_empty() {
        return None;
    }

    let (major, minor) = version.split_once('.').unwrap_or((version, "0"));
    Some((protocol.to_owned(), parse_number(major)?, parse_number(minor)?))
}
