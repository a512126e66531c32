//! WARC record decoding
//!
//! This module turns a forward-only byte stream into a sequence of records. It is organized
//! bottom-up:
//!
//! - [`line`]: newline terminated line reading
//! - [`header`]: header block parsing with folded continuation lines
//! - [`body`]: the bounded payload views handed out with each record
//! - `content`: parsers for the HTTP request and response heads embedded in content blocks
//! - [`RecordDecoder`]: the state machine that ties them together
//!
//! # Byte accounting
//!
//! The decoder owns the only handle to the stream. Each record's payload borrows it, and the
//! next call to [`RecordDecoder::read_record`] first discards whatever the caller left unread, then
//! the two line separator that follows every content block. Decoding therefore stays aligned no
//! matter how much of a payload was consumed.
//!
//! # Example
//!
//! ```
//! use std::io::{Cursor, Read};
//! use micro_warc::codec::RecordDecoder;
//!
//! let archive = b"WARC/1.0\r\nWARC-Type: resource\r\nContent-Length: 5\r\n\r\nhello\r\n\r\n";
//! let mut decoder = RecordDecoder::new(Cursor::new(&archive[..]));
//!
//! let mut record = decoder.read_record().unwrap().unwrap();
//! let mut text = String::new();
//! record.content_mut().payload_mut().unwrap().read_to_string(&mut text).unwrap();
//! assert_eq!(text, "hello");
//!
//! assert!(decoder.read_record().unwrap().is_none());
//! ```

pub mod body;
mod content;
pub mod header;
pub mod line;
mod record_decoder;

pub use body::{BoundedReader, Payload};
pub use record_decoder::{RecordDecoder, StreamRecord};
pub(crate) use record_decoder::DecodedHead;

use std::str::FromStr;

use crate::codec::header::DEFAULT_MAX_HEADER_BYTES;
use crate::protocol::Charset;

/// Settings shared by every parser of the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Encoding of header lines, also the fallback for payload text.
    pub charset: Charset,
    /// Upper bound for one header block, WARC or HTTP, and therefore for any single line.
    pub max_header_bytes: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { charset: Charset::latin1(), max_header_bytes: DEFAULT_MAX_HEADER_BYTES }
    }
}

/// Parses an unsigned decimal made of ASCII digits only.
pub(crate) fn parse_number<T: FromStr>(value: &str) -> Option<T> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
