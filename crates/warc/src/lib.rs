//! A streaming micro WARC record decoder
//!
//! This crate reads Web ARChive files: a flat sequence of self-describing records, each carrying
//! an HTTP request, an HTTP response or opaque content, optionally gzip compressed. Records are
//! decoded one at a time from a forward-only stream, so archives of any size can be processed
//! without materializing them in memory.
//!
//! # Features
//!
//! - Exact byte accounting: every record is bounded by its `Content-Length`, unread payload is
//!   discarded when the next record is requested
//! - Typed content blocks for embedded HTTP requests and responses, raw access for everything else
//! - Malformed HTTP content never interrupts iteration; the record falls back to its raw bytes
//! - Explicit framing error policy: terminate (default) or skip broken records
//! - Transparent gzip decompression, single or multi member
//! - Record type filtering
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use micro_warc::protocol::ContentBlock;
//! use micro_warc::reader::WarcReader;
//!
//! let http = "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nHello World!";
//! let archive = format!(
//!     "WARC/1.0\r\nWARC-Type: response\r\nWARC-Target-URI: http://example.com/\r\nContent-Length: {}\r\n\r\n{http}\r\n\r\n",
//!     http.len()
//! );
//!
//! let mut reader = WarcReader::new(Cursor::new(archive.into_bytes()));
//! while let Some(mut record) = reader.next_record().unwrap() {
//!     assert_eq!(record.target_uri(), Some("http://example.com/"));
//!
//!     if let ContentBlock::Response(response) = record.content_mut() {
//!         assert_eq!(response.status_code(), 200);
//!         assert_eq!(response.mime_type(), "text/plain");
//!         assert_eq!(response.payload_as_text().unwrap(), "Hello World!");
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: Records, content blocks, headers, record types and errors
//! - [`codec`]: Line reading, header parsing, bounded payloads and the record decoder
//! - [`reader`]: The record sequence with its reading policy
//! - [`compress`]: Decompression applied before decoding
//!
//! # Error Handling
//!
//! - [`protocol::FramingError`]: record boundaries could not be established; fatal unless the
//!   reader was configured to skip broken records
//! - [`protocol::ContentError`]: an embedded HTTP message could not be parsed; attached to the
//!   record as a warning, never returned as an error
//! - I/O errors of the underlying stream are always fatal
//!
//! # Logging
//!
//! Decoding reports through [`tracing`]: record boundaries at `debug`, byte accounting at `trace`,
//! skipped records, content warnings and truncated archives at `warn`.

pub mod codec;
pub mod compress;
pub mod protocol;
pub mod reader;

mod utils;
pub(crate) use utils::ensure;
