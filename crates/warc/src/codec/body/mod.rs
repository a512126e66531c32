//! Payload handling for WARC content blocks
//!
//! Every record carries exactly `Content-Length` bytes of content block. This module provides the
//! read views that keep a consumer inside those bytes.
//!
//! # Components
//!
//! - [`BoundedReader`]: Forward-only view over a fixed number of bytes of a shared stream
//! - [`Payload`]: The payload handed out with a record; a [`BoundedReader`] plus any bytes that
//!   were consumed by a failed content parse and have to be replayed in front of it
//!
//! # Features
//!
//! - Reads never cross into the next record, independent of the underlying stream's own end
//! - Remaining bytes can be discarded in one call without being copied out
//! - Both views implement [`std::io::Read`] and [`std::io::BufRead`]

mod bounded_reader;
mod payload;

pub use bounded_reader::BoundedReader;
pub use payload::Payload;
