//! Header block parsing shared by WARC records and embedded HTTP messages.
//!
//! A header block is a run of `Name: value` lines terminated by a blank line or by the end of the
//! stream. Lines starting with a space or tab are folded continuations of the previous field.

mod header_decoder;

pub use header_decoder::{DEFAULT_MAX_HEADER_BYTES, HeaderDecoder};
