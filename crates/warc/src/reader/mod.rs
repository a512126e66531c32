//! The record sequence over a whole archive.
//!
//! [`WarcReader`] pulls records from a [`RecordDecoder`](crate::codec::RecordDecoder) one at a time
//! and applies the reading policy configured through [`ReaderBuilder`]:
//!
//! - which record types to return, skipping the others without parsing their content
//! - whether a framing error ends the sequence ([`FramingPolicy::Terminate`], the default) or the
//!   broken record is skipped ([`FramingPolicy::SkipRecord`])
//! - the charset and header size limits of the decoder
//! - the decompression applied to the input
//!
//! Records borrow the reader; use [`WarcReader::into_frozen`] for a standard [`Iterator`] of records
//! that own their payload.

mod frozen;
mod warc_reader;

pub use frozen::FrozenRecords;
pub use warc_reader::{FramingPolicy, ReaderBuilder, WarcReader};
