//! WARC data model and error types.
//!
//! # Components
//!
//! - **Records** ([`record`]): the decoded record and its content blocks
//!   - [`WarcRecord`]: version line, record headers and one typed content block
//!   - [`ContentBlock`]: [`RequestBlock`], [`ResponseBlock`] or [`DefaultBlock`], selected by `WARC-Type`
//!   - [`FrozenRecord`]: a record that owns its payload bytes
//!
//! - **Record types** ([`record_type`]): [`WarcRecordType`], the eight types of WARC 1.1
//!
//! - **Headers** ([`header`]): [`Headers`] for embedded HTTP messages and [`WarcHeaders`] for the
//!   record-level mapping
//!
//! - **Charsets** ([`charset`]): [`Charset`], the text encodings used for header lines and payload text
//!
//! - **Errors** ([`error`]):
//!   - [`WarcError`]: Top-level error type
//!   - [`FramingError`]: Record boundaries could not be established, fatal
//!   - [`ContentError`]: A bounded content block could not be interpreted, recoverable

pub mod charset;
pub mod error;
pub mod header;
pub mod record;
pub mod record_type;

pub use charset::Charset;
pub use error::{ContentError, FramingError, HeaderError, WarcError};
pub use header::{Headers, WarcHeaders};
pub use record::{
    ContentBlock, DefaultBlock, FrozenRecord, RequestBlock, RequestHead, ResponseBlock, ResponseHead, WarcRecord,
};
pub use record_type::WarcRecordType;
