//! Decoded WARC records and their content blocks.
//!
//! A [`WarcRecord`] is generic over its payload type `P`. Records pulled from a decoder carry a
//! [`Payload`](crate::codec::Payload) that borrows the decoder's stream; [`WarcRecord::freeze`]
//! copies the payload out and yields a [`FrozenRecord`] that owns its bytes.

use std::io::{self, Cursor, Read};

use bytes::Bytes;
use http::{Method, StatusCode, Version};

use crate::protocol::{Charset, ContentError, Headers, WarcError, WarcHeaders, WarcRecordType};

/// A record whose payload has been copied into memory.
pub type FrozenRecord = WarcRecord<Cursor<Bytes>>;

/// One WARC record: the version line, the record headers and a typed content block.
#[derive(Debug)]
pub struct WarcRecord<P> {
    version: String,
    record_type: WarcRecordType,
    headers: WarcHeaders,
    content_length: u64,
    content: ContentBlock<P>,
    warning: Option<ContentError>,
}

impl<P> WarcRecord<P> {
    pub(crate) fn new(
        version: String,
        record_type: WarcRecordType,
        headers: WarcHeaders,
        content_length: u64,
        content: ContentBlock<P>,
        warning: Option<ContentError>,
    ) -> Self {
        Self { version, record_type, headers, content_length, content, warning }
    }

    /// The version line as written, e.g. `WARC/1.0`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn record_type(&self) -> WarcRecordType {
        self.record_type
    }

    pub fn headers(&self) -> &WarcHeaders {
        &self.headers
    }

    /// Looks up a record header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The `WARC-Record-ID` header, if present.
    pub fn record_id(&self) -> Option<&str> {
        self.header("WARC-Record-ID")
    }

    /// The `WARC-Target-URI` header, if present.
    pub fn target_uri(&self) -> Option<&str> {
        self.header("WARC-Target-URI")
    }

    /// The declared size of the whole content block, embedded HTTP head included.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn content(&self) -> &ContentBlock<P> {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut ContentBlock<P> {
        &mut self.content
    }

    pub fn into_content(self) -> ContentBlock<P> {
        self.content
    }

    /// The recoverable problem met while parsing the content block, if any.
    ///
    /// A record with a warning is still complete: either the typed block was built with best effort
    /// values, or the content fell back to a [`DefaultBlock`] holding the raw bytes.
    pub fn content_warning(&self) -> Option<&ContentError> {
        self.warning.as_ref()
    }

    pub fn is_warcinfo(&self) -> bool {
        self.record_type == WarcRecordType::WarcInfo
    }

    pub fn is_request(&self) -> bool {
        self.record_type == WarcRecordType::Request
    }

    pub fn is_response(&self) -> bool {
        self.record_type == WarcRecordType::Response
    }

    pub fn is_resource(&self) -> bool {
        self.record_type == WarcRecordType::Resource
    }

    pub fn is_metadata(&self) -> bool {
        self.record_type == WarcRecordType::Metadata
    }

    pub fn is_revisit(&self) -> bool {
        self.record_type == WarcRecordType::Revisit
    }

    pub fn is_conversion(&self) -> bool {
        self.record_type == WarcRecordType::Conversion
    }

    pub fn is_continuation(&self) -> bool {
        self.record_type == WarcRecordType::Continuation
    }
}

impl<P: Read> WarcRecord<P> {
    /// Copies the unread payload into memory, detaching the record from its stream.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying stream if the payload cannot be read.
    pub fn freeze(self) -> io::Result<FrozenRecord> {
        let Self { version, record_type, headers, content_length, content, warning } = self;
        let content = content.try_map_payload(|mut payload| {
            let mut buf = Vec::new();
            payload.read_to_end(&mut buf)?;
            Ok::<_, io::Error>(Cursor::new(Bytes::from(buf)))
        })?;
        Ok(WarcRecord { version, record_type, headers, content_length, content, warning })
    }
}

/// Content block of a record, selected by its `WARC-Type`.
#[derive(Debug)]
pub enum ContentBlock<P> {
    Request(RequestBlock<P>),
    Response(ResponseBlock<P>),
    Default(DefaultBlock<P>),
}

impl<P> ContentBlock<P> {
    /// The payload of the block, `None` once a response payload was drained.
    pub fn payload_mut(&mut self) -> Option<&mut P> {
        match self {
            ContentBlock::Request(block) => Some(block.payload_mut()),
            ContentBlock::Response(block) => block.payload.as_mut(),
            ContentBlock::Default(block) => Some(block.payload_mut()),
        }
    }

    pub fn as_request(&self) -> Option<&RequestBlock<P>> {
        match self {
            ContentBlock::Request(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&ResponseBlock<P>> {
        match self {
            ContentBlock::Response(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_response_mut(&mut self) -> Option<&mut ResponseBlock<P>> {
        match self {
            ContentBlock::Response(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_default(&self) -> Option<&DefaultBlock<P>> {
        match self {
            ContentBlock::Default(block) => Some(block),
            _ => None,
        }
    }

    fn try_map_payload<Q, E>(self, f: impl FnOnce(P) -> Result<Q, E>) -> Result<ContentBlock<Q>, E> {
        Ok(match self {
            ContentBlock::Request(RequestBlock { head, payload }) => {
                ContentBlock::Request(RequestBlock { head, payload: f(payload)? })
            }
            ContentBlock::Response(ResponseBlock { head, payload, default_charset }) => {
                let payload = payload.map(f).transpose()?;
                ContentBlock::Response(ResponseBlock { head, payload, default_charset })
            }
            ContentBlock::Default(DefaultBlock { payload }) => ContentBlock::Default(DefaultBlock { payload: f(payload)? }),
        })
    }
}

/// Request line and headers of an embedded HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub(crate) method: String,
    pub(crate) target: String,
    pub(crate) protocol: String,
    pub(crate) major: u32,
    pub(crate) minor: u32,
    pub(crate) headers: Headers,
}

impl RequestHead {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request target as written, usually a path or an absolute URI.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Protocol name of the request line, e.g. `HTTP`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn major_version(&self) -> u32 {
        self.major
    }

    pub fn minor_version(&self) -> u32 {
        self.minor
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The method as an [`http::Method`], `None` if it is not a valid token.
    pub fn http_method(&self) -> Option<Method> {
        Method::from_bytes(self.method.as_bytes()).ok()
    }

    /// The protocol version as an [`http::Version`], `None` for non HTTP protocols.
    pub fn http_version(&self) -> Option<Version> {
        http_version(&self.protocol, self.major, self.minor)
    }
}

/// Status line, headers and derived content type of an embedded HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub(crate) protocol: String,
    pub(crate) major: u32,
    pub(crate) minor: u32,
    pub(crate) status_code: u16,
    pub(crate) reason: String,
    pub(crate) headers: Headers,
    pub(crate) mime_type: String,
    pub(crate) charset: Option<Charset>,
}

impl ResponseHead {
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn major_version(&self) -> u32 {
        self.major
    }

    pub fn minor_version(&self) -> u32 {
        self.minor
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The status code as an [`http::StatusCode`], `None` if it is out of range.
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status_code).ok()
    }

    /// Reason phrase of the status line, empty if there was none.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Media type without parameters, e.g. `text/html`; empty if `Content-Type` is absent.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Charset named by the `Content-Type` header, if it names a supported one.
    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }

    pub fn http_version(&self) -> Option<Version> {
        http_version(&self.protocol, self.major, self.minor)
    }
}

fn http_version(protocol: &str, major: u32, minor: u32) -> Option<Version> {
    if !protocol.eq_ignore_ascii_case("HTTP") {
        return None;
    }
    match (major, minor) {
        (0, 9) => Some(Version::HTTP_09),
        (1, 0) => Some(Version::HTTP_10),
        (1, 1) => Some(Version::HTTP_11),
        (2, 0) => Some(Version::HTTP_2),
        (3, 0) => Some(Version::HTTP_3),
        _ => None,
    }
}

/// Content block of a `request` record.
#[derive(Debug)]
pub struct RequestBlock<P> {
    head: RequestHead,
    payload: P,
}

impl<P> RequestBlock<P> {
    pub(crate) fn new(head: RequestHead, payload: P) -> Self {
        Self { head, payload }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &str {
        self.head.method()
    }

    pub fn target(&self) -> &str {
        self.head.target()
    }

    pub fn headers(&self) -> &Headers {
        self.head.headers()
    }

    pub fn http_method(&self) -> Option<Method> {
        self.head.http_method()
    }

    pub fn http_version(&self) -> Option<Version> {
        self.head.http_version()
    }

    /// The request body.
    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}

/// Content block of a `response` record.
///
/// The payload can be taken or drained once; afterwards the block is consumed and every payload
/// access returns [`WarcError::PayloadConsumed`].
#[derive(Debug)]
pub struct ResponseBlock<P> {
    head: ResponseHead,
    payload: Option<P>,
    default_charset: Charset,
}

impl<P> ResponseBlock<P> {
    pub(crate) fn new(head: ResponseHead, payload: P, default_charset: Charset) -> Self {
        Self { head, payload: Some(payload), default_charset }
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn status_code(&self) -> u16 {
        self.head.status_code()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.head.status()
    }

    pub fn reason(&self) -> &str {
        self.head.reason()
    }

    pub fn headers(&self) -> &Headers {
        self.head.headers()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers().get(name)
    }

    pub fn mime_type(&self) -> &str {
        self.head.mime_type()
    }

    pub fn charset(&self) -> Option<Charset> {
        self.head.charset()
    }

    /// Returns true once the payload was taken or drained.
    pub fn is_consumed(&self) -> bool {
        self.payload.is_none()
    }

    /// The response body.
    ///
    /// # Errors
    ///
    /// Returns [`WarcError::PayloadConsumed`] if the payload was already taken.
    pub fn payload_mut(&mut self) -> Result<&mut P, WarcError> {
        self.payload.as_mut().ok_or(WarcError::PayloadConsumed)
    }

    /// Takes the response body out of the block, leaving it consumed.
    ///
    /// # Errors
    ///
    /// Returns [`WarcError::PayloadConsumed`] if the payload was already taken.
    pub fn take_payload(&mut self) -> Result<P, WarcError> {
        self.payload.take().ok_or(WarcError::PayloadConsumed)
    }
}

impl<P: Read> ResponseBlock<P> {
    /// Drains the payload into a string using the response charset, or the decoder's default
    /// charset if the response did not name one.
    ///
    /// # Errors
    ///
    /// Returns [`WarcError::PayloadConsumed`] on a second call, or an I/O error if the payload
    /// cannot be read.
    pub fn payload_as_text(&mut self) -> Result<String, WarcError> {
        let charset = self.head.charset.unwrap_or(self.default_charset);
        self.payload_as_text_with(charset)
    }

    /// Drains the payload into a string using `charset`.
    ///
    /// # Errors
    ///
    /// Same as [`payload_as_text`](Self::payload_as_text).
    pub fn payload_as_text_with(&mut self, charset: Charset) -> Result<String, WarcError> {
        let mut payload = self.take_payload()?;
        let mut buf = Vec::new();
        payload.read_to_end(&mut buf)?;
        Ok(charset.decode(&buf))
    }
}

/// Content block of every record type without an embedded HTTP message.
///
/// Also used for `request` and `response` records whose HTTP head could not be parsed; the
/// payload then holds the complete raw content block.
#[derive(Debug)]
pub struct DefaultBlock<P> {
    payload: P,
}

impl<P> DefaultBlock<P> {
    pub(crate) fn new(payload: P) -> Self {
        Self { payload }
    }

    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}
