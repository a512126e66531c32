//! The record decoder state machine.
//!
//! Decoding one record walks through these states:
//!
//! ```text
//! AwaitingRecord -> HeaderParsed -> PayloadBounded -> RecordReady -> AwaitingRecord
//! ```
//!
//! The WARC head and the embedded HTTP head are decoded into owned values first. Only the last,
//! infallible step builds the [`Payload`] view, which borrows the decoder until the caller asks
//! for the next record.

use std::io::{self, BufRead};

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::codec::body::{BoundedReader, Payload};
use crate::codec::content::{HeadError, RequestHeadDecoder, ResponseHeadDecoder};
use crate::codec::header::HeaderDecoder;
use crate::codec::line::{is_terminated, read_line, read_raw_line, strip_line_ending};
use crate::codec::{DecoderConfig, parse_number};
use crate::ensure;
use crate::protocol::{
    ContentBlock, ContentError, DefaultBlock, FramingError, RequestBlock, RequestHead, ResponseBlock, ResponseHead,
    WarcError, WarcHeaders, WarcRecord, WarcRecordType,
};
use DecodeState::*;

/// A record whose payload borrows the decoder's stream.
pub type StreamRecord<'a, R> = WarcRecord<Payload<'a, R>>;

/// Forward-only decoder of WARC records.
///
/// The decoder exclusively owns the underlying stream. Records are produced strictly in order and
/// each payload is only readable until the next call to [`read_record`](Self::read_record).
#[derive(Debug)]
pub struct RecordDecoder<R> {
    stream: R,
    /// Unread bytes of the current content block.
    remaining: u64,
    state: DecodeState,
    config: DecoderConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Positioned at a record boundary. With `resync`, lines are skipped up to the next version line.
    AwaitingRecord { resync: bool },
    /// Version line and header block read, length not known yet
    HeaderParsed,
    /// Content length known, the stream sits somewhere inside the content block
    PayloadBounded,
    /// Content head decoded, the payload is handed out
    RecordReady,
    /// End of stream reached at a record boundary
    Exhausted,
    /// A previous call failed
    Failed(Recovery),
}

/// How a failed decoder may continue, if the caller decides to skip the broken record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// Record boundaries are lost, scan for the next version line
    Scan,
    /// Content length is known, discard the content block
    Discard,
    /// The stream failed
    Fatal,
}

/// The WARC part of a record, decoded before any content byte is read.
#[derive(Debug)]
pub(crate) struct RecordHead {
    pub(crate) version: String,
    pub(crate) record_type: WarcRecordType,
    pub(crate) headers: WarcHeaders,
    pub(crate) content_length: u64,
}

/// A record head plus its decoded content head, ready to be opened.
#[derive(Debug)]
pub(crate) struct DecodedHead {
    record: RecordHead,
    content: ContentHead,
    warning: Option<ContentError>,
}

#[derive(Debug)]
enum ContentHead {
    Request(RequestHead),
    Response(ResponseHead),
    /// No typed head; the bytes consumed by a failed parse are replayed in front of the payload
    Raw(Bytes),
}

impl<R: BufRead> RecordDecoder<R> {
    pub fn new(stream: R) -> Self {
        Self::with_config(stream, DecoderConfig::default())
    }

    pub fn with_config(stream: R, config: DecoderConfig) -> Self {
        Self { stream, remaining: 0, state: AwaitingRecord { resync: false }, config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Returns true once the end of the archive was reached.
    pub fn is_exhausted(&self) -> bool {
        self.state == Exhausted
    }

    pub fn get_ref(&self) -> &R {
        &self.stream
    }

    /// Gives back the underlying stream, positioned wherever decoding stopped.
    pub fn into_inner(self) -> R {
        self.stream
    }

    /// Decodes the next record.
    ///
    /// Any unread payload of the previous record is discarded first.
    ///
    /// # Returns
    /// * `Ok(Some(record))` for the next record; a recoverable content problem is attached to it,
    ///   see [`WarcRecord::content_warning`]
    /// * `Ok(None)` at the end of the archive, and on every call after that
    /// * `Err(WarcError::Framing)` if the record boundaries cannot be established
    /// * `Err(WarcError::Io)` if the stream fails
    /// * `Err(WarcError::Terminated)` after a previous error, unless [`recover`](Self::recover) was called
    pub fn read_record(&mut self) -> Result<Option<StreamRecord<'_, R>>, WarcError> {
        let Some(head) = self.read_warc_head()? else {
            return Ok(None);
        };
        let head = self.decode_content(head)?;
        Ok(Some(self.open(head)))
    }

    /// Prepares a failed decoder to continue with the next record.
    ///
    /// After a framing error the broken record is skipped: its content block is discarded if its
    /// length was read, otherwise the stream is scanned for the next line starting with `WARC/`.
    /// Either way some data may be lost. Returns false if the stream itself failed and decoding
    /// cannot continue.
    pub fn recover(&mut self) -> bool {
        match self.state {
            Failed(Recovery::Fatal) => false,
            Failed(Recovery::Scan) => {
                trace!("recovering by scanning for the next version line");
                self.state = AwaitingRecord { resync: true };
                true
            }
            Failed(Recovery::Discard) => {
                trace!(remaining = self.remaining, "recovering by discarding the content block");
                self.state = PayloadBounded;
                true
            }
            _ => true,
        }
    }

    /// Advances to the next record boundary and decodes the WARC head found there.
    ///
    /// On success the decoder is left in `PayloadBounded`, so calling this again skips the record
    /// without looking at its content.
    pub(crate) fn read_warc_head(&mut self) -> Result<Option<RecordHead>, WarcError> {
        if matches!(self.state, PayloadBounded | RecordReady) {
            if let Err(e) = self.finish_record() {
                self.state = Failed(Recovery::Fatal);
                return Err(e.into());
            }
        }

        let resync = match self.state {
            AwaitingRecord { resync } => resync,
            Exhausted => return Ok(None),
            _ => return Err(WarcError::Terminated),
        };

        match self.parse_warc_head(resync) {
            Ok(Some(head)) => Ok(Some(head)),
            Ok(None) => {
                trace!("reached end of archive");
                self.state = Exhausted;
                Ok(None)
            }
            Err(e) => {
                self.state = Failed(match (&e, self.state) {
                    (WarcError::Framing { .. }, PayloadBounded) => Recovery::Discard,
                    (WarcError::Framing { .. }, _) => Recovery::Scan,
                    _ => Recovery::Fatal,
                });
                Err(e)
            }
        }
    }

    /// Decodes the HTTP head of `request` and `response` records.
    ///
    /// A head that does not parse is not an error: the record falls back to a raw content block
    /// and carries the problem as a warning.
    pub(crate) fn decode_content(&mut self, head: RecordHead) -> Result<DecodedHead, WarcError> {
        let DecoderConfig { charset, max_header_bytes } = self.config;
        let mut raw = Vec::new();
        let mut body = BoundedReader::new(&mut self.stream, &mut self.remaining);

        let decoded = match head.record_type {
            WarcRecordType::Request => RequestHeadDecoder::new(charset, max_header_bytes)
                .decode(&mut body, &mut raw)
                .map(|request| (ContentHead::Request(request), None)),
            WarcRecordType::Response => ResponseHeadDecoder::new(charset, max_header_bytes)
                .decode(&mut body, &mut raw)
                .map(|(response, warning)| (ContentHead::Response(response), warning)),
            _ => Ok((ContentHead::Raw(Bytes::new()), None)),
        };

        let (content, warning) = match decoded {
            Ok(decoded) => decoded,
            Err(HeadError::Content(e)) => (ContentHead::Raw(Bytes::from(raw)), Some(e)),
            Err(HeadError::Io(e)) => {
                self.state = Failed(Recovery::Fatal);
                return Err(e.into());
            }
        };

        if let Some(warning) = &warning {
            warn!(
                record_type = %head.record_type,
                record_id = head.headers.get("WARC-Record-ID"),
                cause = %warning,
                "content block parsed with warning"
            );
        }

        self.state = RecordReady;
        Ok(DecodedHead { record: head, content, warning })
    }

    /// Builds the record and its payload view.
    pub(crate) fn open(&mut self, head: DecodedHead) -> StreamRecord<'_, R> {
        let DecodedHead { record, content, warning } = head;
        let charset = self.config.charset;
        let body = BoundedReader::new(&mut self.stream, &mut self.remaining);

        let content = match content {
            ContentHead::Request(request) => ContentBlock::Request(RequestBlock::new(request, Payload::new(Bytes::new(), body))),
            ContentHead::Response(response) => {
                ContentBlock::Response(ResponseBlock::new(response, Payload::new(Bytes::new(), body), charset))
            }
            ContentHead::Raw(replay) => ContentBlock::Default(DefaultBlock::new(Payload::new(replay, body))),
        };

        let RecordHead { version, record_type, headers, content_length } = record;
        WarcRecord::new(version, record_type, headers, content_length, content, warning)
    }

    /// Discards the rest of the current content block and the separator lines after it.
    fn finish_record(&mut self) -> io::Result<()> {
        BoundedReader::new(&mut self.stream, &mut self.remaining).discard_remaining()?;

        if self.remaining > 0 {
            warn!(missing = self.remaining, "archive ends inside a content block");
            self.remaining = 0;
            self.state = Exhausted;
            return Ok(());
        }

        let mut separator = Vec::new();
        for _ in 0..2 {
            separator.clear();
            read_raw_line(&mut self.stream, &mut separator, self.config.max_header_bytes)?;
        }

        self.state = AwaitingRecord { resync: false };
        Ok(())
    }

    fn parse_warc_head(&mut self, resync: bool) -> Result<Option<RecordHead>, WarcError> {
        let DecoderConfig { charset, max_header_bytes } = self.config;

        let version = if resync { self.scan_version_line()? } else { self.read_version_line()? };
        let Some(version) = version else {
            return Ok(None);
        };

        let headers = HeaderDecoder::new(charset, max_header_bytes).decode(&mut self.stream, &mut Vec::new())?;
        let headers = WarcHeaders::from(headers);
        self.state = HeaderParsed;

        let content_length = content_length(&headers)?;
        self.remaining = content_length;
        self.state = PayloadBounded;

        let record_type = headers
            .get("WARC-Type")
            .ok_or(FramingError::MissingRecordType)?
            .parse::<WarcRecordType>()?;

        debug!(
            %record_type,
            content_length,
            record_id = headers.get("WARC-Record-ID"),
            "decoded warc record head"
        );
        Ok(Some(RecordHead { version, record_type, headers, content_length }))
    }

    fn read_version_line(&mut self) -> Result<Option<String>, WarcError> {
        let DecoderConfig { charset, max_header_bytes } = self.config;
        let mut raw = Vec::new();
        if read_raw_line(&mut self.stream, &mut raw, max_header_bytes)? == 0 {
            self.ensure_end_of_stream()?;
            return Ok(None);
        }
        ensure!(
            is_terminated(&raw) || raw.len() < max_header_bytes,
            FramingError::too_large_header(raw.len(), max_header_bytes).into()
        );

        let line = charset.decode(strip_line_ending(&raw));
        if !is_version_line(&line) {
            return Err(FramingError::missing_version(line).into());
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn scan_version_line(&mut self) -> Result<Option<String>, WarcError> {
        let DecoderConfig { charset, max_header_bytes } = self.config;
        let mut skipped = 0usize;
        if max_header_bytes == 0 {
            self.ensure_end_of_stream()?;
        }

        while let Some(line) = read_line(&mut self.stream, charset, max_header_bytes)? {
            if is_version_line(&line) {
                debug!(skipped_lines = skipped, "resynchronized on a version line");
                return Ok(Some(line.trim().to_owned()));
            }
            skipped += 1;
        }

        debug!(skipped_lines = skipped, "no version line found while resynchronizing");
        Ok(None)
    }

    /// A line limit of zero reads nothing, which must not pass for the end of the archive.
    fn ensure_end_of_stream(&mut self) -> Result<(), WarcError> {
        let max_header_bytes = self.config.max_header_bytes;
        ensure!(self.stream.fill_buf()?.is_empty(), FramingError::too_large_header(0, max_header_bytes).into());
        Ok(())
    }
}

fn is_version_line(line: &str) -> bool {
    line.get(..5).is_some_and(|prefix| prefix.eq_ignore_ascii_case("warc/"))
}

fn content_length(headers: &WarcHeaders) -> Result<u64, FramingError> {
    let value = headers.get("Content-Length").ok_or_else(|| FramingError::invalid_content_length("header is missing"))?;
    parse_number(value.trim()).ok_or_else(|| FramingError::invalid_content_length(format!("not a number: {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn record(record_type: &str, content: &str) -> String {
        format!("WARC/1.0\r\nWARC-Type: {record_type}\r\nContent-Length: {}\r\n\r\n{content}\r\n\r\n", content.len())
    }

    fn decoder(archive: String) -> RecordDecoder<Cursor<Vec<u8>>> {
        RecordDecoder::new(Cursor::new(archive.into_bytes()))
    }

    fn read_payload<R: BufRead>(record: &mut StreamRecord<'_, R>) -> String {
        let mut text = String::new();
        record.content_mut().payload_mut().unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn state_transitions() {
        let mut decoder = decoder(record("resource", "abc") + &record("metadata", "de"));
        assert_eq!(decoder.state, AwaitingRecord { resync: false });

        let head = decoder.read_warc_head().unwrap().unwrap();
        assert_eq!(decoder.state, PayloadBounded);
        assert_eq!(decoder.remaining, 3);

        let head = decoder.decode_content(head).unwrap();
        assert_eq!(decoder.state, RecordReady);

        let mut record = decoder.open(head);
        assert_eq!(read_payload(&mut record), "abc");

        let record = decoder.read_record().unwrap().unwrap();
        assert!(record.is_metadata());

        assert!(decoder.read_record().unwrap().is_none());
        assert_eq!(decoder.state, Exhausted);
        assert!(decoder.read_record().unwrap().is_none());
    }

    #[test]
    fn skipped_head_discards_payload() {
        let mut decoder = decoder(record("resource", "skip me") + &record("resource", "keep"));
        decoder.read_warc_head().unwrap().unwrap();

        let mut record = decoder.read_record().unwrap().unwrap();
        assert_eq!(read_payload(&mut record), "keep");
    }

    #[test]
    fn empty_stream() {
        let mut decoder = decoder(String::new());
        assert!(decoder.read_record().unwrap().is_none());
        assert!(decoder.is_exhausted());
    }

    #[test]
    fn version_line_is_case_insensitive() {
        let archive = record("resource", "x").replacen("WARC/1.0", "warc/1.1", 1);
        let mut decoder = decoder(archive);
        assert_eq!(decoder.read_record().unwrap().unwrap().version(), "warc/1.1");
    }

    #[test]
    fn missing_version_terminates() {
        let mut decoder = decoder(format!("HTTP/1.1 200 OK\r\n{}", record("resource", "x")));
        let error = decoder.read_record().unwrap_err();
        assert!(matches!(error, WarcError::Framing { source: FramingError::MissingVersion { .. } }));
        assert!(matches!(decoder.read_record(), Err(WarcError::Terminated)));
    }

    #[test]
    fn recover_by_scanning() {
        let mut decoder = decoder(format!("garbage\r\nmore garbage\r\n{}", record("resource", "x")));
        assert!(decoder.read_record().is_err());

        assert!(decoder.recover());
        let mut record = decoder.read_record().unwrap().unwrap();
        assert_eq!(read_payload(&mut record), "x");
    }

    #[test]
    fn recover_by_discarding() {
        let archive = record("bogus", "payload with\r\nWARC/1.0 inside") + &record("resource", "next");
        let mut decoder = decoder(archive);

        let error = decoder.read_record().unwrap_err();
        assert!(matches!(error, WarcError::Framing { source: FramingError::UnknownRecordType { .. } }));

        assert!(decoder.recover());
        let mut record = decoder.read_record().unwrap().unwrap();
        assert_eq!(read_payload(&mut record), "next");
    }

    #[test]
    fn content_length_values() {
        let mut headers = WarcHeaders::new();
        assert!(matches!(content_length(&headers), Err(FramingError::InvalidContentLength { .. })));

        headers.insert("content-length", " 42 ");
        assert_eq!(content_length(&headers).unwrap(), 42);

        headers.insert("content-length", "notanumber");
        assert!(matches!(content_length(&headers), Err(FramingError::InvalidContentLength { .. })));

        headers.insert("content-length", "-1");
        assert!(content_length(&headers).is_err());
    }

    #[test]
    fn truncated_payload_ends_archive() {
        let mut archive = record("resource", "0123456789");
        archive.truncate(archive.len() - 8);
        let mut decoder = decoder(archive);

        let record = decoder.read_record().unwrap().unwrap();
        assert_eq!(record.content_length(), 10);

        assert!(decoder.read_record().unwrap().is_none());
        assert!(decoder.is_exhausted());
    }

    #[test]
    fn zero_header_limit_is_not_end_of_archive() {
        let mut decoder = RecordDecoder::with_config(
            Cursor::new(record("resource", "x").into_bytes()),
            DecoderConfig { max_header_bytes: 0, ..DecoderConfig::default() },
        );
        let error = decoder.read_record().unwrap_err();
        assert!(matches!(error, WarcError::Framing { source: FramingError::TooLargeHeader { max_size: 0, .. } }));
        assert!(!decoder.is_exhausted());

        let mut decoder =
            RecordDecoder::with_config(Cursor::new(Vec::new()), DecoderConfig { max_header_bytes: 0, ..DecoderConfig::default() });
        assert!(decoder.read_record().unwrap().is_none());
    }

    #[test]
    fn version_line_over_limit() {
        let mut decoder = RecordDecoder::with_config(
            Cursor::new(record("resource", "x").into_bytes()),
            DecoderConfig { max_header_bytes: 4, ..DecoderConfig::default() },
        );
        let error = decoder.read_record().unwrap_err();
        assert!(matches!(error, WarcError::Framing { source: FramingError::TooLargeHeader { current_size: 4, max_size: 4 } }));
    }

    struct FailingStream;

    impl Read for FailingStream {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn io_error_is_fatal() {
        let mut decoder = RecordDecoder::new(io::BufReader::new(FailingStream));
        let error = decoder.read_record().unwrap_err();
        assert!(error.is_io());

        assert!(!decoder.recover());
        assert!(matches!(decoder.read_record(), Err(WarcError::Terminated)));
    }
}
