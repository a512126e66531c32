use std::io::{self, BufRead};

use tracing::{trace, warn};

use crate::codec::{DecodedHead, DecoderConfig, RecordDecoder, StreamRecord};
use crate::compress::{ArchiveStream, Compression};
use crate::protocol::{Charset, WarcError, WarcRecordType};
use crate::reader::FrozenRecords;

/// Default bound on consecutive framing errors skipped by [`FramingPolicy::SkipRecord`].
pub const DEFAULT_MAX_SKIPPED_RECORDS: usize = 64;

/// What the reader does when a record's boundaries cannot be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingPolicy {
    /// Surface the error and end the sequence.
    #[default]
    Terminate,
    /// Log the error and continue with the next record.
    ///
    /// The reader discards the broken record if its length is known and otherwise scans forward
    /// to the next line starting with `WARC/`. Records, or parts of them, can be lost.
    SkipRecord,
}

/// A lazy, forward-only sequence of WARC records.
///
/// Pulling a record invalidates the payload of the previous one. Once the sequence ends, by
/// reaching the end of the archive or by a fatal error, every further pull returns `Ok(None)`.
#[derive(Debug)]
pub struct WarcReader<R> {
    decoder: RecordDecoder<R>,
    policy: FramingPolicy,
    max_skipped_records: usize,
    record_types: Vec<WarcRecordType>,
    finished: bool,
}

impl WarcReader<()> {
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::new()
    }
}

impl<R: BufRead> WarcReader<R> {
    /// Creates a reader with the default settings over an uncompressed stream.
    pub fn new(reader: R) -> Self {
        ReaderBuilder::new().build(reader)
    }

    /// Pulls the next record.
    ///
    /// # Returns
    /// * `Ok(Some(record))` for the next record of an accepted type
    /// * `Ok(None)` once the sequence has ended
    /// * `Err(WarcError)` for a fatal error; the sequence ends with it
    pub fn next_record(&mut self) -> Result<Option<StreamRecord<'_, R>>, WarcError> {
        let Some(head) = self.next_head()? else {
            return Ok(None);
        };
        Ok(Some(self.decoder.open(head)))
    }

    /// Returns true once the sequence has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Turns the reader into an iterator of records that own their payload.
    pub fn into_frozen(self) -> FrozenRecords<R> {
        FrozenRecords::new(self)
    }

    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }

    pub(crate) fn terminate(&mut self) {
        self.finished = true;
    }

    fn next_head(&mut self) -> Result<Option<DecodedHead>, WarcError> {
        if self.finished {
            return Ok(None);
        }

        let mut skipped = 0;
        loop {
            let head = match self.decoder.read_warc_head() {
                Ok(Some(head)) => head,
                Ok(None) => {
                    self.finished = true;
                    return Ok(None);
                }
                Err(e) => {
                    if self.may_skip(&e, skipped) && self.decoder.recover() {
                        skipped += 1;
                        warn!(cause = %e, skipped, "skipping record after framing error");
                        continue;
                    }
                    self.finished = true;
                    return Err(e);
                }
            };

            if !self.accepts(head.record_type) {
                trace!(record_type = %head.record_type, "skipping filtered record");
                continue;
            }

            return match self.decoder.decode_content(head) {
                Ok(head) => Ok(Some(head)),
                Err(e) => {
                    self.finished = true;
                    Err(e)
                }
            };
        }
    }

    fn may_skip(&self, e: &WarcError, skipped: usize) -> bool {
        self.policy == FramingPolicy::SkipRecord && e.is_framing() && skipped < self.max_skipped_records
    }

    fn accepts(&self, record_type: WarcRecordType) -> bool {
        self.record_types.is_empty() || self.record_types.contains(&record_type)
    }
}

/// Builder for [`WarcReader`].
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use micro_warc::protocol::WarcRecordType;
/// use micro_warc::reader::{FramingPolicy, WarcReader};
///
/// let archive = b"WARC/1.0\r\nWARC-Type: warcinfo\r\nContent-Length: 0\r\n\r\n\r\n\r\n";
/// let mut reader = WarcReader::builder()
///     .framing_policy(FramingPolicy::SkipRecord)
///     .record_types([WarcRecordType::Response])
///     .build(Cursor::new(&archive[..]));
///
/// assert!(reader.next_record().unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    config: DecoderConfig,
    policy: FramingPolicy,
    max_skipped_records: usize,
    record_types: Vec<WarcRecordType>,
    compression: Compression,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderBuilder {
    pub fn new() -> Self {
        Self {
            config: DecoderConfig::default(),
            policy: FramingPolicy::default(),
            max_skipped_records: DEFAULT_MAX_SKIPPED_RECORDS,
            record_types: Vec::new(),
            compression: Compression::None,
        }
    }

    /// Encoding of header lines and fallback for payload text. Defaults to ISO-8859-1.
    #[must_use]
    pub fn charset(mut self, charset: Charset) -> Self {
        self.config.charset = charset;
        self
    }

    /// Upper bound for a single header block. Defaults to 1 MiB.
    #[must_use]
    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.config.max_header_bytes = max_header_bytes;
        self
    }

    #[must_use]
    pub fn framing_policy(mut self, policy: FramingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// How many framing errors in a row [`FramingPolicy::SkipRecord`] tolerates before the
    /// sequence ends anyway.
    #[must_use]
    pub fn max_skipped_records(mut self, max_skipped_records: usize) -> Self {
        self.max_skipped_records = max_skipped_records;
        self
    }

    /// Only return records of these types. An empty set returns every record.
    #[must_use]
    pub fn record_types<I: IntoIterator<Item = WarcRecordType>>(mut self, record_types: I) -> Self {
        self.record_types = record_types.into_iter().collect();
        self
    }

    /// Decompression applied by [`open`](Self::open).
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Builds a reader over an uncompressed stream.
    pub fn build<R: BufRead>(self, reader: R) -> WarcReader<R> {
        WarcReader {
            decoder: RecordDecoder::with_config(reader, self.config),
            policy: self.policy,
            max_skipped_records: self.max_skipped_records,
            record_types: self.record_types,
            finished: false,
        }
    }

    /// Builds a reader that removes the configured compression first.
    ///
    /// # Errors
    ///
    /// Fails if the stream cannot be peeked for [`Compression::Auto`].
    pub fn open<R: BufRead>(self, reader: R) -> io::Result<WarcReader<ArchiveStream<R>>> {
        let stream = ArchiveStream::new(reader, self.compression)?;
        Ok(self.build(stream))
    }
}
