//! The payload view handed out with a decoded record.

use std::cmp;
use std::fmt;
use std::io::{self, BufRead, Read};

use bytes::{Buf, Bytes};

use crate::codec::body::BoundedReader;

/// Unread remainder of a record's content block.
///
/// A payload borrows the record decoder's stream, so it can only be used until the next record is
/// requested. Bytes a failed content parse already consumed are replayed first, which keeps the
/// payload of a raw fallback block identical to the full content block.
pub struct Payload<'a, R> {
    replay: Bytes,
    body: BoundedReader<'a, R>,
}

impl<'a, R: BufRead> Payload<'a, R> {
    pub(crate) fn new(replay: Bytes, body: BoundedReader<'a, R>) -> Self {
        Self { replay, body }
    }

    /// Number of payload bytes not read yet.
    pub fn remaining(&self) -> u64 {
        self.replay.len() as u64 + self.body.remaining()
    }

    /// Reads everything up to the end of the content block into memory.
    pub fn read_to_bytes(&mut self) -> io::Result<Bytes> {
        let capacity = cmp::min(self.remaining(), MAX_PREALLOCATION) as usize;
        let mut buf = Vec::with_capacity(capacity);
        self.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Drops the unread payload. Returns the number of discarded bytes.
    pub fn discard(&mut self) -> io::Result<u64> {
        let replayed = self.replay.len() as u64;
        self.replay.clear();
        Ok(replayed + self.body.discard_remaining()?)
    }
}

const MAX_PREALLOCATION: u64 = 1024 * 1024;

impl<R: BufRead> Read for Payload<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.replay.is_empty() {
            return self.body.read(buf);
        }

        let len = cmp::min(self.replay.len(), buf.len());
        self.replay.copy_to_slice(&mut buf[..len]);
        Ok(len)
    }
}

impl<R: BufRead> BufRead for Payload<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.replay.is_empty() { self.body.fill_buf() } else { Ok(self.replay.as_ref()) }
    }

    fn consume(&mut self, amt: usize) {
        if self.replay.is_empty() {
            self.body.consume(amt);
        } else {
            self.replay.advance(cmp::min(amt, self.replay.len()));
        }
    }
}

impl<R> fmt::Debug for Payload<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload").field("replay", &self.replay.len()).field("body", &self.body).finish()
    }
}
