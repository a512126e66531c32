//! An owning iterator over an archive.

use std::io::BufRead;

use crate::protocol::{FrozenRecord, WarcError};
use crate::reader::WarcReader;

/// Iterator of records whose payload has been copied into memory.
///
/// Each record is detached from the stream, so records can be kept, reordered or sent to other
/// threads. The cost is reading every payload in full.
#[derive(Debug)]
pub struct FrozenRecords<R> {
    reader: WarcReader<R>,
}

impl<R: BufRead> FrozenRecords<R> {
    pub(crate) fn new(reader: WarcReader<R>) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> WarcReader<R> {
        self.reader
    }
}

impl<R: BufRead> Iterator for FrozenRecords<R> {
    type Item = Result<FrozenRecord, WarcError>;

    fn next(&mut self) -> Option<Self::Item> {
        let frozen = match self.reader.next_record() {
            Ok(Some(record)) => record.freeze(),
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };

        if frozen.is_err() {
            self.reader.terminate();
        }
        Some(frozen.map_err(WarcError::from))
    }
}
