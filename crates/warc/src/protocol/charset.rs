//! Text encodings used for header lines and payload text.
//!
//! WARC and HTTP header bytes are not reliably UTF-8, so header lines default to ISO-8859-1,
//! which maps every byte to a character and can never fail.

use std::fmt;

use encoding::all::{ISO_8859_1, UTF_8};
use encoding::label::encoding_from_whatwg_label;
use encoding::{DecoderTrap, EncodingRef};

/// A supported text encoding.
#[derive(Clone, Copy)]
pub struct Charset {
    encoding: EncodingRef,
}

impl Charset {
    /// ISO-8859-1, the default for header lines.
    pub fn latin1() -> Self {
        Self { encoding: ISO_8859_1 }
    }

    pub fn utf8() -> Self {
        Self { encoding: UTF_8 }
    }

    /// Looks up an encoding by its label, e.g. the value of a `charset=` parameter.
    ///
    /// Returns `None` for unknown or unsupported labels.
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_matches(|c| c == '"' || c == '\'');
        if label.is_empty() {
            return None;
        }
        encoding_from_whatwg_label(label).map(|encoding| Self { encoding })
    }

    /// Canonical name of the encoding, e.g. `utf-8` or `windows-1252`.
    pub fn name(&self) -> &'static str {
        self.encoding.whatwg_name().unwrap_or_else(|| self.encoding.name())
    }

    /// Decodes bytes, replacing malformed sequences instead of failing.
    pub fn decode(&self, bytes: &[u8]) -> String {
        self.encoding
            .decode(bytes, DecoderTrap::Replace)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::latin1()
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.encoding.name() == other.encoding.name()
    }
}

impl Eq for Charset {}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_labels() {
        assert_eq!(Charset::for_label("utf-8"), Some(Charset::utf8()));
        assert_eq!(Charset::for_label("UTF-8").unwrap().name(), "utf-8");
        assert_eq!(Charset::for_label("\"utf-8\""), Some(Charset::utf8()));
        assert!(Charset::for_label("shift_jis").is_some());
        assert!(Charset::for_label("no-such-charset").is_none());
        assert!(Charset::for_label("").is_none());
    }

    #[test]
    fn latin1_decodes_every_byte() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let text = Charset::latin1().decode(&bytes);
        assert_eq!(text.chars().count(), 256);
        assert_eq!(Charset::latin1().decode(b"caf\xe9"), "café");
    }

    #[test]
    fn utf8_replaces_malformed() {
        assert_eq!(Charset::utf8().decode(b"ok\xff"), "ok\u{fffd}");
    }
}
