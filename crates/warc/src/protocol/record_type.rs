use std::fmt;
use std::str::FromStr;

use crate::protocol::FramingError;

/// The `WARC-Type` of a record.
///
/// See <https://iipc.github.io/warc-specifications/specifications/warc-format/warc-1.1/#warc-type-mandatory>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarcRecordType {
    /// Describes the records that follow it, usually the first record of a file.
    WarcInfo,
    /// A complete scheme-specific request.
    Request,
    /// A complete scheme-specific response.
    Response,
    /// A resource without full protocol response information.
    Resource,
    /// Content created to describe another record.
    Metadata,
    /// Revisitation of content already archived.
    Revisit,
    /// Alternative version of another record's content.
    Conversion,
    /// A segment of a record split across files.
    Continuation,
}

impl WarcRecordType {
    pub const ALL: [WarcRecordType; 8] = [
        WarcRecordType::WarcInfo,
        WarcRecordType::Request,
        WarcRecordType::Response,
        WarcRecordType::Resource,
        WarcRecordType::Metadata,
        WarcRecordType::Revisit,
        WarcRecordType::Conversion,
        WarcRecordType::Continuation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WarcRecordType::WarcInfo => "warcinfo",
            WarcRecordType::Request => "request",
            WarcRecordType::Response => "response",
            WarcRecordType::Resource => "resource",
            WarcRecordType::Metadata => "metadata",
            WarcRecordType::Revisit => "revisit",
            WarcRecordType::Conversion => "conversion",
            WarcRecordType::Continuation => "continuation",
        }
    }
}

impl FromStr for WarcRecordType {
    type Err = FramingError;

    /// Matches the eight known types case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        WarcRecordType::ALL
            .into_iter()
            .find(|record_type| record_type.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| FramingError::unknown_record_type(value))
    }
}

impl fmt::Display for WarcRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<WarcRecordType> for &'static str {
    fn from(value: WarcRecordType) -> Self {
        value.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_case_insensitive() {
        assert_eq!("response".parse::<WarcRecordType>().unwrap(), WarcRecordType::Response);
        assert_eq!("WARCINFO".parse::<WarcRecordType>().unwrap(), WarcRecordType::WarcInfo);
        assert_eq!(" Revisit ".parse::<WarcRecordType>().unwrap(), WarcRecordType::Revisit);

        for record_type in WarcRecordType::ALL {
            assert_eq!(record_type.to_string().parse::<WarcRecordType>().unwrap(), record_type);
        }
    }

    #[test]
    fn parse_unknown() {
        let error = "bogus".parse::<WarcRecordType>().unwrap_err();
        assert!(matches!(error, FramingError::UnknownRecordType { value } if value == "bogus"));
    }
}
