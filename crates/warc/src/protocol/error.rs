use std::io;
use thiserror::Error;

/// Top-level error returned by the record decoder and the record sequence.
///
/// Only fatal conditions surface here. Problems inside an already bounded content block are reported
/// through [`ContentError`] on the record itself and never interrupt iteration.
#[derive(Debug, Error)]
pub enum WarcError {
    #[error("framing error: {source}")]
    Framing {
        #[from]
        source: FramingError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("payload has already been consumed")]
    PayloadConsumed,

    #[error("decoder was terminated by a previous fatal error")]
    Terminated,
}

impl WarcError {
    /// Returns true if the record boundaries could not be established.
    pub fn is_framing(&self) -> bool {
        matches!(self, WarcError::Framing { .. })
    }

    /// Returns true if the underlying stream failed.
    pub fn is_io(&self) -> bool {
        matches!(self, WarcError::Io { .. })
    }
}

/// Failure to establish the boundaries of a record.
#[derive(Error, Debug)]
pub enum FramingError {
    #[error("WARC version is missing, found line: {line:?}")]
    MissingVersion { line: String },

    #[error("unable to parse header: {line:?}")]
    InvalidHeader { line: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("cannot parse WARC Content-Length: {reason}")]
    InvalidContentLength { reason: String },

    #[error("WARC-Type header is missing")]
    MissingRecordType,

    #[error("unknown WARC-Type: {value:?}")]
    UnknownRecordType { value: String },
}

impl FramingError {
    pub fn missing_version<S: ToString>(line: S) -> Self {
        Self::MissingVersion { line: line.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    pub fn unknown_record_type<S: ToString>(value: S) -> Self {
        Self::UnknownRecordType { value: value.to_string() }
    }
}

/// Failure to interpret the bytes of a correctly bounded content block.
///
/// The record is still produced; its raw bytes stay readable through the default payload view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("invalid http request line: {line:?}")]
    InvalidRequestLine { line: String },

    #[error("invalid http status line: {line:?}")]
    InvalidStatusLine { line: String },

    #[error("unable to parse http header: {line:?}")]
    InvalidHeader { line: String },

    #[error("http header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("unsupported charset: {name}")]
    UnsupportedCharset { name: String },
}

impl ContentError {
    pub fn invalid_request_line<S: ToString>(line: S) -> Self {
        Self::InvalidRequestLine { line: line.to_string() }
    }

    pub fn invalid_status_line<S: ToString>(line: S) -> Self {
        Self::InvalidStatusLine { line: line.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn unsupported_charset<S: ToString>(name: S) -> Self {
        Self::UnsupportedCharset { name: name.to_string() }
    }
}

/// Result of the shared header block parser, before it is known whether the block belongs to the
/// WARC framing or to an embedded HTTP message.
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("unable to parse header: {line:?}")]
    InvalidHeader { line: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl HeaderError {
    pub fn invalid_header<S: ToString>(line: S) -> Self {
        Self::InvalidHeader { line: line.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    /// Splits an error raised inside an embedded HTTP head into its recoverable part and a fatal
    /// stream failure.
    pub(crate) fn into_content_error(self) -> Result<ContentError, io::Error> {
        match self {
            HeaderError::InvalidHeader { line } => Ok(ContentError::InvalidHeader { line }),
            HeaderError::TooLargeHeader { current_size, max_size } => {
                Ok(ContentError::TooLargeHeader { current_size, max_size })
            }
            HeaderError::Io { source } => Err(source),
        }
    }
}

impl From<HeaderError> for WarcError {
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::InvalidHeader { line } => FramingError::InvalidHeader { line }.into(),
            HeaderError::TooLargeHeader { current_size, max_size } => {
                FramingError::TooLargeHeader { current_size, max_size }.into()
            }
            HeaderError::Io { source } => WarcError::Io { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_error_maps_to_framing() {
        let error: WarcError = HeaderError::invalid_header("no colon here").into();
        assert!(error.is_framing());
        assert!(error.to_string().contains("no colon here"));

        let error: WarcError = HeaderError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")).into();
        assert!(error.is_io());
    }

    #[test]
    fn header_error_maps_to_content() {
        let content = HeaderError::too_large_header(10, 5).into_content_error().unwrap();
        assert_eq!(content, ContentError::TooLargeHeader { current_size: 10, max_size: 5 });

        let io = HeaderError::from(io::Error::other("broken")).into_content_error();
        assert!(io.is_err());
    }
}
