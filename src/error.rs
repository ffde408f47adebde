//! Unified error types for codec operations.

use crate::format::ImageFormat;

/// Boxed error carried by read and write failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for codec operations.
///
/// [`CodecError::InvalidParams`] is the only variant the adapter raises
/// itself. Everything else comes from a format codec or from the
/// format-selection layer and reaches the caller untouched.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The supplied parameters are neither the codec's own type nor one of
    /// its ancestors.
    #[error("invalid imaging parameters: expected {expected} or an ancestor but was {actual}")]
    InvalidParams {
        expected: &'static str,
        actual: &'static str,
    },
    /// Format not recognized from magic bytes.
    #[error("unrecognized image format")]
    UnrecognizedFormat,
    /// Format recognized but no codec compiled in for it.
    #[error("format {0:?} not supported (codec not compiled in)")]
    UnsupportedFormat(ImageFormat),
    /// Codec not enabled in the provided registry.
    #[error("format {0:?} is disabled in the codec registry")]
    DisabledFormat(ImageFormat),
    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    /// The byte source does not conform to the format's structure.
    #[error("failed to read {format:?} image: {source}")]
    Read {
        format: ImageFormat,
        #[source]
        source: BoxError,
    },
    /// The codec cannot serialize the given pixels under the given params.
    #[error("failed to write {format:?} image: {source}")]
    Write {
        format: ImageFormat,
        #[source]
        source: BoxError,
    },
    /// Underlying transport error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Wrap a codec-specific decoding error.
    pub fn read<E>(format: ImageFormat, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        CodecError::Read {
            format,
            source: error.into(),
        }
    }

    /// Wrap a codec-specific encoding error.
    pub fn write<E>(format: ImageFormat, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        CodecError::Write {
            format,
            source: error.into(),
        }
    }

    /// Read failure with a plain message, for hand-written parsers.
    pub fn malformed(format: ImageFormat, detail: impl Into<String>) -> Self {
        Self::read(format, detail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_params_names_both_types() {
        let err = CodecError::InvalidParams {
            expected: "PngParams",
            actual: "PnmParams",
        };
        let msg = err.to_string();
        assert!(msg.contains("PngParams"));
        assert!(msg.contains("PnmParams"));
    }

    #[test]
    fn read_error_keeps_source() {
        use std::error::Error as _;

        let err = CodecError::malformed(ImageFormat::Pnm, "bad magic");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("bad magic"));
        assert!(err.to_string().contains("Pnm"));
    }

    #[test]
    fn io_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: CodecError = io.into();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
