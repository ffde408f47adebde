//! Byte sources handed to read-side codec operations.

use std::borrow::Cow;
use std::path::Path;

use crate::CodecError;

/// Encoded image bytes plus an optional name for diagnostics.
///
/// Codecs get random access to the whole input; file-backed sources are
/// read into memory up front.
#[derive(Clone, Debug)]
pub struct ByteSource<'a> {
    data: Cow<'a, [u8]>,
    name: Option<String>,
}

impl<'a> ByteSource<'a> {
    /// Borrow an in-memory buffer.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            name: None,
        }
    }

    /// Take ownership of an in-memory buffer.
    pub fn from_vec(data: Vec<u8>) -> ByteSource<'static> {
        ByteSource {
            data: Cow::Owned(data),
            name: None,
        }
    }

    /// Read a whole file. The path becomes the source name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<ByteSource<'static>, CodecError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(ByteSource {
            data: Cow::Owned(data),
            name: Some(path.display().to_string()),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<'a> From<&'a [u8]> for ByteSource<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::from_bytes(data)
    }
}

impl From<Vec<u8>> for ByteSource<'static> {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_source() {
        let data = [1u8, 2, 3];
        let source = ByteSource::from_bytes(&data).with_name("mem");
        assert_eq!(source.bytes(), &data);
        assert_eq!(source.name(), Some("mem"));
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = ByteSource::from_path("/definitely/not/here.png");
        assert!(matches!(result, Err(CodecError::Io(_))));
    }
}
