//! Resource limits for decode operations.

use crate::CodecError;

/// Resource limits for decode operations.
///
/// Carried by every parameters value through [`ImagingParams`](crate::ImagingParams),
/// so they survive normalization into any format's own params type.
/// All limits are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum size of the decoded pixel buffer in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if dimensions are within limits.
    ///
    /// Returns `Err` with a description if any limit is exceeded.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), &'static str> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err("width exceeds limit");
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err("height exceeds limit");
            }
        }

        if let Some(max_pixels) = self.max_pixels {
            let pixels = width.saturating_mul(height);
            if pixels > max_pixels {
                return Err("pixel count exceeds limit");
            }
        }

        Ok(())
    }

    /// Check if a memory allocation is within limits.
    pub fn check_memory(&self, bytes: u64) -> Result<(), &'static str> {
        if let Some(max_memory) = self.max_memory_bytes {
            if bytes > max_memory {
                return Err("memory allocation exceeds limit");
            }
        }
        Ok(())
    }

    /// Same as [`check_dimensions`](Self::check_dimensions), mapped to a codec error.
    pub(crate) fn enforce(&self, width: u32, height: u32) -> Result<(), CodecError> {
        self.check_dimensions(u64::from(width), u64::from(height))
            .map_err(|msg| CodecError::LimitExceeded(format!("{msg} ({width}x{height})")))
    }

    /// Same as [`check_memory`](Self::check_memory), mapped to a codec error.
    pub(crate) fn enforce_memory(&self, bytes: u64) -> Result<(), CodecError> {
        self.check_memory(bytes)
            .map_err(|msg| CodecError::LimitExceeded(format!("{msg} ({bytes} bytes)")))
    }
}
