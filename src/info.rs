//! Structural image information and format-native metadata.

use crate::params::PixelDensity;
use crate::{ImageFormat, PixelData};

/// Colour model declared by the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColorType {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
    Indexed,
}

impl ColorType {
    pub fn has_alpha(self) -> bool {
        matches!(self, ColorType::GrayAlpha | ColorType::Rgba)
    }
}

/// Structural image information, read without decoding pixels.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_type: ColorType,
    /// Bits per sample as stored.
    pub bit_depth: u8,
    /// Whether the stored image carries transparency (including tRNS-style keys).
    pub has_alpha: bool,
    pub has_icc_profile: bool,
    pub pixel_density: Option<PixelDensity>,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32, format: ImageFormat, color_type: ColorType) -> Self {
        Self {
            width,
            height,
            format,
            color_type,
            bit_depth: 8,
            has_alpha: color_type.has_alpha(),
            has_icc_profile: false,
            pixel_density: None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// One textual metadata entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataItem {
    pub keyword: String,
    pub text: String,
}

/// Format-native metadata, flattened to ordered keyword/text pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageMetadata {
    pub format: ImageFormat,
    pub items: Vec<MetadataItem>,
}

impl ImageMetadata {
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, keyword: impl Into<String>, text: impl Into<String>) {
        self.items.push(MetadataItem {
            keyword: keyword.into(),
            text: text.into(),
        });
    }

    /// First entry with this keyword.
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.keyword == keyword)
            .map(|item| item.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Decoded image output.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    /// Decoded pixel data in a typed buffer.
    pub pixels: PixelData,
    /// Image metadata.
    pub info: ImageInfo,
}

impl DecodeOutput {
    /// Image width in pixels (convenience accessor).
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Image height in pixels (convenience accessor).
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_lookup_returns_first() {
        let mut meta = ImageMetadata::new(ImageFormat::Png);
        assert!(meta.is_empty());
        meta.push("Title", "one");
        meta.push("Title", "two");
        assert_eq!(meta.get("Title"), Some("one"));
        assert_eq!(meta.get("Author"), None);
    }

    #[test]
    fn info_alpha_follows_color_type() {
        let info = ImageInfo::new(1, 1, ImageFormat::Png, ColorType::GrayAlpha);
        assert!(info.has_alpha);
        assert_eq!(info.mime_type(), "image/png");
    }
}
