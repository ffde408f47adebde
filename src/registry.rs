//! Runtime codec registry for enabling/disabling formats.

use crate::adapter::{GenericCodec, ImageCodec};
use crate::{CodecError, ImageFormat};

#[cfg(feature = "png")]
static PNG: GenericCodec<crate::codecs::png::PngCodec> =
    GenericCodec::new(crate::codecs::png::PngCodec);

#[cfg(feature = "pnm")]
static PNM: GenericCodec<crate::codecs::pnm::PnmCodec> =
    GenericCodec::new(crate::codecs::pnm::PnmCodec);

/// The compiled-in codec for `format`, if any.
pub fn compiled_codec(format: ImageFormat) -> Option<&'static dyn ImageCodec> {
    match format {
        #[cfg(feature = "png")]
        ImageFormat::Png => Some(&PNG as &dyn ImageCodec),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => Some(&PNM as &dyn ImageCodec),
        _ => None,
    }
}

/// Set of image formats represented as bitflags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FormatSet(u8);

impl FormatSet {
    const EMPTY: Self = FormatSet(0);

    const ALL_FORMATS: [ImageFormat; 4] = [
        ImageFormat::Png,
        ImageFormat::Pnm,
        ImageFormat::Tiff,
        ImageFormat::Psd,
    ];

    fn bit(format: ImageFormat) -> u8 {
        match format {
            ImageFormat::Png => 1 << 0,
            ImageFormat::Pnm => 1 << 1,
            ImageFormat::Tiff => 1 << 2,
            ImageFormat::Psd => 1 << 3,
        }
    }

    fn all_compiled() -> Self {
        let mut set = Self::EMPTY;
        for format in Self::ALL_FORMATS {
            if compiled_codec(format).is_some() {
                set.insert(format);
            }
        }
        set
    }

    fn contains(self, format: ImageFormat) -> bool {
        (self.0 & Self::bit(format)) != 0
    }

    fn insert(&mut self, format: ImageFormat) {
        self.0 |= Self::bit(format);
    }

    fn remove(&mut self, format: ImageFormat) {
        self.0 &= !Self::bit(format);
    }

    fn iter(self) -> impl Iterator<Item = ImageFormat> {
        Self::ALL_FORMATS
            .into_iter()
            .filter(move |&f| self.contains(f))
    }
}

/// Runtime codec registry.
///
/// Controls which codecs are enabled for a given operation. Compile-time features
/// determine which codecs are *available*, while the registry controls which are
/// *enabled* at runtime.
#[derive(Clone, Debug)]
pub struct CodecRegistry {
    decode_enabled: FormatSet,
    encode_enabled: FormatSet,
}

impl CodecRegistry {
    /// All compiled-in codecs enabled.
    pub fn all() -> Self {
        Self {
            decode_enabled: FormatSet::all_compiled(),
            encode_enabled: FormatSet::all_compiled(),
        }
    }

    /// Nothing enabled; the caller must opt in.
    pub fn none() -> Self {
        Self {
            decode_enabled: FormatSet::EMPTY,
            encode_enabled: FormatSet::EMPTY,
        }
    }

    /// Enable or disable decoding for a format.
    pub fn with_decode(mut self, format: ImageFormat, enabled: bool) -> Self {
        if enabled {
            self.decode_enabled.insert(format);
        } else {
            self.decode_enabled.remove(format);
        }
        self
    }

    /// Enable or disable encoding for a format.
    pub fn with_encode(mut self, format: ImageFormat, enabled: bool) -> Self {
        if enabled {
            self.encode_enabled.insert(format);
        } else {
            self.encode_enabled.remove(format);
        }
        self
    }

    /// Is this format available (compiled in) AND enabled for decoding?
    pub fn can_decode(&self, format: ImageFormat) -> bool {
        self.decode_enabled.contains(format) && compiled_codec(format).is_some()
    }

    /// Is this format available (compiled in) AND enabled for encoding?
    pub fn can_encode(&self, format: ImageFormat) -> bool {
        self.encode_enabled.contains(format) && compiled_codec(format).is_some()
    }

    /// Formats that are both compiled in and enabled for decoding.
    pub fn decodable_formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        self.decode_enabled.iter().filter(|&f| self.can_decode(f))
    }

    /// Formats that are both compiled in and enabled for encoding.
    pub fn encodable_formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        self.encode_enabled.iter().filter(|&f| self.can_encode(f))
    }

    /// Codec to use for reading `format`.
    pub fn decoder(&self, format: ImageFormat) -> Result<&'static dyn ImageCodec, CodecError> {
        let codec = compiled_codec(format).ok_or(CodecError::UnsupportedFormat(format))?;
        if !self.decode_enabled.contains(format) {
            return Err(CodecError::DisabledFormat(format));
        }
        Ok(codec)
    }

    /// Codec to use for writing `format`.
    pub fn encoder(&self, format: ImageFormat) -> Result<&'static dyn ImageCodec, CodecError> {
        let codec = compiled_codec(format).ok_or(CodecError::UnsupportedFormat(format))?;
        if !self.encode_enabled.contains(format) {
            return Err(CodecError::DisabledFormat(format));
        }
        Ok(codec)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::all()
    }
}
