//! Image encoding.

use std::io::Write;

use crate::params::CodecParams;
use crate::{CodecError, CodecRegistry, ImageFormat, PixelData};

/// Image encode request builder.
///
/// # Example
///
/// ```no_run
/// use zenimaging::{EncodeRequest, ImageFormat, PixelData};
/// use zenimaging::pixel::{ImgVec, Rgb};
///
/// let pixels = PixelData::Rgb8(ImgVec::new(vec![Rgb::new(0u8, 0, 0); 100 * 100], 100, 100));
/// let png = EncodeRequest::new(ImageFormat::Png).encode(&pixels)?;
/// # Ok::<(), zenimaging::CodecError>(())
/// ```
pub struct EncodeRequest<'a> {
    format: ImageFormat,
    params: Option<&'a dyn CodecParams>,
    registry: Option<&'a CodecRegistry>,
}

impl<'a> EncodeRequest<'a> {
    /// Encode to a specific format.
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            params: None,
            registry: None,
        }
    }

    /// Parameters of the target format's type or any of its ancestors.
    pub fn with_params(mut self, params: &'a dyn CodecParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Set a codec registry to control which formats are enabled.
    pub fn with_registry(mut self, registry: &'a CodecRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Encode into `sink`. The sink is flushed and dropped before returning,
    /// also when encoding fails.
    pub fn write<'s, W: Write + 's>(self, image: &PixelData, sink: W) -> Result<(), CodecError> {
        let sink: Box<dyn Write + 's> = Box::new(sink);
        let default_registry = CodecRegistry::all();
        let registry = self.registry.unwrap_or(&default_registry);

        let codec = registry.encoder(self.format)?;
        tracing::debug!(
            format = ?self.format,
            width = image.width(),
            height = image.height(),
            "dispatching write"
        );
        codec.write_image(image, sink, self.params)
    }

    /// Encode into a new buffer.
    pub fn encode(self, image: &PixelData) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.write(image, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{ImgVec, Rgb};

    fn image() -> PixelData {
        PixelData::Rgb8(ImgVec::new(vec![Rgb::new(1u8, 2, 3); 4], 2, 2))
    }

    #[test]
    fn builder_pattern() {
        let request = EncodeRequest::new(ImageFormat::Png);
        assert_eq!(request.format, ImageFormat::Png);
        assert!(request.params.is_none());
    }

    #[test]
    fn unsupported_format() {
        let result = EncodeRequest::new(ImageFormat::Tiff).encode(&image());
        assert!(matches!(result, Err(CodecError::UnsupportedFormat(ImageFormat::Tiff))));
    }

    #[cfg(feature = "pnm")]
    #[test]
    fn disabled_format() {
        let registry = CodecRegistry::all().with_encode(ImageFormat::Pnm, false);
        let result = EncodeRequest::new(ImageFormat::Pnm)
            .with_registry(&registry)
            .encode(&image());
        assert!(matches!(result, Err(CodecError::DisabledFormat(ImageFormat::Pnm))));
    }

    #[cfg(feature = "pnm")]
    #[test]
    fn encode_with_format_params() {
        use crate::codecs::pnm::PnmParams;

        let params = PnmParams::new().with_ascii(true);
        let data = EncodeRequest::new(ImageFormat::Pnm)
            .with_params(&params)
            .encode(&image())
            .unwrap();
        assert!(data.starts_with(b"P3\n"));
    }

    #[cfg(all(feature = "png", feature = "pnm"))]
    #[test]
    fn foreign_params_rejected() {
        use crate::codecs::pnm::PnmParams;

        let params = PnmParams::default();
        let err = EncodeRequest::new(ImageFormat::Png)
            .with_params(&params)
            .encode(&image())
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidParams {
                expected: "PngParams",
                actual: "PnmParams"
            }
        ));
    }
}
