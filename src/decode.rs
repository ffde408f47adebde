//! Read-side requests: metadata, info, pixels, ICC profile, XMP.

use crate::adapter::ImageCodec;
use crate::params::CodecParams;
use crate::{
    ByteSource, CodecError, CodecRegistry, DecodeOutput, ImageFormat, ImageInfo, ImageMetadata,
};

/// Image read request builder.
///
/// # Example
///
/// ```no_run
/// use zenimaging::{ByteSource, DecodeRequest, ImagingParams};
///
/// let data: &[u8] = &[]; // your image bytes
/// let source = ByteSource::from_bytes(data);
/// let params = ImagingParams::new().with_strict(true);
/// let output = DecodeRequest::new(&source).with_params(&params).decode()?;
/// println!("{}x{}", output.width(), output.height());
/// # Ok::<(), zenimaging::CodecError>(())
/// ```
pub struct DecodeRequest<'a> {
    source: &'a ByteSource<'a>,
    format: Option<ImageFormat>,
    params: Option<&'a dyn CodecParams>,
    registry: Option<&'a CodecRegistry>,
}

impl<'a> DecodeRequest<'a> {
    /// Create a new read request.
    ///
    /// Format will be auto-detected from magic bytes.
    pub fn new(source: &'a ByteSource<'a>) -> Self {
        Self {
            source,
            format: None,
            params: None,
            registry: None,
        }
    }

    /// Override format auto-detection.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
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

    /// Read format-native metadata.
    pub fn metadata(self) -> Result<ImageMetadata, CodecError> {
        let codec = self.codec()?;
        codec.read_metadata(self.source, self.params)
    }

    /// Read structural information without decoding pixels.
    pub fn info(self) -> Result<ImageInfo, CodecError> {
        let codec = self.codec()?;
        codec.read_info(self.source, self.params)
    }

    /// Decode the image to pixels.
    pub fn decode(self) -> Result<DecodeOutput, CodecError> {
        let codec = self.codec()?;
        codec.decode(self.source, self.params)
    }

    /// Extract the embedded ICC profile, if any.
    pub fn icc_profile(self) -> Result<Option<Vec<u8>>, CodecError> {
        let codec = self.codec()?;
        codec.icc_profile(self.source, self.params)
    }

    /// Extract the embedded XMP packet, if any.
    pub fn xmp(self) -> Result<Option<String>, CodecError> {
        let codec = self.codec()?;
        codec.read_xmp(self.source, self.params)
    }

    /// Resolve the format and look up its codec.
    fn codec(&self) -> Result<&'static dyn ImageCodec, CodecError> {
        let default_registry = CodecRegistry::all();
        let registry = self.registry.unwrap_or(&default_registry);

        let format = match self.format {
            Some(f) => f,
            None => ImageFormat::detect(self.source.bytes()).ok_or(CodecError::UnrecognizedFormat)?,
        };
        let codec = registry.decoder(format)?;
        tracing::debug!(
            ?format,
            source = self.source.name().unwrap_or("<memory>"),
            "dispatching read"
        );
        Ok(codec)
    }
}
