//! Generic codec adapter.
//!
//! [`FormatCodec`] is what a format implements: every operation takes that
//! format's own parameters type. [`GenericCodec`] wraps a format codec and
//! exposes it as an [`ImageCodec`], which accepts parameters of the generic
//! shape (or none) and normalizes them before delegating.

use std::borrow::Cow;
use std::io::Write;

use crate::params::{CodecParams, ParamsShape, ParamsType, ShapeRelation};
use crate::{
    ByteSource, CodecError, DecodeOutput, ImageFormat, ImageInfo, ImageMetadata, PixelData,
};

/// Operations a format must provide, typed on its own parameters.
///
/// Implementations report structural problems as [`CodecError::Read`] or
/// [`CodecError::Write`] and transport problems as [`CodecError::Io`].
/// `encode` does not need to flush or release the sink.
pub trait FormatCodec: Send + Sync {
    type Params: ParamsType;

    fn format(&self) -> ImageFormat;

    /// Parameters used when the caller supplies none.
    fn default_params(&self) -> Self::Params {
        Self::Params::default()
    }

    /// Parameters built from a strictly more general value.
    fn copy_params(&self, params: &dyn CodecParams) -> Self::Params {
        Self::Params::copy_from(params)
    }

    fn read_metadata(
        &self,
        source: &ByteSource<'_>,
        params: &Self::Params,
    ) -> Result<ImageMetadata, CodecError>;

    fn read_info(
        &self,
        source: &ByteSource<'_>,
        params: &Self::Params,
    ) -> Result<ImageInfo, CodecError>;

    fn decode(
        &self,
        source: &ByteSource<'_>,
        params: &Self::Params,
    ) -> Result<DecodeOutput, CodecError>;

    /// Raw embedded ICC profile, `None` if the image has none.
    fn icc_profile(
        &self,
        source: &ByteSource<'_>,
        params: &Self::Params,
    ) -> Result<Option<Vec<u8>>, CodecError>;

    /// Embedded XMP packet. Formats without XMP support keep the default.
    fn read_xmp(
        &self,
        _source: &ByteSource<'_>,
        _params: &Self::Params,
    ) -> Result<Option<String>, CodecError> {
        Ok(None)
    }

    fn encode(
        &self,
        image: &PixelData,
        sink: &mut dyn Write,
        params: &Self::Params,
    ) -> Result<(), CodecError>;
}

/// Caller-facing codec surface, independent of the concrete params type.
///
/// Every operation normalizes `params` once and then makes exactly one call
/// into the format codec. Normalization failures surface as
/// [`CodecError::InvalidParams`] before the format codec runs.
pub trait ImageCodec: Send + Sync {
    fn format(&self) -> ImageFormat;

    /// Shape of the parameters type this codec is bound to.
    fn params_shape(&self) -> &'static ParamsShape;

    /// A fresh default value of the bound parameters type.
    fn default_params(&self) -> Box<dyn CodecParams>;

    fn read_metadata(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<ImageMetadata, CodecError>;

    fn read_info(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<ImageInfo, CodecError>;

    fn decode(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<DecodeOutput, CodecError>;

    fn icc_profile(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<Option<Vec<u8>>, CodecError>;

    fn read_xmp(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<Option<String>, CodecError>;

    /// Encode `image` into `sink`.
    ///
    /// The sink is flushed on success and dropped exactly once before this
    /// returns, whatever the outcome. Pass `Box::new(&mut vec)` to keep the
    /// bytes.
    fn write_image<'s>(
        &self,
        image: &PixelData,
        sink: Box<dyn Write + 's>,
        params: Option<&dyn CodecParams>,
    ) -> Result<(), CodecError>;
}

/// Adapter binding a [`FormatCodec`] to the generic [`ImageCodec`] surface.
///
/// Holds no state besides the codec itself, so it is safe to share between
/// threads whenever the codec is.
#[derive(Clone, Debug, Default)]
pub struct GenericCodec<C> {
    codec: C,
}

impl<C> GenericCodec<C> {
    pub const fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<C: FormatCodec> GenericCodec<C> {
    /// Resolve caller parameters into the bound parameters type.
    ///
    /// - `None` yields the codec's default parameters.
    /// - A value of exactly the bound type is passed through borrowed, not
    ///   cloned: the codec sees the caller's own object.
    /// - A value of an ancestor type is copied into a new bound-type value.
    /// - Anything else is rejected with [`CodecError::InvalidParams`].
    pub fn normalize<'p>(
        &self,
        params: Option<&'p dyn CodecParams>,
    ) -> Result<Cow<'p, C::Params>, CodecError> {
        let expected = C::Params::SHAPE;
        let Some(params) = params else {
            tracing::trace!(params = expected.name(), "no params supplied, using defaults");
            return Ok(Cow::Owned(self.codec.default_params()));
        };

        let actual = params.shape();
        let invalid = || CodecError::InvalidParams {
            expected: expected.name(),
            actual: actual.name(),
        };

        match actual.relation_to(expected) {
            ShapeRelation::Exact => params
                .as_any()
                .downcast_ref::<C::Params>()
                .map(Cow::Borrowed)
                .ok_or_else(invalid),
            ShapeRelation::Ancestor => {
                tracing::trace!(
                    from = actual.name(),
                    to = expected.name(),
                    "copying params from ancestor"
                );
                Ok(Cow::Owned(self.codec.copy_params(params)))
            }
            ShapeRelation::Incompatible => Err(invalid()),
        }
    }
}

impl<C: FormatCodec> ImageCodec for GenericCodec<C> {
    fn format(&self) -> ImageFormat {
        self.codec.format()
    }

    fn params_shape(&self) -> &'static ParamsShape {
        C::Params::SHAPE
    }

    fn default_params(&self) -> Box<dyn CodecParams> {
        Box::new(self.codec.default_params())
    }

    fn read_metadata(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<ImageMetadata, CodecError> {
        let params = self.normalize(params)?;
        self.codec.read_metadata(source, &params)
    }

    fn read_info(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<ImageInfo, CodecError> {
        let params = self.normalize(params)?;
        self.codec.read_info(source, &params)
    }

    fn decode(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<DecodeOutput, CodecError> {
        let params = self.normalize(params)?;
        self.codec.decode(source, &params)
    }

    fn icc_profile(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<Option<Vec<u8>>, CodecError> {
        let params = self.normalize(params)?;
        self.codec.icc_profile(source, &params)
    }

    fn read_xmp(
        &self,
        source: &ByteSource<'_>,
        params: Option<&dyn CodecParams>,
    ) -> Result<Option<String>, CodecError> {
        let params = self.normalize(params)?;
        self.codec.read_xmp(source, &params)
    }

    fn write_image<'s>(
        &self,
        image: &PixelData,
        mut sink: Box<dyn Write + 's>,
        params: Option<&dyn CodecParams>,
    ) -> Result<(), CodecError> {
        // `sink` is owned here and dropped on every return path below.
        let params = self.normalize(params)?;
        self.codec.encode(image, sink.as_mut(), &params)?;
        sink.flush()?;
        Ok(())
    }
}
