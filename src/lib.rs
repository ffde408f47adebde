//! # zenimaging
//!
//! One entry point for reading and writing images across container formats.
//!
//! Every format owns a parameters type (PNG compression, PNM ASCII output,
//! an XMP packet to embed, ...). Callers hand any codec a parameters value of
//! the *generic* shape: that format's own type, one of its ancestors, or
//! nothing at all. The adapter normalizes it before the format code runs:
//!
//! - nothing → the format's defaults,
//! - the format's own type → used as is (borrowed, not copied),
//! - an ancestor such as [`ImagingParams`] → copied into the format's type,
//! - anything else → [`CodecError::InvalidParams`].
//!
//! Each codec is feature-gated. Enable only what you need:
//!
//! ```toml
//! [dependencies]
//! zenimaging = { version = "0.1", default-features = false, features = ["png"] }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zenimaging::{ByteSource, DecodeRequest, EncodeRequest, ImageFormat, ImagingParams};
//!
//! // Detect and decode
//! let data: &[u8] = &[]; // your image bytes
//! let source = ByteSource::from_bytes(data);
//! let decoded = DecodeRequest::new(&source).decode()?;
//!
//! // Re-encode with parameters every format understands
//! let params = ImagingParams::new().with_file_name("out.png");
//! let png = EncodeRequest::new(ImageFormat::Png)
//!     .with_params(&params)
//!     .encode(&decoded.pixels)?;
//! # Ok::<(), zenimaging::CodecError>(())
//! ```
//!
//! ## Adding a format
//!
//! Implement [`FormatCodec`] with a [`ParamsType`] of your own, then wrap it
//! in [`GenericCodec`] to get an [`ImageCodec`].

#![forbid(unsafe_code)]

mod adapter;
pub mod codecs;
mod decode;
mod encode;
mod error;
mod format;
mod info;
mod limits;
pub mod params;
pub mod pixel;
mod registry;
mod source;

pub use adapter::{FormatCodec, GenericCodec, ImageCodec};
pub use decode::DecodeRequest;
pub use encode::EncodeRequest;
pub use error::{BoxError, CodecError};
pub use format::ImageFormat;
pub use info::{ColorType, DecodeOutput, ImageInfo, ImageMetadata, MetadataItem};
pub use limits::Limits;
pub use params::{
    CodecParams, DensityUnit, ImagingParams, ParamsShape, ParamsType, PixelDensity,
    ShapeRelation, XmpParams,
};
pub use pixel::PixelData;
pub use registry::{CodecRegistry, compiled_codec};
pub use source::ByteSource;

#[cfg(feature = "png")]
pub use codecs::png::{PngCodec, PngParams};
#[cfg(feature = "pnm")]
pub use codecs::pnm::{PnmCodec, PnmParams};
