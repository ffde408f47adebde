//! Format codecs.
//!
//! Each module provides one [`FormatCodec`](crate::FormatCodec) together
//! with the parameters type it is bound to.

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "pnm")]
pub mod pnm;
