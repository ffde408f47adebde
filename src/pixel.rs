//! Typed pixel buffers exchanged with codecs.
//!
//! Uses `imgref::ImgVec` for 2D pixel data with typed pixels from the `rgb` crate.

pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::{Rgb, Rgba};

/// A fully materialized, 8-bit pixel buffer.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum PixelData {
    Rgb8(ImgVec<Rgb<u8>>),
    Rgba8(ImgVec<Rgba<u8>>),
    /// One luma byte per pixel.
    Gray8(ImgVec<u8>),
}

impl PixelData {
    pub fn width(&self) -> u32 {
        let w = match self {
            PixelData::Rgb8(img) => img.width(),
            PixelData::Rgba8(img) => img.width(),
            PixelData::Gray8(img) => img.width(),
        };
        w as u32
    }

    pub fn height(&self) -> u32 {
        let h = match self {
            PixelData::Rgb8(img) => img.height(),
            PixelData::Rgba8(img) => img.height(),
            PixelData::Gray8(img) => img.height(),
        };
        h as u32
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, PixelData::Rgba8(_))
    }

    /// Samples per pixel.
    pub fn channels(&self) -> u8 {
        match self {
            PixelData::Rgb8(_) => 3,
            PixelData::Rgba8(_) => 4,
            PixelData::Gray8(_) => 1,
        }
    }

    /// Convert to RGBA8, expanding gray and filling opaque alpha.
    pub fn to_rgba8(&self) -> ImgVec<Rgba<u8>> {
        match self {
            PixelData::Rgba8(img) => img.clone(),
            PixelData::Rgb8(img) => {
                let buf = img
                    .as_ref()
                    .pixels()
                    .map(|p| Rgba::new(p.r, p.g, p.b, 255))
                    .collect();
                ImgVec::new(buf, img.width(), img.height())
            }
            PixelData::Gray8(img) => {
                let buf = img
                    .as_ref()
                    .pixels()
                    .map(|g| Rgba::new(g, g, g, 255))
                    .collect();
                ImgVec::new(buf, img.width(), img.height())
            }
        }
    }

    /// Tightly packed interleaved sample bytes, row by row.
    pub(crate) fn to_contiguous_bytes(&self) -> Vec<u8> {
        match self {
            PixelData::Rgb8(img) => {
                let (buf, _, _) = img.as_ref().to_contiguous_buf();
                bytemuck::cast_slice::<Rgb<u8>, u8>(buf.as_ref()).to_vec()
            }
            PixelData::Rgba8(img) => {
                let (buf, _, _) = img.as_ref().to_contiguous_buf();
                bytemuck::cast_slice::<Rgba<u8>, u8>(buf.as_ref()).to_vec()
            }
            PixelData::Gray8(img) => {
                let (buf, _, _) = img.as_ref().to_contiguous_buf();
                buf.into_owned()
            }
        }
    }

    /// Build from tightly packed interleaved bytes with `channels` samples
    /// per pixel (1, 3 or 4). Returns `None` on a size mismatch.
    pub(crate) fn from_interleaved(
        bytes: &[u8],
        channels: u8,
        width: usize,
        height: usize,
    ) -> Option<Self> {
        if bytes.len() != width.checked_mul(height)?.checked_mul(usize::from(channels))? {
            return None;
        }
        let pixels = match channels {
            1 => PixelData::Gray8(ImgVec::new(bytes.to_vec(), width, height)),
            3 => {
                let rgb: &[Rgb<u8>] = bytemuck::cast_slice(bytes);
                PixelData::Rgb8(ImgVec::new(rgb.to_vec(), width, height))
            }
            4 => {
                let rgba: &[Rgba<u8>] = bytemuck::cast_slice(bytes);
                PixelData::Rgba8(ImgVec::new(rgba.to_vec(), width, height))
            }
            _ => return None,
        };
        Some(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaved_roundtrip() {
        let bytes = [1u8, 2, 3, 4, 5, 6];
        let pixels = PixelData::from_interleaved(&bytes, 3, 2, 1).unwrap();
        assert_eq!(pixels.width(), 2);
        assert_eq!(pixels.height(), 1);
        assert_eq!(pixels.channels(), 3);
        assert_eq!(pixels.to_contiguous_bytes(), bytes);
    }

    #[test]
    fn interleaved_size_mismatch() {
        assert!(PixelData::from_interleaved(&[0u8; 5], 3, 2, 1).is_none());
        assert!(PixelData::from_interleaved(&[0u8; 4], 2, 2, 1).is_none());
    }

    #[test]
    fn gray_to_rgba() {
        let gray = PixelData::Gray8(ImgVec::new(vec![7u8, 9], 2, 1));
        let rgba = gray.to_rgba8();
        assert_eq!(rgba.buf()[1], Rgba::new(9, 9, 9, 255));
        assert!(!gray.has_alpha());
    }
}
