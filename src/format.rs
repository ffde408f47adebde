//! Image format detection and metadata.

/// Image formats known to the dispatch layer.
///
/// Recognizing a format does not imply a codec for it is compiled in;
/// see [`CodecRegistry`](crate::CodecRegistry).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    /// Netpbm family (PGM/PPM, ASCII and raw).
    Pnm,
    Tiff,
    Psd,
}

impl ImageFormat {
    /// Detect format from magic bytes. Returns None if unrecognized.
    ///
    /// Checks the first few bytes of the data for known format signatures.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(ImageFormat::Png);
        }

        // TIFF: "II*\0" (little endian) or "MM\0*" (big endian)
        if data.len() >= 4 && (data[..4] == *b"II*\0" || data[..4] == *b"MM\0*") {
            return Some(ImageFormat::Tiff);
        }

        // PSD: "8BPS"
        if data.len() >= 4 && data[..4] == *b"8BPS" {
            return Some(ImageFormat::Psd);
        }

        // PNM: "P1".."P6" followed by whitespace
        if data.len() >= 3
            && data[0] == b'P'
            && (b'1'..=b'6').contains(&data[1])
            && data[2].is_ascii_whitespace()
        {
            return Some(ImageFormat::Pnm);
        }

        None
    }

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "pnm" | "pbm" | "pgm" | "ppm" => Some(ImageFormat::Pnm),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "psd" => Some(ImageFormat::Psd),
            _ => None,
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Pnm => "image/x-portable-anymap",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Psd => "image/vnd.adobe.photoshop",
        }
    }

    /// Common file extensions.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Png => &["png"],
            ImageFormat::Pnm => &["pnm", "pbm", "pgm", "ppm"],
            ImageFormat::Tiff => &["tif", "tiff"],
            ImageFormat::Psd => &["psd"],
        }
    }

    /// Whether this format supports alpha channel.
    pub fn supports_alpha(self) -> bool {
        match self {
            ImageFormat::Png => true,
            ImageFormat::Pnm => false,
            ImageFormat::Tiff => true,
            ImageFormat::Psd => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_png() {
        let data = [
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
        ];
        assert_eq!(ImageFormat::detect(&data), Some(ImageFormat::Png));
    }

    #[test]
    fn detect_pnm() {
        assert_eq!(ImageFormat::detect(b"P6\n2 2\n255\n"), Some(ImageFormat::Pnm));
        assert_eq!(ImageFormat::detect(b"P2 1 1 255 0"), Some(ImageFormat::Pnm));
        assert_eq!(ImageFormat::detect(b"P7\n"), None);
        assert_eq!(ImageFormat::detect(b"P6x"), None);
    }

    #[test]
    fn detect_tiff_and_psd() {
        assert_eq!(ImageFormat::detect(b"II*\0\x08\0\0\0"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::detect(b"MM\0*\0\0\0\x08"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::detect(b"8BPS\0\x01"), Some(ImageFormat::Psd));
    }

    #[test]
    fn detect_too_short() {
        let data = [0x89, 0x50];
        assert_eq!(ImageFormat::detect(&data), None);
    }

    #[test]
    fn from_extension_case_insensitive() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("Ppm"), Some(ImageFormat::Pnm));
        assert_eq!(ImageFormat::from_extension("unknown"), None);
    }

    #[test]
    fn extensions_round_trip() {
        for format in [
            ImageFormat::Png,
            ImageFormat::Pnm,
            ImageFormat::Tiff,
            ImageFormat::Psd,
        ] {
            for ext in format.extensions() {
                assert_eq!(ImageFormat::from_extension(ext), Some(format));
            }
        }
    }
}
