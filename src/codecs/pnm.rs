//! Netpbm codec for 8-bit PGM and PPM, ASCII and raw.
//!
//! PBM bitmaps (P1/P4) are recognized but rejected, as are samples wider
//! than 8 bits. Header comments are surfaced as metadata.

use std::any::Any;
use std::io::Write;

use crate::adapter::FormatCodec;
use crate::info::ColorType;
use crate::params::{CodecParams, IMAGING_PARAMS, ImagingParams, ParamsShape, ParamsType};
use crate::{
    ByteSource, CodecError, DecodeOutput, ImageFormat, ImageInfo, ImageMetadata, PixelData,
};

/// Shape tag of [`PnmParams`].
pub const PNM_PARAMS: ParamsShape = ParamsShape::derived("PnmParams", &IMAGING_PARAMS);

/// Samples per line in ASCII output, keeping lines under 70 characters.
const ASCII_SAMPLES_PER_LINE: usize = 17;

/// PNM parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PnmParams {
    pub common: ImagingParams,
    /// Write plain (ASCII) rather than raw samples.
    pub ascii: bool,
    /// Comment written into the header, one `#` line per text line.
    pub comment: Option<String>,
}

impl PnmParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_common(mut self, common: ImagingParams) -> Self {
        self.common = common;
        self
    }
}

impl CodecParams for PnmParams {
    fn shape(&self) -> &'static ParamsShape {
        Self::SHAPE
    }

    fn common(&self) -> &ImagingParams {
        &self.common
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ParamsType for PnmParams {
    const SHAPE: &'static ParamsShape = &PNM_PARAMS;

    fn copy_from(other: &dyn CodecParams) -> Self {
        if let Some(pnm) = other.as_any().downcast_ref::<Self>() {
            return pnm.clone();
        }
        Self {
            common: other.common().clone(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    Ascii,
    Raw,
}

#[derive(Debug)]
struct Header {
    encoding: Encoding,
    channels: u8,
    width: u32,
    height: u32,
    maxval: u32,
    comments: Vec<String>,
    /// Offset of the first raster byte.
    data_offset: usize,
}

impl Header {
    fn color_type(&self) -> ColorType {
        if self.channels == 1 {
            ColorType::Gray
        } else {
            ColorType::Rgb
        }
    }

    fn info(&self) -> ImageInfo {
        let mut info = ImageInfo::new(self.width, self.height, ImageFormat::Pnm, self.color_type());
        info.bit_depth = (u32::BITS - self.maxval.leading_zeros()) as u8;
        info
    }

    fn sample_count(&self) -> Result<usize, CodecError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(usize::from(self.channels)))
            .ok_or_else(|| malformed("image dimensions overflow"))
    }
}

fn malformed(detail: impl Into<String>) -> CodecError {
    CodecError::malformed(ImageFormat::Pnm, detail)
}

/// Whitespace/comment-aware token reader over the raw bytes.
struct Tokens<'a> {
    data: &'a [u8],
    pos: usize,
    comments: Vec<String>,
}

impl<'a> Tokens<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos,
            comments: Vec::new(),
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&byte) = self.data.get(self.pos) {
            if byte.is_ascii_whitespace() {
                self.pos += 1;
            } else if byte == b'#' {
                let start = self.pos + 1;
                let end = self.data[start..]
                    .iter()
                    .position(|&b| b == b'\n' || b == b'\r')
                    .map_or(self.data.len(), |n| start + n);
                let text = String::from_utf8_lossy(&self.data[start..end]);
                self.comments.push(text.trim().to_owned());
                self.pos = end;
            } else {
                break;
            }
        }
    }

    fn number(&mut self, what: &str) -> Result<u32, CodecError> {
        self.skip_separators();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(malformed(format!("expected {what}")));
        }
        core::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| malformed(format!("{what} out of range")))
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.data.len()
    }
}

fn parse_header(data: &[u8]) -> Result<Header, CodecError> {
    let (encoding, channels) = match data {
        [b'P', b'2', ..] => (Encoding::Ascii, 1),
        [b'P', b'3', ..] => (Encoding::Ascii, 3),
        [b'P', b'5', ..] => (Encoding::Raw, 1),
        [b'P', b'6', ..] => (Encoding::Raw, 3),
        [b'P', b'1' | b'4', ..] => return Err(malformed("PBM bitmaps are not supported")),
        _ => return Err(malformed("missing P2/P3/P5/P6 magic")),
    };

    let mut tokens = Tokens::new(data, 2);
    let width = tokens.number("width")?;
    let height = tokens.number("height")?;
    let maxval = tokens.number("maxval")?;

    if width == 0 || height == 0 {
        return Err(malformed(format!("zero dimension ({width}x{height})")));
    }
    match maxval {
        0 => return Err(malformed("maxval must be positive")),
        1..=255 => {}
        _ => return Err(malformed(format!("maxval {maxval} needs 16-bit samples"))),
    }

    // Exactly one whitespace byte separates the header from the raster.
    match data.get(tokens.pos) {
        Some(b) if b.is_ascii_whitespace() => tokens.pos += 1,
        Some(_) => return Err(malformed("garbage after maxval")),
        None if encoding == Encoding::Raw => return Err(malformed("missing raster")),
        None => {}
    }

    Ok(Header {
        encoding,
        channels,
        width,
        height,
        maxval,
        comments: tokens.comments,
        data_offset: tokens.pos,
    })
}

fn scale(sample: u32, maxval: u32) -> u8 {
    if maxval == 255 {
        sample as u8
    } else {
        ((sample * 255 + maxval / 2) / maxval) as u8
    }
}

fn read_raster(data: &[u8], header: &Header, strict: bool) -> Result<Vec<u8>, CodecError> {
    let count = header.sample_count()?;
    let raster = data.get(header.data_offset..).unwrap_or_default();

    match header.encoding {
        Encoding::Raw => {
            if raster.len() < count {
                return Err(malformed(format!(
                    "truncated raster: {} of {count} bytes",
                    raster.len()
                )));
            }
            if strict && raster.len() > count {
                return Err(malformed("trailing data after raster"));
            }
            raster[..count]
                .iter()
                .map(|&sample| {
                    if u32::from(sample) > header.maxval {
                        return Err(malformed("sample exceeds maxval"));
                    }
                    Ok(scale(u32::from(sample), header.maxval))
                })
                .collect()
        }
        Encoding::Ascii => {
            // Every sample takes at least one byte of input.
            let mut samples = Vec::with_capacity(count.min(raster.len()));
            let mut tokens = Tokens::new(data, header.data_offset);
            for _ in 0..count {
                let sample = tokens.number("sample")?;
                if sample > header.maxval {
                    return Err(malformed("sample exceeds maxval"));
                }
                samples.push(scale(sample, header.maxval));
            }
            if strict && !tokens.at_end() {
                return Err(malformed("trailing data after raster"));
            }
            Ok(samples)
        }
    }
}

/// PNM format codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct PnmCodec;

impl PnmCodec {
    fn write_header(
        sink: &mut dyn Write,
        magic: &str,
        image: &PixelData,
        params: &PnmParams,
    ) -> std::io::Result<()> {
        writeln!(sink, "{magic}")?;
        if let Some(comment) = &params.comment {
            // The reader ends a comment at either line terminator.
            for line in comment.lines().flat_map(|line| line.split('\r')) {
                writeln!(sink, "# {line}")?;
            }
        }
        writeln!(sink, "{} {}", image.width(), image.height())?;
        writeln!(sink, "255")
    }
}

impl FormatCodec for PnmCodec {
    type Params = PnmParams;

    fn format(&self) -> ImageFormat {
        ImageFormat::Pnm
    }

    fn read_metadata(
        &self,
        source: &ByteSource<'_>,
        _params: &PnmParams,
    ) -> Result<ImageMetadata, CodecError> {
        let header = parse_header(source.bytes())?;
        let mut meta = ImageMetadata::new(ImageFormat::Pnm);
        for comment in header.comments {
            meta.push("comment", comment);
        }
        Ok(meta)
    }

    fn read_info(
        &self,
        source: &ByteSource<'_>,
        _params: &PnmParams,
    ) -> Result<ImageInfo, CodecError> {
        Ok(parse_header(source.bytes())?.info())
    }

    fn decode(
        &self,
        source: &ByteSource<'_>,
        params: &PnmParams,
    ) -> Result<DecodeOutput, CodecError> {
        let header = parse_header(source.bytes())?;
        params.common.limits.enforce(header.width, header.height)?;
        params.common.limits.enforce_memory(header.sample_count()? as u64)?;

        let samples = read_raster(source.bytes(), &header, params.common.strict)?;
        let pixels = PixelData::from_interleaved(
            &samples,
            header.channels,
            header.width as usize,
            header.height as usize,
        )
        .ok_or_else(|| malformed("decoded size mismatch"))?;

        Ok(DecodeOutput {
            pixels,
            info: header.info(),
        })
    }

    fn icc_profile(
        &self,
        source: &ByteSource<'_>,
        _params: &PnmParams,
    ) -> Result<Option<Vec<u8>>, CodecError> {
        // Validate the source even though PNM never embeds a profile.
        parse_header(source.bytes())?;
        Ok(None)
    }

    fn encode(
        &self,
        image: &PixelData,
        sink: &mut dyn Write,
        params: &PnmParams,
    ) -> Result<(), CodecError> {
        let magic = match (image, params.ascii) {
            (PixelData::Gray8(_), true) => "P2",
            (PixelData::Gray8(_), false) => "P5",
            (PixelData::Rgb8(_), true) => "P3",
            (PixelData::Rgb8(_), false) => "P6",
            (PixelData::Rgba8(_), _) => {
                return Err(CodecError::write(
                    ImageFormat::Pnm,
                    "PNM cannot store an alpha channel",
                ));
            }
        };

        let bytes = image.to_contiguous_bytes();
        Self::write_header(sink, magic, image, params)?;

        if params.ascii {
            let row_len = image.width() as usize * usize::from(image.channels());
            for row in bytes.chunks(row_len) {
                for line in row.chunks(ASCII_SAMPLES_PER_LINE) {
                    let text: Vec<String> = line.iter().map(u8::to_string).collect();
                    writeln!(sink, "{}", text.join(" "))?;
                }
            }
        } else {
            sink.write_all(&bytes)?;
        }
        Ok(())
    }
}
