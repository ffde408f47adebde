//! PNG codec using the png crate.

use std::any::Any;
use std::io::{Cursor, Write};

use crate::adapter::FormatCodec;
use crate::info::ColorType;
use crate::params::{
    CodecParams, DensityUnit, ImagingParams, ParamsShape, ParamsType, PixelDensity, XMP_PARAMS,
    XmpParams,
};
use crate::{
    ByteSource, CodecError, DecodeOutput, ImageFormat, ImageInfo, ImageMetadata, PixelData,
};

/// iTXt keyword under which XMP packets are stored.
pub const XMP_KEYWORD: &str = "XML:com.adobe.xmp";

/// Shape tag of [`PngParams`].
pub const PNG_PARAMS: ParamsShape = ParamsShape::derived("PngParams", &XMP_PARAMS);

/// PNG parameters.
///
/// PNG is lossless: compression and filter only trade speed for size.
#[derive(Clone, Debug)]
pub struct PngParams {
    pub xmp: XmpParams,
    pub compression: png::Compression,
    pub filter: png::Filter,
    /// Uncompressed tEXt chunks written before the image data.
    pub text_chunks: Vec<(String, String)>,
}

impl PngParams {
    /// Create a default PNG params value.
    #[must_use]
    pub fn new() -> Self {
        Self {
            xmp: XmpParams::default(),
            compression: png::Compression::default(),
            filter: png::Filter::default(),
            text_chunks: Vec::new(),
        }
    }

    /// Set PNG compression level directly.
    #[must_use]
    pub fn with_compression(mut self, compression: png::Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set PNG row filter type directly.
    #[must_use]
    pub fn with_filter(mut self, filter: png::Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_text_chunk(mut self, keyword: impl Into<String>, text: impl Into<String>) -> Self {
        self.text_chunks.push((keyword.into(), text.into()));
        self
    }

    #[must_use]
    pub fn with_xmp_xml(mut self, xmp_xml: impl Into<String>) -> Self {
        self.xmp.xmp_xml = Some(xmp_xml.into());
        self
    }

    #[must_use]
    pub fn with_common(mut self, common: ImagingParams) -> Self {
        self.xmp.common = common;
        self
    }
}

impl Default for PngParams {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecParams for PngParams {
    fn shape(&self) -> &'static ParamsShape {
        Self::SHAPE
    }

    fn common(&self) -> &ImagingParams {
        &self.xmp.common
    }

    fn xmp_xml(&self) -> Option<&str> {
        self.xmp.xmp_xml.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ParamsType for PngParams {
    const SHAPE: &'static ParamsShape = &PNG_PARAMS;

    fn copy_from(other: &dyn CodecParams) -> Self {
        if let Some(png) = other.as_any().downcast_ref::<Self>() {
            return png.clone();
        }
        Self {
            xmp: XmpParams::copy_from(other),
            ..Self::default()
        }
    }
}

/// Upper bound on decoded bytes per input byte: DEFLATE inflates at most
/// 1032:1, and expanding 1-bit palette samples to RGBA multiplies by 32.
const MAX_OUTPUT_PER_INPUT_BYTE: usize = 1032 * 32;

/// PNG format codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

fn read_err(e: png::DecodingError) -> CodecError {
    match e {
        png::DecodingError::IoError(io) => CodecError::Io(io),
        other => CodecError::read(ImageFormat::Png, other),
    }
}

fn write_err(e: png::EncodingError) -> CodecError {
    match e {
        png::EncodingError::IoError(io) => CodecError::Io(io),
        other => CodecError::write(ImageFormat::Png, other),
    }
}

fn color_type(color: png::ColorType) -> ColorType {
    match color {
        png::ColorType::Grayscale => ColorType::Gray,
        png::ColorType::GrayscaleAlpha => ColorType::GrayAlpha,
        png::ColorType::Rgb => ColorType::Rgb,
        png::ColorType::Rgba => ColorType::Rgba,
        png::ColorType::Indexed => ColorType::Indexed,
    }
}

fn density(dims: &png::PixelDimensions) -> PixelDensity {
    let unit = match dims.unit {
        png::Unit::Meter => DensityUnit::PerMeter,
        png::Unit::Unspecified => DensityUnit::Unitless,
    };
    PixelDensity {
        horizontal: f64::from(dims.xppu),
        vertical: f64::from(dims.yppu),
        unit,
    }
}

fn pixel_dims(density: &PixelDensity) -> png::PixelDimensions {
    match density.per_meter() {
        Some((h, v)) => png::PixelDimensions {
            xppu: h.round() as u32,
            yppu: v.round() as u32,
            unit: png::Unit::Meter,
        },
        None => png::PixelDimensions {
            xppu: density.horizontal.round() as u32,
            yppu: density.vertical.round() as u32,
            unit: png::Unit::Unspecified,
        },
    }
}

impl PngCodec {
    /// Parse the header chunks up to the first IDAT.
    fn reader<'a>(
        &self,
        source: &'a ByteSource<'_>,
    ) -> Result<png::Reader<Cursor<&'a [u8]>>, CodecError> {
        let mut decoder = png::Decoder::new(Cursor::new(source.bytes()));
        decoder.set_ignore_text_chunk(false);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        decoder.read_info().map_err(read_err)
    }

    fn info_of(info: &png::Info<'_>) -> ImageInfo {
        let mut image_info = ImageInfo::new(
            info.width,
            info.height,
            ImageFormat::Png,
            color_type(info.color_type),
        );
        image_info.bit_depth = info.bit_depth as u8;
        image_info.has_alpha = image_info.color_type.has_alpha() || info.trns.is_some();
        image_info.has_icc_profile = info.icc_profile.is_some();
        image_info.pixel_density = info.pixel_dims.as_ref().map(density);
        image_info
    }
}

impl FormatCodec for PngCodec {
    type Params = PngParams;

    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn read_metadata(
        &self,
        source: &ByteSource<'_>,
        _params: &PngParams,
    ) -> Result<ImageMetadata, CodecError> {
        let reader = self.reader(source)?;
        let info = reader.info();

        let mut meta = ImageMetadata::new(ImageFormat::Png);
        for chunk in &info.uncompressed_latin1_text {
            meta.push(chunk.keyword.clone(), chunk.text.clone());
        }
        for chunk in &info.compressed_latin1_text {
            meta.push(chunk.keyword.clone(), chunk.get_text().map_err(read_err)?);
        }
        for chunk in &info.utf8_text {
            meta.push(chunk.keyword.clone(), chunk.get_text().map_err(read_err)?);
        }
        Ok(meta)
    }

    fn read_info(
        &self,
        source: &ByteSource<'_>,
        _params: &PngParams,
    ) -> Result<ImageInfo, CodecError> {
        let reader = self.reader(source)?;
        Ok(Self::info_of(reader.info()))
    }

    fn decode(
        &self,
        source: &ByteSource<'_>,
        params: &PngParams,
    ) -> Result<DecodeOutput, CodecError> {
        let mut reader = self.reader(source)?;
        let info = Self::info_of(reader.info());
        params.common().limits.enforce(info.width, info.height)?;

        let buffer_size = reader.output_buffer_size().ok_or_else(|| {
            CodecError::malformed(ImageFormat::Png, "cannot determine PNG output buffer size")
        })?;
        params.common().limits.enforce_memory(buffer_size as u64)?;
        if buffer_size / MAX_OUTPUT_PER_INPUT_BYTE > source.len() {
            return Err(CodecError::malformed(
                ImageFormat::Png,
                format!(
                    "{}x{} image cannot fit in {} bytes of input",
                    info.width,
                    info.height,
                    source.len()
                ),
            ));
        }
        let mut raw_pixels = Vec::new();
        raw_pixels.try_reserve_exact(buffer_size).map_err(|_| {
            CodecError::LimitExceeded(format!("cannot allocate {buffer_size} bytes"))
        })?;
        raw_pixels.resize(buffer_size, 0);
        let output_info = reader.next_frame(&mut raw_pixels).map_err(read_err)?;
        raw_pixels.truncate(output_info.buffer_size());

        let (decoded_color_type, _bit_depth) = reader.output_color_type();
        let w = info.width as usize;
        let h = info.height as usize;

        let pixels = match decoded_color_type {
            png::ColorType::GrayscaleAlpha => {
                // GA → RGBA
                let rgba: Vec<u8> = raw_pixels
                    .chunks_exact(2)
                    .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                    .collect();
                PixelData::from_interleaved(&rgba, 4, w, h)
            }
            other => PixelData::from_interleaved(&raw_pixels, other.samples() as u8, w, h),
        }
        .ok_or_else(|| CodecError::malformed(ImageFormat::Png, "decoded size mismatch"))?;

        Ok(DecodeOutput { pixels, info })
    }

    fn icc_profile(
        &self,
        source: &ByteSource<'_>,
        _params: &PngParams,
    ) -> Result<Option<Vec<u8>>, CodecError> {
        let reader = self.reader(source)?;
        Ok(reader.info().icc_profile.as_ref().map(|p| p.to_vec()))
    }

    fn read_xmp(
        &self,
        source: &ByteSource<'_>,
        _params: &PngParams,
    ) -> Result<Option<String>, CodecError> {
        let reader = self.reader(source)?;
        reader
            .info()
            .utf8_text
            .iter()
            .find(|chunk| chunk.keyword == XMP_KEYWORD)
            .map(|chunk| chunk.get_text().map_err(read_err))
            .transpose()
    }

    fn encode(
        &self,
        image: &PixelData,
        sink: &mut dyn Write,
        params: &PngParams,
    ) -> Result<(), CodecError> {
        let color = match image {
            PixelData::Rgb8(_) => png::ColorType::Rgb,
            PixelData::Rgba8(_) => png::ColorType::Rgba,
            PixelData::Gray8(_) => png::ColorType::Grayscale,
        };
        let bytes = image.to_contiguous_bytes();

        let mut encoder = png::Encoder::new(sink, image.width(), image.height());
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(params.compression);
        encoder.set_filter(params.filter);
        if let Some(density) = &params.common().pixel_density {
            encoder.set_pixel_dims(Some(pixel_dims(density)));
        }
        for (keyword, text) in &params.text_chunks {
            encoder
                .add_text_chunk(keyword.clone(), text.clone())
                .map_err(write_err)?;
        }
        if let Some(xmp) = &params.xmp.xmp_xml {
            encoder
                .add_itxt_chunk(XMP_KEYWORD.to_owned(), xmp.clone())
                .map_err(write_err)?;
        }

        let mut writer = encoder.write_header().map_err(write_err)?;
        writer.write_image_data(&bytes).map_err(write_err)?;
        writer.finish().map_err(write_err)
    }
}
