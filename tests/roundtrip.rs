//! Encode and decode through the registry-backed request builders.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use zenimaging::pixel::{ImgVec, Rgb, Rgba};
use zenimaging::{
    ByteSource, CodecError, CodecRegistry, DecodeRequest, EncodeRequest, ImageFormat,
    ImagingParams, Limits, PixelData, compiled_codec,
};

fn gradient(width: usize, height: usize) -> PixelData {
    let buf = (0..width * height)
        .map(|i| Rgb::new((i % 256) as u8, (i * 7 % 256) as u8, (i * 13 % 256) as u8))
        .collect();
    PixelData::Rgb8(ImgVec::new(buf, width, height))
}

fn rgb_bytes(pixels: &PixelData) -> Vec<u8> {
    let rgba = pixels.to_rgba8();
    rgba.buf().iter().flat_map(|p| [p.r, p.g, p.b]).collect()
}

struct CountingSink<'a> {
    drops: &'a AtomicUsize,
    fail: bool,
}

impl Write for CountingSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::other("disk full"));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for CountingSink<'_> {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn compiled_formats() -> Vec<ImageFormat> {
    CodecRegistry::all().encodable_formats().collect()
}

#[test]
fn every_compiled_format_round_trips() {
    let image = gradient(13, 7);
    for format in compiled_formats() {
        let data = EncodeRequest::new(format).encode(&image).unwrap();
        assert_eq!(ImageFormat::detect(&data), Some(format));

        let source = ByteSource::from_vec(data);
        let info = DecodeRequest::new(&source).info().unwrap();
        assert_eq!((info.width, info.height), (13, 7), "{format:?}");
        assert_eq!(info.format, format);

        let decoded = DecodeRequest::new(&source).decode().unwrap();
        assert_eq!(rgb_bytes(&decoded.pixels), rgb_bytes(&image), "{format:?}");
    }
}

#[test]
fn base_params_are_accepted_by_every_codec() {
    let params = ImagingParams::new().with_strict(true).with_file_name("shared");
    for format in compiled_formats() {
        let data = EncodeRequest::new(format)
            .with_params(&params)
            .encode(&gradient(3, 3))
            .unwrap();
        let source = ByteSource::from_vec(data);
        let out = DecodeRequest::new(&source)
            .with_params(&params)
            .decode()
            .unwrap();
        assert_eq!(out.width(), 3);
    }
}

#[test]
fn limits_travel_with_base_params() {
    let params = ImagingParams::new().with_limits(Limits {
        max_pixels: Some(8),
        ..Limits::default()
    });
    for format in compiled_formats() {
        let data = EncodeRequest::new(format).encode(&gradient(3, 3)).unwrap();
        let source = ByteSource::from_vec(data);
        let err = DecodeRequest::new(&source)
            .with_params(&params)
            .decode()
            .unwrap_err();
        assert!(matches!(err, CodecError::LimitExceeded(_)), "{format:?}: {err}");
    }
}

#[test]
fn sink_released_once_on_success() {
    let drops = AtomicUsize::new(0);
    for format in compiled_formats() {
        let before = drops.load(Ordering::SeqCst);
        let sink = CountingSink {
            drops: &drops,
            fail: false,
        };
        EncodeRequest::new(format)
            .write(&gradient(4, 4), sink)
            .unwrap();
        assert_eq!(drops.load(Ordering::SeqCst), before + 1);
    }
}

#[test]
fn sink_released_once_when_writing_fails() {
    let drops = AtomicUsize::new(0);
    for format in compiled_formats() {
        let before = drops.load(Ordering::SeqCst);
        let sink = CountingSink {
            drops: &drops,
            fail: true,
        };
        let result = EncodeRequest::new(format).write(&gradient(4, 4), sink);
        assert!(result.is_err(), "{format:?}");
        assert_eq!(drops.load(Ordering::SeqCst), before + 1);
    }
}

#[test]
fn sink_released_once_when_codec_unavailable() {
    let drops = AtomicUsize::new(0);
    let sink = CountingSink {
        drops: &drops,
        fail: false,
    };
    let err = EncodeRequest::new(ImageFormat::Tiff)
        .write(&gradient(1, 1), sink)
        .unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedFormat(ImageFormat::Tiff)));
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn alpha_survives_png() {
    let Some(codec) = compiled_codec(ImageFormat::Png) else {
        return;
    };
    let buf = vec![Rgba::new(10u8, 20, 30, 40); 6];
    let image = PixelData::Rgba8(ImgVec::new(buf, 3, 2));

    let mut out = Vec::new();
    codec.write_image(&image, Box::new(&mut out), None).unwrap();

    let source = ByteSource::from_bytes(&out);
    let decoded = codec.decode(&source, None).unwrap();
    assert!(decoded.pixels.has_alpha());
    assert!(decoded.pixels.to_rgba8().buf().iter().all(|p| p.a == 40));
}

#[test]
fn decode_from_file() {
    let dir = tempfile::tempdir().unwrap();
    for format in compiled_formats() {
        let path = dir.path().join(format!("image.{}", format.extensions()[0]));
        let data = EncodeRequest::new(format).encode(&gradient(5, 2)).unwrap();
        std::fs::write(&path, data).unwrap();

        let ext = path.extension().and_then(|e| e.to_str()).unwrap();
        assert_eq!(ImageFormat::from_extension(ext), Some(format));

        let source = ByteSource::from_path(&path).unwrap();
        assert!(source.name().is_some());
        let info = DecodeRequest::new(&source).info().unwrap();
        assert_eq!((info.width, info.height), (5, 2));
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ByteSource::from_path(dir.path().join("absent.png")).unwrap_err();
    assert!(matches!(err, CodecError::Io(_)));
}

#[test]
fn shared_codecs_across_threads() {
    let formats = compiled_formats();
    std::thread::scope(|scope| {
        for (i, &format) in formats.iter().cycle().take(8).enumerate() {
            scope.spawn(move || {
                let width = i + 1;
                let data = EncodeRequest::new(format)
                    .encode(&gradient(width, 2))
                    .unwrap();
                let source = ByteSource::from_vec(data);
                let info = DecodeRequest::new(&source).info().unwrap();
                assert_eq!(info.width as usize, width);
            });
        }
    });
}
