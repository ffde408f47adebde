#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zenimaging::{ByteSource, DecodeRequest, ImageFormat, ImagingParams, Limits, XmpParams};

#[derive(Arbitrary, Debug)]
struct Input {
    strict: bool,
    max_width: Option<u16>,
    max_height: Option<u16>,
    max_pixels: Option<u32>,
    xmp: Option<String>,
    force_pnm: bool,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let common = ImagingParams::new()
        .with_strict(input.strict)
        .with_limits(Limits {
            max_width: input.max_width.map(u64::from),
            max_height: input.max_height.map(u64::from),
            max_pixels: input.max_pixels.map(u64::from),
            max_memory_bytes: Some(1 << 28),
        });
    let source = ByteSource::from_bytes(&input.data);

    let mut request = DecodeRequest::new(&source).with_params(&common);
    if input.force_pnm {
        request = request.with_format(ImageFormat::Pnm);
    }
    if let Ok(output) = request.decode() {
        if let Some(max) = common.limits.max_pixels {
            assert!(u64::from(output.width()) * u64::from(output.height()) <= max);
        }
    }

    // XmpParams only fits codecs below it in the hierarchy.
    let xmp = XmpParams {
        common,
        xmp_xml: input.xmp,
    };
    let _ = DecodeRequest::new(&source).with_params(&xmp).info();
});
