#![no_main]

use libfuzzer_sys::fuzz_target;
use zenimaging::{ByteSource, DecodeRequest, ImagingParams, Limits};

fuzz_target!(|data: &[u8]| {
    let source = ByteSource::from_bytes(data);
    let params = ImagingParams::new().with_limits(Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(1 << 28),
        ..Limits::default()
    });

    let _ = DecodeRequest::new(&source).with_params(&params).metadata();
    let _ = DecodeRequest::new(&source).with_params(&params).info();
    let _ = DecodeRequest::new(&source).with_params(&params).icc_profile();
    let _ = DecodeRequest::new(&source).with_params(&params).xmp();

    if let Ok(output) = DecodeRequest::new(&source).with_params(&params).decode() {
        assert_eq!(output.width(), output.info.width);
        assert_eq!(output.height(), output.info.height);
    }
});
