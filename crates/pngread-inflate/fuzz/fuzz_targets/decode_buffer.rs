#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = pngread_inflate::DeflateDecoder::new(data);
    let _ = decoder.decode_zlib();

    let mut decoder = pngread_inflate::DeflateDecoder::new(data);
    let _ = decoder.decode_deflate();
});
