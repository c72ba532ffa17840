#![no_main]

use std::io::Write;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1 {
        let compression_level = flate2::Compression::new(u32::from(data[0] % 10));
        let data = &data[1..];
        let mut e = flate2::write::DeflateEncoder::new(Vec::new(), compression_level);
        e.write_all(data).unwrap();
        let compressed = e.finish().unwrap();
        let mut decoder = pngread_inflate::DeflateDecoder::new(&compressed);
        let decoded = decoder
            .decode_deflate()
            .expect("Failed to decompress valid compressed data!");
        assert!(
            data == decoded,
            "The decompressed data doesn't match the original data!"
        );
    }
});
