/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

mod common;

use common::*;
use pngread_inflate::errors::{BackRefErrors, InflateDecodeErrors};
use pngread_png::error::PngDecodeErrors;
use pngread_png::pngread_core::options::DecoderOptions;
use pngread_png::PngDecoder;

fn rgb_2x2() -> Vec<u8> {
    unfiltered(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12], 6)
}

fn strict() -> DecoderOptions {
    DecoderOptions::default().set_strict_mode(true)
}

#[test]
fn bad_signature() {
    let mut png = build_png(&ihdr(2, 2, 8, 2, 0), &zlib_stored(&rgb_2x2()));
    png[1] = b'Q';

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(matches!(err, PngDecodeErrors::NotAPng), "{err:?}");

    let err = pngread_png::decode(&SIGNATURE[..5]).unwrap_err();
    assert!(matches!(err, PngDecodeErrors::NotAPng), "{err:?}");
}

#[test]
fn first_chunk_must_be_ihdr() {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"tEXt", b"a\0b");
    write_chunk(&mut png, b"IHDR", &ihdr(2, 2, 8, 2, 0));

    assert!(pngread_png::decode(&png).is_err());
}

#[test]
fn interlaced_is_unsupported() {
    let png = build_png(&ihdr(2, 2, 8, 2, 1), &zlib_stored(&rgb_2x2()));

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(matches!(err, PngDecodeErrors::UnsupportedFeature(_)), "{err:?}");
}

#[test]
fn palette_is_unsupported() {
    let png = build_png(&ihdr(2, 2, 8, 3, 0), &zlib_stored(&[0, 0, 0, 0, 0, 0]));

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(matches!(err, PngDecodeErrors::UnsupportedFeature(_)), "{err:?}");
}

#[test]
fn other_depths_are_unsupported() {
    for depth in [1, 2, 4, 16] {
        let png = build_png(&ihdr(2, 2, depth, 0, 0), &zlib_stored(&[0; 32]));

        let err = pngread_png::decode(&png).unwrap_err();
        assert!(matches!(err, PngDecodeErrors::UnsupportedFeature(_)), "{depth}: {err:?}");
    }
}

#[test]
fn unknown_color_type() {
    let png = build_png(&ihdr(2, 2, 8, 5, 0), &zlib_stored(&rgb_2x2()));

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(matches!(err, PngDecodeErrors::UnsupportedFeature(_)), "{err:?}");
}

#[test]
fn zero_dimensions() {
    let png = build_png(&ihdr(0, 2, 8, 2, 0), &zlib_stored(&[]));
    assert!(pngread_png::decode(&png).is_err());
}

#[test]
fn ihdr_wrong_length() {
    let mut header = ihdr(2, 2, 8, 2, 0);
    header.push(0);
    let png = build_png(&header, &zlib_stored(&rgb_2x2()));

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(
        matches!(err, PngDecodeErrors::ChunkLengthMismatch { expected: 13, found: 14, .. }),
        "{err:?}"
    );
}

#[test]
fn chunk_longer_than_stream() {
    let mut png = build_png(&ihdr(2, 2, 8, 2, 0), &zlib_stored(&rgb_2x2()));
    // IDAT length field sits right after the IHDR chunk
    let idat_length = 8 + 8 + 13 + 4;
    png[idat_length..idat_length + 4].copy_from_slice(&1000_u32.to_be_bytes());

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(
        matches!(err, PngDecodeErrors::ChunkLengthMismatch { chunk, .. } if &chunk == b"IDAT"),
        "{err:?}"
    );
}

#[test]
fn truncated_idat() {
    let mut idat = zlib_stored(&rgb_2x2());
    idat.pop();
    let png = build_png(&ihdr(2, 2, 8, 2, 0), &idat);

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(
        matches!(err, PngDecodeErrors::InflateErrors(InflateDecodeErrors::EndOfInput)),
        "{err:?}"
    );
}

#[test]
fn too_little_image_data() {
    // one scanline short
    let raw = unfiltered(&[1, 2, 3, 4, 5, 6], 6);
    let png = build_png(&ihdr(2, 2, 8, 2, 0), &zlib_stored(&raw));

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(matches!(err, PngDecodeErrors::TruncatedInput(14, 7)), "{err:?}");
}

#[test]
fn extra_image_data() {
    let mut raw = rgb_2x2();
    raw.extend_from_slice(&[0, 0, 0]);
    let png = build_png(&ihdr(2, 2, 8, 2, 0), &zlib_stored(&raw));

    assert!(PngDecoder::new(&png).decode_raw().is_ok());
    assert!(PngDecoder::new_with_options(&png, strict())
        .decode_raw()
        .is_err());
}

#[test]
fn no_idat() {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(2, 2, 8, 2, 0));
    write_chunk(&mut png, b"IEND", &[]);

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(matches!(err, PngDecodeErrors::TruncatedInput(..)), "{err:?}");
}

#[test]
fn stream_ends_before_idat() {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(2, 2, 8, 2, 0));

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(matches!(err, PngDecodeErrors::TruncatedInput(8, 0)), "{err:?}");
}

#[test]
fn invalid_filter_type() {
    let mut raw = rgb_2x2();
    raw[7] = 5;
    let png = build_png(&ihdr(2, 2, 8, 2, 0), &zlib_stored(&raw));

    let mut out = [0xEE_u8; 12];
    let err = PngDecoder::new(&png).decode_into(&mut out).unwrap_err();

    assert!(matches!(err, PngDecodeErrors::InvalidFilterType(5)), "{err:?}");
    // the first, valid, row was not written either
    assert_eq!(out, [0xEE; 12]);
}

#[test]
fn output_buffer_too_small() {
    let png = build_png(&ihdr(2, 2, 8, 2, 0), &zlib_stored(&rgb_2x2()));

    let mut out = [0_u8; 11];
    let err = PngDecoder::new(&png).decode_into(&mut out).unwrap_err();

    assert!(matches!(err, PngDecodeErrors::TooSmallOutput(12, 11)), "{err:?}");
}

#[test]
fn dimension_limits() {
    let png = build_png(&ihdr(2, 3, 8, 2, 0), &zlib_stored(&[]));

    let options = DecoderOptions::default().set_max_width(1);
    let err = PngDecoder::new_with_options(&png, options)
        .decode_headers()
        .unwrap_err();
    assert!(
        matches!(err, PngDecodeErrors::TooLargeDimensions("width", 1, 2)),
        "{err:?}"
    );

    let options = DecoderOptions::default().set_max_height(2);
    let err = PngDecoder::new_with_options(&png, options)
        .decode_headers()
        .unwrap_err();
    assert!(
        matches!(err, PngDecodeErrors::TooLargeDimensions("height", 2, 3)),
        "{err:?}"
    );
}

#[test]
fn missing_iend_strict() {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(2, 2, 8, 2, 0));
    write_chunk(&mut png, b"IDAT", &zlib_stored(&rgb_2x2()));

    let err = PngDecoder::new_with_options(&png, strict())
        .decode_raw()
        .unwrap_err();
    assert!(matches!(err, PngDecodeErrors::TruncatedInput(..)), "{err:?}");
}

#[test]
fn unknown_critical_chunk_strict() {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(2, 2, 8, 2, 0));
    write_chunk(&mut png, b"ABCD", &[1, 2, 3]);
    write_chunk(&mut png, b"IDAT", &zlib_stored(&rgb_2x2()));
    write_chunk(&mut png, b"IEND", &[]);

    let err = PngDecoder::new_with_options(&png, strict())
        .decode_raw()
        .unwrap_err();
    assert!(matches!(err, PngDecodeErrors::UnsupportedFeature(_)), "{err:?}");
}

#[test]
fn second_ihdr() {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(2, 2, 8, 2, 0));
    write_chunk(&mut png, b"IHDR", &ihdr(2, 2, 8, 2, 0));
    write_chunk(&mut png, b"IDAT", &zlib_stored(&rgb_2x2()));
    write_chunk(&mut png, b"IEND", &[]);

    assert!(pngread_png::decode(&png).is_err());
}

#[test]
fn decoding_twice() {
    let png = build_png(&ihdr(2, 2, 8, 2, 0), &zlib_stored(&rgb_2x2()));
    let mut decoder = PngDecoder::new(&png);

    assert!(decoder.decode().is_ok());

    let err = decoder.decode_raw().unwrap_err();
    assert!(matches!(err, PngDecodeErrors::GenericStatic(_)), "{err:?}");
    // headers stay available
    assert_eq!(decoder.get_dimensions(), Some((2, 2)));
}

#[test]
fn corrupt_checksum() {
    let mut idat = zlib_stored(&rgb_2x2());
    let last = idat.len() - 1;
    idat[last] ^= 0xFF;
    let png = build_png(&ihdr(2, 2, 8, 2, 0), &idat);

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(
        matches!(err, PngDecodeErrors::InflateErrors(InflateDecodeErrors::MismatchedAdler(..))),
        "{err:?}"
    );

    let options = DecoderOptions::default().inflate_set_confirm_adler(false);
    assert!(PngDecoder::new_with_options(&png, options)
        .decode_raw()
        .is_ok());
}

#[test]
fn back_reference_before_start() {
    // fixed block, literal 0 then length 3 distance 2
    // bits: BFINAL=1, BTYPE=01
    // literal 0 is 00110000, length 257 is 0000001, distance code 1 is 00001
    let mut writer = BitWriter::default();
    writer.put(1, 1);
    writer.put(1, 2);
    writer.put_code(0b0011_0000, 8);
    writer.put_code(0b000_0001, 7);
    writer.put_code(0b00001, 5);
    writer.put_code(0, 7);

    let mut idat = vec![0x78, 0x01];
    idat.extend_from_slice(&writer.finish());
    idat.extend_from_slice(&[0; 4]);

    let png = build_png(&ihdr(1, 1, 8, 0, 0), &idat);

    let err = pngread_png::decode(&png).unwrap_err();
    assert!(
        matches!(
            err,
            PngDecodeErrors::InflateErrors(InflateDecodeErrors::InvalidBackReference(
                BackRefErrors::TooFar(2, 1)
            ))
        ),
        "{err:?}"
    );
}

/// LSB first bit packer
#[derive(Default)]
struct BitWriter {
    bytes:    Vec<u8>,
    buffer:   u32,
    num_bits: u32
}

impl BitWriter {
    fn put(&mut self, value: u32, bits: u32) {
        self.buffer |= value << self.num_bits;
        self.num_bits += bits;

        while self.num_bits >= 8 {
            self.bytes.push(self.buffer as u8);
            self.buffer >>= 8;
            self.num_bits -= 8;
        }
    }
    /// Huffman codes are packed starting from their most significant bit
    fn put_code(&mut self, code: u32, bits: u32) {
        for i in (0..bits).rev() {
            self.put((code >> i) & 1, 1);
        }
    }
    fn finish(mut self) -> Vec<u8> {
        if self.num_bits > 0 {
            self.bytes.push(self.buffer as u8);
        }
        self.bytes
    }
}
