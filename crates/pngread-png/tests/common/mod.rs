/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Helpers for building small pngs by hand
#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use simd_adler32::Adler32;

pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Append a chunk, the crc is left as zero since the decoder doesn't check it
pub fn write_chunk(out: &mut Vec<u8>, name: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(data);
    out.extend_from_slice(&[0; 4]);
}

pub fn ihdr(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[depth, color, 0, 0, interlace]);
    data
}

/// Wrap `raw` in a zlib stream holding a single final stored block
pub fn zlib_stored(raw: &[u8]) -> Vec<u8> {
    assert!(raw.len() <= 65535);

    let len = raw.len() as u16;
    let mut out = vec![0x78, 0x01, 0x01];

    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(raw);
    let mut hasher = Adler32::new();
    hasher.write(raw);

    out.extend_from_slice(&hasher.finish().to_be_bytes());
    out
}

pub fn zlib_compress(raw: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw).unwrap();
    encoder.finish().unwrap()
}

/// A complete png with a single IDAT holding `idat`
pub fn build_png(header: &[u8], idat: &[u8]) -> Vec<u8> {
    let mut out = SIGNATURE.to_vec();
    write_chunk(&mut out, b"IHDR", header);
    write_chunk(&mut out, b"IDAT", idat);
    write_chunk(&mut out, b"IEND", &[]);
    out
}

/// Rows of `row_len` bytes each, all using filter type 0
pub fn unfiltered(pixels: &[u8], row_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() + pixels.len() / row_len);

    for row in pixels.chunks_exact(row_len) {
        out.push(0);
        out.extend_from_slice(row);
    }
    out
}
