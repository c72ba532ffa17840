/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::{Cursor, Read, Write};
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nanorand::Rng;

fn sample_data() -> Vec<u8> {
    let mut rand = nanorand::WyRand::new_seed(0);
    // text like data over a small alphabet with some runs
    (0..(1 << 20))
        .map(|x| {
            if x % 64 < 16 {
                b' '
            } else {
                b'a' + rand.generate_range(0_u8..20)
            }
        })
        .collect()
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn decode_writer_flate(bytes: &[u8]) -> Vec<u8> {
    let mut writer = Vec::new();

    let mut deflater = flate2::read::ZlibDecoder::new(Cursor::new(bytes));

    deflater.read_to_end(&mut writer).unwrap();

    writer
}

fn decode_writer_pngread(bytes: &[u8], size: usize) -> Vec<u8> {
    let options = pngread_inflate::DeflateOptions::default().set_size_hint(size);

    let mut deflater = pngread_inflate::DeflateDecoder::new_with_options(bytes, options);

    deflater.decode_zlib().unwrap()
}

fn decode_writer_libdeflate(bytes: &[u8], size: usize) -> Vec<u8> {
    let mut deflater = libdeflater::Decompressor::new();
    let mut out = vec![0; size];

    deflater.zlib_decompress(bytes, &mut out).unwrap();
    out
}

fn decode_test(c: &mut Criterion) {
    let data = sample_data();
    let compressed = compress(&data);

    let mut group = c.benchmark_group("zlib decoding");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("flate2", |b| {
        b.iter(|| black_box(decode_writer_flate(compressed.as_slice())))
    });

    group.bench_function("pngread-inflate", |b| {
        b.iter(|| black_box(decode_writer_pngread(compressed.as_slice(), data.len())))
    });

    group.bench_function("libdeflate", |b| {
        b.iter(|| black_box(decode_writer_libdeflate(compressed.as_slice(), data.len())))
    });
}

criterion_group!(name=benches;
      config={
      let c = Criterion::default();
        c.measurement_time(Duration::from_secs(20))
      };
    targets=decode_test);

criterion_main!(benches);
