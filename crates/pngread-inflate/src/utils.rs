/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Calculate adler hash of a piece of data
#[cfg(feature = "zlib")]
pub fn calc_adler_hash(data: &[u8]) -> u32 {
    use simd_adler32::Adler32;
    let mut hasher = Adler32::new();

    hasher.write(data);

    hasher.finish()
}
