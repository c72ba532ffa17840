/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// `\x89PNG\r\n\x1a\n` read as a big endian u64
pub const PNG_SIGNATURE: u64 = u64::from_be_bytes([137, 80, 78, 71, 13, 10, 26, 10]);

/// Length of the data in an IHDR chunk
pub const IHDR_LENGTH: usize = 13;

/// Size of the length and type fields that start every chunk
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Size of the CRC trailing every chunk
pub const CHUNK_CRC_SIZE: usize = 4;
