/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! LZ77 sliding window
//!
//! Keeps the last 32 KiB of decoded output in a ring so that
//! back-references never index into the (growing) output vector.
use alloc::vec;
use alloc::vec::Vec;

use crate::constants::DEFLATE_WINDOW_SIZE;
use crate::errors::{BackRefErrors, InflateDecodeErrors};

const WINDOW_MASK: usize = DEFLATE_WINDOW_SIZE - 1;

pub struct SlidingWindow {
    buffer:   Vec<u8>,
    /// Where the next byte goes
    position: usize,
    /// Bytes written since the start of the stream, not capped by the window size
    produced: usize
}

impl SlidingWindow {
    pub fn new() -> SlidingWindow {
        SlidingWindow {
            buffer:   vec![0; DEFLATE_WINDOW_SIZE],
            position: 0,
            produced: 0
        }
    }

    /// Append a single byte to both the window and `out`
    #[inline(always)]
    pub fn push(&mut self, byte: u8, out: &mut Vec<u8>) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & WINDOW_MASK;
        self.produced += 1;

        out.push(byte);
    }

    /// Append a run of bytes, e.g the contents of a stored block
    pub fn extend(&mut self, bytes: &[u8], out: &mut Vec<u8>) {
        out.extend_from_slice(bytes);
        self.produced += bytes.len();

        // only the tail can survive in the window
        let tail = &bytes[bytes.len().saturating_sub(DEFLATE_WINDOW_SIZE)..];

        let first_run = tail.len().min(DEFLATE_WINDOW_SIZE - self.position);
        let (first, second) = tail.split_at(first_run);

        self.buffer[self.position..self.position + first.len()].copy_from_slice(first);
        self.buffer[..second.len()].copy_from_slice(second);

        self.position = (self.position + tail.len()) & WINDOW_MASK;
    }

    /// Copy `length` bytes starting `distance` bytes back
    ///
    /// The source and destination may overlap (`length > distance`),
    /// e.g a distance of 1 repeats the last byte `length` times, so the copy
    /// goes one byte at a time and later bytes see the earlier ones.
    ///
    /// # Errors
    /// [`InvalidBackReference`](InflateDecodeErrors::InvalidBackReference) if
    /// `distance` is zero or reaches before the first byte of the stream
    /// (or further back than the window holds)
    pub fn copy_match(
        &mut self, length: usize, distance: usize, out: &mut Vec<u8>
    ) -> Result<(), InflateDecodeErrors> {
        let available = self.produced.min(DEFLATE_WINDOW_SIZE);

        if distance == 0 || distance > available {
            return Err(InflateDecodeErrors::InvalidBackReference(
                BackRefErrors::TooFar(distance, available)
            ));
        }

        let mut source = (self.position + DEFLATE_WINDOW_SIZE - distance) & WINDOW_MASK;

        for _ in 0..length {
            let byte = self.buffer[source];
            self.push(byte, out);
            source = (source + 1) & WINDOW_MASK;
        }
        Ok(())
    }

    /// Number of bytes produced since the start of the stream
    pub const fn produced(&self) -> usize {
        self.produced
    }
}
