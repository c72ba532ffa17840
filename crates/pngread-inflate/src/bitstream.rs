/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! `BitStreamReader` API
//!
//! This module provides an interface to read bits (and bytes) for
//! huffman decoding.
//!
//! Deflate packs bits starting from the least significant bit of each
//! byte, and multi-bit fields are stored with their least significant
//! bit first, so the first bit read always ends up as bit 0 of the result.
use crate::errors::InflateDecodeErrors;

pub struct BitStreamReader<'src> {
    // buffer from which we are pulling in bits from
    // used in decompression.
    src:       &'src [u8],
    // position in our buffer,
    position:  usize,
    bits_left: u8,
    buffer:    u64
}

impl<'src> BitStreamReader<'src> {
    /// Create a new `BitStreamReader` instance
    pub fn new(in_buffer: &'src [u8]) -> BitStreamReader<'src> {
        BitStreamReader {
            bits_left: 0,
            buffer:    0,
            src:       in_buffer,
            position:  0
        }
    }
    /// Refill the bitstream ensuring the buffer has bits between
    /// 56 and 63, or as many as the input has left.
    #[inline(always)]
    pub fn refill(&mut self) {
        /*
         * The refill always guarantees refills between 56-63
         *
         * Bits stored will never go above 63 and if bits are in the range 56-63 no refills occur.
         */
        let mut buf = [0; 8];

        match self.src.get(self.position..self.position + 8) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                // create a u64 from an array of u8's
                let new_buffer = u64::from_le_bytes(buf);
                // num indicates how many bytes we actually consumed.
                let num = 63 ^ self.bits_left;
                // offset position
                self.position += (num >> 3) as usize;
                // shift number of bits
                self.buffer |= new_buffer << self.bits_left;
                // update bits left
                // bits left are now between 56-63
                self.bits_left |= 56;
            }
            None => self.refill_slow()
        }
    }
    #[inline(never)]
    fn refill_slow(&mut self) {
        let bytes = &self.src[self.position..];

        for byte in bytes {
            if self.bits_left >= 56 {
                break;
            }

            self.buffer |= u64::from(*byte) << self.bits_left;
            self.bits_left += 8;
            self.position += 1;
        }
    }

    /// Read the next `num_bits` bits of the stream, the earliest
    /// bit landing in bit 0 of the result.
    ///
    /// `num_bits` must not exceed 32
    ///
    /// # Errors
    /// [`EndOfInput`](InflateDecodeErrors::EndOfInput) if the stream runs out before
    /// all bits are read
    #[inline(always)]
    pub fn read_bits(&mut self, num_bits: u8) -> Result<u32, InflateDecodeErrors> {
        debug_assert!(num_bits <= 32);

        if !self.has(num_bits) {
            self.refill();

            if !self.has(num_bits) {
                return Err(InflateDecodeErrors::EndOfInput);
            }
        }
        Ok(self.get_bits(num_bits) as u32)
    }

    /// Read a single bit
    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<u32, InflateDecodeErrors> {
        self.read_bits(1)
    }

    #[inline(always)]
    fn get_bits(&mut self, num_bits: u8) -> u64 {
        debug_assert!(self.bits_left >= num_bits);

        let mask = (1_u64 << num_bits) - 1;

        let value = self.buffer & mask;

        self.buffer >>= num_bits;

        self.bits_left -= num_bits;

        value
    }

    /// Discard the rest of the partially read byte, so that
    /// the next read starts on a byte boundary
    pub fn align_to_byte(&mut self) {
        let partial_bits = self.bits_left & 7;

        self.buffer >>= partial_bits;
        self.bits_left -= partial_bits;
    }

    /// Return the next `num_bytes` whole bytes of the input
    /// and move past them.
    ///
    /// The reader must be byte aligned (see [`align_to_byte`](Self::align_to_byte))
    ///
    /// # Errors
    /// [`EndOfInput`](InflateDecodeErrors::EndOfInput) if fewer than `num_bytes` remain
    pub fn read_aligned_bytes(&mut self, num_bytes: usize) -> Result<&'src [u8], InflateDecodeErrors> {
        debug_assert_eq!(self.bits_left & 7, 0);
        // hand back whole bytes sitting in the bit-buffer, the
        // slice below starts where they came from
        self.position -= usize::from(self.bits_left >> 3);
        self.reset();

        let end = self
            .position
            .checked_add(num_bytes)
            .ok_or(InflateDecodeErrors::EndOfInput)?;

        let bytes = self
            .src
            .get(self.position..end)
            .ok_or(InflateDecodeErrors::EndOfInput)?;

        self.position = end;

        Ok(bytes)
    }

    /// Number of input bytes consumed so far.
    ///
    /// A byte from which only some bits were read counts as consumed.
    pub const fn bytes_consumed(&self) -> usize {
        self.position - (self.bits_left >> 3) as usize
    }

    /// Reset buffer and bits left to zero.
    pub fn reset(&mut self) {
        self.buffer = 0;
        self.bits_left = 0;
    }

    /// Return true if the bit buffer can satisfy
    /// `bits` read without refilling,
    pub const fn has(&self, bits: u8) -> bool {
        self.bits_left >= bits
    }

    /// Return the remaining bytes in this stream.
    ///
    /// This does not consider bits in the bit-buffer hence
    /// may not be accurate
    pub const fn remaining_bytes(&self) -> usize {
        self.src.len().saturating_sub(self.position)
    }
}
