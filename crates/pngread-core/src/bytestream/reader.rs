/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

/// Errors raised when a read cannot be satisfied
pub enum ZByteIoError {
    /// More bytes were requested than the stream holds
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes requested
    /// - 2nd argument is the number of bytes left in the stream
    NotEnoughBytes(usize, usize),
    Generic(&'static str)
}

impl Debug for ZByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ZByteIoError::NotEnoughBytes(expected, found) => {
                writeln!(f, "Not enough bytes, expected {expected} but found {found}")
            }
            ZByteIoError::Generic(err) => {
                writeln!(f, "Generic I/O error: {err}")
            }
        }
    }
}

impl Display for ZByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ZByteIoError {}

impl From<&'static str> for ZByteIoError {
    fn from(value: &'static str) -> Self {
        ZByteIoError::Generic(value)
    }
}

/// An encapsulation of a byte stream
///
/// Reads never go past the end of the underlying buffer, the
/// `_err` variants report a short read and the plain variants
/// return zero instead.
///
/// The lifetime parameter is that of the buffer we borrow from,
/// so slices handed out by [`get_as_ref`](ZByteReader::get_as_ref) outlive
/// the reader itself.
pub struct ZByteReader<'a> {
    /// Data stream
    stream:   &'a [u8],
    position: usize
}

enum Mode {
    // Big endian
    BE,
    // Little Endian
    LE
}

impl<'a> ZByteReader<'a> {
    pub const fn new(buf: &'a [u8]) -> ZByteReader<'a> {
        ZByteReader {
            stream:   buf,
            position: 0
        }
    }
    /// Skip `num` bytes ahead of the stream.
    ///
    /// Skipping past the end leaves the reader at the end
    pub fn skip(&mut self, num: usize) {
        self.position = self.position.saturating_add(num).min(self.stream.len());
    }
    /// Undo the last `num` bytes of reads
    pub fn rewind(&mut self, num: usize) {
        self.position = self.position.saturating_sub(num);
    }
    /// Return whether the underlying buffer
    /// has `num` bytes available for reading
    pub const fn has(&self, num: usize) -> bool {
        self.position.saturating_add(num) <= self.stream.len()
    }
    /// Number of bytes left in the stream
    pub const fn remaining(&self) -> usize {
        // Must be saturating to prevent underflow
        self.stream.len().saturating_sub(self.position)
    }
    pub const fn len(&self) -> usize {
        self.stream.len()
    }
    pub const fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }
    pub const fn eof(&self) -> bool {
        self.position >= self.stream.len()
    }
    pub const fn get_position(&self) -> usize {
        self.position
    }
    /// Look ahead `position` bytes and return a reference
    /// to `num_bytes` from that position, or an error if the
    /// peek would be out of bounds.
    ///
    /// This doesn't increment the position.
    pub fn peek_at(&self, position: usize, num_bytes: usize) -> Result<&'a [u8], ZByteIoError> {
        let start = self.position.saturating_add(position);
        let end = start.saturating_add(num_bytes);

        self.stream
            .get(start..end)
            .ok_or(ZByteIoError::NotEnoughBytes(num_bytes, self.remaining().saturating_sub(position)))
    }
    /// Return a reference to the next `num_bytes` bytes and
    /// advance past them
    pub fn get_as_ref(&mut self, num_bytes: usize) -> Result<&'a [u8], ZByteIoError> {
        let bytes = self.peek_at(0, num_bytes)?;
        self.position += num_bytes;
        Ok(bytes)
    }
    /// Read exactly `N` bytes or return an error, leaving the position
    /// unchanged, if the stream is too short
    pub fn read_fixed_bytes_or_error<const N: usize>(&mut self) -> Result<[u8; N], ZByteIoError> {
        let mut byte_store: [u8; N] = [0; N];
        byte_store.copy_from_slice(self.get_as_ref(N)?);
        Ok(byte_store)
    }
    pub fn get_u8(&mut self) -> u8 {
        self.get_u8_be()
    }
    pub fn get_u8_err(&mut self) -> Result<u8, ZByteIoError> {
        self.get_u8_be_err()
    }
}

macro_rules! get_single_type {
    ($name:tt,$name2:tt,$name3:tt,$name4:tt,$name5:tt,$name6:tt,$int_type:tt) => {
        impl<'a> ZByteReader<'a> {
            #[inline(always)]
            fn $name(&mut self, mode: Mode) -> $int_type {
                self.$name2(mode).unwrap_or(0)
            }

            #[inline(always)]
            fn $name2(&mut self, mode: Mode) -> Result<$int_type, ZByteIoError> {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let mut space = [0; SIZE_OF_VAL];

                match self.stream.get(self.position..self.position + SIZE_OF_VAL) {
                    Some(position) => {
                        space.copy_from_slice(position);
                        self.position += SIZE_OF_VAL;

                        match mode {
                            Mode::LE => Ok($int_type::from_le_bytes(space)),
                            Mode::BE => Ok($int_type::from_be_bytes(space))
                        }
                    }
                    None => Err(ZByteIoError::NotEnoughBytes(SIZE_OF_VAL, self.remaining()))
                }
            }

            pub fn $name3(&mut self) -> Result<$int_type, ZByteIoError> {
                self.$name2(Mode::BE)
            }

            pub fn $name4(&mut self) -> Result<$int_type, ZByteIoError> {
                self.$name2(Mode::LE)
            }

            pub fn $name5(&mut self) -> $int_type {
                self.$name(Mode::BE)
            }

            pub fn $name6(&mut self) -> $int_type {
                self.$name(Mode::LE)
            }
        }
    };
}

get_single_type!(
    get_u8_inner_or_default,
    get_u8_inner_or_die,
    get_u8_be_err,
    get_u8_le_err,
    get_u8_be,
    get_u8_le,
    u8
);
get_single_type!(
    get_u16_inner_or_default,
    get_u16_inner_or_die,
    get_u16_be_err,
    get_u16_le_err,
    get_u16_be,
    get_u16_le,
    u16
);
get_single_type!(
    get_u32_inner_or_default,
    get_u32_inner_or_die,
    get_u32_be_err,
    get_u32_le_err,
    get_u32_be,
    get_u32_le,
    u32
);
get_single_type!(
    get_u64_inner_or_default,
    get_u64_inner_or_die,
    get_u64_be_err,
    get_u64_le_err,
    get_u64_be,
    get_u64_le,
    u64
);
