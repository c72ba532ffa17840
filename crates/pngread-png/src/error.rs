/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible during png decoding
use alloc::string::String;
use core::fmt::{Debug, Display, Formatter};

use pngread_core::bytestream::ZByteIoError;
use pngread_inflate::errors::InflateDecodeErrors;

/// Possible errors that may occur during decoding
///
/// All of them are fatal, the decoder returns no pixels once one is hit
pub enum PngDecodeErrors {
    /// The image does not start with the png signature
    NotAPng,
    /// The image is a valid png but uses something this
    /// decoder doesn't handle, e.g interlacing or palettes
    UnsupportedFeature(String),
    /// The input stream doesn't have enough bytes to fully
    /// reconstruct the image
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes we expected
    /// - 2nd argument is the number of bytes actually found
    TruncatedInput(usize, usize),
    /// A chunk's declared length is inconsistent with its type
    /// or with the bytes left in the stream
    ChunkLengthMismatch {
        chunk:    [u8; 4],
        expected: usize,
        found:    usize
    },
    /// A scanline starts with a filter type above 4
    InvalidFilterType(u8),
    /// Image dimensions are larger than the configured maximum
    ///
    /// # Arguments
    /// - 1st argument is the dimension name, `width` or `height`
    /// - 2nd argument is the configured limit
    /// - 3rd argument is the value found in the image
    TooLargeDimensions(&'static str, usize, usize),
    /// The output buffer given to `decode_into` is too small
    ///
    /// # Arguments
    /// - 1st argument is the size needed
    /// - 2nd argument is the size of the buffer
    TooSmallOutput(usize, usize),
    /// The compressed image data could not be inflated
    InflateErrors(InflateDecodeErrors),
    IoErrors(ZByteIoError),
    /// Generic message does not need heap allocation
    GenericStatic(&'static str),
    /// Generic message
    Generic(String)
}

impl Debug for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotAPng => writeln!(f, "Bad PNG signature, not a png"),
            Self::UnsupportedFeature(feature) => {
                writeln!(f, "Unsupported feature: {feature}")
            }
            Self::TruncatedInput(expected, found) => {
                writeln!(
                    f,
                    "Truncated input, expected {expected} bytes but found {found}"
                )
            }
            Self::ChunkLengthMismatch {
                chunk,
                expected,
                found
            } => {
                let name = core::str::from_utf8(chunk).unwrap_or("XXXX");
                writeln!(
                    f,
                    "Chunk {name} length mismatch, expected {expected} bytes but found {found}"
                )
            }
            Self::InvalidFilterType(filter) => {
                writeln!(f, "Invalid filter type {filter}, expected a value below 5")
            }
            Self::TooLargeDimensions(dimension, limit, found) => {
                writeln!(
                    f,
                    "Image {dimension} {found} larger than maximum configured {dimension} {limit}"
                )
            }
            Self::TooSmallOutput(expected, found) => {
                writeln!(
                    f,
                    "Too small output size, expected {expected}, but found {found}"
                )
            }
            Self::InflateErrors(err) => writeln!(f, "Inflate error: {err:?}"),
            Self::IoErrors(err) => writeln!(f, "I/O error {err:?}"),
            Self::GenericStatic(val) => writeln!(f, "{val}"),
            Self::Generic(val) => writeln!(f, "{val}")
        }
    }
}

impl Display for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PngDecodeErrors {}

impl From<&'static str> for PngDecodeErrors {
    fn from(val: &'static str) -> Self {
        Self::GenericStatic(val)
    }
}

impl From<String> for PngDecodeErrors {
    fn from(val: String) -> Self {
        Self::Generic(val)
    }
}

impl From<InflateDecodeErrors> for PngDecodeErrors {
    fn from(val: InflateDecodeErrors) -> Self {
        Self::InflateErrors(val)
    }
}

impl From<ZByteIoError> for PngDecodeErrors {
    fn from(val: ZByteIoError) -> Self {
        Self::IoErrors(val)
    }
}
