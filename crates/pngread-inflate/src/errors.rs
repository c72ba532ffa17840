/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible when decoding deflate/zlib streams
use alloc::string::String;
use core::fmt::{Debug, Display, Formatter};

/// Ways in which a back-reference can be invalid
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum BackRefErrors {
    /// The distance reaches before the first byte of output
    ///
    /// # Arguments
    /// - 1st argument is the decoded distance
    /// - 2nd argument is the furthest distance that was valid
    TooFar(usize, usize),
    /// Literal/length symbols 286 and 287 take part in the code
    /// but have no meaning
    ReservedLengthSymbol(u16),
    /// Distance symbols 30 and 31 take part in the code but have
    /// no meaning
    ReservedDistanceSymbol(u16)
}

/// Errors that may occur during decompression
///
/// All of them are fatal, no output is returned once one is hit
pub enum InflateDecodeErrors {
    /// The input ended before the stream did
    EndOfInput,
    /// A block header carried the reserved block type 3
    InvalidBlockType(u8),
    /// A stored block length did not match its one's complement
    ///
    /// # Arguments
    /// - 1st argument is `LEN`
    /// - 2nd argument is `NLEN`
    InvalidStoredBlock(u16, u16),
    /// Code lengths do not describe a usable prefix code, or bits
    /// were read which match no code
    InvalidHuffmanCode(&'static str),
    /// A length/distance pair could not be resolved
    InvalidBackReference(BackRefErrors),
    /// The two byte zlib header is invalid or asks for features
    /// we do not support
    InvalidZlibHeader(String),
    /// Adler-32 of decoded data does not match the stream trailer
    ///
    /// # Arguments
    /// - 1st argument is the checksum stored in the stream
    /// - 2nd argument is the checksum of the decoded data
    MismatchedAdler(u32, u32),
    /// Decoding would produce more than the configured limit
    ///
    /// # Arguments
    /// - 1st argument is the limit
    /// - 2nd argument is the size output would have grown to
    OutputLimitExceeded(usize, usize)
}

impl Debug for BackRefErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooFar(distance, available) => write!(
                f,
                "Distance {distance} reaches before the start of output, only {available} bytes are available"
            ),
            Self::ReservedLengthSymbol(symbol) => {
                write!(f, "Reserved length symbol {symbol} used in a match")
            }
            Self::ReservedDistanceSymbol(symbol) => {
                write!(f, "Reserved distance symbol {symbol} used in a match")
            }
        }
    }
}

impl Debug for InflateDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EndOfInput => writeln!(f, "End of input reached before end of stream"),
            Self::InvalidBlockType(block_type) => {
                writeln!(f, "Invalid block type {block_type}")
            }
            Self::InvalidStoredBlock(len, nlen) => {
                writeln!(
                    f,
                    "Stored block length {len} does not match its complement {nlen}"
                )
            }
            Self::InvalidHuffmanCode(reason) => writeln!(f, "Invalid huffman code: {reason}"),
            Self::InvalidBackReference(reason) => {
                writeln!(f, "Invalid back reference: {reason:?}")
            }
            Self::InvalidZlibHeader(reason) => writeln!(f, "Invalid zlib header: {reason}"),
            Self::MismatchedAdler(expected, found) => {
                writeln!(f, "Mismatched Adler, expected {expected} but found {found}")
            }
            Self::OutputLimitExceeded(limit, current) => writeln!(
                f,
                "Output limit exceeded, set limit was {limit} and output size is {current}"
            )
        }
    }
}

impl Display for InflateDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InflateDecodeErrors {}
