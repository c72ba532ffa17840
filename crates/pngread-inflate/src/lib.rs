/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A small deflate decoder.
//!
//! This crate features a deflate/zlib decoder written from the ground up,
//! it reads codes one bit at a time against canonical huffman tables and resolves
//! back-references through a 32 KiB sliding window.
//!
//! It is used by `pngread-png` to undo IDAT compression but
//! has no dependency on it and can be used on its own.
//!
//! # Usage
//!
//! Decoding deflate data
//!
//! ```no_run
//! use pngread_inflate::DeflateDecoder;
//! let totally_valid_data = [0; 23];
//! let mut decoder = DeflateDecoder::new(&totally_valid_data);
//!
//! let decompressed = decoder.decode_deflate();
//! ```
//!
//! Decoding zlib data
//! ```no_run
//! use pngread_inflate::DeflateDecoder;
//! let totally_valid_data = [0; 23];
//! let mut decoder = DeflateDecoder::new(&totally_valid_data);
//!
//! let decompressed = decoder.decode_zlib();
//! ```
//!
//! Decoding zlib data without confirming the adler32 checksum
//! ```no_run
//! use pngread_inflate::DeflateDecoder;
//! use pngread_inflate::DeflateOptions;
//! let totally_valid_data = [0; 23];
//! let options = DeflateOptions::default().set_confirm_checksum(false);
//! let mut decoder = DeflateDecoder::new_with_options(&totally_valid_data, options);
//!
//! let decompressed = decoder.decode_zlib();
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub use crate::decoder::{DeflateDecoder, DeflateOptions};

pub mod bitstream;
mod constants;
mod decoder;
mod enums;
pub mod errors;
pub mod huffman;
mod utils;
mod window;
