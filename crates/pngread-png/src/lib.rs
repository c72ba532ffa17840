/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A png decoder
//!
//! This features a small PNG reader which decodes 8 bit, non-interlaced
//! grayscale and truecolor images, with or without alpha, using its own
//! inflate implementation from `pngread-inflate`.
//!
//! # Usage
//! Add the library to `Cargo.toml`
//!
//! ```toml
//! pngread-png="0.1"
//! ```
//!
//! #### Decode to raw bytes.
//!
//! This is a simple decode operation which returns raw
//! bytes of the image.
//!
//!```no_run
//! use pngread_png::PngDecoder;
//! let mut decoder = PngDecoder::new(&[]);
//!
//! let pixels = decoder.decode_raw();
//! ```
//!
//! #### Decode with image geometry
//!
//! [`decode`] returns the pixels together with
//! width, height and bytes per pixel
//!
//!```no_run
//! let data = std::fs::read("image.png").unwrap();
//! let image = pngread_png::decode(&data).unwrap();
//!
//! assert_eq!(image.pixels.len(), image.width * image.height * image.bytes_per_pixel);
//! ```
//!
//! # Extracting metadata
//!
//! Once headers have been decoded, image metadata can be accessed via [`get_info()`](PngDecoder::get_info) method
//!
//! ```no_run
//! use pngread_png::PngDecoder;
//! let mut decoder = PngDecoder::new(&[]);
//!
//! decoder.decode_headers().unwrap();
//! let info = decoder.get_info().unwrap();
//! println!("{}x{} {:?}", info.width, info.height, info.color);
//! ```
//!
//! # Features
//! - `std`: Implements `std::error::Error` for errors
//! - `log`: Logs chunk and header information through the `log` crate
//!
//! # Limitations
//! Palette images, bit depths other than 8 and Adam7 interlacing are
//! rejected with [`PngDecodeErrors::UnsupportedFeature`](error::PngDecodeErrors::UnsupportedFeature).
//! Chunk CRCs are not verified.
#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;

pub use decoder::{DecodedImage, PngDecoder, PngInfo};
pub use enums::{InterlaceMethod, PngColor};
pub use pngread_core;

use crate::error::PngDecodeErrors;

mod constants;
mod decoder;
mod enums;
pub mod error;
mod filters;
mod headers;

/// Decode a png held in memory using default options
///
/// # Example
/// ```no_run
/// let data = std::fs::read("image.png").unwrap();
/// let image = pngread_png::decode(&data).unwrap();
/// println!("{}x{}", image.width, image.height);
/// ```
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, PngDecodeErrors> {
    PngDecoder::new(bytes).decode()
}
