/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by the pngread crates
//!
//! It currently contains
//!
//! - A bytestream reader with endian aware reads over an in-memory buffer
//! - Colorspace information for decoded pixels
//! - Decoder options shared by the png decoder and the inflate wrapper
//! - Logging macros which forward to the `log` crate when the `log` feature is on
//!
//! # Features
//!  - `std`: Implements `std::error::Error` for error types.
//!  - `log`: Forwards [`log`](crate::log) macros to the `log` facade.
#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]

pub mod bytestream;
pub mod colorspace;
pub mod log;
pub mod options;
