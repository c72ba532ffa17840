/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global Decoder options
//!
//! All supported options are put into one `DecoderOptions` so that the same
//! configuration can be handed to the png decoder and, through it, to
//! the inflate decoder.

/// Strict decoder flags
///
/// Checksums are confirmed and non-conformance is an error
fn decoder_strict_mode() -> DecoderFlags {
    DecoderFlags {
        inflate_confirm_adler:    true,
        png_error_on_non_conform: true
    }
}

/// Fast decoder flags
///
/// Disables adler checking and tolerates recoverable
/// non-conformance
fn fast_options() -> DecoderFlags {
    DecoderFlags {
        inflate_confirm_adler:    false,
        png_error_on_non_conform: false
    }
}

/// Decoder options that are flags
///
/// NOTE: When you extend this, add true or false to
/// all options above that return a `DecoderFlag`
#[derive(Copy, Debug, Clone)]
struct DecoderFlags {
    /// Whether the decoder should confirm and report adler mismatch
    inflate_confirm_adler:    bool,
    /// Whether the png decoder should error out on recoverable
    /// non-conformance, e.g unknown critical chunks or a missing IEND
    png_error_on_non_conform: bool
}

impl Default for DecoderFlags {
    fn default() -> Self {
        DecoderFlags {
            inflate_confirm_adler:    true,
            png_error_on_non_conform: false
        }
    }
}

/// Decoder options
///
/// Not all options are respected by all decoders,
/// each option lists the ones that respect it
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 16384
    /// - Respected by: `png`
    max_width:     usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 16384
    /// - Respected by: `png`
    max_height:    usize,
    /// Maximum size for deflate output.
    ///
    /// - Default value: 1 GiB
    /// - Respected by: `png` (passed on to inflate)
    deflate_limit: usize,
    /// Boolean flags that influence decoding
    flags:         DecoderFlags
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width:     1 << 14,
            max_height:    1 << 14,
            deflate_limit: 1 << 30,
            flags:         DecoderFlags::default()
        }
    }
}

/// Initializers
impl DecoderOptions {
    /// Create the decoder with options setting the configurable
    /// options to their strict counterparts
    ///
    /// Checksums are confirmed and recoverable non-conformance
    /// becomes an error.
    pub fn new_safe() -> DecoderOptions {
        DecoderOptions::default().set_decoder_flags(decoder_strict_mode())
    }

    /// Create the decoder with options setting the configurable options
    /// to the fast counterparts
    ///
    /// Adler checksums are not confirmed.
    pub fn new_fast() -> DecoderOptions {
        DecoderOptions::default().set_decoder_flags(fast_options())
    }
}

/// Global options respected by all decoders
impl DecoderOptions {
    /// Get maximum width configured for which the decoder
    /// should not try to decode images greater than this width
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    /// Get maximum height configured for which the decoder should
    /// not try to decode images greater than this height
    pub const fn max_height(&self) -> usize {
        self.max_height
    }

    /// Return true whether the decoder should be in strict mode
    /// and reject recoverable errors
    pub const fn strict_mode(&self) -> bool {
        self.flags.png_error_on_non_conform
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    #[must_use]
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    #[must_use]
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Set whether the decoder should be in standards conforming/
    /// strict mode
    ///
    /// This reduces the error tolerance level for the decoders, recoverable
    /// non-conformance will be rejected and checksums confirmed.
    #[must_use]
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.flags.png_error_on_non_conform = yes;
        self.flags.inflate_confirm_adler |= yes;
        self
    }

    fn set_decoder_flags(mut self, flags: DecoderFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Inflate specific options
impl DecoderOptions {
    /// Whether the inflate decoder should confirm
    /// adler checksums
    pub const fn inflate_get_confirm_adler(&self) -> bool {
        self.flags.inflate_confirm_adler
    }
    /// Set whether the inflate decoder should confirm
    /// adler checksums
    #[must_use]
    pub fn inflate_set_confirm_adler(mut self, yes: bool) -> Self {
        self.flags.inflate_confirm_adler = yes;
        self
    }
    /// Get default inflate limit for which the decoder
    /// will not try to decompress further
    pub const fn inflate_get_limit(&self) -> usize {
        self.deflate_limit
    }
    /// Set the default inflate limit for which decompressors
    /// relying on inflate won't surpass this limit
    #[must_use]
    pub fn inflate_set_limit(mut self, limit: usize) -> Self {
        self.deflate_limit = limit;
        self
    }
}
