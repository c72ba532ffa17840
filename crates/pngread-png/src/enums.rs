/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms, non_camel_case_types)]

/// Chunk types the decoder acts on
///
/// See table 5.3 of https://www.w3.org/TR/2003/REC-PNG-20031110/
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngChunkType {
    IHDR,
    PLTE,
    IDAT,
    IEND,
    unkn
}

impl PngChunkType {
    pub fn from_bytes(chunk: &[u8; 4]) -> PngChunkType {
        match chunk {
            b"IHDR" => PngChunkType::IHDR,
            b"PLTE" => PngChunkType::PLTE,
            b"IDAT" => PngChunkType::IDAT,
            b"IEND" => PngChunkType::IEND,
            _ => PngChunkType::unkn
        }
    }
}

/// Return true if a chunk type marks an ancillary chunk
///
/// Bit 5 of the first byte (lower case letter) is set for chunks
/// a decoder may safely ignore.
pub const fn is_ancillary(chunk: &[u8; 4]) -> bool {
    chunk[0] & (1 << 5) != 0
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilterMethod {
    None,
    Sub,
    Up,
    Average,
    Paeth,
    // First scanline, special
    PaethFirst,
    AvgFirst
}

impl FilterMethod {
    pub fn from_int(int: u8) -> Option<FilterMethod> {
        match int {
            0 => Some(FilterMethod::None),
            1 => Some(FilterMethod::Sub),
            2 => Some(FilterMethod::Up),
            3 => Some(FilterMethod::Average),
            4 => Some(FilterMethod::Paeth),
            _ => None
        }
    }

    /// The filter to use on the first scanline
    ///
    /// The row above the first one is all zeroes, so filters reading
    /// it become cheaper special cases, `Up` becomes a copy.
    pub const fn first_row(self) -> FilterMethod {
        match self {
            FilterMethod::Up => FilterMethod::None,
            FilterMethod::Average => FilterMethod::AvgFirst,
            FilterMethod::Paeth => FilterMethod::PaethFirst,
            method => method
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum InterlaceMethod {
    #[default]
    Standard,
    Adam7
}

impl InterlaceMethod {
    pub fn from_int(int: u8) -> Option<InterlaceMethod> {
        match int {
            0 => Some(Self::Standard),
            1 => Some(Self::Adam7),
            _ => None
        }
    }
}

/// Color types as stored in IHDR
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PngColor {
    Luma,
    Palette,
    LumaA,
    #[default]
    RGB,
    RGBA
}

impl PngColor {
    /// Number of samples in a pixel
    pub const fn num_components(self) -> u8 {
        match self {
            PngColor::Luma => 1,
            PngColor::Palette => 1,
            PngColor::LumaA => 2,
            PngColor::RGB => 3,
            PngColor::RGBA => 4
        }
    }

    pub fn from_int(int: u8) -> Option<PngColor> {
        match int {
            0 => Some(Self::Luma),
            2 => Some(Self::RGB),
            3 => Some(Self::Palette),
            4 => Some(Self::LumaA),
            6 => Some(Self::RGBA),
            _ => None
        }
    }
}
