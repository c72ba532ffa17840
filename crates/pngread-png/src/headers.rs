/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Chunk parsers
use alloc::format;

use pngread_core::log::{info, trace, warn};

use crate::constants::{CHUNK_CRC_SIZE, IHDR_LENGTH};
use crate::decoder::PngChunk;
use crate::enums::{is_ancillary, InterlaceMethod, PngChunkType, PngColor};
use crate::error::PngDecodeErrors;
use crate::PngDecoder;

impl<'a> PngDecoder<'a> {
    pub(crate) fn parse_ihdr(&mut self, chunk: PngChunk) -> Result<(), PngDecodeErrors> {
        if self.seen_hdr {
            return Err(PngDecodeErrors::GenericStatic("Multiple IHDR, corrupt PNG"));
        }

        if chunk.length != IHDR_LENGTH {
            return Err(PngDecodeErrors::ChunkLengthMismatch {
                chunk:    chunk.chunk,
                expected: IHDR_LENGTH,
                found:    chunk.length
            });
        }

        self.png_info.width = self.stream.get_u32_be_err()? as usize;
        self.png_info.height = self.stream.get_u32_be_err()? as usize;

        if self.png_info.width == 0 || self.png_info.height == 0 {
            return Err(PngDecodeErrors::GenericStatic(
                "Width or height cannot be zero"
            ));
        }

        if self.png_info.width > self.options.max_width() {
            return Err(PngDecodeErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                self.png_info.width
            ));
        }

        if self.png_info.height > self.options.max_height() {
            return Err(PngDecodeErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                self.png_info.height
            ));
        }

        self.png_info.depth = self.stream.get_u8_err()?;
        let color = self.stream.get_u8_err()?;

        match PngColor::from_int(color) {
            Some(PngColor::Palette) => {
                return Err(PngDecodeErrors::UnsupportedFeature(
                    "Indexed (palette) color type".into()
                ));
            }
            Some(img_color) => self.png_info.color = img_color,
            None => {
                return Err(PngDecodeErrors::UnsupportedFeature(format!(
                    "Unknown color type {color}"
                )));
            }
        }
        self.png_info.component = self.png_info.color.num_components();

        if self.png_info.depth != 8 {
            return Err(PngDecodeErrors::UnsupportedFeature(format!(
                "Bit depth {}, only 8 bit images can be decoded",
                self.png_info.depth
            )));
        }

        let compression_method = self.stream.get_u8_err()?;

        if compression_method != 0 {
            return Err(PngDecodeErrors::UnsupportedFeature(format!(
                "Unknown compression method {compression_method}"
            )));
        }

        let filter_method = self.stream.get_u8_err()?;

        if filter_method != 0 {
            return Err(PngDecodeErrors::UnsupportedFeature(format!(
                "Unknown filter method {filter_method}"
            )));
        }

        let interlace_method = self.stream.get_u8_err()?;

        match InterlaceMethod::from_int(interlace_method) {
            Some(InterlaceMethod::Standard) => {
                self.png_info.interlace_method = InterlaceMethod::Standard;
            }
            Some(InterlaceMethod::Adam7) => {
                return Err(PngDecodeErrors::UnsupportedFeature(
                    "Interlaced (Adam7) images".into()
                ));
            }
            None => {
                return Err(PngDecodeErrors::UnsupportedFeature(format!(
                    "Unknown interlace method {interlace_method}"
                )));
            }
        }

        // skip crc
        self.stream.skip(CHUNK_CRC_SIZE);

        info!("Width: {}", self.png_info.width);
        info!("Height: {}", self.png_info.height);
        info!("Color type: {:?}", self.png_info.color);
        info!("Depth: {:?}", self.png_info.depth);
        info!("Interlace :{:?}", self.png_info.interlace_method);

        self.seen_hdr = true;

        Ok(())
    }

    pub(crate) fn parse_idat(&mut self, png_chunk: PngChunk) -> Result<(), PngDecodeErrors> {
        // get a reference to the IDAT chunk stream and push it,
        // we will later pass these to the deflate decoder as a whole, to get the whole
        // uncompressed stream.
        let idat_stream = self.stream.get_as_ref(png_chunk.length)?;

        self.idat_chunks.extend_from_slice(idat_stream);

        // skip crc
        self.stream.skip(CHUNK_CRC_SIZE);

        Ok(())
    }

    /// Skip over a chunk we don't interpret
    ///
    /// Ancillary chunks and PLTE are skipped silently, other
    /// critical chunks we don't know are an error in strict mode.
    pub(crate) fn skip_chunk(&mut self, chunk: PngChunk) -> Result<(), PngDecodeErrors> {
        let chunk_name = core::str::from_utf8(&chunk.chunk).unwrap_or("XXXX");

        if chunk.chunk_type == PngChunkType::PLTE || is_ancillary(&chunk.chunk) {
            trace!("Skipping chunk {chunk_name}, length {}", chunk.length);
        } else if self.options.strict_mode() {
            return Err(PngDecodeErrors::UnsupportedFeature(format!(
                "Marker {chunk_name} unknown but deemed necessary"
            )));
        } else {
            warn!("Marker {chunk_name} unknown but deemed necessary, skipping it");
        }

        self.stream.skip(chunk.length + CHUNK_CRC_SIZE);

        Ok(())
    }
}
