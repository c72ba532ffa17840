/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use pngread_core::bytestream::ZByteReader;
use pngread_core::colorspace::ColorSpace;
use pngread_core::log::{trace, warn};
use pngread_core::options::DecoderOptions;
use pngread_inflate::{DeflateDecoder, DeflateOptions};

use crate::constants::{CHUNK_CRC_SIZE, CHUNK_HEADER_SIZE, PNG_SIGNATURE};
use crate::enums::{FilterMethod, InterlaceMethod, PngChunkType, PngColor};
use crate::error::PngDecodeErrors;
use crate::filters::{
    handle_avg, handle_avg_first, handle_paeth, handle_paeth_first, handle_sub, handle_up
};

#[derive(Copy, Clone)]
pub(crate) struct PngChunk {
    pub length:     usize,
    pub chunk_type: PngChunkType,
    pub chunk:      [u8; 4]
}

/// Image information as read from the IHDR chunk
#[derive(Default, Debug, Copy, Clone)]
pub struct PngInfo {
    pub width:            usize,
    pub height:           usize,
    pub depth:            u8,
    pub color:            PngColor,
    /// Bytes per pixel
    pub component:        u8,
    pub interlace_method: InterlaceMethod
}

/// A fully decoded image
///
/// Pixels are stored row by row, top to bottom, with
/// each pixel's channels in the order given by `colorspace`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedImage {
    pub width:           usize,
    pub height:          usize,
    pub bytes_per_pixel: usize,
    pub colorspace:      ColorSpace,
    /// `width * height * bytes_per_pixel` bytes
    pub pixels:          Vec<u8>
}

/// A PNG decoder instance
///
/// # Example
/// ```no_run
/// use pngread_png::PngDecoder;
/// let data = std::fs::read("image.png").unwrap();
/// let mut decoder = PngDecoder::new(&data);
///
/// decoder.decode_headers().unwrap();
/// let (width, height) = decoder.get_dimensions().unwrap();
/// let pixels = decoder.decode_raw().unwrap();
/// ```
pub struct PngDecoder<'a> {
    pub(crate) seen_hdr:     bool,
    pub(crate) seen_headers: bool,
    pub(crate) seen_image:   bool,
    pub(crate) stream:       ZByteReader<'a>,
    pub(crate) options:      DecoderOptions,
    pub(crate) png_info:     PngInfo,
    pub(crate) idat_chunks:  Vec<u8>
}

impl<'a> PngDecoder<'a> {
    /// Create a new decoder which will read the png from `data`
    /// using default options
    pub fn new(data: &'a [u8]) -> PngDecoder<'a> {
        let default_opt = DecoderOptions::default();

        PngDecoder::new_with_options(data, default_opt)
    }

    /// Create a new decoder with the given options
    ///
    /// Respected options are the maximum dimensions, strict mode
    /// and the inflate checksum and limit options
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PngDecoder<'a> {
        PngDecoder {
            seen_hdr: false,
            seen_headers: false,
            seen_image: false,
            stream: ZByteReader::new(data),
            options,
            png_info: PngInfo::default(),
            idat_chunks: Vec::with_capacity(37)
        }
    }

    /// Get image dimensions as `(width, height)`
    ///
    /// Returns `None` if the headers haven't been decoded
    pub const fn get_dimensions(&self) -> Option<(usize, usize)> {
        if !self.seen_hdr {
            return None;
        }

        Some((self.png_info.width, self.png_info.height))
    }

    /// Get the colorspace of decoded pixels
    ///
    /// Returns `None` if the headers haven't been decoded
    pub const fn get_colorspace(&self) -> Option<ColorSpace> {
        if !self.seen_hdr {
            return None;
        }
        match self.png_info.color {
            PngColor::Luma => Some(ColorSpace::Luma),
            PngColor::LumaA => Some(ColorSpace::LumaA),
            PngColor::RGB => Some(ColorSpace::RGB),
            PngColor::RGBA => Some(ColorSpace::RGBA),
            // rejected when parsing IHDR
            PngColor::Palette => None
        }
    }

    /// Get image information
    ///
    /// Returns `None` if the headers haven't been decoded
    pub const fn get_info(&self) -> Option<&PngInfo> {
        if !self.seen_hdr {
            return None;
        }
        Some(&self.png_info)
    }

    /// Size of the buffer `decode_into` needs,
    /// i.e `width * height * bytes per pixel`
    ///
    /// Returns `None` if the headers haven't been decoded
    /// or the size does not fit in a `usize`
    pub fn output_buffer_size(&self) -> Option<usize> {
        if !self.seen_hdr {
            return None;
        }
        self.png_info
            .width
            .checked_mul(self.png_info.height)?
            .checked_mul(usize::from(self.png_info.component))
    }

    /// Size of the inflated data, each row has a filter byte
    fn filtered_size(&self) -> Option<usize> {
        self.png_info
            .width
            .checked_mul(usize::from(self.png_info.component))?
            .checked_add(1)?
            .checked_mul(self.png_info.height)
    }

    fn read_chunk_header(&mut self) -> Result<PngChunk, PngDecodeErrors> {
        if !self.stream.has(CHUNK_HEADER_SIZE) {
            return Err(PngDecodeErrors::TruncatedInput(
                CHUNK_HEADER_SIZE,
                self.stream.remaining()
            ));
        }
        // Format is length - chunk type - [data] -  crc chunk
        let chunk_length = self.stream.get_u32_be_err()? as usize;
        let chunk_type_int = self.stream.get_u32_be_err()?.to_be_bytes();

        let chunk_type = PngChunkType::from_bytes(&chunk_type_int);

        trace!("Chunk {:?}, length {}", chunk_type, chunk_length);

        let needed = chunk_length.saturating_add(CHUNK_CRC_SIZE);

        if !self.stream.has(needed) {
            return Err(PngDecodeErrors::ChunkLengthMismatch {
                chunk:    chunk_type_int,
                expected: needed,
                found:    self.stream.remaining()
            });
        }

        Ok(PngChunk {
            length: chunk_length,
            chunk: chunk_type_int,
            chunk_type
        })
    }

    /// Decode headers of the png
    ///
    /// Reads the signature and every chunk before the first IDAT,
    /// after this image information is available via [`get_info`](Self::get_info)
    /// and friends.
    ///
    /// Calling this more than once is a no-op
    pub fn decode_headers(&mut self) -> Result<(), PngDecodeErrors> {
        if self.seen_headers {
            return Ok(());
        }
        // READ PNG signature
        let signature = self
            .stream
            .get_u64_be_err()
            .map_err(|_| PngDecodeErrors::NotAPng)?;

        if signature != PNG_SIGNATURE {
            return Err(PngDecodeErrors::NotAPng);
        }

        // check if first chunk is ihdr here
        if self.stream.peek_at(4, 4)? != b"IHDR" {
            return Err(PngDecodeErrors::GenericStatic(
                "First chunk not IHDR, Corrupt PNG"
            ));
        }

        loop {
            let header = self.read_chunk_header()?;

            match header.chunk_type {
                PngChunkType::IHDR => {
                    self.parse_ihdr(header)?;
                }
                PngChunkType::IDAT => {
                    // read_image_chunks picks up from here
                    self.stream.rewind(CHUNK_HEADER_SIZE);
                    break;
                }
                PngChunkType::IEND => {
                    return Err(PngDecodeErrors::TruncatedInput(
                        self.filtered_size().unwrap_or(usize::MAX),
                        0
                    ));
                }
                _ => self.skip_chunk(header)?
            }
        }
        self.seen_headers = true;

        Ok(())
    }

    /// Read IDAT chunks and whatever follows them until IEND
    fn read_image_chunks(&mut self) -> Result<(), PngDecodeErrors> {
        loop {
            if self.stream.eof() && !self.idat_chunks.is_empty() {
                if self.options.strict_mode() {
                    return Err(PngDecodeErrors::TruncatedInput(
                        CHUNK_HEADER_SIZE + CHUNK_CRC_SIZE,
                        0
                    ));
                }
                warn!("No IEND chunk, the image may be truncated");
                break;
            }

            let header = self.read_chunk_header()?;

            match header.chunk_type {
                PngChunkType::IHDR => {
                    // errors out, IHDR was already seen
                    self.parse_ihdr(header)?;
                }
                PngChunkType::IDAT => {
                    self.parse_idat(header)?;
                }
                PngChunkType::IEND => {
                    trace!("IEND reached");
                    break;
                }
                _ => self.skip_chunk(header)?
            }
        }

        if self.idat_chunks.is_empty() {
            return Err(PngDecodeErrors::TruncatedInput(
                self.filtered_size().unwrap_or(usize::MAX),
                0
            ));
        }
        Ok(())
    }

    /// Decode the png into a caller provided buffer
    ///
    /// The buffer must be at least [`output_buffer_size`](Self::output_buffer_size)
    /// bytes, only that many bytes are written.
    ///
    /// Nothing is written to `out` unless the whole image
    /// inflates and all filter types are valid.
    ///
    /// A decoder decodes its image once, calling this or
    /// [`decode_raw`](Self::decode_raw)/[`decode`](Self::decode) again
    /// returns an error.
    pub fn decode_into(&mut self, out: &mut [u8]) -> Result<(), PngDecodeErrors> {
        let size = self.checked_output_size()?;

        if out.len() < size {
            return Err(PngDecodeErrors::TooSmallOutput(size, out.len()));
        }

        let deflate_data = self.read_and_inflate()?;

        self.create_png_image_raw(&deflate_data, &mut out[..size])
    }

    /// Decode the png returning a vector of raw pixels
    ///
    /// The vector holds `width * height * bytes per pixel` bytes,
    /// see [`get_colorspace`](Self::get_colorspace) for the channel layout
    pub fn decode_raw(&mut self) -> Result<Vec<u8>, PngDecodeErrors> {
        let size = self.checked_output_size()?;

        // inflate before allocating, a corrupt header
        // shouldn't cost us a huge zeroed buffer
        let deflate_data = self.read_and_inflate()?;

        let mut out = vec![0; size];

        self.create_png_image_raw(&deflate_data, &mut out)?;

        Ok(out)
    }

    fn checked_output_size(&mut self) -> Result<usize, PngDecodeErrors> {
        self.decode_headers()?;

        self.output_buffer_size()
            .ok_or(PngDecodeErrors::GenericStatic(
                "Image dimensions overflow addressable memory"
            ))
    }

    /// Collect IDAT chunks and inflate them
    fn read_and_inflate(&mut self) -> Result<Vec<u8>, PngDecodeErrors> {
        if self.seen_image {
            return Err(PngDecodeErrors::GenericStatic(
                "Image data already consumed, a decoder decodes one image once"
            ));
        }
        self.seen_image = true;

        self.read_image_chunks()?;

        // go parse IDAT chunks returning the inflate
        let deflate_data = self.inflate()?;
        // remove idat chunks from memory
        // we are already done with them.
        self.idat_chunks = Vec::new();

        Ok(deflate_data)
    }

    /// Decode the png returning the pixels together with
    /// the image geometry
    pub fn decode(&mut self) -> Result<DecodedImage, PngDecodeErrors> {
        let pixels = self.decode_raw()?;

        let colorspace = self
            .get_colorspace()
            .ok_or(PngDecodeErrors::GenericStatic("Unknown colorspace"))?;

        Ok(DecodedImage {
            width: self.png_info.width,
            height: self.png_info.height,
            bytes_per_pixel: usize::from(self.png_info.component),
            colorspace,
            pixels
        })
    }

    /// Undo deflate decoding
    fn inflate(&self) -> Result<Vec<u8>, PngDecodeErrors> {
        // deflate doesn't store its uncompressed size, but for
        // non-interlaced images we know exactly what it should be
        let size_hint = self.filtered_size().unwrap_or(0);

        let options = DeflateOptions::default()
            .set_size_hint(size_hint)
            .set_limit(self.options.inflate_get_limit())
            .set_confirm_checksum(self.options.inflate_get_confirm_adler());

        let mut decoder = DeflateDecoder::new_with_options(&self.idat_chunks, options);

        Ok(decoder.decode_zlib()?)
    }

    /// Create the png data from post deflated data
    ///
    /// `out` must be exactly `width * height * bytes per pixel` bytes
    fn create_png_image_raw(&self, deflate_data: &[u8], out: &mut [u8]) -> Result<(), PngDecodeErrors> {
        let info = &self.png_info;
        let components = usize::from(info.component);

        // bytes per scanline without the filter byte
        let width_stride = info.width * components;
        // each chunk is a width stride of filtered data plus the filter type
        let chunk_size = width_stride + 1;
        let expected = chunk_size * info.height;

        if deflate_data.len() < expected {
            return Err(PngDecodeErrors::TruncatedInput(expected, deflate_data.len()));
        }
        if deflate_data.len() > expected {
            if self.options.strict_mode() {
                return Err(PngDecodeErrors::Generic(format!(
                    "Extra data after image, expected {expected} bytes but found {}",
                    deflate_data.len()
                )));
            }
            warn!(
                "Ignoring {} bytes after the last scanline",
                deflate_data.len() - expected
            );
        }

        // confirm every filter type before touching the output
        for in_stride in deflate_data.chunks_exact(chunk_size).take(info.height) {
            if FilterMethod::from_int(in_stride[0]).is_none() {
                return Err(PngDecodeErrors::InvalidFilterType(in_stride[0]));
            }
        }

        let mut prev_row_start = 0;
        let mut first_row = true;
        let mut out_position = 0;

        for in_stride in deflate_data.chunks_exact(chunk_size).take(info.height) {
            // Split output into current and previous
            // current points to the start of the row where we are writing de-filtered output to
            // prev is all rows we already wrote output to.
            let (prev, current) = out.split_at_mut(out_position);
            let current = &mut current[..width_stride];

            // the row above, empty for the first row whose filters
            // don't read it
            let mut prev_row: &[u8] = &[];

            if !first_row {
                prev_row = &prev[prev_row_start..prev_row_start + width_stride];
                prev_row_start += width_stride;
            }

            out_position += width_stride;

            // take filter
            let filter_byte = in_stride[0];
            // raw image bytes
            let raw = &in_stride[1..];

            // get it's type
            let mut filter = FilterMethod::from_int(filter_byte)
                .ok_or(PngDecodeErrors::InvalidFilterType(filter_byte))?;

            if first_row {
                // match our filters to special filters for first row
                // these special filters do not need the previous scanline and treat it
                // as zero
                filter = filter.first_row();
                first_row = false;
            }

            match filter {
                FilterMethod::None => current.copy_from_slice(raw),

                FilterMethod::Average => handle_avg(prev_row, raw, current, components),

                FilterMethod::Sub => handle_sub(raw, current, components),

                FilterMethod::Up => handle_up(prev_row, raw, current),

                FilterMethod::Paeth => handle_paeth(prev_row, raw, current, components),

                FilterMethod::PaethFirst => handle_paeth_first(raw, current, components),

                FilterMethod::AvgFirst => handle_avg_first(raw, current, components)
            }
        }

        Ok(())
    }
}
