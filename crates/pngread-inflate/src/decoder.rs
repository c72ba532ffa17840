/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#[cfg(feature = "zlib")]
use alloc::format;
use alloc::vec::Vec;

use log::trace;

use crate::bitstream::BitStreamReader;
use crate::constants::{
    DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, DEFLATE_BLOCKTYPE_STATIC, DEFLATE_BLOCKTYPE_UNCOMPRESSED,
    DEFLATE_END_OF_BLOCK, DEFLATE_LENGTH_BASE, DEFLATE_LENGTH_EXTRA_BITS, DEFLATE_NUM_LITLEN_SYMS,
    DEFLATE_NUM_OFFSET_SYMS, DEFLATE_NUM_PRECODE_SYMS, DEFLATE_OFFSET_BASE,
    DEFLATE_OFFSET_EXTRA_BITS, DEFLATE_PRECODE_LENS_PERMUTATION
};
use crate::enums::DeflateState;
use crate::errors::{BackRefErrors, InflateDecodeErrors};
use crate::huffman::HuffmanTable;
#[cfg(feature = "zlib")]
use crate::utils::calc_adler_hash;
use crate::window::SlidingWindow;

/// Options that can influence decompression
/// in Deflate/Zlib
///
/// # Example
/// ```
/// use pngread_inflate::DeflateOptions;
///
/// let options = DeflateOptions::default()
///     .set_limit(1 << 20)
///     .set_confirm_checksum(false);
///
/// assert_eq!(options.get_limit(), 1 << 20);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct DeflateOptions {
    limit:            usize,
    confirm_checksum: bool,
    size_hint:        usize
}

impl Default for DeflateOptions {
    fn default() -> Self {
        DeflateOptions {
            limit:            1 << 30,
            confirm_checksum: true,
            size_hint:        37000
        }
    }
}

impl DeflateOptions {
    /// Get deflate/zlib limit option
    ///
    /// The decoder won't extend the inbuilt limit and will
    /// return an error if the limit is exceeded
    ///
    /// # Returns
    /// The currently set limit of the instance
    pub const fn get_limit(&self) -> usize {
        self.limit
    }
    /// Set a limit to the internal vector
    /// used to store decoded zlib/deflate output.
    ///
    /// # Arguments
    /// limit: The new decompressor limit
    /// # Returns
    /// A modified version of DeflateDecoder
    #[must_use]
    pub fn set_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Get whether the decoder will confirm a checksum
    /// after decoding
    pub const fn get_confirm_checksum(&self) -> bool {
        self.confirm_checksum
    }
    /// Set whether the decoder should confirm a checksum
    /// after decoding
    ///
    /// Note, you should definitely confirm your checksum, use this
    /// with caution, otherwise data returned may be corrupt
    ///
    /// # Arguments
    /// - confirm: Whether the decoder should confirm a checksum after decoding
    #[must_use]
    pub fn set_confirm_checksum(mut self, confirm: bool) -> Self {
        self.confirm_checksum = confirm;
        self
    }

    /// Get the default size hint for the decompressor
    ///
    /// The decompressor initializes the internal storage for decompressed bytes
    /// with this size and will reallocate the vec if the decompressed size becomes bigger
    /// than this, but when the caller knows the size of data before decompression,
    /// setting this to the right value saves reallocations
    pub const fn get_size_hint(&self) -> usize {
        self.size_hint
    }
    /// Set the size hint for the decompressor
    ///
    /// This can be used to prevent multiple re-allocations
    #[must_use]
    pub const fn set_size_hint(mut self, hint: usize) -> Self {
        self.size_hint = hint;
        self
    }
}

/// Literal/length and offset tables used by one huffman block
struct BlockCodes {
    litlen: HuffmanTable,
    offset: HuffmanTable
}

impl BlockCodes {
    /// Tables for fixed huffman blocks, RFC 1951 section 3.2.6
    ///
    /// Symbols 286, 287 and offsets 30, 31 get codes so that
    /// their use reports a reserved symbol rather than an unmatched code.
    fn fixed() -> Result<BlockCodes, InflateDecodeErrors> {
        let mut lens = [0_u8; DEFLATE_NUM_LITLEN_SYMS];

        lens[000..144].fill(8);
        lens[144..256].fill(9);
        lens[256..280].fill(7);
        lens[280..288].fill(8);

        Ok(BlockCodes {
            litlen: HuffmanTable::new(&lens)?,
            offset: HuffmanTable::new(&[5; DEFLATE_NUM_OFFSET_SYMS])?
        })
    }
}

/// A deflate and zlib decoder
///
/// The decoder works on a complete in-memory stream and returns
/// all decompressed bytes at once.
///
/// # Example
/// ```
/// use pngread_inflate::DeflateDecoder;
/// // a single stored block holding "hi"
/// let data = [1, 2, 0, 253, 255, b'h', b'i'];
///
/// let mut decoder = DeflateDecoder::new(&data);
/// assert_eq!(decoder.decode_deflate().unwrap(), b"hi");
/// ```
pub struct DeflateDecoder<'a> {
    data:     &'a [u8],
    position: usize,
    options:  DeflateOptions
}

impl<'a> DeflateDecoder<'a> {
    /// Create a new decompressor that will read compressed
    /// data from `data` and return a new vector containing new data
    ///
    /// # Arguments
    /// - `data`: The compressed data. Data can be of any type,
    ///  gzip, zlib or raw deflate.
    ///
    /// # Returns
    /// A decoder instance which will pull compressed data from `data` to inflate the output output
    pub fn new(data: &'a [u8]) -> DeflateDecoder<'a> {
        let options = DeflateOptions::default();

        Self::new_with_options(data, options)
    }
    /// Create new decoder with specified options
    ///
    /// This can be used to fine tune the decoder to the user's
    /// needs.
    ///
    /// # Arguments
    /// - `data`: The compressed data. Data can be of any format i.e
    ///  gzip, zlib or raw deflate.
    /// - `options` : A set of user defined options which tune how the decompressor
    ///
    /// # Returns
    /// A decoder instance which will pull compressed data from `data` to inflate output
    pub fn new_with_options(data: &'a [u8], options: DeflateOptions) -> DeflateDecoder<'a> {
        DeflateDecoder {
            data,
            position: 0,
            options
        }
    }

    /// Number of input bytes consumed by the last decode
    pub const fn bytes_consumed(&self) -> usize {
        self.position
    }

    /// Decode zlib-encoded data returning the uncompressed in a `Vec<u8>`
    /// or an error if something went wrong.
    ///
    /// Bytes past the adler trailer are left untouched.
    ///
    /// # Errors
    /// - [`InvalidZlibHeader`](InflateDecodeErrors::InvalidZlibHeader) for a header we can't handle
    /// - [`EndOfInput`](InflateDecodeErrors::EndOfInput) if the stream or its trailer is cut short
    /// - [`MismatchedAdler`](InflateDecodeErrors::MismatchedAdler) if checksum confirmation is on
    ///   and the checksum does not match
    /// - Any error the deflate stream itself can produce
    #[cfg(feature = "zlib")]
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateDecodeErrors> {
        let header = self
            .data
            .get(self.position..self.position + 2)
            .ok_or(InflateDecodeErrors::EndOfInput)?;

        // Zlib flags
        // See https://www.ietf.org/rfc/rfc1950.txt for
        // the RFC
        let cmf = header[0];
        let flg = header[1];

        let cm = cmf & 0xF;
        let cinfo = cmf >> 4;

        // confirm we have the right deflate methods
        if cm != 8 {
            return Err(InflateDecodeErrors::InvalidZlibHeader(format!(
                "Unknown zlib compression method {cm}"
            )));
        }
        if cinfo > 7 {
            return Err(InflateDecodeErrors::InvalidZlibHeader(format!(
                "Unknown cinfo `{cinfo}` greater than 7, not allowed"
            )));
        }
        let flag_checks = (u16::from(cmf) * 256) + u16::from(flg);

        if flag_checks % 31 != 0 {
            return Err(InflateDecodeErrors::InvalidZlibHeader(format!(
                "FCHECK integrity not preserved, {flag_checks} is not a multiple of 31"
            )));
        }
        if (flg >> 5) & 1 == 1 {
            return Err(InflateDecodeErrors::InvalidZlibHeader(
                "Preset dictionaries are not supported".into()
            ));
        }

        self.position += 2;

        let out = self.inflate()?;

        let trailer = self
            .data
            .get(self.position..self.position + 4)
            .ok_or(InflateDecodeErrors::EndOfInput)?;

        let expected = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);

        self.position += 4;

        if self.options.confirm_checksum {
            let found = calc_adler_hash(&out);

            if expected != found {
                return Err(InflateDecodeErrors::MismatchedAdler(expected, found));
            }
        }

        Ok(out)
    }

    /// Decode a raw deflate stream returning the uncompressed bytes
    ///
    /// # Errors
    /// - [`EndOfInput`](InflateDecodeErrors::EndOfInput) if the stream is cut short
    /// - [`InvalidBlockType`](InflateDecodeErrors::InvalidBlockType),
    ///   [`InvalidStoredBlock`](InflateDecodeErrors::InvalidStoredBlock),
    ///   [`InvalidHuffmanCode`](InflateDecodeErrors::InvalidHuffmanCode) and
    ///   [`InvalidBackReference`](InflateDecodeErrors::InvalidBackReference) for corrupt streams
    /// - [`OutputLimitExceeded`](InflateDecodeErrors::OutputLimitExceeded) if output grows
    ///   past the configured limit
    pub fn decode_deflate(&mut self) -> Result<Vec<u8>, InflateDecodeErrors> {
        self.inflate()
    }

    /// Run the block state machine over `data[position..]`
    ///
    /// On success `position` points to the first byte after the stream.
    fn inflate(&mut self) -> Result<Vec<u8>, InflateDecodeErrors> {
        let data = self
            .data
            .get(self.position..)
            .ok_or(InflateDecodeErrors::EndOfInput)?;

        let mut stream = BitStreamReader::new(data);
        let mut window = SlidingWindow::new();
        let mut out = Vec::with_capacity(self.options.size_hint.min(self.options.limit));

        let mut state = DeflateState::BlockHeader;
        let mut is_last_block = false;

        // fixed tables are built on first use and kept for later fixed blocks
        let mut fixed_codes: Option<BlockCodes> = None;
        let mut dynamic_codes: Option<BlockCodes> = None;
        let mut use_fixed_codes = false;

        loop {
            match state {
                DeflateState::BlockHeader => {
                    is_last_block = stream.read_bit()? == 1;

                    let block_type = stream.read_bits(2)? as u8;

                    trace!("BFINAL: {is_last_block}, BTYPE: {block_type}");

                    state = match block_type {
                        DEFLATE_BLOCKTYPE_UNCOMPRESSED => DeflateState::Stored,
                        DEFLATE_BLOCKTYPE_STATIC => DeflateState::FixedHuffman,
                        DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN => DeflateState::DynamicHuffman,
                        _ => return Err(InflateDecodeErrors::InvalidBlockType(block_type))
                    };
                }
                DeflateState::Stored => {
                    self.copy_stored_block(&mut stream, &mut window, &mut out)?;

                    state = end_of_block(is_last_block);
                }
                DeflateState::FixedHuffman => {
                    if fixed_codes.is_none() {
                        fixed_codes = Some(BlockCodes::fixed()?);
                    }
                    use_fixed_codes = true;
                    state = DeflateState::Symbols;
                }
                DeflateState::DynamicHuffman => {
                    dynamic_codes = Some(read_dynamic_codes(&mut stream)?);
                    use_fixed_codes = false;
                    state = DeflateState::Symbols;
                }
                DeflateState::Symbols => {
                    let codes = if use_fixed_codes {
                        fixed_codes.as_ref()
                    } else {
                        dynamic_codes.as_ref()
                    }
                    .ok_or(InflateDecodeErrors::InvalidHuffmanCode(
                        "No huffman tables for block"
                    ))?;

                    self.decode_symbols(&mut stream, codes, &mut window, &mut out)?;

                    state = end_of_block(is_last_block);
                }
                DeflateState::Done => break
            }
        }

        self.position += stream.bytes_consumed();

        trace!(
            "Inflated {} bytes from {} input bytes",
            window.produced(),
            stream.bytes_consumed()
        );

        Ok(out)
    }

    /// Ensure `extra` more bytes fit under the output limit
    #[inline(always)]
    fn check_limit(&self, out: &[u8], extra: usize) -> Result<(), InflateDecodeErrors> {
        let new_len = out.len().saturating_add(extra);

        if new_len > self.options.limit {
            return Err(InflateDecodeErrors::OutputLimitExceeded(
                self.options.limit,
                new_len
            ));
        }
        Ok(())
    }

    fn copy_stored_block(
        &self, stream: &mut BitStreamReader, window: &mut SlidingWindow, out: &mut Vec<u8>
    ) -> Result<(), InflateDecodeErrors> {
        /*
         * Uncompressed block: copy 'len' bytes literally from the input
         * buffer to the output buffer.
         *
         * The RFC says that
         * skip any remaining bits in current partially
         *       processed byte
         *     read LEN and NLEN (see next section)
         *     copy LEN bytes of data to output
         */
        stream.align_to_byte();

        let len = stream.read_bits(16)? as u16;
        let nlen = stream.read_bits(16)? as u16;

        if len != !nlen {
            return Err(InflateDecodeErrors::InvalidStoredBlock(len, nlen));
        }
        trace!("Stored block of {len} bytes");

        self.check_limit(out, usize::from(len))?;

        let bytes = stream.read_aligned_bytes(usize::from(len))?;

        window.extend(bytes, out);

        Ok(())
    }

    /// Decode literal/length and distance symbols until the end of block symbol
    fn decode_symbols(
        &self, stream: &mut BitStreamReader, codes: &BlockCodes, window: &mut SlidingWindow,
        out: &mut Vec<u8>
    ) -> Result<(), InflateDecodeErrors> {
        loop {
            let symbol = codes.litlen.decode(stream)?;

            if symbol < DEFLATE_END_OF_BLOCK {
                self.check_limit(out, 1)?;
                window.push(symbol as u8, out);
                continue;
            }
            if symbol == DEFLATE_END_OF_BLOCK {
                return Ok(());
            }

            let length_index = usize::from(symbol - 257);

            let (length_base, length_bits) = DEFLATE_LENGTH_BASE
                .get(length_index)
                .zip(DEFLATE_LENGTH_EXTRA_BITS.get(length_index))
                .ok_or(InflateDecodeErrors::InvalidBackReference(
                    BackRefErrors::ReservedLengthSymbol(symbol)
                ))?;

            let length = usize::from(*length_base) + stream.read_bits(*length_bits)? as usize;

            let offset_symbol = codes.offset.decode(stream)?;
            let offset_index = usize::from(offset_symbol);

            let (offset_base, offset_bits) = DEFLATE_OFFSET_BASE
                .get(offset_index)
                .zip(DEFLATE_OFFSET_EXTRA_BITS.get(offset_index))
                .ok_or(InflateDecodeErrors::InvalidBackReference(
                    BackRefErrors::ReservedDistanceSymbol(offset_symbol)
                ))?;

            let distance = usize::from(*offset_base) + stream.read_bits(*offset_bits)? as usize;

            self.check_limit(out, length)?;

            window.copy_match(length, distance, out)?;
        }
    }
}

const fn end_of_block(is_last_block: bool) -> DeflateState {
    if is_last_block {
        DeflateState::Done
    } else {
        DeflateState::BlockHeader
    }
}

/// Read the code lengths of a dynamic huffman block and build its tables
fn read_dynamic_codes(stream: &mut BitStreamReader) -> Result<BlockCodes, InflateDecodeErrors> {
    // Read codeword lengths
    let num_litlen_syms = 257 + stream.read_bits(5)? as usize;
    let num_offset_syms = 1 + stream.read_bits(5)? as usize;
    let num_explicit_precode_lens = 4 + stream.read_bits(4)? as usize;

    trace!(
        "HLIT: {num_litlen_syms}, HDIST: {num_offset_syms}, HCLEN: {num_explicit_precode_lens}"
    );

    let mut precode_lens = [0_u8; DEFLATE_NUM_PRECODE_SYMS];

    for i in DEFLATE_PRECODE_LENS_PERMUTATION
        .iter()
        .take(num_explicit_precode_lens)
    {
        precode_lens[usize::from(*i)] = stream.read_bits(3)? as u8;
    }

    let precode = HuffmanTable::new(&precode_lens)?;

    /* Decode the litlen and offset codeword lengths. */
    let total_syms = num_litlen_syms + num_offset_syms;

    let mut lens = [0_u8; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS];
    let mut i = 0;

    while i < total_syms {
        let presym = precode.decode(stream)?;

        let (rep_val, rep_count) = match presym {
            // explicit codeword length
            0..=15 => {
                lens[i] = presym as u8;
                i += 1;
                continue;
            }
            // repeat previous length three to 6 times
            16 => {
                if i == 0 {
                    return Err(InflateDecodeErrors::InvalidHuffmanCode(
                        "Repeat of previous length with no previous length"
                    ));
                }
                (lens[i - 1], 3 + stream.read_bits(2)? as usize)
            }
            // repeat zero 3 - 10 times
            17 => (0, 3 + stream.read_bits(3)? as usize),
            // repeat zero 11-138 times
            18 => (0, 11 + stream.read_bits(7)? as usize),
            _ => {
                return Err(InflateDecodeErrors::InvalidHuffmanCode(
                    "Unknown code length symbol"
                ))
            }
        };

        if i + rep_count > total_syms {
            return Err(InflateDecodeErrors::InvalidHuffmanCode(
                "Code length repeat runs past the number of codes"
            ));
        }
        lens[i..i + rep_count].fill(rep_val);

        i += rep_count;
    }

    if lens[usize::from(DEFLATE_END_OF_BLOCK)] == 0 {
        return Err(InflateDecodeErrors::InvalidHuffmanCode(
            "End of block symbol has no code"
        ));
    }

    Ok(BlockCodes {
        litlen: HuffmanTable::new(&lens[..num_litlen_syms])?,
        offset: HuffmanTable::new(&lens[num_litlen_syms..total_syms])?
    })
}
