/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Canonical huffman decoding tables
//!
//! Deflate only transmits code lengths, the codes themselves are
//! implied: codes of equal length are consecutive integers assigned in
//! increasing symbol order, and the first code of length `l + 1` is
//! `(first code of length l + number of codes of length l) << 1`.
//!
//! Instead of materializing each code we keep the symbols sorted by
//! (length, symbol) together with how many codes each length has.
//! That is enough to walk the code space one bit at a time, every length
//! owns a contiguous range of code values and a contiguous run of
//! sorted symbols.
use crate::bitstream::BitStreamReader;
use crate::constants::{DEFLATE_MAX_CODEWORD_LENGTH, DEFLATE_MAX_NUM_SYMS};
use crate::errors::InflateDecodeErrors;

#[derive(Clone)]
pub struct HuffmanTable {
    /// `len_counts[l]` is the number of symbols whose code is `l` bits long
    len_counts:       [u16; DEFLATE_MAX_CODEWORD_LENGTH + 1],
    /// Used symbols ordered by code length and then by symbol value,
    /// i.e in lexicographic order of their codes
    sorted_syms:      [u16; DEFLATE_MAX_NUM_SYMS],
    /// Length of the longest code, decoding gives up after reading this many bits
    max_codeword_len: usize
}

impl HuffmanTable {
    /// Build a decoding table from per-symbol code lengths
    ///
    /// A length of zero means the symbol is unused.
    ///
    /// Incomplete codes are accepted, bit patterns outside of the
    /// code only fail if they are actually read. An empty code is accepted
    /// too, e.g a block without matches may send no distance codes.
    ///
    /// # Errors
    /// [`InvalidHuffmanCode`](InflateDecodeErrors::InvalidHuffmanCode) if the lengths
    /// overflow the code space, a length is above 15 or there are more than
    /// 288 symbols
    pub fn new(lens: &[u8]) -> Result<HuffmanTable, InflateDecodeErrors> {
        if lens.len() > DEFLATE_MAX_NUM_SYMS {
            return Err(InflateDecodeErrors::InvalidHuffmanCode(
                "Too many symbols for a huffman table"
            ));
        }

        let mut len_counts = [0_u16; DEFLATE_MAX_CODEWORD_LENGTH + 1];
        let mut offsets = [0_u16; DEFLATE_MAX_CODEWORD_LENGTH + 2];
        let mut sorted_syms = [0_u16; DEFLATE_MAX_NUM_SYMS];

        // count how many codewords have each length, including 0.
        for len in lens {
            let len = usize::from(*len);

            if len > DEFLATE_MAX_CODEWORD_LENGTH {
                return Err(InflateDecodeErrors::InvalidHuffmanCode(
                    "Code length larger than 15 bits"
                ));
            }
            len_counts[len] += 1;
        }
        // unused symbols take no part in the code
        len_counts[0] = 0;

        /*
         * Determine the actual maximum codeword length that was used
         */
        let mut max_codeword_len = DEFLATE_MAX_CODEWORD_LENGTH;

        while max_codeword_len > 0 && len_counts[max_codeword_len] == 0 {
            max_codeword_len -= 1;
        }

        /*
         * Check whether the lengths form a complete code (exactly fills the
         * codespace), an incomplete code (doesn't fill the codespace), or an
         * overfull code (overflows the codespace).  A codeword of length 'n'
         * uses proportion '1/(2^n)' of the codespace.  An overfull code is
         * nonsensical, so is considered invalid.
         */
        let mut codespace_left = 1_i32;

        for count in &len_counts[1..] {
            codespace_left <<= 1;
            codespace_left -= i32::from(*count);

            if codespace_left < 0 {
                return Err(InflateDecodeErrors::InvalidHuffmanCode(
                    "Code lengths overflow the code space"
                ));
            }
        }

        /*
         * Sort the symbols primarily by increasing codeword length and
         * secondarily by increasing symbol value; or equivalently by their
         * codewords in lexicographic order, since a canonical code is assumed.
         */
        for len in 1..=DEFLATE_MAX_CODEWORD_LENGTH {
            offsets[len + 1] = offsets[len] + len_counts[len];
        }

        for (sym, len) in lens.iter().enumerate() {
            let len = usize::from(*len);

            if len != 0 {
                sorted_syms[usize::from(offsets[len])] = sym as u16;
                offsets[len] += 1;
            }
        }

        Ok(HuffmanTable {
            len_counts,
            sorted_syms,
            max_codeword_len
        })
    }

    /// Decode one symbol from the stream
    ///
    /// Bits are read one at a time, each one appended to the code read
    /// so far.  Codes of a given length occupy the range
    /// `first..first + count`, so once the accumulated code falls in
    /// that range we have our symbol, otherwise we skip the range and
    /// try the next length.
    ///
    /// # Errors
    /// - [`EndOfInput`](InflateDecodeErrors::EndOfInput) if the stream ends mid-code
    /// - [`InvalidHuffmanCode`](InflateDecodeErrors::InvalidHuffmanCode) if no code matches
    ///   after reading as many bits as the longest code
    #[inline]
    pub fn decode(&self, stream: &mut BitStreamReader) -> Result<u16, InflateDecodeErrors> {
        // bits read so far
        let mut code = 0_i32;
        // first code of the current length
        let mut first = 0_i32;
        // position in sorted_syms of the first symbol of the current length
        let mut index = 0_i32;

        for len in 1..=self.max_codeword_len {
            code |= stream.read_bit()? as i32;

            let count = i32::from(self.len_counts[len]);

            if code - first < count {
                return Ok(self.sorted_syms[(index + code - first) as usize]);
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }

        Err(InflateDecodeErrors::InvalidHuffmanCode(
            "Bits do not match any code in the table"
        ))
    }

    /// Length of the longest code in this table, zero for an empty table
    pub const fn max_codeword_len(&self) -> usize {
        self.max_codeword_len
    }

    /// Number of symbols with a code
    pub fn num_used_symbols(&self) -> usize {
        self.len_counts.iter().map(|x| usize::from(*x)).sum()
    }
}

#[cfg(test)]
mod tests {
    use nanorand::Rng;

    use super::HuffmanTable;
    use crate::bitstream::BitStreamReader;
    use crate::errors::InflateDecodeErrors;

    /// Assign canonical codes to symbols the RFC 1951 3.2.2 way
    fn canonical_codes(lens: &[u8]) -> Vec<Option<(u32, u8)>> {
        let mut bl_count = [0_u32; 16];
        let mut next_code = [0_u32; 16];

        for len in lens {
            bl_count[usize::from(*len)] += 1;
        }
        bl_count[0] = 0;

        let mut code = 0;

        for bits in 1..16 {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }
        lens.iter()
            .map(|len| {
                if *len == 0 {
                    return None;
                }
                let code = next_code[usize::from(*len)];
                next_code[usize::from(*len)] += 1;
                Some((code, *len))
            })
            .collect()
    }

    /// Pack codes the way deflate stores them, most significant code
    /// bit first, filling each byte from its least significant bit.
    fn pack_codes(codes: &[(u32, u8)]) -> Vec<u8> {
        let mut out = vec![];
        let mut bit_pos = 0;

        for (code, len) in codes {
            for i in (0..*len).rev() {
                if bit_pos % 8 == 0 {
                    out.push(0);
                }
                let bit = ((code >> i) & 1) as u8;
                *out.last_mut().unwrap() |= bit << (bit_pos % 8);
                bit_pos += 1;
            }
        }
        out
    }

    fn assert_prefix_free(codes: &[Option<(u32, u8)>]) {
        let used: Vec<(u32, u8)> = codes.iter().flatten().copied().collect();

        for (i, (code_a, len_a)) in used.iter().enumerate() {
            for (code_b, len_b) in used.iter().skip(i + 1) {
                let shorter = (*len_a).min(*len_b);
                // compare the leading `shorter` bits of both codes
                let prefix_a = code_a >> (len_a - shorter);
                let prefix_b = code_b >> (len_b - shorter);
                assert_ne!(prefix_a, prefix_b, "one code prefixes the other");
            }
        }
    }

    fn assert_decodes_every_symbol(lens: &[u8]) {
        let codes = canonical_codes(lens);
        assert_prefix_free(&codes);

        let table = HuffmanTable::new(lens).unwrap();
        let symbols: Vec<usize> = (0..lens.len()).filter(|x| lens[*x] != 0).collect();
        let used: Vec<(u32, u8)> = symbols.iter().map(|x| codes[*x].unwrap()).collect();
        let packed = pack_codes(&used);

        let mut stream = BitStreamReader::new(&packed);

        for symbol in symbols {
            assert_eq!(usize::from(table.decode(&mut stream).unwrap()), symbol);
        }
    }

    #[test]
    fn rfc_example_codes() {
        // Example from RFC 1951 section 3.2.2, (3, 3, 3, 3, 3, 2, 4, 4)
        let lens = [3, 3, 3, 3, 3, 2, 4, 4];
        let codes = canonical_codes(&lens);

        assert_eq!(codes[0], Some((0b010, 3)));
        assert_eq!(codes[5], Some((0b00, 2)));
        assert_eq!(codes[6], Some((0b1110, 4)));
        assert_eq!(codes[7], Some((0b1111, 4)));

        assert_decodes_every_symbol(&lens);
    }

    #[test]
    fn fixed_literal_code_round_trips() {
        let mut lens = [0_u8; 288];
        lens[..144].fill(8);
        lens[144..256].fill(9);
        lens[256..280].fill(7);
        lens[280..].fill(8);

        assert_decodes_every_symbol(&lens);

        let table = HuffmanTable::new(&lens).unwrap();
        assert_eq!(table.max_codeword_len(), 9);
        assert_eq!(table.num_used_symbols(), 288);
    }

    #[test]
    fn sparse_code_with_gaps() {
        let lens = [0, 2, 0, 3, 3, 0, 1, 0, 0, 4, 4];
        assert_decodes_every_symbol(&lens);
    }

    /// Random code lengths obeying the Kraft inequality for `num_syms` symbols
    ///
    /// Leaves of a full binary tree are split at random, so the code is
    /// complete unless `complete` is false, in which case one leaf is dropped.
    fn random_lengths(rand: &mut nanorand::WyRand, num_syms: usize, complete: bool) -> Vec<u8> {
        let mut lens = vec![0_u8; num_syms];

        if num_syms == 1 {
            // a lone symbol is always an incomplete code
            lens[0] = rand.generate_range(1_u8..16);
            return lens;
        }

        let num_leaves = rand.generate_range(2_usize..num_syms + 1);
        let mut leaves = vec![1_u8, 1];

        while leaves.len() < num_leaves {
            let leaf = rand.generate_range(0..leaves.len());

            if leaves[leaf] < 15 {
                leaves[leaf] += 1;
                leaves.push(leaves[leaf]);
            }
        }
        if !complete {
            let leaf = rand.generate_range(0..leaves.len());
            leaves.swap_remove(leaf);
        }

        // scatter the leaves over the alphabet
        let mut positions: Vec<usize> = (0..num_syms).collect();

        for i in 0..leaves.len() {
            let j = rand.generate_range(i..num_syms);
            positions.swap(i, j);
            lens[positions[i]] = leaves[i];
        }
        lens
    }

    fn kraft_sum(lens: &[u8]) -> u32 {
        lens.iter()
            .filter(|len| **len != 0)
            .map(|len| 1_u32 << (15 - len))
            .sum()
    }

    #[test]
    fn random_valid_lengths_build_prefix_free_codes() {
        let mut rand = nanorand::WyRand::new_seed(0x5EED);

        for round in 0..500 {
            let num_syms = rand.generate_range(1_usize..289);
            let complete = round % 2 == 0 && num_syms > 1;

            let lens = random_lengths(&mut rand, num_syms, complete);

            if complete {
                assert_eq!(kraft_sum(&lens), 1 << 15, "{lens:?}");
            } else {
                assert!(kraft_sum(&lens) < 1 << 15, "{lens:?}");
            }

            assert_prefix_free(&canonical_codes(&lens));
            assert_decodes_every_symbol(&lens);
        }
    }

    #[test]
    fn overfull_code_is_rejected() {
        let lens = [1, 1, 1];

        assert!(matches!(
            HuffmanTable::new(&lens),
            Err(InflateDecodeErrors::InvalidHuffmanCode(_))
        ));
    }

    #[test]
    fn long_lengths_are_rejected() {
        assert!(HuffmanTable::new(&[16, 1]).is_err());
    }

    #[test]
    fn incomplete_code_fails_on_unused_pattern() {
        // a single one bit code, symbol 3 gets code `0`
        let lens = [0, 0, 0, 1];
        let table = HuffmanTable::new(&lens).unwrap();

        let mut stream = BitStreamReader::new(&[0b0000_0010]);
        assert_eq!(table.decode(&mut stream).unwrap(), 3);
        assert!(matches!(
            table.decode(&mut stream),
            Err(InflateDecodeErrors::InvalidHuffmanCode(_))
        ));
    }

    #[test]
    fn empty_code_never_decodes() {
        let table = HuffmanTable::new(&[0; 30]).unwrap();
        let mut stream = BitStreamReader::new(&[0xFF]);

        assert_eq!(table.max_codeword_len(), 0);
        assert!(table.decode(&mut stream).is_err());
    }
}
