/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Scanline de-filtering routines
//!
//! Each function undoes one filter type for a single row,
//! `raw` is the filtered row (without its filter byte), `current` is
//! where the reconstructed row goes and `prev_row` is the already
//! reconstructed row above it.
//!
//! `components` is the number of bytes per complete pixel, i.e the
//! distance to the byte on the left of the same channel.
//!
//! All arithmetic wraps modulo 256.

pub fn handle_sub(raw: &[u8], current: &mut [u8], components: usize) {
    if current.len() < components || raw.len() < components {
        return;
    }
    // handle leftmost pixel explicitly
    current[..components].copy_from_slice(&raw[..components]);

    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len());

    for i in components..end {
        let a = current[i - components];
        current[i] = raw[i].wrapping_add(a);
    }
}

pub fn handle_up(prev_row: &[u8], raw: &[u8], current: &mut [u8]) {
    for ((filt, recon), up) in raw.iter().zip(current).zip(prev_row) {
        *recon = (*filt).wrapping_add(*up)
    }
}

pub fn handle_avg(prev_row: &[u8], raw: &[u8], current: &mut [u8], components: usize) {
    if raw.len() < components || current.len() < components || prev_row.len() < components {
        return;
    }

    // handle leftmost pixel explicitly, left is treated as zero
    for i in 0..components {
        current[i] = raw[i].wrapping_add(prev_row[i] >> 1);
    }
    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len()).min(prev_row.len());

    for i in components..end {
        let a = current[i - components];
        let b = prev_row[i];

        // find average, with overflow handling
        // from standford bit-hacks.
        // This lets us keep the implementations using
        // 8 bits
        let c = (a & b) + ((a ^ b) >> 1);

        current[i] = raw[i].wrapping_add(c);
    }
}

pub fn handle_paeth(prev_row: &[u8], raw: &[u8], current: &mut [u8], components: usize) {
    if raw.len() < components || current.len() < components || prev_row.len() < components {
        return;
    }

    // handle leftmost pixel explicitly, left and upper left are zero
    // so the predictor always picks the byte above
    for i in 0..components {
        current[i] = raw[i].wrapping_add(paeth(0, prev_row[i], 0));
    }
    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len()).min(prev_row.len());

    for i in components..end {
        let paeth_res = paeth(
            current[i - components],
            prev_row[i],
            prev_row[i - components]
        );
        current[i] = raw[i].wrapping_add(paeth_res)
    }
}

/// Handle images with the first scanline as paeth scanline
///
/// Special in that the above row is treated as zero
pub fn handle_paeth_first(raw: &[u8], current: &mut [u8], components: usize) {
    if raw.len() < components || current.len() < components {
        return;
    }

    // handle leftmost pixel explicitly
    current[..components].copy_from_slice(&raw[..components]);

    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len());

    for i in components..end {
        let paeth_res = paeth(current[i - components], 0, 0);
        current[i] = raw[i].wrapping_add(paeth_res)
    }
}

/// Handle images with the first scanline as an average scanline
///
/// The above row is treated as zero
pub fn handle_avg_first(raw: &[u8], current: &mut [u8], components: usize) {
    if raw.len() < components || current.len() < components {
        return;
    }

    // handle leftmost pixel explicitly
    current[..components].copy_from_slice(&raw[..components]);

    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len());

    for i in components..end {
        let avg = current[i - components] >> 1;
        current[i] = raw[i].wrapping_add(avg)
    }
}

/// The paeth predictor
///
/// Picks whichever of left (`a`), above (`b`) and upper left (`c`)
/// is closest to `a + b - c`, ties go to `a`, then `b`.
#[inline(always)]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let a = i16::from(a);
    let b = i16::from(b);
    let c = i16::from(c);
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        return a as u8;
    }
    if pb <= pc {
        return b as u8;
    }
    c as u8
}
