/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// States of the block decoder
///
/// Every block starts at `BlockHeader`, chooses how its data is
/// coded and, for Huffman coded blocks, moves on to `Symbols`.
/// After the block ends we either go back to `BlockHeader` or,
/// if that was the final block, to `Done`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeflateState {
    BlockHeader,
    Stored,
    FixedHuffman,
    DynamicHuffman,
    Symbols,
    Done
}
