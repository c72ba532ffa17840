/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A simple implementation of a bytestream reader
//! with endian aware reads over an in-memory buffer.
pub use reader::{ZByteIoError, ZByteReader};

mod reader;
