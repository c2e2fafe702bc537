// Copyright 2025 Niclas Hedam
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{PixVeilError, Result};
use std::io::{Cursor, Read, Write};

const BUFFER_SIZE: usize = 4096;
const QUALITY: u32 = 9;
const LG_WINDOW_SIZE: u32 = 22;

pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer =
            brotli::CompressorWriter::new(&mut out, BUFFER_SIZE, QUALITY, LG_WINDOW_SIZE);
        writer
            .write_all(data)
            .expect("writing to an in-memory buffer cannot fail");
    }
    out
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut reader = brotli::Decompressor::new(Cursor::new(data), BUFFER_SIZE);
    reader
        .read_to_end(&mut out)
        .map_err(|e| PixVeilError::MapCorrupt {
            reason: format!("brotli decompression failed: {e}"),
        })?;
    Ok(out)
}
