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

//! Pluggable compression strategies (§4.1).
//!
//! `CompressionStrategy` is the wire-level tag stored in the distribution
//! map (§6.1's `compressionStrategy` byte); each variant's `compress`/
//! `decompress` pair is a thin wrapper over a single crate.

mod brotli_strategy;
mod gzip_strategy;

use crate::error::Result;

/// Extensions whose payload is assumed already compressed; picking Brotli
/// on top of these would waste time for no size benefit (§4.1).
const ALREADY_COMPRESSED_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "rar", "7z", "bz2", "xz", "tgz", "zst", "lz", "lz4", "cab",
];

/// Compression strategy tag, wire-compatible with §6.1's one-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStrategy {
    Brotli = 0,
    Gzip = 1,
    None = 2,
}

impl CompressionStrategy {
    pub fn from_wire(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Brotli),
            1 => Ok(Self::Gzip),
            2 => Ok(Self::None),
            other => Err(crate::error::PixVeilError::MapCorrupt {
                reason: format!("unknown compression strategy tag {other}"),
            }),
        }
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }

    pub fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Brotli => brotli_strategy::compress(data),
            Self::Gzip => gzip_strategy::compress(data),
            Self::None => data.to_vec(),
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Brotli => brotli_strategy::decompress(data),
            Self::Gzip => gzip_strategy::decompress(data),
            Self::None => Ok(data.to_vec()),
        }
    }

    /// Heuristic payload-compression choice from §4.1: skip compression
    /// when the secret's filename suggests it's already compressed,
    /// otherwise use Brotli.
    pub fn choose_for_filename(filename: &str) -> Self {
        let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        if ALREADY_COMPRESSED_EXTENSIONS.contains(&ext.as_str()) {
            Self::None
        } else {
            Self::Brotli
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_roundtrip() {
        for (strategy, tag) in [
            (CompressionStrategy::Brotli, 0u8),
            (CompressionStrategy::Gzip, 1u8),
            (CompressionStrategy::None, 2u8),
        ] {
            assert_eq!(strategy.to_wire(), tag);
            assert_eq!(CompressionStrategy::from_wire(tag).unwrap(), strategy);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let result = CompressionStrategy::from_wire(3);
        assert!(matches!(result, Err(crate::error::PixVeilError::MapCorrupt { .. })));
    }

    #[test]
    fn test_choose_for_filename_skips_compressed_extensions() {
        assert_eq!(
            CompressionStrategy::choose_for_filename("archive.zip"),
            CompressionStrategy::None
        );
        assert_eq!(
            CompressionStrategy::choose_for_filename("backup.TAR.GZ".to_lowercase().as_str()),
            CompressionStrategy::None
        );
        assert_eq!(
            CompressionStrategy::choose_for_filename("notes.txt"),
            CompressionStrategy::Brotli
        );
    }

    #[test]
    fn test_none_is_identity() {
        let data = b"some payload bytes";
        let compressed = CompressionStrategy::None.compress(data);
        assert_eq!(compressed, data);
        let decompressed = CompressionStrategy::None.decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }
}
