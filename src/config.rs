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

//! Tunables for the encode and decode pipelines, validated once at `INIT`.

use crate::compression::CompressionStrategy;
use crate::error::{PixVeilError, Result};

/// Default number of LSBs used per payload channel.
pub const DEFAULT_BITS_PER_CHANNEL: u8 = 2;

/// Bits per channel used for the distribution-map prefix, fixed by §4.7.
pub const MAP_BITS_PER_CHANNEL: u8 = 2;

/// Default cap on chunks placed in a single carrier.
pub const DEFAULT_MAX_CHUNKS_PER_PNG: usize = 16;

const MIN_ALLOWED_CHUNK_SIZE: usize = 16;
const DEFAULT_MIN_CHUNK_SIZE: usize = 16;
const DEFAULT_MAX_CHUNK_SIZE: usize = 4096;

/// Configuration for an encode run.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub bits_per_channel: u8,
    pub max_chunks_per_png: usize,
    pub compression: CompressionRequest,
    pub verify: bool,
    pub debug_visuals: bool,
    /// Seeds the chunk splitter (§4.5), the placement engine's
    /// candidate-start probing (§4.6), and the payload/map IV generation
    /// (§4.2). `None` draws from system entropy everywhere; `Some(seed)`
    /// makes an encode run byte-for-byte reproducible, which is what §8's
    /// determinism property exercises. Not security-sensitive either way.
    pub rng_seed: Option<u64>,
}

/// How the payload's compression strategy should be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionRequest {
    /// Heuristic selection per §4.1: skip already-compressed extensions, else Brotli.
    Auto,
    Explicit(CompressionStrategy),
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            bits_per_channel: DEFAULT_BITS_PER_CHANNEL,
            max_chunks_per_png: DEFAULT_MAX_CHUNKS_PER_PNG,
            compression: CompressionRequest::Auto,
            verify: false,
            debug_visuals: false,
            rng_seed: None,
        }
    }
}

impl EncodeConfig {
    /// Validates the configuration, surfacing `InvalidConfig` on any
    /// violation of the boundary rules in §3/§8 of the distribution-map spec.
    pub fn validate(&self) -> Result<()> {
        if self.min_chunk_size < MIN_ALLOWED_CHUNK_SIZE {
            return Err(PixVeilError::InvalidConfig {
                reason: format!(
                    "min_chunk_size must be >= {MIN_ALLOWED_CHUNK_SIZE}, got {}",
                    self.min_chunk_size
                ),
            });
        }
        if self.max_chunk_size < self.min_chunk_size {
            return Err(PixVeilError::InvalidConfig {
                reason: format!(
                    "max_chunk_size ({}) must be >= min_chunk_size ({})",
                    self.max_chunk_size, self.min_chunk_size
                ),
            });
        }
        if !(1..=8).contains(&self.bits_per_channel) {
            return Err(PixVeilError::InvalidConfig {
                reason: format!(
                    "bits_per_channel must be in [1, 8], got {}",
                    self.bits_per_channel
                ),
            });
        }
        if self.max_chunks_per_png == 0 {
            return Err(PixVeilError::InvalidConfig {
                reason: "max_chunks_per_png must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration for a decode run. Decode has no tunables that affect
/// correctness (everything needed is self-described by the map), but it
/// keeps the same shape as `EncodeConfig` for symmetry in the orchestrators.
#[derive(Debug, Clone, Default)]
pub struct DecodeConfig {}
