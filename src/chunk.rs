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

//! Splits the encrypted payload into variably-sized chunks (§4.5).
//!
//! Chunk sizing is randomized but not security-sensitive: it only affects
//! how the payload is sliced before placement, never its confidentiality.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A contiguous slice of the encrypted payload, identified by a dense,
/// zero-based `chunk_id` assigned in payload order (§3).
#[derive(Debug, Clone)]
pub struct Chunk {
    pub chunk_id: u32,
    pub data: Vec<u8>,
}

/// Fixed seed used when `PixVeilRng::Test` is requested, so the splitter's
/// randomness is reproducible in tests (§4.5).
pub const TEST_SEED: u64 = 0x5EED_C0DE_CAFE_F00D;

/// Splits `payload` into chunks with sizes drawn uniformly from
/// `[min_chunk_size, max_chunk_size]`, clamped to the bytes remaining.
/// `seed` is `Some(seed)` in test mode and `None` to draw from system
/// entropy, per §4.5.
pub fn split(payload: &[u8], min_chunk_size: usize, max_chunk_size: usize, seed: Option<u64>) -> Vec<Chunk> {
    let mut rng: ChaCha8Rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut chunks = Vec::new();
    let mut offset = 0usize;
    let mut next_id = 0u32;

    while offset < payload.len() {
        let remaining = payload.len() - offset;
        let upper = max_chunk_size.min(remaining);
        let lower = min_chunk_size.min(upper);
        let size = if lower >= upper {
            upper
        } else {
            rng.gen_range(lower..=upper)
        };

        chunks.push(Chunk {
            chunk_id: next_id,
            data: payload[offset..offset + size].to_vec(),
        });
        offset += size;
        next_id += 1;
    }

    chunks
}
