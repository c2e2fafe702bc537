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

//! The distribution map: its data model, deterministic channel-sequence
//! function, and its binary `mapContent` layout (§3, §4.6, §6.1).
//!
//! The outer magic-framed, encrypted-and-compressed blob that wraps a
//! serialized map lives in `map_codec`; this module only handles
//! `mapContent` itself.

use crate::compression::CompressionStrategy;
use crate::error::{PixVeilError, Result};
use crate::serialize::{write_bytes16, write_string16, Reader};

/// One color plane of one pixel. Alpha is reserved on the wire but never
/// selected for payload (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    R = 0,
    G = 1,
    B = 2,
    A = 3,
}

impl Channel {
    fn from_wire(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::R),
            1 => Ok(Self::G),
            2 => Ok(Self::B),
            3 => Ok(Self::A),
            other => Err(PixVeilError::MapCorrupt {
                reason: format!("invalid channel value {other}"),
            }),
        }
    }

    fn to_wire(self) -> u8 {
        self as u8
    }
}

/// One immutable placement decision, fixed once the placement engine
/// assigns a chunk (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionMapEntry {
    pub chunk_id: u32,
    pub png_file: String,
    pub start_channel_position: u32,
    pub end_channel_position: u32,
    pub bits_per_channel: u8,
    pub channel_sequence: [Channel; 3],
}

impl DistributionMapEntry {
    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.chunk_id.to_be_bytes());
        write_string16(out, &self.png_file);
        out.extend_from_slice(&self.start_channel_position.to_be_bytes());
        out.extend_from_slice(&self.end_channel_position.to_be_bytes());
        out.push(self.bits_per_channel);
        out.push(self.channel_sequence.len() as u8);
        out.push(pack_channel_sequence(&self.channel_sequence));
    }

    fn read(reader: &mut Reader) -> Result<Self> {
        let chunk_id = reader.read_u32()?;
        let png_file = reader.read_string16()?;
        let start_channel_position = reader.read_u32()?;
        let end_channel_position = reader.read_u32()?;
        let bits_per_channel = reader.read_u8()?;
        let channel_seq_len = reader.read_u8()?;
        let packed_len = (channel_seq_len as usize).div_ceil(4);
        let packed = reader.read_bytes(packed_len)?;
        let channel_sequence = unpack_channel_sequence(packed, channel_seq_len)?;

        Ok(Self {
            chunk_id,
            png_file,
            start_channel_position,
            end_channel_position,
            bits_per_channel,
            channel_sequence,
        })
    }
}

/// Packs a 3-element channel sequence into one byte: 2 bits per channel,
/// high-order bits first (§6.1's `channelSeqPacked` for `channelSeqLen = 3`).
fn pack_channel_sequence(seq: &[Channel; 3]) -> u8 {
    let mut byte = 0u8;
    for (i, ch) in seq.iter().enumerate() {
        let shift = (3 - (i % 4)) * 2;
        byte |= ch.to_wire() << shift;
    }
    byte
}

fn unpack_channel_sequence(packed: &[u8], len: u8) -> Result<[Channel; 3]> {
    if len != 3 {
        return Err(PixVeilError::MapCorrupt {
            reason: format!("unsupported channel sequence length {len}, expected 3"),
        });
    }
    let byte = packed.first().copied().unwrap_or(0);
    let mut seq = [Channel::R, Channel::G, Channel::B];
    for (i, slot) in seq.iter_mut().enumerate() {
        let shift = (3 - (i % 4)) * 2;
        *slot = Channel::from_wire((byte >> shift) & 0b11)?;
    }
    Ok(seq)
}

/// xorshift32, seeded per §4.6/§9. This is a deliberately small, fully
/// specified PRNG chosen so `channelSequence` is reproducible from source;
/// it is NOT the reference implementation's JS "seedrandom" library and is
/// therefore a documented wire break (see DESIGN.md).
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        // xorshift32 is undefined at state 0; nudge away from it.
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in `[0, bound)` via rejection-free modulo; `bound` is
    /// always tiny here (<= 3), so the modulo bias is negligible.
    fn next_below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}

/// Deterministic per-chunk channel permutation (§4.6): seed the PRNG from
/// `chunk-<chunkId>` hashed with SHA-256, take the first 4 bytes as a
/// `u32`, then Fisher-Yates shuffle `[R, G, B]`.
pub fn channel_sequence(chunk_id: u32) -> [Channel; 3] {
    use sha2::{Digest, Sha256};

    let seed_input = format!("chunk-{chunk_id}");
    let digest = Sha256::digest(seed_input.as_bytes());
    let seed = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);

    let mut rng = XorShift32::new(seed);
    let mut seq = [Channel::R, Channel::G, Channel::B];
    for i in (1..seq.len()).rev() {
        let j = rng.next_below((i + 1) as u32) as usize;
        seq.swap(i, j);
    }
    seq
}

/// The self-describing binary record enumerating chunk placements (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionMap {
    pub entries: Vec<DistributionMapEntry>,
    /// Raw SHA-256 digest bytes (32 bytes) over the full encrypted payload.
    pub checksum: [u8; 32],
    pub original_filename: String,
    pub encrypted_data_length: u32,
    pub compression_strategy: CompressionStrategy,
}

impl DistributionMap {
    /// Serializes `mapContent` per §6.1 (everything after the outer
    /// magic+size framing, which `map_codec` adds).
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for entry in &self.entries {
            entry.write(&mut out);
        }
        write_bytes16(&mut out, &self.checksum);
        write_string16(&mut out, &self.original_filename);
        out.extend_from_slice(&self.encrypted_data_length.to_be_bytes());
        out.push(self.compression_strategy.to_wire());
        out
    }

    /// Deserializes `mapContent`. Any structural problem (truncation,
    /// unknown compression tag, bad UTF-8) surfaces as `MapCorrupt`.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let entry_count = reader.read_u32()?;

        // Guard against a corrupt count causing an unreasonable allocation.
        if entry_count as usize > data.len() {
            return Err(PixVeilError::MapCorrupt {
                reason: format!(
                    "entry count {entry_count} implausible for a {}-byte map",
                    data.len()
                ),
            });
        }

        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(DistributionMapEntry::read(&mut reader)?);
        }

        let checksum_bytes = reader.read_bytes16()?;
        let checksum: [u8; 32] = checksum_bytes.as_slice().try_into().map_err(|_| {
            PixVeilError::MapCorrupt {
                reason: format!(
                    "checksum field is {} bytes, expected 32",
                    checksum_bytes.len()
                ),
            }
        })?;

        let original_filename = reader.read_string16()?;
        let encrypted_data_length = reader.read_u32()?;
        let compression_strategy = CompressionStrategy::from_wire(reader.read_u8()?)?;

        Ok(Self {
            entries,
            checksum,
            original_filename,
            encrypted_data_length,
            compression_strategy,
        })
    }

    /// Every `[start, end)` range pair targeting the same carrier is
    /// pairwise disjoint (§3 invariant 1, §8 non-overlap property).
    pub fn has_non_overlapping_ranges(&self) -> bool {
        use std::collections::HashMap;
        let mut by_file: HashMap<&str, Vec<(u32, u32)>> = HashMap::new();
        for entry in &self.entries {
            by_file
                .entry(entry.png_file.as_str())
                .or_default()
                .push((entry.start_channel_position, entry.end_channel_position));
        }
        for ranges in by_file.values_mut() {
            ranges.sort_unstable();
            for pair in ranges.windows(2) {
                if pair[0].1 > pair[1].0 {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(chunk_id: u32, start: u32, end: u32) -> DistributionMapEntry {
        DistributionMapEntry {
            chunk_id,
            png_file: "carrier_0.png".to_string(),
            start_channel_position: start,
            end_channel_position: end,
            bits_per_channel: 2,
            channel_sequence: [Channel::R, Channel::G, Channel::B],
        }
    }

    #[test]
    fn test_channel_sequence_is_a_permutation_and_deterministic() {
        for chunk_id in 0..50u32 {
            let seq = channel_sequence(chunk_id);
            let again = channel_sequence(chunk_id);
            assert_eq!(seq, again, "chunk_id {chunk_id} must be deterministic");

            let mut sorted = seq;
            sorted.sort_by_key(|c| c.to_wire());
            assert_eq!(sorted, [Channel::R, Channel::G, Channel::B]);
        }
    }

    #[test]
    fn test_channel_sequence_varies_across_chunk_ids() {
        // Not every chunk id can produce the same permutation across a
        // reasonably sized sample, or the "deterministic from chunkId"
        // property would be vacuous.
        let sequences: std::collections::HashSet<_> =
            (0..20u32).map(channel_sequence).collect();
        assert!(sequences.len() > 1);
    }

    #[test]
    fn test_map_serialize_deserialize_roundtrip() {
        // Arrange: two entries per the §8 scenario 2 fixture
        let map = DistributionMap {
            entries: vec![sample_entry(1, 0, 100), sample_entry(2, 100, 200)],
            checksum: [0xABu8; 32],
            original_filename: "file.ext".to_string(),
            encrypted_data_length: 1024,
            compression_strategy: CompressionStrategy::Brotli,
        };

        // Act
        let bytes = map.serialize();
        let decoded = DistributionMap::deserialize(&bytes).unwrap();

        // Assert
        assert_eq!(decoded, map);
    }

    #[test]
    fn test_pack_unpack_channel_sequence_all_permutations() {
        let perms = [
            [Channel::R, Channel::G, Channel::B],
            [Channel::R, Channel::B, Channel::G],
            [Channel::G, Channel::R, Channel::B],
            [Channel::G, Channel::B, Channel::R],
            [Channel::B, Channel::R, Channel::G],
            [Channel::B, Channel::G, Channel::R],
        ];
        for seq in perms {
            let packed = pack_channel_sequence(&seq);
            let unpacked = unpack_channel_sequence(&[packed], 3).unwrap();
            assert_eq!(unpacked, seq);
        }
    }

    #[test]
    fn test_non_overlap_detection() {
        // Arrange: overlapping ranges on the same carrier
        let map = DistributionMap {
            entries: vec![sample_entry(0, 0, 100), sample_entry(1, 50, 150)],
            checksum: [0u8; 32],
            original_filename: "f".to_string(),
            encrypted_data_length: 10,
            compression_strategy: CompressionStrategy::None,
        };

        assert!(!map.has_non_overlapping_ranges());
    }

    #[test]
    fn test_disjoint_ranges_pass() {
        let map = DistributionMap {
            entries: vec![sample_entry(0, 0, 100), sample_entry(1, 100, 200)],
            checksum: [0u8; 32],
            original_filename: "f".to_string(),
            encrypted_data_length: 10,
            compression_strategy: CompressionStrategy::None,
        };

        assert!(map.has_non_overlapping_ranges());
    }

    #[test]
    fn test_deserialize_truncated_is_map_corrupt() {
        let result = DistributionMap::deserialize(&[0, 0, 0, 5]);
        assert!(matches!(result, Err(PixVeilError::MapCorrupt { .. })));
    }

    #[test]
    fn test_deserialize_unknown_compression_is_map_corrupt() {
        // Arrange: a valid zero-entry map with an invalid compression tag
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_be_bytes()); // entry count
        write_bytes16(&mut bytes, &[0u8; 32]); // checksum
        write_string16(&mut bytes, "f"); // filename
        bytes.extend_from_slice(&0u32.to_be_bytes()); // encrypted data length
        bytes.push(99); // invalid compression tag

        // Act
        let result = DistributionMap::deserialize(&bytes);

        // Assert
        assert!(matches!(result, Err(PixVeilError::MapCorrupt { .. })));
    }
}
