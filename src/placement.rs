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

//! Chunk placement (§4.6): choosing, for each chunk, which carrier and
//! which channel range will hold it, while respecting the per-carrier
//! chunk cap, tone preference, and the reserved map prefix.
//!
//! Every reservation here — the map's own prefix and each chunk's span —
//! starts on a pixel boundary and occupies the bitmap up to the next one,
//! even though a chunk's own recorded `[start, end)` may end a few channels
//! short of that boundary (§3 invariant 2 still holds for the recorded
//! span). This guarantees pixel-exclusive ownership: no two entries ever
//! share a pixel, which is what lets `channel_io.rs` apply each entry's own
//! `channelSequence` as a write-order permutation without one entry's
//! sequence corrupting another's physically co-located channel.

use crate::bitio::ChannelBitmap;
use crate::channel_io::channels_needed;
use crate::chunk::Chunk;
use crate::distribution_map::{channel_sequence, DistributionMapEntry};
use crate::error::{PixVeilError, Result};
use crate::map_codec::MAGIC_BYTES;
use crate::tone::{pixel_tones, Tone};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

/// One candidate carrier: its basename (as recorded in the map), its
/// per-channel tones, and a channel occupancy bitmap.
pub struct CarrierInfo {
    pub file_name: String,
    pub path: PathBuf,
    pub tones: Vec<Tone>,
    pub rgb_channel_count: usize,
}

impl CarrierInfo {
    pub fn from_image(path: &Path, image: &crate::image_adapter::RawImage) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            tones: pixel_tones(image),
            rgb_channel_count: image.rgb_channel_count(),
        }
    }
}

/// Mutable per-carrier state threaded through placement: occupancy bitmap
/// and how many chunks have already landed here (§4.6's per-carrier cap).
struct CarrierState {
    info: CarrierInfo,
    bitmap: ChannelBitmap,
    chunks_placed: usize,
}

/// Upper bound on the magic-framed map blob's channel footprint, computed
/// before placement so the designated map carrier's prefix can be reserved
/// ahead of time (§4.7). The map's real size depends on the entries that
/// placement itself produces, so this must over-estimate using only
/// quantities known before placement runs:
///
/// - one entry per chunk, each using `max_file_name_len` for its variable
///   `pngFile` field (the true upper bound across all candidate carriers)
/// - a fixed per-entry overhead for the rest of `DistributionMapEntry`'s wire layout
/// - the map's fixed fields (checksum, original filename, length, compression tag)
/// - a flat safety margin for Brotli's own framing overhead on small inputs
/// - AES-256-CBC/PKCS#7's worst-case padding (+16 bytes) and a 16-byte IV
/// - the outer `MAGIC_BYTES || u32 size` framing
pub fn estimate_map_reservation_channels(
    chunk_count: usize,
    max_file_name_len: usize,
    original_filename_len: usize,
    map_bits_per_channel: u8,
) -> usize {
    const FIXED_ENTRY_OVERHEAD: usize = 4 + 2 + 4 + 4 + 1 + 1 + 1; // chunk_id, pngFile len prefix, start, end, bpc, seq len, seq packed
    const MAP_FIXED_OVERHEAD: usize = 4 + 2 + 32 + 2 + 4 + 1; // entry count, checksum len prefix+bytes, filename len prefix, enc length, compression tag
    const COMPRESSION_MARGIN: usize = 64;
    const AES_BLOCK: usize = 16;

    let per_entry = FIXED_ENTRY_OVERHEAD + max_file_name_len;
    let content_len = MAP_FIXED_OVERHEAD + original_filename_len + chunk_count * per_entry;
    let compressed_upper_bound = content_len + COMPRESSION_MARGIN;
    let padded_len = (compressed_upper_bound / AES_BLOCK + 1) * AES_BLOCK;
    let ciphertext_len = AES_BLOCK + padded_len; // IV + padded ciphertext
    let blob_len = MAGIC_BYTES.len() + 4 + ciphertext_len;

    channels_needed(blob_len, map_bits_per_channel)
}

/// Rounds `n` up to the next multiple of 3, so a channel count always spans
/// a whole number of pixels.
fn pad_to_pixel_boundary(n: usize) -> usize {
    n.div_ceil(3) * 3
}

/// Assigns every chunk a carrier and channel range, returning the resulting
/// distribution-map entries and the basename of the carrier chosen to hold
/// the map itself (lexicographically smallest, per §4.7).
///
/// `carriers` must be non-empty. Reserves the map carrier's prefix before
/// placing any chunk so no entry's range can collide with where the map
/// will later be written.
pub fn place_chunks(
    chunks: &[Chunk],
    carriers: Vec<CarrierInfo>,
    bits_per_channel: u8,
    map_bits_per_channel: u8,
    max_chunks_per_png: usize,
    rng_seed: Option<u64>,
) -> Result<(Vec<DistributionMapEntry>, String)> {
    if carriers.is_empty() {
        return Err(PixVeilError::InvalidConfig {
            reason: "at least one carrier image is required".to_string(),
        });
    }

    let mut states: Vec<CarrierState> = carriers
        .into_iter()
        .map(|info| {
            let bitmap = ChannelBitmap::new(info.rgb_channel_count);
            CarrierState {
                info,
                bitmap,
                chunks_placed: 0,
            }
        })
        .collect();
    states.sort_by(|a, b| a.info.file_name.cmp(&b.info.file_name));

    let map_carrier_name = states[0].info.file_name.clone();
    let max_file_name_len = states
        .iter()
        .map(|s| s.info.file_name.len())
        .max()
        .unwrap_or(0);
    // Most filesystems cap a single path component at 255 bytes; used as a
    // conservative stand-in since the map's real `originalFilename` isn't
    // threaded through to placement.
    let original_filename_upper_bound = 255;
    let reservation = estimate_map_reservation_channels(
        chunks.len(),
        max_file_name_len,
        original_filename_upper_bound,
        map_bits_per_channel,
    );
    let reservation_padded = pad_to_pixel_boundary(reservation);
    if reservation_padded > states[0].bitmap.len() {
        return Err(PixVeilError::InsufficientCapacity {
            chunk_id: 0,
            chunk_size: reservation,
        });
    }
    states[0].bitmap.mark_range(0, reservation_padded);

    let mut rng = match rng_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut entries = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let sequence = channel_sequence(chunk.chunk_id);
        let channels_required = channels_needed(chunk.data.len(), bits_per_channel);

        let placed = place_one_chunk(
            &mut states,
            channels_required,
            max_chunks_per_png,
            &mut rng,
        )
        .ok_or_else(|| PixVeilError::InsufficientCapacity {
            chunk_id: chunk.chunk_id,
            chunk_size: chunk.data.len(),
        })?;

        entries.push(DistributionMapEntry {
            chunk_id: chunk.chunk_id,
            png_file: placed.file_name,
            start_channel_position: placed.start as u32,
            end_channel_position: (placed.start + channels_required) as u32,
            bits_per_channel,
            channel_sequence: sequence,
        });
    }

    Ok((entries, map_carrier_name))
}

struct Placement {
    file_name: String,
    start: usize,
}

/// Finds a carrier with room for `channels_required` and marks that range
/// (padded up to a whole number of pixels) occupied, preferring carriers
/// under the per-carrier chunk cap, lowest tone first (§4.6's tone
/// priority: low before mid before high).
fn place_one_chunk(
    states: &mut [CarrierState],
    channels_required: usize,
    max_chunks_per_png: usize,
    rng: &mut ChaCha8Rng,
) -> Option<Placement> {
    let padded_required = pad_to_pixel_boundary(channels_required);
    let mut order: Vec<usize> = (0..states.len())
        .filter(|&i| states[i].chunks_placed < max_chunks_per_png)
        .collect();
    order.sort_by_key(|&i| states[i].info.tones.iter().min().copied().unwrap_or(Tone::High));

    for idx in order {
        if let Some(start) = find_free_range(&states[idx], channels_required, rng) {
            states[idx].bitmap.mark_range(start, start + padded_required);
            states[idx].chunks_placed += 1;
            return Some(Placement {
                file_name: states[idx].info.file_name.clone(),
                start,
            });
        }
    }
    None
}

/// Looks for `channels_required` contiguous free channels in `state`,
/// starting only at pixel-aligned positions and reserving up to the next
/// pixel boundary, preferring low-tone pixel ranges via randomized probing
/// before falling back to an exhaustive left-to-right scan (§4.6). A
/// pixel-aligned start guarantees that two entries with disjoint position
/// ranges never share a pixel, which `channel_io.rs` relies on to apply
/// each entry's own `channelSequence` safely.
fn find_free_range(state: &CarrierState, channels_required: usize, rng: &mut ChaCha8Rng) -> Option<usize> {
    let total = state.bitmap.len();
    let padded_required = pad_to_pixel_boundary(channels_required);
    if padded_required == 0 || padded_required > total {
        return None;
    }
    let last_start = total - padded_required;

    let mut low_tone_starts: Vec<usize> = (0..=last_start)
        .step_by(3)
        .filter(|&start| {
            let pixel_idx = start / 3;
            state.info.tones.get(pixel_idx) == Some(&Tone::Low)
        })
        .collect();

    const PROBE_ATTEMPTS: usize = 32;
    for _ in 0..PROBE_ATTEMPTS.min(low_tone_starts.len().max(1)) {
        if low_tone_starts.is_empty() {
            break;
        }
        let idx = rng.gen_range(0..low_tone_starts.len());
        let candidate = low_tone_starts.swap_remove(idx);
        if state.bitmap.range_is_clear(candidate, candidate + padded_required) {
            return Some(candidate);
        }
    }

    (0..=last_start)
        .step_by(3)
        .find(|&start| state.bitmap.range_is_clear(start, start + padded_required))
}
