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

//! Reads placed chunks back out of carrier PNGs and reassembles the
//! encrypted payload (§4.8). Recovering the distribution map itself is
//! `map_codec`'s job; this module only consumes an already-recovered map.

use crate::channel_io::extract_byte;
use crate::distribution_map::DistributionMapEntry;
use crate::error::Result;
use crate::image_adapter::RawImage;
use std::collections::HashMap;
use std::path::Path;

/// Reads one entry's chunk bytes back out of `image`.
pub fn extract_entry(image: &RawImage, entry: &DistributionMapEntry) -> Vec<u8> {
    let channel_span = (entry.end_channel_position - entry.start_channel_position) as usize;
    let byte_len = channel_span / crate::channel_io::channels_per_byte(entry.bits_per_channel);

    let mut pos = entry.start_channel_position as usize;
    let mut bytes = Vec::with_capacity(byte_len);
    for _ in 0..byte_len {
        let (byte, next) = extract_byte(image, &entry.channel_sequence, entry.bits_per_channel, pos);
        bytes.push(byte);
        pos = next;
    }
    bytes
}

/// Groups `entries` by carrier, loading each carrier once, then
/// reassembles the encrypted payload by ascending `chunk_id`, truncated to
/// `encrypted_data_length` (§4.8; the last chunk may be padded out to its
/// channel span's whole-byte boundary).
pub fn extract_all(carrier_dir: &Path, entries: &[DistributionMapEntry], encrypted_data_length: u32) -> Result<Vec<u8>> {
    let mut entries_by_file: HashMap<&str, Vec<&DistributionMapEntry>> = HashMap::new();
    for entry in entries {
        entries_by_file.entry(entry.png_file.as_str()).or_default().push(entry);
    }

    let mut chunk_bytes: HashMap<u32, Vec<u8>> = HashMap::new();
    for (file_name, file_entries) in &entries_by_file {
        let image = crate::image_adapter::load_png(&carrier_dir.join(file_name))?;
        for entry in file_entries {
            chunk_bytes.insert(entry.chunk_id, extract_entry(&image, entry));
        }
    }

    let mut ordered_ids: Vec<u32> = chunk_bytes.keys().copied().collect();
    ordered_ids.sort_unstable();

    let mut payload = Vec::new();
    for id in ordered_ids {
        payload.extend_from_slice(&chunk_bytes[&id]);
    }
    payload.truncate(encrypted_data_length as usize);
    Ok(payload)
}
