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

//! Writes placed chunks (and, for one designated carrier, the distribution
//! map itself) into carrier PNGs (§4.7).

use crate::channel_io::embed_byte;
use crate::chunk::Chunk;
use crate::distribution_map::DistributionMapEntry;
use crate::error::Result;
use crate::image_adapter::RawImage;
use std::collections::HashMap;
use std::path::Path;

/// Embeds one chunk's bytes into `image` at its entry's reserved range.
pub fn inject_entry(image: &mut RawImage, entry: &DistributionMapEntry, data: &[u8], debug_visuals: bool) {
    let mut pos = entry.start_channel_position as usize;
    for &byte in data {
        pos = embed_byte(image, &entry.channel_sequence, entry.bits_per_channel, pos, byte);
    }
    if debug_visuals {
        const DEBUG_RED: [u8; 3] = [255, 0, 0];
        const DEBUG_BLUE: [u8; 3] = [0, 0, 255];
        image.paint_debug_block(entry.start_channel_position as usize, DEBUG_RED);
        let last_channel = (entry.end_channel_position as usize).saturating_sub(1);
        image.paint_debug_block(last_channel, DEBUG_BLUE);
    }
}

/// Loads every carrier named in `all_carrier_files` once, embeds whichever
/// chunks target it, optionally embeds `map_blob` into the carrier named
/// `map_carrier_file`, then writes every carrier (touched or not) to
/// `output_dir` under its original basename (§4.7, §4.9, §6.3 — the output
/// folder contains one PNG per input carrier, not just the ones that ended
/// up holding payload).
///
/// `chunks` must contain one entry per `chunk_id` referenced in `entries`.
#[allow(clippy::too_many_arguments)]
pub fn inject_all(
    carrier_dir: &Path,
    output_dir: &Path,
    all_carrier_files: &[&str],
    entries: &[DistributionMapEntry],
    chunks: &[Chunk],
    map_carrier_file: &str,
    map_blob: &[u8],
    map_bits_per_channel: u8,
    debug_visuals: bool,
) -> Result<()> {
    let chunk_by_id: HashMap<u32, &Chunk> = chunks.iter().map(|c| (c.chunk_id, c)).collect();

    let mut entries_by_file: HashMap<&str, Vec<&DistributionMapEntry>> = HashMap::new();
    for entry in entries {
        entries_by_file.entry(entry.png_file.as_str()).or_default().push(entry);
    }

    for &file_name in all_carrier_files {
        let source_path = carrier_dir.join(file_name);
        let mut image = crate::image_adapter::load_png(&source_path)?;

        if let Some(file_entries) = entries_by_file.get(file_name) {
            for entry in file_entries {
                let chunk = chunk_by_id
                    .get(&entry.chunk_id)
                    .expect("every map entry must reference a chunk produced by the splitter");
                inject_entry(&mut image, entry, &chunk.data, debug_visuals);
            }
        }

        if file_name == map_carrier_file {
            crate::map_codec::inject_map_blob(&mut image, map_blob, map_bits_per_channel)?;
        }

        crate::image_adapter::save_png(&output_dir.join(file_name), &image)?;
    }

    Ok(())
}
