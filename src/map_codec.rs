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

//! The outer magic-framed distribution-map blob (§4.7, §4.8, §6.1) and the
//! injector/discoverer that embeds it into, and scans for it in, a
//! carrier's fixed channel-0 prefix.
//!
//! `distribution_map` owns `mapContent`'s own binary layout; this module
//! wraps that content as `MAGIC_BYTES || size || AES256CBC(Brotli(mapContent))`
//! and is the only place that knows the map always travels Brotli-compressed
//! regardless of the payload's chosen compression strategy (§4.1).

use crate::channel_io::{channels_needed, embed_byte, extract_byte};
use crate::compression::CompressionStrategy;
use crate::crypto;
use crate::distribution_map::{Channel, DistributionMap};
use crate::error::{PixVeilError, Result};
use crate::image_adapter::RawImage;
use std::path::Path;

/// Fixed constant marking the start of an embedded distribution map (§6.1).
/// Four bytes, the minimum §6.1 allows.
pub const MAGIC_BYTES: &[u8] = b"PXVL";

/// Channel sequence and bits-per-channel the map prefix always uses (§4.7).
const MAP_CHANNEL_SEQUENCE: [Channel; 3] = [Channel::R, Channel::G, Channel::B];

/// Channels needed to carry a blob of `blob_len` bytes at `bits_per_channel`.
pub fn channels_for_blob(blob_len: usize, bits_per_channel: u8) -> usize {
    channels_needed(blob_len, bits_per_channel)
}

/// Builds `MAGIC_BYTES || size || ciphertext`, where `ciphertext` is
/// AES-256-CBC(Brotli(mapContent)) and `size` covers `ciphertext` only.
/// `rng_seed`, when `Some`, pins the map's own IV so a pinned encode seed
/// makes this blob reproducible too (§8 scenario 6).
pub fn build_map_blob(map: &DistributionMap, password: &str, rng_seed: Option<u64>) -> Vec<u8> {
    let content = map.serialize();
    let compressed = CompressionStrategy::Brotli.compress(&content);
    let ciphertext = crypto::encrypt(&compressed, password, rng_seed);

    let mut blob = Vec::with_capacity(MAGIC_BYTES.len() + 4 + ciphertext.len());
    blob.extend_from_slice(MAGIC_BYTES);
    blob.extend_from_slice(&(ciphertext.len() as u32).to_be_bytes());
    blob.extend_from_slice(&ciphertext);
    blob
}

/// Writes `blob` into `image`'s channel-0 prefix (§4.7).
pub fn inject_map_blob(image: &mut RawImage, blob: &[u8], bits_per_channel: u8) -> Result<()> {
    let needed = channels_needed(blob.len(), bits_per_channel);
    if needed > image.rgb_channel_count() {
        return Err(PixVeilError::InsufficientCapacity {
            chunk_id: 0,
            chunk_size: blob.len(),
        });
    }
    let mut pos = 0usize;
    for &byte in blob {
        pos = embed_byte(image, &MAP_CHANNEL_SEQUENCE, bits_per_channel, pos, byte);
    }
    Ok(())
}

/// Scans `carrier_dir`'s PNGs in lexicographic order for a valid
/// magic-framed map prefix, decrypting and deserializing the first match
/// (§4.8). Fails with `MapNotFound` if no carrier's prefix has the magic,
/// or `MapCorrupt` if a magic match fails to decrypt/deserialize.
pub fn discover_map(carrier_dir: &Path, password: &str, bits_per_channel: u8) -> Result<DistributionMap> {
    let mut paths: Vec<_> = std::fs::read_dir(carrier_dir)
        .map_err(|source| PixVeilError::FileRead {
            path: carrier_dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    for path in &paths {
        let image = crate::image_adapter::load_png(path)?;
        if let Some(map) = try_discover_in_image(&image, password, bits_per_channel)? {
            return Ok(map);
        }
    }

    Err(PixVeilError::MapNotFound {
        dir: carrier_dir.to_path_buf(),
    })
}

/// `Ok(None)` means this carrier's prefix doesn't start with the magic, so
/// the caller should keep scanning. Any other outcome is terminal: either a
/// recovered map, or a `MapCorrupt` for a magic match that fails to parse.
fn try_discover_in_image(
    image: &RawImage,
    password: &str,
    bits_per_channel: u8,
) -> Result<Option<DistributionMap>> {
    let header_len = MAGIC_BYTES.len() + 4;
    let header_channels = channels_needed(header_len, bits_per_channel);
    if header_channels > image.rgb_channel_count() {
        return Ok(None);
    }

    let mut pos = 0usize;
    let mut header = Vec::with_capacity(header_len);
    for _ in 0..header_len {
        let (byte, next) = extract_byte(image, &MAP_CHANNEL_SEQUENCE, bits_per_channel, pos);
        header.push(byte);
        pos = next;
    }

    if header[..MAGIC_BYTES.len()] != *MAGIC_BYTES {
        return Ok(None);
    }

    let size_bytes = &header[MAGIC_BYTES.len()..];
    let size = u32::from_be_bytes([size_bytes[0], size_bytes[1], size_bytes[2], size_bytes[3]]) as usize;

    // §9 Open Question: the reference leaves behavior undefined when `size`
    // is zero or exceeds the carrier's remaining capacity; this validates
    // it explicitly and reports `MapCorrupt` instead.
    let remaining_capacity = image.rgb_channel_count().saturating_sub(pos);
    if size == 0 || channels_needed(size, bits_per_channel) > remaining_capacity {
        return Err(PixVeilError::MapCorrupt {
            reason: format!("declared map size {size} exceeds carrier's remaining capacity"),
        });
    }

    let mut ciphertext = Vec::with_capacity(size);
    for _ in 0..size {
        let (byte, next) = extract_byte(image, &MAP_CHANNEL_SEQUENCE, bits_per_channel, pos);
        ciphertext.push(byte);
        pos = next;
    }

    let compressed = crypto::decrypt(&ciphertext, password)?;
    let content = CompressionStrategy::Brotli.decompress(&compressed)?;
    Ok(Some(DistributionMap::deserialize(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution_map::DistributionMapEntry;

    fn sample_map() -> DistributionMap {
        DistributionMap {
            entries: vec![DistributionMapEntry {
                chunk_id: 0,
                png_file: "carrier_0.png".to_string(),
                start_channel_position: 100,
                end_channel_position: 200,
                bits_per_channel: 2,
                channel_sequence: [Channel::R, Channel::G, Channel::B],
            }],
            checksum: crypto::checksum_bytes(b"payload"),
            original_filename: "secret.txt".to_string(),
            encrypted_data_length: 7,
            compression_strategy: CompressionStrategy::Brotli,
        }
    }

    fn blank_image(w: u32, h: u32) -> RawImage {
        RawImage {
            width: w,
            height: h,
            rgba: vec![0u8; (w * h * 4) as usize],
        }
    }

    #[test]
    fn test_build_blob_starts_with_magic_and_self_describes_length() {
        let map = sample_map();
        let blob = build_map_blob(&map, "pw", None);

        assert_eq!(&blob[..MAGIC_BYTES.len()], MAGIC_BYTES);
        let size = u32::from_be_bytes([
            blob[MAGIC_BYTES.len()],
            blob[MAGIC_BYTES.len() + 1],
            blob[MAGIC_BYTES.len() + 2],
            blob[MAGIC_BYTES.len() + 3],
        ]) as usize;
        assert_eq!(size, blob.len() - MAGIC_BYTES.len() - 4);
    }

    #[test]
    fn test_inject_then_discover_roundtrip() {
        let map = sample_map();
        let blob = build_map_blob(&map, "correct horse", None);

        let dir = tempfile::tempdir().unwrap();
        let mut image = blank_image(64, 64);
        inject_map_blob(&mut image, &blob, 2).unwrap();
        crate::image_adapter::save_png(&dir.path().join("a_carrier.png"), &image).unwrap();
        // A second, untouched carrier must not confuse discovery.
        crate::image_adapter::save_png(&dir.path().join("b_other.png"), &blank_image(64, 64)).unwrap();

        let recovered = discover_map(dir.path(), "correct horse", 2).unwrap();
        assert_eq!(recovered, map);
    }

    #[test]
    fn test_wrong_password_fails_decryption() {
        let map = sample_map();
        let blob = build_map_blob(&map, "right password", None);

        let dir = tempfile::tempdir().unwrap();
        let mut image = blank_image(64, 64);
        inject_map_blob(&mut image, &blob, 2).unwrap();
        crate::image_adapter::save_png(&dir.path().join("carrier.png"), &image).unwrap();

        let result = discover_map(dir.path(), "wrong password", 2);
        assert!(matches!(result, Err(PixVeilError::DecryptFailed { .. })));
    }

    #[test]
    fn test_no_carrier_has_the_magic_is_map_not_found() {
        let dir = tempfile::tempdir().unwrap();
        crate::image_adapter::save_png(&dir.path().join("carrier.png"), &blank_image(32, 32)).unwrap();

        let result = discover_map(dir.path(), "pw", 2);
        assert!(matches!(result, Err(PixVeilError::MapNotFound { .. })));
    }

    #[test]
    fn test_corrupt_magic_is_not_found_not_corrupt() {
        // Zeroing the first bytes of the prefix is indistinguishable from
        // "no map here" per §4.8's magic-match scan.
        let map = sample_map();
        let blob = build_map_blob(&map, "pw", None);

        let dir = tempfile::tempdir().unwrap();
        let mut image = blank_image(64, 64);
        inject_map_blob(&mut image, &blob, 2).unwrap();
        // Corrupt the magic bytes directly in the pixel data.
        for i in 0..8 {
            image.rgba[i] &= !0b11;
        }
        crate::image_adapter::save_png(&dir.path().join("carrier.png"), &image).unwrap();

        let result = discover_map(dir.path(), "pw", 2);
        assert!(matches!(result, Err(PixVeilError::MapNotFound { .. })));
    }
}
