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

//! Encode and decode orchestrators (§4.9): linear state machines that
//! sequence the primitives in every other module into the two end-to-end
//! pipelines described in §2's data-flow diagrams.
//!
//! Each state is a variant below purely for observability (`log::debug!`
//! on every transition); the driver is a plain function using `?` to bail
//! to the caller on the first error, which per §7 is always fatal and
//! terminal — there is no local retry and no resumption from a partial
//! state.

use crate::chunk;
use crate::compression::CompressionStrategy;
use crate::config::{CompressionRequest, DecodeConfig, EncodeConfig};
use crate::crypto;
use crate::distribution_map::DistributionMap;
use crate::error::{PixVeilError, Result};
use crate::file;
use crate::image_adapter::{self, RawImage};
use crate::injection;
use crate::map_codec;
use crate::placement::{self, CarrierInfo};
use crate::tone::{self, ToneCache};
use log::debug;
use std::path::{Path, PathBuf};

/// Encode pipeline states, in the order §4.9 lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeState {
    Init,
    ReadFile,
    Compress,
    Encrypt,
    Split,
    AnalyzeCapacity,
    Distribute,
    Inject,
    WriteMap,
    Verify,
    Done,
}

/// Decode pipeline states, in the order §4.9 lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Init,
    DiscoverMap,
    Extract,
    Assemble,
    VerifyChecksum,
    Decrypt,
    Decompress,
    WriteOutput,
    Done,
}

fn transition_encode(state: EncodeState) {
    debug!("encode: -> {state:?}");
}

fn transition_decode(state: DecodeState) {
    debug!("decode: -> {state:?}");
}

/// Everything an encode run produced, for the caller (CLI or library user)
/// to report back or hand to `verify`.
#[derive(Debug, Clone)]
pub struct EncodeReport {
    pub written_files: Vec<PathBuf>,
    pub map_carrier: String,
    pub chunk_count: usize,
    pub compression_strategy: CompressionStrategy,
    pub encrypted_len: usize,
    pub verified: bool,
}

/// Runs the full `INIT -> ... -> DONE` encode state machine of §4.9.
///
/// `carrier_dir` holds the source PNGs; `output_dir` receives the mutated
/// copies (same basenames) plus the embedded map in the lexicographically
/// first one. When `config.verify` is set, the freshly written output is
/// immediately run back through [`run_decode`] and compared byte-for-byte
/// against `input_file`, surfacing `VerifyFailed` on any mismatch.
pub fn run_encode(
    config: &EncodeConfig,
    input_file: &Path,
    carrier_dir: &Path,
    output_dir: &Path,
    password: &str,
) -> Result<EncodeReport> {
    transition_encode(EncodeState::Init);
    config.validate()?;
    std::fs::create_dir_all(output_dir).map_err(|source| PixVeilError::FileWrite {
        path: output_dir.to_path_buf(),
        source,
    })?;

    transition_encode(EncodeState::ReadFile);
    let plaintext = file::read_file(input_file).map_err(|source| PixVeilError::FileRead {
        path: input_file.to_path_buf(),
        source,
    })?;
    let original_filename = input_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "secret".to_string());

    transition_encode(EncodeState::Compress);
    let compression_strategy = match config.compression {
        CompressionRequest::Explicit(strategy) => strategy,
        CompressionRequest::Auto => CompressionStrategy::choose_for_filename(&original_filename),
    };
    let compressed = compression_strategy.compress(&plaintext);

    transition_encode(EncodeState::Encrypt);
    let encrypted = crypto::encrypt(&compressed, password, config.rng_seed);
    let checksum = crypto::checksum_bytes(&encrypted);

    transition_encode(EncodeState::Split);
    let chunks = chunk::split(
        &encrypted,
        config.min_chunk_size,
        config.max_chunk_size,
        config.rng_seed,
    );

    transition_encode(EncodeState::AnalyzeCapacity);
    let mut carrier_paths = file::list_png_files(carrier_dir)?;
    carrier_paths.sort();
    if carrier_paths.is_empty() {
        return Err(PixVeilError::InvalidConfig {
            reason: format!("no PNG carriers found in '{}'", carrier_dir.display()),
        });
    }
    let tone_cache = ToneCache::new();
    let mut carrier_infos = Vec::with_capacity(carrier_paths.len());
    let mut loaded_images = Vec::with_capacity(carrier_paths.len());
    for path in &carrier_paths {
        let image = image_adapter::load_png(path)?;
        let counts = tone_cache.get_or_analyze(path, || tone::analyze(&image));
        debug!(
            "carrier {}: low={} mid={} high={} capacity={}B",
            path.display(),
            counts.low,
            counts.mid,
            counts.high,
            tone::capacity_bytes(counts.total_channels(), config.bits_per_channel),
        );
        carrier_infos.push(CarrierInfo::from_image(path, &image));
        loaded_images.push(image);
    }
    drop(loaded_images);

    transition_encode(EncodeState::Distribute);
    let (entries, map_carrier) = placement::place_chunks(
        &chunks,
        carrier_infos,
        config.bits_per_channel,
        crate::config::MAP_BITS_PER_CHANNEL,
        config.max_chunks_per_png,
        config.rng_seed,
    )?;

    let map = DistributionMap {
        entries,
        checksum,
        original_filename: original_filename.clone(),
        encrypted_data_length: encrypted.len() as u32,
        compression_strategy,
    };
    // Offset the map's seed from the payload's so the two IVs differ under
    // the same top-level seed while staying fully deterministic.
    let map_blob = map_codec::build_map_blob(&map, password, config.rng_seed.map(|s| s.wrapping_add(1)));

    transition_encode(EncodeState::Inject);
    transition_encode(EncodeState::WriteMap);
    let all_carrier_files: Vec<&str> = carrier_paths
        .iter()
        .filter_map(|p| p.file_name())
        .filter_map(|n| n.to_str())
        .collect();
    injection::inject_all(
        carrier_dir,
        output_dir,
        &all_carrier_files,
        &map.entries,
        &chunks,
        &map_carrier,
        &map_blob,
        crate::config::MAP_BITS_PER_CHANNEL,
        config.debug_visuals,
    )?;

    let written_files: Vec<PathBuf> = carrier_paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| output_dir.join(name))
        .collect();

    let mut verified = false;
    if config.verify {
        transition_encode(EncodeState::Verify);
        let recovered_path = output_dir.join(".pixveil-verify.tmp");
        let decode_config = DecodeConfig::default();
        run_decode(&decode_config, output_dir, &recovered_path, password)?;
        let recovered =
            file::read_file(&recovered_path).map_err(|source| PixVeilError::FileRead {
                path: recovered_path.clone(),
                source,
            })?;
        let _ = std::fs::remove_file(&recovered_path);
        if recovered != plaintext {
            return Err(PixVeilError::VerifyFailed);
        }
        verified = true;
    }

    transition_encode(EncodeState::Done);
    Ok(EncodeReport {
        written_files,
        map_carrier,
        chunk_count: chunks.len(),
        compression_strategy,
        encrypted_len: encrypted.len(),
        verified,
    })
}

/// Everything a decode run produced.
#[derive(Debug, Clone)]
pub struct DecodeReport {
    pub original_filename: String,
    pub bytes_written: usize,
}

/// Runs the full `INIT -> ... -> DONE` decode state machine of §4.9.
///
/// `output_path` is the literal file path to write the recovered secret to.
/// Callers that want §E's "write under the map's `originalFilename` when
/// the caller names a directory" behavior should resolve that before
/// calling in (see `operations::decode`).
pub fn run_decode(
    _config: &DecodeConfig,
    carrier_dir: &Path,
    output_path: &Path,
    password: &str,
) -> Result<DecodeReport> {
    transition_decode(DecodeState::Init);

    transition_decode(DecodeState::DiscoverMap);
    let map = map_codec::discover_map(carrier_dir, password, crate::config::MAP_BITS_PER_CHANNEL)?;

    transition_decode(DecodeState::Extract);
    let raw_payload =
        crate::extraction::extract_all(carrier_dir, &map.entries, map.encrypted_data_length)?;

    transition_decode(DecodeState::Assemble);
    // `extract_all` already truncates to `encrypted_data_length` per §4.8.

    transition_decode(DecodeState::VerifyChecksum);
    let actual_checksum = crypto::checksum_bytes(&raw_payload);
    if actual_checksum != map.checksum {
        return Err(PixVeilError::ChecksumMismatch {
            expected: hex::encode(map.checksum),
            actual: hex::encode(actual_checksum),
        });
    }

    transition_decode(DecodeState::Decrypt);
    let compressed = crypto::decrypt(&raw_payload, password)?;

    transition_decode(DecodeState::Decompress);
    let plaintext = map.compression_strategy.decompress(&compressed)?;

    transition_decode(DecodeState::WriteOutput);
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| PixVeilError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    file::write_file(output_path, &plaintext).map_err(|source| PixVeilError::FileWrite {
        path: output_path.to_path_buf(),
        source,
    })?;

    transition_decode(DecodeState::Done);
    Ok(DecodeReport {
        original_filename: map.original_filename,
        bytes_written: plaintext.len(),
    })
}
