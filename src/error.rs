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

//! Error types for Pix-Veil's encode/decode pipelines.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Pix-Veil.
///
/// Each variant corresponds to one kind in the pipeline's error taxonomy;
/// callers can match on the variant instead of parsing the message.
#[derive(Error, Debug)]
pub enum PixVeilError {
    #[error("failed to read file '{path}'")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file '{path}'")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode PNG '{path}'")]
    PngDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode PNG '{path}'")]
    PngEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// No carrier could accommodate a chunk under the current configuration.
    #[error(
        "insufficient capacity: could not place chunk {chunk_id} ({chunk_size} bytes) in any carrier"
    )]
    InsufficientCapacity { chunk_id: u32, chunk_size: usize },

    /// No carrier in the input set exposed a valid magic-framed map prefix.
    #[error("no distribution map found in any carrier under '{dir}'")]
    MapNotFound { dir: PathBuf },

    /// The map's magic matched but the content failed to deserialize.
    #[error("distribution map is corrupt: {reason}")]
    MapCorrupt { reason: String },

    #[error("decryption failed: {reason}")]
    DecryptFailed { reason: String },

    /// Checksum recovered from the reassembled payload doesn't match the map.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Post-encode self-decode did not reproduce the original input.
    #[error("verification failed: recovered data does not match the original input")]
    VerifyFailed,

    /// Generic I/O error for cases where automatic conversion is desired.
    #[error("I/O operation failed")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, PixVeilError>;
