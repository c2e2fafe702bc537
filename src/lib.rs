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

//! pixveil hides an arbitrary file inside a set of carrier PNGs by
//! compressing, encrypting and splitting it into chunks, scattering those
//! chunks across the least significant bits of the carriers' color
//! channels, and recording where everything went in an encrypted
//! distribution map embedded alongside it.
//!
//! The crate is organized as a pipeline of small, independently testable
//! stages (see [`pipeline`] for the end-to-end state machines) sitting on
//! top of a handful of primitives:
//!
//! - [`compression`] / [`crypto`] - payload transforms
//! - [`chunk`] - splitting a payload into randomly sized pieces
//! - [`tone`] / [`image_adapter`] - carrier analysis and pixel access
//! - [`placement`] - deciding which chunk goes where
//! - [`distribution_map`] / [`map_codec`] - describing and hiding that decision
//! - [`injection`] / [`extraction`] - the actual LSB read/write

pub mod bitio;
pub mod channel_io;
pub mod chunk;
pub mod cli;
pub mod commands;
pub mod compression;
pub mod config;
pub mod crypto;
pub mod distribution_map;
pub mod error;
pub mod extraction;
pub mod file;
pub mod image_adapter;
pub mod injection;
pub mod map_codec;
pub mod operations;
pub mod output;
pub mod pipeline;
pub mod placement;
pub mod serialize;
pub mod tone;

pub use config::{CompressionRequest, DecodeConfig, EncodeConfig};
pub use error::{PixVeilError, Result};
pub use operations::{decode, encode};
pub use pipeline::{DecodeReport, EncodeReport};
