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

//! Command-line interface, built on `clap`'s derive API (§6.2, SPEC_FULL §D).

use crate::compression::CompressionStrategy;
use crate::config::CompressionRequest;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixveil", version, about = "Hide a file inside a set of carrier PNGs", long_about = None)]
pub struct Cli {
    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_colors: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hide a secret file inside a set of carrier PNGs
    Encode {
        /// The secret file to hide
        #[arg(long)]
        input: PathBuf,

        /// Directory of carrier PNGs to read
        #[arg(long)]
        carriers: PathBuf,

        /// Directory to write the output PNGs to
        #[arg(long)]
        output: PathBuf,

        /// Password used to derive the encryption key
        #[arg(long)]
        password: String,

        /// Minimum chunk size in bytes (§3)
        #[arg(long, default_value_t = 16)]
        min_chunk_size: usize,

        /// Maximum chunk size in bytes (§3)
        #[arg(long, default_value_t = 4096)]
        max_chunk_size: usize,

        /// Bits of each RGB channel used to carry payload (1-8, §3)
        #[arg(long, default_value_t = 2)]
        bits_per_channel: u8,

        /// Maximum chunks placed in a single carrier (§4.6)
        #[arg(long, default_value_t = 16)]
        max_chunks_per_png: usize,

        /// Compression strategy for the payload (§4.1)
        #[arg(long, value_enum, default_value_t = CompressionArg::Auto)]
        compression: CompressionArg,

        /// Re-decode the freshly written output and compare against the input
        #[arg(long)]
        verify: bool,

        /// Paint diagnostic 8x8 color blocks at each chunk's first channel
        #[arg(long)]
        debug_visuals: bool,

        /// Seed the chunk splitter and placement engine for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Recover a secret file previously hidden with `encode`
    Decode {
        /// Directory of carrier PNGs to scan for the distribution map
        #[arg(long)]
        carriers: PathBuf,

        /// Where to write the recovered file. A directory writes under the
        /// map's recorded original filename; a path writes there literally.
        #[arg(long)]
        output: PathBuf,

        /// Password used to derive the decryption key
        #[arg(long)]
        password: String,
    },
}

/// Mirrors `CompressionRequest` as a `clap::ValueEnum` for the `--compression` flag.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionArg {
    Auto,
    Brotli,
    Gzip,
    None,
}

impl From<CompressionArg> for CompressionRequest {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Auto => CompressionRequest::Auto,
            CompressionArg::Brotli => CompressionRequest::Explicit(CompressionStrategy::Brotli),
            CompressionArg::Gzip => CompressionRequest::Explicit(CompressionStrategy::Gzip),
            CompressionArg::None => CompressionRequest::Explicit(CompressionStrategy::None),
        }
    }
}
