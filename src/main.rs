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

use clap::Parser;
use log::LevelFilter;
use pixveil::cli::{Cli, Command};
use pixveil::commands::{decode::DecodeCommand, encode::EncodeCommand, CommandHandler};
use pixveil::config::EncodeConfig;
use pixveil::output::OutputFormatter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}

fn main() {
    let cli = Cli::parse();

    if cli.no_colors {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, cli.quiet);

    let formatter = OutputFormatter::new(!cli.no_colors, cli.quiet, cli.verbose);

    let result = match cli.command {
        Command::Encode {
            input,
            carriers,
            output,
            password,
            min_chunk_size,
            max_chunk_size,
            bits_per_channel,
            max_chunks_per_png,
            compression,
            verify,
            debug_visuals,
            seed,
        } => {
            let config = EncodeConfig {
                min_chunk_size,
                max_chunk_size,
                bits_per_channel,
                max_chunks_per_png,
                compression: compression.into(),
                verify,
                debug_visuals,
                rng_seed: seed,
            };

            EncodeCommand {
                input,
                carriers,
                output,
                password,
                config,
            }
            .execute(&formatter)
        }
        Command::Decode {
            carriers,
            output,
            password,
        } => DecodeCommand {
            carriers,
            output,
            password,
        }
        .execute(&formatter),
    };

    if let Err(err) = result {
        formatter.error(&format!("{err}"));
        std::process::exit(1);
    }
}
