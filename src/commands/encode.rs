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

//! `pixveil encode` command handler

use super::CommandHandler;
use crate::config::EncodeConfig;
use crate::error::Result;
use crate::operations;
use crate::output::OutputFormatter;
use std::path::PathBuf;

pub struct EncodeCommand {
    pub input: PathBuf,
    pub carriers: PathBuf,
    pub output: PathBuf,
    pub password: String,
    pub config: EncodeConfig,
}

impl CommandHandler for EncodeCommand {
    fn execute(&self, formatter: &OutputFormatter) -> Result<()> {
        formatter.info(&format!(
            "secret: {}, carriers: {}, output: {}",
            formatter.path(&self.input.display().to_string()),
            formatter.path(&self.carriers.display().to_string()),
            formatter.path(&self.output.display().to_string()),
        ));

        let report = operations::encode(
            &self.config,
            &self.input,
            &self.carriers,
            &self.output,
            &self.password,
        )?;

        formatter.info(&format!(
            "split into {} chunk(s), compressed with {:?}, encrypted payload is {}",
            report.chunk_count,
            report.compression_strategy,
            formatter.size(report.encrypted_len),
        ));
        formatter.info(&format!(
            "distribution map embedded in {}",
            formatter.path(&report.map_carrier)
        ));
        for path in &report.written_files {
            formatter.info(&format!("wrote {}", formatter.path(&path.display().to_string())));
        }
        if report.verified {
            formatter.info("self-verification succeeded");
        }

        formatter.success(&format!(
            "encoded {} carrier PNG(s) in {}",
            report.written_files.len(),
            formatter.path(&self.output.display().to_string())
        ));

        Ok(())
    }
}
