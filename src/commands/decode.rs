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

//! `pixveil decode` command handler

use super::CommandHandler;
use crate::config::DecodeConfig;
use crate::error::Result;
use crate::operations;
use crate::output::OutputFormatter;
use std::path::PathBuf;

pub struct DecodeCommand {
    pub carriers: PathBuf,
    pub output: PathBuf,
    pub password: String,
}

impl CommandHandler for DecodeCommand {
    fn execute(&self, formatter: &OutputFormatter) -> Result<()> {
        formatter.info(&format!(
            "carriers: {}, output: {}",
            formatter.path(&self.carriers.display().to_string()),
            formatter.path(&self.output.display().to_string()),
        ));

        let report = operations::decode(
            &DecodeConfig::default(),
            &self.carriers,
            &self.output,
            &self.password,
        )?;

        formatter.info(&format!(
            "recovered '{}' ({})",
            report.original_filename,
            formatter.size(report.bytes_written),
        ));
        formatter.success(&format!(
            "decoded {} into {}",
            report.original_filename,
            formatter.path(&self.output.display().to_string())
        ));

        Ok(())
    }
}
