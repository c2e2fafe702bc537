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

//! Command handlers: thin adapters between parsed CLI arguments and the
//! `operations` entry points, responsible only for user-facing reporting.

pub mod decode;
pub mod encode;

use crate::error::Result;
use crate::output::OutputFormatter;

/// Implemented by every subcommand's handler.
pub trait CommandHandler {
    fn execute(&self, formatter: &OutputFormatter) -> Result<()>;
}
