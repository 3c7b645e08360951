// Copyright 2025 Fernando Borretti
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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;

pub const CONFIG_FILE: &str = "lexicards.toml";

/// Per-collection settings, read from `lexicards.toml`.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Whose progress to read and write.
    pub user: String,
    /// Path to the database, relative to the collection directory.
    pub database: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: "local".to_string(),
            database: "lexicards.db".to_string(),
        }
    }
}

impl Config {
    /// Load the config from a collection directory. A missing file yields the
    /// defaults.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No config file, using defaults.");
            return Ok(Self::default());
        }
        let contents = read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Fallible<Self> {
        Ok(toml::from_str(contents)?)
    }
}
