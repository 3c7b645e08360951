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

use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::projection::Stats;
use crate::projection::get_stats;
use crate::projection::stats_from_json;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    #[serde(flatten)]
    stats: Stats,
    /// Absent when the stats come from a progress dump.
    #[serde(skip_serializing_if = "Option::is_none")]
    today_review_count: Option<usize>,
}

pub fn print_deck_stats(
    directory: Option<String>,
    deck: &str,
    format: StatsFormat,
    from_json: Option<PathBuf>,
) -> Fallible<()> {
    let stats = match from_json {
        Some(path) => dump_stats(&path)?,
        None => collection_stats(directory, deck)?,
    };
    println!("{}", render(&stats, format)?);
    Ok(())
}

fn collection_stats(directory: Option<String>, deck: &str) -> Fallible<DeckStats> {
    let coll = Collection::new(directory, deck)?;
    let now = Timestamp::now();
    let today_review_count = coll
        .db
        .today_review_count(&coll.config.user, deck, now.local_date())?;
    Ok(DeckStats {
        stats: get_stats(&coll.items, now),
        today_review_count: Some(today_review_count),
    })
}

/// Stats over an externally produced progress dump.
fn dump_stats(path: &Path) -> Fallible<DeckStats> {
    if !path.exists() {
        return fail("progress dump does not exist.");
    }
    let contents = read_to_string(path)?;
    let value: Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Progress dump is not valid JSON: {e}");
            Value::Null
        }
    };
    Ok(DeckStats {
        stats: stats_from_json(&value, Timestamp::now()),
        today_review_count: None,
    })
}

fn render(stats: &DeckStats, format: StatsFormat) -> Fallible<String> {
    match format {
        StatsFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        StatsFormat::Text => {
            let s = &stats.stats;
            let mut lines = vec![
                format!("total:     {}", s.total),
                format!("new:       {}", s.new),
                format!("learning:  {}", s.learning),
                format!("reviewing: {}", s.reviewing),
                format!("mastered:  {}", s.mastered),
                format!("due:       {}", s.due),
            ];
            if let Some(count) = stats.today_review_count {
                lines.push(format!("today:     {count}"));
            }
            Ok(lines.join("\n"))
        }
    }
}
