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

use std::collections::HashMap;
use std::env::current_dir;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::db::Database;
use crate::db::ProgressRecord;
use crate::db::ProgressStore;
use crate::deck::load_deck;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::scheduler::calculate_next_review;
use crate::types::item::Item;
use crate::types::item::VocabEntry;
use crate::types::item_id::ItemId;
use crate::types::quality::Quality;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub db: Database,
    pub deck_id: String,
    pub items: Vec<Item>,
}

impl Collection {
    pub fn new(directory: Option<String>, deck_id: &str) -> Fallible<Self> {
        let directory = resolve_directory(directory)?;
        let config = Config::load(&directory)?;
        let db = open_database(&directory, &config)?;

        let entries = {
            log::debug!("Loading deck {deck_id}...");
            let start = Instant::now();
            let entries = load_deck(&directory, deck_id)?;
            let duration = start.elapsed().as_millis();
            log::debug!("Deck loaded in {duration}ms.");
            entries
        };
        let progress = db.load_progress(&config.user, deck_id)?;
        let items = merge_progress(entries, progress);

        Ok(Self {
            directory,
            config,
            db,
            deck_id: deck_id.to_string(),
            items,
        })
    }

    #[cfg(test)]
    pub fn find(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }
}

/// Resolve the collection directory, defaulting to the current directory.
pub fn resolve_directory(directory: Option<String>) -> Fallible<PathBuf> {
    let directory: PathBuf = match directory {
        Some(dir) => PathBuf::from(dir),
        None => current_dir()?,
    };
    if directory.exists() {
        Ok(directory.canonicalize()?)
    } else {
        fail("directory does not exist.")
    }
}

pub fn open_database(directory: &Path, config: &Config) -> Fallible<Database> {
    let db_path: PathBuf = directory.join(&config.database);
    let db_path: &str = db_path
        .to_str()
        .ok_or_else(|| ErrorReport::new("invalid path"))?;
    Database::new(db_path)
}

/// Join deck entries with their stored progress. Entries without progress
/// start out new. Progress for items no longer in the deck is ignored.
pub fn merge_progress(entries: Vec<VocabEntry>, progress: Vec<ProgressRecord>) -> Vec<Item> {
    let mut states: HashMap<ItemId, ReviewState> = progress
        .into_iter()
        .map(|record| (record.item_id, record.state))
        .collect();
    entries
        .into_iter()
        .map(|entry| match states.remove(&entry.id) {
            Some(state) => Item { entry, state },
            None => Item::new(entry),
        })
        .collect()
}

/// Rate one item. Consumes the collection and returns it with only that
/// item's state replaced, along with the new state.
pub fn rate_item(
    mut items: Vec<Item>,
    id: &ItemId,
    quality: Quality,
    now: Timestamp,
) -> Fallible<(Vec<Item>, ReviewState)> {
    let Some(position) = items.iter().position(|item| item.id() == id) else {
        return fail(format!("no item with ID '{id}'."));
    };
    let state = calculate_next_review(quality, &items[position].state, now);
    log::debug!(
        "{id} {} -> {} interval={}d ease={:.2} due={}",
        quality.as_str(),
        state.status,
        state.interval,
        state.ease_factor,
        state
            .next_review_at
            .map(|ts| ts.to_string())
            .unwrap_or_default()
    );
    items[position].state = state.clone();
    Ok((items, state))
}
