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

use std::path::Path;
use std::path::PathBuf;

use crate::collection::resolve_directory;
use crate::deck::append_entry;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::item::VocabEntry;
use crate::types::item_id::ItemId;
use crate::types::timestamp::Timestamp;

/// Add a word to a deck by hand and print its new ID.
pub fn add_word(directory: Option<String>, deck: &str, entry: VocabEntry) -> Fallible<()> {
    let directory = resolve_directory(directory)?;
    let (id, path) = add_entry(&directory, deck, entry, Timestamp::now())?;
    println!("Added {id} to {}.", path.display());
    Ok(())
}

fn add_entry(
    directory: &Path,
    deck: &str,
    entry: VocabEntry,
    now: Timestamp,
) -> Fallible<(ItemId, PathBuf)> {
    if entry.headword.trim().is_empty() || entry.meaning.trim().is_empty() {
        return fail("a word needs both a headword and a meaning.");
    }
    let entry = VocabEntry {
        id: ItemId::generated(now),
        ..entry
    };
    let path = append_entry(directory, deck, &entry)?;
    log::debug!("Added {} to deck {deck}.", entry.id);
    Ok((entry.id, path))
}
