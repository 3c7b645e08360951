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

use crate::collection::resolve_directory;
use crate::deck::find_decks;
use crate::deck::parse_deck_file;
use crate::error::Fallible;
use crate::error::fail;

pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let directory = resolve_directory(directory)?;
    for (deck_id, count) in check_decks(&directory)? {
        println!("{deck_id}: {count} items");
    }
    println!("ok");
    Ok(())
}

/// Parse every deck in the directory, returning each deck's item count.
fn check_decks(directory: &Path) -> Fallible<Vec<(String, usize)>> {
    let decks = find_decks(directory)?;
    if decks.is_empty() {
        return fail("no decks found.");
    }
    let mut counts = Vec::new();
    for (deck_id, path) in decks {
        let entries = parse_deck_file(&path)?;
        counts.push((deck_id, entries.len()));
    }
    Ok(counts)
}
