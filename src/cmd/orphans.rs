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

use std::collections::HashSet;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::item_id::ItemId;

pub fn list_orphans(directory: Option<String>, deck: &str) -> Fallible<()> {
    let coll = Collection::new(directory, deck)?;
    for id in find_orphans(&coll)? {
        println!("{id}");
    }
    Ok(())
}

/// Items with stored progress that are no longer in the deck.
fn find_orphans(coll: &Collection) -> Fallible<Vec<ItemId>> {
    let db_ids: HashSet<ItemId> = coll.db.progress_item_ids(&coll.config.user, &coll.deck_id)?;
    let deck_ids: HashSet<ItemId> = coll.items.iter().map(|item| item.id().clone()).collect();
    let mut orphans: Vec<ItemId> = db_ids.difference(&deck_ids).cloned().collect();
    // Sort the orphans for consistent output.
    orphans.sort();
    Ok(orphans)
}
