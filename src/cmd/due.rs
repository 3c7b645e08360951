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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::projection::due_items;
use crate::types::item::Item;
use crate::types::timestamp::Timestamp;

/// Print the items that are due, oldest first.
pub fn list_due(directory: Option<String>, deck: &str) -> Fallible<()> {
    let coll = Collection::new(directory, deck)?;
    for item in oldest_first(due_items(&coll.items, Timestamp::now())) {
        let due = item
            .state
            .next_review_at
            .map(|ts| ts.to_string())
            .unwrap_or_default();
        println!("{}\t{}\t{}\t{due}", item.id(), item.entry.headword, item.state.status);
    }
    Ok(())
}

/// `due_items` keeps deck order, so callers that want priority order sort.
fn oldest_first(mut items: Vec<&Item>) -> Vec<&Item> {
    items.sort_by_key(|item| item.state.next_review_at);
    items
}
