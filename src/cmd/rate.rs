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
use crate::collection::rate_item;
use crate::db::ProgressStore;
use crate::error::Fallible;
use crate::types::item_id::ItemId;
use crate::types::quality::Quality;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// Apply one rating to one item, print the new state as JSON and save it.
pub fn rate(directory: Option<String>, deck: &str, item: String, quality: u8) -> Fallible<()> {
    let quality = Quality::try_from(quality)?;
    let coll = Collection::new(directory, deck)?;
    let id = ItemId::new(item);
    let state = rate_and_save(coll, &id, quality, Timestamp::now())?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn rate_and_save(
    coll: Collection,
    id: &ItemId,
    quality: Quality,
    now: Timestamp,
) -> Fallible<ReviewState> {
    let (_, state) = rate_item(coll.items, id, quality, now)?;
    coll.db
        .save_progress(&coll.config.user, &coll.deck_id, id, &state)?;
    coll.db
        .record_review(&coll.config.user, &coll.deck_id, id, now, quality)?;
    Ok(state)
}
