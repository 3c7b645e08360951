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

use serde::Serialize;

use crate::types::item_id::ItemId;
use crate::types::review_state::ReviewState;

/// The content of a vocabulary entry, in canonical form.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabEntry {
    pub id: ItemId,
    /// The word itself, e.g. the hanzi.
    pub headword: String,
    /// Romanized pronunciation, e.g. pinyin.
    pub reading: String,
    /// Sino-Vietnamese reading.
    pub sino_reading: String,
    pub meaning: String,
    pub mnemonic: String,
    pub context: String,
    /// An example sentence using the word.
    pub example: String,
    /// Translation of the example sentence.
    pub translation: String,
}

/// A vocabulary entry merged with its review state.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub entry: VocabEntry,
    pub state: ReviewState,
}

impl Item {
    /// A brand-new item that has never been reviewed.
    pub fn new(entry: VocabEntry) -> Self {
        Self {
            entry,
            state: ReviewState::default(),
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.entry.id
    }
}
