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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::item::Item;
use crate::types::item::VocabEntry;
use crate::types::review_state::ReviewState;

pub fn export_collection(directory: Option<String>, deck: &str) -> Fallible<()> {
    let coll: Collection = Collection::new(directory, deck)?;
    let export: Export = get_export(&coll);
    let json: String = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export<'a> {
    user: &'a str,
    deck: &'a str,
    items: Vec<ItemExport<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemExport<'a> {
    #[serde(flatten)]
    entry: &'a VocabEntry,
    state: &'a ReviewState,
    mastered: bool,
}

fn get_export(coll: &Collection) -> Export<'_> {
    Export {
        user: &coll.config.user,
        deck: &coll.deck_id,
        items: coll.items.iter().map(item_export).collect(),
    }
}

fn item_export(item: &Item) -> ItemExport<'_> {
    ItemExport {
        entry: &item.entry,
        state: &item.state,
        mastered: item.state.is_mastered(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use serde_json::Value;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_export_shape() -> Fallible<()> {
        let dir = tempdir()?;
        write(
            dir.path().join("hsk1.json"),
            r#"[{"id": "a", "hanzi": "我", "meaning": "I"}]"#,
        )?;
        let coll = Collection::new(Some(dir.path().display().to_string()), "hsk1")?;
        let value: Value = serde_json::to_value(get_export(&coll))?;
        assert_eq!(value["user"], "local");
        assert_eq!(value["deck"], "hsk1");
        let item = &value["items"][0];
        assert_eq!(item["id"], "a");
        assert_eq!(item["headword"], "我");
        assert_eq!(item["meaning"], "I");
        assert_eq!(item["mastered"], false);
        assert_eq!(
            item["state"],
            json!({
                "status": "new",
                "stepIndex": 0,
                "interval": 0,
                "easeFactor": 2.5,
                "repetitions": 0,
                "nextReviewAt": null,
                "lastReviewedAt": null
            })
        );
        Ok(())
    }
}
