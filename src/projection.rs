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

//! Read-side projections over a collection of items.

use serde::Serialize;
use serde_json::Value;

use crate::types::item::Item;
use crate::types::review_state::MASTERED_INTERVAL;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// The items that are due at `now`, in their original order.
pub fn due_items(items: &[Item], now: Timestamp) -> Vec<&Item> {
    items.iter().filter(|item| item.state.is_due(now)).collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub new: usize,
    /// Includes relearning items.
    pub learning: usize,
    pub reviewing: usize,
    pub mastered: usize,
    pub due: usize,
}

pub fn get_stats(items: &[Item], now: Timestamp) -> Stats {
    let mut stats = Stats {
        total: items.len(),
        ..Default::default()
    };
    for item in items {
        match item.state.status {
            Status::New => stats.new += 1,
            Status::Learning | Status::Relearning => stats.learning += 1,
            Status::Reviewing => stats.reviewing += 1,
        }
        if item.state.is_mastered() {
            stats.mastered += 1;
        }
        if item.state.is_due(now) {
            stats.due += 1;
        }
    }
    stats
}

/// Compute stats over an untrusted JSON dump of progress records.
///
/// Never fails: a value that is not an array yields all-zero stats. Each
/// field of a record is read on its own, so a malformed field only loses
/// that field: a missing status counts as new, a missing interval as zero,
/// and a missing or unparseable due date as not due.
pub fn stats_from_json(value: &Value, now: Timestamp) -> Stats {
    let Some(records) = value.as_array() else {
        log::warn!("Progress dump is not an array, reporting empty stats.");
        return Stats::default();
    };
    let mut stats = Stats {
        total: records.len(),
        ..Default::default()
    };
    for record in records {
        let status = record.get("status").and_then(Value::as_str);
        let interval = record
            .get("interval")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        match status {
            None | Some("new") => stats.new += 1,
            Some("learning") | Some("relearning") => stats.learning += 1,
            Some("reviewing") => {
                stats.reviewing += 1;
                if interval > MASTERED_INTERVAL as f64 {
                    stats.mastered += 1;
                }
            }
            Some("mastered") => {
                stats.reviewing += 1;
                stats.mastered += 1;
            }
            Some(other) => {
                log::warn!("Unknown status '{other}', counting as new.");
                stats.new += 1;
            }
        }
        let due = record
            .get("next_review_at")
            .and_then(Value::as_str)
            .and_then(|s| Timestamp::parse(s).ok())
            .is_some_and(|ts| ts <= now);
        if due {
            stats.due += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::item::VocabEntry;
    use crate::types::item_id::ItemId;
    use crate::types::review_state::ReviewState;

    fn now() -> Timestamp {
        Timestamp::parse("2025-06-01T09:00:00Z").unwrap()
    }

    fn item(id: &str, state: ReviewState) -> Item {
        Item {
            entry: VocabEntry {
                id: ItemId::new(id),
                ..Default::default()
            },
            state,
        }
    }

    fn sample() -> Vec<Item> {
        vec![
            item("a", ReviewState::default()),
            item(
                "b",
                ReviewState {
                    status: Status::Learning,
                    step_index: 1,
                    next_review_at: Some(now().add_minutes(10)),
                    ..Default::default()
                },
            ),
            item(
                "c",
                ReviewState {
                    status: Status::Reviewing,
                    interval: 30,
                    repetitions: 4,
                    next_review_at: Timestamp::parse("2025-05-31T09:00:00Z").ok(),
                    ..Default::default()
                },
            ),
            item(
                "d",
                ReviewState {
                    status: Status::Relearning,
                    next_review_at: Some(now()),
                    ..Default::default()
                },
            ),
            item(
                "e",
                ReviewState {
                    status: Status::Reviewing,
                    interval: 6,
                    repetitions: 2,
                    next_review_at: Some(now().add_days(6)),
                    ..Default::default()
                },
            ),
        ]
    }

    #[test]
    fn test_due_items_preserves_order() {
        let items = sample();
        let due: Vec<&str> = due_items(&items, now())
            .into_iter()
            .map(|item| item.id().as_str())
            .collect();
        assert_eq!(due, vec!["c", "d"]);
    }

    #[test]
    fn test_due_items_is_idempotent() {
        let items = sample();
        assert_eq!(due_items(&items, now()), due_items(&items, now()));
    }

    #[test]
    fn test_never_scheduled_items_are_not_due() {
        let items = vec![item("a", ReviewState::default())];
        assert!(due_items(&items, now()).is_empty());
    }

    #[test]
    fn test_get_stats() {
        let stats = get_stats(&sample(), now());
        assert_eq!(
            stats,
            Stats {
                total: 5,
                new: 1,
                learning: 2,
                reviewing: 2,
                mastered: 1,
                due: 2,
            }
        );
    }

    #[test]
    fn test_get_stats_empty() {
        assert_eq!(get_stats(&[], now()), Stats::default());
    }

    #[test]
    fn test_stats_from_json_non_array() {
        assert_eq!(stats_from_json(&json!({"total": 3}), now()), Stats::default());
        assert_eq!(stats_from_json(&json!(null), now()), Stats::default());
        assert_eq!(stats_from_json(&json!("cards"), now()), Stats::default());
    }

    #[test]
    fn test_stats_from_json_lenient() {
        let dump = json!([
            {},
            {"status": "learning", "next_review_at": "2025-06-01T08:59:00Z"},
            {"status": "reviewing", "interval": 40, "next_review_at": "not a date"},
            {"status": "mastered"},
            {"status": "relearning", "interval": "oops"},
            {"status": "wat"},
            {"status": 3, "next_review_at": 17},
            42
        ]);
        let stats = stats_from_json(&dump, now());
        assert_eq!(
            stats,
            Stats {
                total: 8,
                new: 4,
                learning: 2,
                reviewing: 2,
                mastered: 2,
                due: 1,
            }
        );
    }

    #[test]
    fn test_stats_from_json_keeps_valid_fields() {
        let dump = json!([
            {"status": "relearning", "interval": "oops", "next_review_at": "2000-01-01T00:00:00Z"}
        ]);
        let stats = stats_from_json(&dump, now());
        assert_eq!(
            stats,
            Stats {
                total: 1,
                new: 0,
                learning: 1,
                reviewing: 0,
                mastered: 0,
                due: 1,
            }
        );
    }

    #[test]
    fn test_stats_json_shape() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(Stats::default())?;
        assert_eq!(
            json,
            json!({"total": 0, "new": 0, "learning": 0, "reviewing": 0, "mastered": 0, "due": 0})
        );
        Ok(())
    }
}
