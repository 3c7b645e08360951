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
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use chrono::NaiveDate;
use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::Transaction;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::item_id::ItemId;
use crate::types::quality::Quality;
use crate::types::review_state::ReviewState;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// The stored review state of one item.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressRecord {
    pub item_id: ItemId,
    pub state: ReviewState,
}

/// Durable storage for review state, keyed by `(user, deck, item)`.
pub trait ProgressStore {
    /// Load every stored record for a user's deck.
    fn load_progress(&self, user: &str, deck: &str) -> Fallible<Vec<ProgressRecord>>;

    /// Insert or replace the state of one item.
    fn save_progress(
        &self,
        user: &str,
        deck: &str,
        item: &ItemId,
        state: &ReviewState,
    ) -> Fallible<()>;
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// The IDs of every item with stored progress in a user's deck.
    pub fn progress_item_ids(&self, user: &str, deck: &str) -> Fallible<HashSet<ItemId>> {
        let mut ids = HashSet::new();
        let conn = self.acquire()?;
        let mut stmt =
            conn.prepare("select item_id from progress where user_id = ? and deck_id = ?;")?;
        let mut rows = stmt.query((user, deck))?;
        while let Some(row) = rows.next()? {
            ids.insert(row.get(0)?);
        }
        Ok(ids)
    }

    /// Append an entry to the review log.
    pub fn record_review(
        &self,
        user: &str,
        deck: &str,
        item: &ItemId,
        reviewed_at: Timestamp,
        quality: Quality,
    ) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "insert into reviews (user_id, deck_id, item_id, reviewed_at, quality) values (?, ?, ?, ?, ?);";
        conn.execute(sql, (user, deck, item, reviewed_at, quality))?;
        Ok(())
    }

    /// How many reviews of a user's deck happened on the given local date.
    pub fn today_review_count(&self, user: &str, deck: &str, today: NaiveDate) -> Fallible<usize> {
        let conn = self.acquire()?;
        let mut stmt =
            conn.prepare("select reviewed_at from reviews where user_id = ? and deck_id = ?;")?;
        let mut rows = stmt.query((user, deck))?;
        let mut count = 0;
        while let Some(row) = rows.next()? {
            let reviewed_at: Timestamp = row.get(0)?;
            if reviewed_at.local_date() == today {
                count += 1;
            }
        }
        Ok(count)
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ErrorReport::new("database connection lock was poisoned"))
    }
}

impl ProgressStore for Database {
    fn load_progress(&self, user: &str, deck: &str) -> Fallible<Vec<ProgressRecord>> {
        let conn = self.acquire()?;
        let sql = "select item_id, status, step_index, interval, ease_factor, repetitions, next_review_at, last_reviewed_at from progress where user_id = ? and deck_id = ? order by item_id;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query((user, deck))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(read_record(row)?);
        }
        log::debug!("Loaded {} progress records for {user}/{deck}.", records.len());
        Ok(records)
    }

    fn save_progress(
        &self,
        user: &str,
        deck: &str,
        item: &ItemId,
        state: &ReviewState,
    ) -> Fallible<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let sql = "insert into progress (user_id, deck_id, item_id, status, step_index, interval, ease_factor, repetitions, next_review_at, last_reviewed_at, updated_at) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) on conflict (user_id, deck_id, item_id) do update set status = excluded.status, step_index = excluded.step_index, interval = excluded.interval, ease_factor = excluded.ease_factor, repetitions = excluded.repetitions, next_review_at = excluded.next_review_at, last_reviewed_at = excluded.last_reviewed_at, updated_at = excluded.updated_at;";
        tx.execute(
            sql,
            (
                user,
                deck,
                item,
                state.status,
                state.step_index,
                state.interval,
                state.ease_factor,
                state.repetitions,
                state.next_review_at,
                state.last_reviewed_at,
                Timestamp::now(),
            ),
        )?;
        tx.commit()?;
        log::debug!("Saved progress for {user}/{deck}/{item}.");
        Ok(())
    }
}

/// Read a progress row, repairing values that break the state invariants.
fn read_record(row: &Row) -> Fallible<ProgressRecord> {
    let item_id: ItemId = row.get(0)?;
    let status: Status = row.get(1)?;
    let step_index: i64 = row.get(2)?;
    let interval: i64 = row.get(3)?;
    let ease_factor: f64 = row.get(4)?;
    let repetitions: i64 = row.get(5)?;
    let next_review_at: Option<Timestamp> = row.get(6)?;
    let last_reviewed_at: Option<Timestamp> = row.get(7)?;
    let state = ReviewState {
        status,
        step_index: clamp_count(step_index),
        interval: clamp_count(interval),
        ease_factor,
        repetitions: clamp_count(repetitions),
        next_review_at,
        last_reviewed_at,
    };
    Ok(ProgressRecord {
        item_id,
        state: state.normalized(),
    })
}

fn clamp_count(n: i64) -> u32 {
    n.clamp(0, u32::MAX as i64) as u32
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["progress"], |row| row.get(0))?;
    Ok(count > 0)
}
