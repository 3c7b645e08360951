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

use crate::scheduler::LEARNING_STEPS;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// The ease factor a new item starts with.
pub const INITIAL_EASE: f64 = 2.5;

/// The ease factor never drops below this.
pub const MIN_EASE: f64 = 1.3;

/// Reviewing items with an interval strictly above this many days are
/// displayed as mastered.
pub const MASTERED_INTERVAL: u32 = 21;

/// The scheduling state of an item.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub status: Status,
    /// Index into the learning ladder. Only meaningful while learning.
    pub step_index: u32,
    /// Days until the next review, once the item is reviewing.
    pub interval: u32,
    pub ease_factor: f64,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    /// When the item is next due. `None` if it was never scheduled.
    pub next_review_at: Option<Timestamp>,
    pub last_reviewed_at: Option<Timestamp>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            status: Status::New,
            step_index: 0,
            interval: 0,
            ease_factor: INITIAL_EASE,
            repetitions: 0,
            next_review_at: None,
            last_reviewed_at: None,
        }
    }
}

impl ReviewState {
    /// Repair values that violate the state invariants. Used on anything read
    /// from storage before it reaches the scheduler.
    pub fn normalized(mut self) -> Self {
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE {
            log::warn!(
                "Clamping ease factor {} to {MIN_EASE}.",
                self.ease_factor
            );
            self.ease_factor = MIN_EASE;
        }
        if !self.status.is_learning() {
            self.step_index = 0;
        } else if self.step_index as usize > LEARNING_STEPS.len() {
            log::warn!(
                "Clamping step index {} to {}.",
                self.step_index,
                LEARNING_STEPS.len()
            );
            self.step_index = LEARNING_STEPS.len() as u32;
        }
        self
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.next_review_at {
            Some(due) => due <= now,
            None => false,
        }
    }

    /// Display label only. Never stored.
    pub fn is_mastered(&self) -> bool {
        self.status == Status::Reviewing && self.interval > MASTERED_INTERVAL
    }
}
