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

//! The review scheduler: SM-2 with an intraday learning ladder.

use crate::types::quality::Quality;
use crate::types::review_state::MIN_EASE;
use crate::types::review_state::ReviewState;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// Intraday delays, in minutes, before an item reaches a daily interval.
pub const LEARNING_STEPS: [u32; 2] = [1, 10];

/// Interval in days when an item graduates off the ladder.
pub const GRADUATING_INTERVAL: u32 = 1;

/// Interval in days when an item graduates early with an Easy rating.
pub const EASY_INTERVAL: u32 = 4;

/// Ease factor penalty for a lapse.
const LAPSE_PENALTY: f64 = 0.2;

const HARD_MODIFIER: f64 = 0.85;

const EASY_MODIFIER: f64 = 1.3;

/// Compute an item's next review state from a rating.
///
/// This is a pure function: the current time is passed in, and the only
/// output is the returned state.
pub fn calculate_next_review(quality: Quality, state: &ReviewState, now: Timestamp) -> ReviewState {
    let state = state.clone().normalized();
    if !quality.is_pass() {
        return lapse(&state, now);
    }
    match state.status {
        Status::New | Status::Learning | Status::Relearning => learn(quality, &state, now),
        Status::Reviewing => review(quality, &state, now),
    }
}

fn lapse(state: &ReviewState, now: Timestamp) -> ReviewState {
    let ease_factor = if state.status == Status::Reviewing {
        f64::max(MIN_EASE, state.ease_factor - LAPSE_PENALTY)
    } else {
        state.ease_factor
    };
    ReviewState {
        status: Status::Learning,
        step_index: 0,
        interval: 0,
        ease_factor,
        repetitions: 0,
        next_review_at: Some(now.add_minutes(LEARNING_STEPS[0])),
        last_reviewed_at: Some(now),
    }
}

fn learn(quality: Quality, state: &ReviewState, now: Timestamp) -> ReviewState {
    let (status, step_index) = match state.status {
        Status::New => (Status::Learning, 0),
        status => (status, state.step_index),
    };
    if quality == Quality::Easy {
        return graduate(state, EASY_INTERVAL, now);
    }
    // Hard and Good advance the ladder identically.
    let step_index = step_index.saturating_add(1);
    match LEARNING_STEPS.get(step_index as usize) {
        Some(&minutes) => ReviewState {
            status,
            step_index,
            interval: state.interval,
            ease_factor: state.ease_factor,
            repetitions: state.repetitions,
            next_review_at: Some(now.add_minutes(minutes)),
            last_reviewed_at: Some(now),
        },
        None => graduate(state, GRADUATING_INTERVAL, now),
    }
}

fn graduate(state: &ReviewState, interval: u32, now: Timestamp) -> ReviewState {
    ReviewState {
        status: Status::Reviewing,
        step_index: 0,
        interval,
        ease_factor: state.ease_factor,
        repetitions: state.repetitions,
        next_review_at: Some(now.add_days(interval)),
        last_reviewed_at: Some(now),
    }
}

fn review(quality: Quality, state: &ReviewState, now: Timestamp) -> ReviewState {
    let ease_factor = new_ease(state.ease_factor, quality);
    let interval = match state.repetitions {
        0 => 1,
        1 => 6,
        _ => {
            let modifier = match quality {
                Quality::Hard => HARD_MODIFIER,
                Quality::Easy => EASY_MODIFIER,
                _ => 1.0,
            };
            (state.interval as f64 * ease_factor * modifier).round() as u32
        }
    };
    ReviewState {
        status: Status::Reviewing,
        step_index: 0,
        interval,
        ease_factor,
        repetitions: state.repetitions.saturating_add(1),
        next_review_at: Some(now.add_days(interval)),
        last_reviewed_at: Some(now),
    }
}

/// The classical SM-2 ease update, floored at [`MIN_EASE`].
fn new_ease(ease_factor: f64, quality: Quality) -> f64 {
    let q = (5 - quality.value()) as f64;
    f64::max(MIN_EASE, ease_factor + 0.1 - q * (0.08 + q * 0.02))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::parse("2025-06-01T09:00:00Z").unwrap()
    }

    fn reviewing(interval: u32, repetitions: u32, ease_factor: f64) -> ReviewState {
        ReviewState {
            status: Status::Reviewing,
            step_index: 0,
            interval,
            ease_factor,
            repetitions,
            next_review_at: Some(now()),
            last_reviewed_at: None,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_new_good_enters_second_step() {
        let next = calculate_next_review(Quality::Good, &ReviewState::default(), now());
        assert_eq!(next.status, Status::Learning);
        assert_eq!(next.step_index, 1);
        assert_eq!(next.interval, 0);
        assert_eq!(next.next_review_at, Some(now().add_minutes(10)));
        assert_eq!(next.last_reviewed_at, Some(now()));
    }

    #[test]
    fn test_learning_good_graduates() {
        let state = ReviewState {
            status: Status::Learning,
            step_index: 1,
            ..Default::default()
        };
        let next = calculate_next_review(Quality::Good, &state, now());
        assert_eq!(next.status, Status::Reviewing);
        assert_eq!(next.interval, 1);
        assert_eq!(next.step_index, 0);
        assert_eq!(next.next_review_at, Some(now().add_days(1)));
    }

    #[test]
    fn test_reviewing_good_grows_interval() {
        // Good leaves the ease unchanged: 0.1 - 1 * (0.08 + 0.02) = 0.
        let next = calculate_next_review(Quality::Good, &reviewing(6, 2, 2.5), now());
        assert_close(next.ease_factor, 2.5);
        assert_eq!(next.interval, 15);
        assert_eq!(next.repetitions, 3);
        assert_eq!(next.status, Status::Reviewing);
        assert_eq!(next.next_review_at, Some(now().add_days(15)));
    }

    #[test]
    fn test_reviewing_again_lapses() {
        let next = calculate_next_review(Quality::Again, &reviewing(16, 3, 2.6), now());
        assert_eq!(next.status, Status::Learning);
        assert_eq!(next.interval, 0);
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.step_index, 0);
        assert_close(next.ease_factor, 2.4);
        assert_eq!(next.next_review_at, Some(now().add_minutes(1)));
    }

    #[test]
    fn test_new_easy_graduates_immediately() {
        let next = calculate_next_review(Quality::Easy, &ReviewState::default(), now());
        assert_eq!(next.status, Status::Reviewing);
        assert_eq!(next.interval, 4);
        assert_eq!(next.step_index, 0);
        assert_eq!(next.next_review_at, Some(now().add_days(4)));
    }

    #[test]
    fn test_new_hard_matches_good() {
        let hard = calculate_next_review(Quality::Hard, &ReviewState::default(), now());
        let good = calculate_next_review(Quality::Good, &ReviewState::default(), now());
        assert_eq!(hard, good);
    }

    #[test]
    fn test_learning_again_keeps_ease() {
        let state = ReviewState {
            status: Status::Learning,
            step_index: 1,
            ease_factor: 2.1,
            ..Default::default()
        };
        let next = calculate_next_review(Quality::Again, &state, now());
        assert_eq!(next.ease_factor, 2.1);
        assert_eq!(next.step_index, 0);
    }

    #[test]
    fn test_lapse_penalty_is_floored() {
        let next = calculate_next_review(Quality::Again, &reviewing(10, 4, 1.35), now());
        assert_eq!(next.ease_factor, MIN_EASE);
    }

    #[test]
    fn test_relearning_stays_relearning_on_ladder() {
        let state = ReviewState {
            status: Status::Relearning,
            step_index: 0,
            ..Default::default()
        };
        let next = calculate_next_review(Quality::Good, &state, now());
        assert_eq!(next.status, Status::Relearning);
        assert_eq!(next.step_index, 1);
        assert_eq!(next.next_review_at, Some(now().add_minutes(10)));
    }

    #[test]
    fn test_first_and_second_review_intervals() {
        let next = calculate_next_review(Quality::Good, &reviewing(1, 0, 2.5), now());
        assert_eq!(next.interval, 1);
        assert_eq!(next.repetitions, 1);
        let next = calculate_next_review(Quality::Good, &next, now());
        assert_eq!(next.interval, 6);
        assert_eq!(next.repetitions, 2);
    }

    #[test]
    fn test_hard_and_easy_modifiers() {
        // Hard: ease 2.5 -> 2.36, interval round(10 * 2.36 * 0.85) = 20.
        let hard = calculate_next_review(Quality::Hard, &reviewing(10, 2, 2.5), now());
        assert_close(hard.ease_factor, 2.36);
        assert_eq!(hard.interval, 20);
        // Easy: ease 2.5 -> 2.6, interval round(10 * 2.6 * 1.3) = 34.
        let easy = calculate_next_review(Quality::Easy, &reviewing(10, 2, 2.5), now());
        assert_close(easy.ease_factor, 2.6);
        assert_eq!(easy.interval, 34);
    }

    #[test]
    fn test_stored_ease_below_floor_is_clamped() {
        let next = calculate_next_review(Quality::Good, &reviewing(6, 2, 0.5), now());
        assert!(next.ease_factor >= MIN_EASE);
    }

    #[test]
    fn test_out_of_range_step_index_graduates() {
        let state = ReviewState {
            status: Status::Learning,
            step_index: u32::MAX,
            ..Default::default()
        };
        let next = calculate_next_review(Quality::Good, &state, now());
        assert_eq!(next.status, Status::Reviewing);
        assert_eq!(next.interval, GRADUATING_INTERVAL);
        assert_eq!(next.step_index, 0);
    }

    #[test]
    fn test_repetitions_saturate() {
        let next = calculate_next_review(Quality::Good, &reviewing(6, u32::MAX, 2.5), now());
        assert_eq!(next.repetitions, u32::MAX);
        assert_eq!(next.interval, 15);
    }

    fn quality() -> impl Strategy<Value = Quality> {
        prop_oneof![
            Just(Quality::Again),
            Just(Quality::Hard),
            Just(Quality::Good),
            Just(Quality::Easy),
        ]
    }

    proptest! {
        #[test]
        fn prop_invariants_hold(ratings in prop::collection::vec(quality(), 1..60)) {
            let mut state = ReviewState::default();
            for quality in ratings {
                state = calculate_next_review(quality, &state, now());
                prop_assert!(state.ease_factor >= MIN_EASE);
                if matches!(state.status, Status::New | Status::Reviewing) {
                    prop_assert_eq!(state.step_index, 0);
                }
                prop_assert_eq!(state.last_reviewed_at, Some(now()));
                prop_assert!(state.next_review_at.is_some());
            }
        }

        #[test]
        fn prop_again_always_resets(
            ratings in prop::collection::vec(quality(), 0..30),
        ) {
            let mut state = ReviewState::default();
            for quality in ratings {
                state = calculate_next_review(quality, &state, now());
            }
            let next = calculate_next_review(Quality::Again, &state, now());
            prop_assert_eq!(next.repetitions, 0);
            prop_assert_eq!(next.interval, 0);
            prop_assert_eq!(next.status, Status::Learning);
        }

        #[test]
        fn prop_easy_never_shrinks_interval(
            interval in 1u32..3650,
            repetitions in 2u32..50,
            ease_factor in 1.3f64..4.0,
        ) {
            let state = reviewing(interval, repetitions, ease_factor);
            let next = calculate_next_review(Quality::Easy, &state, now());
            prop_assert!(next.interval >= interval);
        }
    }
}
