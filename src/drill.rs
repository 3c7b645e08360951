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

//! An interactive review session in the terminal.
//!
//! Ratings update the in-memory collection immediately. The new state is
//! written to the database on a background thread, and a failed write never
//! rolls back the in-memory state.

use std::io::BufRead;
use std::io::Write;

use clap::ValueEnum;
use tokio::runtime::Builder;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::collection::Collection;
use crate::collection::rate_item;
use crate::db::Database;
use crate::db::ProgressStore;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::projection::due_items;
use crate::projection::get_stats;
use crate::types::item::Item;
use crate::types::item::VocabEntry;
use crate::types::item_id::ItemId;
use crate::types::quality::Quality;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    /// Review the items that are due, until none are left.
    Review,
    /// Go through every item in the deck, in order.
    Learn,
    /// Show the meaning and type the word from memory.
    Write,
}

#[derive(Debug, PartialEq)]
pub struct Summary {
    pub reviewed: usize,
    pub failed_writes: usize,
    /// The collection as it stands at the end of the session.
    #[allow(dead_code)]
    pub items: Vec<Item>,
}

/// What the user typed at a prompt.
enum Input {
    Continue,
    Rate(Quality),
    Quit,
    Invalid,
}

pub fn run_drill<R: BufRead, W: Write>(
    coll: Collection,
    mode: Mode,
    input: R,
    output: W,
) -> Fallible<Summary> {
    drill(coll, mode, input, output, Timestamp::now)
}

fn drill<R: BufRead, W: Write, C: Fn() -> Timestamp>(
    coll: Collection,
    mode: Mode,
    mut input: R,
    mut output: W,
    clock: C,
) -> Fallible<Summary> {
    let rt: Runtime = Builder::new_multi_thread().worker_threads(1).build()?;
    let Collection {
        directory,
        config,
        db,
        deck_id,
        mut items,
    } = coll;

    let mut queue: Vec<ItemId> = match mode {
        Mode::Review => due_ids(&items, clock()),
        Mode::Learn | Mode::Write => items.iter().map(|item| item.id().clone()).collect(),
    };
    writeln!(
        output,
        "Drilling deck {deck_id} in {}: {} items.",
        directory.display(),
        queue.len()
    )?;

    let mut pending: Vec<JoinHandle<Fallible<()>>> = Vec::new();
    let mut reviewed = 0;
    'session: while !queue.is_empty() {
        for (index, id) in queue.iter().enumerate() {
            let Some(item) = items.iter().find(|item| item.id() == id) else {
                continue;
            };
            let entry: VocabEntry = item.entry.clone();
            writeln!(output)?;
            let answered = match mode {
                Mode::Review | Mode::Learn => {
                    ask_recall(&mut input, &mut output, &entry, index, queue.len())?
                }
                Mode::Write => ask_writing(&mut input, &mut output, &entry, index, queue.len())?,
            };
            if !answered {
                break 'session;
            }
            write_answer(&mut output, &entry, mode)?;
            let quality = loop {
                writeln!(output, "Rating: 1 = Again, 2 = Hard, 3 = Good, 4 = Easy")?;
                match read_input(&mut input)? {
                    Input::Rate(quality) => break quality,
                    Input::Quit => break 'session,
                    Input::Continue | Input::Invalid => {
                        writeln!(output, "Invalid input. Please enter a number between 1 and 4.")?;
                    }
                }
            };

            let reviewed_at = clock();
            let (next_items, state) = rate_item(items, id, quality, reviewed_at)?;
            items = next_items;
            reviewed += 1;
            if let Some(due) = state.next_review_at {
                writeln!(output, "Next review: {due}")?;
            }
            pending.push(persist(
                &rt,
                db.clone(),
                config.user.clone(),
                deck_id.clone(),
                id.clone(),
                state,
                quality,
                reviewed_at,
            ));
        }
        // Items that lapsed during the pass come back once they are due.
        queue = match mode {
            Mode::Review => due_ids(&items, clock()),
            Mode::Learn | Mode::Write => Vec::new(),
        };
        if !queue.is_empty() {
            writeln!(output)?;
            writeln!(output, "{} items are due again.", queue.len())?;
        }
    }

    let mut failed_writes = 0;
    for handle in pending {
        let result = rt.block_on(handle).map_err(ErrorReport::from).and_then(|r| r);
        if let Err(e) = result {
            log::error!("Failed to save progress: {e}");
            failed_writes += 1;
        }
    }

    let stats = get_stats(&items, clock());
    writeln!(output)?;
    writeln!(output, "Session completed: {reviewed} reviewed.")?;
    writeln!(
        output,
        "Due: {}, new: {}, learning: {}, reviewing: {}, mastered: {}.",
        stats.due, stats.new, stats.learning, stats.reviewing, stats.mastered
    )?;
    if failed_writes > 0 {
        writeln!(
            output,
            "Warning: {failed_writes} reviews could not be saved."
        )?;
    }
    Ok(Summary {
        reviewed,
        failed_writes,
        items,
    })
}

fn due_ids(items: &[Item], now: Timestamp) -> Vec<ItemId> {
    due_items(items, now)
        .into_iter()
        .map(|item| item.id().clone())
        .collect()
}

/// Show the headword and wait for the user to reveal the answer. Returns
/// false if the user quit.
fn ask_recall<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    entry: &VocabEntry,
    index: usize,
    total: usize,
) -> Fallible<bool> {
    writeln!(output, "[{}/{}] {}", index + 1, total, entry.headword)?;
    writeln!(output, "(press Enter to reveal, q to quit)")?;
    loop {
        match read_input(input)? {
            Input::Continue => return Ok(true),
            Input::Quit => return Ok(false),
            _ => continue,
        }
    }
}

/// Show the meaning and have the user type the headword until it matches,
/// or they give up with an empty line. Returns false if the user quit.
fn ask_writing<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    entry: &VocabEntry,
    index: usize,
    total: usize,
) -> Fallible<bool> {
    writeln!(output, "[{}/{}] {}", index + 1, total, entry.meaning)?;
    if !entry.reading.is_empty() {
        writeln!(output, "({})", entry.reading)?;
    }
    writeln!(output, "(type the word, Enter to reveal, q to quit)")?;
    loop {
        let Some(line) = read_line(input)? else {
            return Ok(false);
        };
        match line.trim() {
            "" => return Ok(true),
            "q" | "Q" => return Ok(false),
            answer if answer == entry.headword => {
                writeln!(output, "Correct!")?;
                return Ok(true);
            }
            _ => writeln!(output, "Incorrect, try again.")?,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn persist(
    rt: &Runtime,
    db: Database,
    user: String,
    deck: String,
    item: ItemId,
    state: ReviewState,
    quality: Quality,
    reviewed_at: Timestamp,
) -> JoinHandle<Fallible<()>> {
    rt.spawn_blocking(move || {
        db.save_progress(&user, &deck, &item, &state)?;
        db.record_review(&user, &deck, &item, reviewed_at, quality)
    })
}

/// Read one line, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn read_input<R: BufRead>(input: &mut R) -> Fallible<Input> {
    match read_line(input)? {
        Some(line) => Ok(parse_input(line.trim())),
        None => Ok(Input::Quit),
    }
}

fn parse_input(line: &str) -> Input {
    match line {
        "" => Input::Continue,
        "q" | "Q" => Input::Quit,
        "1" => Input::Rate(Quality::Again),
        "2" => Input::Rate(Quality::Hard),
        "3" => Input::Rate(Quality::Good),
        "4" => Input::Rate(Quality::Easy),
        _ => Input::Invalid,
    }
}

fn write_answer<W: Write>(output: &mut W, entry: &VocabEntry, mode: Mode) -> Fallible<()> {
    let headword = match mode {
        Mode::Write => entry.headword.as_str(),
        Mode::Review | Mode::Learn => "",
    };
    let fields = [
        ("Word", headword),
        ("Reading", entry.reading.as_str()),
        ("Sino reading", entry.sino_reading.as_str()),
        ("Meaning", entry.meaning.as_str()),
        ("Mnemonic", entry.mnemonic.as_str()),
        ("Example", entry.example.as_str()),
        ("Translation", entry.translation.as_str()),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            writeln!(output, "{label}: {value}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs::write;
    use std::io::Cursor;

    use tempfile::tempdir;

    use super::*;
    use crate::types::status::Status;

    const DECK: &str = r#"[
        {"id": "1", "han": "我", "pinyin": "wǒ", "nghĩa": "I"},
        {"id": "2", "han": "你", "pinyin": "nǐ", "nghĩa": "you"},
        {"id": "3", "han": "他", "pinyin": "tā", "nghĩa": "he"}
    ]"#;

    fn collection(dir: &tempfile::TempDir) -> Fallible<Collection> {
        write(dir.path().join("hsk1.json"), DECK)?;
        Collection::new(Some(dir.path().display().to_string()), "hsk1")
    }

    #[test]
    fn test_learn_session() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = collection(&dir)?;
        // Item 1: reveal, then an invalid rating, then Good.
        // Item 2: reveal, Easy.
        // Item 3: quit before revealing.
        let input = Cursor::new("\n7\n3\n\n4\nq\n");
        let mut output = Vec::new();
        let summary = run_drill(coll, Mode::Learn, input, &mut output)?;
        assert_eq!(summary.reviewed, 2);
        assert_eq!(summary.failed_writes, 0);
        assert_eq!(summary.items[0].state.status, Status::Learning);
        assert_eq!(summary.items[1].state.status, Status::Reviewing);
        assert_eq!(summary.items[2].state.status, Status::New);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("[1/3] 我"));
        assert!(text.contains("Reading: wǒ"));
        assert!(text.contains("Meaning: you"));
        assert!(text.contains("Invalid input."));
        assert!(text.contains("Session completed: 2 reviewed."));

        // The reviews were persisted.
        let coll = collection(&dir)?;
        assert_eq!(coll.items[0].state.status, Status::Learning);
        assert_eq!(coll.items[1].state.interval, 4);
        assert_eq!(
            coll.db
                .today_review_count("local", "hsk1", Timestamp::now().local_date())?,
            2
        );
        Ok(())
    }

    #[test]
    fn test_review_session_with_nothing_due() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = collection(&dir)?;
        let mut output = Vec::new();
        let summary = run_drill(coll, Mode::Review, Cursor::new(""), &mut output)?;
        assert_eq!(summary.reviewed, 0);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains(": 0 items."));
        Ok(())
    }

    #[test]
    fn test_end_of_input_ends_session() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = collection(&dir)?;
        let summary = run_drill(coll, Mode::Learn, Cursor::new("\n"), Vec::new())?;
        assert_eq!(summary.reviewed, 0);
        Ok(())
    }

    #[test]
    fn test_write_session() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = collection(&dir)?;
        // Item 1: a wrong guess, then the right one, then Good.
        // Item 2: give up with an empty line, then Again.
        // Item 3: quit.
        let input = Cursor::new("你\n我\n3\n\n1\nq\n");
        let mut output = Vec::new();
        let summary = run_drill(coll, Mode::Write, input, &mut output)?;
        assert_eq!(summary.reviewed, 2);
        assert_eq!(summary.items[0].state.step_index, 1);
        assert_eq!(summary.items[1].state.status, Status::Learning);
        assert_eq!(summary.items[1].state.step_index, 0);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("[1/3] I\n(wǒ)"));
        assert!(!text.contains("[1/3] 我"));
        assert_eq!(text.matches("Incorrect, try again.").count(), 1);
        assert_eq!(text.matches("Correct!").count(), 1);
        assert!(text.contains("Word: 我"));
        assert!(text.contains("Word: 你"));
        Ok(())
    }

    #[test]
    fn test_lapsed_items_come_back() -> Fallible<()> {
        let dir = tempdir()?;
        let start = Timestamp::parse("2025-06-01T09:00:00Z")?;
        let stored = ReviewState {
            status: Status::Reviewing,
            interval: 6,
            repetitions: 2,
            next_review_at: Some(start),
            last_reviewed_at: None,
            ..Default::default()
        };
        collection(&dir)?
            .db
            .save_progress("local", "hsk1", &ItemId::new("2"), &stored)?;
        let coll = collection(&dir)?;

        // Every reading of the clock moves it forward five minutes.
        let time = Cell::new(start);
        let clock = || {
            let now = time.get().add_minutes(5);
            time.set(now);
            now
        };
        // Item 2: Again. It is due again a minute later, so it returns: Easy.
        let input = Cursor::new("\n1\n\n4\n");
        let mut output = Vec::new();
        let summary = drill(coll, Mode::Review, input, &mut output, clock)?;
        assert_eq!(summary.reviewed, 2);
        assert_eq!(summary.items[1].state.status, Status::Reviewing);
        assert_eq!(summary.items[1].state.interval, 4);
        assert_eq!(summary.items[0].state.status, Status::New);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains(": 1 items."));
        assert!(text.contains("1 items are due again."));
        assert!(text.contains("Session completed: 2 reviewed."));
        Ok(())
    }
}
