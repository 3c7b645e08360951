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

use std::io::stdin;
use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;

use crate::cmd::add::add_word;
use crate::cmd::check::check_collection;
use crate::cmd::due::list_due;
use crate::cmd::export::export_collection;
use crate::cmd::orphans::list_orphans;
use crate::cmd::rate::rate;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_deck_stats;
use crate::collection::Collection;
use crate::drill::Mode;
use crate::drill::run_drill;
use crate::error::Fallible;
use crate::types::item::VocabEntry;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Drill the items of a deck.
    Drill {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The deck to drill.
        #[arg(long)]
        deck: String,
        /// Which items to drill.
        #[arg(long, value_enum, default_value_t = Mode::Review)]
        mode: Mode,
    },
    /// Rate a single item and print its new review state.
    Rate {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        deck: String,
        /// The item's ID.
        #[arg(long)]
        item: String,
        /// 0 = Again, 3 = Hard, 4 = Good, 5 = Easy.
        #[arg(long)]
        quality: u8,
    },
    /// Add a word to a deck.
    Add {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The deck to add to. Created if it does not exist.
        #[arg(long)]
        deck: String,
        /// The word itself.
        #[arg(long)]
        han: String,
        #[arg(long)]
        meaning: String,
        #[arg(long)]
        pinyin: Option<String>,
        /// Sino-Vietnamese reading.
        #[arg(long)]
        hanviet: Option<String>,
        /// A mnemonic for the word.
        #[arg(long)]
        chineasy: Option<String>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        example: Option<String>,
        /// Translation of the example.
        #[arg(long)]
        translation: Option<String>,
    },
    /// List the items that are due.
    Due {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        deck: String,
    },
    /// Print deck statistics.
    Stats {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        deck: String,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
        /// Compute stats from a JSON dump of progress records instead.
        #[arg(long)]
        from_json: Option<PathBuf>,
    },
    /// Export a deck and its review state as JSON.
    Export {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        deck: String,
    },
    /// Check that every deck in the collection parses.
    Check {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// List items with stored progress that are no longer in the deck.
    Orphans {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        deck: String,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill {
            directory,
            deck,
            mode,
        } => {
            let coll = Collection::new(directory, &deck)?;
            let summary = run_drill(coll, mode, stdin().lock(), stdout().lock())?;
            log::debug!(
                "Drill ended: {} reviewed, {} failed writes.",
                summary.reviewed,
                summary.failed_writes
            );
            Ok(())
        }
        Command::Rate {
            directory,
            deck,
            item,
            quality,
        } => rate(directory, &deck, item, quality),
        Command::Add {
            directory,
            deck,
            han,
            meaning,
            pinyin,
            hanviet,
            chineasy,
            context,
            example,
            translation,
        } => {
            let entry = VocabEntry {
                headword: han,
                meaning,
                reading: pinyin.unwrap_or_default(),
                sino_reading: hanviet.unwrap_or_default(),
                mnemonic: chineasy.unwrap_or_default(),
                context: context.unwrap_or_default(),
                example: example.unwrap_or_default(),
                translation: translation.unwrap_or_default(),
                ..Default::default()
            };
            add_word(directory, &deck, entry)
        }
        Command::Due { directory, deck } => list_due(directory, &deck),
        Command::Stats {
            directory,
            deck,
            format,
            from_json,
        } => print_deck_stats(directory, &deck, format, from_json),
        Command::Export { directory, deck } => export_collection(directory, &deck),
        Command::Check { directory } => check_collection(directory),
        Command::Orphans { directory, deck } => list_orphans(directory, &deck),
    }
}
