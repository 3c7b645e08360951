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

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs::read_to_string;
use std::fs::write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::item::VocabEntry;
use crate::types::item_id::ItemId;

/// Find the deck files under a directory, keyed by deck ID (the file stem).
pub fn find_decks(directory: &Path) -> Fallible<BTreeMap<String, PathBuf>> {
    let mut decks = BTreeMap::new();
    for entry in WalkDir::new(directory) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(existing) = decks.insert(stem.to_string(), path.to_path_buf()) {
                return fail(format!(
                    "deck '{stem}' is defined twice: {} and {}",
                    existing.display(),
                    path.display()
                ));
            }
        }
    }
    Ok(decks)
}

/// Load a deck by ID from a collection directory.
pub fn load_deck(directory: &Path, deck_id: &str) -> Fallible<Vec<VocabEntry>> {
    let decks = find_decks(directory)?;
    match decks.get(deck_id) {
        Some(path) => parse_deck_file(path),
        None => fail(format!("no deck named '{deck_id}'.")),
    }
}

pub fn parse_deck_file(path: &Path) -> Fallible<Vec<VocabEntry>> {
    let contents = read_to_string(path)?;
    parse_deck(&contents)
        .map_err(|e| ErrorReport::new(format!("{}: {}", path.display(), e.message())))
}

/// Parse a deck's JSON text into canonical entries.
pub fn parse_deck(contents: &str) -> Fallible<Vec<VocabEntry>> {
    let raw: Vec<RawEntry> = serde_json::from_str(contents)?;
    let entries: Vec<VocabEntry> = raw
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.normalize(index))
        .collect();
    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(&entry.id) {
            return fail(format!("duplicate item ID: {}", entry.id));
        }
    }
    Ok(entries)
}

/// Append an entry to a deck, creating the deck file if there is none.
/// Returns the path of the deck file.
pub fn append_entry(directory: &Path, deck_id: &str, entry: &VocabEntry) -> Fallible<PathBuf> {
    let path = match find_decks(directory)?.remove(deck_id) {
        Some(path) => path,
        None => directory.join(format!("{deck_id}.json")),
    };
    let mut raw: Vec<Value> = if path.exists() {
        let contents = read_to_string(&path)?;
        if parse_deck(&contents)?.iter().any(|e| e.id == entry.id) {
            return fail(format!("duplicate item ID: {}", entry.id));
        }
        serde_json::from_str(&contents)?
    } else {
        log::info!("Creating deck file {}.", path.display());
        Vec::new()
    };
    raw.push(serde_json::to_value(DeckEntry::from(entry))?);
    write(&path, serde_json::to_string_pretty(&raw)? + "\n")?;
    Ok(path)
}

/// An entry as written to a deck file, using the primary field names.
#[derive(Serialize)]
struct DeckEntry<'a> {
    id: &'a str,
    han: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinyin: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hanviet: Option<&'a str>,
    #[serde(rename = "nghĩa")]
    nghia: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    chineasy: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    translation: Option<&'a str>,
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

impl<'a> From<&'a VocabEntry> for DeckEntry<'a> {
    fn from(entry: &'a VocabEntry) -> Self {
        Self {
            id: entry.id.as_str(),
            han: &entry.headword,
            pinyin: non_empty(&entry.reading),
            hanviet: non_empty(&entry.sino_reading),
            nghia: &entry.meaning,
            chineasy: non_empty(&entry.mnemonic),
            context: non_empty(&entry.context),
            example: non_empty(&entry.example),
            translation: non_empty(&entry.translation),
        }
    }
}

/// Entry IDs may be strings or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

/// An entry as it appears in the wild. Content sources disagree on field
/// names, so every known variant is accepted.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawEntry {
    id: Option<RawId>,
    han: Option<String>,
    hanzi: Option<String>,
    pinyin: Option<String>,
    hanviet: Option<String>,
    #[serde(rename = "nghĩa")]
    nghia: Option<String>,
    meaning: Option<String>,
    chineasy: Option<String>,
    context: Option<String>,
    example: Option<String>,
    example_cn: Option<String>,
    translation: Option<String>,
    example_vi: Option<String>,
}

/// The first non-empty value, or the empty string.
fn first(candidates: [Option<String>; 2]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

impl RawEntry {
    fn normalize(self, index: usize) -> VocabEntry {
        let id = match self.id {
            Some(RawId::Text(s)) if !s.is_empty() => ItemId::new(s),
            Some(RawId::Number(n)) => ItemId::new(n.to_string()),
            _ => ItemId::local(index),
        };
        VocabEntry {
            id,
            headword: first([self.han, self.hanzi]),
            reading: self.pinyin.unwrap_or_default(),
            sino_reading: self.hanviet.unwrap_or_default(),
            meaning: first([self.nghia, self.meaning]),
            mnemonic: self.chineasy.unwrap_or_default(),
            context: self.context.unwrap_or_default(),
            example: first([self.example, self.example_cn]),
            translation: first([self.translation, self.example_vi]),
        }
    }
}
