//! Translation tables
//!
//! A [`TranslationTable`] is the durable record kept per source document. On
//! disk it is a JSON object keyed by the decimal order number:
//!
//! ```json
//! {
//!   "1": { "source_text": "Hallo Welt", "target_text": "Hello World" },
//!   "2": { "source_text": "Ende", "target_text": "" }
//! }
//! ```
//!
//! Tables written by the older tooling use `german`/`english` as field names;
//! both spellings are accepted when reading.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::error::{CarryError, CarryResult};
use crate::segment::Segment;

/// A source/target text pair keyed by its position number within one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub order: u32,
    pub source_text: String,
    /// Empty when the entry is untranslated
    pub target_text: String,
}

impl TranslationEntry {
    pub fn new(order: u32, source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            order,
            source_text: source_text.into(),
            target_text: target_text.into(),
        }
    }

    /// An entry for `segment` that still awaits a translation
    pub fn untranslated(segment: &Segment) -> Self {
        Self::new(segment.order, segment.text.clone(), String::new())
    }

    /// Check if the entry carries a non-blank translation
    pub fn is_translated(&self) -> bool {
        !self.target_text.trim().is_empty()
    }
}

/// Wire form of one entry; the order lives in the enclosing object key
#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    #[serde(alias = "german", default)]
    source_text: Option<String>,
    #[serde(alias = "english", default)]
    target_text: Option<String>,
}

/// Mapping from order number to entry, iterated in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: BTreeMap<u32, TranslationEntry>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, order: u32) -> bool {
        self.entries.contains_key(&order)
    }

    pub fn get(&self, order: u32) -> Option<&TranslationEntry> {
        self.entries.get(&order)
    }

    pub fn get_mut(&mut self, order: u32) -> Option<&mut TranslationEntry> {
        self.entries.get_mut(&order)
    }

    /// Insert an entry at its own order, returning the one it replaced
    pub fn insert(&mut self, entry: TranslationEntry) -> Option<TranslationEntry> {
        self.entries.insert(entry.order, entry)
    }

    /// Entries in ascending order
    pub fn entries(&self) -> btree_map::Values<'_, u32, TranslationEntry> {
        self.entries.values()
    }

    pub fn orders(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// The source side of the table as a segment sequence
    pub fn segments(&self) -> Vec<Segment> {
        self.entries
            .values()
            .map(|e| Segment::new(e.order, e.source_text.clone()))
            .collect()
    }

    pub fn translated_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_translated()).count()
    }

    pub fn untranslated_count(&self) -> usize {
        self.len() - self.translated_count()
    }

    /// Parse a persisted table
    ///
    /// Any non-integer key or malformed record fails the whole load.
    pub fn from_json(document: &str, json: &str) -> CarryResult<Self> {
        let records: BTreeMap<u32, EntryRecord> =
            serde_json::from_str(json).map_err(|e| CarryError::MalformedTable {
                document: document.to_string(),
                reason: e.to_string(),
            })?;

        Ok(records
            .into_iter()
            .map(|(order, record)| TranslationEntry {
                order,
                source_text: record.source_text.unwrap_or_default(),
                target_text: record.target_text.unwrap_or_default(),
            })
            .collect())
    }

    /// Serialize with keys in ascending numeric order
    pub fn to_json(&self) -> CarryResult<String> {
        let records: BTreeMap<u32, EntryRecord> = self
            .entries
            .values()
            .map(|e| {
                (
                    e.order,
                    EntryRecord {
                        source_text: Some(e.source_text.clone()),
                        target_text: Some(e.target_text.clone()),
                    },
                )
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

impl FromIterator<TranslationEntry> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = TranslationEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|e| (e.order, e)).collect(),
        }
    }
}

impl IntoIterator for TranslationTable {
    type Item = TranslationEntry;
    type IntoIter = btree_map::IntoValues<u32, TranslationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<'a> IntoIterator for &'a TranslationTable {
    type Item = &'a TranslationEntry;
    type IntoIter = btree_map::Values<'a, u32, TranslationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
