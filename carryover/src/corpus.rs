//! The corpus: every translation table, keyed by document name
//!
//! The auditor reads the corpus as a global multimap from source text to the
//! distinct translations recorded for it. Texts are compared after trimming
//! surrounding whitespace; blank sources and blank targets never enter the
//! index.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{CarryError, CarryResult};
use crate::store::TableStore;
use crate::table::TranslationTable;

pub type Corpus = BTreeMap<String, TranslationTable>;

/// One occurrence of a translated entry in the corpus
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub document: String,
    pub order: u32,
    pub target_text: String,
}

/// Load every stored table
///
/// Tables that fail to parse are left out with a warning.
pub fn load_corpus<S: TableStore + ?Sized>(store: &S) -> CarryResult<Corpus> {
    let mut corpus = Corpus::new();
    for document in store.documents()? {
        match store.load(&document) {
            Ok(Some(table)) => {
                corpus.insert(document, table);
            }
            Ok(None) => {}
            Err(CarryError::MalformedTable { reason, .. }) => {
                warn!(document = %document, "skipping unreadable table: {}", reason);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(corpus)
}

/// Source text → distinct non-empty translations across the corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceIndex {
    targets: BTreeMap<String, BTreeSet<String>>,
}

impl SourceIndex {
    pub fn build(corpus: &Corpus) -> Self {
        let mut targets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for table in corpus.values() {
            for entry in table {
                let source = entry.source_text.trim();
                let target = entry.target_text.trim();
                if source.is_empty() || target.is_empty() {
                    continue;
                }
                targets
                    .entry(source.to_string())
                    .or_default()
                    .insert(target.to_string());
            }
        }
        Self { targets }
    }

    /// Known translations of `source` in ascending order
    pub fn candidates(&self, source: &str) -> Option<&BTreeSet<String>> {
        self.targets.get(source.trim())
    }

    /// Number of distinct source texts with at least one translation
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.targets.iter()
    }
}

/// All translated occurrences of `source`, ordered by document and order
pub fn locations_of(corpus: &Corpus, source: &str) -> Vec<Location> {
    let source = source.trim();
    let mut locations = Vec::new();
    for (document, table) in corpus {
        for entry in table {
            let target = entry.target_text.trim();
            if entry.source_text.trim() == source && !target.is_empty() {
                locations.push(Location {
                    document: document.clone(),
                    order: entry.order,
                    target_text: target.to_string(),
                });
            }
        }
    }
    locations
}
