//! Persistence of translation tables
//!
//! Each document's table is one durable record. [`JsonDirStore`] keeps them as
//! `<document>.json` files in a directory; [`MemoryStore`] keeps them in
//! memory for tests and dry runs.
//!
//! Every write replaces the whole record. Updates of a single entry go through
//! [`update_entry`], which re-reads the current record right before writing it
//! back so edits made by someone else since the corpus was loaded survive.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{CarryError, CarryResult};
use crate::table::{TranslationEntry, TranslationTable};

/// Keyed storage for translation tables, one record per document
pub trait TableStore {
    /// Names of all stored documents in ascending order
    fn documents(&self) -> CarryResult<Vec<String>>;

    /// Load a document's table, `Ok(None)` if it has never been written
    fn load(&self, document: &str) -> CarryResult<Option<TranslationTable>>;

    /// Replace a document's table as a whole
    fn save(&self, document: &str, table: &TranslationTable) -> CarryResult<()>;

    /// Load a table, treating a missing or unparsable record as empty
    ///
    /// The unparsable record itself is left untouched until a later save
    /// replaces it.
    fn load_or_empty(&self, document: &str) -> CarryResult<TranslationTable> {
        match self.load(document) {
            Ok(table) => Ok(table.unwrap_or_default()),
            Err(CarryError::MalformedTable { document, reason }) => {
                warn!(
                    document = %document,
                    "could not load existing translations, starting empty: {}", reason
                );
                Ok(TranslationTable::new())
            }
            Err(err) => Err(err),
        }
    }
}

/// Result of a single-entry update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryUpdate {
    /// The entry changed and the record was persisted
    Written,
    /// The entry already had the wanted content; nothing was written
    Unchanged,
    /// The document or the entry no longer exists
    Missing,
}

/// Read the current record, apply `change` to one entry and persist if it
/// reported a modification
///
/// This is the unit of durability for audits: once it returns `Written` the
/// change is on disk, and re-running it with the same change yields
/// `Unchanged`.
pub fn update_entry<S, F>(
    store: &S,
    document: &str,
    order: u32,
    change: F,
) -> CarryResult<EntryUpdate>
where
    S: TableStore + ?Sized,
    F: FnOnce(&mut TranslationEntry) -> bool,
{
    let mut table = match store.load(document) {
        Ok(Some(table)) => table,
        Ok(None) => return Ok(EntryUpdate::Missing),
        Err(CarryError::MalformedTable { document, reason }) => {
            warn!(document = %document, order, "cannot update entry: {}", reason);
            return Ok(EntryUpdate::Missing);
        }
        Err(err) => return Err(err),
    };

    let Some(entry) = table.get_mut(order) else {
        return Ok(EntryUpdate::Missing);
    };
    if !change(entry) {
        return Ok(EntryUpdate::Unchanged);
    }

    store.save(document, &table)?;
    Ok(EntryUpdate::Written)
}

/// Set an entry's target text unless it already equals `target` (ignoring
/// surrounding whitespace)
pub fn set_target<S: TableStore + ?Sized>(
    store: &S,
    document: &str,
    order: u32,
    target: &str,
) -> CarryResult<EntryUpdate> {
    update_entry(store, document, order, |entry| {
        if entry.target_text.trim() == target {
            return false;
        }
        entry.target_text = target.to_string();
        true
    })
}

/// Tables stored as `<document>.json` files in one directory
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `document`
    pub fn path_for(&self, document: &str) -> CarryResult<PathBuf> {
        validate_document_name(document)?;
        Ok(self.dir.join(format!("{}.json", document)))
    }
}

impl TableStore for JsonDirStore {
    fn documents(&self) -> CarryResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(CarryError::io(&self.dir, err)),
        };

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CarryError::io(&self.dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                documents.push(stem.to_string());
            }
        }

        documents.sort();
        Ok(documents)
    }

    fn load(&self, document: &str) -> CarryResult<Option<TranslationTable>> {
        let path = self.path_for(document)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                return Err(CarryError::MalformedTable {
                    document: document.to_string(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(CarryError::io(&path, err)),
        };
        TranslationTable::from_json(document, &content).map(Some)
    }

    fn save(&self, document: &str, table: &TranslationTable) -> CarryResult<()> {
        let path = self.path_for(document)?;
        let json = table.to_json()?;

        fs::create_dir_all(&self.dir).map_err(|e| CarryError::io(&self.dir, e))?;
        // Write next to the target and rename so readers never see half a file.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| CarryError::io(&self.dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| CarryError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| CarryError::io(&path, e.error))?;
        Ok(())
    }
}

fn validate_document_name(document: &str) -> CarryResult<()> {
    let invalid = document.is_empty()
        || document == "."
        || document == ".."
        || document.contains(['/', '\\', '\0']);
    if invalid {
        return Err(CarryError::InvalidDocumentName(document.to_string()));
    }
    Ok(())
}

/// In-memory store holding the serialized form of each table
///
/// Records are kept as JSON text so that malformed records can be planted and
/// every load goes through the same parser as the file store. Writes can be
/// made to fail after a number of successful ones to exercise abort paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
    fail_after: Cell<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, builder style
    pub fn with_table(self, document: &str, table: &TranslationTable) -> Self {
        self.insert_raw(document, &table.to_json().unwrap_or_default());
        self
    }

    /// Store raw record text, valid or not
    pub fn insert_raw(&self, document: &str, json: &str) {
        self.records
            .borrow_mut()
            .insert(document.to_string(), json.to_string());
    }

    /// Raw record text of a document
    pub fn raw(&self, document: &str) -> Option<String> {
        self.records.borrow().get(document).cloned()
    }

    /// Parsed table of a document, `None` if absent or malformed
    pub fn table(&self, document: &str) -> Option<TranslationTable> {
        self.load(document).ok().flatten()
    }

    /// Number of successful saves so far
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make every save after the next `successful` ones fail
    pub fn fail_after(&self, successful: usize) {
        self.fail_after.set(Some(self.writes.get() + successful));
    }
}

impl TableStore for MemoryStore {
    fn documents(&self) -> CarryResult<Vec<String>> {
        Ok(self.records.borrow().keys().cloned().collect())
    }

    fn load(&self, document: &str) -> CarryResult<Option<TranslationTable>> {
        match self.records.borrow().get(document) {
            Some(json) => TranslationTable::from_json(document, json).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, document: &str, table: &TranslationTable) -> CarryResult<()> {
        if self.fail_after.get().is_some_and(|limit| self.writes.get() >= limit) {
            return Err(CarryError::io(
                document,
                std::io::Error::other("simulated write failure"),
            ));
        }
        let json = table.to_json()?;
        self.records
            .borrow_mut()
            .insert(document.to_string(), json);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
