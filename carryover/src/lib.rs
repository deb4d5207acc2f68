//! Carry human translations forward across revisions of a source text
//!
//! A document is extracted into numbered segments (`@(N):text` lines). Each
//! document owns a translation table mapping those order numbers to a source
//! text and its translation. When the source is revised and re-extracted, the
//! numbering shifts; [`reconcile`] rebuilds the table on the new numbering and
//! carries every existing translation whose source text is still there,
//! verbatim or nearly so.
//!
//! The [`audit`] module then works across all tables at once: it finds source
//! texts translated inconsistently, translations that look truncated, and
//! untranslated entries that can be filled from identical sources elsewhere.
//! Whenever more than one answer is plausible it asks a [`Resolver`].
//!
//! # Example
//!
//! ```
//! use carryover::{MemoryStore, TableStore, parse_segments, reconcile};
//!
//! let store = MemoryStore::new();
//!
//! let first = parse_segments("@(1):Hallo Welt\n@(2):Ende\n");
//! reconcile(&store, "deck", &first, 0.9)?;
//! carryover::store::set_target(&store, "deck", 1, "Hello World")?;
//!
//! // A slide was inserted; everything moves down by one.
//! let revised = parse_segments("@(1):Neu\n@(2):Hallo Welt\n@(3):Ende\n");
//! let report = reconcile(&store, "deck", &revised, 0.9)?;
//!
//! let table = store.load("deck")?.unwrap_or_default();
//! assert_eq!(table.get(2).map(|e| e.target_text.as_str()), Some("Hello World"));
//! assert_eq!(report.map(|r| r.preserved), Some(1));
//! # Ok::<(), carryover::CarryError>(())
//! ```

pub mod aligner;
pub mod audit;
pub mod corpus;
pub mod error;
pub mod export;
pub mod merge;
pub mod report;
pub mod resolver;
pub mod segment;
pub mod similarity;
pub mod store;
pub mod table;

// Re-export main types for convenient access
pub use aligner::{Alignment, DEFAULT_SIMILARITY_THRESHOLD, align, find_best_match, reconcile};
pub use audit::{
    DEFAULT_SHORT_RATIO, apply_canonical, fill_exact_matches, find_inconsistencies,
    find_short_translations, preview_exact_matches,
};
pub use corpus::{Corpus, Location, load_corpus};
pub use error::{CarryError, CarryResult};
pub use report::ReconcileReport;
pub use resolver::{Resolution, Resolver};
pub use segment::{Segment, parse_segments, read_segments};
pub use similarity::similarity;
pub use store::{JsonDirStore, MemoryStore, TableStore};
pub use table::{TranslationEntry, TranslationTable};
