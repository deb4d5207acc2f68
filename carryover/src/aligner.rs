//! Entry alignment
//!
//! Aligns a freshly extracted segment set against the previous translation
//! table of the same document. Old entries are recognised by the similarity of
//! their source text, not by their order number, so a translation follows its
//! sentence when slides are reordered or text is inserted above it.
//!
//! The pass is greedy and order-stable: new segments are visited in ascending
//! order and each one takes the best not-yet-consumed old entry scoring at
//! least the threshold. Exact score ties go to the lowest old order number.
//! Old entries left over afterwards are kept when their order number is still
//! free and dropped (and reported) when a new entry already occupies it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::error::CarryResult;
use crate::report::ReconcileReport;
use crate::segment::Segment;
use crate::similarity::{similarity, similarity_upper_bound};
use crate::store::TableStore;
use crate::table::{TranslationEntry, TranslationTable};

/// Minimum similarity for an old entry to pass its translation on
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Best candidate found for one new segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub old_order: u32,
    pub score: f64,
}

/// A translation carried from an old entry to a new one
#[derive(Debug, Clone, PartialEq)]
pub struct CarriedEntry {
    pub new_order: u32,
    pub old_order: u32,
    pub score: f64,
}

/// Outcome of aligning one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    pub table: TranslationTable,
    pub carried: Vec<CarriedEntry>,
    /// Unmatched old entries kept at their old order
    pub retained_unmatched: BTreeSet<u32>,
    /// Unmatched old entries discarded because a new entry took their order
    pub dropped_conflicts: BTreeSet<u32>,
    /// The discarded entries themselves, so lost translations can be shown
    pub dropped_entries: Vec<TranslationEntry>,
}

/// Find the best unconsumed old entry for `text`
///
/// Only scores `>= threshold` count. A later candidate replaces the current
/// best only with a strictly higher score, and candidates are visited in
/// ascending order, so ties resolve to the lowest order number.
pub fn find_best_match(
    text: &str,
    old_table: &TranslationTable,
    consumed: &BTreeSet<u32>,
    threshold: f64,
) -> Option<Match> {
    let mut best: Option<Match> = None;

    for entry in old_table.entries() {
        if consumed.contains(&entry.order) {
            continue;
        }

        let bound = similarity_upper_bound(text, &entry.source_text);
        if bound < threshold || best.is_some_and(|b| bound <= b.score) {
            continue;
        }

        let score = similarity(text, &entry.source_text);
        if score >= threshold && best.is_none_or(|b| score > b.score) {
            best = Some(Match {
                old_order: entry.order,
                score,
            });
        }
    }

    best
}

/// Align `new_segments` against `old_table`
///
/// If the same order number occurs more than once in `new_segments`, the last
/// occurrence is used.
///
/// # Example
///
/// ```
/// use carryover::aligner::{align, DEFAULT_SIMILARITY_THRESHOLD};
/// use carryover::segment::Segment;
/// use carryover::table::{TranslationEntry, TranslationTable};
///
/// let old: TranslationTable = [TranslationEntry::new(1, "Hallo Welt", "Hello World")]
///     .into_iter()
///     .collect();
/// let result = align(&[Segment::new(5, "Hallo Welt")], &old, DEFAULT_SIMILARITY_THRESHOLD);
///
/// assert_eq!(result.table.get(5).unwrap().target_text, "Hello World");
/// assert!(result.retained_unmatched.is_empty());
/// assert!(result.dropped_conflicts.is_empty());
/// ```
pub fn align(
    new_segments: &[Segment],
    old_table: &TranslationTable,
    threshold: f64,
) -> Alignment {
    let ordered: BTreeMap<u32, &Segment> = new_segments.iter().map(|s| (s.order, s)).collect();

    let mut consumed: BTreeSet<u32> = BTreeSet::new();
    let mut alignment = Alignment::default();

    for segment in ordered.values() {
        let entry = match find_best_match(&segment.text, old_table, &consumed, threshold) {
            Some(m) => {
                consumed.insert(m.old_order);
                alignment.carried.push(CarriedEntry {
                    new_order: segment.order,
                    old_order: m.old_order,
                    score: m.score,
                });
                debug!(
                    new_order = segment.order,
                    old_order = m.old_order,
                    score = m.score,
                    "carried translation"
                );
                let target = old_table
                    .get(m.old_order)
                    .map(|old| old.target_text.clone())
                    .unwrap_or_default();
                TranslationEntry::new(segment.order, segment.text.clone(), target)
            }
            None => TranslationEntry::untranslated(segment),
        };
        alignment.table.insert(entry);
    }

    for old in old_table.entries() {
        if consumed.contains(&old.order) {
            continue;
        }
        if alignment.table.contains(old.order) {
            alignment.dropped_conflicts.insert(old.order);
            alignment.dropped_entries.push(old.clone());
        } else {
            alignment.retained_unmatched.insert(old.order);
            alignment.table.insert(old.clone());
        }
    }

    alignment
}

/// Reconcile one document against its persisted table and save the result
///
/// A missing or malformed previous table counts as empty. The rebuilt table
/// replaces the record as a whole. An empty snapshot has nothing to reconcile:
/// the record is left untouched and `Ok(None)` is returned.
pub fn reconcile<S: TableStore + ?Sized>(
    store: &S,
    document: &str,
    new_segments: &[Segment],
    threshold: f64,
) -> CarryResult<Option<ReconcileReport>> {
    if new_segments.is_empty() {
        info!(document, "no segments, nothing to reconcile");
        return Ok(None);
    }

    let old_table = store.load_or_empty(document)?;
    let alignment = align(new_segments, &old_table, threshold);
    store.save(document, &alignment.table)?;

    let report = ReconcileReport::new(document, &alignment);
    info!("{}", report);
    if !report.retained_unmatched.is_empty() {
        warn!(
            document,
            ids = ?report.retained_unmatched,
            "kept {} unmatched existing translations",
            report.retained_unmatched.len()
        );
    }
    if !report.dropped_conflicts.is_empty() {
        warn!(
            document,
            ids = ?report.dropped_conflicts,
            "skipped {} unmatched translations due to id conflict",
            report.dropped_conflicts.len()
        );
    }

    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(u32, &str, &str)]) -> TranslationTable {
        entries
            .iter()
            .map(|(order, source, target)| TranslationEntry::new(*order, *source, *target))
            .collect()
    }

    fn segments(items: &[(u32, &str)]) -> Vec<Segment> {
        items
            .iter()
            .map(|(order, text)| Segment::new(*order, *text))
            .collect()
    }

    #[test]
    fn test_renumbered_text_keeps_translation() {
        let old = table(&[(1, "Hallo Welt", "Hello World")]);
        let result = align(&segments(&[(5, "Hallo Welt")]), &old, 0.9);

        assert_eq!(result.table, table(&[(5, "Hallo Welt", "Hello World")]));
        assert!(result.retained_unmatched.is_empty());
        assert!(result.dropped_conflicts.is_empty());
        assert_eq!(
            result.carried,
            vec![CarriedEntry {
                new_order: 5,
                old_order: 1,
                score: 1.0
            }]
        );
    }

    #[test]
    fn test_conflicting_order_is_dropped() {
        let old = table(&[(1, "Hallo", "Hi"), (2, "Welt", "World")]);
        let result = align(&segments(&[(1, "Hallo"), (2, "Andere")]), &old, 0.9);

        assert_eq!(
            result.table,
            table(&[(1, "Hallo", "Hi"), (2, "Andere", "")])
        );
        assert!(result.retained_unmatched.is_empty());
        assert_eq!(result.dropped_conflicts, BTreeSet::from([2]));
        assert_eq!(
            result.dropped_entries,
            vec![TranslationEntry::new(2, "Welt", "World")]
        );
    }

    #[test]
    fn test_unmatched_with_free_order_is_retained() {
        let old = table(&[(1, "Hallo", "Hi"), (7, "Tschüss", "Bye")]);
        let result = align(&segments(&[(1, "Hallo")]), &old, 0.9);

        assert_eq!(result.table.get(7).unwrap().target_text, "Bye");
        assert_eq!(result.retained_unmatched, BTreeSet::from([7]));
        assert!(result.dropped_conflicts.is_empty());
    }

    #[test]
    fn test_fuzzy_match_above_threshold() {
        let old = table(&[(3, "Die Anzahl der Elemente ist gross", "The number of elements is large")]);
        let result = align(
            &segments(&[(1, "Die Anzahl der Elemente ist groß")]),
            &old,
            0.9,
        );

        let entry = result.table.get(1).unwrap();
        assert_eq!(entry.source_text, "Die Anzahl der Elemente ist groß");
        assert_eq!(entry.target_text, "The number of elements is large");
        assert!(result.carried[0].score < 1.0);
    }

    #[test]
    fn test_below_threshold_is_new() {
        let old = table(&[(1, "Hallo", "Hi")]);
        let result = align(&segments(&[(2, "Hallo zusammen")]), &old, 0.9);

        assert_eq!(result.table.get(2).unwrap().target_text, "");
        assert_eq!(result.retained_unmatched, BTreeSet::from([1]));
    }

    #[test]
    fn test_old_entry_consumed_once() {
        let old = table(&[(1, "Ja", "Yes")]);
        let result = align(&segments(&[(1, "Ja"), (2, "Ja")]), &old, 0.9);

        assert_eq!(result.table.get(1).unwrap().target_text, "Yes");
        assert_eq!(result.table.get(2).unwrap().target_text, "");
    }

    #[test]
    fn test_duplicate_sources_pair_up_in_order() {
        let old = table(&[(4, "Ja", "Yes"), (9, "Ja", "Yeah")]);
        let result = align(&segments(&[(1, "Ja"), (2, "Ja")]), &old, 0.9);

        assert_eq!(result.table.get(1).unwrap().target_text, "Yes");
        assert_eq!(result.table.get(2).unwrap().target_text, "Yeah");
        assert!(result.retained_unmatched.is_empty());
    }

    #[test]
    fn test_tie_breaks_on_lowest_order() {
        // Both candidates differ from the new text by one character.
        let old = table(&[(8, "abcdefghiX", "second"), (3, "abcdefghiY", "first")]);
        let consumed = BTreeSet::new();
        let best = find_best_match("abcdefghiZ", &old, &consumed, 0.8).unwrap();
        assert_eq!(best.old_order, 3);
    }

    #[test]
    fn test_higher_score_wins_over_lower_order() {
        let old = table(&[(1, "Hallo Welt!!", "a"), (2, "Hallo Welt", "b")]);
        let best = find_best_match("Hallo Welt", &old, &BTreeSet::new(), 0.5).unwrap();
        assert_eq!(best, Match { old_order: 2, score: 1.0 });
    }

    #[test]
    fn test_consumed_entries_are_skipped() {
        let old = table(&[(1, "Hallo", "Hi")]);
        let consumed = BTreeSet::from([1]);
        assert_eq!(find_best_match("Hallo", &old, &consumed, 0.9), None);
    }

    #[test]
    fn test_empty_old_table() {
        let result = align(&segments(&[(1, "a"), (2, "b")]), &TranslationTable::new(), 0.9);
        assert_eq!(result.table.len(), 2);
        assert_eq!(result.table.translated_count(), 0);
    }

    #[test]
    fn test_empty_segments_retain_everything() {
        let old = table(&[(1, "a", "A"), (2, "b", "B")]);
        let result = align(&[], &old, 0.9);
        assert_eq!(result.table, old);
        assert_eq!(result.retained_unmatched, BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_idempotent_on_same_segments() {
        let old = table(&[(1, "Hallo", "Hi"), (2, "Welt", "World"), (3, "Neu", "")]);
        let first = align(&old.segments(), &old, 0.9);
        assert_eq!(first.table, old);
        assert!(first.retained_unmatched.is_empty());
        assert!(first.dropped_conflicts.is_empty());

        let second = align(&old.segments(), &first.table, 0.9);
        assert_eq!(second.table, first.table);
        assert!(second.retained_unmatched.is_empty());
        assert!(second.dropped_conflicts.is_empty());
    }

    #[test]
    fn test_retained_and_dropped_are_disjoint() {
        let old = table(&[(1, "eins", "one"), (2, "zwei", "two"), (5, "fünf", "five")]);
        let new = segments(&[(1, "uno"), (2, "eins"), (3, "drei")]);
        let result = align(&new, &old, 0.9);

        assert!(result.retained_unmatched.is_disjoint(&result.dropped_conflicts));
        // "eins" moved to 2; old 2 ("zwei") lost its slot, old 5 kept.
        assert_eq!(result.table.get(2).unwrap().target_text, "one");
        assert_eq!(result.dropped_conflicts, BTreeSet::from([2]));
        assert_eq!(result.retained_unmatched, BTreeSet::from([5]));
        for seg in &new {
            assert_eq!(result.table.get(seg.order).unwrap().source_text, seg.text);
        }
    }

    #[test]
    fn test_reconcile_empty_snapshot_writes_nothing() {
        use crate::segment::parse_segments;
        use crate::store::MemoryStore;

        // Looks like a marker to a quick scan but parses to nothing.
        let store = MemoryStore::new();
        let report = reconcile(&store, "deck", &parse_segments("@(1x):kaputt\n"), 0.9).unwrap();
        assert_eq!(report, None);
        assert_eq!(store.raw("deck"), None);
        assert_eq!(store.writes(), 0);

        let existing = table(&[(1, "Hallo", "Hi")]);
        let store = MemoryStore::new().with_table("deck", &existing);
        assert_eq!(reconcile(&store, "deck", &[], 0.9).unwrap(), None);
        assert_eq!(store.writes(), 0);
        assert_eq!(store.table("deck"), Some(existing));
    }

    #[test]
    fn test_reconcile_saves_rebuilt_table() {
        use crate::store::MemoryStore;

        let store = MemoryStore::new().with_table("deck", &table(&[(1, "Hallo Welt", "Hello World")]));
        let report = reconcile(&store, "deck", &segments(&[(1, "Neu"), (2, "Hallo Welt")]), 0.9)
            .unwrap()
            .unwrap();

        assert_eq!(report.carried, 1);
        assert_eq!(store.writes(), 1);
        assert_eq!(
            store.table("deck"),
            Some(table(&[(1, "Neu", ""), (2, "Hallo Welt", "Hello World")]))
        );
    }
}
