//! Corpus-wide consistency auditing
//!
//! Three checks run over the whole corpus:
//!
//! 1. **Inconsistencies**: a source text carrying two or more different
//!    translations in different entries.
//! 2. **Short translations**: a translation shorter than a fraction of its
//!    source, usually a truncated or placeholder answer.
//! 3. **Exact fill**: untranslated entries whose source text already has a
//!    translation elsewhere.
//!
//! Finding is a pure read. Fixing goes through [`store::set_target`] or
//! [`store::update_entry`] one entry at a time, so an interrupted run keeps
//! every fix applied before the interruption and can simply be run again.
//!
//! [`store::set_target`]: crate::store::set_target
//! [`store::update_entry`]: crate::store::update_entry

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::corpus::{Corpus, Location, SourceIndex, load_corpus, locations_of};
use crate::error::{CarryError, CarryResult};
use crate::resolver::{Resolution, ResolveKind, ResolveRequest, Resolver};
use crate::store::{EntryUpdate, TableStore, set_target, update_entry};

/// Translations shorter than this fraction of their source are flagged
pub const DEFAULT_SHORT_RATIO: f64 = 0.4;

/// A source text with conflicting translations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    /// Distinct translations, sorted
    pub options: Vec<String>,
    pub locations: Vec<Location>,
}

pub type Inconsistencies = BTreeMap<String, Inconsistency>;

/// Suspiciously short translations of one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortTranslation {
    pub flagged: Vec<Location>,
    /// Every distinct translation recorded for the source, sorted
    pub alternatives: Vec<String>,
}

pub type ShortTranslations = BTreeMap<String, ShortTranslation>;

/// Find source texts with at least two distinct non-empty translations
pub fn find_inconsistencies(corpus: &Corpus) -> Inconsistencies {
    let index = SourceIndex::build(corpus);
    index
        .iter()
        .filter(|(_, targets)| targets.len() > 1)
        .map(|(source, targets)| {
            (
                source.clone(),
                Inconsistency {
                    options: targets.iter().cloned().collect(),
                    locations: locations_of(corpus, source),
                },
            )
        })
        .collect()
}

/// Check if `target` is shorter than `ratio` times `source`
///
/// Lengths are counted in characters after trimming; blank texts are never
/// flagged. The comparison is strict, so a target of exactly
/// `ratio · len(source)` characters passes.
pub fn is_suspiciously_short(source: &str, target: &str, ratio: f64) -> bool {
    let source = source.trim();
    let target = target.trim();
    if source.is_empty() || target.is_empty() {
        return false;
    }
    (target.chars().count() as f64) < ratio * source.chars().count() as f64
}

/// Find translations shorter than `ratio` times their source
pub fn find_short_translations(corpus: &Corpus, ratio: f64) -> ShortTranslations {
    let index = SourceIndex::build(corpus);
    let mut findings = ShortTranslations::new();

    for (document, table) in corpus {
        for entry in table {
            if !is_suspiciously_short(&entry.source_text, &entry.target_text, ratio) {
                continue;
            }
            let source = entry.source_text.trim();
            findings
                .entry(source.to_string())
                .or_insert_with(|| ShortTranslation {
                    flagged: Vec::new(),
                    alternatives: index
                        .candidates(source)
                        .map(|targets| targets.iter().cloned().collect())
                        .unwrap_or_default(),
                })
                .flagged
                .push(Location {
                    document: document.clone(),
                    order: entry.order,
                    target_text: entry.target_text.trim().to_string(),
                });
        }
    }

    findings
}

/// Write `chosen_target` into every affected entry
///
/// Each entry is re-read, skipped if it already holds the chosen text and
/// otherwise saved on its own. Returns the number of entries written. A save
/// failure stops at that entry; the ones before it stay written.
pub fn apply_canonical<S: TableStore + ?Sized>(
    store: &S,
    source_text: &str,
    chosen_target: &str,
    affected: &[Location],
) -> CarryResult<usize> {
    let mut updated = 0;
    for location in affected {
        match set_target(store, &location.document, location.order, chosen_target)? {
            EntryUpdate::Written => {
                info!(
                    document = %location.document,
                    order = location.order,
                    "updated translation"
                );
                updated += 1;
            }
            EntryUpdate::Unchanged => {}
            EntryUpdate::Missing => warn!(
                document = %location.document,
                order = location.order,
                source = source_text,
                "entry no longer exists, not updated"
            ),
        }
    }
    Ok(updated)
}

/// Outcome of an arbitration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArbitrationSummary {
    /// Findings for which a translation was chosen and applied
    pub resolved: usize,
    pub skipped: usize,
    pub entries_updated: usize,
    /// The resolver stopped the run before all findings were seen
    pub aborted: bool,
}

/// Ask `resolver` for a canonical translation of every inconsistency and
/// apply the answers
pub fn resolve_inconsistencies<S, R>(
    store: &S,
    inconsistencies: &Inconsistencies,
    resolver: &mut R,
) -> CarryResult<ArbitrationSummary>
where
    S: TableStore + ?Sized,
    R: Resolver + ?Sized,
{
    let findings = inconsistencies
        .iter()
        .map(|(source, inc)| (source.as_str(), inc.options.as_slice(), inc.locations.as_slice()));
    arbitrate(store, ResolveKind::Inconsistency, findings, resolver)
}

/// Ask `resolver` for a replacement of every flagged short translation and
/// apply the answers to the flagged entries
pub fn fix_short_translations<S, R>(
    store: &S,
    findings: &ShortTranslations,
    resolver: &mut R,
) -> CarryResult<ArbitrationSummary>
where
    S: TableStore + ?Sized,
    R: Resolver + ?Sized,
{
    let findings = findings
        .iter()
        .map(|(source, f)| (source.as_str(), f.alternatives.as_slice(), f.flagged.as_slice()));
    arbitrate(store, ResolveKind::ShortTranslation, findings, resolver)
}

fn arbitrate<'a, S, R, I>(
    store: &S,
    kind: ResolveKind,
    findings: I,
    resolver: &mut R,
) -> CarryResult<ArbitrationSummary>
where
    S: TableStore + ?Sized,
    R: Resolver + ?Sized,
    I: Iterator<Item = (&'a str, &'a [String], &'a [Location])>,
{
    let mut summary = ArbitrationSummary::default();

    for (source, options, occurrences) in findings {
        let request = ResolveRequest {
            kind,
            source_text: source,
            options,
            occurrences,
        };
        match resolver.resolve(&request) {
            Resolution::Choose(target) => {
                summary.entries_updated += apply_canonical(store, source, &target, occurrences)?;
                summary.resolved += 1;
            }
            Resolution::Skip => summary.skipped += 1,
            Resolution::Abort => {
                info!(resolver = resolver.name(), "stopped by resolver; progress so far is saved");
                summary.aborted = true;
                break;
            }
        }
    }

    Ok(summary)
}

/// Outcome of an exact-fill run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillSummary {
    pub filled: usize,
    pub documents_modified: BTreeSet<String>,
    /// Choices the resolver made, by source text
    pub choices: BTreeMap<String, String>,
    /// Entries left empty because the decision was to skip
    pub skipped: usize,
    pub aborted: bool,
}

/// Fill untranslated entries from identical source texts elsewhere
///
/// A source with a single known translation is filled without asking. With
/// several candidates the resolver is asked once per source text; its answer,
/// skip included, is reused for every later entry with the same source in this
/// run. Entries that already hold a translation are never overwritten, and
/// each fill is saved immediately.
pub fn fill_exact_matches<S, R>(store: &S, resolver: &mut R) -> CarryResult<FillSummary>
where
    S: TableStore + ?Sized,
    R: Resolver + ?Sized,
{
    let corpus = load_corpus(store)?;
    let index = SourceIndex::build(&corpus);
    info!(
        "found {} unique source texts with translations",
        index.len()
    );

    let mut decisions: BTreeMap<String, Resolution> = BTreeMap::new();
    let mut summary = FillSummary::default();

    for document in corpus.keys() {
        // Fresh read: the corpus snapshot may be stale by now.
        let table = match store.load(document) {
            Ok(Some(table)) => table,
            Ok(None) => continue,
            Err(CarryError::MalformedTable { reason, .. }) => {
                warn!(document = %document, "skipping unreadable table: {}", reason);
                continue;
            }
            Err(err) => return Err(err),
        };

        for entry in &table {
            let source = entry.source_text.trim();
            if source.is_empty() || entry.is_translated() {
                continue;
            }
            let Some(candidates) = index.candidates(source) else {
                continue;
            };

            let decision = if candidates.len() == 1 {
                candidates
                    .first()
                    .map_or(Resolution::Skip, |t| Resolution::Choose(t.clone()))
            } else if let Some(decision) = decisions.get(source) {
                decision.clone()
            } else {
                let options: Vec<String> = candidates.iter().cloned().collect();
                let request = ResolveRequest {
                    kind: ResolveKind::ExactFill,
                    source_text: source,
                    options: &options,
                    occurrences: &[],
                };
                let decision = resolver.resolve(&request);
                match &decision {
                    Resolution::Abort => {
                        info!(
                            resolver = resolver.name(),
                            "stopped by resolver; progress so far is saved"
                        );
                        summary.aborted = true;
                        return Ok(summary);
                    }
                    Resolution::Choose(target) => {
                        summary.choices.insert(source.to_string(), target.clone());
                    }
                    Resolution::Skip => {}
                }
                decisions.insert(source.to_string(), decision.clone());
                decision
            };

            let Resolution::Choose(target) = decision else {
                summary.skipped += 1;
                continue;
            };

            let update = update_entry(store, document, entry.order, |current| {
                if current.is_translated() {
                    return false;
                }
                current.target_text = target.clone();
                true
            })?;
            if update == EntryUpdate::Written {
                summary.filled += 1;
                summary.documents_modified.insert(document.clone());
                debug!(document = %document, order = entry.order, "filled translation");
            }
        }
    }

    info!(
        filled = summary.filled,
        documents = summary.documents_modified.len(),
        choices = summary.choices.len(),
        "exact fill finished"
    );
    Ok(summary)
}

/// Fill statistics for one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillCounts {
    /// Entries with a source text but no translation
    pub empty: usize,
    /// Empty entries whose source is translated elsewhere
    pub fillable: usize,
    /// Fillable entries with more than one candidate
    pub needs_choice: usize,
}

impl FillCounts {
    fn add(&mut self, other: FillCounts) {
        self.empty += other.empty;
        self.fillable += other.fillable;
        self.needs_choice += other.needs_choice;
    }
}

/// What [`fill_exact_matches`] would do, without changing anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillPreview {
    /// Documents with at least one empty entry
    pub documents: BTreeMap<String, FillCounts>,
    pub totals: FillCounts,
    /// Source texts with several candidate translations
    pub ambiguous: BTreeMap<String, Vec<String>>,
}

pub fn preview_exact_matches(corpus: &Corpus) -> FillPreview {
    let index = SourceIndex::build(corpus);
    let mut preview = FillPreview::default();

    for (document, table) in corpus {
        let mut counts = FillCounts::default();
        for entry in table {
            let source = entry.source_text.trim();
            if source.is_empty() || entry.is_translated() {
                continue;
            }
            counts.empty += 1;
            if let Some(candidates) = index.candidates(source) {
                counts.fillable += 1;
                if candidates.len() > 1 {
                    counts.needs_choice += 1;
                }
            }
        }
        if counts.empty > 0 {
            preview.totals.add(counts);
            preview.documents.insert(document.clone(), counts);
        }
    }

    preview.ambiguous = index
        .iter()
        .filter(|(_, targets)| targets.len() > 1)
        .map(|(source, targets)| (source.clone(), targets.iter().cloned().collect()))
        .collect();

    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{LongestResolver, ScriptedResolver, SkipResolver};
    use crate::store::MemoryStore;
    use crate::table::{TranslationEntry, TranslationTable};

    fn table(entries: &[(u32, &str, &str)]) -> TranslationTable {
        entries
            .iter()
            .map(|(order, source, target)| TranslationEntry::new(*order, *source, *target))
            .collect()
    }

    fn store(docs: &[(&str, &[(u32, &str, &str)])]) -> MemoryStore {
        docs.iter()
            .fold(MemoryStore::new(), |store, (name, entries)| {
                store.with_table(name, &table(entries))
            })
    }

    fn target(store: &MemoryStore, document: &str, order: u32) -> String {
        store.table(document).unwrap().get(order).unwrap().target_text.clone()
    }

    fn loc(document: &str, order: u32, target_text: &str) -> Location {
        Location {
            document: document.to_string(),
            order,
            target_text: target_text.to_string(),
        }
    }

    #[test]
    fn test_find_inconsistencies() {
        let store = store(&[
            ("a", &[(1, "Ende", "End"), (2, "Start", "Start"), (3, "Ende", "")]),
            ("b", &[(1, "Ende", "Finish"), (2, "Start", "Start")]),
        ]);
        let corpus = load_corpus(&store).unwrap();
        let found = find_inconsistencies(&corpus);

        assert_eq!(found.len(), 1);
        let ende = &found["Ende"];
        assert_eq!(ende.options, vec!["End", "Finish"]);
        assert_eq!(ende.locations, vec![loc("a", 1, "End"), loc("b", 1, "Finish")]);
    }

    #[test]
    fn test_whitespace_variants_are_not_inconsistent() {
        let store = store(&[("a", &[(1, "Ende", "End"), (2, " Ende", "End ")])]);
        let corpus = load_corpus(&store).unwrap();
        assert!(find_inconsistencies(&corpus).is_empty());
    }

    #[test]
    fn test_short_threshold_is_strict() {
        // 10 characters, ratio 0.4: 4 passes, 3 is flagged.
        assert!(!is_suspiciously_short("abcdefghij", "abcd", 0.4));
        assert!(is_suspiciously_short("abcdefghij", "abc", 0.4));
        assert!(!is_suspiciously_short("abcdefghij", "", 0.4));
        assert!(!is_suspiciously_short("", "a", 0.4));
    }

    #[test]
    fn test_find_short_translations_offers_alternatives() {
        let store = store(&[
            ("a", &[(1, "Zusammenfassung der Ergebnisse", "Sum")]),
            ("b", &[(4, "Zusammenfassung der Ergebnisse", "Summary of the results")]),
        ]);
        let corpus = load_corpus(&store).unwrap();
        let found = find_short_translations(&corpus, DEFAULT_SHORT_RATIO);

        let finding = &found["Zusammenfassung der Ergebnisse"];
        assert_eq!(finding.flagged, vec![loc("a", 1, "Sum")]);
        assert_eq!(finding.alternatives, vec!["Sum", "Summary of the results"]);
    }

    #[test]
    fn test_apply_canonical_is_idempotent() {
        let store = store(&[
            ("a", &[(1, "Ende", "End")]),
            ("b", &[(1, "Ende", "Finish"), (2, "Ende", "The End")]),
        ]);
        let affected = vec![loc("a", 1, "End"), loc("b", 1, "Finish"), loc("b", 2, "The End")];

        assert_eq!(apply_canonical(&store, "Ende", "End", &affected).unwrap(), 2);
        assert_eq!(target(&store, "b", 1), "End");
        assert_eq!(target(&store, "b", 2), "End");
        let writes = store.writes();

        assert_eq!(apply_canonical(&store, "Ende", "End", &affected).unwrap(), 0);
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn test_apply_canonical_persists_each_entry() {
        let store = store(&[("b", &[(1, "Ende", "Finish"), (2, "Ende", "The End")])]);
        let affected = vec![loc("b", 1, "Finish"), loc("b", 2, "The End")];
        apply_canonical(&store, "Ende", "End", &affected).unwrap();
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn test_apply_canonical_aborts_on_write_failure() {
        let store = store(&[
            ("a", &[(1, "Ende", "Finish")]),
            ("b", &[(1, "Ende", "The End")]),
            ("c", &[(1, "Ende", "Fin")]),
        ]);
        let affected = vec![loc("a", 1, "Finish"), loc("b", 1, "The End"), loc("c", 1, "Fin")];
        store.fail_after(1);

        let result = apply_canonical(&store, "Ende", "End", &affected);
        assert!(matches!(result, Err(CarryError::Io { .. })));
        assert_eq!(target(&store, "a", 1), "End");
        assert_eq!(target(&store, "b", 1), "The End");
        assert_eq!(target(&store, "c", 1), "Fin");
    }

    #[test]
    fn test_apply_canonical_skips_externally_fixed_entry() {
        let store = store(&[("a", &[(1, "Ende", "Finish")])]);
        let affected = vec![loc("a", 1, "Finish")];
        // Fixed by someone else after the audit ran.
        set_target(&store, "a", 1, "End").unwrap();
        assert_eq!(apply_canonical(&store, "Ende", "End", &affected).unwrap(), 0);
    }

    #[test]
    fn test_resolve_inconsistencies_with_policy() {
        let store = store(&[
            ("a", &[(1, "Ende", "End"), (2, "Start", "Go")]),
            ("b", &[(1, "Ende", "The End"), (2, "Start", "Begin")]),
        ]);
        let corpus = load_corpus(&store).unwrap();
        let found = find_inconsistencies(&corpus);
        let mut resolver = ScriptedResolver::new()
            .with_answer("Ende", Resolution::Choose("The End".to_string()))
            .with_answer("Start", Resolution::Skip);

        let summary = resolve_inconsistencies(&store, &found, &mut resolver).unwrap();
        assert_eq!(
            summary,
            ArbitrationSummary {
                resolved: 1,
                skipped: 1,
                entries_updated: 1,
                aborted: false
            }
        );
        assert_eq!(target(&store, "a", 1), "The End");
        assert_eq!(target(&store, "a", 2), "Go");
    }

    #[test]
    fn test_resolve_inconsistencies_custom_translation() {
        let store = store(&[("a", &[(1, "Ende", "End"), (2, "Ende", "Finish")])]);
        let found = find_inconsistencies(&load_corpus(&store).unwrap());
        let mut resolver =
            ScriptedResolver::new().with_answer("Ende", Resolution::Choose("Conclusion".to_string()));

        let summary = resolve_inconsistencies(&store, &found, &mut resolver).unwrap();
        assert_eq!(summary.entries_updated, 2);
        assert!(find_inconsistencies(&load_corpus(&store).unwrap()).is_empty());
    }

    #[test]
    fn test_abort_keeps_earlier_fixes() {
        let store = store(&[
            ("a", &[(1, "Anfang", "Start"), (2, "Ende", "End")]),
            ("b", &[(1, "Anfang", "Begin"), (2, "Ende", "Finish")]),
        ]);
        let found = find_inconsistencies(&load_corpus(&store).unwrap());
        let mut resolver = ScriptedResolver::new()
            .with_answer("Anfang", Resolution::Choose("Start".to_string()))
            .with_answer("Ende", Resolution::Abort);

        let summary = resolve_inconsistencies(&store, &found, &mut resolver).unwrap();
        assert!(summary.aborted);
        assert_eq!(summary.resolved, 1);
        assert_eq!(target(&store, "b", 1), "Start");
        assert_eq!(target(&store, "b", 2), "Finish");
    }

    #[test]
    fn test_fix_short_translations_only_touches_flagged() {
        let store = store(&[
            ("a", &[(1, "Zusammenfassung der Ergebnisse", "Sum")]),
            ("b", &[(1, "Zusammenfassung der Ergebnisse", "Summary of results")]),
        ]);
        let found = find_short_translations(&load_corpus(&store).unwrap(), 0.4);
        let summary = fix_short_translations(&store, &found, &mut LongestResolver).unwrap();

        assert_eq!(summary.entries_updated, 1);
        assert_eq!(target(&store, "a", 1), "Summary of results");
        assert_eq!(target(&store, "b", 1), "Summary of results");
    }

    #[test]
    fn test_exact_fill_single_candidate_without_prompt() {
        let store = store(&[("a", &[(1, "Ende", "End")]), ("b", &[(3, "Ende", "")])]);
        let mut resolver = ScriptedResolver::new();

        let summary = fill_exact_matches(&store, &mut resolver).unwrap();
        assert_eq!(summary.filled, 1);
        assert_eq!(summary.documents_modified, BTreeSet::from(["b".to_string()]));
        assert!(resolver.asked().is_empty());
        assert_eq!(target(&store, "b", 3), "End");
    }

    #[test]
    fn test_exact_fill_asks_once_per_source() {
        let store = store(&[
            ("a", &[(1, "Ende", "End"), (2, "Ende", "")]),
            ("b", &[(1, "Ende", "Finish"), (2, "Ende", ""), (3, "Ende", "")]),
        ]);
        let mut resolver =
            ScriptedResolver::new().with_answer("Ende", Resolution::Choose("Finish".to_string()));

        let summary = fill_exact_matches(&store, &mut resolver).unwrap();
        assert_eq!(resolver.asked(), ["Ende"]);
        assert_eq!(summary.filled, 3);
        assert_eq!(summary.choices["Ende"], "Finish");
        assert_eq!(target(&store, "a", 2), "Finish");
        assert_eq!(target(&store, "b", 3), "Finish");
        // Existing translations stay untouched.
        assert_eq!(target(&store, "a", 1), "End");
    }

    #[test]
    fn test_exact_fill_skip_is_remembered() {
        let store = store(&[
            ("a", &[(1, "Ende", "End"), (2, "Ende", "")]),
            ("b", &[(1, "Ende", "Finish"), (2, "Ende", "")]),
        ]);
        let mut resolver = ScriptedResolver::new();

        let summary = fill_exact_matches(&store, &mut resolver).unwrap();
        assert_eq!(resolver.asked().len(), 1);
        assert_eq!(summary.filled, 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_exact_fill_abort() {
        let store = store(&[
            ("a", &[(1, "Ende", "End"), (2, "Start", "Go"), (3, "Start", "")]),
            ("b", &[(1, "Ende", "Finish"), (2, "Ende", ""), (3, "Start", "Go")]),
        ]);
        let mut resolver = ScriptedResolver::new().with_answer("Ende", Resolution::Abort);

        let summary = fill_exact_matches(&store, &mut resolver).unwrap();
        assert!(summary.aborted);
        // "Start" in document a was filled before the abort.
        assert_eq!(summary.filled, 1);
        assert_eq!(target(&store, "a", 3), "Go");
        assert_eq!(target(&store, "b", 2), "");
    }

    #[test]
    fn test_exact_fill_stops_on_write_failure() {
        let store = store(&[
            ("a", &[(1, "Ende", "End")]),
            ("b", &[(1, "Ende", "")]),
            ("c", &[(1, "Ende", "")]),
        ]);
        store.fail_after(1);

        let result = fill_exact_matches(&store, &mut SkipResolver);
        assert!(result.is_err());
        assert_eq!(target(&store, "b", 1), "End");
        assert_eq!(target(&store, "c", 1), "");
    }

    #[test]
    fn test_exact_fill_is_idempotent() {
        let store = store(&[("a", &[(1, "Ende", "End")]), ("b", &[(1, "Ende", "")])]);
        fill_exact_matches(&store, &mut SkipResolver).unwrap();
        let writes = store.writes();

        let again = fill_exact_matches(&store, &mut SkipResolver).unwrap();
        assert_eq!(again.filled, 0);
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn test_preview_counts() {
        let store = store(&[
            ("a", &[(1, "Ende", "End"), (2, "Start", ""), (3, "Neu", "")]),
            ("b", &[(1, "Ende", "Finish"), (2, "Ende", ""), (3, "Start", "Go")]),
            ("c", &[(1, "Fertig", "Done")]),
        ]);
        let preview = preview_exact_matches(&load_corpus(&store).unwrap());

        assert_eq!(
            preview.documents["a"],
            FillCounts {
                empty: 2,
                fillable: 1,
                needs_choice: 0
            }
        );
        assert_eq!(
            preview.documents["b"],
            FillCounts {
                empty: 1,
                fillable: 1,
                needs_choice: 1
            }
        );
        assert!(!preview.documents.contains_key("c"));
        assert_eq!(
            preview.totals,
            FillCounts {
                empty: 3,
                fillable: 2,
                needs_choice: 1
            }
        );
        assert_eq!(preview.ambiguous["Ende"], vec!["End", "Finish"]);
        assert_eq!(store.writes(), 0);
    }
}
