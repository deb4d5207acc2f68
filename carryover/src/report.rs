//! Operator-facing reports
//!
//! Reconciliation never loses translations silently: every run produces a
//! [`ReconcileReport`] naming the retained and the dropped order numbers. The
//! short-translation report is a plain-text listing meant to be read next to
//! the tables.

use std::collections::BTreeSet;
use std::fmt;

use crate::aligner::Alignment;
use crate::audit::ShortTranslations;
use crate::table::TranslationEntry;

/// Summary of one document's reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub document: String,
    pub total: usize,
    /// Entries with a non-blank translation after the run
    pub preserved: usize,
    /// Entries still awaiting a translation
    pub untranslated: usize,
    pub carried: usize,
    /// Carried entries whose source changed slightly
    pub fuzzy: usize,
    pub retained_unmatched: BTreeSet<u32>,
    pub dropped_conflicts: BTreeSet<u32>,
    /// Translations lost to id conflicts
    pub lost: Vec<TranslationEntry>,
}

impl ReconcileReport {
    pub fn new(document: &str, alignment: &Alignment) -> Self {
        Self {
            document: document.to_string(),
            total: alignment.table.len(),
            preserved: alignment.table.translated_count(),
            untranslated: alignment.table.untranslated_count(),
            carried: alignment.carried.len(),
            fuzzy: alignment.carried.iter().filter(|c| c.score < 1.0).count(),
            retained_unmatched: alignment.retained_unmatched.clone(),
            dropped_conflicts: alignment.dropped_conflicts.clone(),
            lost: alignment
                .dropped_entries
                .iter()
                .filter(|e| e.is_translated())
                .cloned()
                .collect(),
        }
    }

    /// Whether anything needs the operator's attention
    pub fn has_residuals(&self) -> bool {
        !self.retained_unmatched.is_empty() || !self.dropped_conflicts.is_empty()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "updated {}: {} entries ({} preserved, {} new)",
            self.document, self.total, self.preserved, self.untranslated
        )?;
        if self.fuzzy > 0 {
            write!(f, ", {} carried by fuzzy match", self.fuzzy)?;
        }
        Ok(())
    }
}

/// Render the short-translation findings as a text report
///
/// Entries are grouped by document; each lists its key, both texts and the
/// target/source length ratio.
pub fn short_translation_report(findings: &ShortTranslations) -> String {
    let mut rows: Vec<(&str, u32, &str, &str)> = findings
        .iter()
        .flat_map(|(source, finding)| {
            finding
                .flagged
                .iter()
                .map(move |loc| (loc.document.as_str(), loc.order, source.as_str(), loc.target_text.as_str()))
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));

    let mut out = String::new();
    out.push_str("Problematic Translations Report\n");
    out.push_str(&"=".repeat(40));
    out.push_str("\n\n");

    let mut current: Option<&str> = None;
    for (document, order, source, target) in rows {
        if current != Some(document) {
            current = Some(document);
            out.push_str(&format!("\nFile: {}\n{}\n", document, "-".repeat(20)));
        }
        out.push_str(&format!(
            "Key: {}\nSource: {}\nTarget: {}\nLength ratio: {:.2}\n\n",
            order,
            source,
            target,
            length_ratio(source, target)
        ));
    }

    out
}

/// Target length relative to source length, in characters
pub fn length_ratio(source: &str, target: &str) -> f64 {
    let source_len = source.chars().count();
    if source_len == 0 {
        return 0.0;
    }
    target.chars().count() as f64 / source_len as f64
}
