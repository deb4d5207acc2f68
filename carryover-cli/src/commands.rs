use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use carryover::audit::{
    ArbitrationSummary, FillSummary, fix_short_translations, resolve_inconsistencies,
};
use carryover::export::{substitute_placeholders, translation_map};
use carryover::merge::merge_segments;
use carryover::report::short_translation_report;
use carryover::resolver::{LongestResolver, SkipResolver};
use carryover::segment::has_markers;
use carryover::{
    CarryError, JsonDirStore, Resolver, TableStore, fill_exact_matches, find_inconsistencies,
    find_short_translations, load_corpus, parse_segments, preview_exact_matches, read_segments,
    reconcile,
};
use tracing::{debug, info, warn};

use crate::cli::Policy;
use crate::config::{Config, check_ratio, check_threshold};
use crate::prompt::TerminalResolver;

/// Ambiguous source texts shown by `preview`
const PREVIEW_EXAMPLES: usize = 5;

pub fn resolver_for(policy: Policy) -> Box<dyn Resolver> {
    match policy {
        Policy::Prompt => Box::new(TerminalResolver::stdio()),
        Policy::Longest => Box::new(LongestResolver),
        Policy::Skip => Box::new(SkipResolver),
    }
}

fn store(config: &Config) -> JsonDirStore {
    JsonDirStore::new(&config.table_dir)
}

/// Files in `dir` with the given extension, sorted by name
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read directory {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn document_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("unusable file name {}", path.display()))
}

/// Read a segment file; `None` (with a log line) if it is not valid UTF-8 or
/// carries no markers
fn read_marked(path: &Path) -> Result<Option<String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::InvalidData => {
            warn!("skipping {} (not valid UTF-8)", path.display());
            return Ok(None);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    if !has_markers(&content) {
        info!("skipping {} (no @(number): markers found)", path.display());
        return Ok(None);
    }
    Ok(Some(content))
}

pub fn merge(config: &Config) -> Result<()> {
    let store = store(config);
    let mut created = 0;

    for path in files_with_extension(&config.source_dir, "txt")? {
        let Some(content) = read_marked(&path)? else {
            continue;
        };
        let document = document_name(&path)?;
        let source = parse_segments(&content);
        if source.is_empty() {
            info!("skipping {} (no parseable segments)", path.display());
            continue;
        }

        let target_path = config.target_dir.join(path.file_name().unwrap_or_default());
        let target = read_segments(&target_path)
            .with_context(|| format!("failed to read {}", target_path.display()))?;

        let table = merge_segments(&source, target.as_deref());
        store
            .save(&document, &table)
            .with_context(|| format!("failed to save table for {document}"))?;
        created += 1;

        match target {
            Some(target) => info!(
                "created {document} with {} entries ({} translated segments found)",
                table.len(),
                target.len()
            ),
            None => info!(
                "created {document} with {} entries (no translation file)",
                table.len()
            ),
        }
    }

    println!("Merged {created} documents into {}", config.table_dir.display());
    Ok(())
}

pub fn upsert(config: &Config, threshold: Option<f64>) -> Result<()> {
    let threshold = threshold.unwrap_or(config.similarity_threshold);
    check_threshold(threshold)?;
    let store = store(config);

    let mut documents = 0;
    let mut residuals = 0;
    for path in files_with_extension(&config.source_dir, "txt")? {
        let Some(content) = read_marked(&path)? else {
            continue;
        };
        let document = document_name(&path)?;
        let segments = parse_segments(&content);

        let Some(report) = reconcile(&store, &document, &segments, threshold)
            .with_context(|| format!("failed to reconcile {document}"))?
        else {
            info!("skipping {} (no parseable segments)", path.display());
            continue;
        };
        for lost in &report.lost {
            warn!(
                document = %document,
                order = lost.order,
                "lost translation: '{}' -> '{}'",
                lost.source_text,
                lost.target_text
            );
        }
        println!("{report}");
        documents += 1;
        if report.has_residuals() {
            residuals += 1;
        }
    }

    println!("Reconciled {documents} documents");
    if residuals > 0 {
        println!("{residuals} documents have unmatched entries; see the warnings above");
    }
    Ok(())
}

pub fn check(config: &Config, ratio: Option<f64>) -> Result<()> {
    let ratio = ratio.unwrap_or(config.short_ratio);
    check_ratio(ratio)?;

    let corpus = load_corpus(&store(config))?;
    let findings = find_short_translations(&corpus, ratio);
    let flagged: usize = findings.values().map(|f| f.flagged.len()).sum();

    fs::write(&config.report_path, short_translation_report(&findings))
        .with_context(|| format!("failed to write {}", config.report_path.display()))?;
    println!(
        "Found {flagged} suspiciously short translations in {} tables; report written to {}",
        corpus.len(),
        config.report_path.display()
    );
    Ok(())
}

pub fn preview(config: &Config) -> Result<()> {
    let corpus = load_corpus(&store(config))?;
    let preview = preview_exact_matches(&corpus);

    if preview.documents.is_empty() {
        println!("No empty translations found");
        return Ok(());
    }

    println!("{:<40} {:>7} {:>9} {:>13}", "document", "empty", "fillable", "needs choice");
    for (document, counts) in &preview.documents {
        println!(
            "{:<40} {:>7} {:>9} {:>13}",
            document, counts.empty, counts.fillable, counts.needs_choice
        );
    }
    let totals = preview.totals;
    println!(
        "{:<40} {:>7} {:>9} {:>13}",
        "total", totals.empty, totals.fillable, totals.needs_choice
    );

    if !preview.ambiguous.is_empty() {
        println!("\nSource texts with several translations:");
        for (source, options) in preview.ambiguous.iter().take(PREVIEW_EXAMPLES) {
            println!("  '{source}' -> {options:?}");
        }
        if preview.ambiguous.len() > PREVIEW_EXAMPLES {
            println!("  ... and {} more", preview.ambiguous.len() - PREVIEW_EXAMPLES);
        }
    }
    Ok(())
}

pub fn fill(config: &Config, resolver: &mut dyn Resolver) -> Result<FillSummary> {
    let summary = fill_exact_matches(&store(config), resolver)?;

    println!("Files modified: {}", summary.documents_modified.len());
    println!("Translations filled: {}", summary.filled);
    println!("Choices made: {}", summary.choices.len());
    for (source, target) in &summary.choices {
        println!("  '{source}' -> '{target}'");
    }
    if summary.aborted {
        println!("Stopped early; everything filled so far is saved");
    }
    Ok(summary)
}

pub fn inconsistencies(
    config: &Config,
    resolve: bool,
    resolver: &mut dyn Resolver,
) -> Result<Option<ArbitrationSummary>> {
    let store = store(config);
    let found = find_inconsistencies(&load_corpus(&store)?);

    if found.is_empty() {
        println!("No translation inconsistencies found");
        return Ok(None);
    }

    println!("Found {} source texts with several translations:\n", found.len());
    for (i, (source, inconsistency)) in found.iter().enumerate() {
        println!("{}. {source}", i + 1);
        for location in &inconsistency.locations {
            println!(
                "     - {}:{} -> '{}'",
                location.document, location.order, location.target_text
            );
        }
    }

    if !resolve {
        return Ok(None);
    }
    let summary = resolve_inconsistencies(&store, &found, resolver)?;
    print_arbitration(&summary);
    Ok(Some(summary))
}

pub fn short(
    config: &Config,
    fix: bool,
    ratio: Option<f64>,
    resolver: &mut dyn Resolver,
) -> Result<Option<ArbitrationSummary>> {
    let ratio = ratio.unwrap_or(config.short_ratio);
    check_ratio(ratio)?;
    let store = store(config);
    let findings = find_short_translations(&load_corpus(&store)?, ratio);

    if findings.is_empty() {
        println!("No suspiciously short translations found");
        return Ok(None);
    }

    for (source, finding) in &findings {
        println!("{source}");
        for location in &finding.flagged {
            println!(
                "     - {}:{} -> '{}'",
                location.document, location.order, location.target_text
            );
        }
    }

    if !fix {
        return Ok(None);
    }
    let summary = fix_short_translations(&store, &findings, resolver)?;
    print_arbitration(&summary);
    Ok(Some(summary))
}

fn print_arbitration(summary: &ArbitrationSummary) {
    println!(
        "Resolved {}, skipped {}, {} entries updated",
        summary.resolved, summary.skipped, summary.entries_updated
    );
    if summary.aborted {
        println!("Stopped early; everything applied so far is saved");
    }
}

pub fn apply(config: &Config) -> Result<()> {
    let store = store(config);
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;

    let mut processed = 0;
    let mut total = 0;
    for path in files_with_extension(&config.source_dir, "xml")? {
        let document = document_name(&path)?;
        let output = config.output_dir.join(path.file_name().unwrap_or_default());

        let table = match store.load(&document) {
            Ok(table) => table,
            Err(CarryError::MalformedTable { reason, .. }) => {
                warn!(document = %document, "unreadable table, copying unchanged: {}", reason);
                None
            }
            Err(err) => return Err(err.into()),
        };
        let translations = table.as_ref().map(translation_map).unwrap_or_default();

        if translations.is_empty() {
            fs::copy(&path, &output)
                .with_context(|| format!("failed to copy {}", path.display()))?;
            debug!("copied {}", path.display());
            continue;
        }

        if let Some(table) = &table {
            for entry in table.entries().filter(|e| !e.is_translated()) {
                debug!(document = %document, order = entry.order, "no translation yet");
            }
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let (rebuilt, applied) = substitute_placeholders(&content, &translations);
        fs::write(&output, rebuilt)
            .with_context(|| format!("failed to write {}", output.display()))?;

        info!("{applied:>3} placeholders applied to {}", path.display());
        processed += 1;
        total += applied;
    }

    println!("Files processed: {processed}");
    println!("Total translations applied: {total}");
    Ok(())
}
