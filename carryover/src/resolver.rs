//! Arbitration between competing translations
//!
//! Whenever the auditor meets more than one plausible translation for a source
//! text it never guesses; it asks a [`Resolver`]. The CLI plugs in an
//! interactive terminal prompt, while automated runs and tests use one of the
//! policies defined here.
//!
//! # Example
//!
//! ```
//! use carryover::resolver::{LongestResolver, Resolution, ResolveKind, ResolveRequest, Resolver};
//!
//! let options = vec!["End".to_string(), "The End".to_string()];
//! let request = ResolveRequest {
//!     kind: ResolveKind::ExactFill,
//!     source_text: "Ende",
//!     options: &options,
//!     occurrences: &[],
//! };
//! let mut resolver = LongestResolver;
//! assert_eq!(resolver.resolve(&request), Resolution::Choose("The End".to_string()));
//! ```

use std::collections::HashMap;

use crate::corpus::Location;

/// Why a decision is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveKind {
    /// An untranslated entry whose source has several known translations
    ExactFill,
    /// A source text translated differently in different places
    Inconsistency,
    /// A translation much shorter than its source
    ShortTranslation,
}

/// A question put to a resolver
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub kind: ResolveKind,
    pub source_text: &'a str,
    /// Candidate translations, sorted and distinct
    pub options: &'a [String],
    /// Entries the decision will be applied to, where known
    pub occurrences: &'a [Location],
}

/// A resolver's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Use this translation; need not be one of the options
    Choose(String),
    /// Leave the affected entries as they are
    Skip,
    /// Stop the whole run; earlier changes stay saved
    Abort,
}

impl Resolution {
    /// Turn a free-form answer into a resolution; blank text means skip
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Resolution::Skip
        } else {
            Resolution::Choose(text.to_string())
        }
    }
}

/// Strategy for picking one translation out of several
pub trait Resolver {
    fn resolve(&mut self, request: &ResolveRequest<'_>) -> Resolution;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Always picks the longest option, the first one on equal length
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestResolver;

impl Resolver for LongestResolver {
    fn resolve(&mut self, request: &ResolveRequest<'_>) -> Resolution {
        let mut best: Option<&String> = None;
        for option in request.options {
            if best.is_none_or(|b| option.chars().count() > b.chars().count()) {
                best = Some(option);
            }
        }
        match best {
            Some(option) => Resolution::from_text(option),
            None => Resolution::Skip,
        }
    }

    fn name(&self) -> &str {
        "longest"
    }
}

/// Never decides; every ambiguous case is left for later
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipResolver;

impl Resolver for SkipResolver {
    fn resolve(&mut self, _request: &ResolveRequest<'_>) -> Resolution {
        Resolution::Skip
    }

    fn name(&self) -> &str {
        "skip"
    }
}

/// Answers from a fixed script and remembers what it was asked
///
/// Source texts without a scripted answer get the fallback, `Skip` unless
/// changed with [`ScriptedResolver::with_fallback`].
#[derive(Debug, Clone)]
pub struct ScriptedResolver {
    answers: HashMap<String, Resolution>,
    fallback: Resolution,
    asked: Vec<String>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            fallback: Resolution::Skip,
            asked: Vec::new(),
        }
    }

    pub fn with_answer(mut self, source_text: &str, resolution: Resolution) -> Self {
        self.answers.insert(source_text.to_string(), resolution);
        self
    }

    pub fn with_fallback(mut self, resolution: Resolution) -> Self {
        self.fallback = resolution;
        self
    }

    /// Source texts asked about, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Default for ScriptedResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for ScriptedResolver {
    fn resolve(&mut self, request: &ResolveRequest<'_>) -> Resolution {
        self.asked.push(request.source_text.to_string());
        self.answers
            .get(request.source_text)
            .unwrap_or(&self.fallback)
            .clone()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
