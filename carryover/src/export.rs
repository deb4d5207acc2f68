//! Hand-off of finished translations to the document rebuild step
//!
//! The rebuild step only needs `order → text` for translated entries. Text is
//! escaped for inclusion in XML character data: `&`, `<` and `>` only, quotes
//! are left alone.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::table::TranslationTable;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@PLACEHOLDER\((\d+)\)@|\{\{(\d+)\}\}").expect("valid placeholder regex")
});

/// Escape `&`, `<` and `>`
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escaped, trimmed translations of every translated entry
pub fn translation_map(table: &TranslationTable) -> BTreeMap<u32, String> {
    table
        .entries()
        .filter(|entry| entry.is_translated())
        .map(|entry| (entry.order, escape_markup(entry.target_text.trim())))
        .collect()
}

/// Replace `{{N}}` and `@PLACEHOLDER(N)@` with the translation for `N`
///
/// Placeholders without a translation are left as they are. Returns the new
/// content and the number of placeholders replaced.
pub fn substitute_placeholders(content: &str, translations: &BTreeMap<u32, String>) -> (String, usize) {
    let mut applied = 0;
    let replaced = PLACEHOLDER_RE.replace_all(content, |caps: &Captures<'_>| {
        let translation = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|id| id.as_str().parse::<u32>().ok())
            .and_then(|id| translations.get(&id));
        match translation {
            Some(text) => {
                applied += 1;
                text.clone()
            }
            None => caps[0].to_string(),
        }
    });
    (replaced.into_owned(), applied)
}
