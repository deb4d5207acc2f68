//! Numbered source segments
//!
//! The upstream extractor writes one segment per line in the form
//! `@(<digits>):<text>`. Order numbers are positions inside a single snapshot;
//! they are reassigned freely between snapshots and never identify content.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CarryError, CarryResult};

static MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@\((\d+)\):(.*)$").expect("marker pattern is a valid regex")
});

/// One numbered unit of source-language text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub order: u32,
    pub text: String,
}

impl Segment {
    pub fn new(order: u32, text: impl Into<String>) -> Self {
        Self {
            order,
            text: text.into(),
        }
    }
}

/// Parse every marker line of `content` into segments sorted by order
///
/// Lines are trimmed before matching. When an order number appears more than
/// once, the last occurrence wins. Marker lines whose order number overflows
/// `u32` are skipped with a warning.
///
/// # Example
///
/// ```
/// use carryover::segment::parse_segments;
///
/// let segments = parse_segments("@(2):Welt\nnoise\n@(1):Hallo\n");
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].order, 1);
/// assert_eq!(segments[1].text, "Welt");
/// ```
pub fn parse_segments(content: &str) -> Vec<Segment> {
    let mut by_order: BTreeMap<u32, String> = BTreeMap::new();

    for line in content.lines() {
        let Some(caps) = MARKER_LINE.captures(line.trim()) else {
            continue;
        };
        let Ok(order) = caps[1].parse::<u32>() else {
            warn!(order = &caps[1], "skipping segment, order number out of range");
            continue;
        };
        by_order.insert(order, caps[2].to_string());
    }

    by_order
        .into_iter()
        .map(|(order, text)| Segment { order, text })
        .collect()
}

/// Check whether `content` contains at least one marker line
pub fn has_markers(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .any(|line| line.starts_with("@(") && line.contains("):"))
}

/// Read the segments of a snapshot file
///
/// Returns `Ok(None)` when the file does not exist (not yet extracted) and
/// `Ok(Some(vec![]))` when it exists but holds no marker lines (nothing to
/// reconcile).
pub fn read_segments(path: &Path) -> CarryResult<Option<Vec<Segment>>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(parse_segments(&content))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(CarryError::io(path, err)),
    }
}
