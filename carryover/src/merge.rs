//! First-time table creation from a source and a translated segment file

use std::collections::BTreeMap;

use crate::segment::Segment;
use crate::table::{TranslationEntry, TranslationTable};

/// Pair source segments with translated segments by order number
///
/// Every source segment becomes an entry. Its target is the translated segment
/// with the same order, or empty. Translated segments without a source
/// counterpart are ignored.
pub fn merge_segments(source: &[Segment], target: Option<&[Segment]>) -> TranslationTable {
    let targets: BTreeMap<u32, &str> = target
        .unwrap_or_default()
        .iter()
        .map(|segment| (segment.order, segment.text.as_str()))
        .collect();

    source
        .iter()
        .map(|segment| {
            let target_text = targets.get(&segment.order).copied().unwrap_or_default();
            TranslationEntry::new(segment.order, segment.text.as_str(), target_text)
        })
        .collect()
}
