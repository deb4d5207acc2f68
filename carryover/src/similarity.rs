//! Text similarity for matching source segments across snapshots
//!
//! The score is the longest-common-subsequence ratio `2·M / T`, where `M` is
//! the length of the longest common subsequence and `T` the combined length of
//! both texts, measured in characters after lowercasing and trimming. The
//! measure is symmetric and reflexive and only looks at character sequences,
//! never at words or meaning.

use std::collections::HashMap;

/// Similarity of two texts in `[0, 1]`
///
/// # Example
///
/// ```
/// use carryover::similarity::similarity;
///
/// assert_eq!(similarity("Hallo Welt", "  hallo welt "), 1.0);
/// assert_eq!(similarity("abc", "xyz"), 0.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    ratio(&a, &b)
}

/// Cheap upper bound on [`similarity`]
///
/// Never smaller than the real score, so a candidate whose bound falls below
/// the current best can be skipped without computing the full ratio.
pub fn similarity_upper_bound(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let length_bound = ratio_of(a.len().min(b.len()), total);
    if length_bound == 0.0 {
        return 0.0;
    }

    // Characters shared as a multiset bound the common subsequence too.
    let mut counts: HashMap<char, isize> = HashMap::new();
    for c in &a {
        *counts.entry(*c).or_insert(0) += 1;
    }
    let mut shared = 0;
    for c in &b {
        let slot = counts.entry(*c).or_insert(0);
        if *slot > 0 {
            shared += 1;
        }
        *slot -= 1;
    }

    length_bound.min(ratio_of(shared, total))
}

fn normalize(text: &str) -> Vec<char> {
    text.trim().to_lowercase().chars().collect()
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    ratio_of(lcs_len(a, b), total)
}

fn ratio_of(matched: usize, total: usize) -> f64 {
    (2 * matched) as f64 / total as f64
}

/// Length of the longest common subsequence, two-row dynamic programming
fn lcs_len(a: &[char], b: &[char]) -> usize {
    // Keep the shorter text on the inner axis.
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if inner.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; inner.len() + 1];
    let mut curr = vec![0usize; inner.len() + 1];

    for oc in outer {
        for (j, ic) in inner.iter().enumerate() {
            curr[j + 1] = if oc == ic {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[inner.len()]
}
