//! Match scoring module
//!
//! Character-level sequence similarity used to re-rank search hits. The
//! ratio is the classic longest-matching-blocks measure: find the longest
//! common contiguous block, recurse on the pieces to its left and right,
//! and report 2·M/T where M is the total matched length and T the combined
//! length of both strings. A heuristic signal, not a correctness-critical
//! computation.

use crate::store::Document;
use std::collections::HashMap;

/// Longest matching block between `a` and `b`
///
/// Returns `(a_start, b_start, len)`; on ties the earliest block in `a`
/// wins, matching the conventional behavior of the measure.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // j2len[j] = length of the match ending at a[i-1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, &ca) in a.iter().enumerate() {
        let mut next: HashMap<usize, usize> = HashMap::new();
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                let k = if j > 0 {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                next.insert(j, k);
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        j2len = next;
    }
    best
}

/// Total matched characters across all matching blocks
fn match_total(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (i, j, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + match_total(&a[..i], &b[..j]) + match_total(&a[i + size..], &b[j + size..])
}

/// Similarity ratio between two strings, in [0, 1]
///
/// Two empty strings are identical (1.0); one empty string matches nothing
/// (0.0). Case-sensitive on its inputs; callers lowercase as needed.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * match_total(&a, &b) as f64 / total as f64
}

/// Score a document against the raw user query
///
/// Unweighted mean of the canonical-title ratio and the snippet ratio,
/// both computed case-insensitively against the query. The canonical title
/// is already lowercase by construction.
pub fn score_match(doc: &Document, raw_query: &str) -> f64 {
    let query = raw_query.to_lowercase();
    let title_ratio = sequence_ratio(&doc.canonical_title, &query);
    let snippet_ratio = sequence_ratio(&doc.snippet.to_lowercase(), &query);
    (title_ratio + snippet_ratio) / 2.0
}
