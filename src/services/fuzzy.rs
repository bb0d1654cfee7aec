//! Closest-match lookup of free text against a closed vocabulary.
//!
//! LLM answers for enum-typed filters drift in casing, separators and
//! spelling ("tv short", "Tv-Short", "TV_SHORT."). Every answer is snapped to
//! the nearest vocabulary entry or rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub const DEFAULT_THRESHOLD: f64 = 0.6;

const PREFIX_BONUS_WEIGHT: f64 = 0.2;
const MIN_BONUS_PREFIX: usize = 2;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_\s]+").unwrap());

/// Trim, uppercase and collapse runs of `-`, `_` and whitespace into `_`.
pub fn normalize(value: &str) -> String {
    SEPARATORS
        .replace_all(&value.trim().to_uppercase(), "_")
        .into_owned()
}

/// [`find_closest_of`] with the default threshold.
pub fn find_closest<'a>(vocabulary: &[&'a str], candidate: &str) -> Option<&'a str> {
    find_closest_of(vocabulary, candidate, DEFAULT_THRESHOLD)
}

/// Return the vocabulary entry closest to `candidate`, or `None` when the
/// best score stays under `threshold`.
///
/// The score is `1 - levenshtein / max_len`, plus a bonus of
/// `prefix_len / candidate_len * 0.2` once more than two leading characters
/// agree. Ties go to the entry seen first.
pub fn find_closest_of<'a>(
    vocabulary: &[&'a str],
    candidate: &str,
    threshold: f64,
) -> Option<&'a str> {
    if candidate.is_empty() {
        return None;
    }

    let normalized_candidate = normalize(candidate);
    if normalized_candidate.is_empty() {
        return None;
    }

    let normalized: Vec<String> = vocabulary.iter().map(|entry| normalize(entry)).collect();

    if let Some(index) = normalized
        .iter()
        .position(|entry| *entry == normalized_candidate)
    {
        return Some(vocabulary[index]);
    }

    let candidate_len = normalized_candidate.chars().count();
    let mut best_match = None;
    let mut best_score = 0.0;

    for (entry, normalized_entry) in vocabulary.iter().zip(&normalized) {
        let score = similarity(&normalized_candidate, candidate_len, normalized_entry);
        if score > best_score {
            best_score = score;
            best_match = Some(*entry);
        }
    }

    debug!(
        "Fuzzy match: {:?}, score: {:.3}, input: {}",
        best_match, best_score, candidate
    );

    if best_score >= threshold {
        best_match
    } else {
        None
    }
}

fn similarity(candidate: &str, candidate_len: usize, entry: &str) -> f64 {
    let distance = strsim::levenshtein(candidate, entry);
    let max_len = candidate_len.max(entry.chars().count());
    let base = 1.0 - distance as f64 / max_len as f64;

    let prefix_len = common_prefix_len(candidate, entry);
    let bonus = if prefix_len > MIN_BONUS_PREFIX {
        prefix_len as f64 / candidate_len as f64 * PREFIX_BONUS_WEIGHT
    } else {
        0.0
    };

    base + bonus
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
