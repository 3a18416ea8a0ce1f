//! Word-overlap heuristic used to flag near-duplicate generation prompts.

use std::collections::BTreeSet;

/// Words shorter than this carry no signal ("a", "I", ...).
const MIN_WORD_LEN: usize = 2;

pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.8;

fn words(prompt: &str) -> BTreeSet<String> {
    prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Jaccard index of the two prompts' word sets, in `[0, 1]`.
///
/// Two prompts without any usable word score 0.
pub fn overlap(a: &str, b: &str) -> f64 {
    let a = words(a);
    let b = words(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    shared as f64 / union as f64
}

pub fn is_near_duplicate(a: &str, b: &str, threshold: f64) -> bool {
    overlap(a, b) >= threshold
}
