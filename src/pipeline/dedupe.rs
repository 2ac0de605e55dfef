use std::collections::HashMap;

use crate::constants::DUPLICATE_THRESHOLD;

/// Dice coefficient over character bigrams, ignoring whitespace.
///
/// Lengths and bigrams are counted in `char`s, so non-Latin scripts score
/// the same as ASCII text. Identical strings score 1.0; otherwise a string
/// with fewer than two non-space characters scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b: Vec<char> = b.chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }

    (2 * shared) as f64 / (a.len() + b.len() - 2) as f64
}

/// Index and score of the accepted description closest to `candidate`
pub fn best_match<S: AsRef<str>>(candidate: &str, accepted: &[S]) -> Option<(usize, f64)> {
    accepted
        .iter()
        .enumerate()
        .map(|(idx, existing)| (idx, similarity(candidate, existing.as_ref())))
        .fold(None, |best, (idx, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((idx, score)),
        })
}

/// True when `candidate` is at least [`DUPLICATE_THRESHOLD`] similar to any
/// description already accepted in this batch.
pub fn is_duplicate<S: AsRef<str>>(candidate: &str, accepted: &[S]) -> bool {
    if accepted.is_empty() {
        return false;
    }
    best_match(candidate, accepted)
        .map(|(_, score)| score >= DUPLICATE_THRESHOLD)
        .unwrap_or(false)
}
