//! Title matching utilities.
//!
//! Normalized-title equality is the join key used everywhere an exact
//! external-catalog id is unavailable; bigram Dice similarity is the fuzzy
//! fallback when even normalized equality fails.

use std::collections::HashMap;

/// Fuzzy matches below this score are treated as "not found", never guessed.
pub const FUZZY_ACCEPT_THRESHOLD: f64 = 0.70;

/// Lowercase and keep only ASCII alphanumerics. Used as the equality key for
/// title matching across Plex, Radarr and Sonarr catalogs.
pub fn normalize_title(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Bigram Dice coefficient over normalized titles, in `[0, 1]`.
///
/// Exact normalized equality short-circuits to 1. Normalized strings shorter
/// than two characters have no bigrams and score 0.
pub fn dice_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_title(a);
    let b = normalize_title(b);

    if a == b && !a.is_empty() {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let a_bigrams = bigram_counts(&a);
    let mut b_bigrams = bigram_counts(&b);

    let mut intersection = 0usize;
    for (bigram, count) in a_bigrams {
        if let Some(remaining) = b_bigrams.get_mut(&bigram) {
            let used = count.min(*remaining);
            intersection += used;
            *remaining -= used;
        }
    }

    (2 * intersection) as f64 / ((a.len() - 1) + (b.len() - 1)) as f64
}

/// True when two titles match closely enough to act on.
pub fn titles_match(a: &str, b: &str) -> bool {
    dice_similarity(a, b) >= FUZZY_ACCEPT_THRESHOLD
}

/// Pick the best fuzzy match for `wanted` among `candidates`, at or above the
/// acceptance threshold. Ties break toward the earlier candidate.
pub fn best_fuzzy_match<'a, T, F>(wanted: &str, candidates: &'a [T], title_of: F) -> Option<&'a T>
where
    F: Fn(&T) -> &str,
{
    let mut best: Option<(&T, f64)> = None;
    for candidate in candidates {
        let score = dice_similarity(wanted, title_of(candidate));
        if score >= FUZZY_ACCEPT_THRESHOLD {
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((candidate, score)),
            }
        }
    }
    best.map(|(c, _)| c)
}

fn bigram_counts(s: &str) -> HashMap<(u8, u8), usize> {
    let bytes = s.as_bytes();
    let mut counts = HashMap::new();
    for window in bytes.windows(2) {
        *counts.entry((window[0], window[1])).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_title("The Matrix (1999)!"), "thematrix1999");
        assert_eq!(normalize_title("  "), "");
    }

    #[test]
    fn identical_titles_score_one() {
        assert_eq!(dice_similarity("Foo Bar", "foo-bar"), 1.0);
    }

    #[test]
    fn short_strings_score_zero() {
        assert_eq!(dice_similarity("a", "a b"), 0.0);
    }
}
