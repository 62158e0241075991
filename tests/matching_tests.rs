//! Integration tests for title matching.
//!
//! Tests cover:
//! - Normalization as the equality key
//! - The fuzzy acceptance threshold boundary
//! - Best-match selection over candidate lists

use curatarr::core::matching::{
    best_fuzzy_match, dice_similarity, normalize_title, titles_match, FUZZY_ACCEPT_THRESHOLD,
};

#[test]
fn test_normalization_joins_catalog_spellings() {
    assert_eq!(
        normalize_title("Marvel's Agents of S.H.I.E.L.D."),
        normalize_title("marvels agents of shield")
    );
    assert_ne!(normalize_title("Alien"), normalize_title("Aliens"));
}

#[test]
fn test_threshold_boundary() {
    // "abcde" vs "abcdf": 3 shared bigrams of 4 each -> 0.75, accepted.
    assert!(dice_similarity("abcde", "abcdf") >= FUZZY_ACCEPT_THRESHOLD);
    assert!(titles_match("abcde", "abcdf"));

    // "abcd" vs "abce": 2 shared bigrams of 3 each -> ~0.667, rejected.
    assert!(dice_similarity("abcd", "abce") < FUZZY_ACCEPT_THRESHOLD);
    assert!(!titles_match("abcd", "abce"));
}

#[test]
fn test_exact_threshold_score_is_accepted() {
    // 7 shared bigrams of 10 each -> exactly 0.70; the cutoff is inclusive.
    let score = dice_similarity("abcdefghijk", "abcdefghxyz");
    assert_eq!(score, FUZZY_ACCEPT_THRESHOLD);
    assert!(titles_match("abcdefghijk", "abcdefghxyz"));
}

#[test]
fn test_similarity_is_symmetric() {
    let a = "The Lord of the Rings";
    let b = "Lord of the Rings, The";
    assert_eq!(dice_similarity(a, b), dice_similarity(b, a));
}

#[test]
fn test_best_match_prefers_highest_score() {
    let candidates = vec![
        "The Matrix Revolutions".to_string(),
        "The Matrix".to_string(),
        "Mortal Kombat".to_string(),
    ];
    let best = best_fuzzy_match("The Matrix", &candidates, |s| s.as_str()).unwrap();
    assert_eq!(best, "The Matrix");
}

#[test]
fn test_below_threshold_is_not_found() {
    let candidates = vec!["Severance".to_string(), "Silo".to_string()];
    assert!(best_fuzzy_match("Breaking Bad", &candidates, |s| s.as_str()).is_none());
}

#[test]
fn test_empty_titles_never_match() {
    assert!(!titles_match("", ""));
    assert!(!titles_match("!!!", "???"));
}
