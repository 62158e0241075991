//! Duplicate-group resolver.
//!
//! Given a set of media copies sharing an identity key, pick exactly one
//! survivor by a deterministic tie-break chain and compute the deletion set
//! as everything else. Pure: no I/O, order-independent for the same inputs.

use crate::core::quality::{best_resolution, best_size, has_preserved_copy};
use crate::models::config::DeletePreference;
use crate::models::media::MediaIdentity;
use std::cmp::Ordering;

/// Outcome of resolving one duplicate group.
#[derive(Debug, Clone)]
pub struct GroupResolution {
    pub keep: MediaIdentity,
    /// Rating keys of every other candidate, preserved-pool or not.
    pub delete_keys: Vec<String>,
}

#[derive(Debug)]
struct Scored<'a> {
    identity: &'a MediaIdentity,
    resolution: u8,
    size: u64,
    preserved: bool,
}

/// Resolve a duplicate group to a keep/delete decision.
///
/// Returns `None` for groups with fewer than two loaded candidates; that is
/// a no-op, not a failure. When any candidate carries a preserve term the
/// comparison pool is restricted to preserved candidates so an explicitly
/// protected copy can never lose to the stated preference alone.
pub fn resolve_group(
    candidates: &[MediaIdentity],
    preference: DeletePreference,
    preserve_terms: &[String],
) -> Option<GroupResolution> {
    if candidates.len() < 2 {
        return None;
    }

    let scored: Vec<Scored<'_>> = candidates
        .iter()
        .map(|c| Scored {
            identity: c,
            resolution: best_resolution(&c.variants),
            size: best_size(&c.variants),
            preserved: has_preserved_copy(&c.variants, preserve_terms),
        })
        .collect();

    let any_preserved = scored.iter().any(|s| s.preserved);
    let mut pool: Vec<&Scored<'_>> = scored
        .iter()
        .filter(|s| !any_preserved || s.preserved)
        .collect();

    pool.sort_by(|a, b| rank(a, b, preference));

    let keep = pool[0].identity.clone();
    let delete_keys = candidates
        .iter()
        .filter(|c| c.rating_key != keep.rating_key)
        .map(|c| c.rating_key.clone())
        .collect();

    Some(GroupResolution { keep, delete_keys })
}

/// Total order over candidates; the head of the sorted pool is kept.
fn rank(a: &Scored<'_>, b: &Scored<'_>, preference: DeletePreference) -> Ordering {
    let by_preference = match preference {
        // "Delete the newest" keeps the oldest: ascending added-at.
        DeletePreference::Newest => added_at(a).cmp(&added_at(b)),
        // "Delete the oldest" keeps the newest: descending added-at.
        DeletePreference::Oldest => added_at(b).cmp(&added_at(a)),
        // "Delete the smallest" keeps the largest: descending size, with a
        // missing size treated as infinitely large (never the one deleted).
        DeletePreference::SmallestFile => size_or(b, u64::MAX).cmp(&size_or(a, u64::MAX)),
        // "Delete the largest" keeps the smallest: ascending size.
        DeletePreference::LargestFile => size_or(a, 0).cmp(&size_or(b, 0)),
        DeletePreference::None => Ordering::Equal,
    };

    // Fixed final tie-break: higher resolution, then larger size, then
    // rating key so the sort is total and permutation-independent.
    by_preference
        .then_with(|| b.resolution.cmp(&a.resolution))
        .then_with(|| b.size.cmp(&a.size))
        .then_with(|| a.identity.rating_key.cmp(&b.identity.rating_key))
}

fn added_at(s: &Scored<'_>) -> i64 {
    s.identity.added_at.unwrap_or(0)
}

fn size_or(s: &Scored<'_>, missing: u64) -> u64 {
    let sizes: Vec<u64> = s
        .identity
        .variants
        .iter()
        .filter_map(|v| v.size_bytes)
        .collect();
    if sizes.is_empty() {
        missing
    } else {
        s.size
    }
}
