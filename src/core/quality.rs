//! Quality and selection heuristics for duplicate copies.

use crate::models::media::MediaVariant;

/// Rank a resolution label: 4K > 1080p > 720p > 480p > unknown.
///
/// Unknown/missing labels rank lowest but are not an error.
pub fn resolution_priority(label: Option<&str>) -> u8 {
    let label = match label {
        Some(l) => l.to_lowercase(),
        None => return 1,
    };
    if label.contains("4k") || label.contains("2160") {
        4
    } else if label.contains("1080") {
        3
    } else if label.contains("720") {
        2
    } else {
        // "480" and anything unrecognized both rank lowest
        1
    }
}

/// True iff any variant's `"{resolution} {file path}"` contains one of the
/// configured preserve terms (case-insensitive). An empty term list always
/// yields false; the feature is opt-in.
pub fn has_preserved_copy(variants: &[MediaVariant], preserve_terms: &[String]) -> bool {
    let terms: Vec<String> = preserve_terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return false;
    }

    variants.iter().any(|v| {
        let haystack = format!(
            "{} {}",
            v.video_resolution.as_deref().unwrap_or(""),
            v.file_path.as_deref().unwrap_or("")
        )
        .to_lowercase();
        terms.iter().any(|term| haystack.contains(term))
    })
}

/// Best (highest) resolution priority across a candidate's variants.
pub fn best_resolution(variants: &[MediaVariant]) -> u8 {
    variants
        .iter()
        .map(|v| resolution_priority(v.video_resolution.as_deref()))
        .max()
        .unwrap_or(1)
}

/// Best (largest) file size across a candidate's variants.
pub fn best_size(variants: &[MediaVariant]) -> u64 {
    variants.iter().filter_map(|v| v.size_bytes).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_resolution_ranks_lowest() {
        assert_eq!(resolution_priority(None), 1);
        assert_eq!(resolution_priority(Some("dvd")), 1);
        assert_eq!(resolution_priority(Some("480")), 1);
        assert!(resolution_priority(Some("4k")) > resolution_priority(Some("1080")));
    }

    #[test]
    fn empty_preserve_terms_never_match() {
        let variants = vec![MediaVariant {
            media_id: None,
            video_resolution: Some("1080".into()),
            size_bytes: None,
            file_path: Some("/movies/Film.Remux.mkv".into()),
        }];
        assert!(!has_preserved_copy(&variants, &[]));
        assert!(has_preserved_copy(&variants, &["remux".to_string()]));
        assert!(!has_preserved_copy(&variants, &["  ".to_string()]));
    }
}
