//! Trigram-Jaccard "did you mean" suggestions for a missing package name.
//! Purely a logging aid, not resolver semantics.

use ahash::AHashSet;

pub const DEFAULT_SUGGESTION_COUNT: usize = 5;

/// Up to `k` names from `candidates` most similar to `missing`, ranked by
/// descending trigram-Jaccard similarity then alphabetically.
pub fn suggest(missing: &str, candidates: &[String], k: usize) -> Vec<String> {
    let target = trigrams(missing);
    let mut scored: Vec<(f64, &str)> = candidates
        .iter()
        .map(|candidate| (jaccard(&target, &trigrams(candidate)), candidate.as_str()))
        .filter(|(score, _)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(k).map(|(_, name)| name.to_string()).collect()
}

fn trigrams(s: &str) -> AHashSet<[u8; 3]> {
    let bytes = s.to_ascii_lowercase();
    let bytes = bytes.as_bytes();
    if bytes.len() < 3 {
        return AHashSet::default();
    }
    bytes.windows(3).map(|w| [w[0], w[1], w[2]]).collect()
}

fn jaccard(a: &AHashSet<[u8; 3]>, b: &AHashSet<[u8; 3]>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_misspelling_first() {
        let candidates = vec!["dplyr".to_string(), "purrr".to_string(), "ggplot2".to_string()];
        let suggestions = suggest("dplyrr", &candidates, 5);
        assert_eq!(suggestions.first(), Some(&"dplyr".to_string()));
    }

    #[test]
    fn caps_at_k_and_breaks_ties_alphabetically() {
        let candidates = vec!["abcxyz".to_string(), "abcxzy".to_string(), "zzzzzz".to_string()];
        let suggestions = suggest("abcxyz", &candidates, 1);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0], "abcxyz");
    }

    #[test]
    fn unrelated_names_produce_no_suggestions() {
        let candidates = vec!["zzz".to_string()];
        assert!(suggest("abc", &candidates, 5).is_empty());
    }
}
