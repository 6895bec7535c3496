//! Relevance scoring for ranked text search over instrument names.
//!
//! For each distinct query term found in a candidate, the score grows by
//! `0.5 + 0.5 * occurrences / candidate_terms`. A one-word name matched
//! exactly scores `1.0`; a three-word name matched on every word scores `2.0`.

use std::collections::BTreeSet;

/// Splits text into lowercase search terms. `&` is kept as a term.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '&'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Scores how well `candidate` matches `query`. Zero means no term matched.
#[must_use]
pub fn text_score(query: &str, candidate: &str) -> f64 {
    let candidate_terms = tokenize(candidate);
    if candidate_terms.is_empty() {
        return 0.0;
    }
    let total = candidate_terms.len() as f64;

    tokenize(query)
        .into_iter()
        .collect::<BTreeSet<_>>()
        .iter()
        .map(|term| candidate_terms.iter().filter(|t| *t == term).count())
        .filter(|&count| count > 0)
        .map(|count| 0.5 + 0.5 * count as f64 / total)
        .sum()
}

/// Picks the best-scoring candidate. Ties go to the lexicographically
/// smaller name. Returns `None` when nothing scores above zero.
pub fn best_match<'a, T>(
    query: &str,
    candidates: impl IntoIterator<Item = (&'a str, T)>,
) -> Option<(T, f64)> {
    let mut best: Option<(&'a str, T, f64)> = None;
    for (name, item) in candidates {
        let score = text_score(query, name);
        if score <= 0.0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((best_name, _, best_score)) => {
                score > *best_score || (score == *best_score && name < *best_name)
            }
        };
        if better {
            best = Some((name, item, score));
        }
    }
    best.map(|(_, item, score)| (item, score))
}
