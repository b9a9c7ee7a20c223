use std::collections::HashSet;

use xhswatch_core::Candidate;

/// Order-preserving union of the per-keyword batches: keyword order first,
/// discovery order within a keyword, first occurrence of an id wins.
pub fn merge_batches(batches: Vec<Vec<Candidate>>) -> Vec<Candidate> {
    let mut ids = HashSet::new();
    let mut merged = Vec::new();

    for batch in batches {
        for candidate in batch {
            if ids.insert(candidate.id.clone()) {
                merged.push(candidate);
            }
        }
    }

    merged
}

/// First-run flood guard: keep only the first `limit` candidates in merge
/// order. Not recency order: the earliest-discovered items win.
pub fn truncate_first_run(
    candidates: Vec<Candidate>,
    first_run: bool,
    limit: usize,
) -> Vec<Candidate> {
    if first_run && candidates.len() > limit {
        candidates.into_iter().take(limit).collect()
    } else {
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::candidate;

    #[test]
    fn test_merge_preserves_keyword_then_discovery_order() {
        let merged = merge_batches(vec![
            vec![candidate("a1"), candidate("a2")],
            vec![candidate("b1")],
            vec![candidate("c1"), candidate("c2")],
        ]);
        let ids: Vec<&str> = merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1", "c1", "c2"]);
    }

    #[test]
    fn test_merge_first_occurrence_wins() {
        let mut duplicate = candidate("dup");
        duplicate.title = "from the second keyword".to_string();

        let merged = merge_batches(vec![
            vec![candidate("dup"), candidate("a")],
            vec![duplicate, candidate("b")],
        ]);

        let ids: Vec<&str> = merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["dup", "a", "b"]);
        assert_eq!(merged[0].title, "title dup");
    }

    #[test]
    fn test_merge_dedups_within_one_batch() {
        let merged = merge_batches(vec![vec![
            candidate("x"),
            candidate("x"),
            candidate("y"),
        ]]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_truncate_only_on_first_run() {
        let candidates: Vec<_> = (0..15).map(|i| candidate(&format!("n{i:02}"))).collect();

        let untouched = truncate_first_run(candidates.clone(), false, 10);
        assert_eq!(untouched.len(), 15);

        let truncated = truncate_first_run(candidates, true, 10);
        assert_eq!(truncated.len(), 10);
        assert_eq!(truncated[0].id, "n00");
        assert_eq!(truncated[9].id, "n09");
    }

    #[test]
    fn test_truncate_leaves_short_lists_alone() {
        let candidates = vec![candidate("a"), candidate("b")];
        assert_eq!(truncate_first_run(candidates, true, 10).len(), 2);
    }
}
