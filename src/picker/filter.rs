use std::collections::HashMap;

use crate::model::Candidate;

/// Lower-cased whitespace tokens of a query.
pub(crate) fn query_tokens(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

pub(crate) fn matches_all(candidate: &Candidate, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let text = candidate.search_text();
    tokens.iter().all(|token| text.contains(token.as_str()))
}

/// Candidates matching every query token, recent ids first (in recency order),
/// the rest in input order.
pub(crate) fn rank_and_filter(
    candidates: &[Candidate],
    query: &str,
    recent_ids: &[String],
) -> Vec<Candidate> {
    let tokens = query_tokens(query);
    let priority: HashMap<&str, usize> = recent_ids
        .iter()
        .enumerate()
        .rev()
        .map(|(index, id)| (id.as_str(), index))
        .collect();

    let mut recent = Vec::new();
    let mut other = Vec::new();
    for candidate in candidates.iter().filter(|c| matches_all(c, &tokens)) {
        match priority.get(candidate.id.as_str()) {
            Some(rank) => recent.push((*rank, candidate.clone())),
            None => other.push(candidate.clone()),
        }
    }
    recent.sort_by_key(|(rank, _)| *rank);

    recent
        .into_iter()
        .map(|(_, candidate)| candidate)
        .chain(other)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> Vec<Candidate> {
        vec![
            Candidate::new("i-1", "prod-web-1", "10.0.0.1"),
            Candidate::new("i-2", "prod-db-1", "10.0.0.2"),
            Candidate::new("i-3", "staging-web-1", "10.0.1.3"),
        ]
    }

    fn ids(list: &[Candidate]) -> Vec<&str> {
        list.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn all_words_must_match() {
        let result = rank_and_filter(&fleet(), "prod web", &[]);
        assert_eq!(ids(&result), vec!["i-1"]);
    }

    #[test]
    fn empty_query_is_ranked_by_recency() {
        let result = rank_and_filter(&fleet(), "", &["i-3".to_string()]);
        assert_eq!(ids(&result), vec!["i-3", "i-1", "i-2"]);
    }

    #[test]
    fn whitespace_only_query_keeps_everything() {
        let result = rank_and_filter(&fleet(), "   \t ", &[]);
        assert_eq!(ids(&result), vec!["i-1", "i-2", "i-3"]);
    }

    #[test]
    fn matching_is_case_insensitive_and_covers_address() {
        let result = rank_and_filter(&fleet(), "PROD 10.0.0.2", &[]);
        assert_eq!(ids(&result), vec!["i-2"]);
        let result = rank_and_filter(&fleet(), "I-3", &[]);
        assert_eq!(ids(&result), vec!["i-3"]);
    }

    #[test]
    fn recent_order_follows_recent_ids() {
        let recent = vec!["i-2".to_string(), "i-1".to_string()];
        let result = rank_and_filter(&fleet(), "prod", &recent);
        assert_eq!(ids(&result), vec!["i-2", "i-1"]);

        let result = rank_and_filter(&fleet(), "1", &recent);
        assert_eq!(ids(&result), vec!["i-2", "i-1", "i-3"]);
    }

    #[test]
    fn recent_ids_missing_from_candidates_are_ignored() {
        let recent = vec!["i-9".to_string(), "i-3".to_string()];
        let result = rank_and_filter(&fleet(), "", &recent);
        assert_eq!(ids(&result), vec!["i-3", "i-1", "i-2"]);
    }

    #[test]
    fn extra_token_never_grows_matches() {
        let queries = ["", "prod", "web", "1", "10.0", "i-"];
        let extras = ["web", "db", "staging", "2", "zzz"];
        for query in queries {
            let base = rank_and_filter(&fleet(), query, &[]);
            for extra in extras {
                let narrowed = rank_and_filter(&fleet(), &format!("{query} {extra}"), &[]);
                assert!(narrowed.len() <= base.len());
                assert!(narrowed.iter().all(|c| base.contains(c)));
            }
        }
    }

    #[test]
    fn output_is_deterministic() {
        let recent = vec!["i-3".to_string()];
        let first = rank_and_filter(&fleet(), "web", &recent);
        for _ in 0..5 {
            assert_eq!(rank_and_filter(&fleet(), "web", &recent), first);
        }
    }
}
