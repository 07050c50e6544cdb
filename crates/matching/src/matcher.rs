//! Token-sequence scoring
//!
//! This module provides:
//! - Score: ordered match quality, lower is better
//! - score(): compare one candidate source path against a destination
//! - best(): pick the winning candidate, or report a tie as ambiguous
//!
//! A source path is passed as one token sequence per path step, so that
//! the scorer can tell how deep a candidate sits below the source root.

use modelmap_core::{MatchingStrategy, Token};

// ============================================================================
// Score
// ============================================================================

/// Quality of a candidate match; compares lexicographically, lower wins
///
/// Field order is significant: the loose partial-match penalty first, then
/// leftover source tokens, then candidate length in tokens, then the number
/// of path steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    /// 1 when a loose match did not agree on the full sequence
    pub partial: usize,
    /// Source tokens not consumed by the match
    pub leftover: usize,
    /// Total candidate tokens
    pub length: usize,
    /// Candidate path steps
    pub depth: usize,
}

/// Score `source` (tokens per path step) against `destination` tokens
///
/// Returns `None` when the candidate does not match under `strategy`. An
/// empty destination never matches. A loose match only needs the last
/// destination token somewhere in the candidate's last path step, so
/// `streetAddress` is a loose match for `street`.
///
/// # Example
///
/// ```
/// use modelmap_core::MatchingStrategy;
/// use modelmap_matching::score;
///
/// let source = vec![vec!["customer".to_string()], vec!["name".to_string()]];
/// let dest = vec!["customer".to_string(), "name".to_string()];
/// let s = score(&source, &dest, MatchingStrategy::Standard).unwrap();
/// assert_eq!(s.leftover, 0);
/// assert_eq!(s.depth, 2);
/// ```
pub fn score(
    source: &[Vec<Token>],
    destination: &[Token],
    strategy: MatchingStrategy,
) -> Option<Score> {
    if destination.is_empty() {
        return None;
    }
    let flat: Vec<&Token> = source.iter().flatten().collect();
    let matched = matched_in_order(&flat, destination);

    let (partial, leftover) = match strategy {
        MatchingStrategy::Exact => {
            if flat.len() != destination.len() || matched != destination.len() {
                return None;
            }
            (0, 0)
        }
        MatchingStrategy::Standard => {
            if matched != destination.len() {
                return None;
            }
            (0, flat.len() - matched)
        }
        MatchingStrategy::Loose => {
            let last_step = source.last()?;
            let last_dest = destination.last()?;
            if !last_step.contains(last_dest) {
                return None;
            }
            let partial = usize::from(matched != destination.len());
            (partial, flat.len() - matched)
        }
    };

    Some(Score {
        partial,
        leftover,
        length: flat.len(),
        depth: source.len(),
    })
}

/// Number of destination tokens matched, in order, by a greedy subsequence
/// walk over the source tokens
fn matched_in_order(source: &[&Token], destination: &[Token]) -> usize {
    let mut matched = 0;
    for token in source {
        if matched < destination.len() && **token == destination[matched] {
            matched += 1;
        }
    }
    matched
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of matching one destination against a candidate set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No candidate matched
    Unmatched,
    /// Exactly one candidate had the best score
    Unique(usize),
    /// Several candidates share the best score (indices in input order)
    Ambiguous(Vec<usize>),
}

/// Pick the best of `candidates` for `destination`
///
/// # Example
///
/// ```
/// use modelmap_core::MatchingStrategy;
/// use modelmap_matching::{best, Outcome};
///
/// let name = vec![vec!["name".to_string()]];
/// let nested = vec![vec!["customer".to_string()], vec!["name".to_string()]];
/// let dest = vec!["name".to_string()];
/// let outcome = best([name.as_slice(), nested.as_slice()], &dest, MatchingStrategy::Standard);
/// assert_eq!(outcome, Outcome::Unique(0));
/// ```
pub fn best<'a, I>(candidates: I, destination: &[Token], strategy: MatchingStrategy) -> Outcome
where
    I: IntoIterator<Item = &'a [Vec<Token>]>,
{
    let mut best_score: Option<Score> = None;
    let mut winners: Vec<usize> = Vec::new();

    for (i, candidate) in candidates.into_iter().enumerate() {
        let Some(s) = score(candidate, destination, strategy) else {
            continue;
        };
        match best_score {
            Some(current) if s > current => {}
            Some(current) if s == current => winners.push(i),
            _ => {
                best_score = Some(s);
                winners.clear();
                winners.push(i);
            }
        }
    }

    match winners.len() {
        0 => Outcome::Unmatched,
        1 => Outcome::Unique(winners[0]),
        _ => Outcome::Ambiguous(winners),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(steps: &[&[&str]]) -> Vec<Vec<Token>> {
        steps
            .iter()
            .map(|s| s.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    fn tokens(t: &[&str]) -> Vec<Token> {
        t.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_requires_identical_sequence() {
        let src = path(&[&["first", "name"]]);
        assert!(score(&src, &tokens(&["first", "name"]), MatchingStrategy::Exact).is_some());
        assert!(score(&src, &tokens(&["name"]), MatchingStrategy::Exact).is_none());
        assert!(score(&src, &tokens(&["name", "first"]), MatchingStrategy::Exact).is_none());
    }

    #[test]
    fn test_exact_flattens_path_steps() {
        let src = path(&[&["customer"], &["name"]]);
        let s = score(&src, &tokens(&["customer", "name"]), MatchingStrategy::Exact).unwrap();
        assert_eq!(s.depth, 2);
    }

    #[test]
    fn test_standard_counts_leftovers() {
        let src = path(&[&["customer"], &["first", "name"]]);
        let s = score(&src, &tokens(&["first", "name"]), MatchingStrategy::Standard).unwrap();
        assert_eq!(s.leftover, 1);
        assert_eq!(s.length, 3);
    }

    #[test]
    fn test_standard_requires_order() {
        let src = path(&[&["name", "first"]]);
        assert!(score(&src, &tokens(&["first", "name"]), MatchingStrategy::Standard).is_none());
    }

    #[test]
    fn test_standard_missing_destination_token() {
        let src = path(&[&["name"]]);
        assert!(score(&src, &tokens(&["first", "name"]), MatchingStrategy::Standard).is_none());
    }

    #[test]
    fn test_loose_only_needs_last_token() {
        let src = path(&[&["customer"], &["address"], &["street"]]);
        let partial = score(&src, &tokens(&["shipping", "street"]), MatchingStrategy::Loose).unwrap();
        assert_eq!(partial.partial, 1);
        let full = score(
            &src,
            &tokens(&["customer", "address", "street"]),
            MatchingStrategy::Loose,
        )
        .unwrap();
        assert_eq!(full.partial, 0);
        assert!(full < partial);
        assert!(score(&src, &tokens(&["street", "name"]), MatchingStrategy::Loose).is_none());
    }

    #[test]
    fn test_loose_last_token_anywhere_in_last_step() {
        let src = path(&[&["customer"], &["street", "address"]]);
        let s = score(&src, &tokens(&["customer", "address", "street"]), MatchingStrategy::Loose)
            .unwrap();
        assert_eq!(s.partial, 1);
        // only the last step counts
        let nested = path(&[&["street"], &["city"]]);
        assert!(score(&nested, &tokens(&["street"]), MatchingStrategy::Loose).is_none());
    }

    #[test]
    fn test_empty_destination_never_matches() {
        let src = path(&[&["name"]]);
        for strategy in [
            MatchingStrategy::Exact,
            MatchingStrategy::Standard,
            MatchingStrategy::Loose,
        ] {
            assert!(score(&src, &[], strategy).is_none());
        }
    }

    #[test]
    fn test_best_prefers_fewer_leftovers() {
        let direct = path(&[&["name"]]);
        let nested = path(&[&["customer"], &["name"]]);
        let outcome = best(
            [nested.as_slice(), direct.as_slice()],
            &tokens(&["name"]),
            MatchingStrategy::Standard,
        );
        assert_eq!(outcome, Outcome::Unique(1));
    }

    #[test]
    fn test_best_prefers_shallower_on_equal_tokens() {
        // same tokens, one split across two steps
        let flat = path(&[&["customer", "name"]]);
        let nested = path(&[&["customer"], &["name"]]);
        let outcome = best(
            [nested.as_slice(), flat.as_slice()],
            &tokens(&["customer", "name"]),
            MatchingStrategy::Standard,
        );
        assert_eq!(outcome, Outcome::Unique(1));
    }

    #[test]
    fn test_best_reports_ties() {
        let a = path(&[&["first", "name"]]);
        let b = path(&[&["first", "name"]]);
        let outcome = best(
            [a.as_slice(), b.as_slice()],
            &tokens(&["first", "name"]),
            MatchingStrategy::Standard,
        );
        assert_eq!(outcome, Outcome::Ambiguous(vec![0, 1]));
    }

    #[test]
    fn test_best_unmatched() {
        let a = path(&[&["age"]]);
        let outcome = best([a.as_slice()], &tokens(&["name"]), MatchingStrategy::Standard);
        assert_eq!(outcome, Outcome::Unmatched);
    }
}
