//! Candidate and resume ordering.

use std::collections::HashMap;

use super::domain::{Candidate, CandidateId};
use super::generation::{fallback, CandidateRanking};

/// Invitations sent per intake tick.
pub const INTAKE_INVITE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    top_k: usize,
}

impl RankingPolicy {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Scores keyed by candidate, in candidate order. Ranking entries naming unknown ids are
    /// dropped; candidates the ranking omitted get the deterministic fallback score.
    pub fn candidate_scores(
        candidates: &[Candidate],
        rankings: &[CandidateRanking],
    ) -> Vec<(CandidateId, u8)> {
        let ranked: HashMap<&str, u8> = rankings
            .iter()
            .map(|entry| (entry.candidate_id.as_str(), entry.score))
            .collect();

        candidates
            .iter()
            .map(|candidate| {
                let score = ranked
                    .get(candidate.id.0.as_str())
                    .copied()
                    .unwrap_or_else(|| Self::fallback_score(candidate));
                (candidate.id.clone(), score)
            })
            .collect()
    }

    pub fn fallback_score(candidate: &Candidate) -> u8 {
        fallback::candidate_score(candidate)
    }

    /// Ids of the best `top_k` candidates, highest score first; equal scores keep input order.
    pub fn select_top(&self, scored: &[(CandidateId, u8)]) -> Vec<CandidateId> {
        top_by(scored, self.top_k, |(_, score)| *score)
            .into_iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// The first `k` items by descending key. The sort is stable, so ties keep arrival order.
pub fn top_by<T, K, F>(items: &[T], k: usize, key: F) -> Vec<&T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut ordered: Vec<&T> = items.iter().collect();
    ordered.sort_by(|left, right| key(right).cmp(&key(left)));
    ordered.truncate(k);
    ordered
}
