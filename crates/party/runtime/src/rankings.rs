//! Consensus ranking over candidate ratings

use party_types::Candidate;

/// Order candidates by rating, highest first.
///
/// Ties fall back to more approvals, then candidate id, so equal inputs
/// always rank the same way.
pub fn rank_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.elo_rating
            .total_cmp(&a.elo_rating)
            .then_with(|| b.right_swipes.cmp(&a.right_swipes))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    candidates
}
