//! Shared-pool Elo rating
//!
//! Every actor's vote moves one rating per candidate:
//!
//! ```text
//! actual = 1.0 if approve else 0.0
//! delta  = K * (actual - expected_score)      K = 32
//! ```
//!
//! `expected_score` is the static prior from generation time and is never
//! recomputed from the evolving rating. This is not two-player Elo; the pool
//! converges toward "approved more or less often than expected".

use crate::{Candidate, CandidateId, SwipeDirection};
use serde::{Deserialize, Serialize};

/// Fixed K-factor
pub const K_FACTOR: f64 = 32.0;

/// Rating every candidate starts from
pub const INITIAL_RATING: f64 = 1200.0;

/// Rating change produced by a single vote.
pub fn elo_delta(expected_score: f64, direction: SwipeDirection) -> f64 {
    K_FACTOR * (direction.actual_score() - expected_score)
}

/// Rating implied by a candidate's tallies.
///
/// Equal to the initial rating plus the sum of every vote's delta, evaluated
/// from the counts so the value is bit-identical whatever order votes land in.
pub fn settled_rating(initial_rating: f64, expected_score: f64, right_swipes: u32, total_swipes: u32) -> f64 {
    initial_rating + K_FACTOR * (right_swipes as f64 - total_swipes as f64 * expected_score)
}

/// Outcome of applying one vote to a candidate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub candidate_id: CandidateId,
    pub direction: SwipeDirection,
    pub previous_rating: f64,
    pub delta: f64,
    pub new_rating: f64,
}

/// Apply one vote to the candidate's current stored state.
///
/// Must run inside the same atomic unit that reads the candidate, otherwise
/// concurrent votes lose updates.
pub fn apply_swipe(candidate: &mut Candidate, direction: SwipeDirection) -> RatingUpdate {
    let previous_rating = candidate.elo_rating;
    let delta = elo_delta(candidate.expected_score, direction);

    candidate.total_swipes += 1;
    match direction {
        SwipeDirection::Approve => candidate.right_swipes += 1,
        SwipeDirection::Reject => candidate.left_swipes += 1,
    }
    candidate.elo_rating = settled_rating(
        candidate.initial_rating,
        candidate.expected_score,
        candidate.right_swipes,
        candidate.total_swipes,
    );

    RatingUpdate {
        candidate_id: candidate.candidate_id.clone(),
        direction,
        previous_rating,
        delta,
        new_rating: candidate.elo_rating,
    }
}
