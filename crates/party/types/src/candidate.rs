//! Candidates: the fixed voting set of a party

use crate::{CandidateId, PartyError, PartyId, PartyResult, INITIAL_RATING};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the external generator hands back for one candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateSeed {
    pub candidate_id: CandidateId,
    pub title: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Prior approval probability in [0, 1]
    pub expected_score: f64,
}

impl CandidateSeed {
    pub fn new(candidate_id: impl Into<String>, title: impl Into<String>, expected_score: f64) -> Self {
        Self {
            candidate_id: CandidateId::new(candidate_id),
            title: title.into(),
            tags: BTreeSet::new(),
            expected_score,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn validate(&self) -> PartyResult<()> {
        if self.candidate_id.as_str().trim().is_empty() {
            return Err(PartyError::Validation("candidate id is blank".into()));
        }
        if self.title.trim().is_empty() {
            return Err(PartyError::Validation(format!(
                "candidate {} has a blank title",
                self.candidate_id
            )));
        }
        if !(0.0..=1.0).contains(&self.expected_score) {
            return Err(PartyError::Validation(format!(
                "candidate {} has expected score {} outside [0, 1]",
                self.candidate_id, self.expected_score
            )));
        }
        Ok(())
    }
}

/// A candidate within a party, with its shared-pool rating.
///
/// Identity and prior are immutable; the rating and counters only change
/// through [`crate::rating::apply_swipe`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub party_id: PartyId,
    pub candidate_id: CandidateId,
    pub title: String,
    pub tags: BTreeSet<String>,
    pub expected_score: f64,
    /// Rating before any swipe landed
    pub initial_rating: f64,
    pub elo_rating: f64,
    pub total_swipes: u32,
    pub right_swipes: u32,
    pub left_swipes: u32,
}

impl Candidate {
    pub fn from_seed(party_id: PartyId, seed: CandidateSeed) -> Self {
        Self {
            party_id,
            candidate_id: seed.candidate_id,
            title: seed.title,
            tags: seed.tags,
            expected_score: seed.expected_score,
            initial_rating: INITIAL_RATING,
            elo_rating: INITIAL_RATING,
            total_swipes: 0,
            right_swipes: 0,
            left_swipes: 0,
        }
    }

    /// Share of swipes that approved, if any landed.
    pub fn approval_ratio(&self) -> Option<f64> {
        if self.total_swipes == 0 {
            None
        } else {
            Some(self.right_swipes as f64 / self.total_swipes as f64)
        }
    }
}
