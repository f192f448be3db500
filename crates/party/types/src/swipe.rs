//! Swipe votes and their append-only records

use crate::{ActorId, CandidateId, PartyError, PartyId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A binary vote on one candidate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Approve,
    Reject,
}

impl SwipeDirection {
    /// Observed outcome fed into the rating update.
    pub fn actual_score(&self) -> f64 {
        match self {
            SwipeDirection::Approve => 1.0,
            SwipeDirection::Reject => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Approve => "approve",
            SwipeDirection::Reject => "reject",
        }
    }
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeDirection {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "approve" => Ok(SwipeDirection::Approve),
            "reject" => Ok(SwipeDirection::Reject),
            other => Err(PartyError::Validation(format!(
                "invalid swipe direction '{other}' (expected approve or reject)"
            ))),
        }
    }
}

/// Uniqueness key of a swipe: at most one record per tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwipeKey {
    pub party_id: PartyId,
    pub actor: ActorId,
    pub candidate_id: CandidateId,
}

/// One recorded vote. Append-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub party_id: PartyId,
    pub actor: ActorId,
    pub candidate_id: CandidateId,
    pub direction: SwipeDirection,
    /// Rating change this vote produced, kept for audit
    pub elo_delta: f64,
    pub created_at: DateTime<Utc>,
}

impl SwipeRecord {
    pub fn new(
        party_id: PartyId,
        actor: ActorId,
        candidate_id: CandidateId,
        direction: SwipeDirection,
        elo_delta: f64,
    ) -> Self {
        Self {
            party_id,
            actor,
            candidate_id,
            direction,
            elo_delta,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> SwipeKey {
        SwipeKey {
            party_id: self.party_id.clone(),
            actor: self.actor.clone(),
            candidate_id: self.candidate_id.clone(),
        }
    }
}
