//! Change notifications emitted by the core
//!
//! Consumed by an external push layer. Delivery is at-least-once; fan-out
//! to observers is the broadcast layer's job.

use crate::{ActorId, Candidate, Member, PartyId, PartyStatus, SwipeRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What changed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartyEvent {
    PartyStatusChanged {
        from: PartyStatus,
        to: PartyStatus,
        actor: Option<ActorId>,
    },
    MemberJoined {
        member: Member,
    },
    MemberUpdated {
        member: Member,
    },
    CandidateRatingChanged {
        candidate: Candidate,
        previous_rating: f64,
    },
    SwipeRecorded {
        swipe: SwipeRecord,
    },
}

impl PartyEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PartyEvent::PartyStatusChanged { .. } => "party_status_changed",
            PartyEvent::MemberJoined { .. } => "member_joined",
            PartyEvent::MemberUpdated { .. } => "member_updated",
            PartyEvent::CandidateRatingChanged { .. } => "candidate_rating_changed",
            PartyEvent::SwipeRecorded { .. } => "swipe_recorded",
        }
    }
}

/// An event addressed to one party
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartyEventEnvelope {
    pub event_id: String,
    pub party_id: PartyId,
    pub occurred_at: DateTime<Utc>,
    pub event: PartyEvent,
}

impl PartyEventEnvelope {
    pub fn new(party_id: PartyId, event: PartyEvent) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            party_id,
            occurred_at: Utc::now(),
            event,
        }
    }
}
