//! Membership records: who is in a party and how far along they are

use crate::{ActorId, MemberId, PartyError, PartyId, PartyResult, Preferences};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a member. Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Host,
    Member,
}

/// Status of a member. Only ever moves away from `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    /// Member left voluntarily
    Left,
    /// Member was removed by the host
    Removed,
}

/// A record for a single member of a party
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub party_id: PartyId,
    pub actor: ActorId,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub preferences: Preferences,
    /// Extra generation hints submitted alongside preferences
    #[serde(default, skip_serializing_if = "Preferences::is_empty")]
    pub hints: Preferences,
    pub has_submitted_preferences: bool,
    pub has_completed_swiping: bool,
    pub swipes_completed: u32,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    fn new(party_id: PartyId, actor: ActorId, role: MemberRole) -> Self {
        let now = Utc::now();
        Self {
            id: MemberId::generate(),
            party_id,
            actor,
            role,
            status: MemberStatus::Active,
            preferences: Preferences::new(),
            hints: Preferences::new(),
            has_submitted_preferences: false,
            has_completed_swiping: false,
            swipes_completed: 0,
            joined_at: now,
            updated_at: now,
        }
    }

    /// The creator's membership record
    pub fn host(party_id: PartyId, actor: ActorId) -> Self {
        Self::new(party_id, actor, MemberRole::Host)
    }

    /// A regular joiner's membership record
    pub fn joiner(party_id: PartyId, actor: ActorId) -> Self {
        Self::new(party_id, actor, MemberRole::Member)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, MemberStatus::Active)
    }

    pub fn is_host(&self) -> bool {
        matches!(self.role, MemberRole::Host)
    }

    /// Replace this member's preference submission.
    pub fn submit_preferences(&mut self, preferences: Preferences, hints: Preferences) {
        self.preferences = preferences;
        self.hints = hints;
        self.has_submitted_preferences = true;
        self.updated_at = Utc::now();
    }

    /// Count one more swipe against a candidate set of `candidate_count`.
    ///
    /// Returns `true` when this swipe is the one that completes the member.
    pub fn record_swipe(&mut self, candidate_count: usize) -> PartyResult<bool> {
        if self.swipes_completed as usize >= candidate_count {
            return Err(PartyError::PreconditionFailed(format!(
                "member {} has already swiped all {candidate_count} candidates",
                self.actor
            )));
        }
        let was_complete = self.has_completed_swiping;
        self.swipes_completed += 1;
        self.has_completed_swiping = self.swipes_completed as usize == candidate_count;
        self.updated_at = Utc::now();
        Ok(self.has_completed_swiping && !was_complete)
    }

    /// Move an active member to `Left` or `Removed`.
    pub fn depart(&mut self, status: MemberStatus) -> PartyResult<()> {
        if status == MemberStatus::Active {
            return Err(PartyError::Validation(
                "departure status must be left or removed".into(),
            ));
        }
        if !self.is_active() {
            return Err(PartyError::PreconditionFailed(format!(
                "member {} is no longer active",
                self.actor
            )));
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }
}
