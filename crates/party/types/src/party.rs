//! The party record and its lifecycle status

use crate::{ActorId, AggregatedPreferences, CandidateId, PartyError, PartyId, PartyResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a party.
///
/// The only legal moves are one step forward:
/// `Waiting → CollectingPreferences → Swiping → Completed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartyStatus {
    #[default]
    Waiting,
    CollectingPreferences,
    Swiping,
    Completed,
}

impl PartyStatus {
    /// The single status this one may move to, if any.
    pub fn next(&self) -> Option<PartyStatus> {
        match self {
            PartyStatus::Waiting => Some(PartyStatus::CollectingPreferences),
            PartyStatus::CollectingPreferences => Some(PartyStatus::Swiping),
            PartyStatus::Swiping => Some(PartyStatus::Completed),
            PartyStatus::Completed => None,
        }
    }

    pub fn can_transition_to(&self, to: PartyStatus) -> bool {
        self.next() == Some(to)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PartyStatus::Completed)
    }

    /// Whether new members may still join.
    pub fn accepts_members(&self) -> bool {
        matches!(
            self,
            PartyStatus::Waiting | PartyStatus::CollectingPreferences
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartyStatus::Waiting => "waiting",
            PartyStatus::CollectingPreferences => "collecting_preferences",
            PartyStatus::Swiping => "swiping",
            PartyStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PartyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-chosen settings for a new party
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub min_members: u32,
    pub max_members: u32,
}

impl PartySettings {
    pub fn new(min_members: u32, max_members: u32) -> Self {
        Self {
            name: None,
            min_members,
            max_members,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check the member bounds. `hard_max` is the deployment-wide ceiling.
    pub fn validate(&self, hard_max: u32) -> PartyResult<()> {
        if self.min_members < 1 {
            return Err(PartyError::Validation("min_members must be at least 1".into()));
        }
        if self.max_members < self.min_members {
            return Err(PartyError::Validation(format!(
                "max_members ({}) is below min_members ({})",
                self.max_members, self.min_members
            )));
        }
        if self.max_members > hard_max {
            return Err(PartyError::Validation(format!(
                "max_members ({}) exceeds the limit of {}",
                self.max_members, hard_max
            )));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(PartyError::Validation("party name is blank".into()));
            }
        }
        Ok(())
    }
}

/// A party session.
///
/// Owned by the state machine: status, aggregated preferences and the
/// candidate set only change through its transition operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    /// Opaque external-facing handle
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_by: ActorId,
    pub status: PartyStatus,
    pub min_members: u32,
    pub max_members: u32,
    pub aggregated_preferences: AggregatedPreferences,
    /// Candidate ids in presentation order. Empty before `swiping`, fixed after.
    pub candidate_set: Vec<CandidateId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Party {
    /// Create a new party in `Waiting`.
    pub fn new(created_by: ActorId, settings: PartySettings) -> Self {
        let id = PartyId::generate();
        let slug = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        let now = Utc::now();
        Self {
            id,
            slug,
            name: settings.name.map(|n| n.trim().to_string()),
            created_by,
            status: PartyStatus::Waiting,
            min_members: settings.min_members,
            max_members: settings.max_members,
            aggregated_preferences: AggregatedPreferences::new(),
            candidate_set: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create with a specific ID (for testing or migration)
    pub fn with_id(mut self, id: PartyId) -> Self {
        self.id = id;
        self
    }

    /// Host capability check.
    pub fn is_host(&self, actor: &ActorId) -> bool {
        &self.created_by == actor
    }

    pub fn ensure_host(&self, actor: &ActorId, operation: &str) -> PartyResult<()> {
        if self.is_host(actor) {
            Ok(())
        } else {
            Err(PartyError::Unauthorized(format!(
                "only the host may {operation}"
            )))
        }
    }

    pub fn ensure_status(&self, expected: PartyStatus, operation: &str) -> PartyResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(PartyError::PreconditionFailed(format!(
                "cannot {operation} while party is {} (expected {expected})",
                self.status
            )))
        }
    }

    pub fn contains_candidate(&self, candidate_id: &CandidateId) -> bool {
        self.candidate_set.contains(candidate_id)
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_set.len()
    }
}
