//! Readiness and admission rules
//!
//! Evaluated by the store inside the same atomic unit as the mutation they
//! gate, so a concurrent join or departure can't slip between check and write.

use crate::{ActorId, Member, Party, PartyError, PartyResult};
use serde::{Deserialize, Serialize};

/// Predicate that must hold over the members for a status transition to commit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// No predicate
    Unconditional,
    /// At least `min_members` active members
    MinActiveMembers,
    /// Every active member has submitted preferences
    AllSubmittedPreferences,
    /// Every active member has swiped every candidate
    AllCompletedSwiping,
}

impl Readiness {
    pub fn check(&self, party: &Party, members: &[Member]) -> PartyResult<()> {
        let active: Vec<&Member> = members.iter().filter(|m| m.is_active()).collect();
        match self {
            Readiness::Unconditional => Ok(()),
            Readiness::MinActiveMembers => {
                if active.len() < party.min_members as usize {
                    Err(PartyError::PreconditionFailed(format!(
                        "party has {} active members, needs at least {}",
                        active.len(),
                        party.min_members
                    )))
                } else {
                    Ok(())
                }
            }
            Readiness::AllSubmittedPreferences => {
                let waiting_on: Vec<&str> = active
                    .iter()
                    .filter(|m| !m.has_submitted_preferences)
                    .map(|m| m.actor.as_str())
                    .collect();
                if active.is_empty() {
                    Err(PartyError::PreconditionFailed("party has no active members".into()))
                } else if !waiting_on.is_empty() {
                    Err(PartyError::PreconditionFailed(format!(
                        "waiting on preferences from: {}",
                        waiting_on.join(", ")
                    )))
                } else {
                    Ok(())
                }
            }
            Readiness::AllCompletedSwiping => {
                let pending = active.iter().filter(|m| !m.has_completed_swiping).count();
                if active.is_empty() || pending > 0 {
                    Err(PartyError::PreconditionFailed(format!(
                        "{pending} of {} active members still swiping",
                        active.len()
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Can `actor` join `party` given its current `members`?
pub fn check_admission(party: &Party, members: &[Member], actor: &ActorId) -> PartyResult<()> {
    if !party.status.accepts_members() {
        return Err(PartyError::PreconditionFailed(format!(
            "party is {} and no longer accepts members",
            party.status
        )));
    }
    if let Some(existing) = members.iter().find(|m| &m.actor == actor) {
        return Err(PartyError::Conflict(if existing.is_active() {
            format!("{actor} already joined this party")
        } else {
            format!("{actor} has left this party and cannot rejoin")
        }));
    }
    let active = members.iter().filter(|m| m.is_active()).count();
    if active >= party.max_members as usize {
        return Err(PartyError::CapacityExceeded {
            max: party.max_members,
        });
    }
    Ok(())
}
