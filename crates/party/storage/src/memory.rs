//! In-memory reference implementation of the party storage traits.
//!
//! Each party lives behind its own mutex, so every operation on one party is
//! serialized while separate parties proceed independently. All checks run
//! before any write, which is what makes a rejected call leave no trace.

use crate::model::{StatusTransition, SwipeCommand, SwipeCommit};
use crate::traits::{CandidateStore, MemberStore, PartyStore, SwipeStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use party_types::{
    check_admission, rating, ActorId, Candidate, CandidateId, Member, MemberStatus, Party,
    PartyError, PartyId, PartyStatus, Preferences, Readiness, SwipeRecord, DUPLICATE_SWIPE,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Everything stored for one party.
#[derive(Debug)]
struct PartyRecord {
    party: Party,
    members: Vec<Member>,
    /// Candidate-set order
    candidates: Vec<Candidate>,
    swipes: Vec<SwipeRecord>,
    swipe_keys: HashSet<(ActorId, CandidateId)>,
    /// Candidate generation in flight; membership is frozen
    generating: bool,
}

impl PartyRecord {
    fn member_index(&self, actor: &ActorId) -> StorageResult<usize> {
        self.members
            .iter()
            .position(|m| &m.actor == actor)
            .ok_or_else(|| {
                StorageError::NotFound(format!("{actor} is not a member of party {}", self.party.id))
            })
    }

    fn ensure_not_generating(&self, operation: &str) -> StorageResult<()> {
        if self.generating {
            return Err(StorageError::Rejected(PartyError::PreconditionFailed(
                format!("cannot {operation} while candidates are being generated"),
            )));
        }
        Ok(())
    }
}

/// In-memory party store.
#[derive(Debug, Default)]
pub struct InMemoryPartyStore {
    parties: RwLock<HashMap<PartyId, Arc<Mutex<PartyRecord>>>>,
    slugs: RwLock<HashMap<String, PartyId>>,
}

impl InMemoryPartyStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(&self, party_id: &PartyId) -> StorageResult<Arc<Mutex<PartyRecord>>> {
        self.parties
            .read()
            .await
            .get(party_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("party {party_id} not found")))
    }

    /// Number of stored parties.
    pub async fn party_count(&self) -> usize {
        self.parties.read().await.len()
    }
}

#[async_trait]
impl PartyStore for InMemoryPartyStore {
    async fn create_party(&self, party: Party, host: Member) -> StorageResult<()> {
        if host.party_id != party.id || !host.is_host() || host.actor != party.created_by {
            return Err(StorageError::Rejected(PartyError::Validation(
                "host membership does not match party".into(),
            )));
        }

        let mut parties = self.parties.write().await;
        let mut slugs = self.slugs.write().await;

        if parties.contains_key(&party.id) {
            return Err(StorageError::Conflict(format!(
                "party {} already exists",
                party.id
            )));
        }
        if slugs.contains_key(&party.slug) {
            return Err(StorageError::Conflict(format!(
                "slug {} already in use",
                party.slug
            )));
        }

        slugs.insert(party.slug.clone(), party.id.clone());
        parties.insert(
            party.id.clone(),
            Arc::new(Mutex::new(PartyRecord {
                party,
                members: vec![host],
                candidates: Vec::new(),
                swipes: Vec::new(),
                swipe_keys: HashSet::new(),
                generating: false,
            })),
        );
        Ok(())
    }

    async fn get_party(&self, party_id: &PartyId) -> StorageResult<Option<Party>> {
        let record = self.parties.read().await.get(party_id).cloned();
        match record {
            Some(record) => Ok(Some(record.lock().await.party.clone())),
            None => Ok(None),
        }
    }

    async fn find_party_by_slug(&self, slug: &str) -> StorageResult<Option<Party>> {
        let party_id = self.slugs.read().await.get(slug).cloned();
        match party_id {
            Some(id) => self.get_party(&id).await,
            None => Ok(None),
        }
    }

    async fn transition_status(
        &self,
        party_id: &PartyId,
        transition: StatusTransition,
    ) -> StorageResult<Party> {
        let record = self.record(party_id).await?;
        let mut guard = record.lock().await;

        let found = guard.party.status;
        if found != transition.from {
            return Err(StorageError::StaleStatus {
                expected: transition.from,
                found,
            });
        }
        if !transition.from.can_transition_to(transition.to) {
            return Err(StorageError::Rejected(PartyError::PreconditionFailed(
                format!("{} cannot move to {}", transition.from, transition.to),
            )));
        }
        if transition.to == PartyStatus::Swiping && !guard.generating {
            return Err(StorageError::Rejected(PartyError::PreconditionFailed(
                "candidate generation was not claimed".into(),
            )));
        }
        transition.readiness.check(&guard.party, &guard.members)?;

        if transition.to == PartyStatus::Swiping {
            if transition.candidates.is_empty() {
                return Err(StorageError::Rejected(PartyError::Validation(
                    "swiping needs a non-empty candidate set".into(),
                )));
            }
            let mut seen = HashSet::new();
            if let Some(bad) = transition
                .candidates
                .iter()
                .find(|c| &c.party_id != party_id || !seen.insert(c.candidate_id.clone()))
            {
                return Err(StorageError::Rejected(PartyError::Validation(format!(
                    "candidate {} is duplicated or belongs to another party",
                    bad.candidate_id
                ))));
            }
        } else if !transition.candidates.is_empty() {
            return Err(StorageError::Rejected(PartyError::Validation(
                "candidates are only assigned when swiping starts".into(),
            )));
        }

        let state = &mut *guard;
        if transition.to == PartyStatus::Swiping {
            state.party.candidate_set = transition
                .candidates
                .iter()
                .map(|c| c.candidate_id.clone())
                .collect();
            state.candidates = transition.candidates;
            state.generating = false;
        }
        if let Some(aggregated) = transition.aggregated_preferences {
            state.party.aggregated_preferences = aggregated;
        }
        state.party.status = transition.to;
        state.party.updated_at = Utc::now();

        debug!(party = %party_id, from = %transition.from, to = %transition.to, "status committed");
        Ok(state.party.clone())
    }

    async fn claim_generation(
        &self,
        party_id: &PartyId,
        readiness: Readiness,
    ) -> StorageResult<Vec<Member>> {
        let record = self.record(party_id).await?;
        let mut guard = record.lock().await;

        let found = guard.party.status;
        if found != PartyStatus::CollectingPreferences {
            return Err(StorageError::StaleStatus {
                expected: PartyStatus::CollectingPreferences,
                found,
            });
        }
        if guard.generating {
            return Err(StorageError::Rejected(PartyError::PreconditionFailed(
                "candidate generation is already in progress".into(),
            )));
        }
        readiness.check(&guard.party, &guard.members)?;

        guard.generating = true;
        debug!(party = %party_id, "generation claimed");
        Ok(guard.members.clone())
    }

    async fn release_generation(&self, party_id: &PartyId) -> StorageResult<()> {
        let record = self.record(party_id).await?;
        let mut guard = record.lock().await;
        if guard.generating {
            guard.generating = false;
            debug!(party = %party_id, "generation claim released");
        }
        Ok(())
    }
}

#[async_trait]
impl MemberStore for InMemoryPartyStore {
    async fn add_member(&self, member: Member) -> StorageResult<Member> {
        let record = self.record(&member.party_id).await?;
        let mut guard = record.lock().await;

        check_admission(&guard.party, &guard.members, &member.actor)?;
        guard.ensure_not_generating("join")?;
        if member.is_host() {
            return Err(StorageError::Rejected(PartyError::Validation(
                "a party has exactly one host".into(),
            )));
        }

        guard.members.push(member.clone());
        Ok(member)
    }

    async fn get_member(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
    ) -> StorageResult<Option<Member>> {
        let record = self.record(party_id).await?;
        let guard = record.lock().await;
        Ok(guard.members.iter().find(|m| &m.actor == actor).cloned())
    }

    async fn list_members(&self, party_id: &PartyId) -> StorageResult<Vec<Member>> {
        let record = self.record(party_id).await?;
        let guard = record.lock().await;
        Ok(guard.members.clone())
    }

    async fn submit_preferences(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        preferences: Preferences,
        hints: Preferences,
        required_status: PartyStatus,
    ) -> StorageResult<Member> {
        let record = self.record(party_id).await?;
        let mut guard = record.lock().await;

        guard
            .party
            .ensure_status(required_status, "submit preferences")?;
        guard.ensure_not_generating("submit preferences")?;
        let idx = guard.member_index(actor)?;
        let member = &mut guard.members[idx];
        if !member.is_active() {
            return Err(StorageError::Rejected(PartyError::PreconditionFailed(
                format!("{actor} is no longer an active member"),
            )));
        }

        member.submit_preferences(preferences, hints);
        Ok(member.clone())
    }

    async fn depart_member(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        status: MemberStatus,
    ) -> StorageResult<Member> {
        let record = self.record(party_id).await?;
        let mut guard = record.lock().await;

        let idx = guard.member_index(actor)?;
        guard.ensure_not_generating("leave")?;
        let member = &mut guard.members[idx];
        member.depart(status)?;
        Ok(member.clone())
    }
}

#[async_trait]
impl CandidateStore for InMemoryPartyStore {
    async fn list_candidates(&self, party_id: &PartyId) -> StorageResult<Vec<Candidate>> {
        let record = self.record(party_id).await?;
        let guard = record.lock().await;
        Ok(guard.candidates.clone())
    }
}

#[async_trait]
impl SwipeStore for InMemoryPartyStore {
    async fn commit_swipe(&self, command: SwipeCommand) -> StorageResult<SwipeCommit> {
        let record = self.record(&command.party_id).await?;
        let mut guard = record.lock().await;

        let member_idx = guard.member_index(&command.actor)?;
        let key = (command.actor.clone(), command.candidate_id.clone());
        if guard.swipe_keys.contains(&key) {
            return Err(StorageError::Conflict(format!(
                "{DUPLICATE_SWIPE}: {} already swiped {}",
                command.actor, command.candidate_id
            )));
        }
        if !guard.members[member_idx].is_active() {
            return Err(StorageError::Rejected(PartyError::PreconditionFailed(
                format!("{} is no longer an active member", command.actor),
            )));
        }

        guard.party.ensure_status(PartyStatus::Swiping, "swipe")?;
        let candidate_idx = guard
            .candidates
            .iter()
            .position(|c| c.candidate_id == command.candidate_id)
            .ok_or_else(|| {
                PartyError::Validation(format!(
                    "{} is not in this party's candidate set",
                    command.candidate_id
                ))
            })?;

        // Stage every effect on copies; nothing is written until all succeed.
        let candidate_count = guard.candidates.len();
        let mut member = guard.members[member_idx].clone();
        let member_completed = member.record_swipe(candidate_count)?;
        let mut candidate = guard.candidates[candidate_idx].clone();
        let update = rating::apply_swipe(&mut candidate, command.direction);
        let swipe = SwipeRecord::new(
            command.party_id,
            command.actor,
            command.candidate_id,
            command.direction,
            update.delta,
        );

        let state = &mut *guard;
        state.swipe_keys.insert(key);
        state.swipes.push(swipe.clone());
        state.candidates[candidate_idx] = candidate.clone();
        state.members[member_idx] = member.clone();

        Ok(SwipeCommit {
            record: swipe,
            rating: update,
            candidate,
            member,
            member_completed,
        })
    }

    async fn list_swipes(&self, party_id: &PartyId) -> StorageResult<Vec<SwipeRecord>> {
        let record = self.record(party_id).await?;
        let guard = record.lock().await;
        Ok(guard.swipes.clone())
    }
}
