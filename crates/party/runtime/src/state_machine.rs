//! Party State Machine - lifecycle transitions
//!
//! `waiting → collecting_preferences → swiping → completed`, strictly
//! forward. The first two moves are host-only and gated by readiness
//! predicates; the last belongs to the completion detector alone.

use crate::events::PartyEventBus;
use party_storage::{PartyStorage, StatusTransition};
use party_types::{
    ActorId, AggregatedPreferences, Candidate, CandidateSeed, Member, Party, PartyError,
    PartyEvent, PartyId, PartyResult, PartyStatus, Readiness,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Governs party status transitions
#[derive(Clone)]
pub struct PartyStateMachine {
    storage: Arc<dyn PartyStorage>,
    events: PartyEventBus,
}

impl PartyStateMachine {
    pub fn new(storage: Arc<dyn PartyStorage>, events: PartyEventBus) -> Self {
        Self { storage, events }
    }

    pub async fn load_party(&self, party_id: &PartyId) -> PartyResult<Party> {
        self.storage
            .get_party(party_id)
            .await?
            .ok_or_else(|| PartyError::NotFound(format!("party {party_id} not found")))
    }

    /// Host opens preference collection once enough members are in.
    pub async fn start_collecting(&self, party_id: &PartyId, actor: &ActorId) -> PartyResult<Party> {
        let party = self.load_party(party_id).await?;
        party.ensure_host(actor, "start preference collection")?;
        party.ensure_status(PartyStatus::Waiting, "start preference collection")?;

        let transition =
            StatusTransition::new(PartyStatus::Waiting, PartyStatus::CollectingPreferences)
                .when(Readiness::MinActiveMembers);
        let party = self.storage.transition_status(party_id, transition).await?;

        self.announce(&party, PartyStatus::Waiting, actor);
        Ok(party)
    }

    /// Claim candidate generation for the party.
    ///
    /// Membership and preferences stay frozen until the claim is consumed by
    /// [`Self::start_swiping`] or dropped with [`Self::release_generation`],
    /// so the returned members are exactly the ones swiping will start from.
    pub async fn claim_generation(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
    ) -> PartyResult<(Party, Vec<Member>)> {
        let party = self.load_party(party_id).await?;
        party.ensure_host(actor, "start swiping")?;
        party.ensure_status(PartyStatus::CollectingPreferences, "start swiping")?;

        let members = self
            .storage
            .claim_generation(party_id, Readiness::AllSubmittedPreferences)
            .await?;
        info!(party = %party_id, members = members.len(), "Candidate generation claimed");
        Ok((party, members))
    }

    pub async fn release_generation(&self, party_id: &PartyId) -> PartyResult<()> {
        self.storage.release_generation(party_id).await?;
        debug!(party = %party_id, "Candidate generation released");
        Ok(())
    }

    /// Host moves the party into swiping with the generated candidate set.
    pub async fn start_swiping(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        aggregated: AggregatedPreferences,
        seeds: Vec<CandidateSeed>,
    ) -> PartyResult<Party> {
        let party = self.load_party(party_id).await?;
        party.ensure_host(actor, "start swiping")?;
        party.ensure_status(PartyStatus::CollectingPreferences, "start swiping")?;

        let candidates = build_candidate_set(party_id, seeds)?;
        let count = candidates.len();
        let transition =
            StatusTransition::new(PartyStatus::CollectingPreferences, PartyStatus::Swiping)
                .when(Readiness::AllSubmittedPreferences)
                .with_candidates(aggregated, candidates);
        let party = self.storage.transition_status(party_id, transition).await?;

        info!(party = %party_id, candidates = count, "Candidate set assigned");
        self.announce(&party, PartyStatus::CollectingPreferences, actor);
        Ok(party)
    }

    fn announce(&self, party: &Party, from: PartyStatus, actor: &ActorId) {
        info!(party = %party.id, from = %from, to = %party.status, actor = %actor, "Party status changed");
        self.events.publish(
            &party.id,
            PartyEvent::PartyStatusChanged {
                from,
                to: party.status,
                actor: Some(actor.clone()),
            },
        );
    }
}

/// Validate generator output and turn it into the party's candidates.
fn build_candidate_set(party_id: &PartyId, seeds: Vec<CandidateSeed>) -> PartyResult<Vec<Candidate>> {
    if seeds.is_empty() {
        return Err(PartyError::Validation(
            "candidate generator returned no candidates".into(),
        ));
    }

    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(seeds.len());
    for seed in seeds {
        seed.validate()?;
        if !seen.insert(seed.candidate_id.clone()) {
            return Err(PartyError::Validation(format!(
                "candidate {} appears more than once",
                seed.candidate_id
            )));
        }
        candidates.push(Candidate::from_seed(party_id.clone(), seed));
    }
    Ok(candidates)
}
