//! PartyService - the operation surface
//!
//! Composes the membership manager, state machine, swipe ledger and
//! completion detector over one store and one event bus. Transport layers
//! call into this and nothing else.

use crate::completion::{CompletionCheck, CompletionDetector};
use crate::config::PartyConfig;
use crate::events::PartyEventBus;
use crate::generator::{CandidateGenerator, GenerationRequest};
use crate::ledger::SwipeLedger;
use crate::membership::MembershipManager;
use crate::rankings::rank_candidates;
use crate::state_machine::PartyStateMachine;
use party_storage::{InMemoryPartyStore, PartyStorage};
use party_types::{
    aggregate_hints, aggregate_preferences, ActorId, Candidate, CandidateId, Member, Party,
    PartyError, PartyEventEnvelope, PartyId, PartyResult, PartySettings, PartyStatus,
    Preferences, SwipeDirection, SwipeRecord,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Entry point for every party operation
#[derive(Clone)]
pub struct PartyService {
    storage: Arc<dyn PartyStorage>,
    generator: Arc<dyn CandidateGenerator>,
    events: PartyEventBus,
    config: PartyConfig,
    membership: MembershipManager,
    state_machine: PartyStateMachine,
    ledger: SwipeLedger,
    completion: CompletionDetector,
}

impl PartyService {
    pub fn new(
        storage: Arc<dyn PartyStorage>,
        generator: Arc<dyn CandidateGenerator>,
        config: PartyConfig,
    ) -> Self {
        let events = PartyEventBus::new(config.events.channel_capacity);
        let completion = CompletionDetector::new(Arc::clone(&storage), events.clone());
        let membership = MembershipManager::new(
            Arc::clone(&storage),
            events.clone(),
            completion.clone(),
            config.limits.hard_max_members,
        );
        let state_machine = PartyStateMachine::new(Arc::clone(&storage), events.clone());
        let ledger = SwipeLedger::new(Arc::clone(&storage), events.clone(), completion.clone());

        Self {
            storage,
            generator,
            events,
            config,
            membership,
            state_machine,
            ledger,
            completion,
        }
    }

    /// Service over a fresh in-memory store.
    pub fn in_memory(generator: Arc<dyn CandidateGenerator>, config: PartyConfig) -> Self {
        Self::new(Arc::new(InMemoryPartyStore::new()), generator, config)
    }

    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PartyEventEnvelope> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &PartyEventBus {
        &self.events
    }

    // --- Membership ---

    /// Create a party with the configured default bounds.
    pub async fn create_party(&self, actor: ActorId, name: Option<String>) -> PartyResult<Party> {
        let settings = self.config.default_settings(name);
        self.create_party_with(actor, settings).await
    }

    pub async fn create_party_with(
        &self,
        actor: ActorId,
        settings: PartySettings,
    ) -> PartyResult<Party> {
        let (party, _host) = self.membership.create_party(actor, settings).await?;
        Ok(party)
    }

    pub async fn join_party(&self, party_id: &PartyId, actor: ActorId) -> PartyResult<Member> {
        self.membership.join_party(party_id, actor).await
    }

    pub async fn join_party_by_slug(&self, slug: &str, actor: ActorId) -> PartyResult<Member> {
        let party = self.get_party_by_slug(slug).await?;
        self.membership.join_party(&party.id, actor).await
    }

    pub async fn submit_preferences(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        preferences: Preferences,
        hints: Option<Preferences>,
    ) -> PartyResult<Member> {
        self.membership
            .submit_preferences(party_id, actor, preferences, hints.unwrap_or_default())
            .await
    }

    /// Submit untyped payloads; they are normalized before anything else sees them.
    pub async fn submit_preferences_json(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        preferences: &serde_json::Value,
        hints: Option<&serde_json::Value>,
    ) -> PartyResult<Member> {
        let preferences = Preferences::from_json(preferences)?;
        let hints = hints.map(Preferences::from_json).transpose()?;
        self.submit_preferences(party_id, actor, preferences, hints)
            .await
    }

    pub async fn leave_party(&self, party_id: &PartyId, actor: &ActorId) -> PartyResult<Member> {
        self.membership.leave_party(party_id, actor).await
    }

    pub async fn remove_member(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        target: &ActorId,
    ) -> PartyResult<Member> {
        self.membership.remove_member(party_id, actor, target).await
    }

    // --- Lifecycle ---

    pub async fn start_collecting(&self, party_id: &PartyId, actor: &ActorId) -> PartyResult<Party> {
        self.state_machine.start_collecting(party_id, actor).await
    }

    /// Aggregate preferences, generate candidates once, and open swiping.
    ///
    /// The generator runs under the party's generation claim: concurrent
    /// callers are refused before reaching it, and no member can join,
    /// leave or resubmit until the claim is consumed or released.
    pub async fn start_swiping(&self, party_id: &PartyId, actor: &ActorId) -> PartyResult<Party> {
        let (_party, members) = self.state_machine.claim_generation(party_id, actor).await?;
        let claim = GenerationClaim::new(self.state_machine.clone(), party_id.clone());

        match self.generate_and_open(party_id, actor, &members).await {
            Ok(party) => {
                claim.consumed();
                Ok(party)
            }
            Err(err) => {
                claim.release().await;
                Err(err)
            }
        }
    }

    async fn generate_and_open(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        members: &[Member],
    ) -> PartyResult<Party> {
        let aggregated = aggregate_preferences(members);
        if aggregated.is_empty() {
            return Err(PartyError::PreconditionFailed(
                "no submitted preferences to aggregate".into(),
            ));
        }
        let request = GenerationRequest {
            party_id: party_id.clone(),
            preferences: aggregated.clone(),
            hints: aggregate_hints(members),
            limit: self.config.generation.candidate_count,
        };

        let mut seeds = self.generator.generate(&request).await?;
        seeds.truncate(self.config.generation.candidate_count);
        info!(party = %party_id, seeds = seeds.len(), "Candidates generated");

        self.state_machine
            .start_swiping(party_id, actor, aggregated, seeds)
            .await
    }

    // --- Swiping ---

    pub async fn record_swipe(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        candidate_id: &CandidateId,
        direction: SwipeDirection,
    ) -> PartyResult<SwipeRecord> {
        self.ledger
            .record_swipe(party_id, actor, candidate_id, direction)
            .await
    }

    pub async fn record_swipe_str(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        candidate_id: &CandidateId,
        direction: &str,
    ) -> PartyResult<SwipeRecord> {
        self.ledger
            .record_swipe_str(party_id, actor, candidate_id, direction)
            .await
    }

    /// Re-run the completion detector, e.g. after a failed check.
    pub async fn check_completion(&self, party_id: &PartyId) -> PartyResult<CompletionCheck> {
        self.completion.check(party_id).await
    }

    // --- Reads ---

    pub async fn get_party(&self, party_id: &PartyId) -> PartyResult<Party> {
        self.state_machine.load_party(party_id).await
    }

    pub async fn get_party_by_slug(&self, slug: &str) -> PartyResult<Party> {
        self.storage
            .find_party_by_slug(slug)
            .await?
            .ok_or_else(|| PartyError::NotFound(format!("no party with slug {slug}")))
    }

    pub async fn get_member(&self, party_id: &PartyId, actor: &ActorId) -> PartyResult<Member> {
        self.membership.get_member(party_id, actor).await
    }

    pub async fn list_members(&self, party_id: &PartyId) -> PartyResult<Vec<Member>> {
        self.membership.list_members(party_id).await
    }

    pub async fn list_swipes(&self, party_id: &PartyId) -> PartyResult<Vec<SwipeRecord>> {
        self.ledger.list_swipes(party_id).await
    }

    /// Candidates ordered by rating, highest first. Empty before swiping.
    pub async fn get_rankings(&self, party_id: &PartyId) -> PartyResult<Vec<Candidate>> {
        let candidates = self.storage.list_candidates(party_id).await?;
        Ok(rank_candidates(candidates))
    }

    /// Candidates `actor` has not swiped yet, in presentation order.
    pub async fn pending_candidates(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
    ) -> PartyResult<Vec<Candidate>> {
        let member = self.get_member(party_id, actor).await?;
        if !member.is_active() {
            return Ok(Vec::new());
        }
        let swiped: HashSet<CandidateId> = self
            .storage
            .list_swipes(party_id)
            .await?
            .into_iter()
            .filter(|s| &s.actor == actor)
            .map(|s| s.candidate_id)
            .collect();
        Ok(self
            .storage
            .list_candidates(party_id)
            .await?
            .into_iter()
            .filter(|c| !swiped.contains(&c.candidate_id))
            .collect())
    }

    /// Whether the party has latched `completed`.
    pub async fn is_completed(&self, party_id: &PartyId) -> PartyResult<bool> {
        Ok(self.get_party(party_id).await?.status == PartyStatus::Completed)
    }
}

/// A held generation claim.
///
/// Dropped without being settled (the caller's future was cancelled while
/// the generator ran), it releases the claim on the current runtime.
struct GenerationClaim {
    state_machine: PartyStateMachine,
    party_id: PartyId,
    settled: bool,
}

impl GenerationClaim {
    fn new(state_machine: PartyStateMachine, party_id: PartyId) -> Self {
        Self {
            state_machine,
            party_id,
            settled: false,
        }
    }

    /// The move into `swiping` committed and cleared the claim.
    fn consumed(mut self) {
        self.settled = true;
    }

    async fn release(mut self) {
        self.settled = true;
        if let Err(err) = self.state_machine.release_generation(&self.party_id).await {
            warn!(party = %self.party_id, error = %err, "failed to release generation claim");
        }
    }
}

impl Drop for GenerationClaim {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(party = %self.party_id, "generation claim dropped outside a runtime");
            return;
        };
        let state_machine = self.state_machine.clone();
        let party_id = self.party_id.clone();
        handle.spawn(async move {
            if let Err(err) = state_machine.release_generation(&party_id).await {
                warn!(party = %party_id, error = %err, "failed to release generation claim");
            }
        });
    }
}
