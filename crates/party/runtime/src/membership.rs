//! Membership Manager - who is in a party and what they submitted
//!
//! Handles creating parties, joining, preference submission, leaving and
//! removal. Capacity, duplicates and status windows are enforced by the store
//! inside the same atomic unit as the write.

use crate::completion::CompletionDetector;
use crate::events::PartyEventBus;
use party_storage::PartyStorage;
use party_types::{
    ActorId, Member, MemberStatus, Party, PartyError, PartyEvent, PartyId, PartyResult,
    PartySettings, PartyStatus, Preferences,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Manages membership lifecycle
#[derive(Clone)]
pub struct MembershipManager {
    storage: Arc<dyn PartyStorage>,
    events: PartyEventBus,
    completion: CompletionDetector,
    hard_max_members: u32,
}

impl MembershipManager {
    pub fn new(
        storage: Arc<dyn PartyStorage>,
        events: PartyEventBus,
        completion: CompletionDetector,
        hard_max_members: u32,
    ) -> Self {
        Self {
            storage,
            events,
            completion,
            hard_max_members,
        }
    }

    async fn load_party(&self, party_id: &PartyId) -> PartyResult<Party> {
        self.storage
            .get_party(party_id)
            .await?
            .ok_or_else(|| PartyError::NotFound(format!("party {party_id} not found")))
    }

    /// Create a party with `actor` as its host.
    pub async fn create_party(
        &self,
        actor: ActorId,
        settings: PartySettings,
    ) -> PartyResult<(Party, Member)> {
        settings.validate(self.hard_max_members)?;

        let party = Party::new(actor.clone(), settings);
        let host = Member::host(party.id.clone(), actor.clone());
        self.storage
            .create_party(party.clone(), host.clone())
            .await?;

        info!(
            party = %party.id,
            slug = %party.slug,
            host = %actor,
            min = party.min_members,
            max = party.max_members,
            "Party created"
        );
        self.events.publish(
            &party.id,
            PartyEvent::MemberJoined {
                member: host.clone(),
            },
        );
        Ok((party, host))
    }

    /// Join an open party.
    pub async fn join_party(&self, party_id: &PartyId, actor: ActorId) -> PartyResult<Member> {
        let member = self
            .storage
            .add_member(Member::joiner(party_id.clone(), actor.clone()))
            .await?;

        info!(party = %party_id, actor = %actor, "Member joined party");
        self.events.publish(
            party_id,
            PartyEvent::MemberJoined {
                member: member.clone(),
            },
        );
        Ok(member)
    }

    /// Submit (or replace) the actor's preferences during collection.
    pub async fn submit_preferences(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        preferences: Preferences,
        hints: Preferences,
    ) -> PartyResult<Member> {
        if preferences.is_empty() {
            return Err(PartyError::Validation(
                "preference submission is empty".into(),
            ));
        }

        let member = self
            .storage
            .submit_preferences(
                party_id,
                actor,
                preferences,
                hints,
                PartyStatus::CollectingPreferences,
            )
            .await?;

        info!(
            party = %party_id,
            actor = %actor,
            keys = member.preferences.len(),
            "Preferences submitted"
        );
        self.events.publish(
            party_id,
            PartyEvent::MemberUpdated {
                member: member.clone(),
            },
        );
        Ok(member)
    }

    /// Leave voluntarily. The host cannot leave their own party.
    pub async fn leave_party(&self, party_id: &PartyId, actor: &ActorId) -> PartyResult<Member> {
        let party = self.load_party(party_id).await?;
        if party.is_host(actor) {
            return Err(PartyError::PreconditionFailed(
                "the host cannot leave their own party".into(),
            ));
        }

        let member = self
            .storage
            .depart_member(party_id, actor, MemberStatus::Left)
            .await?;

        info!(party = %party_id, actor = %actor, "Member left party");
        self.after_departure(&party, member).await
    }

    /// Remove another member (host only).
    pub async fn remove_member(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        target: &ActorId,
    ) -> PartyResult<Member> {
        let party = self.load_party(party_id).await?;
        party.ensure_host(actor, "remove members")?;
        if party.is_host(target) {
            return Err(PartyError::Validation("the host cannot remove themselves".into()));
        }

        let member = self
            .storage
            .depart_member(party_id, target, MemberStatus::Removed)
            .await?;

        warn!(party = %party_id, actor = %target, "Member removed by host");
        self.after_departure(&party, member).await
    }

    /// A departure can leave every remaining member finished.
    async fn after_departure(&self, party: &Party, member: Member) -> PartyResult<Member> {
        self.events.publish(
            &party.id,
            PartyEvent::MemberUpdated {
                member: member.clone(),
            },
        );
        // The departure is already durable; a failed check is retried via
        // `PartyService::check_completion`.
        if let Err(err) = self.completion.check(&party.id).await {
            warn!(party = %party.id, error = %err, "completion check failed");
        }
        Ok(member)
    }

    pub async fn get_member(&self, party_id: &PartyId, actor: &ActorId) -> PartyResult<Member> {
        self.storage
            .get_member(party_id, actor)
            .await?
            .ok_or_else(|| {
                PartyError::NotFound(format!("{actor} is not a member of party {party_id}"))
            })
    }

    pub async fn list_members(&self, party_id: &PartyId) -> PartyResult<Vec<Member>> {
        Ok(self.storage.list_members(party_id).await?)
    }
}
