//! Swipe Ledger - records each vote exactly once
//!
//! A committed swipe inserts its record, updates the candidate's rating and
//! counters, and advances the member's progress in one atomic unit. When the
//! swipe finishes the member, the completion detector runs.

use crate::completion::CompletionDetector;
use crate::events::PartyEventBus;
use party_storage::{PartyStorage, SwipeCommand};
use party_types::{
    ActorId, CandidateId, PartyError, PartyEvent, PartyId, PartyResult, SwipeDirection,
    SwipeRecord,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Records swipes and drives the rating engine
#[derive(Clone)]
pub struct SwipeLedger {
    storage: Arc<dyn PartyStorage>,
    events: PartyEventBus,
    completion: CompletionDetector,
}

impl SwipeLedger {
    pub fn new(
        storage: Arc<dyn PartyStorage>,
        events: PartyEventBus,
        completion: CompletionDetector,
    ) -> Self {
        Self {
            storage,
            events,
            completion,
        }
    }

    /// Record one vote.
    ///
    /// A second vote by the same actor on the same candidate fails with a
    /// `Conflict` for which [`PartyError::is_duplicate_swipe`] holds.
    pub async fn record_swipe(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        candidate_id: &CandidateId,
        direction: SwipeDirection,
    ) -> PartyResult<SwipeRecord> {
        let command = SwipeCommand {
            party_id: party_id.clone(),
            actor: actor.clone(),
            candidate_id: candidate_id.clone(),
            direction,
        };

        let commit = match self.storage.commit_swipe(command).await {
            Ok(commit) => commit,
            Err(err) => {
                let err = PartyError::from(err);
                if err.is_duplicate_swipe() {
                    debug!(party = %party_id, actor = %actor, candidate = %candidate_id, "duplicate swipe ignored");
                }
                return Err(err);
            }
        };

        debug!(
            party = %party_id,
            actor = %actor,
            candidate = %candidate_id,
            direction = %direction,
            delta = commit.rating.delta,
            rating = commit.rating.new_rating,
            "Swipe recorded"
        );

        self.events.publish(
            party_id,
            PartyEvent::SwipeRecorded {
                swipe: commit.record.clone(),
            },
        );
        self.events.publish(
            party_id,
            PartyEvent::CandidateRatingChanged {
                candidate: commit.candidate,
                previous_rating: commit.rating.previous_rating,
            },
        );
        self.events.publish(
            party_id,
            PartyEvent::MemberUpdated {
                member: commit.member,
            },
        );

        if commit.member_completed {
            info!(party = %party_id, actor = %actor, "Member finished swiping");
            // The swipe is already durable; a failed check is retried via
            // `PartyService::check_completion`, not by re-swiping.
            if let Err(err) = self.completion.check(party_id).await {
                warn!(party = %party_id, error = %err, "completion check failed");
            }
        }

        Ok(commit.record)
    }

    /// Same as [`Self::record_swipe`] with a wire-level direction string.
    pub async fn record_swipe_str(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        candidate_id: &CandidateId,
        direction: &str,
    ) -> PartyResult<SwipeRecord> {
        let direction: SwipeDirection = direction.parse()?;
        self.record_swipe(party_id, actor, candidate_id, direction)
            .await
    }

    pub async fn list_swipes(&self, party_id: &PartyId) -> PartyResult<Vec<SwipeRecord>> {
        Ok(self.storage.list_swipes(party_id).await?)
    }
}
