//! Completion Detector - latches a party into `completed`
//!
//! The only writer of the `swiping → completed` move. The move is a
//! compare-and-set guarded on the current status and on every active member
//! having finished, so two members finishing at the same instant still
//! produce exactly one transition.

use crate::events::PartyEventBus;
use party_storage::{PartyStorage, StatusTransition, StorageError};
use party_types::{PartyError, PartyEvent, PartyId, PartyResult, PartyStatus, Readiness};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one detector run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionCheck {
    /// This run performed the transition
    Completed,
    /// Some active member is still swiping
    StillSwiping,
    /// The party is not in `swiping` (already completed, or not yet started)
    NotApplicable,
}

/// Detects and latches party completion
#[derive(Clone)]
pub struct CompletionDetector {
    storage: Arc<dyn PartyStorage>,
    events: PartyEventBus,
}

impl CompletionDetector {
    pub fn new(storage: Arc<dyn PartyStorage>, events: PartyEventBus) -> Self {
        Self { storage, events }
    }

    /// Promote the party if every active member has finished swiping.
    pub async fn check(&self, party_id: &PartyId) -> PartyResult<CompletionCheck> {
        let transition = StatusTransition::new(PartyStatus::Swiping, PartyStatus::Completed)
            .when(Readiness::AllCompletedSwiping);

        match self.storage.transition_status(party_id, transition).await {
            Ok(_) => {
                info!(party = %party_id, "all active members finished; party completed");
                self.events.publish(
                    party_id,
                    PartyEvent::PartyStatusChanged {
                        from: PartyStatus::Swiping,
                        to: PartyStatus::Completed,
                        actor: None,
                    },
                );
                Ok(CompletionCheck::Completed)
            }
            Err(StorageError::StaleStatus { found, .. }) => {
                debug!(party = %party_id, status = %found, "completion already latched or not applicable");
                Ok(CompletionCheck::NotApplicable)
            }
            Err(StorageError::Rejected(PartyError::PreconditionFailed(reason))) => {
                debug!(party = %party_id, %reason, "party still swiping");
                Ok(CompletionCheck::StillSwiping)
            }
            Err(err) => Err(err.into()),
        }
    }
}
