//! Party Runtime
//!
//! This crate runs parties: small groups who swipe on a shared candidate set
//! and converge on one consensus ranking.
//!
//! # Architecture
//!
//! The [`PartyService`] is the main entry point. It composes specialized
//! components over one [`party_storage::PartyStorage`] and one event bus:
//!
//! - [`MembershipManager`] - create, join, submit preferences, leave, remove
//! - [`PartyStateMachine`] - host-gated, strictly forward status transitions
//! - [`SwipeLedger`] - exactly-once votes driving the shared-pool rating
//! - [`CompletionDetector`] - sole writer of `swiping → completed`
//! - [`PartyEventBus`] - change notifications for an external push layer
//! - [`CandidateGenerator`] - the seam to the external recommender
//!
//! # Key Invariants
//!
//! 1. Status only moves one step forward; `completed` is terminal
//! 2. At most one swipe per (party, actor, candidate)
//! 3. A swipe's record, rating update and progress update commit together
//! 4. Completion is latched exactly once
//! 5. A rejected operation changes nothing
//!
//! # Example
//!
//! ```rust
//! use party_runtime::{CatalogGenerator, PartyConfig, PartyService};
//! use party_types::{ActorId, PartySettings, PartyStatus};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), party_types::PartyError> {
//! let service = PartyService::in_memory(
//!     Arc::new(CatalogGenerator::builtin()),
//!     PartyConfig::default(),
//! );
//! let host = ActorId::new("host");
//! let party = service
//!     .create_party_with(host.clone(), PartySettings::new(1, 4))
//!     .await?;
//! assert_eq!(party.status, PartyStatus::Waiting);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod completion;
pub mod config;
pub mod events;
pub mod generator;
pub mod ledger;
pub mod membership;
pub mod rankings;
pub mod service;
pub mod state_machine;

// Re-export main types for convenience
pub use completion::{CompletionCheck, CompletionDetector};
pub use config::{EventsConfig, GenerationConfig, LimitsConfig, LoggingConfig, PartyConfig};
pub use events::PartyEventBus;
pub use generator::{
    CandidateGenerator, CatalogGenerator, CatalogItem, GenerationRequest, GeneratorError,
};
pub use ledger::SwipeLedger;
pub use membership::MembershipManager;
pub use rankings::rank_candidates;
pub use service::PartyService;
pub use state_machine::PartyStateMachine;
