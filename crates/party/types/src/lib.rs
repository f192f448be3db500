//! Party Domain Types
//!
//! This crate defines the domain types for a party: a small group of
//! participants who independently swipe on a shared, fixed set of
//! candidates and converge on one consensus ranking.
//!
//! # Key Concepts
//!
//! - **Party**: the session. Walks `waiting → collecting_preferences →
//!   swiping → completed`, strictly forward.
//! - **Member**: one participant. Exactly one host (the creator).
//! - **Candidate**: one item in the fixed voting set, carrying a static
//!   prior (`expected_score`) and a shared-pool Elo rating.
//! - **SwipeRecord**: one actor's approve/reject vote on one candidate.
//!   At most one per `(party, actor, candidate)`.
//! - **Preferences**: a typed `key → ordered set of values` mapping,
//!   normalized at ingestion.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime dependencies. The rating
//! engine ([`rating`]) and the preference aggregator ([`aggregate`]) live
//! here as pure functions so every storage adapter applies them the same way.

#![deny(unsafe_code)]

pub mod aggregate;
mod candidate;
mod errors;
mod event;
mod guards;
mod ids;
mod member;
mod party;
mod preferences;
pub mod rating;
mod swipe;

pub use aggregate::{aggregate_hints, aggregate_preferences};
pub use candidate::*;
pub use errors::*;
pub use event::*;
pub use guards::*;
pub use ids::*;
pub use member::*;
pub use party::*;
pub use preferences::*;
pub use rating::{RatingUpdate, INITIAL_RATING, K_FACTOR};
pub use swipe::*;
