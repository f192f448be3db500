//! Party entity store.
//!
//! This crate defines the storage contract for party state:
//! - party records and their compare-and-set status transitions
//! - membership records and per-member progress
//! - candidates with their shared-pool ratings
//! - the append-only swipe ledger
//!
//! Every mutating operation is one atomic unit. A rejected operation leaves
//! all entities unchanged.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod model;
mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryPartyStore;
pub use model::{StatusTransition, SwipeCommand, SwipeCommit};
pub use traits::{CandidateStore, MemberStore, PartyStorage, PartyStore, SwipeStore};
