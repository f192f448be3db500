use crate::model::{StatusTransition, SwipeCommand, SwipeCommit};
use crate::StorageResult;
use async_trait::async_trait;
use party_types::{
    ActorId, Candidate, Member, MemberStatus, Party, PartyId, PartyStatus, Preferences,
    Readiness, SwipeRecord,
};

/// Storage interface for party records.
#[async_trait]
pub trait PartyStore: Send + Sync {
    /// Insert a new party together with its host's membership.
    async fn create_party(&self, party: Party, host: Member) -> StorageResult<()>;

    async fn get_party(&self, party_id: &PartyId) -> StorageResult<Option<Party>>;

    async fn find_party_by_slug(&self, slug: &str) -> StorageResult<Option<Party>>;

    /// Compare-and-set the party status. Returns the party after the move.
    async fn transition_status(
        &self,
        party_id: &PartyId,
        transition: StatusTransition,
    ) -> StorageResult<Party>;

    /// Take the exclusive right to generate candidates for a party in
    /// `collecting_preferences`, provided `readiness` holds.
    ///
    /// While the claim is held, joins, departures and preference writes are
    /// refused, and only the holder may move the party into `swiping`.
    /// Returns the members the generator input is built from.
    async fn claim_generation(
        &self,
        party_id: &PartyId,
        readiness: Readiness,
    ) -> StorageResult<Vec<Member>>;

    /// Drop an unfinished claim, leaving the party in `collecting_preferences`.
    async fn release_generation(&self, party_id: &PartyId) -> StorageResult<()>;
}

/// Storage interface for membership records.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Admit a member, checking status, duplicates and capacity atomically.
    async fn add_member(&self, member: Member) -> StorageResult<Member>;

    async fn get_member(&self, party_id: &PartyId, actor: &ActorId)
        -> StorageResult<Option<Member>>;

    /// Members in join order, any status.
    async fn list_members(&self, party_id: &PartyId) -> StorageResult<Vec<Member>>;

    /// Replace an active member's preferences while the party is in `required_status`.
    async fn submit_preferences(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        preferences: Preferences,
        hints: Preferences,
        required_status: PartyStatus,
    ) -> StorageResult<Member>;

    /// Move an active member to `Left` or `Removed`.
    async fn depart_member(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        status: MemberStatus,
    ) -> StorageResult<Member>;
}

/// Storage interface for candidates.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Candidates in candidate-set order.
    async fn list_candidates(&self, party_id: &PartyId) -> StorageResult<Vec<Candidate>>;
}

/// Storage interface for the append-only swipe ledger.
#[async_trait]
pub trait SwipeStore: Send + Sync {
    /// Record a vote and apply all of its effects as one unit: the record,
    /// the candidate rating and counters, and the member's progress.
    async fn commit_swipe(&self, command: SwipeCommand) -> StorageResult<SwipeCommit>;

    /// Swipes in the order they were committed.
    async fn list_swipes(&self, party_id: &PartyId) -> StorageResult<Vec<SwipeRecord>>;
}

/// Unified storage bundle used by the party runtime.
pub trait PartyStorage: PartyStore + MemberStore + CandidateStore + SwipeStore + Send + Sync {}

impl<T> PartyStorage for T where
    T: PartyStore + MemberStore + CandidateStore + SwipeStore + Send + Sync
{
}
