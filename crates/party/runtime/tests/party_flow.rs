//! End-to-end party flows through `PartyService`.
//!
//! Walks parties from creation to completion and checks the externally
//! observable outcomes: statuses, ratings, progress and errors.

use async_trait::async_trait;
use party_runtime::{
    CandidateGenerator, GenerationRequest, GeneratorError, PartyConfig, PartyService,
};
use party_storage::{
    CandidateStore, InMemoryPartyStore, MemberStore, PartyStore, StatusTransition, StorageError,
    StorageResult, SwipeCommand, SwipeCommit, SwipeStore,
};
use party_types::{
    aggregate_preferences, ActorId, Candidate, CandidateId, CandidateSeed, Member, MemberStatus,
    Party, PartyError, PartyEvent, PartyId, PartySettings, PartyStatus, Preferences, Readiness,
    SwipeDirection, SwipeRecord,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns the same seeds for every party.
struct FixedGenerator {
    seeds: Vec<CandidateSeed>,
}

#[async_trait]
impl CandidateGenerator for FixedGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<Vec<CandidateSeed>, GeneratorError> {
        Ok(self.seeds.clone())
    }
}

struct DownGenerator;

#[async_trait]
impl CandidateGenerator for DownGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<Vec<CandidateSeed>, GeneratorError> {
        Err(GeneratorError::Unavailable("recommender offline".into()))
    }
}

/// Parks inside `generate` until released, so tests can act mid-generation.
struct GatedGenerator {
    seeds: Vec<CandidateSeed>,
    entered: Arc<Notify>,
    release: Arc<Notify>,
    calls: AtomicUsize,
}

#[async_trait]
impl CandidateGenerator for GatedGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<Vec<CandidateSeed>, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.seeds.clone())
    }
}

/// In-memory store whose move into `completed` always fails.
struct CompletionDownStore {
    inner: InMemoryPartyStore,
}

#[async_trait]
impl PartyStore for CompletionDownStore {
    async fn create_party(&self, party: Party, host: Member) -> StorageResult<()> {
        self.inner.create_party(party, host).await
    }

    async fn get_party(&self, party_id: &PartyId) -> StorageResult<Option<Party>> {
        self.inner.get_party(party_id).await
    }

    async fn find_party_by_slug(&self, slug: &str) -> StorageResult<Option<Party>> {
        self.inner.find_party_by_slug(slug).await
    }

    async fn transition_status(
        &self,
        party_id: &PartyId,
        transition: StatusTransition,
    ) -> StorageResult<Party> {
        if transition.to == PartyStatus::Completed {
            return Err(StorageError::Backend("write timed out".into()));
        }
        self.inner.transition_status(party_id, transition).await
    }

    async fn claim_generation(
        &self,
        party_id: &PartyId,
        readiness: Readiness,
    ) -> StorageResult<Vec<Member>> {
        self.inner.claim_generation(party_id, readiness).await
    }

    async fn release_generation(&self, party_id: &PartyId) -> StorageResult<()> {
        self.inner.release_generation(party_id).await
    }
}

#[async_trait]
impl MemberStore for CompletionDownStore {
    async fn add_member(&self, member: Member) -> StorageResult<Member> {
        self.inner.add_member(member).await
    }

    async fn get_member(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
    ) -> StorageResult<Option<Member>> {
        self.inner.get_member(party_id, actor).await
    }

    async fn list_members(&self, party_id: &PartyId) -> StorageResult<Vec<Member>> {
        self.inner.list_members(party_id).await
    }

    async fn submit_preferences(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        preferences: Preferences,
        hints: Preferences,
        required_status: PartyStatus,
    ) -> StorageResult<Member> {
        self.inner
            .submit_preferences(party_id, actor, preferences, hints, required_status)
            .await
    }

    async fn depart_member(
        &self,
        party_id: &PartyId,
        actor: &ActorId,
        status: MemberStatus,
    ) -> StorageResult<Member> {
        self.inner.depart_member(party_id, actor, status).await
    }
}

#[async_trait]
impl CandidateStore for CompletionDownStore {
    async fn list_candidates(&self, party_id: &PartyId) -> StorageResult<Vec<Candidate>> {
        self.inner.list_candidates(party_id).await
    }
}

#[async_trait]
impl SwipeStore for CompletionDownStore {
    async fn commit_swipe(&self, command: SwipeCommand) -> StorageResult<SwipeCommit> {
        self.inner.commit_swipe(command).await
    }

    async fn list_swipes(&self, party_id: &PartyId) -> StorageResult<Vec<SwipeRecord>> {
        self.inner.list_swipes(party_id).await
    }
}

fn service_with(seeds: &[(&str, f64)]) -> PartyService {
    let seeds = seeds
        .iter()
        .map(|(id, prior)| CandidateSeed::new(*id, id.to_uppercase(), *prior))
        .collect();
    PartyService::in_memory(Arc::new(FixedGenerator { seeds }), PartyConfig::default())
}

fn actor(name: &str) -> ActorId {
    ActorId::new(name)
}

fn cid(id: &str) -> CandidateId {
    CandidateId::new(id)
}

fn genres(value: &str) -> Preferences {
    Preferences::new().with("genres", [value])
}

/// Create a party, admit `joiners`, collect one preference each and start swiping.
async fn swiping_party(service: &PartyService, joiners: &[&str]) -> PartyId {
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(1, 8))
        .await
        .unwrap();
    for name in joiners {
        service.join_party(&party.id, actor(name)).await.unwrap();
    }
    service.start_collecting(&party.id, &host).await.unwrap();
    service
        .submit_preferences(&party.id, &host, genres("drama"), None)
        .await
        .unwrap();
    for name in joiners {
        service
            .submit_preferences(&party.id, &actor(name), genres("comedy"), None)
            .await
            .unwrap();
    }
    service.start_swiping(&party.id, &host).await.unwrap();
    party.id
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preferences_are_aggregated_alphabetically() {
    let service = service_with(&[("m1", 0.5)]);
    let party_id = swiping_party(&service, &["alice"]).await;

    let party = service.get_party(&party_id).await.unwrap();
    assert_eq!(party.status, PartyStatus::Swiping);
    assert_eq!(
        party.aggregated_preferences.values("genres"),
        vec!["comedy", "drama"]
    );
    assert_eq!(party.candidate_set, vec![cid("m1")]);
}

#[tokio::test]
async fn approvals_raise_the_shared_rating() {
    let service = service_with(&[("m1", 0.5), ("m2", 0.5)]);
    let party_id = swiping_party(&service, &["alice"]).await;

    let first = service
        .record_swipe(&party_id, &actor("host"), &cid("m1"), SwipeDirection::Approve)
        .await
        .unwrap();
    assert_eq!(first.elo_delta, 16.0);
    service
        .record_swipe(&party_id, &actor("alice"), &cid("m1"), SwipeDirection::Approve)
        .await
        .unwrap();

    let rankings = service.get_rankings(&party_id).await.unwrap();
    assert_eq!(rankings[0].candidate_id, cid("m1"));
    assert_eq!(rankings[0].elo_rating, 1232.0);
    assert_eq!(rankings[0].right_swipes, 2);
    assert_eq!(rankings[1].elo_rating, 1200.0);
}

#[tokio::test]
async fn rejection_of_a_favourite_costs_more() {
    let service = service_with(&[("m1", 0.8)]);
    let party_id = swiping_party(&service, &["alice"]).await;

    let swipe = service
        .record_swipe_str(&party_id, &actor("alice"), &cid("m1"), "reject")
        .await
        .unwrap();
    assert!((swipe.elo_delta + 25.6).abs() < 1e-9);

    let rankings = service.get_rankings(&party_id).await.unwrap();
    assert!((rankings[0].elo_rating - 1174.4).abs() < 1e-9);
    assert_eq!(rankings[0].left_swipes, 1);
}

#[tokio::test]
async fn party_completes_when_last_member_finishes() {
    let service = service_with(&[("m1", 0.5)]);
    let party_id = swiping_party(&service, &["alice"]).await;

    service
        .record_swipe(&party_id, &actor("host"), &cid("m1"), SwipeDirection::Approve)
        .await
        .unwrap();
    let host = service.get_member(&party_id, &actor("host")).await.unwrap();
    assert_eq!(host.swipes_completed, 1);
    assert!(host.has_completed_swiping);
    assert_eq!(
        service.get_party(&party_id).await.unwrap().status,
        PartyStatus::Swiping
    );

    service
        .record_swipe(&party_id, &actor("alice"), &cid("m1"), SwipeDirection::Reject)
        .await
        .unwrap();
    assert!(service.is_completed(&party_id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Swipe ledger
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_swipe_is_rejected_without_effect() {
    let service = service_with(&[("m1", 0.5), ("m2", 0.5)]);
    let party_id = swiping_party(&service, &["alice"]).await;
    let alice = actor("alice");

    service
        .record_swipe(&party_id, &alice, &cid("m1"), SwipeDirection::Approve)
        .await
        .unwrap();
    let err = service
        .record_swipe(&party_id, &alice, &cid("m1"), SwipeDirection::Reject)
        .await
        .unwrap_err();
    assert!(err.is_duplicate_swipe());

    let rankings = service.get_rankings(&party_id).await.unwrap();
    let m1 = rankings.iter().find(|c| c.candidate_id == cid("m1")).unwrap();
    assert_eq!(m1.elo_rating, 1216.0);
    assert_eq!(m1.total_swipes, 1);
    assert_eq!(
        service.get_member(&party_id, &alice).await.unwrap().swipes_completed,
        1
    );
    assert_eq!(service.list_swipes(&party_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_swipes_leave_no_trace() {
    let service = service_with(&[("m1", 0.5)]);
    let party_id = swiping_party(&service, &["alice"]).await;
    let alice = actor("alice");

    let err = service
        .record_swipe(&party_id, &alice, &cid("nope"), SwipeDirection::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::Validation(_)));

    let err = service
        .record_swipe_str(&party_id, &alice, &cid("m1"), "maybe")
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::Validation(_)));

    let err = service
        .record_swipe(&party_id, &actor("stranger"), &cid("m1"), SwipeDirection::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::NotFound(_)));

    assert!(service.list_swipes(&party_id).await.unwrap().is_empty());
    assert_eq!(service.get_rankings(&party_id).await.unwrap()[0].total_swipes, 0);
    assert_eq!(
        service.get_member(&party_id, &alice).await.unwrap().swipes_completed,
        0
    );
}

#[tokio::test]
async fn pending_candidates_shrink_as_member_swipes() {
    let service = service_with(&[("m1", 0.5), ("m2", 0.4), ("m3", 0.3)]);
    let party_id = swiping_party(&service, &["alice"]).await;
    let alice = actor("alice");

    assert_eq!(
        service.pending_candidates(&party_id, &alice).await.unwrap().len(),
        3
    );
    service
        .record_swipe(&party_id, &alice, &cid("m2"), SwipeDirection::Approve)
        .await
        .unwrap();

    let pending: Vec<_> = service
        .pending_candidates(&party_id, &alice)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.candidate_id)
        .collect();
    assert_eq!(pending, vec![cid("m1"), cid("m3")]);
}

#[tokio::test]
async fn completed_party_stays_completed() {
    let service = service_with(&[("m1", 0.5)]);
    let party_id = swiping_party(&service, &[]).await;

    service
        .record_swipe(&party_id, &actor("host"), &cid("m1"), SwipeDirection::Approve)
        .await
        .unwrap();
    assert!(service.is_completed(&party_id).await.unwrap());

    let err = service
        .record_swipe(&party_id, &actor("host"), &cid("m1"), SwipeDirection::Reject)
        .await
        .unwrap_err();
    assert!(err.is_duplicate_swipe());
    assert!(service.is_completed(&party_id).await.unwrap());
    assert!(service
        .start_collecting(&party_id, &actor("host"))
        .await
        .is_err());
}

// ---------------------------------------------------------------------------
// Lifecycle and membership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rankings_are_empty_before_swiping() {
    let service = service_with(&[("m1", 0.5)]);
    let party = service.create_party(actor("host"), None).await.unwrap();

    assert!(service.get_rankings(&party.id).await.unwrap().is_empty());
    assert_eq!(party.min_members, 2);
    assert_eq!(party.max_members, 8);
}

#[tokio::test]
async fn only_the_host_drives_the_lifecycle() {
    let service = service_with(&[("m1", 0.5)]);
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(1, 4))
        .await
        .unwrap();
    service.join_party(&party.id, actor("alice")).await.unwrap();

    let err = service
        .start_collecting(&party.id, &actor("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::Unauthorized(_)));
    assert_eq!(
        service.get_party(&party.id).await.unwrap().status,
        PartyStatus::Waiting
    );

    let err = service.start_swiping(&party.id, &host).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));
}

#[tokio::test]
async fn collecting_requires_enough_members() {
    let service = service_with(&[("m1", 0.5)]);
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(2, 4))
        .await
        .unwrap();

    let err = service.start_collecting(&party.id, &host).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));

    service.join_party(&party.id, actor("alice")).await.unwrap();
    let party = service.start_collecting(&party.id, &host).await.unwrap();
    assert_eq!(party.status, PartyStatus::CollectingPreferences);
}

#[tokio::test]
async fn swiping_waits_for_every_submission() {
    let service = service_with(&[("m1", 0.5)]);
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(1, 4))
        .await
        .unwrap();
    service.join_party(&party.id, actor("alice")).await.unwrap();
    service.start_collecting(&party.id, &host).await.unwrap();
    service
        .submit_preferences(&party.id, &host, genres("drama"), None)
        .await
        .unwrap();

    let err = service.start_swiping(&party.id, &host).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(ref msg) if msg.contains("alice")));
    assert!(service.get_rankings(&party.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn capacity_is_enforced() {
    let service = service_with(&[("m1", 0.5)]);
    let party = service
        .create_party_with(actor("host"), PartySettings::new(1, 2))
        .await
        .unwrap();
    service.join_party(&party.id, actor("alice")).await.unwrap();

    let err = service.join_party(&party.id, actor("bob")).await.unwrap_err();
    assert_eq!(err, PartyError::CapacityExceeded { max: 2 });
    assert_eq!(service.list_members(&party.id).await.unwrap().len(), 2);

    let err = service.join_party(&party.id, actor("alice")).await.unwrap_err();
    assert!(matches!(err, PartyError::Conflict(_)));
}

#[tokio::test]
async fn late_joiners_are_turned_away() {
    let service = service_with(&[("m1", 0.5)]);
    let party_id = swiping_party(&service, &["alice"]).await;

    let err = service.join_party(&party_id, actor("bob")).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));
}

#[tokio::test]
async fn party_is_reachable_by_slug() {
    let service = service_with(&[("m1", 0.5)]);
    let party = service.create_party(actor("host"), Some("Friday".into())).await.unwrap();

    let found = service.get_party_by_slug(&party.slug).await.unwrap();
    assert_eq!(found.id, party.id);
    assert_eq!(found.name.as_deref(), Some("Friday"));

    let member = service
        .join_party_by_slug(&party.slug, actor("alice"))
        .await
        .unwrap();
    assert_eq!(member.party_id, party.id);
    assert!(matches!(
        service.get_party_by_slug("missing").await,
        Err(PartyError::NotFound(_))
    ));
}

#[tokio::test]
async fn json_preferences_are_normalized() {
    let service = service_with(&[("m1", 0.5)]);
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(1, 4))
        .await
        .unwrap();
    service.start_collecting(&party.id, &host).await.unwrap();

    let payload = json!({ "genres": ["Drama", "drama ", "comedy"], "era": { "from": 1990 } });
    let hints = json!({ "artists": ["Nina Simone"] });
    let member = service
        .submit_preferences_json(&party.id, &host, &payload, Some(&hints))
        .await
        .unwrap();

    assert!(member.has_submitted_preferences);
    assert_eq!(member.preferences.values("era.from"), vec!["1990"]);
    assert_eq!(member.hints.values("artists"), vec!["Nina Simone"]);

    let err = service
        .submit_preferences_json(&party.id, &host, &json!(["not", "an", "object"]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::Validation(_)));
}

#[tokio::test]
async fn preferences_only_accepted_while_collecting() {
    let service = service_with(&[("m1", 0.5)]);
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(1, 4))
        .await
        .unwrap();

    let err = service
        .submit_preferences(&party.id, &host, genres("drama"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));

    let err = service
        .submit_preferences(&party.id, &host, Preferences::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::Validation(_)));
}

#[tokio::test]
async fn departure_during_swiping_can_complete_the_party() {
    let service = service_with(&[("m1", 0.5)]);
    let party_id = swiping_party(&service, &["alice", "bob"]).await;

    for name in ["host", "alice"] {
        service
            .record_swipe(&party_id, &actor(name), &cid("m1"), SwipeDirection::Approve)
            .await
            .unwrap();
    }
    assert!(!service.is_completed(&party_id).await.unwrap());

    let bob = service.leave_party(&party_id, &actor("bob")).await.unwrap();
    assert_eq!(bob.status, MemberStatus::Left);
    assert!(service.is_completed(&party_id).await.unwrap());
}

#[tokio::test]
async fn departure_stands_when_completion_write_fails() {
    let store = CompletionDownStore {
        inner: InMemoryPartyStore::new(),
    };
    let seeds = vec![CandidateSeed::new("m1", "M1", 0.5)];
    let service = PartyService::new(
        Arc::new(store),
        Arc::new(FixedGenerator { seeds }),
        PartyConfig::default(),
    );
    let party_id = swiping_party(&service, &["alice", "bob"]).await;
    for name in ["host", "alice"] {
        service
            .record_swipe(&party_id, &actor(name), &cid("m1"), SwipeDirection::Approve)
            .await
            .unwrap();
    }

    let bob = service.leave_party(&party_id, &actor("bob")).await.unwrap();
    assert_eq!(bob.status, MemberStatus::Left);
    assert_eq!(
        service.get_member(&party_id, &actor("bob")).await.unwrap().status,
        MemberStatus::Left
    );
    assert_eq!(
        service.get_party(&party_id).await.unwrap().status,
        PartyStatus::Swiping
    );
    assert!(matches!(
        service.check_completion(&party_id).await.unwrap_err(),
        PartyError::Storage(_)
    ));
}

#[tokio::test]
async fn host_removes_members_but_cannot_leave() {
    let service = service_with(&[("m1", 0.5)]);
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(1, 4))
        .await
        .unwrap();
    service.join_party(&party.id, actor("alice")).await.unwrap();
    service.join_party(&party.id, actor("bob")).await.unwrap();

    let err = service.leave_party(&party.id, &host).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));

    let err = service
        .remove_member(&party.id, &actor("alice"), &actor("bob"))
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::Unauthorized(_)));

    let removed = service
        .remove_member(&party.id, &host, &actor("bob"))
        .await
        .unwrap();
    assert_eq!(removed.status, MemberStatus::Removed);

    let err = service.join_party(&party.id, actor("bob")).await.unwrap_err();
    assert!(matches!(err, PartyError::Conflict(_)));
}

#[tokio::test]
async fn generator_failure_keeps_party_collecting() {
    let service = PartyService::in_memory(Arc::new(DownGenerator), PartyConfig::default());
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(1, 4))
        .await
        .unwrap();
    service.start_collecting(&party.id, &host).await.unwrap();
    service
        .submit_preferences(&party.id, &host, genres("drama"), None)
        .await
        .unwrap();

    let err = service.start_swiping(&party.id, &host).await.unwrap_err();
    assert!(matches!(err, PartyError::Generator(_)));
    assert_eq!(
        service.get_party(&party.id).await.unwrap().status,
        PartyStatus::CollectingPreferences
    );

    service
        .submit_preferences(&party.id, &host, genres("comedy"), None)
        .await
        .unwrap();
    service.join_party(&party.id, actor("alice")).await.unwrap();
    let err = service.start_swiping(&party.id, &host).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));
}

#[tokio::test]
async fn membership_is_frozen_while_candidates_generate() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let generator = Arc::new(GatedGenerator {
        seeds: vec![CandidateSeed::new("m1", "M1", 0.5)],
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
        calls: AtomicUsize::new(0),
    });
    let service = PartyService::in_memory(generator.clone(), PartyConfig::default());
    let host = actor("host");
    let party = service
        .create_party_with(host.clone(), PartySettings::new(1, 8))
        .await
        .unwrap();
    service.join_party(&party.id, actor("alice")).await.unwrap();
    service.start_collecting(&party.id, &host).await.unwrap();
    service
        .submit_preferences(&party.id, &host, genres("drama"), None)
        .await
        .unwrap();
    service
        .submit_preferences(&party.id, &actor("alice"), genres("comedy"), None)
        .await
        .unwrap();

    let starting = tokio::spawn({
        let service = service.clone();
        let party_id = party.id.clone();
        let host = host.clone();
        async move { service.start_swiping(&party_id, &host).await }
    });
    entered.notified().await;

    let err = service
        .submit_preferences(&party.id, &actor("alice"), genres("horror"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));
    let err = service.join_party(&party.id, actor("carol")).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));
    let err = service.leave_party(&party.id, &actor("alice")).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));
    let err = service.start_swiping(&party.id, &host).await.unwrap_err();
    assert!(matches!(err, PartyError::PreconditionFailed(_)));

    release.notify_one();
    let swiping = starting.await.unwrap().unwrap();
    assert_eq!(swiping.status, PartyStatus::Swiping);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    let members = service.list_members(&party.id).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(swiping.aggregated_preferences, aggregate_preferences(&members));
    assert_eq!(
        swiping.aggregated_preferences.values("genres"),
        vec!["comedy", "drama"]
    );
}

#[tokio::test]
async fn generated_set_is_capped_and_validated() {
    let mut config = PartyConfig::default();
    config.generation.candidate_count = 2;
    let seeds = vec![
        CandidateSeed::new("a", "A", 0.5),
        CandidateSeed::new("b", "B", 0.5),
        CandidateSeed::new("c", "C", 0.5),
    ];
    let service = PartyService::in_memory(Arc::new(FixedGenerator { seeds }), config);
    let party_id = swiping_party(&service, &[]).await;
    assert_eq!(service.get_rankings(&party_id).await.unwrap().len(), 2);

    let bad = PartyService::in_memory(
        Arc::new(FixedGenerator {
            seeds: vec![CandidateSeed::new("a", "A", 1.5)],
        }),
        PartyConfig::default(),
    );
    let host = actor("host");
    let party = bad
        .create_party_with(host.clone(), PartySettings::new(1, 4))
        .await
        .unwrap();
    bad.start_collecting(&party.id, &host).await.unwrap();
    bad.submit_preferences(&party.id, &host, genres("drama"), None)
        .await
        .unwrap();
    let err = bad.start_swiping(&party.id, &host).await.unwrap_err();
    assert!(matches!(err, PartyError::Validation(_)));
    assert!(bad.get_rankings(&party.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn lifecycle_events_are_published() {
    let service = service_with(&[("m1", 0.5)]);
    let mut rx = service.subscribe();
    let party_id = swiping_party(&service, &[]).await;
    service
        .record_swipe(&party_id, &actor("host"), &cid("m1"), SwipeDirection::Approve)
        .await
        .unwrap();

    let mut transitions = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        assert_eq!(envelope.party_id, party_id);
        if let PartyEvent::PartyStatusChanged { to, .. } = envelope.event {
            transitions.push(to);
        }
    }
    assert_eq!(
        transitions,
        vec![
            PartyStatus::CollectingPreferences,
            PartyStatus::Swiping,
            PartyStatus::Completed
        ]
    );
}
