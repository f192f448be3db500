use party_types::{
    ActorId, AggregatedPreferences, Candidate, CandidateId, Member, PartyId, PartyStatus,
    RatingUpdate, Readiness, SwipeDirection, SwipeRecord,
};

/// A guarded move of a party's status.
///
/// Commits only if the stored status still equals `from` and `readiness`
/// holds over the stored members at that instant.
#[derive(Clone, Debug)]
pub struct StatusTransition {
    pub from: PartyStatus,
    pub to: PartyStatus,
    pub readiness: Readiness,
    /// Set together with the move into `swiping`
    pub aggregated_preferences: Option<AggregatedPreferences>,
    /// Assigned together with the move into `swiping`; empty otherwise
    pub candidates: Vec<Candidate>,
}

impl StatusTransition {
    pub fn new(from: PartyStatus, to: PartyStatus) -> Self {
        Self {
            from,
            to,
            readiness: Readiness::Unconditional,
            aggregated_preferences: None,
            candidates: Vec::new(),
        }
    }

    pub fn when(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn with_candidates(
        mut self,
        aggregated_preferences: AggregatedPreferences,
        candidates: Vec<Candidate>,
    ) -> Self {
        self.aggregated_preferences = Some(aggregated_preferences);
        self.candidates = candidates;
        self
    }
}

/// One vote to record
#[derive(Clone, Debug)]
pub struct SwipeCommand {
    pub party_id: PartyId,
    pub actor: ActorId,
    pub candidate_id: CandidateId,
    pub direction: SwipeDirection,
}

/// Everything a committed swipe changed
#[derive(Clone, Debug)]
pub struct SwipeCommit {
    pub record: SwipeRecord,
    pub rating: RatingUpdate,
    /// Candidate after the update
    pub candidate: Candidate,
    /// Member after the update
    pub member: Member,
    /// This swipe was the member's last one
    pub member_completed: bool,
}
