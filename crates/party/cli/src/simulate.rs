//! Simulated party run
//!
//! Members submit random genre picks, then swipe every candidate at once,
//! approving with probability equal to the candidate's prior.

use anyhow::{bail, Context};
use party_runtime::{CatalogGenerator, PartyConfig, PartyService};
use party_types::{ActorId, Candidate, PartyId, PartySettings, PartyStatus, Preferences, SwipeDirection};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;

const GENRES: &[&str] = &[
    "action", "comedy", "drama", "horror", "mystery", "romance", "scifi", "thriller",
];

/// Outcome of one simulated party
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub party_id: PartyId,
    pub slug: String,
    pub status: PartyStatus,
    pub members: u32,
    pub swipes: usize,
    pub preferences: Preferences,
    pub rankings: Vec<Candidate>,
}

impl SimulationReport {
    pub fn print(&self) {
        println!(
            "Party {} ({}) - {} members, {} swipes, {}",
            self.party_id.short(),
            self.slug,
            self.members,
            self.swipes,
            self.status
        );
        for (key, values) in self.preferences.iter() {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            println!("  {key}: {}", values.join(", "));
        }
        println!();
        println!("  #  {:<32} {:>8} {:>6} {:>6}", "candidate", "rating", "yes", "no");
        for (rank, c) in self.rankings.iter().enumerate() {
            println!(
                "  {:<2} {:<32} {:>8.1} {:>6} {:>6}",
                rank + 1,
                c.title,
                c.elo_rating,
                c.right_swipes,
                c.left_swipes
            );
        }
    }
}

pub async fn run(config: PartyConfig, members: u32, seed: u64) -> anyhow::Result<SimulationReport> {
    if members == 0 {
        bail!("a party needs at least one member");
    }
    let service = PartyService::in_memory(Arc::new(CatalogGenerator::builtin()), config);
    let mut rng = StdRng::seed_from_u64(seed);

    let host = ActorId::new("host");
    let mut actors = vec![host.clone()];
    actors.extend((1..members).map(|i| ActorId::new(format!("guest-{i}"))));

    let settings = PartySettings::new(members, members).with_name("Simulated party");
    let party = service.create_party_with(host.clone(), settings).await?;
    for actor in &actors[1..] {
        service.join_party(&party.id, actor.clone()).await?;
    }

    service.start_collecting(&party.id, &host).await?;
    for actor in &actors {
        let picks = GENRES.choose_multiple(&mut rng, 2).copied();
        let preferences = Preferences::new().with("genres", picks);
        service
            .submit_preferences(&party.id, actor, preferences, None)
            .await?;
    }
    service.start_swiping(&party.id, &host).await?;

    let mut tasks = JoinSet::new();
    for (i, actor) in actors.iter().enumerate() {
        let service = service.clone();
        let party_id = party.id.clone();
        let actor = actor.clone();
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64 + 1));
        tasks.spawn(async move {
            for candidate in service.pending_candidates(&party_id, &actor).await? {
                let direction = if rng.gen_bool(candidate.expected_score) {
                    SwipeDirection::Approve
                } else {
                    SwipeDirection::Reject
                };
                service
                    .record_swipe(&party_id, &actor, &candidate.candidate_id, direction)
                    .await?;
            }
            anyhow::Ok(())
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.context("swipe task panicked")??;
    }

    let finished = service.get_party(&party.id).await?;
    let report = SimulationReport {
        party_id: finished.id.clone(),
        slug: finished.slug.clone(),
        status: finished.status,
        members,
        swipes: service.list_swipes(&party.id).await?.len(),
        preferences: finished.aggregated_preferences.clone(),
        rankings: service.get_rankings(&party.id).await?,
    };
    info!(
        party = %report.party_id,
        status = %report.status,
        swipes = report.swipes,
        "Simulation finished"
    );
    Ok(report)
}
