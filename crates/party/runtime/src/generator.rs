//! Candidate generation seam
//!
//! Candidate generation is an external collaborator: given the aggregated
//! preferences it returns a list of seeds, each with a prior approval
//! probability. [`CatalogGenerator`] is a deterministic in-process
//! implementation over a fixed catalog.

use async_trait::async_trait;
use party_types::{AggregatedPreferences, CandidateSeed, PartyError, PartyId, Preferences};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Input to one generation call
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub party_id: PartyId,
    pub preferences: AggregatedPreferences,
    /// Aggregated optional hints (e.g. listening history)
    pub hints: Preferences,
    /// Maximum number of seeds to return
    pub limit: usize,
}

/// Generator failures
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    #[error("invalid generator response: {0}")]
    InvalidResponse(String),
}

impl From<GeneratorError> for PartyError {
    fn from(err: GeneratorError) -> Self {
        PartyError::Generator(err.to_string())
    }
}

/// Produces the fixed candidate set of a party
#[async_trait]
pub trait CandidateGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<CandidateSeed>, GeneratorError>;
}

/// One entry in a [`CatalogGenerator`] catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub tags: BTreeSet<String>,
}

impl CatalogItem {
    pub fn new(id: &str, title: &str, tags: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

const MIN_PRIOR: f64 = 0.05;
const MAX_PRIOR: f64 = 0.95;

/// Ranks a fixed catalog by tag overlap with the requested preferences.
///
/// Prior = share of an item's tags that some member asked for, clamped to
/// `[0.05, 0.95]`. Ties break on id, so output is fully deterministic.
#[derive(Clone, Debug, Default)]
pub struct CatalogGenerator {
    catalog: Vec<CatalogItem>,
}

impl CatalogGenerator {
    pub fn new(catalog: Vec<CatalogItem>) -> Self {
        Self { catalog }
    }

    /// A small built-in film catalog.
    pub fn builtin() -> Self {
        Self::new(vec![
            CatalogItem::new("nosferatu", "Nosferatu", &["horror", "classic", "silent"]),
            CatalogItem::new("metropolis", "Metropolis", &["scifi", "classic", "silent"]),
            CatalogItem::new("the-general", "The General", &["comedy", "action", "classic"]),
            CatalogItem::new("his-girl-friday", "His Girl Friday", &["comedy", "romance"]),
            CatalogItem::new("night-of-the-living-dead", "Night of the Living Dead", &["horror", "thriller"]),
            CatalogItem::new("the-kid", "The Kid", &["comedy", "drama", "family"]),
            CatalogItem::new("sherlock-jr", "Sherlock Jr.", &["comedy", "mystery"]),
            CatalogItem::new("charade", "Charade", &["mystery", "romance", "thriller"]),
            CatalogItem::new("detour", "Detour", &["noir", "thriller", "drama"]),
            CatalogItem::new("a-trip-to-the-moon", "A Trip to the Moon", &["scifi", "short", "silent"]),
            CatalogItem::new("the-little-shop-of-horrors", "The Little Shop of Horrors", &["comedy", "horror"]),
            CatalogItem::new("my-man-godfrey", "My Man Godfrey", &["comedy", "drama", "romance"]),
        ])
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    fn wanted(request: &GenerationRequest) -> BTreeSet<String> {
        request
            .preferences
            .all_values()
            .into_iter()
            .chain(request.hints.all_values())
            .map(|v| v.to_lowercase())
            .collect()
    }
}

#[async_trait]
impl CandidateGenerator for CatalogGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<CandidateSeed>, GeneratorError> {
        if self.catalog.is_empty() {
            return Err(GeneratorError::Unavailable("catalog is empty".into()));
        }
        let wanted = Self::wanted(request);

        let mut scored: Vec<(usize, &CatalogItem)> = self
            .catalog
            .iter()
            .map(|item| {
                let hits = item
                    .tags
                    .iter()
                    .filter(|t| wanted.contains(&t.to_lowercase()))
                    .count();
                (hits, item)
            })
            .collect();
        scored.sort_by(|(a_hits, a), (b_hits, b)| b_hits.cmp(a_hits).then_with(|| a.id.cmp(&b.id)));

        Ok(scored
            .into_iter()
            .take(request.limit)
            .map(|(hits, item)| {
                let ratio = if item.tags.is_empty() {
                    0.0
                } else {
                    hits as f64 / item.tags.len() as f64
                };
                CandidateSeed::new(item.id.clone(), item.title.clone(), ratio.clamp(MIN_PRIOR, MAX_PRIOR))
                    .with_tags(item.tags.iter().cloned())
            })
            .collect())
    }
}
