use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::diversity::diversify;
use crate::core::genre::score_by_genre_affinity;
use crate::core::proximity::{owners_within_range, score_by_proximity};
use crate::core::similarity::GenreSimilarityMatrix;
use crate::models::{
    AggregatorConfig, RecommendationResult, RecommendationSource, ScoredBook,
};
use crate::services::store::{CandidateFilter, RecommendationStore, StoreError};

/// Scale of the boost granted to under-represented sources
const SOURCE_BOOST_SCALE: f64 = 10.0;

/// Errors surfaced to the caller of [`RecommendationAggregator::aggregate`]
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("All recommendation sources are unavailable")]
    UpstreamUnavailable,
}

/// Multi-source recommendation orchestrator
///
/// # Pipeline
/// 1. Fan out to the genre and location sources concurrently, each bounded
///    by a per-source timeout
/// 2. Merge and deduplicate by book id (higher score wins)
/// 3. Diversity re-rank
/// 4. Source rebalancing, final sort, truncate to the requested limit
///
/// Each `aggregate` call is independent and reentrant; the only shared state
/// is the immutable genre similarity matrix and the store's connection pool.
pub struct RecommendationAggregator<S> {
    store: Arc<S>,
    config: AggregatorConfig,
    matrix: &'static GenreSimilarityMatrix,
}

impl<S: RecommendationStore> RecommendationAggregator<S> {
    pub fn new(store: Arc<S>, config: AggregatorConfig) -> Self {
        Self {
            store,
            config,
            matrix: GenreSimilarityMatrix::global(),
        }
    }

    pub fn with_default_config(store: Arc<S>) -> Self {
        Self::new(store, AggregatorConfig::default())
    }

    /// Build a ranked, deduplicated, diversity-aware feed for a user
    ///
    /// A failed or timed-out source contributes nothing; the request only
    /// fails outright when every source is gone. A user with no favorite
    /// genres and no location gets an empty result, not an error.
    pub async fn aggregate(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<RecommendationResult, RecommendError> {
        if limit == 0 || limit > self.config.max_limit {
            return Err(RecommendError::InvalidArgument(format!(
                "limit must be between 1 and {}",
                self.config.max_limit
            )));
        }

        // Over-fetch per source so dedup and filtering can't starve the feed
        let source_limit = limit * 2;
        let deadline = Duration::from_secs(self.config.source_timeout_secs);

        info!("Aggregating recommendations for user: {}, limit: {}", user_id, limit);

        let (genre_result, location_result) = tokio::join!(
            timeout(deadline, self.genre_candidates(user_id, source_limit)),
            timeout(deadline, self.location_candidates(user_id, source_limit)),
        );

        let genre_recs = source_outcome(genre_result, RecommendationSource::Genre);
        let location_recs = source_outcome(location_result, RecommendationSource::Location);

        if genre_recs.is_none() && location_recs.is_none() {
            return Err(RecommendError::UpstreamUnavailable);
        }

        let mut combined = genre_recs.unwrap_or_default();
        combined.extend(location_recs.unwrap_or_default());
        let total_candidates = combined.len();

        let deduped = dedup_by_id(combined);
        let diversified = diversify(
            deduped,
            self.config.diversity_factor,
            self.config.min_per_category,
        );
        let mut recommendations = rebalance_sources(diversified);

        sort_by_score_desc(&mut recommendations);
        recommendations.truncate(limit);

        info!(
            "Returning {} recommendations for user {} (from {} candidates)",
            recommendations.len(),
            user_id,
            total_candidates
        );

        Ok(RecommendationResult {
            recommendations,
            total_candidates,
        })
    }

    /// Genre source: score every available listing against the user's
    /// favorite genres
    async fn genre_candidates(
        &self,
        user_id: &str,
        source_limit: usize,
    ) -> Result<Vec<ScoredBook>, StoreError> {
        let Some(profile) = self.store.get_user_profile(user_id).await? else {
            debug!("No profile for user {}, genre source empty", user_id);
            return Ok(Vec::new());
        };

        if profile.favorite_genres.is_empty() {
            debug!("User {} has no favorite genres", user_id);
            return Ok(Vec::new());
        }

        let filter = CandidateFilter::available_excluding(user_id);
        let books = self.store.list_available_books(&filter).await?;
        debug!("Genre source considering {} books for {}", books.len(), user_id);

        let mut scored = score_by_genre_affinity(&profile.favorite_genres, books, self.matrix);
        sort_by_score_desc(&mut scored);
        scored.truncate(source_limit);
        Ok(scored)
    }

    /// Location source: find in-range owners first, then score their books
    /// by distance decay
    async fn location_candidates(
        &self,
        user_id: &str,
        source_limit: usize,
    ) -> Result<Vec<ScoredBook>, StoreError> {
        let Some(profile) = self.store.get_user_profile(user_id).await? else {
            debug!("No profile for user {}, location source empty", user_id);
            return Ok(Vec::new());
        };

        let Some(user_location) = profile.location else {
            debug!("User {} has no location", user_id);
            return Ok(Vec::new());
        };

        let owners = self.store.list_owners_with_location(user_id).await?;
        let distances =
            owners_within_range(user_location, &owners, self.config.max_distance_miles);

        if distances.is_empty() {
            debug!("No owners within range for user {}", user_id);
            return Ok(Vec::new());
        }

        let filter = CandidateFilter::available_excluding(user_id)
            .with_owners(distances.keys().cloned().collect());
        let books = self.store.list_available_books(&filter).await?;
        debug!(
            "Location source considering {} books from {} owners for {}",
            books.len(),
            distances.len(),
            user_id
        );

        let mut scored = score_by_proximity(books, &distances);
        scored.truncate(source_limit);
        Ok(scored)
    }
}

/// Unwrap one source's outcome; failures and timeouts are logged and treated
/// as "no contribution", never propagated on their own
fn source_outcome(
    result: Result<Result<Vec<ScoredBook>, StoreError>, tokio::time::error::Elapsed>,
    source: RecommendationSource,
) -> Option<Vec<ScoredBook>> {
    match result {
        Ok(Ok(recs)) => {
            debug!("{} source produced {} candidates", source, recs.len());
            Some(recs)
        }
        Ok(Err(e)) => {
            warn!("{} source failed, proceeding without it: {}", source, e);
            None
        }
        Err(_) => {
            warn!("{} source timed out, proceeding without it", source);
            None
        }
    }
}

/// Keep one entry per book id, preferring the higher score
///
/// When a book arrives from both sources the losing occurrence's source and
/// reason are discarded with it. Equal scores keep the first occurrence, so
/// output order stays deterministic.
fn dedup_by_id(recommendations: Vec<ScoredBook>) -> Vec<ScoredBook> {
    let mut out: Vec<ScoredBook> = Vec::with_capacity(recommendations.len());
    let mut index_by_id: HashMap<i64, usize> = HashMap::new();

    for rec in recommendations {
        match index_by_id.get(&rec.book.id) {
            Some(&i) => {
                if rec.score > out[i].score {
                    out[i] = rec;
                }
            }
            None => {
                index_by_id.insert(rec.book.id, out.len());
                out.push(rec);
            }
        }
    }

    out
}

/// Nudge under-represented sources upward so the feed stays mixed
///
/// The average is taken over the sources actually present in the list; with
/// a single source the average equals its count and no boost applies.
fn rebalance_sources(mut recommendations: Vec<ScoredBook>) -> Vec<ScoredBook> {
    let mut counts: HashMap<RecommendationSource, usize> = HashMap::new();
    for rec in &recommendations {
        *counts.entry(rec.source).or_insert(0) += 1;
    }

    if counts.len() < 2 {
        return recommendations;
    }

    let total: usize = counts.values().sum();
    let average = total as f64 / counts.len() as f64;

    for rec in &mut recommendations {
        let count = counts[&rec.source] as f64;
        if count < average {
            rec.score += (average - count) / average * SOURCE_BOOST_SCALE;
        }
    }

    recommendations
}

/// Stable descending sort; equal scores keep insertion order
fn sort_by_score_desc(recommendations: &mut [ScoredBook]) {
    recommendations.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
