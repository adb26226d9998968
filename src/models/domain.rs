use serde::{Deserialize, Serialize};

/// A book listing eligible for recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub condition: String,
    pub owner_id: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A book owner together with their parsed location
///
/// Owners whose location data is missing or unparseable never make it into
/// this type; the store implementation drops them silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerLocation {
    pub owner_id: String,
    pub location: GeoPoint,
}

/// Normalized user profile as seen by the engine
///
/// Upstream identity formats and location encodings are resolved by the
/// store implementation; the engine only ever sees this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// The candidate-generation strategy that produced a scored book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Genre,
    Location,
}

impl std::fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationSource::Genre => write!(f, "genre"),
            RecommendationSource::Location => write!(f, "location"),
        }
    }
}

/// A book annotated by one recommendation source
///
/// `score` is on a strategy-defined scale and is not comparable across
/// sources until the aggregator has rebalanced it. `original_score` keeps
/// the pre-diversification value so score adjustments stay auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredBook {
    #[serde(flatten)]
    pub book: Book,
    pub score: f64,
    #[serde(default)]
    pub original_score: Option<f64>,
    #[serde(default)]
    pub diversity_adjusted: bool,
    pub source: RecommendationSource,
    pub reason: String,
    #[serde(default)]
    pub matching_genre: Option<String>,
    #[serde(default)]
    pub distance_miles: Option<f64>,
}

/// Final ranked feed returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<ScoredBook>,
    pub total_candidates: usize,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Tunable parameters for the aggregation pipeline
#[derive(Debug, Clone, Copy)]
pub struct AggregatorConfig {
    /// Owners farther than this contribute no candidates
    pub max_distance_miles: f64,
    /// Upper bound on the caller-requested limit
    pub max_limit: usize,
    /// Per-source fetch deadline; a slow source is dropped, not awaited
    pub source_timeout_secs: u64,
    /// How aggressively over-represented genres are penalized (0-1)
    pub diversity_factor: f64,
    /// Minimum items per genre the diversifier tries to surface
    pub min_per_category: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_distance_miles: 50.0,
            max_limit: 50,
            source_timeout_secs: 5,
            diversity_factor: 0.3,
            min_per_category: 1,
        }
    }
}
