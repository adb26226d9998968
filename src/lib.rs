//! BookSwap Algo - recommendation aggregation engine for the BookSwap
//! exchange marketplace
//!
//! This library combines independent candidate-generation strategies
//! (genre affinity, geographic proximity) into one ranked, deduplicated,
//! diversity-aware feed. It is a read-only, stateless scoring pipeline:
//! request handling, authentication, and persistence live elsewhere and are
//! reached only through the narrow [`services::RecommendationStore`] port.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    haversine_distance, GenreSimilarityMatrix, RecommendError, RecommendationAggregator,
};
pub use crate::models::{
    AggregatorConfig, Book, GeoPoint, RecommendationResult, RecommendationSource, ScoredBook,
    UserProfile,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let matrix = GenreSimilarityMatrix::global();
        assert_eq!(matrix.similarity("Fiction", "Fiction"), 1.0);
        assert!(haversine_distance(40.0, -75.0, 40.1, -75.0) > 0.0);
    }
}
