// Model exports
pub mod domain;

pub use domain::{
    AggregatorConfig, Book, BoundingBox, GeoPoint, OwnerLocation, RecommendationResult,
    RecommendationSource, ScoredBook, UserProfile,
};
