// Core algorithm exports
pub mod aggregator;
pub mod distance;
pub mod diversity;
pub mod genre;
pub mod proximity;
pub mod similarity;

pub use aggregator::{RecommendError, RecommendationAggregator};
pub use distance::{calculate_bounding_box, distance_between, haversine_distance, is_within_bounding_box};
pub use diversity::{diversify, max_books_per_genre};
pub use genre::score_by_genre_affinity;
pub use proximity::{owners_within_range, proximity_score, score_by_proximity};
pub use similarity::{GenreSimilarityMatrix, GENRES};
