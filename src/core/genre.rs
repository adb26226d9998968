use crate::core::similarity::GenreSimilarityMatrix;
use crate::models::{Book, RecommendationSource, ScoredBook};

/// Perfect score for a direct favorite-genre match
const DIRECT_MATCH_SCORE: f64 = 100.0;

/// Score books against a user's declared favorite genres
///
/// A book whose genre is a favorite scores 100 outright. Otherwise the book
/// takes the best similarity against any favorite, scaled to 0-100, with the
/// favorite that produced it recorded as `matching_genre`. Books with no
/// genre affinity at all are dropped; they contribute nothing to this source.
///
/// Unknown genre strings are tolerated: they score 0 against everything and
/// fall out of the result without raising an error.
pub fn score_by_genre_affinity(
    favorite_genres: &[String],
    books: Vec<Book>,
    matrix: &GenreSimilarityMatrix,
) -> Vec<ScoredBook> {
    if favorite_genres.is_empty() {
        return Vec::new();
    }

    books
        .into_iter()
        .filter_map(|book| {
            let (score, matching_genre) = affinity(favorite_genres, &book.genre, matrix);
            if score <= 0.0 {
                return None;
            }

            let reason = format!("Because you like {}", matching_genre);
            Some(ScoredBook {
                book,
                score,
                original_score: None,
                diversity_adjusted: false,
                source: RecommendationSource::Genre,
                reason,
                matching_genre: Some(matching_genre),
                distance_miles: None,
            })
        })
        .collect()
}

/// Best affinity of a book genre against the favorites, with the favorite
/// (or the genre itself on a direct hit) that produced it
fn affinity(
    favorite_genres: &[String],
    book_genre: &str,
    matrix: &GenreSimilarityMatrix,
) -> (f64, String) {
    if favorite_genres.iter().any(|g| g == book_genre) {
        return (DIRECT_MATCH_SCORE, book_genre.to_string());
    }

    let mut best_score = 0.0;
    let mut best_genre = String::new();
    for favorite in favorite_genres {
        let score = matrix.similarity(favorite, book_genre) * 100.0;
        if score > best_score {
            best_score = score;
            best_genre = favorite.clone();
        }
    }

    (best_score, best_genre)
}
