use std::collections::HashMap;

use crate::models::ScoredBook;

/// Below this population diversification is skipped entirely
const MIN_POPULATION: usize = 6;

/// Hard floor on how many books a single genre may hold before penalties
const GENRE_FLOOR: usize = 3;

/// Maximum books allowed per genre for a given population
///
/// With a diversity factor of 0.3 and 20 books, no genre should hold more
/// than 14 (20 * 0.7), but never fewer than 3 regardless of factor.
pub fn max_books_per_genre(total: usize, diversity_factor: f64) -> usize {
    GENRE_FLOOR.max((total as f64 * (1.0 - diversity_factor)).floor() as usize)
}

/// Re-rank a scored list so no genre dominates the feed
///
/// Inputs of 5 or fewer items are returned unchanged. Otherwise every item
/// gets its pre-adjustment score recorded in `original_score`, items from
/// over-represented genres take a proportional penalty (flagged via
/// `diversity_adjusted`), and the list is rebuilt so every genre present is
/// represented before the remaining slots are filled by adjusted score.
///
/// Output length always equals input length; nothing is fabricated or
/// dropped, only reordered and rescored.
pub fn diversify(
    mut recommendations: Vec<ScoredBook>,
    diversity_factor: f64,
    min_per_category: usize,
) -> Vec<ScoredBook> {
    if recommendations.len() < MIN_POPULATION {
        return recommendations;
    }

    let total = recommendations.len();

    let mut genre_counts: HashMap<String, usize> = HashMap::new();
    for rec in &recommendations {
        *genre_counts.entry(rec.book.genre.clone()).or_insert(0) += 1;
    }

    let max_per_genre = max_books_per_genre(total, diversity_factor);

    // Penalize over-represented genres, keeping the original score around
    for rec in &mut recommendations {
        rec.original_score = Some(rec.score);

        let count = genre_counts.get(&rec.book.genre).copied().unwrap_or(0);
        if count > max_per_genre {
            let over_representation = (count - max_per_genre) as f64 / max_per_genre as f64;
            let penalty = over_representation * diversity_factor * rec.score;
            rec.score = (rec.score - penalty).max(0.0);
            rec.diversity_adjusted = true;
        }
    }

    sort_by_score_desc(&mut recommendations);

    // First pass: surface at least min_per_category of each genre when the
    // population allows
    let mut selected: Vec<ScoredBook> = Vec::with_capacity(total);
    let mut taken_per_genre: HashMap<String, usize> = HashMap::new();
    let mut remaining: Vec<ScoredBook> = Vec::new();

    for rec in recommendations {
        let taken = taken_per_genre.entry(rec.book.genre.clone()).or_insert(0);
        if *taken < min_per_category && selected.len() < total {
            *taken += 1;
            selected.push(rec);
        } else {
            remaining.push(rec);
        }
    }

    // Second pass: fill the leftover slots by adjusted score
    let open_slots = total - selected.len();
    if open_slots > 0 {
        sort_by_score_desc(&mut remaining);
        selected.extend(remaining.into_iter().take(open_slots));
    }

    sort_by_score_desc(&mut selected);
    selected
}

/// Stable descending sort; equal scores keep their relative order
fn sort_by_score_desc(recommendations: &mut [ScoredBook]) {
    recommendations.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, RecommendationSource};

    fn create_scored(id: i64, genre: &str, score: f64) -> ScoredBook {
        ScoredBook {
            book: Book {
                id,
                title: format!("Book {}", id),
                author: "Test Author".to_string(),
                genre: genre.to_string(),
                condition: "Good".to_string(),
                owner_id: "owner-1".to_string(),
                is_available: true,
                description: None,
                created_at: None,
            },
            score,
            original_score: None,
            diversity_adjusted: false,
            source: RecommendationSource::Genre,
            reason: "test".to_string(),
            matching_genre: None,
            distance_miles: None,
        }
    }

    #[test]
    fn test_max_books_per_genre() {
        assert_eq!(max_books_per_genre(20, 0.3), 14);
        assert_eq!(max_books_per_genre(10, 0.5), 5);
        // Floor kicks in for tiny populations or aggressive factors
        assert_eq!(max_books_per_genre(6, 0.9), 3);
    }

    #[test]
    fn test_small_input_passes_through() {
        let input: Vec<ScoredBook> = (0..5).map(|i| create_scored(i, "Fiction", 90.0)).collect();
        let output = diversify(input.clone(), 0.3, 1);

        assert_eq!(output.len(), 5);
        for (a, b) in input.iter().zip(output.iter()) {
            assert_eq!(a.book.id, b.book.id);
            assert_eq!(a.score, b.score);
            assert!(b.original_score.is_none());
            assert!(!b.diversity_adjusted);
        }
    }

    #[test]
    fn test_cardinality_preserved() {
        let mut input = Vec::new();
        for i in 0..16 {
            input.push(create_scored(i, "Fantasy", 90.0 - i as f64));
        }
        for i in 16..20 {
            input.push(create_scored(i, "Mystery", 50.0));
        }

        let output = diversify(input, 0.3, 1);
        assert_eq!(output.len(), 20);
    }

    #[test]
    fn test_over_represented_genre_penalized() {
        // 16 Fantasy of 20 total exceeds max_per_genre = 14; 4 Mystery does not
        let mut input = Vec::new();
        for i in 0..16 {
            input.push(create_scored(i, "Fantasy", 80.0));
        }
        for i in 16..20 {
            input.push(create_scored(i, "Mystery", 60.0));
        }

        let output = diversify(input, 0.3, 1);

        let fantasy: Vec<_> = output.iter().filter(|r| r.book.genre == "Fantasy").collect();
        let mystery: Vec<_> = output.iter().filter(|r| r.book.genre == "Mystery").collect();

        // over_representation = (16 - 14) / 14; penalty = that * 0.3 * 80
        let expected = 80.0 - (2.0 / 14.0) * 0.3 * 80.0;
        for rec in &fantasy {
            assert!(rec.diversity_adjusted);
            assert_eq!(rec.original_score, Some(80.0));
            assert!((rec.score - expected).abs() < 1e-9);
        }
        for rec in &mystery {
            assert!(!rec.diversity_adjusted);
            assert_eq!(rec.original_score, Some(60.0));
            assert_eq!(rec.score, 60.0);
        }
    }

    #[test]
    fn test_every_genre_represented() {
        let mut input = Vec::new();
        for i in 0..18 {
            input.push(create_scored(i, "Fantasy", 95.0));
        }
        input.push(create_scored(18, "Poetry", 5.0));
        input.push(create_scored(19, "History", 3.0));

        let output = diversify(input, 0.3, 1);

        assert_eq!(output.len(), 20);
        assert!(output.iter().any(|r| r.book.genre == "Poetry"));
        assert!(output.iter().any(|r| r.book.genre == "History"));
    }

    #[test]
    fn test_output_sorted_descending() {
        let mut input = Vec::new();
        for i in 0..10 {
            input.push(create_scored(i, if i % 2 == 0 { "Fiction" } else { "Horror" }, (i * 7 % 50) as f64));
        }

        let output = diversify(input, 0.3, 1);

        for pair in output.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_unpenalized_genre_keeps_score() {
        // 5 of 20 is well under max_per_genre = 14
        let mut input = Vec::new();
        for i in 0..5 {
            input.push(create_scored(i, "Romance", 70.0));
        }
        for i in 5..20 {
            input.push(create_scored(i, format!("Genre{}", i % 5).as_str(), 40.0));
        }

        let output = diversify(input, 0.3, 1);

        for rec in output.iter().filter(|r| r.book.genre == "Romance") {
            assert_eq!(rec.score, 70.0);
            assert!(!rec.diversity_adjusted);
        }
    }
}
