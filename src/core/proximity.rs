use std::collections::HashMap;

use crate::core::distance::{calculate_bounding_box, distance_between, is_within_bounding_box};
use crate::models::{Book, GeoPoint, OwnerLocation, RecommendationSource, ScoredBook};

/// Linear distance decay: 100 at the user's doorstep, 0 at 50 miles
const DISTANCE_PENALTY_PER_MILE: f64 = 2.0;

/// Score for a book at the given owner distance
#[inline]
pub fn proximity_score(distance_miles: f64) -> f64 {
    (100.0 - distance_miles * DISTANCE_PENALTY_PER_MILE).max(0.0)
}

/// Map each in-range owner to their distance from the user
///
/// Stage 1 is a cheap bounding-box cut; owners that survive it get the exact
/// Haversine check against `max_distance_miles`.
pub fn owners_within_range(
    user_location: GeoPoint,
    owners: &[OwnerLocation],
    max_distance_miles: f64,
) -> HashMap<String, f64> {
    let bbox = calculate_bounding_box(
        user_location.latitude,
        user_location.longitude,
        max_distance_miles,
    );

    owners
        .iter()
        .filter(|owner| {
            is_within_bounding_box(owner.location.latitude, owner.location.longitude, &bbox)
        })
        .filter_map(|owner| {
            let distance = distance_between(user_location, owner.location);
            if distance <= max_distance_miles {
                Some((owner.owner_id.clone(), distance))
            } else {
                None
            }
        })
        .collect()
}

/// Annotate books with their owner's distance and a distance-decay score
///
/// Books whose owner is not in the distance map are skipped (the owner was
/// out of range or had no usable location). Output is sorted by distance
/// ascending; ties keep input order.
pub fn score_by_proximity(
    books: Vec<Book>,
    owner_distances: &HashMap<String, f64>,
) -> Vec<ScoredBook> {
    let mut scored: Vec<ScoredBook> = books
        .into_iter()
        .filter_map(|book| {
            let distance = *owner_distances.get(&book.owner_id)?;
            let reason = format!("Near you: {:.1} miles away", distance);
            Some(ScoredBook {
                book,
                score: proximity_score(distance),
                original_score: None,
                diversity_adjusted: false,
                source: RecommendationSource::Location,
                reason,
                matching_genre: None,
                distance_miles: Some(distance),
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        a.distance_miles
            .partial_cmp(&b.distance_miles)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_owner(id: &str, lat: f64, lon: f64) -> OwnerLocation {
        OwnerLocation {
            owner_id: id.to_string(),
            location: GeoPoint {
                latitude: lat,
                longitude: lon,
            },
        }
    }

    fn create_book(id: i64, owner_id: &str) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: "Test Author".to_string(),
            genre: "Fiction".to_string(),
            condition: "Good".to_string(),
            owner_id: owner_id.to_string(),
            is_available: true,
            description: None,
            created_at: None,
        }
    }

    #[test]
    fn test_proximity_score_decay() {
        assert_eq!(proximity_score(0.0), 100.0);
        assert_eq!(proximity_score(25.0), 50.0);
        assert_eq!(proximity_score(50.0), 0.0);
        assert_eq!(proximity_score(60.0), 0.0);
    }

    #[test]
    fn test_owners_filtered_by_range() {
        let user = GeoPoint {
            latitude: 40.0,
            longitude: -75.0,
        };
        let owners = vec![
            create_owner("near", 40.0, -75.0),
            // Roughly 60 miles north
            create_owner("far", 40.87, -75.0),
        ];

        let distances = owners_within_range(user, &owners, 50.0);

        assert_eq!(distances.len(), 1);
        assert!(distances["near"].abs() < 1e-9);
        assert!(!distances.contains_key("far"));
    }

    #[test]
    fn test_books_annotated_with_distance() {
        let mut distances = HashMap::new();
        distances.insert("a".to_string(), 0.0);
        distances.insert("b".to_string(), 10.0);

        let books = vec![create_book(1, "b"), create_book(2, "a"), create_book(3, "c")];
        let scored = score_by_proximity(books, &distances);

        // Owner "c" has no distance entry; its book is excluded
        assert_eq!(scored.len(), 2);
        // Sorted closest first
        assert_eq!(scored[0].book.id, 2);
        assert_eq!(scored[0].score, 100.0);
        assert_eq!(scored[1].book.id, 1);
        assert_eq!(scored[1].score, 80.0);
        assert_eq!(scored[1].reason, "Near you: 10.0 miles away");
        assert_eq!(scored[1].distance_miles, Some(10.0));
    }

    #[test]
    fn test_all_scored_books_tagged_location_source() {
        let mut distances = HashMap::new();
        distances.insert("a".to_string(), 5.0);

        let scored = score_by_proximity(vec![create_book(1, "a")], &distances);

        assert!(scored
            .iter()
            .all(|s| s.source == RecommendationSource::Location));
    }
}
