use std::collections::HashMap;
use std::sync::OnceLock;

/// The fixed set of marketplace genres, in matrix row/column order
pub const GENRES: [&str; 17] = [
    "Fiction",
    "Non-Fiction",
    "Mystery",
    "Science Fiction",
    "Fantasy",
    "Romance",
    "Thriller",
    "Horror",
    "Biography",
    "History",
    "Self-Help",
    "Business",
    "Children's",
    "Young Adult",
    "Comics & Graphic Novels",
    "Poetry",
    "Other",
];

/// Genre relatedness values in [0, 1], row/column order matching [`GENRES`].
/// Symmetric with a unit diagonal.
#[rustfmt::skip]
const SIMILARITY: [[f64; 17]; 17] = [
    // Fiction
    [1.0, 0.2, 0.7, 0.8, 0.8, 0.6, 0.7, 0.6, 0.2, 0.3, 0.1, 0.1, 0.4, 0.6, 0.5, 0.4, 0.3],
    // Non-Fiction
    [0.2, 1.0, 0.2, 0.2, 0.1, 0.1, 0.2, 0.1, 0.8, 0.8, 0.7, 0.8, 0.3, 0.3, 0.2, 0.3, 0.3],
    // Mystery
    [0.7, 0.2, 1.0, 0.4, 0.4, 0.5, 0.9, 0.7, 0.2, 0.3, 0.1, 0.1, 0.3, 0.5, 0.3, 0.2, 0.3],
    // Science Fiction
    [0.8, 0.2, 0.4, 1.0, 0.8, 0.4, 0.5, 0.5, 0.1, 0.3, 0.1, 0.1, 0.4, 0.6, 0.6, 0.2, 0.3],
    // Fantasy
    [0.8, 0.1, 0.4, 0.8, 1.0, 0.5, 0.4, 0.6, 0.1, 0.2, 0.1, 0.1, 0.6, 0.7, 0.7, 0.3, 0.3],
    // Romance
    [0.6, 0.1, 0.5, 0.4, 0.5, 1.0, 0.4, 0.3, 0.2, 0.2, 0.3, 0.1, 0.3, 0.7, 0.3, 0.4, 0.3],
    // Thriller
    [0.7, 0.2, 0.9, 0.5, 0.4, 0.4, 1.0, 0.8, 0.2, 0.3, 0.1, 0.1, 0.2, 0.5, 0.3, 0.2, 0.3],
    // Horror
    [0.6, 0.1, 0.7, 0.5, 0.6, 0.3, 0.8, 1.0, 0.1, 0.2, 0.1, 0.1, 0.2, 0.4, 0.4, 0.2, 0.3],
    // Biography
    [0.2, 0.8, 0.2, 0.1, 0.1, 0.2, 0.2, 0.1, 1.0, 0.8, 0.5, 0.5, 0.2, 0.2, 0.2, 0.3, 0.3],
    // History
    [0.3, 0.8, 0.3, 0.3, 0.2, 0.2, 0.3, 0.2, 0.8, 1.0, 0.2, 0.4, 0.3, 0.3, 0.2, 0.3, 0.3],
    // Self-Help
    [0.1, 0.7, 0.1, 0.1, 0.1, 0.3, 0.1, 0.1, 0.5, 0.2, 1.0, 0.7, 0.2, 0.3, 0.1, 0.2, 0.3],
    // Business
    [0.1, 0.8, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.5, 0.4, 0.7, 1.0, 0.1, 0.1, 0.1, 0.1, 0.3],
    // Children's
    [0.4, 0.3, 0.3, 0.4, 0.6, 0.3, 0.2, 0.2, 0.2, 0.3, 0.2, 0.1, 1.0, 0.7, 0.6, 0.4, 0.3],
    // Young Adult
    [0.6, 0.3, 0.5, 0.6, 0.7, 0.7, 0.5, 0.4, 0.2, 0.3, 0.3, 0.1, 0.7, 1.0, 0.6, 0.4, 0.3],
    // Comics & Graphic Novels
    [0.5, 0.2, 0.3, 0.6, 0.7, 0.3, 0.3, 0.4, 0.2, 0.2, 0.1, 0.1, 0.6, 0.6, 1.0, 0.3, 0.3],
    // Poetry
    [0.4, 0.3, 0.2, 0.2, 0.3, 0.4, 0.2, 0.2, 0.3, 0.3, 0.2, 0.1, 0.4, 0.4, 0.3, 1.0, 0.3],
    // Other
    [0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 1.0],
];

/// Fixed genre-to-genre relatedness table
///
/// Loaded once at first use and shared by reference for the life of the
/// process. Truly immutable, so concurrent requests read it without locking.
pub struct GenreSimilarityMatrix {
    index: HashMap<&'static str, usize>,
}

impl GenreSimilarityMatrix {
    fn new() -> Self {
        let index = GENRES
            .iter()
            .enumerate()
            .map(|(i, genre)| (*genre, i))
            .collect();
        Self { index }
    }

    /// Process-wide shared instance
    pub fn global() -> &'static GenreSimilarityMatrix {
        static MATRIX: OnceLock<GenreSimilarityMatrix> = OnceLock::new();
        MATRIX.get_or_init(GenreSimilarityMatrix::new)
    }

    /// Relatedness of two genres in [0, 1]
    ///
    /// Genres outside the fixed set score 0.0 against everything; callers
    /// treat unknown genre strings as "no affinity", never as an error.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&row), Some(&col)) => SIMILARITY[row][col],
            _ => 0.0,
        }
    }

    /// Whether a genre belongs to the fixed set
    pub fn contains(&self, genre: &str) -> bool {
        self.index.contains_key(genre)
    }

    /// All genres in the fixed set
    pub fn genres(&self) -> &'static [&'static str] {
        &GENRES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_one() {
        let matrix = GenreSimilarityMatrix::global();
        for genre in GENRES {
            assert_eq!(matrix.similarity(genre, genre), 1.0, "diagonal for {}", genre);
        }
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let matrix = GenreSimilarityMatrix::global();
        for a in GENRES {
            for b in GENRES {
                assert_eq!(
                    matrix.similarity(a, b),
                    matrix.similarity(b, a),
                    "similarity({}, {}) should be symmetric",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_known_pairs() {
        let matrix = GenreSimilarityMatrix::global();
        assert_eq!(matrix.similarity("Fantasy", "Science Fiction"), 0.8);
        assert_eq!(matrix.similarity("Mystery", "Thriller"), 0.9);
        assert_eq!(matrix.similarity("Fantasy", "Biography"), 0.1);
    }

    #[test]
    fn test_unknown_genre_scores_zero() {
        let matrix = GenreSimilarityMatrix::global();
        assert_eq!(matrix.similarity("Cookbook", "Fiction"), 0.0);
        assert_eq!(matrix.similarity("Fiction", "Cookbook"), 0.0);
        assert_eq!(matrix.similarity("Cookbook", "Cookbook"), 0.0);
        assert!(!matrix.contains("Cookbook"));
    }

    #[test]
    fn test_values_in_unit_interval() {
        let matrix = GenreSimilarityMatrix::global();
        for a in GENRES {
            for b in GENRES {
                let s = matrix.similarity(a, b);
                assert!((0.0..=1.0).contains(&s));
            }
        }
    }
}
