use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Book, OwnerLocation, UserProfile};

/// Errors that can occur when reading from the marketplace store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Filter parameters for candidate book queries
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    /// Exclude books owned by this user (never recommend someone their own books)
    pub exclude_owner: Option<String>,
    /// Restrict to books currently marked available
    pub available_only: bool,
    /// Restrict to books from this owner set (proximity path pre-filters
    /// owners by range before fetching their books)
    pub owner_ids: Option<Vec<String>>,
    /// Cap on the number of rows fetched
    pub limit: Option<usize>,
}

impl CandidateFilter {
    /// Available books not owned by the given user
    pub fn available_excluding(user_id: &str) -> Self {
        Self {
            exclude_owner: Some(user_id.to_string()),
            available_only: true,
            owner_ids: None,
            limit: None,
        }
    }

    /// Restrict the filter to a set of owners
    pub fn with_owners(mut self, owner_ids: Vec<String>) -> Self {
        self.owner_ids = Some(owner_ids);
        self
    }
}

/// Read-only port to the marketplace data store
///
/// The engine owns no schema; it consumes these three narrow reads and
/// nothing else. Implementations must normalize upstream quirks (identity
/// formats, location encodings) before data crosses this boundary.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Fetch a user's profile, or None if the user does not exist
    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// List candidate books matching the filter
    async fn list_available_books(&self, filter: &CandidateFilter) -> Result<Vec<Book>, StoreError>;

    /// List every other user who has a usable location
    async fn list_owners_with_location(
        &self,
        excluding_user_id: &str,
    ) -> Result<Vec<OwnerLocation>, StoreError>;
}
