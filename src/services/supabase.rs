use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::SupabaseSettings;
use crate::models::{Book, GeoPoint, OwnerLocation, UserProfile};
use crate::services::store::{CandidateFilter, RecommendationStore, StoreError};

/// Supabase REST client
///
/// Implements the read-only store port over PostgREST. All the upstream
/// quirks live here: locations arrive as either a JSON object or a
/// JSON-encoded string, favorite genres as an array or a serialized array,
/// and both are normalized before data reaches the engine.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            base_url,
            api_key,
            client,
        }
    }

    pub fn from_settings(settings: &SupabaseSettings) -> Self {
        Self::new(settings.url.clone(), settings.api_key.clone())
    }

    /// GET a REST path and return the row array
    async fn get_rows(&self, path_and_query: &str) -> Result<Vec<Value>, StoreError> {
        let url = format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            path_and_query
        );

        tracing::debug!("Fetching rows from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Supabase returned {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(StoreError::InvalidResponse(
                "Expected a JSON array of rows".to_string(),
            )),
        }
    }
}

#[async_trait]
impl RecommendationStore for SupabaseClient {
    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let query = format!(
            "users?id=eq.{}&select=id,favorite_genres,location",
            urlencoding::encode(user_id)
        );
        let rows = self.get_rows(&query).await?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            id: user_id.to_string(),
            favorite_genres: parse_favorite_genres(row.get("favorite_genres")),
            location: row.get("location").and_then(parse_location),
        }))
    }

    async fn list_available_books(&self, filter: &CandidateFilter) -> Result<Vec<Book>, StoreError> {
        let mut query = "books?select=*".to_string();

        if filter.available_only {
            query.push_str("&is_available=eq.true");
        }
        if let Some(owner) = &filter.exclude_owner {
            query.push_str(&format!("&owner_id=neq.{}", urlencoding::encode(owner)));
        }
        if let Some(owner_ids) = &filter.owner_ids {
            if owner_ids.is_empty() {
                return Ok(Vec::new());
            }
            let id_list = owner_ids.join(",");
            query.push_str(&format!("&owner_id=in.({})", urlencoding::encode(&id_list)));
        }
        if let Some(limit) = filter.limit {
            query.push_str(&format!("&limit={}", limit));
        }

        let rows = self.get_rows(&query).await?;

        // Rows that fail to deserialize are skipped, not fatal
        let books: Vec<Book> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Book>(row) {
                Ok(book) => Some(book),
                Err(e) => {
                    tracing::debug!("Skipping malformed book row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} candidate books", books.len());
        Ok(books)
    }

    async fn list_owners_with_location(
        &self,
        excluding_user_id: &str,
    ) -> Result<Vec<OwnerLocation>, StoreError> {
        let query = format!(
            "users?id=neq.{}&select=id,location",
            urlencoding::encode(excluding_user_id)
        );
        let rows = self.get_rows(&query).await?;

        // Owners without a usable location are silently excluded
        let owners: Vec<OwnerLocation> = rows
            .iter()
            .filter_map(|row| {
                let owner_id = match row.get("id") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => return None,
                };
                let location = row.get("location").and_then(parse_location)?;
                Some(OwnerLocation { owner_id, location })
            })
            .collect();

        tracing::debug!("Found {} owners with usable locations", owners.len());
        Ok(owners)
    }
}

/// Parse a location value into coordinates
///
/// Accepts either a JSON object or a JSON-encoded string containing
/// `latitude`/`longitude`, with values as numbers or numeric strings.
fn parse_location(value: &Value) -> Option<GeoPoint> {
    let parsed;
    let object = match value {
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s).ok()?;
            &parsed
        }
        other => other,
    };

    let latitude = as_f64_lenient(object.get("latitude")?)?;
    let longitude = as_f64_lenient(object.get("longitude")?)?;

    Some(GeoPoint {
        latitude,
        longitude,
    })
}

/// Parse a favorite_genres value into a genre list
///
/// Accepts an array of strings, a JSON-encoded array, or a bare genre
/// string (treated as a single-entry list). Anything else yields empty.
fn parse_favorite_genres(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => match serde_json::from_str::<Vec<String>>(s) {
            Ok(genres) => genres,
            Err(_) => vec![s.clone()],
        },
        _ => Vec::new(),
    }
}

/// Numbers or numeric strings to f64
fn as_f64_lenient(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
