// Service exports
pub mod store;
pub mod supabase;

pub use store::{CandidateFilter, RecommendationStore, StoreError};
pub use supabase::SupabaseClient;
