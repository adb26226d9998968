use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::AggregatorConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_max_distance_miles")]
    pub max_distance_miles: f64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
    #[serde(default = "default_diversity_factor")]
    pub diversity_factor: f64,
    #[serde(default = "default_min_per_category")]
    pub min_per_category: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            max_distance_miles: default_max_distance_miles(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            source_timeout_secs: default_source_timeout_secs(),
            diversity_factor: default_diversity_factor(),
            min_per_category: default_min_per_category(),
        }
    }
}

impl RecommendationSettings {
    /// Map the loaded settings onto the aggregator's tuning struct
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            max_distance_miles: self.max_distance_miles,
            max_limit: self.max_limit,
            source_timeout_secs: self.source_timeout_secs,
            diversity_factor: self.diversity_factor,
            min_per_category: self.min_per_category,
        }
    }
}

fn default_max_distance_miles() -> f64 {
    50.0
}
fn default_limit() -> usize {
    20
}
fn default_max_limit() -> usize {
    50
}
fn default_source_timeout_secs() -> u64 {
    5
}
fn default_diversity_factor() -> f64 {
    0.3
}
fn default_min_per_category() -> usize {
    1
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with BOOKSWAP_)
    pub fn load() -> Result<Self, ConfigError> {
        // Honor a .env file when present
        dotenv::dotenv().ok();

        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with BOOKSWAP_)
            // e.g., BOOKSWAP_RECOMMENDATION__MAX_LIMIT -> recommendation.max_limit
            .add_source(
                Environment::with_prefix("BOOKSWAP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // The store credentials commonly arrive as SUPABASE_URL/SUPABASE_KEY
        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("BOOKSWAP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Overlay the conventional Supabase environment variables onto the config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let supabase_url = env::var("SUPABASE_URL")
        .or_else(|_| env::var("BOOKSWAP_SUPABASE__URL"))
        .ok();
    let supabase_key = env::var("SUPABASE_KEY")
        .or_else(|_| env::var("BOOKSWAP_SUPABASE__API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = supabase_url {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Some(key) = supabase_key {
        builder = builder.set_override("supabase.api_key", key)?;
    }

    builder.build()
}
