//! API key configuration
//!
//! Keys come from the environment (optionally loaded from a `.env` file).
//! When a key is absent the public `DEMO_KEY` is used, which is fine for
//! local development but heavily rate limited.

use std::env;

use log::warn;

/// Environment variable holding the College Scorecard (api.data.gov) key
pub const SCORECARD_KEY_VAR: &str = "COLLEGE_SCORECARD_API_KEY";

/// Environment variable holding the FRED key
pub const FRED_KEY_VAR: &str = "FRED_API_KEY";

/// Development fallback for both keys
pub const DEVELOPMENT_API_KEY: &str = "DEMO_KEY";

/// Resolved API keys for the keyed upstream services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub scorecard_api_key: String,
    pub fred_api_key: String,
}

impl Config {
    /// Loads `.env` if present, then reads keys from the process environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves keys through `lookup`, falling back to [`DEVELOPMENT_API_KEY`]
    /// for any key that is unset or blank
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            scorecard_api_key: resolve_key(&lookup, SCORECARD_KEY_VAR),
            fred_api_key: resolve_key(&lookup, FRED_KEY_VAR),
        }
    }
}

fn resolve_key<F>(lookup: &F, name: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).map(|v| v.trim().to_string()) {
        Some(key) if !key.is_empty() => key,
        _ => {
            warn!("{} not set, using development key {}", name, DEVELOPMENT_API_KEY);
            DEVELOPMENT_API_KEY.to_string()
        }
    }
}
