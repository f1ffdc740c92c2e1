//! Fetch-pass configuration.

use std::env;

/// Default OMDb endpoint.
pub const OMDB_ADDRESS: &str = "http://www.omdbapi.com";

/// Environment variable holding the OMDb API key.
pub const OMDB_API_KEY_VAR: &str = "OMDB_API_KEY";

/// Configuration for one metadata fetch pass.
#[derive(Debug, Clone)]
pub struct OmdbFetchDefinition {
    pub address: String,
    pub api_key: Option<String>,
    /// Failure budget: the pass halts once the running failure count
    /// exceeds this.
    pub allowed_failures: u32,
    /// Dry run fetches all distinct revenue titles instead of only the
    /// titles missing from the details table.
    pub dry_run: bool,
    /// Optional hard cap on successfully fetched entries.
    pub limit: Option<usize>,
}

impl Default for OmdbFetchDefinition {
    fn default() -> Self {
        Self {
            address: OMDB_ADDRESS.to_string(),
            api_key: env::var(OMDB_API_KEY_VAR).ok(),
            allowed_failures: 3,
            dry_run: false,
            limit: None,
        }
    }
}

impl OmdbFetchDefinition {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn allowed_failures(mut self, allowed: u32) -> Self {
        self.allowed_failures = allowed;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}
