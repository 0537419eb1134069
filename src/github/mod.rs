pub mod api;
pub mod client;

pub use client::{is_rate_limited, ApiAccess, GithubClient};

use crate::cache::Cache;
use crate::config::Settings;
use crate::error::Result;

/// Builds a client from resolved settings, attaching the detail cache when one is configured.
pub fn connect(settings: &Settings) -> Result<GithubClient> {
    let client = GithubClient::new(&settings.github, &settings.organization);
    match &settings.cache_dir {
        Some(dir) => Ok(client.with_cache(Cache::new(dir)?)),
        None => Ok(client),
    }
}
