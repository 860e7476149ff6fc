///! HTTP client for the remote catalog API
///!
///! Pure I/O: one network request per call, no caching, no retries.
///! Retry policy lives in the query layer.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::FetchError;
use crate::types::{EvolutionChain, PageListing, PokemonRecord, SpeciesInfo};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
const REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Single-record and listing lookups against the remote catalog.
///
/// Object safe so the aggregator and the query layer can run against a mock
/// in tests.
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch_by_name(&self, name: &str) -> Result<PokemonRecord, FetchError>;

    async fn fetch_by_id(&self, id: u32) -> Result<PokemonRecord, FetchError>;

    /// Fetch a species record by its absolute URL (as referenced from a
    /// [`PokemonRecord`]).
    async fn fetch_species(&self, url: &str) -> Result<SpeciesInfo, FetchError>;

    /// Fetch an evolution chain by its absolute URL (as referenced from a
    /// [`SpeciesInfo`]).
    async fn fetch_evolution_chain(&self, url: &str) -> Result<EvolutionChain, FetchError>;

    /// Fetch one page of the catalog listing: names and URLs only. The
    /// offset is 64-bit so callers can derive it from any page index
    /// without overflow.
    async fn list_page(&self, offset: u64, limit: u32) -> Result<PageListing, FetchError>;
}

/// reqwest-backed [`RecordFetcher`] against a PokeAPI-compatible origin.
pub struct PokeApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    /// Build a client against the given API origin, e.g.
    /// `https://pokeapi.co/api/v2`. A trailing slash is tolerated.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| FetchError::transport("http-client", None, e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, ident: &str) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(ident, None, e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::not_found(ident));
        }
        if !status.is_success() {
            return Err(FetchError::transport(
                ident,
                Some(status.as_u16()),
                "non-success response",
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::malformed(ident, e.to_string()))
    }
}

#[async_trait]
impl RecordFetcher for PokeApiClient {
    async fn fetch_by_name(&self, name: &str) -> Result<PokemonRecord, FetchError> {
        let url = format!("{}/pokemon/{}", self.base_url, name);
        self.get_json(&url, name).await
    }

    async fn fetch_by_id(&self, id: u32) -> Result<PokemonRecord, FetchError> {
        let url = format!("{}/pokemon/{}", self.base_url, id);
        self.get_json(&url, &id.to_string()).await
    }

    async fn fetch_species(&self, url: &str) -> Result<SpeciesInfo, FetchError> {
        self.get_json(url, url).await
    }

    async fn fetch_evolution_chain(&self, url: &str) -> Result<EvolutionChain, FetchError> {
        self.get_json(url, url).await
    }

    async fn list_page(&self, offset: u64, limit: u32) -> Result<PageListing, FetchError> {
        let url = format!("{}/pokemon?limit={}&offset={}", self.base_url, limit, offset);
        let ident = format!("page offset={} limit={}", offset, limit);
        self.get_json(&url, &ident).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = PokeApiClient::new("https://pokeapi.co/api/v2/").expect("client builds");
        assert_eq!(client.base_url, "https://pokeapi.co/api/v2");
    }
}
