///! Data-fetching and aggregation core for the catalog viewer
///!
///! Layered bottom-up: the API client issues single REST calls, the
///! aggregator composes them into denormalized view models, and the query
///! layer adds caching, retries, pagination and prefetching on top. The
///! server crate only ever talks to the query layer.

pub mod aggregator;
pub mod api_client;
pub mod display;
pub mod error;
pub mod evolution;
pub mod query;
pub mod spotlight;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use aggregator::Aggregator;
pub use api_client::{DEFAULT_API_BASE, PokeApiClient, RecordFetcher};
pub use error::FetchError;
pub use query::{PageSnapshot, Pager, QueryClient, QueryConfig, QueryKey};
pub use spotlight::{RandomIdSource, Spotlight, UniformIdSource};
