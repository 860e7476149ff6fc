///! Composition of dependent catalog lookups into denormalized view models
use std::sync::Arc;

use crate::api_client::RecordFetcher;
use crate::error::FetchError;
use crate::evolution;
use crate::types::{PageResult, PokemonDetail, PokemonRecord, ResolvedEvolution};

/// Composes several [`RecordFetcher`] calls per logical entity.
///
/// All fan-out fetches run sequentially, preserving result order and keeping
/// peak concurrency at one request per aggregation. Failure policy is strict
/// all-or-nothing: the first failing step aborts the aggregation and
/// propagates its error unmodified, with no partial result.
pub struct Aggregator {
    fetcher: Arc<dyn RecordFetcher>,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn RecordFetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve one record plus its full evolution line.
    ///
    /// Issues: record -> species -> evolution chain -> one fetch per chain
    /// member (in flattened order) to pick up each member's identity and
    /// sprites.
    pub async fn resolve_detail(&self, id: u32) -> Result<PokemonDetail, FetchError> {
        let record = self.fetcher.fetch_by_id(id).await?;

        let species = self.fetcher.fetch_species(&record.species.url).await?;
        let chain_url = species
            .evolution_chain
            .as_ref()
            .map(|chain_ref| chain_ref.url.as_str())
            .ok_or_else(|| {
                FetchError::malformed(&record.name, "species carries no evolution chain reference")
            })?;

        let chain = self.fetcher.fetch_evolution_chain(chain_url).await?;
        let steps = evolution::flatten(&chain)?;

        let mut members = Vec::with_capacity(steps.len());
        for step in steps {
            let member = self.fetcher.fetch_by_name(&step.name).await?;
            members.push(ResolvedEvolution {
                id: member.id,
                name: member.name,
                min_level: step.min_level,
                sprites: member.sprites,
            });
        }

        tracing::debug!(
            "resolved detail for '{}' with {} evolution members",
            record.name,
            members.len()
        );

        Ok(PokemonDetail {
            record,
            evolution_chain: members,
        })
    }

    /// Fetch one catalog page and resolve every listed entry to a full
    /// record. Issues 1 + N requests for a page of N entries; listing order
    /// is preserved. The offset is computed in 64-bit space so any page
    /// index is representable.
    pub async fn fetch_page(&self, page: u32, limit: u32) -> Result<PageResult, FetchError> {
        let offset = page as u64 * limit as u64;
        let listing = self.fetcher.list_page(offset, limit).await?;

        let mut results: Vec<PokemonRecord> = Vec::with_capacity(listing.results.len());
        for entry in &listing.results {
            results.push(self.fetcher.fetch_by_name(&entry.name).await?);
        }

        tracing::debug!("resolved page {} with {} entries", page, results.len());

        Ok(PageResult {
            count: listing.count,
            next: listing.next.is_some(),
            previous: listing.previous.is_some(),
            results,
        })
    }
}
