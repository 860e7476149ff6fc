///! In-memory fetcher used by aggregator and query-layer tests
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::api_client::RecordFetcher;
use crate::error::FetchError;
use crate::types::{
    ChainNode, EvolutionChain, NamedRef, PageListing, PokemonRecord, SpeciesInfo, SpriteSet,
};

pub(crate) fn record(name: &str, id: u32) -> PokemonRecord {
    PokemonRecord {
        id,
        name: name.to_string(),
        height: 7,
        weight: 69,
        base_experience: Some(64),
        types: vec![],
        abilities: vec![],
        stats: vec![],
        sprites: SpriteSet::default(),
        species: NamedRef {
            name: name.to_string(),
            url: format!("species://{}", name),
        },
    }
}

pub(crate) fn chain_node(name: &str, children: Vec<ChainNode>) -> ChainNode {
    ChainNode {
        species: NamedRef {
            name: name.to_string(),
            url: format!("species://{}", name),
        },
        evolution_details: vec![],
        evolves_to: children,
    }
}

/// Scriptable [`RecordFetcher`] backed by in-memory tables.
///
/// Unknown names and ids are synthesized on the fly (`mon-{id}`, a species
/// pointing at a single-node chain), so paging over an arbitrary universe
/// needs no per-entry setup. Every call is appended to `calls`, labeled
/// `pokemon:{ident}`, `species:{name}`, `chain:{name}` or
/// `list:{offset}:{limit}`; labels scripted via `fail_on`/`fail_times`
/// return a transport error instead.
pub(crate) struct MockFetcher {
    pub total: u64,
    pub records: Mutex<HashMap<String, PokemonRecord>>,
    pub chains: Mutex<HashMap<String, EvolutionChain>>,
    pub calls: Mutex<Vec<String>>,
    /// Label -> remaining failures (`u32::MAX` fails forever).
    pub failing: Mutex<HashMap<String, u32>>,
    /// Label -> artificial latency, honored by `list_page` so in-flight
    /// pagination can be observed from tests.
    pub delays: Mutex<HashMap<String, std::time::Duration>>,
}

impl MockFetcher {
    pub fn with_universe(total: u64) -> Self {
        Self {
            total,
            records: Mutex::new(HashMap::new()),
            chains: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert_record(&self, rec: PokemonRecord) {
        self.records.lock().unwrap().insert(rec.name.clone(), rec);
    }

    /// Register the evolution chain served for `species://{name}`.
    pub fn set_chain(&self, name: &str, chain: EvolutionChain) {
        self.chains.lock().unwrap().insert(name.to_string(), chain);
    }

    /// Make calls with this label fail until further notice.
    pub fn fail_on(&self, label: &str) {
        self.failing.lock().unwrap().insert(label.to_string(), u32::MAX);
    }

    /// Make the next `times` calls with this label fail, then recover.
    pub fn fail_times(&self, label: &str, times: u32) {
        self.failing.lock().unwrap().insert(label.to_string(), times);
    }

    pub fn delay_on(&self, label: &str, delay: std::time::Duration) {
        self.delays.lock().unwrap().insert(label.to_string(), delay);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|label| label.starts_with(prefix))
            .count()
    }

    fn touch(&self, label: String) -> Result<(), FetchError> {
        self.calls.lock().unwrap().push(label.clone());
        let mut failing = self.failing.lock().unwrap();
        if let Some(remaining) = failing.get_mut(&label) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(FetchError::transport(label, Some(500), "scripted failure"));
            }
            failing.remove(&label);
        }
        Ok(())
    }

    fn lookup_by_name(&self, name: &str) -> PokemonRecord {
        if let Some(rec) = self.records.lock().unwrap().get(name) {
            return rec.clone();
        }
        let id = name
            .rsplit('-')
            .next()
            .and_then(|tail| tail.parse().ok())
            .unwrap_or(0);
        record(name, id)
    }
}

#[async_trait]
impl RecordFetcher for MockFetcher {
    async fn fetch_by_name(&self, name: &str) -> Result<PokemonRecord, FetchError> {
        self.touch(format!("pokemon:{}", name))?;
        Ok(self.lookup_by_name(name))
    }

    async fn fetch_by_id(&self, id: u32) -> Result<PokemonRecord, FetchError> {
        self.touch(format!("pokemon:{}", id))?;
        let named = self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|rec| rec.id == id)
            .cloned();
        Ok(named.unwrap_or_else(|| record(&format!("mon-{}", id), id)))
    }

    async fn fetch_species(&self, url: &str) -> Result<SpeciesInfo, FetchError> {
        let name = url.trim_start_matches("species://").to_string();
        self.touch(format!("species:{}", name))?;
        Ok(SpeciesInfo {
            name: name.clone(),
            evolution_chain: Some(crate::types::EvolutionChainRef {
                url: format!("chain://{}", name),
            }),
        })
    }

    async fn fetch_evolution_chain(&self, url: &str) -> Result<EvolutionChain, FetchError> {
        let name = url.trim_start_matches("chain://").to_string();
        self.touch(format!("chain:{}", name))?;
        if let Some(chain) = self.chains.lock().unwrap().get(&name) {
            return Ok(chain.clone());
        }
        Ok(EvolutionChain {
            chain: chain_node(&name, vec![]),
        })
    }

    async fn list_page(&self, offset: u64, limit: u32) -> Result<PageListing, FetchError> {
        let label = format!("list:{}:{}", offset, limit);
        self.touch(label.clone())?;
        let delay = self.delays.lock().unwrap().get(&label).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let start = offset;
        let end = start.saturating_add(limit as u64).min(self.total);
        let results = (start..end)
            .map(|index| NamedRef {
                name: format!("mon-{}", index + 1),
                url: format!("pokemon://{}", index + 1),
            })
            .collect();
        Ok(PageListing {
            count: self.total,
            next: if end < self.total {
                Some("next-page".to_string())
            } else {
                None
            },
            previous: if start > 0 {
                Some("previous-page".to_string())
            } else {
                None
            },
            results,
        })
    }
}
