///! Data model for the remote catalog API
///!
///! These types mirror the subset of the PokeAPI payloads the viewer needs.
///! Records are immutable once deserialized; a refresh replaces them whole.

use serde::{Deserialize, Serialize};

/// `{name, url}` pair used pervasively by the API for cross-references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
    pub url: String,
}

/// One creature's full record as returned by `GET /pokemon/{id-or-name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub id: u32,
    pub name: String,
    pub height: u32,
    pub weight: u32,
    #[serde(default)]
    pub base_experience: Option<u32>,
    /// Ordered; the first slot is the primary type.
    pub types: Vec<TypeSlot>,
    pub abilities: Vec<AbilitySlot>,
    pub stats: Vec<StatValue>,
    pub sprites: SpriteSet,
    pub species: NamedRef,
}

impl PokemonRecord {
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(|slot| slot.kind.name.as_str())
    }

    /// Sum of all base stat values (nominal per-stat range 0-255).
    pub fn total_base_stats(&self) -> u32 {
        self.stats.iter().map(|stat| stat.base_stat).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    #[serde(default)]
    pub ability: Option<NamedRef>,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatValue {
    pub base_stat: u32,
    pub stat: NamedRef,
}

/// Image variants for one record.
///
/// Display precedence is fixed: official artwork first, then the default
/// front sprite, then nothing. See [`SpriteSet::display_image`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteSet {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(default, rename = "official-artwork")]
    pub official_artwork: Option<ArtworkSprites>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtworkSprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

impl SpriteSet {
    /// Best available image URL under the documented fallback order.
    pub fn display_image(&self) -> Option<&str> {
        self.other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|art| art.front_default.as_deref())
            .or(self.front_default.as_deref())
    }
}

/// Species record, fetched only to extract the evolution chain reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesInfo {
    pub name: String,
    #[serde(default)]
    pub evolution_chain: Option<EvolutionChainRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionChainRef {
    pub url: String,
}

/// Evolution tree as returned by `GET /evolution-chain/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionChain {
    pub chain: ChainNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainNode {
    pub species: NamedRef,
    /// Trigger conditions on the edge leading *into* this node.
    #[serde(default)]
    pub evolution_details: Vec<EvolutionDetail>,
    #[serde(default)]
    pub evolves_to: Vec<ChainNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionDetail {
    #[serde(default)]
    pub min_level: Option<u32>,
}

/// Flattened projection of one evolution tree node. Order within the
/// flattened sequence is significant (drives left-to-right display).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionStep {
    pub name: String,
    pub min_level: Option<u32>,
}

/// An evolution step resolved to its own record's identity and images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEvolution {
    pub id: u32,
    pub name: String,
    pub min_level: Option<u32>,
    pub sprites: SpriteSet,
}

/// A record plus its fully resolved evolution line, the unit the view layer
/// consumes for single-item display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub record: PokemonRecord,
    pub evolution_chain: Vec<ResolvedEvolution>,
}

/// Raw page listing from `GET /pokemon?limit=N&offset=M`: names and URLs
/// only, before each entry is resolved to a full record.
#[derive(Debug, Clone, Deserialize)]
pub struct PageListing {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<NamedRef>,
}

/// One page of fully resolved records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Total entry count upstream, across all pages.
    pub count: u64,
    /// Whether upstream indicates a following page.
    pub next: bool,
    /// Whether upstream indicates a preceding page.
    pub previous: bool,
    pub results: Vec<PokemonRecord>,
}
