// In: src/lib.rs

//! Pokedex Enrichment Engine
//!
//! Turns upstream Pokemon records into the derived data a Pokedex detail page
//! needs: a branching evolution tree with its stages, and the net defensive
//! type effectiveness of a species' own types.

// --- MODULE DECLARATIONS ---
pub mod cache;
pub mod client;
pub mod config;
pub mod effectiveness;
pub mod enrichment;
pub mod errors;
pub mod evolution;
pub mod localization;
pub mod type_source;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Upstream records and the static type chart.
pub use schema::{
    DamageRelations, EvolutionChain, EvolutionNode, NamedResource, Pokemon, PokemonSpecies,
    PokemonType, TypeDetails,
};

// --- From this crate's modules (`src/`) ---

// Core algorithms.
pub use effectiveness::{
    calculate_type_effectiveness, compose_type_effectiveness, DamageRelationLookup,
    TypeEffectiveness, TypeMultiplier,
};
pub use evolution::{build_evolution_tree, collect_stages, EvolutionTreeNode, StageEntry};

// Lookups, upstream access and orchestration.
pub use cache::CachedTypeSource;
pub use client::PokeApiClient;
pub use crate::config::Settings;
pub use enrichment::{EnrichedPokemon, EnrichmentService};
pub use localization::Locale;
pub use type_source::{StaticTypeChart, TypeDetailsSource};

// Crate-specific error and result types.
pub use errors::{
    ConfigError, EnrichmentError, EnrichmentResult, EvolutionDataError, EvolutionDataResult,
    UnknownLocaleError, UpstreamError, UpstreamResult,
};
