// Pokedex Schema - Shared type definitions
// Serde models of the upstream Pokemon data API plus the static elemental
// type chart, shared by the enrichment engine and its offline tooling.

pub use api_data::*;
pub use pokemon_types::*;

pub mod api_data;
pub mod pokemon_types;
