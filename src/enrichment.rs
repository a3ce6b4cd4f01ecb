//! Enriched detail data for one pokemon.
//!
//! Fetches the pokemon, its species and evolution chain, runs the evolution
//! tree builder and the type effectiveness calculator over them, and attaches
//! localized labels. The pokemon record and a well-formed evolution chain are
//! the only hard requirements; everything else degrades to empty data.

use std::collections::HashMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::CachedTypeSource;
use crate::client::PokeApiClient;
use crate::config::Settings;
use crate::effectiveness::{calculate_type_effectiveness, TypeEffectiveness};
use crate::errors::{EnrichmentResult, UpstreamResult};
use crate::evolution::{build_evolution_tree, collect_stages, EvolutionTreeNode, StageEntry};
use crate::localization::{
    display_name, flavor_text, translated_name, unique_flavor_texts, FlavorText, Locale,
};
use crate::type_source::TypeDetailsSource;
use schema::{EvolutionChain, PokemonAbilitySlot, PokemonStat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeLabel {
    pub name: String,
    pub translated_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityLabel {
    pub name: String,
    pub translated_name: String,
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLabel {
    pub name: String,
    pub translated_name: String,
    pub base_stat: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPokemon {
    pub name: String,
    pub display_name: String,
    pub flavor_text: Option<String>,
    pub flavor_texts: Vec<FlavorText>,
    pub evolutions: Vec<String>,
    pub evolution_chain_data: Option<EvolutionChain>,
    pub evolution_tree: Option<EvolutionTreeNode>,
    pub evolution_stages: Vec<Vec<StageEntry>>,
    pub type_effectiveness: TypeEffectiveness,
    pub types: Vec<TypeLabel>,
    pub abilities: Vec<AbilityLabel>,
    pub stats: Vec<StatLabel>,
}

pub struct EnrichmentService {
    client: PokeApiClient,
    types: Box<dyn TypeDetailsSource>,
}

impl EnrichmentService {
    pub fn new(client: PokeApiClient, types: Box<dyn TypeDetailsSource>) -> Self {
        Self { client, types }
    }

    /// Build the client from settings, caching type records when enabled.
    pub fn from_settings(settings: &Settings) -> UpstreamResult<Self> {
        let client = PokeApiClient::from_settings(settings)?;
        let types: Box<dyn TypeDetailsSource> = if settings.cache_types {
            Box::new(CachedTypeSource::new(client.clone()))
        } else {
            Box::new(client.clone())
        };
        Ok(Self::new(client, types))
    }

    pub async fn enrich(&self, name: &str, locale: Locale) -> EnrichmentResult<EnrichedPokemon> {
        let language = locale.code();
        let pokemon = self.client.fetch_pokemon(name).await?;

        let species_name = if pokemon.species.name.is_empty() {
            name
        } else {
            pokemon.species.name.as_str()
        };
        let species = self.client.fetch_species(species_name).await;

        let chain = match species.as_ref().and_then(|s| s.evolution_chain.as_ref()) {
            Some(reference) => self.client.fetch_evolution_chain(&reference.url).await,
            None => None,
        };
        let evolution_tree = chain
            .as_ref()
            .map(|c| build_evolution_tree(&c.chain))
            .transpose()?;

        let own_types = pokemon.type_names();
        // Own-type labels wait for the effectiveness lookups so a cold cache
        // fetches each own type once.
        let typing = async {
            let effectiveness =
                calculate_type_effectiveness(own_types.as_slice(), &*self.types).await;
            tokio::join!(
                self.translate_effectiveness(effectiveness, language),
                self.type_labels(&own_types, language),
            )
        };
        let ((type_effectiveness, types), abilities, stats) = tokio::join!(
            typing,
            self.ability_labels(&pokemon.abilities, language),
            self.stat_labels(&pokemon.stats, language),
        );

        info!(
            pokemon = %pokemon.name,
            language,
            has_evolution_chain = evolution_tree.is_some(),
            "enriched pokemon"
        );

        Ok(EnrichedPokemon {
            display_name: display_name(&pokemon.name),
            name: pokemon.name.clone(),
            flavor_text: species.as_ref().and_then(|s| flavor_text(s, language)),
            flavor_texts: species
                .as_ref()
                .map(|s| unique_flavor_texts(s, language))
                .unwrap_or_default(),
            evolutions: evolution_tree
                .as_ref()
                .map(EvolutionTreeNode::species_names)
                .unwrap_or_default(),
            evolution_stages: evolution_tree.as_ref().map(collect_stages).unwrap_or_default(),
            evolution_tree,
            evolution_chain_data: chain,
            type_effectiveness,
            types,
            abilities,
            stats,
        })
    }

    /// Replace opposing type names with their names in `language`.
    async fn translate_effectiveness(
        &self,
        effectiveness: TypeEffectiveness,
        language: &str,
    ) -> TypeEffectiveness {
        let mut distinct: Vec<String> = Vec::new();
        for type_name in effectiveness.opposing_types() {
            if !distinct.iter().any(|seen| seen == type_name) {
                distinct.push(type_name.to_string());
            }
        }

        let details = join_all(distinct.iter().map(|t| self.types.type_details(t))).await;
        let translations: HashMap<String, String> = distinct
            .iter()
            .zip(details)
            .filter_map(|(type_name, details)| {
                let details = details?;
                Some((
                    type_name.clone(),
                    translated_name(&details.names, language, type_name),
                ))
            })
            .collect();
        debug!(
            translated = translations.len(),
            total = distinct.len(),
            "translated opposing types"
        );

        effectiveness.map_type_names(|type_name| {
            translations
                .get(type_name)
                .cloned()
                .unwrap_or_else(|| type_name.to_string())
        })
    }

    async fn type_labels(&self, own_types: &[String], language: &str) -> Vec<TypeLabel> {
        let details = join_all(own_types.iter().map(|t| self.types.type_details(t))).await;
        own_types
            .iter()
            .zip(details)
            .map(|(type_name, details)| TypeLabel {
                name: type_name.clone(),
                translated_name: details
                    .map(|d| translated_name(&d.names, language, type_name))
                    .unwrap_or_else(|| type_name.clone()),
            })
            .collect()
    }

    async fn ability_labels(
        &self,
        slots: &[PokemonAbilitySlot],
        language: &str,
    ) -> Vec<AbilityLabel> {
        let details = join_all(
            slots
                .iter()
                .map(|slot| self.client.fetch_ability_details(&slot.ability.name)),
        )
        .await;

        slots
            .iter()
            .zip(details)
            .map(|(slot, details)| {
                let fallback = slot.ability.name.replace('-', " ");
                AbilityLabel {
                    name: slot.ability.name.clone(),
                    translated_name: details
                        .map(|d| translated_name(&d.names, language, &fallback))
                        .unwrap_or(fallback),
                    is_hidden: slot.is_hidden,
                }
            })
            .collect()
    }

    async fn stat_labels(&self, stats: &[PokemonStat], language: &str) -> Vec<StatLabel> {
        let details = join_all(
            stats
                .iter()
                .map(|stat| self.client.fetch_stat_details(&stat.stat.name)),
        )
        .await;

        stats
            .iter()
            .zip(details)
            .map(|(stat, details)| StatLabel {
                name: stat.stat.name.clone(),
                translated_name: details
                    .map(|d| translated_name(&d.names, language, &stat.stat.name))
                    .unwrap_or_else(|| stat.stat.name.clone()),
                base_stat: stat.base_stat,
            })
            .collect()
    }
}
