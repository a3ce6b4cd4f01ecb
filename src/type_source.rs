use std::str::FromStr;

use async_trait::async_trait;
use tracing::debug;

use crate::effectiveness::DamageRelationLookup;
use schema::{DamageRelations, PokemonType, TypeDetails};

/// Anything that can produce a full upstream type record by type name.
#[async_trait]
pub trait TypeDetailsSource: Send + Sync {
    async fn type_details(&self, type_name: &str) -> Option<TypeDetails>;
}

#[async_trait]
impl<S> DamageRelationLookup for S
where
    S: TypeDetailsSource + ?Sized,
{
    async fn damage_relations(&self, type_name: &str) -> Option<DamageRelations> {
        self.type_details(type_name)
            .await
            .map(|details| details.damage_relations)
    }
}

/// Offline type records derived from the built-in type chart.
///
/// Carries no localized names, so translations fall back to the raw name.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTypeChart;

#[async_trait]
impl TypeDetailsSource for StaticTypeChart {
    async fn type_details(&self, type_name: &str) -> Option<TypeDetails> {
        let Ok(pokemon_type) = PokemonType::from_str(type_name) else {
            debug!(type_name, "type not present in the static chart");
            return None;
        };

        Some(TypeDetails {
            name: pokemon_type.to_string(),
            damage_relations: pokemon_type.damage_relations(),
            names: Vec::new(),
        })
    }
}
