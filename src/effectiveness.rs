//! Defensive type effectiveness for a species' own types.
//!
//! Each own type contributes its upstream damage relations. Weak and resist
//! listings compose multiplicatively; a no-damage listing from any own type
//! makes the opposing type an immunity no matter what the other own types say.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use schema::DamageRelations;

/// Fetches one type's damage relations. `None` covers "not found", upstream
/// failure and timeouts alike; the calculator treats them identically.
#[async_trait]
pub trait DamageRelationLookup: Send + Sync {
    async fn damage_relations(&self, type_name: &str) -> Option<DamageRelations>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMultiplier {
    #[serde(rename = "type")]
    pub type_name: String,
    pub multiplier: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeEffectiveness {
    pub weaknesses: Vec<TypeMultiplier>,
    pub resistances: Vec<TypeMultiplier>,
    pub immunities: Vec<String>,
}

impl TypeEffectiveness {
    pub fn is_empty(&self) -> bool {
        self.weaknesses.is_empty() && self.resistances.is_empty() && self.immunities.is_empty()
    }

    /// Every opposing type named in the result, weaknesses first.
    pub fn opposing_types(&self) -> Vec<&str> {
        self.weaknesses
            .iter()
            .chain(&self.resistances)
            .map(|entry| entry.type_name.as_str())
            .chain(self.immunities.iter().map(String::as_str))
            .collect()
    }

    /// Rewrite every opposing type name, keeping multipliers and order.
    pub fn map_type_names<F>(self, mut rename: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        let mut rename_entry = |entry: TypeMultiplier| TypeMultiplier {
            type_name: rename(&entry.type_name),
            multiplier: entry.multiplier,
        };
        let weaknesses = self.weaknesses.into_iter().map(&mut rename_entry).collect();
        let resistances = self.resistances.into_iter().map(&mut rename_entry).collect();

        Self {
            weaknesses,
            resistances,
            immunities: self.immunities.iter().map(|t| rename(t)).collect(),
        }
    }
}

/// Running per-opposing-type multipliers, in order of first appearance.
#[derive(Debug, Default)]
struct MultiplierTable {
    order: Vec<String>,
    multipliers: HashMap<String, f32>,
    immune: HashSet<String>,
}

impl MultiplierTable {
    fn entry(&mut self, opposing: &str) -> &mut f32 {
        if !self.multipliers.contains_key(opposing) {
            self.order.push(opposing.to_string());
        }
        self.multipliers.entry(opposing.to_string()).or_insert(1.0)
    }

    fn scale(&mut self, opposing: &str, factor: f32) {
        *self.entry(opposing) *= factor;
    }

    fn mark_immune(&mut self, opposing: &str) {
        self.entry(opposing);
        self.immune.insert(opposing.to_string());
    }

    fn net(&self, opposing: &str) -> f32 {
        if self.immune.contains(opposing) {
            return 0.0;
        }
        self.multipliers.get(opposing).copied().unwrap_or(1.0)
    }

    fn classify(self) -> TypeEffectiveness {
        let mut result = TypeEffectiveness::default();

        for opposing in &self.order {
            let multiplier = self.net(opposing);
            if multiplier == 0.0 {
                result.immunities.push(opposing.clone());
            } else if multiplier >= 2.0 {
                result.weaknesses.push(TypeMultiplier {
                    type_name: opposing.clone(),
                    multiplier,
                });
            } else if multiplier <= 0.5 {
                result.resistances.push(TypeMultiplier {
                    type_name: opposing.clone(),
                    multiplier,
                });
            }
        }

        result
    }
}

/// Compose already-resolved damage relations into one classification.
pub fn compose_type_effectiveness<'a, I>(relations: I) -> TypeEffectiveness
where
    I: IntoIterator<Item = &'a DamageRelations>,
{
    let mut table = MultiplierTable::default();

    for relation in relations {
        for opposing in &relation.double_damage_from {
            table.scale(&opposing.name, 2.0);
        }
        for opposing in &relation.half_damage_from {
            table.scale(&opposing.name, 0.5);
        }
        for opposing in &relation.no_damage_from {
            table.mark_immune(&opposing.name);
        }
    }

    table.classify()
}

/// Look up every own type concurrently and compose whatever resolved.
///
/// Never fails: unresolved types are skipped, and if none resolve the result
/// is empty.
pub async fn calculate_type_effectiveness<S, L>(own_types: &[S], lookup: &L) -> TypeEffectiveness
where
    S: AsRef<str>,
    L: DamageRelationLookup + ?Sized,
{
    let lookups = own_types
        .iter()
        .map(|own_type| lookup.damage_relations(own_type.as_ref()));
    let results = join_all(lookups).await;

    let resolved: Vec<DamageRelations> = own_types
        .iter()
        .zip(results)
        .filter_map(|(own_type, relations)| {
            if relations.is_none() {
                debug!(own_type = own_type.as_ref(), "damage relations unavailable, skipping");
            }
            relations
        })
        .collect();

    if resolved.is_empty() && !own_types.is_empty() {
        warn!(
            own_types = own_types.len(),
            "no own type could be resolved, type effectiveness is empty"
        );
    }

    compose_type_effectiveness(&resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schema::NamedResource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn names(list: &[&str]) -> Vec<NamedResource> {
        list.iter().map(|n| NamedResource::named(*n)).collect()
    }

    fn relations(double: &[&str], half: &[&str], none: &[&str]) -> DamageRelations {
        DamageRelations {
            double_damage_from: names(double),
            half_damage_from: names(half),
            no_damage_from: names(none),
            ..Default::default()
        }
    }

    fn weak(type_name: &str, multiplier: f32) -> TypeMultiplier {
        TypeMultiplier {
            type_name: type_name.to_string(),
            multiplier,
        }
    }

    /// Serves fixed relations per type, optionally after a delay.
    #[derive(Default)]
    struct FixtureLookup {
        relations: HashMap<String, DamageRelations>,
        delays: HashMap<String, Duration>,
    }

    impl FixtureLookup {
        fn with(mut self, type_name: &str, relations: DamageRelations) -> Self {
            self.relations.insert(type_name.to_string(), relations);
            self
        }

        fn delayed(mut self, type_name: &str, delay: Duration) -> Self {
            self.delays.insert(type_name.to_string(), delay);
            self
        }
    }

    #[async_trait]
    impl DamageRelationLookup for FixtureLookup {
        async fn damage_relations(&self, type_name: &str) -> Option<DamageRelations> {
            if let Some(delay) = self.delays.get(type_name) {
                tokio::time::sleep(*delay).await;
            }
            self.relations.get(type_name).cloned()
        }
    }

    #[tokio::test]
    async fn test_type_without_relations_yields_empty_result() {
        let lookup = FixtureLookup::default().with("plain", DamageRelations::default());
        let result = calculate_type_effectiveness(&["plain"], &lookup).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_mono_type_weakness_and_resistance() {
        let lookup = FixtureLookup::default().with("grass", relations(&["fire"], &["water"], &[]));
        let result = calculate_type_effectiveness(&["grass"], &lookup).await;

        assert_eq!(
            result,
            TypeEffectiveness {
                weaknesses: vec![weak("fire", 2.0)],
                resistances: vec![weak("water", 0.5)],
                immunities: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_weakness_and_resistance_cancel_out() {
        let lookup = FixtureLookup::default()
            .with("a", relations(&["x"], &[], &[]))
            .with("b", relations(&[], &["x"], &[]));
        let result = calculate_type_effectiveness(&["a", "b"], &lookup).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_double_weakness_and_double_resistance_stack() {
        let lookup = FixtureLookup::default()
            .with("a", relations(&["x"], &["y"], &[]))
            .with("b", relations(&["x"], &["y"], &[]));
        let result = calculate_type_effectiveness(&["a", "b"], &lookup).await;

        assert_eq!(result.weaknesses, vec![weak("x", 4.0)]);
        assert_eq!(result.resistances, vec![weak("y", 0.25)]);
    }

    #[tokio::test]
    async fn test_immunity_overrides_weakness_regardless_of_completion_order() {
        let weak_to_x = relations(&["x"], &[], &[]);
        let immune_to_x = relations(&[], &[], &["x"]);

        let slow_weak = FixtureLookup::default()
            .with("a", weak_to_x.clone())
            .with("b", immune_to_x.clone())
            .delayed("a", Duration::from_millis(30));
        let slow_immune = FixtureLookup::default()
            .with("a", weak_to_x)
            .with("b", immune_to_x)
            .delayed("b", Duration::from_millis(30));

        let first = calculate_type_effectiveness(&["a", "b"], &slow_weak).await;
        let second = calculate_type_effectiveness(&["a", "b"], &slow_immune).await;

        assert_eq!(first.immunities, vec!["x".to_string()]);
        assert!(first.weaknesses.is_empty());
        assert_eq!(first, second);
    }

    /// Tracks how many lookups are pending at once.
    #[derive(Default)]
    struct InFlightLookup {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl DamageRelationLookup for InFlightLookup {
        async fn damage_relations(&self, _type_name: &str) -> Option<DamageRelations> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Some(DamageRelations::default())
        }
    }

    #[tokio::test]
    async fn test_own_type_lookups_are_in_flight_together() {
        let lookup = InFlightLookup::default();
        calculate_type_effectiveness(&["a", "b"], &lookup).await;

        assert_eq!(lookup.peak.load(Ordering::SeqCst), 2);
        assert_eq!(lookup.current.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_immunity_overrides_weakness_in_either_processing_order() {
        let weak_to_x = relations(&["x"], &[], &[]);
        let immune_to_x = relations(&[], &[], &["x"]);

        let forward = compose_type_effectiveness([&weak_to_x, &immune_to_x]);
        let backward = compose_type_effectiveness([&immune_to_x, &weak_to_x]);

        assert_eq!(forward, backward);
        assert_eq!(forward.immunities, vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn test_unresolved_type_is_skipped() {
        let lookup = FixtureLookup::default().with("fire", relations(&["water"], &["grass"], &[]));
        let result = calculate_type_effectiveness(&["fire", "missing"], &lookup).await;

        assert_eq!(result.weaknesses, vec![weak("water", 2.0)]);
        assert_eq!(result.resistances, vec![weak("grass", 0.5)]);
        assert!(result.immunities.is_empty());
    }

    #[tokio::test]
    async fn test_all_lookups_unresolved_yields_empty_result() {
        let lookup = FixtureLookup::default();
        let result = calculate_type_effectiveness(&["missing", "gone"], &lookup).await;
        assert_eq!(result, TypeEffectiveness::default());
    }

    #[test]
    fn test_output_follows_first_appearance_order() {
        let first = relations(&["rock", "water"], &["bug"], &[]);
        let second = relations(&["ice"], &["fairy", "bug"], &["ground"]);

        let result = compose_type_effectiveness([&first, &second]);

        assert_eq!(
            result.weaknesses,
            vec![weak("rock", 2.0), weak("water", 2.0), weak("ice", 2.0)]
        );
        assert_eq!(result.resistances, vec![weak("bug", 0.25), weak("fairy", 0.5)]);
        assert_eq!(result.immunities, vec!["ground".to_string()]);
        assert_eq!(
            result.opposing_types(),
            vec!["rock", "water", "ice", "bug", "fairy", "ground"]
        );
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let result = compose_type_effectiveness([&relations(&["fire"], &[], &["ghost"])]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["weaknesses"][0]["type"], "fire");
        assert_eq!(json["weaknesses"][0]["multiplier"], 2.0);
        assert_eq!(json["immunities"][0], "ghost");
        assert!(json["resistances"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_map_type_names_keeps_multipliers() {
        let result = compose_type_effectiveness([&relations(&["fire"], &["water"], &["ghost"])])
            .map_type_names(|name| name.to_uppercase());

        assert_eq!(result.weaknesses, vec![weak("FIRE", 2.0)]);
        assert_eq!(result.resistances, vec![weak("WATER", 0.5)]);
        assert_eq!(result.immunities, vec!["GHOST".to_string()]);
    }
}
