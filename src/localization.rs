//! Localized labels and flavor text pulled out of upstream records.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use schema::{LocalizedName, PokemonSpecies};

use crate::errors::UnknownLocaleError;

const FALLBACK_LANGUAGE: &str = "en";

/// Languages labels and flavor text can be requested in.
///
/// Parsing ignores case and surrounding whitespace; anything else is rejected
/// rather than silently producing untranslated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// The upstream language code.
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }
}

impl FromStr for Locale {
    type Err = UnknownLocaleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            code if code.eq_ignore_ascii_case("en") => Ok(Locale::En),
            code if code.eq_ignore_ascii_case("es") => Ok(Locale::Es),
            other => Err(UnknownLocaleError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = UnknownLocaleError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A flavor text entry after cleanup, tagged with its game version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorText {
    pub text: String,
    pub version: String,
}

/// The name in `language`, or `fallback` when there is none.
pub fn translated_name(names: &[LocalizedName], language: &str, fallback: &str) -> String {
    names
        .iter()
        .find(|n| n.language.name == language)
        .map(|n| n.name.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// Collapse the form feeds, newlines and runs of whitespace upstream text carries.
pub fn clean_flavor_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First flavor text entry in `language`, cleaned.
pub fn flavor_text(species: &PokemonSpecies, language: &str) -> Option<String> {
    species
        .flavor_text_entries
        .iter()
        .find(|entry| entry.language.name == language)
        .map(|entry| clean_flavor_text(&entry.flavor_text))
}

/// Every distinct flavor text in `language`, or in English when `language` has none.
pub fn unique_flavor_texts(species: &PokemonSpecies, language: &str) -> Vec<FlavorText> {
    let has_language = species
        .flavor_text_entries
        .iter()
        .any(|entry| entry.language.name == language);
    let wanted = if has_language { language } else { FALLBACK_LANGUAGE };

    let mut seen = HashSet::new();
    species
        .flavor_text_entries
        .iter()
        .filter(|entry| entry.language.name == wanted)
        .filter_map(|entry| {
            let text = clean_flavor_text(&entry.flavor_text);
            if text.is_empty() || !seen.insert(text.clone()) {
                return None;
            }
            let version = entry
                .version
                .as_ref()
                .map(|v| v.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            Some(FlavorText { text, version })
        })
        .collect()
}

/// Human-readable form of an upstream identifier: `mr-mime` becomes `Mr Mime`.
pub fn display_name(name: &str) -> String {
    name.split(|c: char| c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
