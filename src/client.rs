//! Thin client for the upstream Pokemon data API.
//!
//! The pokemon record itself is required and its failures propagate. Every
//! other record is optional: failures of any kind are logged and read as
//! `None`, leaving the caller to degrade gracefully.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::errors::{UpstreamError, UpstreamResult};
use crate::type_source::TypeDetailsSource;
use schema::{AbilityDetails, EvolutionChain, Pokemon, PokemonSpecies, StatDetails, TypeDetails};

#[derive(Debug, Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PokeApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> UpstreamResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_settings(settings: &Settings) -> UpstreamResult<Self> {
        Self::new(settings.base_url.clone(), settings.request_timeout())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET a JSON record, bounded by the client timeout.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> UpstreamResult<T> {
        debug!(url, "fetching upstream record");
        with_timeout(url, self.timeout, self.request_json(url)).await
    }

    async fn request_json<T: DeserializeOwned>(&self, url: &str) -> UpstreamResult<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| transport(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                resource: url.to_string(),
                status,
            });
        }

        response.json::<T>().await.map_err(|source| transport(url, source))
    }

    /// Like [`get_json`](Self::get_json) but failures become `None`.
    async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        match self.get_json(url).await {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(error = %err, "optional upstream record unavailable");
                None
            }
        }
    }

    pub async fn fetch_pokemon(&self, name: &str) -> UpstreamResult<Pokemon> {
        self.get_json(&self.endpoint(&format!("pokemon/{name}"))).await
    }

    pub async fn fetch_species(&self, name: &str) -> Option<PokemonSpecies> {
        self.get_optional(&self.endpoint(&format!("pokemon-species/{name}")))
            .await
    }

    /// The chain URL comes from the species record and is used verbatim.
    pub async fn fetch_evolution_chain(&self, url: &str) -> Option<EvolutionChain> {
        self.get_optional(url).await
    }

    pub async fn fetch_type_details(&self, type_name: &str) -> Option<TypeDetails> {
        self.get_optional(&self.endpoint(&format!("type/{type_name}")))
            .await
    }

    pub async fn fetch_ability_details(&self, ability: &str) -> Option<AbilityDetails> {
        self.get_optional(&self.endpoint(&format!("ability/{ability}")))
            .await
    }

    pub async fn fetch_stat_details(&self, stat: &str) -> Option<StatDetails> {
        self.get_optional(&self.endpoint(&format!("stat/{stat}")))
            .await
    }
}

#[async_trait]
impl TypeDetailsSource for PokeApiClient {
    async fn type_details(&self, type_name: &str) -> Option<TypeDetails> {
        self.fetch_type_details(type_name).await
    }
}

async fn with_timeout<T, F>(url: &str, timeout: Duration, request: F) -> UpstreamResult<T>
where
    F: Future<Output = UpstreamResult<T>>,
{
    tokio::time::timeout(timeout, request)
        .await
        .unwrap_or_else(|_| {
            Err(UpstreamError::Timeout {
                resource: url.to_string(),
            })
        })
}

fn transport(url: &str, source: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport {
        resource: url.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Duration) -> PokeApiClient {
        PokeApiClient::new(server.uri(), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_pokemon_decodes_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/pikachu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "pikachu",
                "species": { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/" },
                "types": [{ "slot": 1, "type": { "name": "electric", "url": "" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let pokemon = client.fetch_pokemon("pikachu").await.unwrap();

        assert_eq!(pokemon.name, "pikachu");
        assert_eq!(pokemon.type_names(), vec!["electric"]);
    }

    #[tokio::test]
    async fn test_fetch_pokemon_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/missingno"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.fetch_pokemon("missingno").await.unwrap_err();

        match err {
            UpstreamError::Status { status, .. } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND)
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_optional_records_degrade_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/type/shadow"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon-species/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));

        assert!(client.fetch_type_details("shadow").await.is_none());
        assert!(client.fetch_species("broken").await.is_none());
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/type/fire"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "fire" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(50));
        assert!(client.type_details("fire").await.is_none());
    }

    #[tokio::test]
    async fn test_type_details_through_source_trait() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/type/ground"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "ground",
                "damage_relations": {
                    "double_damage_from": [{ "name": "water", "url": "" }],
                    "no_damage_from": [{ "name": "electric", "url": "" }]
                },
                "names": [{ "name": "Tierra", "language": { "name": "es", "url": "" } }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let details = client.type_details("ground").await.unwrap();

        assert_eq!(details.damage_relations.no_damage_from[0].name, "electric");
        assert_eq!(details.names[0].name, "Tierra");
    }
}
