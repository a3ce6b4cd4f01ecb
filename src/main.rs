use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pokedex_enrichment::{
    build_evolution_tree, calculate_type_effectiveness, collect_stages, EnrichmentService, Locale,
    PokeApiClient, Settings, StaticTypeChart,
};

/// Enriched Pokedex data: evolution trees and type effectiveness
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML settings file, layered over the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full enriched record for one pokemon
    Enrich {
        name: String,
        /// Language for labels and flavor text, `en` or `es` (defaults to the configured one)
        #[arg(short, long)]
        lang: Option<Locale>,
    },
    /// Weaknesses, resistances and immunities for a set of own types
    Effectiveness {
        #[arg(required = true, num_args = 1..=2)]
        types: Vec<String>,
        /// Use the built-in type chart instead of the upstream API
        #[arg(long)]
        offline: bool,
    },
    /// Evolution tree and stages for a species
    Evolution { name: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EvolutionOutput<T, S> {
    evolution_tree: T,
    evolution_stages: S,
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(cli.config.as_deref())?;
    info!(base_url = %settings.base_url, "settings loaded");

    let output = match cli.command {
        Commands::Enrich { name, lang } => {
            let locale = lang.unwrap_or(settings.default_language);
            let service = EnrichmentService::from_settings(&settings)?;
            serde_json::to_string_pretty(&service.enrich(&name, locale).await?)?
        }
        Commands::Effectiveness { types, offline } => {
            let result = if offline {
                calculate_type_effectiveness(types.as_slice(), &StaticTypeChart).await
            } else {
                let client = PokeApiClient::from_settings(&settings)?;
                calculate_type_effectiveness(types.as_slice(), &client).await
            };
            serde_json::to_string_pretty(&result)?
        }
        Commands::Evolution { name } => {
            let client = PokeApiClient::from_settings(&settings)?;
            let chain_url = client
                .fetch_species(&name)
                .await
                .and_then(|species| species.evolution_chain)
                .map(|reference| reference.url)
                .ok_or_else(|| format!("No evolution chain reference for {}", name))?;
            let chain = client
                .fetch_evolution_chain(&chain_url)
                .await
                .ok_or_else(|| format!("Evolution chain unavailable: {}", chain_url))?;

            let tree = build_evolution_tree(&chain.chain)?;
            let stages = collect_stages(&tree);
            serde_json::to_string_pretty(&EvolutionOutput {
                evolution_tree: &tree,
                evolution_stages: &stages,
            })?
        }
    };

    println!("{}", output);
    Ok(())
}
