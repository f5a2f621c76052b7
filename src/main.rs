//! CLI entry point: generate `api.json` and `models.json` from a
//! metadata snapshot.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jamgen::config::{DEFAULT_API_PREFIX, Destination, DuplicateModelPolicy, SchemaSource};
use jamgen::{Generator, GeneratorConfig, MetadataSnapshot};

/// Generate front-end model and API descriptions from a metadata snapshot
#[derive(Debug, Parser)]
#[command(name = "jamgen", version, about)]
struct Cli {
    /// Applications to dump (all applications when omitted)
    #[arg(value_name = "APP")]
    apps: Vec<String>,

    /// Metadata registry snapshot (YAML or JSON)
    #[arg(short = 'r', long, value_name = "FILE")]
    registry: PathBuf,

    /// Output for the API document, or `-` for stdout
    #[arg(short = 'o', long, default_value = "api.json")]
    api_output: String,

    /// Output for the model document, or `-` for stdout
    #[arg(short = 'n', long, default_value = "models.json")]
    model_output: String,

    /// API path prefix
    #[arg(short = 'a', long, default_value = DEFAULT_API_PREFIX)]
    api_prefix: String,

    /// Route names to exclude from endpoint resolution
    #[arg(short = 'x', long = "exclude", value_name = "ROUTE")]
    exclude: Vec<String>,

    /// Serializer type names to exclude from endpoint resolution
    #[arg(long = "exclude-serializer", value_name = "TYPE")]
    exclude_serializers: Vec<String>,

    /// Which option bags the model document is built from
    #[arg(long, value_enum, default_value = "serializer")]
    source: SchemaSource,

    /// How duplicate model display names are handled
    #[arg(long, value_enum, default_value = "qualify")]
    on_duplicate_model: DuplicateModelPolicy,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = GeneratorConfig {
        apps: cli.apps,
        api_prefix: Some(cli.api_prefix),
        exclude_endpoints: cli.exclude,
        exclude_serializers: cli.exclude_serializers,
        schema_source: cli.source,
        duplicate_models: cli.on_duplicate_model,
    };

    let snapshot = MetadataSnapshot::from_file(&cli.registry)?;
    let generated = Generator::new(config).generate(&snapshot)?;

    generated.write_api(&Destination::parse(&cli.api_output))?;
    generated.write_models(&Destination::parse(&cli.model_output))?;
    tracing::info!(
        models = generated.models.len(),
        "generated API and model documents"
    );
    Ok(())
}
