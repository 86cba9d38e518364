//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

use invgraph_core::Schema;
use invgraph_graph::{Config, GraphClient, Parameters};

pub mod cleanup;
pub mod compile;
pub mod indexes;
pub mod load;
pub mod status;

/// Schema-driven graph ingestion and staleness cleanup for Neo4j
#[derive(Parser)]
#[command(name = "invgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to invgraph.toml
    #[arg(short, long, global = true, env = "INVGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Neo4j bolt URI, overrides the config file
    #[arg(long, global = true, env = "NEO4J_URI")]
    pub uri: Option<String>,

    /// Neo4j user, overrides the config file
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub user: Option<String>,

    /// Neo4j password, overrides the config file
    #[arg(long, global = true, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the compiled ingestion, index and cleanup queries of a schema
    Compile(compile::CompileArgs),

    /// Create the indexes a schema needs
    Indexes(indexes::IndexesArgs),

    /// Load rows from a JSON file
    Load(load::LoadArgs),

    /// Delete data not touched by the given run
    Cleanup(cleanup::CleanupArgs),

    /// Show graph node and relationship counts
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.resolve_config()?;
        match self.command {
            Commands::Compile(args) => compile::execute(args),
            Commands::Indexes(args) => indexes::execute(args, &config).await,
            Commands::Load(args) => load::execute(args, &config).await,
            Commands::Cleanup(args) => cleanup::execute(args, &config).await,
            Commands::Status => status::execute(&config).await,
        }
    }

    /// Config file (or defaults) with command line and environment overrides applied.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path).with_context(|| format!("Failed to read config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(uri) = &self.uri {
            config.graph.uri = uri.clone();
        }
        if let Some(user) = &self.user {
            config.graph.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.graph.password = password.clone();
        }
        Ok(config)
    }
}

/// Read and validate a schema definition file.
pub(crate) fn load_schema(path: &Path) -> Result<Schema> {
    invgraph_core::definition::load(path).with_context(|| format!("Invalid schema definition {}", path.display()))
}

pub(crate) async fn connect(config: &Config) -> Result<GraphClient> {
    GraphClient::connect(&config.graph)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", config.graph.uri))
}

/// clap value parser for `--param NAME=VALUE` and `--param NAME:TYPE=VALUE`.
pub(crate) fn parse_param(raw: &str) -> std::result::Result<(String, Value), String> {
    Parameters::parse_assignment(raw)
}

/// Run parameters for `update_tag` plus any `--param` assignments.
pub(crate) fn run_parameters(update_tag: i64, extra: Vec<(String, Value)>) -> Parameters {
    let mut params = Parameters::for_run(update_tag);
    params.extend(extra);
    params
}

/// The matchlink scope (`_sub_resource_label`, `_sub_resource_id`) from the run parameters.
pub(crate) fn matchlink_scope(params: &Parameters) -> Result<(String, Value)> {
    use invgraph_core::schema::{SUB_RESOURCE_ID, SUB_RESOURCE_LABEL};

    let label = params
        .get(SUB_RESOURCE_LABEL)
        .and_then(Value::as_str)
        .with_context(|| format!("Matchlink cleanup needs --param {SUB_RESOURCE_LABEL}=<label>"))?;
    let id = params
        .get(SUB_RESOURCE_ID)
        .with_context(|| format!("Matchlink cleanup needs --param {SUB_RESOURCE_ID}=<id>"))?;
    Ok((label.to_string(), id.clone()))
}
