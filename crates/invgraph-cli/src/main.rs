//! invgraph CLI
//!
//! Compiles schema definitions to Cypher, loads rows into Neo4j, and runs
//! staleness cleanup.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::Cli;

/// Initialize tracing. `RUST_LOG` wins; otherwise `--verbose` picks debug.
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "invgraph=debug,invgraph_graph=debug,invgraph_core=debug"
    } else {
        "invgraph=info,invgraph_graph=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.execute().await
}
