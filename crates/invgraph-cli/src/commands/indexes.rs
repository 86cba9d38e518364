//! `invgraph indexes`: create the indexes a schema needs.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use invgraph_core::Schema;
use invgraph_graph::Config;

#[derive(Args)]
pub struct IndexesArgs {
    /// Schema definition file
    pub schema: PathBuf,
}

pub async fn execute(args: IndexesArgs, config: &Config) -> Result<()> {
    let schema = super::load_schema(&args.schema)?;
    let client = super::connect(config).await?;

    let created = match &schema {
        Schema::Node(node) => {
            invgraph_graph::ensure_indexes(&client, node).await?;
            node.plan().indexes.len()
        }
        Schema::Matchlink(link) => {
            invgraph_graph::ensure_matchlink_indexes(&client, link).await?;
            link.plan().indexes.len()
        }
    };

    println!(
        "{} {} index statement(s) for {}",
        "Ensured".green().bold(),
        created,
        schema.label().cyan()
    );
    Ok(())
}
