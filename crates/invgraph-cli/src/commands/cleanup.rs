//! `invgraph cleanup`: delete stale data for a run.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

use invgraph_core::Schema;
use invgraph_graph::Config;

use crate::output;

#[derive(Args)]
pub struct CleanupArgs {
    /// Schema definition file
    pub schema: PathBuf,

    /// Current run id; anything with another `lastupdated` is stale
    #[arg(long)]
    pub update_tag: i64,

    /// Extra run parameter as NAME=VALUE, or NAME:TYPE=VALUE with TYPE int, float, bool or json (repeatable)
    #[arg(long = "param", value_parser = super::parse_param)]
    pub params: Vec<(String, Value)>,
}

pub async fn execute(args: CleanupArgs, config: &Config) -> Result<()> {
    let schema = super::load_schema(&args.schema)?;
    let params = super::run_parameters(args.update_tag, args.params);
    let client = super::connect(config).await?;

    let summary = match &schema {
        Schema::Node(node) => invgraph_graph::run_cleanup(&client, node, &params, &config.sync).await,
        Schema::Matchlink(link) => {
            let (label, id) = super::matchlink_scope(&params)?;
            invgraph_graph::run_cleanup_for_matchlink(&client, link, &label, id, args.update_tag, &config.sync).await
        }
    }
    .with_context(|| format!("Cleanup failed for {}", schema.label()))?;

    output::print_cleanup_summary(schema.label(), &summary);
    Ok(())
}
