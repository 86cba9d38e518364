//! `invgraph load`: load rows, optionally followed by cleanup.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use invgraph_core::Schema;
use invgraph_graph::{CleanupJob, Config};

use crate::output;

#[derive(Args)]
pub struct LoadArgs {
    /// Schema definition file
    pub schema: PathBuf,

    /// JSON file holding an array of row objects
    pub rows: PathBuf,

    /// Run id written to `lastupdated` and used as `UPDATE_TAG`
    #[arg(long)]
    pub update_tag: i64,

    /// Extra run parameter as NAME=VALUE, or NAME:TYPE=VALUE with TYPE int, float, bool or json (repeatable)
    #[arg(long = "param", value_parser = super::parse_param)]
    pub params: Vec<(String, Value)>,

    /// Run cleanup for this update tag after loading
    #[arg(long)]
    pub cleanup: bool,
}

fn read_rows(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a JSON array of rows", path.display()))
}

pub async fn execute(args: LoadArgs, config: &Config) -> Result<()> {
    let schema = super::load_schema(&args.schema)?;
    let rows = read_rows(&args.rows)?;
    let params = super::run_parameters(args.update_tag, args.params);
    let client = super::connect(config).await?;

    println!("{} {} row(s) into {}", "Loading".bold(), rows.len(), schema.label().cyan());

    let summary = match &schema {
        Schema::Node(node) => invgraph_graph::load(&client, node, &rows, &params, &config.sync).await,
        Schema::Matchlink(link) => invgraph_graph::load_matchlinks(&client, link, &rows, &params, &config.sync).await,
    }
    .with_context(|| format!("Failed to load {}", schema.label()))?;
    output::print_load_summary(&summary);

    if args.cleanup {
        let job = match &schema {
            Schema::Node(node) => CleanupJob::from_node_schema(node, &params)?,
            Schema::Matchlink(link) => {
                let (label, id) = super::matchlink_scope(&params)?;
                CleanupJob::from_matchlink(link, &label, id, args.update_tag)
            }
        };
        let summary = job.run(&client, &config.sync).await.context("Cleanup failed")?;
        output::print_cleanup_summary(job.label(), &summary);
    }

    Ok(())
}
