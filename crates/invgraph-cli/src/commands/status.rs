//! `invgraph status`: graph counts.

use anyhow::Result;
use colored::Colorize;

use invgraph_graph::Config;

pub async fn execute(config: &Config) -> Result<()> {
    let client = super::connect(config).await?;
    let counts = client.get_counts().await?;

    println!("{}", "Graph Status".bold());
    println!("{}", "─".repeat(40));
    println!("  {}: {}", "URI".bold(), config.graph.uri);
    println!("  {}: {}", "Nodes".bold(), counts.nodes.to_string().cyan());
    println!("  {}: {}", "Relationships".bold(), counts.relationships.to_string().cyan());
    Ok(())
}
