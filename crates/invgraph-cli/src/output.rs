//! Terminal output formatting.

use colored::Colorize;
use invgraph_core::{CleanupScope, CompiledQuery, MatchlinkPlan, MatchlinkSchema, NodeSchema, QueryPlan};
use invgraph_graph::{CleanupSummary, LoadSummary};

fn print_section(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(60));
}

fn print_query(query: &CompiledQuery) {
    println!("{}", query.text());
    let params: Vec<&str> = query.caller_parameters().collect();
    if !params.is_empty() {
        println!("{} {}", "params:".dimmed(), params.join(", ").yellow());
    }
}

fn print_indexes(indexes: &[String]) {
    print_section("Indexes");
    for index in indexes {
        println!("{index}");
    }
}

/// Print every query compiled for a node schema.
pub fn print_query_plan(schema: &NodeSchema) {
    let scope = match schema.cleanup_scope() {
        CleanupScope::SubResource(rel) => format!("scoped to {} via {}", rel.target_label(), rel.rel_label()),
        CleanupScope::RelationshipsOnly => "relationships only".to_string(),
        CleanupScope::Unscoped => "unscoped".to_string(),
    };
    println!("{} {} {}", "Node".bold(), schema.label().cyan().bold(), format!("({scope})").dimmed());

    let QueryPlan {
        ingestion,
        indexes,
        cleanup,
    } = schema.plan();
    print_section("Ingestion");
    print_query(ingestion);
    print_indexes(indexes);
    print_section("Cleanup");
    if cleanup.is_empty() {
        println!("{}", "No cleanup statements.".dimmed());
    }
    for (i, query) in cleanup.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_query(query);
    }
}

/// Print every query compiled for a matchlink.
pub fn print_matchlink_plan(schema: &MatchlinkSchema) {
    let rel = schema.relationship();
    println!(
        "{} {} {}",
        "Matchlink".bold(),
        schema.rel_label().cyan().bold(),
        format!("({} -> {})", schema.source_label(), rel.target_label()).dimmed()
    );

    let MatchlinkPlan {
        ingestion,
        indexes,
        cleanup,
    } = schema.plan();
    print_section("Ingestion");
    print_query(ingestion);
    print_indexes(indexes);
    print_section("Cleanup");
    print_query(cleanup);
}

pub fn print_load_summary(summary: &LoadSummary) {
    println!(
        "{} {} row(s) in {} batch(es)",
        "Loaded".green().bold(),
        summary.rows,
        summary.batches
    );
}

pub fn print_cleanup_summary(label: &str, summary: &CleanupSummary) {
    if summary.deleted == 0 {
        println!("{} {}", "Nothing stale for".dimmed(), label.cyan());
        return;
    }
    println!(
        "{} {} stale element(s) of {} ({} statement(s), {} window(s))",
        "Deleted".green().bold(),
        summary.deleted,
        label.cyan(),
        summary.statements,
        summary.windows
    );
}
