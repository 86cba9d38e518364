//! `invgraph compile`: show what a schema compiles to.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use invgraph_core::Schema;

use crate::output;

#[derive(Args)]
pub struct CompileArgs {
    /// Schema definition file
    pub schema: PathBuf,
}

pub fn execute(args: CompileArgs) -> Result<()> {
    match super::load_schema(&args.schema)? {
        Schema::Node(schema) => output::print_query_plan(&schema),
        Schema::Matchlink(schema) => output::print_matchlink_plan(&schema),
    }
    Ok(())
}
