use clap::{Command, arg};

use crate::common::genome_args;

pub const QUERY_CMD: &str = "query";

pub fn create_query_cli() -> Command {
    Command::new(QUERY_CMD)
        .author("Databio")
        .about("List the annotated features intersecting a region")
        .arg_required_else_help(true)
        .args(genome_args())
        .arg(arg!(<region> "Region, chr:start-end (1-based, inclusive)"))
}
