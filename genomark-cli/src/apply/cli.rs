use clap::{Command, arg};

use crate::common::genome_args;

pub const APPLY_CMD: &str = "apply";

pub fn create_apply_cli() -> Command {
    Command::new(APPLY_CMD)
        .author("Databio")
        .about("Apply variants, in order, and write the edited genome annotation")
        .arg_required_else_help(true)
        .args(genome_args())
        .arg(arg!([variants] ... "Variants, e.g. chr1:12345:AC:A"))
        .arg(arg!(-v --"variant-file" <file> "File with one variant per line"))
        .arg(arg!(-o --output <output> "Output snapshot (JSON); stdout when absent"))
}
