use clap::{Command, arg};

use crate::common::genome_args;

pub const EFFECT_CMD: &str = "effect";

pub fn create_effect_cli() -> Command {
    Command::new(EFFECT_CMD)
        .author("Databio")
        .about("Resolve the effects of variants (chr:pos:ref:alt, 1-based) on a genome annotation")
        .arg_required_else_help(true)
        .args(genome_args())
        .arg(arg!([variants] ... "Variants, e.g. chr1:12345:A:G or chr1:100-200"))
        .arg(arg!(-v --"variant-file" <file> "File with one variant per line"))
        .arg(arg!(-t --threads <threads> "Number of worker threads").value_parser(clap::value_parser!(usize)))
}
