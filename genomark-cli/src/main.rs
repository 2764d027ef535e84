mod apply;
mod common;
mod effect;
mod query;

use anyhow::Result;
use clap::{Command, arg};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "genomark";
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Apply sequence variants to genome annotations and resolve their effects on genes, transcripts and exons.")
        .subcommand_required(true)
        .arg(arg!(--"log-level" <level> "Log filter (error, warn, info, debug, trace); RUST_LOG takes precedence").global(true))
        .subcommand(effect::cli::create_effect_cli())
        .subcommand(apply::cli::create_apply_cli())
        .subcommand(query::cli::create_query_cli())
}

fn init_logging(level: Option<&String>) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(level.map_or(consts::DEFAULT_LOG_LEVEL, |l| l.as_str())),
    };
    // a logger may already be installed (tests)
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();
    init_logging(matches.get_one::<String>("log-level"));

    match matches.subcommand() {
        //
        // EFFECT
        //
        Some((effect::cli::EFFECT_CMD, matches)) => {
            effect::handlers::run_effect(matches)?;
        }

        //
        // APPLY
        //
        Some((apply::cli::APPLY_CMD, matches)) => {
            apply::handlers::run_apply(matches)?;
        }

        //
        // QUERY
        //
        Some((query::cli::QUERY_CMD, matches)) => {
            query::handlers::run_query(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
