use std::io::{self, BufWriter};

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use serde::Serialize;

use genomark_core::models::{Locus, Pos, Variant};
use genomark_markers::{Genome, MarkerKind, ParentRef};

use crate::common::{load_config, load_genome, write_json_lines};

/// One intersecting feature; coordinates are 1-based like the query.
#[derive(Debug, Serialize, PartialEq)]
pub struct QueryRecord {
    pub kind: MarkerKind,
    pub id: String,
    pub chr: String,
    pub start: Pos,
    pub end: Pos,
    pub strand: char,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
}

pub fn run_query(matches: &ArgMatches) -> Result<()> {
    let region = matches
        .get_one::<String>("region")
        .context("A region is required.")?;
    let region: Variant = region
        .parse()
        .with_context(|| format!("Invalid region '{}'", region))?;
    if !region.is_interval() {
        bail!("Expected a region (chr:start-end), got a variant: {}", region);
    }

    let config = load_config(matches.get_one::<String>("config"))?;
    let genome = load_genome(matches, &config)?;
    let records = query_records(&genome, &region);
    log::info!("{} features intersect {}", records.len(), region);

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_json_lines(&mut writer, &records)?;
    Ok(())
}

pub fn query_records<L: Locus + ?Sized>(genome: &Genome, region: &L) -> Vec<QueryRecord> {
    genome
        .query(region)
        .into_iter()
        .map(|m| QueryRecord {
            kind: m.kind,
            id: m.id().to_string(),
            chr: m.chr().to_string(),
            start: m.start() + 1,
            end: m.end() + 1,
            strand: m.strand().as_char(),
            parent: m.parent.clone(),
        })
        .collect()
}
