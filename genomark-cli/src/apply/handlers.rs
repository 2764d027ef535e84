use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::ArgMatches;

use genomark_core::models::Variant;
use genomark_markers::Genome;

use crate::common::{load_config, load_genome, read_variants};

pub fn run_apply(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches.get_one::<String>("config"))?;
    let genome = load_genome(matches, &config)?;
    let variants = read_variants(
        matches.get_many::<String>("variants").map(|v| v.collect()),
        matches.get_one::<String>("variant-file"),
    )?;

    let edited = apply_all(&genome, &variants)?;

    match matches.get_one::<String>("output") {
        Some(output) => edited
            .to_json_file(output)
            .with_context(|| format!("Failed to write {}", output))?,
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            serde_json::to_writer(&mut writer, &edited)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }
    Ok(())
}

///
/// Apply the variants one after the other. Each variant is expressed in the
/// coordinates produced by the previous ones.
///
pub fn apply_all(genome: &Genome, variants: &[Variant]) -> Result<Genome> {
    let mut current = genome.clone();
    for variant in variants {
        current = current
            .apply(variant)
            .with_context(|| format!("Cannot apply variant {}", variant))?;
        log::debug!("Applied {}", variant);
    }
    log::info!("Applied {} variants", variants.len());
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::genome;
    use genomark_core::models::Locus;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_apply_all_chains_variants() {
        let genome = genome();
        let variants: Vec<Variant> = [
            // two inserted bases before the gene
            "chr1:500:A:AGG",
            // three deleted intronic bases, in shifted coordinates
            "chr1:1502:ACGT:A",
        ]
        .iter()
        .map(|v| v.parse().unwrap())
        .collect();

        let edited = apply_all(&genome, &variants).unwrap();
        let gene = edited.gene("g1").unwrap();
        assert_eq!((gene.start(), gene.end()), (1002, 1998));
        assert_eq!(genome.gene("g1").unwrap().start(), 1000);
    }

    #[rstest]
    fn test_apply_all_fails_on_unknown_chromosome() {
        let variant: Variant = "chr5:10:A:G".parse().unwrap();
        assert!(apply_all(&genome(), &[variant]).is_err());
    }
}
