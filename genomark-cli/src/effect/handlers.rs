use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::ArgMatches;
use rayon::prelude::*;
use serde::Serialize;

use genomark_core::models::Variant;
use genomark_markers::{EffectContext, EffectWarning, Genome, VariantEffect};

use crate::common::{load_config, load_genome, read_variants, write_json_lines};

/// Effects of one variant, as written to the output.
#[derive(Debug, Serialize)]
pub struct EffectRecord {
    pub variant: String,
    pub effects: Vec<VariantEffect>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<EffectWarning>,
}

pub fn run_effect(matches: &ArgMatches) -> Result<()> {
    if let Some(threads) = matches.get_one::<usize>("threads") {
        rayon::ThreadPoolBuilder::new()
            .num_threads(*threads)
            .build_global()
            .context("Failed to set up the thread pool")?;
    }

    let config = load_config(matches.get_one::<String>("config"))?;
    let genome = load_genome(matches, &config)?;
    let variants = read_variants(
        matches.get_many::<String>("variants").map(|v| v.collect()),
        matches.get_one::<String>("variant-file"),
    )?;
    log::info!("Resolving effects of {} variants", variants.len());

    let ctx = EffectContext::new(&config);
    let records = effect_records(&genome, &variants, &ctx);

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_json_lines(&mut writer, &records)?;
    Ok(())
}

///
/// Resolve every variant against the (read-only) genome in parallel. The
/// output keeps the input order.
///
pub fn effect_records(genome: &Genome, variants: &[Variant], ctx: &EffectContext<'_>) -> Vec<EffectRecord> {
    variants
        .par_iter()
        .map(|variant| {
            let effects = genome.variant_effect(variant, ctx);
            let warnings = effects.warnings().to_vec();
            EffectRecord {
                variant: variant.to_string(),
                effects: effects.into_vec(),
                warnings,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::genome;
    use genomark_markers::{EffectConfig, EffectType, WarningType};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_effect_records_keep_order() {
        let genome = genome();
        let config = EffectConfig::default();
        let ctx = EffectContext::new(&config);
        let variants: Vec<Variant> = ["chr1:1101:A:G", "chr1:1501:A:G", "chr9:10:A:G"]
            .iter()
            .map(|v| v.parse().unwrap())
            .collect();

        let records = effect_records(&genome, &variants, &ctx);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].effects[0].effect_type, EffectType::Exon);
        assert_eq!(records[1].effects[0].effect_type, EffectType::Intron);
        assert!(records[2].effects.is_empty());
        assert_eq!(records[2].warnings[0].warning, WarningType::ChromosomeNotFound);
    }
}
