use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, arg};
use serde::Serialize;

use genomark_core::models::Variant;
use genomark_markers::{EffectConfig, Genome};

/// Arguments shared by every subcommand that loads a genome.
pub fn genome_args() -> Vec<Arg> {
    vec![
        arg!(-g --genome <genome> "Genome annotation snapshot (JSON)").required(true),
        arg!(-c --config <config> "Engine configuration (TOML); defaults are used when absent"),
        arg!(--finalized "The snapshot is already finalized, skip canonicalization")
            .action(ArgAction::SetTrue),
    ]
}

pub fn load_config(path: Option<&String>) -> Result<EffectConfig> {
    match path {
        Some(path) => EffectConfig::from_toml_file(path)
            .with_context(|| format!("Failed to read configuration from {}", path)),
        None => Ok(EffectConfig::default()),
    }
}

pub fn load_genome(matches: &ArgMatches, config: &EffectConfig) -> Result<Genome> {
    let path = matches
        .get_one::<String>("genome")
        .context("A path to a genome snapshot is required.")?;
    let mut genome = Genome::from_json_file(path)
        .with_context(|| format!("Failed to load genome from {}", path))?;
    if !matches.get_flag("finalized") {
        genome.finalize(config)?;
    }
    log::info!(
        "Loaded genome '{}' ({} chromosomes)",
        genome.id,
        genome.chromosomes().len()
    );
    Ok(genome)
}

///
/// Variants given on the command line, followed by the ones listed in a
/// file (one per line, `#` comments allowed).
///
pub fn read_variants(inline: Option<Vec<&String>>, file: Option<&String>) -> Result<Vec<Variant>> {
    let mut variants = Vec::new();
    for v in inline.unwrap_or_default() {
        variants.push(
            v.parse::<Variant>()
                .with_context(|| format!("Invalid variant '{}'", v))?,
        );
    }
    if let Some(file) = file {
        variants.extend(read_variant_file(Path::new(file))?);
    }
    Ok(variants)
}

fn read_variant_file(path: &Path) -> Result<Vec<Variant>> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
    );
    let mut variants = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let variant = line
            .parse::<Variant>()
            .with_context(|| format!("{}:{}: invalid variant '{}'", path.display(), n + 1, line))?;
        variants.push(variant);
    }
    Ok(variants)
}

/// Write one JSON document per line.
pub fn write_json_lines<W: Write, T: Serialize>(writer: &mut W, records: &[T]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use genomark_core::models::{Locus, Strand};
    use genomark_markers::{Exon, Gene, Transcript};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    /// Two exon non-coding gene on chr1.
    pub(crate) fn genome() -> Genome {
        let mut tr = Transcript::new("chr1", 1000, 1999, Strand::Plus, "tr1").unwrap();
        tr.add_exon(Exon::new("chr1", 1000, 1199, Strand::Plus, "ex1").unwrap())
            .unwrap();
        tr.add_exon(Exon::new("chr1", 1800, 1999, Strand::Plus, "ex2").unwrap())
            .unwrap();
        let mut gene = Gene::new("chr1", 1000, 1999, Strand::Plus, "g1", "GENE1").unwrap();
        gene.add_transcript(tr).unwrap();

        let mut genome = Genome::new("test");
        genome.add_gene(gene).unwrap();
        genome.finalize(&EffectConfig::default()).unwrap();
        genome
    }

    #[rstest]
    fn test_read_variants() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# header").unwrap();
        writeln!(file, "chr1:1501:A:G").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "chr1:1000-1010").unwrap();

        let inline = "chr1:10:A:-".to_string();
        let path = file.path().to_string_lossy().to_string();
        let variants = read_variants(Some(vec![&inline]), Some(&path)).unwrap();
        assert_eq!(variants.len(), 3);
        assert!(variants[0].is_del());
        assert_eq!(variants[1].start(), 1500);
        assert!(variants[2].is_interval());
    }

    #[rstest]
    fn test_read_variants_reports_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chr1:0:A:G").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let err = read_variants(None, Some(&path)).unwrap_err();
        assert!(format!("{}", err).contains(":1:"));
    }

    #[rstest]
    fn test_load_config_defaults() {
        assert_eq!(load_config(None).unwrap(), EffectConfig::default());
    }

    #[rstest]
    fn test_write_json_lines() {
        let mut out = Vec::new();
        write_json_lines(&mut out, &[1, 2]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n2\n");
    }
}
