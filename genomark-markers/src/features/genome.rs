use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use genomark_core::models::{Interval, Locus, Variant};
use genomark_core::utils::simple_chromosome_name;

use crate::config::EffectConfig;
use crate::effect::{EffectContext, EffectType, EffectWarning, VariantEffects, WarningType};
use crate::errors::MarkerError;
use crate::features::{Chromosome, Gene, Transcript};
use crate::marker::{Marker, MarkerLike};
use crate::sub_intervals::SubIntervals;

///
/// Root of the annotation tree: a registry of chromosomes.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    pub id: String,
    #[serde(default)]
    chromosomes: SubIntervals<Chromosome>,
}

impl Genome {
    pub fn new(id: impl Into<String>) -> Self {
        Genome {
            id: id.into(),
            chromosomes: SubIntervals::new(),
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MarkerError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MarkerError> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn chromosomes(&self) -> &SubIntervals<Chromosome> {
        &self.chromosomes
    }

    pub fn chromosome_names(&self) -> Vec<&str> {
        self.chromosomes.sorted().into_iter().map(|c| c.name()).collect()
    }

    pub fn add_chromosome(&mut self, chromosome: Chromosome) -> Option<Chromosome> {
        self.chromosomes.add(chromosome)
    }

    ///
    /// Look a chromosome up by name. `chr1`, `Chr1` and `1` name the same
    /// chromosome when there is no exact match.
    ///
    pub fn chromosome(&self, name: &str) -> Option<&Chromosome> {
        self.chromosomes.get(name).or_else(|| {
            let simple = simple_chromosome_name(name);
            self.chromosomes
                .iter()
                .find(|c| simple_chromosome_name(c.name()) == simple)
        })
    }

    pub fn chromosome_mut(&mut self, name: &str) -> Option<&mut Chromosome> {
        let exact = self.chromosomes.get(name).map(|c| c.name().to_string());
        let key = exact.or_else(|| {
            let simple = simple_chromosome_name(name);
            self.chromosomes
                .iter()
                .find(|c| simple_chromosome_name(c.name()) == simple)
                .map(|c| c.name().to_string())
        })?;
        self.chromosomes.get_mut(&key)
    }

    ///
    /// Add a gene, creating its chromosome if needed. The chromosome grows
    /// to contain the gene.
    ///
    pub fn add_gene(&mut self, gene: Gene) -> Result<(), MarkerError> {
        if self.chromosomes.get(gene.chr()).is_none() {
            self.chromosomes
                .add(Chromosome::new(gene.chr(), gene.end() + 1)?);
        }
        match self.chromosomes.get_mut(gene.chr()) {
            Some(chromosome) => chromosome.add_gene(gene),
            None => Err(MarkerError::ChromosomeNotFound(gene.chr().to_string())),
        }
    }

    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.chromosomes.iter().flat_map(|c| c.genes().iter())
    }

    pub fn transcripts(&self) -> impl Iterator<Item = &Transcript> {
        self.genes().flat_map(|g| g.transcripts().iter())
    }

    pub fn gene(&self, id: &str) -> Option<&Gene> {
        self.chromosomes.iter().find_map(|c| c.genes().get(id))
    }

    ///
    /// Run the canonicalization passes on every transcript and derive the
    /// implied features (UTRs, splice sites, flanks). Call once after the
    /// annotation is loaded and before resolving effects.
    ///
    pub fn finalize(&mut self, config: &EffectConfig) -> Result<(), MarkerError> {
        config.validate()?;
        let mut transcripts = 0;
        let mut warnings = 0;

        for chromosome in self.chromosomes.iter_mut() {
            let chr_end = chromosome.seq.has_sequence().then(|| chromosome.end());
            for gene in chromosome.genes_mut().iter_mut() {
                for tr in gene.transcripts_mut().iter_mut() {
                    if config.remove_redundant {
                        tr.remove_redundant();
                    }
                    if config.collapse_zero_gap {
                        tr.collapse_zero_gap();
                    }
                    tr.rank_exons();
                    if config.create_utrs_from_cds {
                        tr.create_utrs_from_cds();
                    }
                    tr.frame_correction(config.frame_type)?;
                    tr.adjust();
                    tr.create_splice_sites(config);
                    tr.create_up_down_stream(config.upstream_size, config.downstream_size, chr_end);

                    for warning in tr.sanity_warnings() {
                        log::warn!("{}", warning);
                        warnings += 1;
                    }
                    transcripts += 1;
                }
                gene.adjust();
            }
        }
        // gene spans may have changed
        for chromosome in self.chromosomes.iter_mut() {
            let start = chromosome.genes().iter().map(|g| g.start()).min();
            let end = chromosome.genes().iter().map(|g| g.end()).max();
            if let (Some(start), Some(end)) = (start, end) {
                let marker = chromosome.marker_mut();
                marker.set_range(marker.start().min(start), marker.end().max(end));
            }
        }

        log::info!(
            "Finalized genome '{}': {} chromosomes, {} transcripts, {} warnings",
            self.id,
            self.chromosomes.len(),
            transcripts,
            warnings
        );
        Ok(())
    }

    /// Every marker of the tree intersecting `locus`.
    pub fn query<L: Locus + ?Sized>(&self, locus: &L) -> Vec<&Marker> {
        let mut out = Vec::new();
        let Some(chromosome) = self.chromosome(locus.chr()) else {
            return out;
        };
        if chromosome.name() == locus.chr() {
            chromosome.query_into(locus, &mut out);
        } else if let Ok(renamed) =
            Interval::new(chromosome.name(), locus.start(), locus.end(), locus.strand(), locus.id())
        {
            chromosome.query_into(&renamed, &mut out);
        }
        out
    }

    ///
    /// Resolve the chromosome of `variant` and express the variant with that
    /// chromosome's own name, so aliases such as `1` for `chr1` reach the
    /// markers below it.
    ///
    fn resolve<'a, 'v>(&'a self, variant: &'v Variant) -> Option<(&'a Chromosome, Cow<'v, Variant>)> {
        let chromosome = self.chromosome(variant.chr())?;
        let variant = if chromosome.name() == variant.chr() {
            Cow::Borrowed(variant)
        } else {
            Cow::Owned(variant.clone().with_chr(chromosome.name()))
        };
        Some((chromosome, variant))
    }

    pub fn variant_effect_into(
        &self,
        variant: &Variant,
        ctx: &EffectContext<'_>,
        effects: &mut VariantEffects,
    ) -> bool {
        let Some((chromosome, variant)) = self.resolve(variant) else {
            effects.add_warning(EffectWarning::new(
                WarningType::ChromosomeNotFound,
                format!("chromosome '{}' not found", variant.chr()),
            ));
            return false;
        };
        if chromosome.variant_effect(&variant, ctx, effects) {
            return true;
        }
        let region = chromosome.intergenic_region(&variant);
        effects.add(&region, EffectType::Intergenic, "");
        true
    }

    /// All effects of `variant`, most severe first.
    pub fn variant_effect(&self, variant: &Variant, ctx: &EffectContext<'_>) -> VariantEffects {
        let mut effects = VariantEffects::new();
        self.variant_effect_into(variant, ctx, &mut effects);
        effects.sort();
        effects
    }

    ///
    /// The genome obtained after applying `variant`. Chromosomes the variant
    /// does not touch are copied unchanged.
    ///
    pub fn apply(&self, variant: &Variant) -> Result<Genome, MarkerError> {
        let (target, variant) = self
            .resolve(variant)
            .ok_or_else(|| MarkerError::ChromosomeNotFound(variant.chr().to_string()))?;
        let target = target.name();
        let chromosomes = self.chromosomes.apply_each(|c| {
            if c.name() == target {
                c.apply(&variant)
            } else {
                Ok(Some(c.clone()))
            }
        })?;
        Ok(Genome {
            id: self.id.clone(),
            chromosomes,
        })
    }
}
