use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant};

use crate::effect::{EffectContext, EffectType, VariantEffects};
use crate::errors::MarkerError;
use crate::features::Gene;
use crate::features::transcript::widen;
use crate::marker::{Marker, MarkerKind, MarkerLike, impl_locus};
use crate::marker_seq::SeqMarker;
use crate::sub_intervals::SubIntervals;

///
/// A chromosome: its (optional) sequence and its genes. The chromosome
/// spans `[0, length - 1]`.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chromosome {
    #[serde(flatten)]
    pub seq: SeqMarker,
    #[serde(default)]
    genes: SubIntervals<Gene>,
}

impl_locus!(Chromosome, seq.marker);

impl Chromosome {
    /// A chromosome of `length` bases; fails unless `length >= 1`.
    pub fn new(name: impl Into<String>, length: Pos) -> Result<Self, MarkerError> {
        let name = name.into();
        let marker = Marker::new(
            name.clone(),
            0,
            length - 1,
            Strand::Plus,
            name,
            MarkerKind::Chromosome,
        )?;
        Ok(Chromosome {
            seq: SeqMarker::new(marker),
            genes: SubIntervals::new(),
        })
    }

    /// Chromosome sized to its sequence.
    pub fn with_sequence(name: impl Into<String>, sequence: &str) -> Result<Self, MarkerError> {
        let mut chromosome = Chromosome::new(name, sequence.len() as Pos)?;
        chromosome.seq.set_sequence(sequence);
        Ok(chromosome)
    }

    pub fn name(&self) -> &str {
        self.id()
    }

    pub fn genes(&self) -> &SubIntervals<Gene> {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut SubIntervals<Gene> {
        &mut self.genes
    }

    /// Add a gene; the chromosome grows to contain it.
    pub fn add_gene(&mut self, mut gene: Gene) -> Result<(), MarkerError> {
        if gene.chr() != self.name() {
            return Err(MarkerError::ChromosomeMismatch {
                child: gene.id().to_string(),
                chr: self.name().to_string(),
            });
        }
        widen(&mut self.seq.marker, &gene);
        gene.set_parent(self.seq.marker.as_parent());
        self.genes.add(gene);
        Ok(())
    }

    ///
    /// Region between the closest genes left and right of the variant,
    /// named after them.
    ///
    pub fn intergenic_region(&self, variant: &Variant) -> Marker {
        let left = self
            .genes
            .iter()
            .filter(|g| g.end() < variant.start())
            .max_by_key(|g| g.end());
        let right = self
            .genes
            .iter()
            .filter(|g| g.start() > variant.end())
            .min_by_key(|g| g.start());

        let start = left.map_or(self.start(), |g| g.end() + 1);
        let end = right.map_or(self.end().max(variant.end()), |g| g.start() - 1);
        let label = |g: &Gene| {
            if g.name.is_empty() {
                g.id().to_string()
            } else {
                g.name.clone()
            }
        };
        let id = [left.map(label), right.map(label)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("-");

        let mut marker = self.seq.marker.clone();
        marker.set_range(start.min(variant.start()), end.max(variant.end()));
        marker.interval.id = id;
        marker.kind = MarkerKind::Intergenic;
        marker.parent = Some(self.seq.marker.as_parent());
        marker
    }

    pub fn variant_effect(
        &self,
        variant: &Variant,
        ctx: &EffectContext<'_>,
        effects: &mut VariantEffects,
    ) -> bool {
        if !self.same_chr(variant) {
            return false;
        }
        if variant.is_del() && variant.includes(self) {
            effects.add(&self.seq.marker, EffectType::ChromosomeLargeDeletion, "");
            return true;
        }
        let mut hit = false;
        for gene in self.genes.iter() {
            hit |= gene.variant_effect(variant, ctx, effects);
        }
        hit
    }

    pub fn apply(&self, variant: &Variant) -> Result<Option<Chromosome>, MarkerError> {
        let Some(seq) = self.seq.apply(variant)? else {
            return Ok(None);
        };
        Ok(Some(Chromosome {
            seq,
            genes: self.genes.apply_each(|g| g.apply(variant))?,
        }))
    }
}

impl MarkerLike for Chromosome {
    fn marker(&self) -> &Marker {
        &self.seq.marker
    }

    fn marker_mut(&mut self) -> &mut Marker {
        &mut self.seq.marker
    }

    fn query_into<'a, L: Locus + ?Sized>(&'a self, locus: &L, out: &mut Vec<&'a Marker>) {
        if !self.same_chr(locus) {
            return;
        }
        if self.intersects(locus) {
            out.push(&self.seq.marker);
        }
        self.genes.query_into(locus, out);
    }
}
