use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use genomark_core::models::{Interval, Locus, Pos, Strand, Variant};

use crate::effect::{EffectContext, EffectType, VariantEffects};
use crate::errors::MarkerError;
use crate::features::Transcript;
use crate::features::transcript::widen;
use crate::marker::{Marker, MarkerKind, MarkerLike, impl_locus};
use crate::sub_intervals::SubIntervals;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    #[serde(flatten)]
    pub marker: Marker,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biotype: Option<String>,
    #[serde(default)]
    transcripts: SubIntervals<Transcript>,
}

impl_locus!(Gene, marker);

impl Gene {
    pub fn new(
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, MarkerError> {
        Ok(Gene {
            marker: Marker::new(chr, start, end, strand, id, MarkerKind::Gene)?,
            name: name.into(),
            biotype: None,
            transcripts: SubIntervals::new(),
        })
    }

    pub fn with_biotype(mut self, biotype: impl Into<String>) -> Self {
        self.biotype = Some(biotype.into());
        self
    }

    pub fn transcripts(&self) -> &SubIntervals<Transcript> {
        &self.transcripts
    }

    pub fn transcripts_mut(&mut self) -> &mut SubIntervals<Transcript> {
        &mut self.transcripts
    }

    /// Add a transcript, growing the gene if needed.
    pub fn add_transcript(&mut self, mut transcript: Transcript) -> Result<(), MarkerError> {
        if !self.same_chr(&transcript) {
            return Err(MarkerError::ChromosomeMismatch {
                child: transcript.id().to_string(),
                chr: self.chr().to_string(),
            });
        }
        widen(&mut self.marker, &transcript);
        transcript.set_parent(self.marker.as_parent());
        self.transcripts.add(transcript);
        Ok(())
    }

    pub fn is_protein_coding(&self) -> bool {
        self.transcripts.iter().any(|t| t.protein_coding)
    }

    ///
    /// Canonical transcript: the protein coding transcript with the longest
    /// coding sequence or, for non coding genes, the longest transcript.
    /// Ties go to the smallest id.
    ///
    pub fn canonical(&self) -> Option<&Transcript> {
        let coding = self.is_protein_coding();
        let length = |t: &Transcript| {
            if coding {
                t.cds_length()
            } else if t.exons().is_empty() {
                t.len()
            } else {
                t.exonic_length()
            }
        };
        self.transcripts
            .iter()
            .filter(|t| !coding || t.protein_coding)
            .max_by(|a, b| match length(a).cmp(&length(b)) {
                Ordering::Equal => b.id().cmp(a.id()),
                other => other,
            })
    }

    /// Shrink or grow the gene to the span of its transcripts.
    pub fn adjust(&mut self) -> bool {
        let mut changed = false;
        for tr in self.transcripts.iter_mut() {
            changed |= tr.adjust();
        }
        let span = self
            .transcripts
            .iter()
            .map(|t| (t.start(), t.end()))
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)));
        if let Some((start, end)) = span {
            if (start, end) != (self.start(), self.end()) {
                self.marker.set_range(start, end);
                changed = true;
            }
        }
        changed
    }

    /// Parts of the gene not covered by any transcript.
    pub fn intragenic_regions(&self) -> Vec<Marker> {
        let mut pieces = vec![self.marker.interval.clone()];
        for tr in self.transcripts.iter() {
            pieces = pieces.into_iter().flat_map(|p| p.minus(tr)).collect();
        }
        pieces
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let interval = Interval {
                    id: format!("{}_intragenic_{}", self.id(), i + 1),
                    strand: self.strand(),
                    ..p
                };
                Marker::from_interval(interval, MarkerKind::Intragenic)
                    .with_parent(self.marker.as_parent())
            })
            .collect()
    }

    /// Does the variant touch the gene or one of its flanks?
    pub fn intersects_with_flanks(&self, variant: &Variant) -> bool {
        self.intersects(variant)
            || self.transcripts.iter().any(|t| {
                t.upstream()
                    .into_iter()
                    .chain(t.downstream())
                    .any(|f| f.intersects(variant))
            })
    }

    pub fn variant_effect(
        &self,
        variant: &Variant,
        ctx: &EffectContext<'_>,
        effects: &mut VariantEffects,
    ) -> bool {
        if !self.intersects_with_flanks(variant) {
            return false;
        }
        let mark = effects.mark();

        if variant.is_del() && variant.includes(self) {
            effects.add(&self.marker, EffectType::GeneDeleted, "");
        } else {
            if self.intersects(variant) {
                let mut hit = false;
                for tr in self.transcripts.iter() {
                    hit |= tr.variant_effect(variant, ctx, effects);
                }
                if !hit {
                    let regions = self.intragenic_regions();
                    let marker = regions
                        .iter()
                        .find(|r| r.intersects(variant))
                        .unwrap_or(&self.marker);
                    effects.add(marker, EffectType::Intragenic, "");
                }
            }
            for tr in self.transcripts.iter().filter(|t| !t.intersects(variant)) {
                tr.up_down_effect(variant, effects);
            }
        }

        for effect in effects.since(mark) {
            effect.gene_id.get_or_insert_with(|| self.id().to_string());
        }
        true
    }

    pub fn apply(&self, variant: &Variant) -> Result<Option<Gene>, MarkerError> {
        let Some(marker) = self.marker.apply(variant)? else {
            return Ok(None);
        };
        Ok(Some(Gene {
            marker,
            name: self.name.clone(),
            biotype: self.biotype.clone(),
            transcripts: self.transcripts.apply_each(|t| t.apply(variant))?,
        }))
    }
}

impl MarkerLike for Gene {
    fn marker(&self) -> &Marker {
        &self.marker
    }

    fn marker_mut(&mut self) -> &mut Marker {
        &mut self.marker
    }

    fn query_into<'a, L: Locus + ?Sized>(&'a self, locus: &L, out: &mut Vec<&'a Marker>) {
        if self.intersects(locus) {
            out.push(&self.marker);
        }
        // flanks reach outside the gene
        self.transcripts.query_into(locus, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectConfig;
    use crate::features::Exon;
    use crate::features::transcript::tests::coding_transcript;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn transcript(id: &str, start: Pos, end: Pos, coding: bool) -> Transcript {
        let mut tr = Transcript::new("chr1", start, end, Strand::Plus, id)
            .unwrap()
            .with_protein_coding(coding);
        tr.add_exon(Exon::new("chr1", start, end, Strand::Plus, format!("{}_ex", id)).unwrap())
            .unwrap();
        tr
    }

    #[fixture]
    fn gene() -> Gene {
        let mut gene = Gene::new("chr1", 100, 1000, Strand::Plus, "g1", "GENE1").unwrap();
        gene.add_transcript(transcript("t1", 100, 300, false)).unwrap();
        gene.add_transcript(transcript("t2", 600, 1000, false)).unwrap();
        gene
    }

    #[rstest]
    fn test_intragenic_regions(gene: Gene) {
        let regions = gene.intragenic_regions();
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].start(), regions[0].end()), (301, 599));
        assert_eq!(regions[0].kind, MarkerKind::Intragenic);
    }

    #[rstest]
    fn test_intragenic_effect(gene: Gene) {
        let config = EffectConfig::default();
        let ctx = EffectContext::new(&config);
        let mut effects = VariantEffects::new();
        let snp = Variant::new("chr1", 450, "A", "C").unwrap();
        assert!(gene.variant_effect(&snp, &ctx, &mut effects));
        assert_eq!(effects.effect_types(), vec![EffectType::Intragenic]);
        assert_eq!(effects.iter().next().unwrap().gene_id.as_deref(), Some("g1"));
    }

    #[rstest]
    fn test_gene_deleted(gene: Gene) {
        let config = EffectConfig::default();
        let ctx = EffectContext::new(&config);
        let mut effects = VariantEffects::new();
        let del = Variant::new("chr1", 50, &"A".repeat(1000), "A").unwrap();
        assert!(gene.variant_effect(&del, &ctx, &mut effects));
        assert_eq!(effects.effect_types(), vec![EffectType::GeneDeleted]);
    }

    #[rstest]
    fn test_canonical() {
        let mut gene = Gene::new("chr1", 100, 1000, Strand::Plus, "g1", "GENE1").unwrap();
        gene.add_transcript(transcript("long_nc", 100, 1000, false)).unwrap();
        let mut coding = coding_transcript(Strand::Plus);
        coding.marker.interval.id = "coding".to_string();
        gene.add_transcript(coding).unwrap();
        assert_eq!(gene.canonical().unwrap().id(), "coding");

        let mut nc = Gene::new("chr1", 100, 1000, Strand::Plus, "g2", "GENE2").unwrap();
        nc.add_transcript(transcript("b", 100, 500, false)).unwrap();
        nc.add_transcript(transcript("a", 600, 1000, false)).unwrap();
        assert_eq!(nc.canonical().unwrap().id(), "a");
    }

    #[rstest]
    fn test_adjust(gene: Gene) {
        let mut gene = gene;
        gene.marker.set_range(0, 5000);
        assert!(gene.adjust());
        assert_eq!((gene.start(), gene.end()), (100, 1000));
    }

    #[rstest]
    fn test_apply_deletes_transcript(gene: Gene) {
        let del = Variant::new("chr1", 99, &"A".repeat(203), "A").unwrap();
        let applied = gene.apply(&del).unwrap().unwrap();
        assert_eq!(applied.transcripts().len(), 1);
        assert_eq!(applied.transcripts().get("t2").unwrap().start(), 398);
    }
}
