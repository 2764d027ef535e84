use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant};
use genomark_core::utils::{complement, reverse_complement};

use crate::codon::CodonTable;
use crate::effect::{EffectContext, EffectType, VariantEffect, VariantEffects};
use crate::errors::MarkerError;
use crate::features::Transcript;
use crate::marker::{Marker, MarkerKind, MarkerLike, impl_marker};

/// 5' or 3' untranslated region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utr {
    #[serde(flatten)]
    pub marker: Marker,
}

impl_marker!(Utr, marker);

impl Utr {
    pub fn new(
        kind: MarkerKind,
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
    ) -> Result<Self, MarkerError> {
        if !kind.is_utr() {
            return Err(MarkerError::InvalidKind {
                expected: "UTR".to_string(),
                found: kind.to_string(),
            });
        }
        Ok(Utr {
            marker: Marker::new(chr, start, end, strand, id, kind)?,
        })
    }

    pub fn is_5prime(&self) -> bool {
        self.marker.kind == MarkerKind::Utr5Prime
    }

    pub fn is_3prime(&self) -> bool {
        self.marker.kind == MarkerKind::Utr3Prime
    }

    pub fn apply(&self, variant: &Variant) -> Result<Option<Utr>, MarkerError> {
        Ok(self.marker.apply(variant)?.map(|marker| Utr { marker }))
    }

    ///
    /// Number of exonic bases from the variant to the coding start (5'UTR)
    /// or from the coding end (3'UTR). A variant right next to the coding
    /// region is at distance 1.
    ///
    pub fn utr_distance(&self, variant: &Variant, transcript: &Transcript) -> Option<Pos> {
        let plus = transcript.is_strand_plus();
        let range = if self.is_5prime() {
            let cds_start = transcript.cds_start()?;
            match plus {
                true if variant.end() < cds_start => (variant.end() + 1, cds_start - 1),
                false if variant.start() > cds_start => (cds_start + 1, variant.start() - 1),
                _ => return None,
            }
        } else {
            let cds_end = transcript.cds_end()?;
            match plus {
                true if variant.start() > cds_end => (cds_end + 1, variant.start() - 1),
                false if variant.end() < cds_end => (variant.end() + 1, cds_end - 1),
                _ => return None,
            }
        };
        Some(transcript.exonic_bases_between(range.0, range.1) + 1)
    }

    ///
    /// Does a SNP in this 5'UTR create a new start codon? Returns the new
    /// codon.
    ///
    pub fn start_gained(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        table: &dyn CodonTable,
    ) -> Option<String> {
        if !variant.is_snp() || !self.is_5prime() || !self.intersects(variant) {
            return None;
        }
        let minus = transcript.is_strand_minus();

        // 5'UTR sequence in transcript orientation
        let mut utr_seq = String::new();
        let mut index = None;
        for utr in transcript
            .utrs()
            .sorted_strand(transcript.strand())
            .into_iter()
            .filter(|u| u.is_5prime())
        {
            let exon = transcript.exons().iter().find(|e| e.includes(utr))?;
            let plus = exon.seq.plus_subsequence(utr.start(), utr.end())?;
            if utr.intersects_pos(variant.start()) {
                let offset = if minus {
                    utr.end() - variant.start()
                } else {
                    variant.start() - utr.start()
                };
                index = Some(utr_seq.len() + offset as usize);
            }
            if minus {
                utr_seq.push_str(&reverse_complement(&plus));
            } else {
                utr_seq.push_str(&plus);
            }
        }
        let index = index?;

        let base = variant.alternative().chars().next()?;
        let base = if minus { complement(base) } else { base };
        let mut alt_seq = utr_seq.clone().into_bytes();
        alt_seq[index] = base as u8;
        let alt_seq = String::from_utf8_lossy(&alt_seq).to_string();

        (index.saturating_sub(2)..=index)
            .filter(|&i| i + 3 <= utr_seq.len())
            .find(|&i| table.is_start(&alt_seq[i..i + 3]) && !table.is_start(&utr_seq[i..i + 3]))
            .map(|i| alt_seq[i..i + 3].to_string())
    }

    pub fn variant_effect(
        &self,
        variant: &Variant,
        transcript: Option<&Transcript>,
        ctx: &EffectContext<'_>,
        effects: &mut VariantEffects,
    ) -> bool {
        if !self.intersects(variant) {
            return false;
        }
        if variant.is_del() && variant.includes(self) {
            let effect_type = if self.is_5prime() {
                EffectType::Utr5Deleted
            } else {
                EffectType::Utr3Deleted
            };
            effects.add(&self.marker, effect_type, "");
            return true;
        }

        let mut effect = VariantEffect::new(&self.marker, EffectType::from(self.kind()), "");
        if let Some(distance) = transcript.and_then(|tr| self.utr_distance(variant, tr)) {
            effect = effect.with_distance(distance);
            effect.detail = format!(
                "{} bases from CDS {}",
                distance,
                if self.is_5prime() { "start" } else { "end" }
            );
        }
        effects.add_effect(effect);

        if let Some(codon) =
            transcript.and_then(|tr| self.start_gained(variant, tr, ctx.codon_table))
        {
            effects.add(&self.marker, EffectType::StartGained, codon);
        }
        true
    }
}
