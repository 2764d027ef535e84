use genomark_core::models::{Locus, Variant};

use crate::effect::{EffectContext, EffectType, VariantEffect, VariantEffects};
use crate::features::Transcript;

impl Transcript {
    ///
    /// Resolve the effects of `variant` on this transcript.
    ///
    /// Parts are tried from the outside in: UTRs, branch sites, introns (with
    /// their splice sites), then exons. Whenever the variant lies entirely
    /// inside the part that was hit, resolution stops there. Coding effects
    /// are delegated to the context's calculator.
    ///
    pub fn variant_effect(
        &self,
        variant: &Variant,
        ctx: &EffectContext<'_>,
        effects: &mut VariantEffects,
    ) -> bool {
        if !self.intersects(variant) {
            return false;
        }
        let mark = effects.mark();
        self.resolve(variant, ctx, effects);

        // reference allele checks
        let warnings: Vec<_> = self
            .exons
            .iter()
            .filter_map(|e| e.sanity_check(variant))
            .collect();
        let gene_id = self.marker.parent.as_ref().map(|p| p.id.clone());
        for effect in effects.since(mark) {
            effect.transcript_id.get_or_insert_with(|| self.id().to_string());
            if effect.gene_id.is_none() {
                effect.gene_id = gene_id.clone();
            }
            effect.warnings.extend(warnings.iter().cloned());
        }
        true
    }

    fn resolve(&self, variant: &Variant, ctx: &EffectContext<'_>, effects: &mut VariantEffects) {
        if variant.is_del() && variant.includes(self) {
            effects.add(&self.marker, EffectType::TranscriptDeleted, "");
            return;
        }

        let mut included = false;
        for utr in self.utrs.iter() {
            if utr.variant_effect(variant, Some(self), ctx, effects) {
                included |= utr.includes(variant);
            }
        }
        if included {
            return;
        }

        for site in self.splice_branches.iter() {
            if site.variant_effect(variant, effects) {
                included |= site.includes(variant);
            }
        }
        if included {
            return;
        }

        for intron in self.introns() {
            if intron.variant_effect(variant, effects) {
                included |= intron.includes(variant);
            }
        }
        if included {
            return;
        }

        if self.exons.is_empty() {
            effects.add(&self.marker, EffectType::Transcript, "");
            return;
        }

        let coding = self.protein_coding || ctx.config.treat_all_as_protein_coding;
        if !coding || variant.is_interval() {
            for exon in self.exons.iter() {
                exon.variant_effect(variant, effects);
            }
            return;
        }

        let mark = effects.mark();
        let mut exon_hit = false;
        for exon in self.exons.iter().filter(|e| e.intersects(variant)) {
            exon_hit = true;
            if variant.is_del() && variant.includes(exon) {
                effects.add(&exon.seq.marker, EffectType::ExonDeleted, "");
            } else {
                exon.splice_region_effects(variant, effects);
            }
        }
        if exon_hit && self.is_cds(variant) {
            ctx.calculator
                .codon_change(variant, self, ctx.codon_table, effects);
        }
        if effects.mark() == mark {
            // exonic but not coding and not annotated as UTR
            for exon in self.exons.iter() {
                exon.variant_effect(variant, effects);
            }
        }
    }

    ///
    /// Upstream/downstream effect when the variant falls in one of this
    /// transcript's flanks. The distance is measured to the transcript.
    ///
    pub fn up_down_effect(&self, variant: &Variant, effects: &mut VariantEffects) -> bool {
        let mut hit = false;
        for flank in self.upstream.iter().chain(self.downstream.iter()) {
            if !flank.intersects(variant) {
                continue;
            }
            let Some(distance) = self.distance(variant) else {
                continue;
            };
            let mut effect = VariantEffect::new(
                flank,
                EffectType::from(flank.kind),
                format!("{} bases", distance),
            )
            .with_distance(distance);
            effect.transcript_id = Some(self.id().to_string());
            effect.gene_id = self.marker.parent.as_ref().map(|p| p.id.clone());
            effects.add_effect(effect);
            hit = true;
        }
        hit
    }
}
