//! Genetic code and coding-level consequence calculation.

use std::cmp::min;

use genomark_core::models::{Locus, Variant, VariantType};
use genomark_core::utils::complement;

use crate::effect::{EffectType, EffectWarning, VariantEffect, VariantEffects, WarningType};
use crate::features::Transcript;
use crate::marker::MarkerLike;

///
/// Translation table from codons to amino acids (one letter codes, `*` for
/// stop, `X` for anything untranslatable).
///
pub trait CodonTable: Send + Sync {
    fn aa(&self, codon: &str) -> char;

    fn is_start(&self, codon: &str) -> bool;

    fn is_stop(&self, codon: &str) -> bool {
        self.aa(codon) == '*'
    }

    /// Translate a sequence, ignoring a trailing partial codon.
    fn translate(&self, seq: &str) -> String {
        seq.as_bytes()
            .chunks_exact(3)
            .map(|c| std::str::from_utf8(c).map(|c| self.aa(c)).unwrap_or('X'))
            .collect()
    }
}

/// NCBI translation table 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodonTable;

const STANDARD_AA: &[u8; 64] = b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
const STANDARD_STARTS: [&str; 3] = ["ATG", "CTG", "TTG"];

fn base_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

impl CodonTable for StandardCodonTable {
    fn aa(&self, codon: &str) -> char {
        let bytes = codon.as_bytes();
        if bytes.len() != 3 {
            return 'X';
        }
        match (base_index(bytes[0]), base_index(bytes[1]), base_index(bytes[2])) {
            (Some(a), Some(b), Some(c)) => char::from(STANDARD_AA[a * 16 + b * 4 + c]),
            _ => 'X',
        }
    }

    fn is_start(&self, codon: &str) -> bool {
        STANDARD_STARTS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(codon))
    }
}

///
/// Computes coding consequences (codon and amino acid changes) of a variant
/// hitting the coding part of a transcript.
///
pub trait CodonChangeCalculator: Send + Sync {
    fn codon_change(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        table: &dyn CodonTable,
        effects: &mut VariantEffects,
    );
}

///
/// Default calculator: frame shifts and in-frame indels from the length
/// change, codon and amino acid changes for substitutions. Always adds
/// exactly one effect.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodonChange;

impl FrameCodonChange {
    /// Coding base numbers touched by the variant, in transcript order.
    fn coding_bases(&self, variant: &Variant, transcript: &Transcript) -> Vec<usize> {
        let (from, to) = if variant.is_ins() {
            // the base the insertion goes before, and its left neighbour
            (variant.start() - 1, variant.start())
        } else {
            (variant.start(), variant.end())
        };
        let mut bases: Vec<usize> = (from..=to)
            .filter_map(|pos| transcript.base_number_cds(pos))
            .collect();
        bases.sort_unstable();
        bases
    }

    fn indel_effect(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        table: &dyn CodonTable,
        bases: &[usize],
    ) -> (EffectType, String) {
        let length_change = variant.length_change();
        let first = bases.first().copied().unwrap_or(0);
        let cds = transcript.cds_sequence();
        let detail = format!("c.{} {:+}", first + 1, length_change);

        if !variant.is_ins() && first < 3 && cds.get(0..3).is_some_and(|c| table.is_start(c)) {
            return (EffectType::StartLost, detail);
        }
        let last = bases.last().copied().unwrap_or(0);
        let cds_len = cds.len();
        if !variant.is_ins()
            && cds_len >= 3
            && last + 3 >= cds_len
            && table.is_stop(&cds[cds_len - 3..])
        {
            return (EffectType::StopLost, detail);
        }

        let effect = if length_change % 3 != 0 {
            EffectType::FrameShift
        } else if length_change > 0 {
            EffectType::CodonInsertion
        } else if length_change < 0 {
            EffectType::CodonDeletion
        } else {
            EffectType::CodonChange
        };
        (effect, detail)
    }

    fn substitution_effect(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        table: &dyn CodonTable,
        bases: &[usize],
    ) -> Result<(EffectType, String), EffectWarning> {
        let cds = transcript.cds_sequence();
        let (Some(&first), Some(&last)) = (bases.first(), bases.last()) else {
            return Ok((EffectType::CodonChange, String::new()));
        };
        if cds.len() <= last {
            return Err(EffectWarning::new(
                WarningType::SequenceNotAvailable,
                format!("no coding sequence for transcript {}", transcript.id()),
            ));
        }

        let mut alt_cds = cds.as_bytes().to_vec();
        let alt_allele = variant.alternative().as_bytes();
        for pos in variant.start()..=variant.end() {
            if let Some(base_number) = transcript.base_number_cds(pos) {
                let base = char::from(alt_allele[(pos - variant.start()) as usize]);
                let base = if transcript.is_strand_minus() {
                    complement(base)
                } else {
                    base
                };
                alt_cds[base_number] = base as u8;
            }
        }

        let codon_from = (first / 3) * 3;
        let codon_to = min(((last / 3) + 1) * 3, cds.len());
        let ref_codons = &cds[codon_from..codon_to];
        let alt_codons = String::from_utf8_lossy(&alt_cds[codon_from..codon_to]).to_string();
        let ref_aa = table.translate(ref_codons);
        let alt_aa = table.translate(&alt_codons);
        let detail = format!(
            "{}/{} p.{}{}{}",
            ref_codons,
            alt_codons,
            ref_aa,
            first / 3 + 1,
            alt_aa
        );

        let effect = if codon_from == 0
            && table.is_start(&ref_codons[..min(3, ref_codons.len())])
            && !table.is_start(&alt_codons[..min(3, alt_codons.len())])
        {
            EffectType::StartLost
        } else if ref_aa.contains('*') && !alt_aa.contains('*') {
            EffectType::StopLost
        } else if alt_aa.contains('*') && !ref_aa.contains('*') {
            EffectType::StopGained
        } else if ref_aa != alt_aa {
            EffectType::NonSynonymousCoding
        } else {
            EffectType::SynonymousCoding
        };
        Ok((effect, detail))
    }
}

impl CodonChangeCalculator for FrameCodonChange {
    fn codon_change(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        table: &dyn CodonTable,
        effects: &mut VariantEffects,
    ) {
        let marker = transcript
            .exons()
            .iter()
            .find(|e| e.intersects(variant))
            .map(|e| e.marker())
            .unwrap_or(&transcript.marker);
        let bases = self.coding_bases(variant, transcript);

        let effect = match variant.variant_type() {
            VariantType::Snp | VariantType::Mnp => {
                match self.substitution_effect(variant, transcript, table, &bases) {
                    Ok((effect_type, detail)) => VariantEffect::new(marker, effect_type, detail),
                    Err(warning) => {
                        let mut effect = VariantEffect::new(marker, EffectType::CodonChange, "");
                        effect.warnings.push(warning);
                        effect
                    }
                }
            }
            VariantType::Ins | VariantType::Del | VariantType::Mixed => {
                let (effect_type, detail) = self.indel_effect(variant, transcript, table, &bases);
                VariantEffect::new(marker, effect_type, detail)
            }
            VariantType::Interval => VariantEffect::new(marker, EffectType::Cds, ""),
        };
        effects.add_effect(effect);
    }
}
