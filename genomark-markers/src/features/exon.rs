use std::cmp::{max, min};

use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant};
use genomark_core::utils::sequences_compatible;

use crate::effect::{EffectType, EffectWarning, VariantEffects, WarningType};
use crate::errors::MarkerError;
use crate::features::SpliceSite;
use crate::frame::Frame;
use crate::marker::{Marker, MarkerKind, impl_marker};
use crate::marker_seq::SeqMarker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    #[serde(flatten)]
    pub seq: SeqMarker,
    #[serde(default)]
    pub frame: Frame,
    /// 1-based position in the transcript, 0 until ranked.
    #[serde(default)]
    pub rank: u32,
    /// Splice region at the 5' end (transcript orientation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splice_region_start: Option<SpliceSite>,
    /// Splice region at the 3' end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splice_region_end: Option<SpliceSite>,
}

impl_marker!(Exon, seq.marker);

impl Exon {
    pub fn new(
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
    ) -> Result<Self, MarkerError> {
        let marker = Marker::new(chr, start, end, strand, id, MarkerKind::Exon)?;
        Ok(Exon {
            seq: SeqMarker::new(marker),
            frame: Frame::UNKNOWN,
            rank: 0,
            splice_region_start: None,
            splice_region_end: None,
        })
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Sequence as read on the plus strand of the reference.
    pub fn with_sequence(mut self, plus: &str) -> Self {
        self.seq.set_sequence_from_plus(plus);
        self
    }

    pub fn sequence(&self) -> &str {
        self.seq.sequence()
    }

    /// First genomic base in transcript orientation.
    pub fn strand_start(&self) -> Pos {
        if self.is_strand_plus() {
            self.start()
        } else {
            self.end()
        }
    }

    ///
    /// Move the 5' end of the exon `bases` inward, dropping the same bases
    /// from its sequence, and update the frame. Returns false when the exon
    /// is too short to be shifted.
    ///
    pub fn frame_correction(&mut self, bases: Pos) -> bool {
        if bases <= 0 {
            return true;
        }
        if self.len() <= bases {
            return false;
        }
        let interval = &mut self.seq.marker.interval;
        if interval.strand.is_plus() {
            interval.start += bases;
        } else {
            interval.end -= bases;
        }
        self.seq.trim_sequence_start(bases as usize);
        self.frame = self.frame.shifted(bases);
        true
    }

    ///
    /// Splice region at the 5' end of the exon, `size` bases long (clipped
    /// to the exon length).
    ///
    pub fn create_splice_site_region_start(&mut self, size: Pos) -> Option<&SpliceSite> {
        let size = min(size, self.len());
        self.splice_region_start = if size <= 0 {
            None
        } else if self.is_strand_plus() {
            SpliceSite::within(
                MarkerKind::SpliceSiteRegion,
                self.marker_ref(),
                self.start(),
                self.start() + size - 1,
                "region_start",
            )
        } else {
            SpliceSite::within(
                MarkerKind::SpliceSiteRegion,
                self.marker_ref(),
                self.end() - size + 1,
                self.end(),
                "region_start",
            )
        };
        self.splice_region_start.as_ref()
    }

    /// Splice region at the 3' end of the exon.
    pub fn create_splice_site_region_end(&mut self, size: Pos) -> Option<&SpliceSite> {
        let size = min(size, self.len());
        self.splice_region_end = if size <= 0 {
            None
        } else if self.is_strand_plus() {
            SpliceSite::within(
                MarkerKind::SpliceSiteRegion,
                self.marker_ref(),
                self.end() - size + 1,
                self.end(),
                "region_end",
            )
        } else {
            SpliceSite::within(
                MarkerKind::SpliceSiteRegion,
                self.marker_ref(),
                self.start(),
                self.start() + size - 1,
                "region_end",
            )
        };
        self.splice_region_end.as_ref()
    }

    pub fn clear_splice_sites(&mut self) {
        self.splice_region_start = None;
        self.splice_region_end = None;
    }

    pub fn splice_sites(&self) -> impl Iterator<Item = &SpliceSite> {
        self.splice_region_start
            .iter()
            .chain(self.splice_region_end.iter())
    }

    fn marker_ref(&self) -> &Marker {
        &self.seq.marker
    }

    ///
    /// Check a substitution's reference allele against the exon sequence.
    /// IUPAC ambiguity codes match any base they stand for.
    ///
    pub fn sanity_check(&self, variant: &Variant) -> Option<EffectWarning> {
        if !variant.is_substitution() || !self.intersects(variant) {
            return None;
        }
        if !self.seq.has_sequence() {
            return Some(EffectWarning::new(
                WarningType::SequenceNotAvailable,
                format!("no sequence for exon {}", self.id()),
            ));
        }
        let from = max(variant.start(), self.start());
        let to = min(variant.end(), self.end());
        let reference = &variant.reference()
            [(from - variant.start()) as usize..=(to - variant.start()) as usize];
        let genome = self.seq.plus_subsequence(from, to)?;
        if sequences_compatible(reference, &genome) {
            None
        } else {
            Some(EffectWarning::new(
                WarningType::RefDoesNotMatchGenome,
                format!(
                    "REF '{}' does not match genome '{}' at {}:{}",
                    reference,
                    genome,
                    self.chr(),
                    from
                ),
            ))
        }
    }

    /// Effects of the exon's own splice regions.
    pub fn splice_region_effects(&self, variant: &Variant, effects: &mut VariantEffects) -> bool {
        let mut hit = false;
        for site in self.splice_sites() {
            hit |= site.variant_effect(variant, effects);
        }
        hit
    }

    pub fn variant_effect(&self, variant: &Variant, effects: &mut VariantEffects) -> bool {
        if !self.intersects(variant) {
            return false;
        }
        if variant.is_del() && variant.includes(self) {
            effects.add(&self.seq.marker, EffectType::ExonDeleted, "");
            return true;
        }
        self.splice_region_effects(variant, effects);
        effects.add(&self.seq.marker, EffectType::Exon, format!("exon {}", self.rank));
        true
    }

    pub fn apply(&self, variant: &Variant) -> Result<Option<Exon>, MarkerError> {
        let Some(seq) = self.seq.apply(variant)? else {
            return Ok(None);
        };
        let splice_region_start = match &self.splice_region_start {
            Some(site) => site.apply(variant)?,
            None => None,
        };
        let splice_region_end = match &self.splice_region_end {
            Some(site) => site.apply(variant)?,
            None => None,
        };
        Ok(Some(Exon {
            seq,
            frame: self.frame,
            rank: self.rank,
            splice_region_start,
            splice_region_end,
        }))
    }
}
