use genomark_core::models::{Interval, Locus, Pos};
use genomark_core::utils::reverse_complement;

use crate::codon::{CodonTable, StandardCodonTable};
use crate::effect::{EffectWarning, WarningType};
use crate::features::Transcript;

impl Transcript {
    ///
    /// Coding parts of the transcript in ascending genomic order.
    ///
    /// Annotated CDS segments are used when present. Otherwise a protein
    /// coding transcript is coding wherever its exons are not UTR.
    ///
    pub fn coding_segments(&self) -> &[Interval] {
        self.cache
            .coding_segments
            .get_or_init(|| self.compute_coding_segments())
    }

    pub(crate) fn compute_coding_segments(&self) -> Vec<Interval> {
        if !self.cds.is_empty() {
            return self
                .cds
                .sorted()
                .into_iter()
                .map(|c| c.marker.interval.clone())
                .collect();
        }
        if !self.protein_coding {
            return Vec::new();
        }

        let mut segments = Vec::new();
        for exon in self.exons.sorted() {
            let mut pieces = vec![exon.seq.marker.interval.clone()];
            for utr in self.utrs.iter().filter(|u| u.intersects(exon)) {
                pieces = pieces.into_iter().flat_map(|p| p.minus(utr)).collect();
            }
            segments.extend(pieces);
        }
        segments
    }

    /// First coding base in transcription order.
    pub fn cds_start(&self) -> Option<Pos> {
        let segments = self.coding_segments();
        if self.is_strand_plus() {
            segments.iter().map(|s| s.start).min()
        } else {
            segments.iter().map(|s| s.end).max()
        }
    }

    /// Last coding base in transcription order.
    pub fn cds_end(&self) -> Option<Pos> {
        let segments = self.coding_segments();
        if self.is_strand_plus() {
            segments.iter().map(|s| s.end).max()
        } else {
            segments.iter().map(|s| s.start).min()
        }
    }

    pub fn cds_length(&self) -> Pos {
        self.coding_segments().iter().map(|s| s.len()).sum()
    }

    /// Does `locus` intersect the span between coding start and end?
    pub fn is_cds<L: Locus + ?Sized>(&self, locus: &L) -> bool {
        match (self.cds_start(), self.cds_end()) {
            (Some(a), Some(b)) => locus.same_chr(&self.marker) && locus.intersects_range(a.min(b), a.max(b)),
            _ => false,
        }
    }

    ///
    /// Coding sequence in transcription order, empty when an exon sequence
    /// is missing.
    ///
    pub fn cds_sequence(&self) -> &str {
        self.cache.cds_sequence.get_or_init(|| {
            let mut plus = String::new();
            for segment in self.coding_segments() {
                let piece = self
                    .exons
                    .iter()
                    .find(|e| e.includes(segment))
                    .and_then(|e| e.seq.plus_subsequence(segment.start, segment.end));
                match piece {
                    Some(piece) => plus.push_str(&piece),
                    None => {
                        log::debug!(
                            "No sequence for coding segment {} of transcript '{}'",
                            segment,
                            self.id()
                        );
                        return String::new();
                    }
                }
            }
            if self.is_strand_minus() {
                reverse_complement(&plus)
            } else {
                plus
            }
        })
    }

    /// Protein sequence (standard genetic code).
    pub fn protein(&self) -> &str {
        self.cache
            .protein
            .get_or_init(|| StandardCodonTable.translate(self.cds_sequence()))
    }

    /// Genomic position of every coding base, in transcription order.
    pub fn cds_base_to_pos(&self) -> &[Pos] {
        self.cache.cds_base_to_pos.get_or_init(|| {
            let segments = self.coding_segments();
            let mut positions = Vec::with_capacity(self.cds_length().max(0) as usize);
            if self.is_strand_plus() {
                for s in segments.iter() {
                    positions.extend(s.start..=s.end);
                }
            } else {
                for s in segments.iter().rev() {
                    positions.extend((s.start..=s.end).rev());
                }
            }
            positions
        })
    }

    /// Genomic span `(min, max)` of every codon, in transcription order.
    pub fn aa_to_pos(&self) -> &[(Pos, Pos)] {
        self.cache.aa_to_pos.get_or_init(|| {
            self.cds_base_to_pos()
                .chunks(3)
                .map(|codon| {
                    let lo = codon.iter().copied().min().unwrap_or_default();
                    let hi = codon.iter().copied().max().unwrap_or_default();
                    (lo, hi)
                })
                .collect()
        })
    }

    ///
    /// 0-based index of the coding base at genomic `pos`, `None` outside the
    /// coding segments.
    ///
    pub fn base_number_cds(&self, pos: Pos) -> Option<usize> {
        let segments = self.coding_segments();
        let mut offset: Pos = 0;
        if self.is_strand_plus() {
            for s in segments.iter() {
                if s.intersects_pos(pos) {
                    return Some((offset + pos - s.start) as usize);
                }
                offset += s.len();
            }
        } else {
            for s in segments.iter().rev() {
                if s.intersects_pos(pos) {
                    return Some((offset + s.end - pos) as usize);
                }
                offset += s.len();
            }
        }
        None
    }

    /// 0-based codon number at genomic `pos`.
    pub fn aa_number(&self, pos: Pos) -> Option<usize> {
        self.base_number_cds(pos).map(|b| b / 3)
    }

    ///
    /// Data quality checks on a coding transcript: incomplete coding length,
    /// missing start or stop codon, premature stops, mixed exon strands and
    /// exons lacking a sequence.
    ///
    pub fn sanity_warnings(&self) -> Vec<EffectWarning> {
        let mut warnings = Vec::new();
        let id = self.id();

        if self.exons.iter().any(|e| e.strand() != self.strand()) {
            warnings.push(EffectWarning::new(
                WarningType::TranscriptMixedStrands,
                format!("transcript '{}' has exons on both strands", id),
            ));
        }

        if !self.protein_coding {
            return warnings;
        }
        let missing: Vec<&str> = self
            .exons
            .iter()
            .filter(|e| !e.seq.has_sequence())
            .map(|e| e.id())
            .collect();
        if !missing.is_empty() && missing.len() < self.exons.len() {
            warnings.push(EffectWarning::new(
                WarningType::SequenceNotAvailable,
                format!("exons of '{}' without sequence: {}", id, missing.join(", ")),
            ));
        }
        let cds = self.cds_sequence();
        if cds.is_empty() {
            return warnings;
        }
        let table = StandardCodonTable;
        if cds.len() % 3 != 0 {
            warnings.push(EffectWarning::new(
                WarningType::TranscriptIncomplete,
                format!("coding length of '{}' is {}, not a multiple of 3", id, cds.len()),
            ));
        }
        if cds.len() >= 3 && !table.is_start(&cds[..3]) {
            warnings.push(EffectWarning::new(
                WarningType::TranscriptNoStartCodon,
                format!("transcript '{}' starts with {}", id, &cds[..3]),
            ));
        }
        let protein = self.protein();
        if !protein.ends_with('*') {
            warnings.push(EffectWarning::new(
                WarningType::TranscriptNoStopCodon,
                format!("transcript '{}' has no stop codon", id),
            ));
        }
        let body = protein.strip_suffix('*').unwrap_or(protein);
        if body.contains('*') {
            warnings.push(EffectWarning::new(
                WarningType::TranscriptMultipleStopCodons,
                format!("transcript '{}' has premature stop codons", id),
            ));
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::transcript::tests::coding_transcript;
    use crate::features::{Exon, Utr};
    use crate::marker::{MarkerKind, MarkerLike};
    use genomark_core::models::Strand;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(Strand::Plus, Some(150), Some(549))]
    #[case(Strand::Minus, Some(549), Some(150))]
    fn test_cds_start_end(
        #[case] strand: Strand,
        #[case] start: Option<Pos>,
        #[case] end: Option<Pos>,
    ) {
        let tr = coding_transcript(strand);
        assert_eq!(tr.cds_start(), start);
        assert_eq!(tr.cds_end(), end);
        assert_eq!(tr.cds_length(), 200);
    }

    #[rstest]
    fn test_base_number_cds_plus() {
        let tr = coding_transcript(Strand::Plus);
        assert_eq!(tr.base_number_cds(150), Some(0));
        assert_eq!(tr.base_number_cds(199), Some(49));
        assert_eq!(tr.base_number_cds(300), Some(50));
        assert_eq!(tr.base_number_cds(250), None);
        assert_eq!(tr.aa_number(300), Some(16));
        assert_eq!(tr.cds_base_to_pos()[50], 300);
    }

    #[rstest]
    fn test_base_number_cds_minus() {
        let tr = coding_transcript(Strand::Minus);
        assert_eq!(tr.base_number_cds(549), Some(0));
        assert_eq!(tr.base_number_cds(500), Some(49));
        assert_eq!(tr.base_number_cds(399), Some(50));
        assert_eq!(tr.cds_base_to_pos()[0], 549);
        // codon 16 spans the exon 2/3 junction: bases 48, 49, 50
        assert_eq!(tr.aa_to_pos()[16], (399, 501));
    }

    #[rstest]
    fn test_is_cds() {
        let tr = coding_transcript(Strand::Plus);
        let probe = |s, e| {
            genomark_core::models::Interval::new("chr1", s, e, Strand::Plus, "").unwrap()
        };
        assert!(tr.is_cds(&probe(250, 250)));
        assert!(!tr.is_cds(&probe(120, 140)));
    }

    #[rstest]
    fn test_coding_segments_from_utrs() {
        let mut tr = Transcript::new("chr1", 100, 199, Strand::Plus, "tr1")
            .unwrap()
            .with_biotype("protein_coding");
        tr.add_exon(Exon::new("chr1", 100, 199, Strand::Plus, "ex1").unwrap())
            .unwrap();
        tr.add_utr(Utr::new(MarkerKind::Utr5Prime, "chr1", 100, 109, Strand::Plus, "u5").unwrap())
            .unwrap();
        tr.add_utr(Utr::new(MarkerKind::Utr3Prime, "chr1", 190, 199, Strand::Plus, "u3").unwrap())
            .unwrap();
        assert_eq!(tr.cds_start(), Some(110));
        assert_eq!(tr.cds_end(), Some(189));
        assert_eq!(tr.utrs().get("u5").unwrap().parent().unwrap().id, "ex1");
    }

    #[rstest]
    fn test_cds_sequence_and_protein() {
        // ATG GCC | TGG TAA on the plus strand
        let mut tr = Transcript::new("chr1", 0, 19, Strand::Plus, "tr1")
            .unwrap()
            .with_biotype("protein_coding");
        tr.add_exon(Exon::new("chr1", 0, 5, Strand::Plus, "ex1").unwrap().with_sequence("ATGGCC"))
            .unwrap();
        tr.add_exon(Exon::new("chr1", 14, 19, Strand::Plus, "ex2").unwrap().with_sequence("TGGTAA"))
            .unwrap();
        assert_eq!(tr.cds_sequence(), "ATGGCCTGGTAA");
        assert_eq!(tr.protein(), "MAW*");
        assert!(tr.sanity_warnings().is_empty());
    }

    #[rstest]
    fn test_cds_sequence_minus() {
        // transcript reads ATG AAA TAG; on the plus strand: CTA TTT CAT
        let mut tr = Transcript::new("chr1", 0, 8, Strand::Minus, "tr1")
            .unwrap()
            .with_biotype("protein_coding");
        tr.add_exon(Exon::new("chr1", 0, 8, Strand::Minus, "ex1").unwrap().with_sequence("CTATTTCAT"))
            .unwrap();
        assert_eq!(tr.cds_sequence(), "ATGAAATAG");
        assert_eq!(tr.protein(), "MK*");
    }

    #[rstest]
    fn test_sanity_warnings() {
        let mut tr = Transcript::new("chr1", 0, 9, Strand::Plus, "tr1")
            .unwrap()
            .with_biotype("protein_coding");
        tr.add_exon(Exon::new("chr1", 0, 9, Strand::Plus, "ex1").unwrap().with_sequence("CCCTAAGGGA"))
            .unwrap();
        let warnings: Vec<WarningType> = tr.sanity_warnings().into_iter().map(|w| w.warning).collect();
        assert_eq!(
            warnings,
            vec![
                WarningType::TranscriptIncomplete,
                WarningType::TranscriptNoStartCodon,
                WarningType::TranscriptNoStopCodon,
                WarningType::TranscriptMultipleStopCodons,
            ]
        );

        tr.add_exon(Exon::new("chr1", 20, 29, Strand::Plus, "ex2").unwrap())
            .unwrap();
        let warnings = tr.sanity_warnings();
        assert_eq!(warnings[0].warning, WarningType::SequenceNotAvailable);
    }
}
