use std::cmp::{max, min};

use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant, VariantType};
use genomark_core::utils::reverse_complement;

use crate::errors::MarkerError;
use crate::marker::{Marker, affects, impl_marker};

///
/// A marker that also knows its own sequence.
///
/// The sequence is stored in the marker's orientation (reverse complemented
/// for minus strand markers). An empty sequence means "not available".
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqMarker {
    #[serde(flatten)]
    pub marker: Marker,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    sequence: String,
}

impl_marker!(SeqMarker, marker);

impl SeqMarker {
    pub fn new(marker: Marker) -> Self {
        SeqMarker {
            marker,
            sequence: String::new(),
        }
    }

    pub fn has_sequence(&self) -> bool {
        !self.sequence.is_empty()
    }

    /// Sequence in the marker's own orientation.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn set_sequence(&mut self, sequence: impl Into<String>) {
        self.sequence = sequence.into().to_ascii_uppercase();
    }

    /// Set the sequence from the plus strand of the reference.
    pub fn set_sequence_from_plus(&mut self, plus: &str) {
        if self.is_strand_minus() {
            self.sequence = reverse_complement(plus).to_ascii_uppercase();
        } else {
            self.sequence = plus.to_ascii_uppercase();
        }
    }

    /// Sequence as read on the plus strand.
    pub fn plus_strand_sequence(&self) -> String {
        if self.is_strand_minus() {
            reverse_complement(&self.sequence)
        } else {
            self.sequence.clone()
        }
    }

    /// Plus strand bases for `[start, end]`, if the range is inside the
    /// marker and the sequence is known.
    pub fn plus_subsequence(&self, start: Pos, end: Pos) -> Option<String> {
        if !self.has_sequence() || start > end || start < self.start() || end > self.end() {
            return None;
        }
        let plus = self.plus_strand_sequence();
        plus.get((start - self.start()) as usize..=(end - self.start()) as usize)
            .map(str::to_string)
    }

    pub fn base_at(&self, pos: Pos) -> Option<char> {
        self.plus_subsequence(pos, pos)
            .and_then(|s| s.chars().next())
    }

    ///
    /// Drop `bases` from the 5' end of the sequence (marker orientation).
    ///
    pub fn trim_sequence_start(&mut self, bases: usize) {
        if bases >= self.sequence.len() {
            self.sequence.clear();
        } else {
            self.sequence.drain(..bases);
        }
    }

    fn store_plus(&mut self, plus: String) {
        self.sequence = match self.marker.interval.strand {
            Strand::Minus => reverse_complement(&plus),
            Strand::Plus => plus,
        };
    }

    ///
    /// Apply `variant` to both the coordinates and the sequence.
    ///
    /// Substitutions overwrite the bases they cover. When a substitution
    /// reaches outside the marker, the marker bases it leaves untouched are
    /// lower-cased so that the partial edit is visible.
    ///
    pub fn apply(&self, variant: &Variant) -> Result<Option<SeqMarker>, MarkerError> {
        let Some(marker) = self.marker.apply(variant)? else {
            return Ok(None);
        };
        let mut result = SeqMarker {
            marker,
            sequence: self.sequence.clone(),
        };
        if !self.has_sequence() || !affects(self, variant) {
            return Ok(Some(result));
        }
        if self.sequence.len() as Pos != self.len() {
            log::warn!(
                "Sequence length {} does not match marker {} length {}, sequence left unchanged",
                self.sequence.len(),
                self.marker.interval,
                self.len()
            );
            return Ok(Some(result));
        }

        let mut plus = self.plus_strand_sequence();
        let offset = |pos: Pos| (pos - self.start()) as usize;

        match variant.variant_type() {
            VariantType::Snp | VariantType::Mnp => {
                let from = max(variant.start(), self.start());
                let to = min(variant.end(), self.end());
                if from <= to {
                    let alt = &variant.alternative()
                        [(from - variant.start()) as usize..=(to - variant.start()) as usize];
                    plus.replace_range(offset(from)..=offset(to), alt);
                    if variant.start() < self.start() || variant.end() > self.end() {
                        let head = plus[..offset(from)].to_ascii_lowercase();
                        let tail = plus[offset(to) + 1..].to_ascii_lowercase();
                        plus = format!("{}{}{}", head, alt, tail);
                    }
                }
            }
            VariantType::Ins => {
                if variant.start() > self.start() {
                    plus.insert_str(offset(variant.start()), variant.alternative());
                }
            }
            VariantType::Del => {
                let from = max(variant.start(), self.start());
                let to = min(variant.end(), self.end());
                if from <= to {
                    plus.replace_range(offset(from)..=offset(to), "");
                }
            }
            // only MIXED variants inside the marker get this far
            VariantType::Mixed => {
                if variant.start() >= self.start() {
                    plus.replace_range(offset(variant.start())..=offset(variant.end()), variant.alternative());
                }
            }
            VariantType::Interval => {}
        }

        result.store_plus(plus);
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerKind;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn seq_marker(strand: Strand, plus: &str) -> SeqMarker {
        let marker = Marker::new(
            "chr1",
            100,
            100 + plus.len() as Pos - 1,
            strand,
            "ex1",
            MarkerKind::Exon,
        )
        .unwrap();
        let mut m = SeqMarker::new(marker);
        m.set_sequence_from_plus(plus);
        m
    }

    #[rstest]
    #[case(Strand::Plus, "ACGTACGTAC")]
    #[case(Strand::Minus, "ACGTACGTAC")]
    fn test_orientation(#[case] strand: Strand, #[case] plus: &str) {
        let m = seq_marker(strand, plus);
        assert_eq!(m.plus_strand_sequence(), plus);
        assert_eq!(m.plus_subsequence(102, 104).unwrap(), "GTA");
        assert_eq!(m.base_at(100), Some('A'));
        assert_eq!(m.plus_subsequence(99, 101), None);
    }

    #[rstest]
    #[case(Strand::Plus)]
    #[case(Strand::Minus)]
    fn test_apply_snp(#[case] strand: Strand) {
        let m = seq_marker(strand, "ACGTACGTAC");
        let snp = Variant::new("chr1", 103, "T", "G").unwrap();
        let applied = m.apply(&snp).unwrap().unwrap();
        assert_eq!(applied.plus_strand_sequence(), "ACGGACGTAC");
        assert_eq!(applied.marker.interval.strand, strand);
    }

    #[rstest]
    fn test_apply_insertion() {
        let m = seq_marker(Strand::Minus, "ACGTACGTAC");
        let ins = Variant::new("chr1", 104, "A", "ATT").unwrap();
        let applied = m.apply(&ins).unwrap().unwrap();
        assert_eq!(applied.plus_strand_sequence(), "ACGTATTCGTAC");
        assert_eq!((applied.start(), applied.end()), (100, 111));
    }

    #[rstest]
    fn test_apply_insertion_before_marker() {
        let m = seq_marker(Strand::Plus, "ACGTACGTAC");
        let ins = Variant::new("chr1", 99, "A", "ATT").unwrap();
        let applied = m.apply(&ins).unwrap().unwrap();
        assert_eq!(applied.sequence(), "ACGTACGTAC");
        assert_eq!((applied.start(), applied.end()), (102, 111));
    }

    #[rstest]
    fn test_apply_deletion() {
        let m = seq_marker(Strand::Plus, "ACGTACGTAC");
        // deletes 107..112, the last 3 marker bases
        let del = Variant::new("chr1", 106, "GTACGGT", "G").unwrap();
        let applied = m.apply(&del).unwrap().unwrap();
        assert_eq!(applied.sequence(), "ACGTACG");
        assert_eq!((applied.start(), applied.end()), (100, 106));
    }

    #[rstest]
    fn test_apply_mnp_crossing_boundary() {
        let m = seq_marker(Strand::Plus, "ACGTACGTAC");
        let mnp = Variant::new("chr1", 108, "ACGG", "TTTT").unwrap();
        assert!(mnp.is_mnp());
        let applied = m.apply(&mnp).unwrap().unwrap();
        assert_eq!(applied.sequence(), "acgtacgtTT");
    }

    #[rstest]
    #[case(Strand::Plus, 102, "GT", "CCC", "ACCCCACGTAC", (100, 110))]
    #[case(Strand::Plus, 108, "AC", "GTT", "ACGTACGTGTT", (100, 110))]
    #[case(Strand::Plus, 100, "ACGT", "GC", "GCACGTAC", (100, 107))]
    #[case(Strand::Minus, 108, "AC", "GTT", "AACACGTACGT", (100, 110))]
    fn test_apply_mixed_inside(
        #[case] strand: Strand,
        #[case] pos: Pos,
        #[case] reference: &str,
        #[case] alternative: &str,
        #[case] expected: &str,
        #[case] span: (Pos, Pos),
    ) {
        let m = seq_marker(strand, "ACGTACGTAC");
        let mixed = Variant::new("chr1", pos, reference, alternative).unwrap();
        assert!(mixed.is_mixed());
        let applied = m.apply(&mixed).unwrap().unwrap();
        assert_eq!(applied.sequence(), expected);
        assert_eq!((applied.start(), applied.end()), span);
    }

    #[rstest]
    fn test_apply_without_sequence() {
        let marker = Marker::new("chr1", 100, 109, Strand::Plus, "ex1", MarkerKind::Exon).unwrap();
        let m = SeqMarker::new(marker);
        let del = Variant::new("chr1", 101, "ACG", "A").unwrap();
        let applied = m.apply(&del).unwrap().unwrap();
        assert!(!applied.has_sequence());
        assert_eq!(applied.end(), 107);
    }

    #[rstest]
    fn test_trim_sequence_start() {
        let mut m = seq_marker(Strand::Plus, "ACGT");
        m.trim_sequence_start(1);
        assert_eq!(m.sequence(), "CGT");
        m.trim_sequence_start(10);
        assert!(!m.has_sequence());
    }
}
