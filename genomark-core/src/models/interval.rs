use std::cmp::{Ordering, max, min};
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::GenomarkCoreError;
use crate::models::Strand;
use crate::utils::compare_chromosome_names;

/// Genomic coordinate (0-based).
pub type Pos = i64;

///
/// Anything located on a chromosome: a closed range `[start, end]` with a
/// strand and an identifier.
///
/// The geometry helpers (`intersects`, `includes`, `distance`, ...) are
/// provided once here and work across every implementor, so an exon can be
/// compared against a variant directly.
///
pub trait Locus {
    fn chr(&self) -> &str;
    fn start(&self) -> Pos;
    fn end(&self) -> Pos;

    fn strand(&self) -> Strand {
        Strand::Plus
    }

    fn id(&self) -> &str {
        ""
    }

    /// Number of bases covered, `end - start + 1`.
    fn len(&self) -> Pos {
        self.end() - self.start() + 1
    }

    fn is_strand_plus(&self) -> bool {
        self.strand().is_plus()
    }

    fn is_strand_minus(&self) -> bool {
        self.strand().is_minus()
    }

    fn same_chr<L: Locus + ?Sized>(&self, other: &L) -> bool {
        self.chr() == other.chr()
    }

    /// Does `other` share at least one base with this locus?
    fn intersects<L: Locus + ?Sized>(&self, other: &L) -> bool {
        self.same_chr(other) && other.end() >= self.start() && other.start() <= self.end()
    }

    fn intersects_pos(&self, pos: Pos) -> bool {
        self.start() <= pos && pos <= self.end()
    }

    fn intersects_range(&self, start: Pos, end: Pos) -> bool {
        end >= self.start() && start <= self.end()
    }

    /// Is `other` fully contained in this locus (same chromosome)?
    fn includes<L: Locus + ?Sized>(&self, other: &L) -> bool {
        self.same_chr(other) && self.start() <= other.start() && other.end() <= self.end()
    }

    /// Number of shared bases (0 when disjoint).
    fn intersect_size<L: Locus + ?Sized>(&self, other: &L) -> Pos {
        if !self.intersects(other) {
            return 0;
        }
        min(self.end(), other.end()) - max(self.start(), other.start()) + 1
    }

    ///
    /// Distance between two loci: `Some(0)` when they overlap, otherwise the
    /// coordinate difference between the closest ends (adjacent loci are at
    /// distance 1). `None` when they are on different chromosomes.
    ///
    fn distance<L: Locus + ?Sized>(&self, other: &L) -> Option<Pos> {
        if !self.same_chr(other) {
            return None;
        }
        if self.intersects(other) {
            Some(0)
        } else if self.start() > other.end() {
            Some(self.start() - other.end())
        } else {
            Some(other.start() - self.end())
        }
    }

    /// Order by chromosome, start, end and finally id.
    fn compare_locus<L: Locus + ?Sized>(&self, other: &L) -> Ordering {
        compare_chromosome_names(self.chr(), other.chr())
            .then_with(|| self.start().cmp(&other.start()))
            .then_with(|| self.end().cmp(&other.end()))
            .then_with(|| self.id().cmp(other.id()))
    }

    /// Order by end coordinate first; used for minus strand walks.
    fn compare_locus_by_end<L: Locus + ?Sized>(&self, other: &L) -> Ordering {
        compare_chromosome_names(self.chr(), other.chr())
            .then_with(|| self.end().cmp(&other.end()))
            .then_with(|| self.start().cmp(&other.start()))
            .then_with(|| self.id().cmp(other.id()))
    }
}

///
/// A closed genomic interval `[start, end]` (0-based, inclusive).
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    pub chr: String,
    pub start: Pos,
    pub end: Pos,
    #[cfg_attr(feature = "serde", serde(default))]
    pub strand: Strand,
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: String,
}

impl Interval {
    ///
    /// Create a new interval, rejecting `start > end`.
    ///
    pub fn new(
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
    ) -> Result<Self, GenomarkCoreError> {
        let chr = chr.into();
        if start > end {
            return Err(GenomarkCoreError::InvalidInterval { chr, start, end });
        }
        Ok(Interval {
            chr,
            start,
            end,
            strand,
            id: id.into(),
        })
    }

    /// Copy of this interval with new coordinates, keeping chr/strand/id.
    pub fn with_range(&self, start: Pos, end: Pos) -> Result<Self, GenomarkCoreError> {
        Interval::new(self.chr.clone(), start, end, self.strand, self.id.clone())
    }

    /// Move both coordinates by `delta` bases.
    pub fn shift(&mut self, delta: Pos) {
        self.start += delta;
        self.end += delta;
    }

    ///
    /// Smallest interval covering both, `None` across chromosomes.
    ///
    pub fn union<L: Locus + ?Sized>(&self, other: &L) -> Option<Interval> {
        if !self.same_chr(other) {
            return None;
        }
        Some(Interval {
            chr: self.chr.clone(),
            start: min(self.start, other.start()),
            end: max(self.end, other.end()),
            strand: self.strand,
            id: self.id.clone(),
        })
    }

    ///
    /// Shared part of both intervals, `None` when they do not intersect.
    ///
    pub fn intersect<L: Locus + ?Sized>(&self, other: &L) -> Option<Interval> {
        if !self.intersects(other) {
            return None;
        }
        Some(Interval {
            chr: self.chr.clone(),
            start: max(self.start, other.start()),
            end: min(self.end, other.end()),
            strand: self.strand,
            id: self.id.clone(),
        })
    }

    ///
    /// Remove `other` from this interval. Returns the remaining pieces:
    ///
    /// ```text
    /// this:    |==========|
    /// covered:  [------------]      -> nothing left
    /// left:    [----]               -> right remainder
    /// right:         [------]       -> left remainder
    /// middle:     [---]             -> left and right remainders
    /// ```
    ///
    pub fn minus<L: Locus + ?Sized>(&self, other: &L) -> Vec<Interval> {
        if !self.intersects(other) {
            return vec![self.clone()];
        }

        let piece = |start: Pos, end: Pos| Interval {
            chr: self.chr.clone(),
            start,
            end,
            strand: self.strand,
            id: self.id.clone(),
        };

        let (ostart, oend) = (other.start(), other.end());
        if ostart <= self.start && self.end <= oend {
            Vec::new()
        } else if ostart <= self.start && oend < self.end {
            vec![piece(oend + 1, self.end)]
        } else if self.start < ostart && self.end <= oend {
            vec![piece(self.start, ostart - 1)]
        } else if self.start < ostart && oend < self.end {
            vec![piece(self.start, ostart - 1), piece(oend + 1, self.end)]
        } else {
            unreachable!(
                "interval subtraction case not covered: {} minus {}:{}-{}",
                self,
                other.chr(),
                ostart,
                oend
            )
        }
    }
}

impl Locus for Interval {
    fn chr(&self) -> &str {
        &self.chr
    }

    fn start(&self) -> Pos {
        self.start
    }

    fn end(&self) -> Pos {
        self.end
    }

    fn strand(&self) -> Strand {
        self.strand
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_locus(other)
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)?;
        if self.strand.is_minus() {
            write!(f, "(-)")?;
        }
        if !self.id.is_empty() {
            write!(f, " '{}'", self.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn make_interval(start: Pos, end: Pos) -> Interval {
        Interval::new("chr1", start, end, Strand::Plus, "").unwrap()
    }

    #[rstest]
    fn test_invalid_interval() {
        let err = Interval::new("chr1", 10, 9, Strand::Plus, "bad").unwrap_err();
        assert_eq!(
            err,
            GenomarkCoreError::InvalidInterval {
                chr: "chr1".to_string(),
                start: 10,
                end: 9
            }
        );
    }

    #[rstest]
    fn test_single_base_interval() {
        let i = make_interval(5, 5);
        assert_eq!(i.len(), 1);
        assert!(i.intersects_pos(5));
        assert!(!i.intersects_pos(6));
    }

    #[rstest]
    #[case(0, 9, true)]
    #[case(9, 9, true)]
    #[case(20, 30, true)]
    #[case(0, 8, false)]
    #[case(21, 25, false)]
    fn test_intersects(#[case] start: Pos, #[case] end: Pos, #[case] expected: bool) {
        let a = make_interval(9, 20);
        assert_eq!(a.intersects(&make_interval(start, end)), expected);
    }

    #[rstest]
    fn test_intersects_other_chromosome() {
        let a = make_interval(0, 100);
        let b = Interval::new("chr2", 0, 100, Strand::Plus, "").unwrap();
        assert!(!a.intersects(&b));
        assert!(!a.includes(&b));
        assert_eq!(a.distance(&b), None);
    }

    #[rstest]
    fn test_includes_and_intersect_size() {
        let a = make_interval(100, 200);
        assert!(a.includes(&make_interval(100, 200)));
        assert!(a.includes(&make_interval(150, 160)));
        assert!(!a.includes(&make_interval(90, 160)));
        assert_eq!(a.intersect_size(&make_interval(90, 110)), 11);
        assert_eq!(a.intersect_size(&make_interval(300, 310)), 0);
    }

    #[rstest]
    fn test_distance() {
        let a = make_interval(100, 200);
        assert_eq!(a.distance(&make_interval(150, 250)), Some(0));
        assert_eq!(a.distance(&make_interval(201, 250)), Some(1));
        assert_eq!(a.distance(&make_interval(210, 250)), Some(10));
        assert_eq!(a.distance(&make_interval(10, 90)), Some(10));
    }

    #[rstest]
    fn test_union_and_intersect() {
        let a = make_interval(100, 200);
        let b = make_interval(150, 300);
        assert_eq!(a.union(&b).unwrap(), make_interval(100, 300));
        assert_eq!(a.intersect(&b).unwrap(), make_interval(150, 200));
        assert!(a.intersect(&make_interval(500, 600)).is_none());
    }

    #[rstest]
    fn test_minus_fully_covered() {
        let a = make_interval(100, 200);
        assert!(a.minus(&make_interval(50, 250)).is_empty());
        assert!(a.minus(&make_interval(100, 200)).is_empty());
    }

    #[rstest]
    fn test_minus_left_overlap() {
        let a = make_interval(100, 200);
        assert_eq!(a.minus(&make_interval(50, 120)), vec![make_interval(121, 200)]);
    }

    #[rstest]
    fn test_minus_right_overlap() {
        let a = make_interval(100, 200);
        assert_eq!(a.minus(&make_interval(180, 250)), vec![make_interval(100, 179)]);
    }

    #[rstest]
    fn test_minus_middle() {
        let a = make_interval(100, 200);
        assert_eq!(
            a.minus(&make_interval(120, 130)),
            vec![make_interval(100, 119), make_interval(131, 200)]
        );
    }

    #[rstest]
    fn test_minus_disjoint() {
        let a = make_interval(100, 200);
        assert_eq!(a.minus(&make_interval(300, 400)), vec![a.clone()]);
    }

    #[rstest]
    fn test_ordering() {
        let mut intervals = vec![
            Interval::new("chr10", 0, 10, Strand::Plus, "a").unwrap(),
            Interval::new("chrX", 0, 10, Strand::Plus, "b").unwrap(),
            Interval::new("chr2", 5, 10, Strand::Plus, "c").unwrap(),
            Interval::new("chr2", 5, 8, Strand::Plus, "d").unwrap(),
            Interval::new("chr2", 5, 8, Strand::Plus, "a").unwrap(),
        ];
        intervals.sort();
        let ids: Vec<&str> = intervals.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d", "c", "a", "b"]);
        assert_eq!(intervals[0].chr, "chr2");
        assert_eq!(intervals[3].chr, "chr10");
    }
}
