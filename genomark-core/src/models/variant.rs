use std::cmp::{max, min};
use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::GenomarkCoreError;
use crate::models::{Locus, Pos, Strand};
use crate::utils::{is_iupac, reverse_complement};

///
/// Kind of sequence edit described by a [Variant].
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum VariantType {
    /// Single nucleotide substitution.
    Snp,
    /// Multiple nucleotide substitution (same length alleles).
    Mnp,
    /// Insertion.
    Ins,
    /// Deletion.
    Del,
    /// Substitution changing the length of the sequence.
    Mixed,
    /// Not a sequence change, just an interval probe.
    Interval,
}

impl Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VariantType::Snp => "SNP",
            VariantType::Mnp => "MNP",
            VariantType::Ins => "INS",
            VariantType::Del => "DEL",
            VariantType::Mixed => "MIXED",
            VariantType::Interval => "INTERVAL",
        };
        write!(f, "{}", s)
    }
}

///
/// A single edit of the reference sequence.
///
/// Alleles are stored upper-cased and in a canonical, prefix/suffix trimmed
/// form:
///
/// * `Snp`/`Mnp`: `reference` and `alternative` have the same length and
///   cover `[start, end]`.
/// * `Ins`: `reference` is empty, `alternative` holds the inserted bases,
///   `start == end` is the base the text is inserted *before*.
/// * `Del`: `alternative` is empty, `[start, end]` are the deleted bases.
/// * `Mixed`: `[start, end]` spans the reference bases replaced by
///   `alternative` (which has a different length).
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variant {
    chr: String,
    start: Pos,
    end: Pos,
    reference: String,
    alternative: String,
    variant_type: VariantType,
    strand: Strand,
    id: String,
}

fn validate_allele(allele: &str) -> Result<String, GenomarkCoreError> {
    if allele.bytes().all(is_iupac) {
        Ok(allele.to_ascii_uppercase())
    } else {
        Err(GenomarkCoreError::InvalidAllele(allele.to_string()))
    }
}

impl Variant {
    ///
    /// Create a variant from VCF-like alleles anchored at `pos` (0-based
    /// position of the first reference base).
    ///
    /// Shared leading and trailing bases are trimmed, and the variant type is
    /// inferred from what remains.
    ///
    pub fn new(
        chr: impl Into<String>,
        pos: Pos,
        reference: &str,
        alternative: &str,
    ) -> Result<Self, GenomarkCoreError> {
        let chr = chr.into();
        let reference = validate_allele(reference)?;
        let alternative = validate_allele(alternative)?;

        if reference == alternative {
            let end = pos + max(reference.len() as Pos, 1) - 1;
            return Ok(Variant {
                chr,
                start: pos,
                end,
                reference,
                alternative,
                variant_type: VariantType::Interval,
                strand: Strand::Plus,
                id: String::new(),
            });
        }

        let (r, a) = (reference.as_bytes(), alternative.as_bytes());
        let prefix = r.iter().zip(a.iter()).take_while(|(x, y)| x == y).count();
        let max_suffix = min(r.len(), a.len()) - prefix;
        let suffix = r[prefix..]
            .iter()
            .rev()
            .zip(a[prefix..].iter().rev())
            .take(max_suffix)
            .take_while(|(x, y)| x == y)
            .count();

        let reference = reference[prefix..reference.len() - suffix].to_string();
        let alternative = alternative[prefix..alternative.len() - suffix].to_string();
        let start = pos + prefix as Pos;

        let (variant_type, end) = match (reference.len(), alternative.len()) {
            (1, 1) => (VariantType::Snp, start),
            (r, a) if r == a => (VariantType::Mnp, start + r as Pos - 1),
            (0, _) => (VariantType::Ins, start),
            (r, 0) => (VariantType::Del, start + r as Pos - 1),
            (r, _) => (VariantType::Mixed, start + r as Pos - 1),
        };

        Ok(Variant {
            chr,
            start,
            end,
            reference,
            alternative,
            variant_type,
            strand: Strand::Plus,
            id: String::new(),
        })
    }

    ///
    /// A non-variant interval probe covering `[start, end]`.
    ///
    pub fn interval(chr: impl Into<String>, start: Pos, end: Pos) -> Result<Self, GenomarkCoreError> {
        let chr = chr.into();
        if start > end {
            return Err(GenomarkCoreError::InvalidInterval { chr, start, end });
        }
        Ok(Variant {
            chr,
            start,
            end,
            reference: String::new(),
            alternative: String::new(),
            variant_type: VariantType::Interval,
            strand: Strand::Plus,
            id: String::new(),
        })
    }

    /// Same variant on a differently named chromosome (e.g. `1` -> `chr1`).
    pub fn with_chr(mut self, chr: impl Into<String>) -> Self {
        self.chr = chr.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    ///
    /// Mark the alleles as being expressed on `strand`. Only plus strand
    /// variants can be applied to markers; see [Variant::to_plus_strand].
    ///
    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    ///
    /// Same edit expressed with plus strand alleles.
    ///
    pub fn to_plus_strand(&self) -> Variant {
        if self.strand.is_plus() {
            return self.clone();
        }
        Variant {
            reference: reverse_complement(&self.reference),
            alternative: reverse_complement(&self.alternative),
            strand: Strand::Plus,
            ..self.clone()
        }
    }

    pub fn variant_type(&self) -> VariantType {
        self.variant_type
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternative(&self) -> &str {
        &self.alternative
    }

    pub fn is_snp(&self) -> bool {
        self.variant_type == VariantType::Snp
    }

    pub fn is_mnp(&self) -> bool {
        self.variant_type == VariantType::Mnp
    }

    pub fn is_ins(&self) -> bool {
        self.variant_type == VariantType::Ins
    }

    pub fn is_del(&self) -> bool {
        self.variant_type == VariantType::Del
    }

    pub fn is_mixed(&self) -> bool {
        self.variant_type == VariantType::Mixed
    }

    pub fn is_interval(&self) -> bool {
        self.variant_type == VariantType::Interval
    }

    /// Any real sequence change (everything but an interval probe).
    pub fn is_variant(&self) -> bool {
        !self.is_interval()
    }

    /// Substitutions keep the sequence length.
    pub fn is_substitution(&self) -> bool {
        self.is_snp() || self.is_mnp()
    }

    ///
    /// Change in sequence length caused by the variant: positive for
    /// insertions, negative for deletions, zero for substitutions.
    ///
    pub fn length_change(&self) -> Pos {
        match self.variant_type {
            VariantType::Snp | VariantType::Mnp | VariantType::Interval => 0,
            _ => self.alternative.len() as Pos - self.reference.len() as Pos,
        }
    }

    ///
    /// Bases inserted (INS) or deleted (DEL) by this variant, reverse
    /// complemented when `strand` is minus. For other types the alternative
    /// allele is returned.
    ///
    pub fn net_change(&self, strand: Strand) -> String {
        let change = match self.variant_type {
            VariantType::Del => self.reference.clone(),
            _ => self.alternative.clone(),
        };
        if strand.is_minus() {
            reverse_complement(&change)
        } else {
            change
        }
    }

    ///
    /// Net change restricted to the part of the variant that falls inside
    /// `locus` (only deletions are clipped), in the orientation of `locus`.
    ///
    pub fn net_change_in<L: Locus + ?Sized>(&self, locus: &L) -> String {
        if !self.is_del() {
            return self.net_change(locus.strand());
        }
        let from = max(self.start, locus.start());
        let to = min(self.end, locus.end());
        if from > to {
            return String::new();
        }
        let clipped = &self.reference[(from - self.start) as usize..=(to - self.start) as usize];
        if locus.strand().is_minus() {
            reverse_complement(clipped)
        } else {
            clipped.to_string()
        }
    }

    ///
    /// Split a MIXED variant into a substitution over the shared length and
    /// an insertion or deletion of the remainder. Returns `None` for any
    /// other variant type.
    ///
    pub fn decompose(&self) -> Option<(Variant, Variant)> {
        if !self.is_mixed() {
            return None;
        }
        let shared = min(self.reference.len(), self.alternative.len());
        let subst = Variant {
            chr: self.chr.clone(),
            start: self.start,
            end: self.start + shared as Pos - 1,
            reference: self.reference[..shared].to_string(),
            alternative: self.alternative[..shared].to_string(),
            variant_type: if shared == 1 {
                VariantType::Snp
            } else {
                VariantType::Mnp
            },
            strand: self.strand,
            id: self.id.clone(),
        };

        let rest_start = self.start + shared as Pos;
        let indel = if self.alternative.len() > shared {
            Variant {
                chr: self.chr.clone(),
                start: rest_start,
                end: rest_start,
                reference: String::new(),
                alternative: self.alternative[shared..].to_string(),
                variant_type: VariantType::Ins,
                strand: self.strand,
                id: self.id.clone(),
            }
        } else {
            Variant {
                chr: self.chr.clone(),
                start: rest_start,
                end: self.end,
                reference: self.reference[shared..].to_string(),
                alternative: String::new(),
                variant_type: VariantType::Del,
                strand: self.strand,
                id: self.id.clone(),
            }
        };
        Some((subst, indel))
    }
}

impl Locus for Variant {
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

impl FromStr for Variant {
    type Err = GenomarkCoreError;

    ///
    /// Parse `chr:pos:ref:alt` (1-based `pos`, VCF style) or `chr:start-end`
    /// (1-based, inclusive) for an interval probe.
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        let parse_pos = |field: &str| -> Result<Pos, GenomarkCoreError> {
            let pos = field.trim().replace(',', "").parse::<Pos>().map_err(|e| {
                GenomarkCoreError::VariantParseError(format!("invalid position '{}': {}", field, e))
            })?;
            if pos < 1 {
                return Err(GenomarkCoreError::VariantParseError(format!(
                    "positions are 1-based, got {}",
                    pos
                )));
            }
            Ok(pos - 1)
        };

        match fields.as_slice() {
            [chr, pos, reference, alternative] => {
                let pos = parse_pos(pos)?;
                let reference = if *reference == "-" { "" } else { reference };
                let alternative = if *alternative == "-" { "" } else { alternative };
                Variant::new(*chr, pos, reference, alternative)
            }
            [chr, range] => {
                let (start, end) = range.split_once('-').ok_or_else(|| {
                    GenomarkCoreError::VariantParseError(format!("expected start-end, got '{}'", range))
                })?;
                Variant::interval(*chr, parse_pos(start)?, parse_pos(end)?)
            }
            _ => Err(GenomarkCoreError::VariantParseError(format!(
                "expected 'chr:pos:ref:alt' or 'chr:start-end', got '{}'",
                s
            ))),
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_interval() {
            return write!(f, "{}:{}-{}", self.chr, self.start, self.end);
        }
        let reference = if self.reference.is_empty() { "-" } else { &self.reference };
        let alternative = if self.alternative.is_empty() { "-" } else { &self.alternative };
        write!(f, "{}:{}_{}/{}", self.chr, self.start, reference, alternative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_snp() {
        let v = Variant::new("chr1", 104, "a", "g").unwrap();
        assert_eq!(v.variant_type(), VariantType::Snp);
        assert_eq!((v.start(), v.end()), (104, 104));
        assert_eq!(v.reference(), "A");
        assert_eq!(v.alternative(), "G");
        assert_eq!(v.length_change(), 0);
    }

    #[rstest]
    fn test_mnp_is_trimmed() {
        let v = Variant::new("chr1", 10, "ACGT", "ATTT").unwrap();
        assert_eq!(v.variant_type(), VariantType::Mnp);
        assert_eq!((v.start(), v.end()), (11, 12));
        assert_eq!(v.reference(), "CG");
        assert_eq!(v.alternative(), "TT");
    }

    #[rstest]
    fn test_mnp_trimmed_to_snp() {
        let v = Variant::new("chr1", 10, "ACG", "ATG").unwrap();
        assert_eq!(v.variant_type(), VariantType::Snp);
        assert_eq!(v.start(), 11);
    }

    #[rstest]
    fn test_insertion() {
        let v = Variant::new("chr1", 99, "A", "ATT").unwrap();
        assert_eq!(v.variant_type(), VariantType::Ins);
        assert_eq!((v.start(), v.end()), (100, 100));
        assert_eq!(v.reference(), "");
        assert_eq!(v.alternative(), "TT");
        assert_eq!(v.length_change(), 2);
        assert_eq!(v.net_change(Strand::Minus), "AA");
    }

    #[rstest]
    fn test_deletion() {
        let v = Variant::new("chr1", 102, "TACG", "T").unwrap();
        assert_eq!(v.variant_type(), VariantType::Del);
        assert_eq!((v.start(), v.end()), (103, 105));
        assert_eq!(v.reference(), "ACG");
        assert_eq!(v.length_change(), -3);
        assert_eq!(v.net_change(Strand::Plus), "ACG");
    }

    #[rstest]
    fn test_mixed() {
        let v = Variant::new("chr1", 10, "ACG", "TT").unwrap();
        assert_eq!(v.variant_type(), VariantType::Mixed);
        assert_eq!((v.start(), v.end()), (10, 12));
        assert_eq!(v.length_change(), -1);
    }

    #[rstest]
    fn test_same_alleles_is_interval() {
        let v = Variant::new("chr1", 10, "AC", "AC").unwrap();
        assert!(v.is_interval());
        assert!(!v.is_variant());
        assert_eq!((v.start(), v.end()), (10, 11));
    }

    #[rstest]
    fn test_invalid_allele() {
        assert!(Variant::new("chr1", 10, "A", "<DEL>").is_err());
    }

    #[rstest]
    fn test_net_change_clipped_to_locus() {
        let v = Variant::new("chr1", 95, "GAACCGGTTAC", "G").unwrap();
        assert_eq!((v.start(), v.end()), (96, 105));
        let locus = crate::models::Interval::new("chr1", 100, 120, Strand::Plus, "").unwrap();
        assert_eq!(v.net_change_in(&locus), "GGTTAC");
        let minus = crate::models::Interval::new("chr1", 100, 120, Strand::Minus, "").unwrap();
        assert_eq!(v.net_change_in(&minus), "GTAACC");
    }

    #[rstest]
    fn test_decompose_mixed_deletion() {
        let v = Variant::new("chr1", 10, "ACG", "TT").unwrap();
        let (subst, indel) = v.decompose().unwrap();
        assert_eq!(subst.variant_type(), VariantType::Mnp);
        assert_eq!((subst.start(), subst.end()), (10, 11));
        assert_eq!(indel.variant_type(), VariantType::Del);
        assert_eq!((indel.start(), indel.end()), (12, 12));
        assert_eq!(indel.reference(), "G");
    }

    #[rstest]
    fn test_decompose_mixed_insertion() {
        let v = Variant::new("chr1", 10, "AC", "TGA").unwrap();
        let (subst, indel) = v.decompose().unwrap();
        assert_eq!(subst.alternative(), "TG");
        assert_eq!(indel.variant_type(), VariantType::Ins);
        assert_eq!(indel.start(), 12);
        assert_eq!(indel.alternative(), "A");
    }

    #[rstest]
    fn test_to_plus_strand() {
        let v = Variant::new("chr1", 10, "A", "C")
            .unwrap()
            .with_strand(Strand::Minus);
        let plus = v.to_plus_strand();
        assert_eq!(plus.strand(), Strand::Plus);
        assert_eq!(plus.reference(), "T");
        assert_eq!(plus.alternative(), "G");
    }

    #[rstest]
    fn test_with_chr() {
        let v = Variant::new("1", 10, "AC", "A").unwrap().with_chr("chr1");
        assert_eq!(v.chr(), "chr1");
        assert_eq!((v.start(), v.end()), (11, 11));
        assert_eq!(v.variant_type(), VariantType::Del);
    }

    #[rstest]
    #[case("chr1:105:A:G", VariantType::Snp, 104, 104)]
    #[case("chr1:100:A:ATT", VariantType::Ins, 100, 100)]
    #[case("chr1:101:-:TT", VariantType::Ins, 100, 100)]
    #[case("chr1:103:TACG:T", VariantType::Del, 103, 105)]
    #[case("chr1:101-110", VariantType::Interval, 100, 109)]
    fn test_parse(
        #[case] input: &str,
        #[case] variant_type: VariantType,
        #[case] start: Pos,
        #[case] end: Pos,
    ) {
        let v: Variant = input.parse().unwrap();
        assert_eq!(v.variant_type(), variant_type);
        assert_eq!((v.start(), v.end()), (start, end));
    }

    #[rstest]
    fn test_parse_errors() {
        assert!("chr1".parse::<Variant>().is_err());
        assert!("chr1:0:A:G".parse::<Variant>().is_err());
        assert!("chr1:x:A:G".parse::<Variant>().is_err());
    }

    #[rstest]
    fn test_display() {
        let v = Variant::new("chr1", 102, "TACG", "T").unwrap();
        assert_eq!(v.to_string(), "chr1:103_ACG/-");
    }
}
