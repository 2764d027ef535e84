use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use genomark_core::models::{Interval, Locus, Pos, Strand, Variant, VariantType};

use crate::effect::{EffectType, VariantEffects};
use crate::errors::MarkerError;

///
/// Kind of a node in the annotation tree.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkerKind {
    Genome,
    Chromosome,
    Gene,
    Transcript,
    Exon,
    Intron,
    Utr5Prime,
    Utr3Prime,
    Cds,
    SpliceSiteAcceptor,
    SpliceSiteDonor,
    SpliceSiteRegion,
    SpliceSiteBranch,
    Upstream,
    Downstream,
    Intergenic,
    Intragenic,
    Regulation,
    Motif,
    Custom,
    Generic,
}

impl MarkerKind {
    pub fn is_splice_site(&self) -> bool {
        matches!(
            self,
            MarkerKind::SpliceSiteAcceptor
                | MarkerKind::SpliceSiteDonor
                | MarkerKind::SpliceSiteRegion
                | MarkerKind::SpliceSiteBranch
        )
    }

    pub fn is_utr(&self) -> bool {
        matches!(self, MarkerKind::Utr5Prime | MarkerKind::Utr3Prime)
    }
}

impl Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", EffectType::from(*self))
    }
}

///
/// Non-owning link from a feature to its enclosing feature. Children are
/// owned by their parent; the link only lets a feature name its parent.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub kind: MarkerKind,
    pub id: String,
}

impl Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

///
/// The data every feature of the annotation tree carries: where it is, what
/// it is and who its parent is.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub interval: Interval,
    pub kind: MarkerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
}

impl Marker {
    pub fn new(
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
        kind: MarkerKind,
    ) -> Result<Self, MarkerError> {
        Ok(Marker {
            interval: Interval::new(chr, start, end, strand, id)?,
            kind,
            parent: None,
        })
    }

    pub fn from_interval(interval: Interval, kind: MarkerKind) -> Self {
        Marker {
            interval,
            kind,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Link to this marker, for its children.
    pub fn as_parent(&self) -> ParentRef {
        ParentRef {
            kind: self.kind,
            id: self.interval.id.clone(),
        }
    }

    pub fn shift(&mut self, delta: Pos) {
        self.interval.shift(delta);
    }

    pub fn set_range(&mut self, start: Pos, end: Pos) {
        self.interval.start = start;
        self.interval.end = end;
    }

    ///
    /// Coordinates of this marker in the sequence obtained after applying
    /// `variant`.
    ///
    /// Returns `Ok(None)` when the variant deletes the whole marker and an
    /// error when the variant cannot be applied (minus strand variants,
    /// MIXED variants straddling the marker boundaries).
    ///
    pub fn apply(&self, variant: &Variant) -> Result<Option<Marker>, MarkerError> {
        let interval = apply_coordinates(&self.interval, variant)?;
        Ok(interval.map(|interval| Marker {
            interval,
            kind: self.kind,
            parent: self.parent.clone(),
        }))
    }

    ///
    /// Default effect resolution: report this marker's own kind when the
    /// variant touches it.
    ///
    pub fn variant_effect(&self, variant: &Variant, effects: &mut VariantEffects) -> bool {
        if !self.intersects(variant) {
            return false;
        }
        effects.add(self, EffectType::from(self.kind), "");
        true
    }
}

impl Locus for Marker {
    fn chr(&self) -> &str {
        &self.interval.chr
    }

    fn start(&self) -> Pos {
        self.interval.start
    }

    fn end(&self) -> Pos {
        self.interval.end
    }

    fn strand(&self) -> Strand {
        self.interval.strand
    }

    fn id(&self) -> &str {
        &self.interval.id
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.kind, self.interval)
    }
}

/// Can `variant` change anything in `locus`? Variants starting after the
/// locus end (or on another chromosome) leave it untouched.
pub(crate) fn affects<L: Locus + ?Sized>(locus: &L, variant: &Variant) -> bool {
    locus.same_chr(variant) && variant.start() <= locus.end()
}

fn unsupported(interval: &Interval, variant: &Variant, reason: &str) -> MarkerError {
    MarkerError::UnsupportedVariant {
        variant: variant.to_string(),
        marker: interval.to_string(),
        reason: reason.to_string(),
    }
}

///
/// Coordinate algebra shared by every feature: where does `interval` end up
/// after `variant` is applied to the reference?
///
pub(crate) fn apply_coordinates(
    interval: &Interval,
    variant: &Variant,
) -> Result<Option<Interval>, MarkerError> {
    if variant.is_strand_minus() {
        return Err(MarkerError::MinusStrandVariant(variant.to_string()));
    }

    let mut result = interval.clone();
    if !affects(interval, variant) {
        return Ok(Some(result));
    }

    match variant.variant_type() {
        VariantType::Snp | VariantType::Mnp | VariantType::Interval => {}
        VariantType::Ins => apply_insertion(&mut result, variant),
        VariantType::Del => {
            if !apply_deletion(&mut result, variant) {
                return Ok(None);
            }
        }
        VariantType::Mixed => {
            if variant.end() < interval.start {
                result.shift(variant.length_change());
            } else if interval.includes(variant) {
                result.end += variant.length_change();
            } else {
                return Err(unsupported(
                    interval,
                    variant,
                    "MIXED variant crosses the feature boundary",
                ));
            }
        }
    }

    Ok(Some(result))
}

fn apply_insertion(interval: &mut Interval, variant: &Variant) {
    let len = variant.length_change();
    if variant.start() <= interval.start {
        interval.shift(len);
    } else if variant.start() <= interval.end {
        interval.end += len;
    }
}

/// Returns false when the deletion removes the whole interval.
fn apply_deletion(interval: &mut Interval, variant: &Variant) -> bool {
    let len = variant.length_change();

    if variant.end() < interval.start {
        interval.shift(len);
    } else if variant.includes(interval) {
        return false;
    } else if interval.includes(variant) {
        interval.end += len;
    } else {
        let overlap = interval.intersect_size(variant);
        interval.end -= overlap;
        if variant.start() < interval.start {
            interval.shift(variant.start() - interval.start);
        }
    }
    true
}

///
/// Common view over every feature of the tree.
///
pub trait MarkerLike: Locus {
    fn marker(&self) -> &Marker;

    fn marker_mut(&mut self) -> &mut Marker;

    fn kind(&self) -> MarkerKind {
        self.marker().kind
    }

    fn parent(&self) -> Option<&ParentRef> {
        self.marker().parent.as_ref()
    }

    fn set_parent(&mut self, parent: ParentRef) {
        self.marker_mut().parent = Some(parent);
    }

    ///
    /// Push every marker of this subtree intersecting `locus`. Leaves only
    /// report themselves.
    ///
    fn query_into<'a, L: Locus + ?Sized>(&'a self, locus: &L, out: &mut Vec<&'a Marker>) {
        if self.intersects(locus) {
            out.push(self.marker());
        }
    }
}

impl MarkerLike for Marker {
    fn marker(&self) -> &Marker {
        self
    }

    fn marker_mut(&mut self) -> &mut Marker {
        self
    }
}

/// Implement `Locus` for a feature by delegating to one of its fields.
macro_rules! impl_locus {
    ($ty:ty, $($field:ident).+) => {
        impl genomark_core::models::Locus for $ty {
            fn chr(&self) -> &str {
                &self.$($field).+.interval.chr
            }

            fn start(&self) -> genomark_core::models::Pos {
                self.$($field).+.interval.start
            }

            fn end(&self) -> genomark_core::models::Pos {
                self.$($field).+.interval.end
            }

            fn strand(&self) -> genomark_core::models::Strand {
                self.$($field).+.interval.strand
            }

            fn id(&self) -> &str {
                &self.$($field).+.interval.id
            }
        }
    };
}

/// `Locus` plus a leaf `MarkerLike` implementation.
macro_rules! impl_marker {
    ($ty:ty, $($field:ident).+) => {
        crate::marker::impl_locus!($ty, $($field).+);

        impl crate::marker::MarkerLike for $ty {
            fn marker(&self) -> &crate::marker::Marker {
                &self.$($field).+
            }

            fn marker_mut(&mut self) -> &mut crate::marker::Marker {
                &mut self.$($field).+
            }
        }
    };
}

pub(crate) use impl_locus;
pub(crate) use impl_marker;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn marker() -> Marker {
        Marker::new("chr1", 100, 109, Strand::Plus, "m1", MarkerKind::Exon).unwrap()
    }

    fn del(start: Pos, end: Pos) -> Variant {
        let reference = "A".repeat((end - start + 2) as usize);
        Variant::new("chr1", start - 1, &reference, "A").unwrap()
    }

    fn ins(before: Pos, bases: &str) -> Variant {
        // anchor base at `before - 1`, inserted text goes before `before`
        Variant::new("chr1", before - 1, "A", &format!("A{}", bases)).unwrap()
    }

    fn range(m: &Option<Marker>) -> Option<(Pos, Pos)> {
        m.as_ref().map(|m| (m.start(), m.end()))
    }

    #[rstest]
    #[case(del(90, 94), Some((95, 104)))] // before the marker
    #[case(del(95, 115), None)] // covers the marker
    #[case(del(100, 109), None)] // exactly the marker
    #[case(del(102, 104), Some((100, 106)))] // inside
    #[case(del(95, 104), Some((95, 99)))] // overlaps the start
    #[case(del(105, 115), Some((100, 104)))] // overlaps the end
    #[case(del(110, 120), Some((100, 109)))] // after
    fn test_apply_deletion(
        marker: Marker,
        #[case] variant: Variant,
        #[case] expected: Option<(Pos, Pos)>,
    ) {
        assert!(variant.is_del());
        assert_eq!(range(&marker.apply(&variant).unwrap()), expected);
    }

    #[rstest]
    #[case(ins(95, "GG"), (102, 111))]
    #[case(ins(100, "GG"), (102, 111))]
    #[case(ins(105, "GG"), (100, 111))]
    #[case(ins(109, "GGG"), (100, 112))]
    #[case(ins(110, "GG"), (100, 109))]
    fn test_apply_insertion(marker: Marker, #[case] variant: Variant, #[case] expected: (Pos, Pos)) {
        assert!(variant.is_ins());
        assert_eq!(range(&marker.apply(&variant).unwrap()), Some(expected));
    }

    #[rstest]
    fn test_apply_substitution(marker: Marker) {
        let snp = Variant::new("chr1", 104, "A", "T").unwrap();
        let applied = marker.apply(&snp).unwrap().unwrap();
        assert_eq!(applied, marker);

        let other_chr = Variant::new("chr2", 50, "AAA", "A").unwrap();
        assert_eq!(marker.apply(&other_chr).unwrap().unwrap(), marker);
    }

    #[rstest]
    fn test_apply_mixed(marker: Marker) {
        // AC -> GTT at 104..105: one base longer
        let inside = Variant::new("chr1", 104, "AC", "GTT").unwrap();
        assert!(inside.is_mixed());
        assert_eq!(range(&marker.apply(&inside).unwrap()), Some((100, 110)));

        // ends on the last base of the marker
        let at_end = Variant::new("chr1", 108, "AC", "GTT").unwrap();
        assert_eq!(range(&marker.apply(&at_end).unwrap()), Some((100, 110)));
        let shrinking = Variant::new("chr1", 107, "ACG", "T").unwrap();
        assert_eq!(range(&marker.apply(&shrinking).unwrap()), Some((100, 107)));

        let before = Variant::new("chr1", 90, "ACG", "T").unwrap();
        assert!(before.is_mixed());
        assert_eq!(range(&marker.apply(&before).unwrap()), Some((98, 107)));

        let straddling = Variant::new("chr1", 98, "ACGT", "G").unwrap();
        assert!(marker.apply(&straddling).is_err());
    }

    #[rstest]
    fn test_apply_minus_strand_variant(marker: Marker) {
        let snp = Variant::new("chr1", 104, "A", "T")
            .unwrap()
            .with_strand(Strand::Minus);
        assert!(matches!(
            marker.apply(&snp),
            Err(MarkerError::MinusStrandVariant(_))
        ));
    }

    #[rstest]
    fn test_apply_keeps_identity(marker: Marker) {
        let parent = ParentRef {
            kind: MarkerKind::Transcript,
            id: "tr1".to_string(),
        };
        let marker = marker.with_parent(parent.clone());
        let applied = marker.apply(&del(102, 104)).unwrap().unwrap();
        assert_eq!(applied.id(), "m1");
        assert_eq!(applied.kind, MarkerKind::Exon);
        assert_eq!(applied.parent, Some(parent));
    }

    #[rstest]
    fn test_default_variant_effect(marker: Marker) {
        let mut effects = VariantEffects::new();
        let hit = Variant::new("chr1", 105, "A", "C").unwrap();
        let miss = Variant::new("chr1", 150, "A", "C").unwrap();

        assert!(marker.variant_effect(&hit, &mut effects));
        assert!(!marker.variant_effect(&miss, &mut effects));
        assert_eq!(effects.effect_types(), vec![EffectType::Exon]);
    }
}
