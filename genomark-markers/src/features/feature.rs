use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant};

use crate::effect::{EffectContext, VariantEffects};
use crate::errors::MarkerError;
use crate::features::{Cds, Chromosome, Exon, Gene, Intron, SpliceSite, Transcript, Utr};
use crate::marker::{Marker, MarkerKind, MarkerLike};

///
/// Any node of the annotation tree. Kinds without extra state (flanks,
/// intergenic/intragenic regions, regulation, custom features) are plain
/// markers.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "feature", content = "data", rename_all = "snake_case")]
#[allow(clippy::large_enum_variant)]
pub enum Feature {
    Chromosome(Chromosome),
    Gene(Gene),
    Transcript(Transcript),
    Exon(Exon),
    Intron(Intron),
    Utr(Utr),
    Cds(Cds),
    SpliceSite(SpliceSite),
    Generic(Marker),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            Feature::Chromosome($f) => $body,
            Feature::Gene($f) => $body,
            Feature::Transcript($f) => $body,
            Feature::Exon($f) => $body,
            Feature::Intron($f) => $body,
            Feature::Utr($f) => $body,
            Feature::Cds($f) => $body,
            Feature::SpliceSite($f) => $body,
            Feature::Generic($f) => $body,
        }
    };
}

impl Feature {
    pub fn marker(&self) -> &Marker {
        dispatch!(self, f => f.marker())
    }

    pub fn kind(&self) -> MarkerKind {
        self.marker().kind
    }

    ///
    /// The feature after `variant`, with all its children transformed.
    /// `Ok(None)` when the variant deletes it.
    ///
    pub fn apply(&self, variant: &Variant) -> Result<Option<Feature>, MarkerError> {
        Ok(match self {
            Feature::Chromosome(c) => c.apply(variant)?.map(Feature::Chromosome),
            Feature::Gene(g) => g.apply(variant)?.map(Feature::Gene),
            Feature::Transcript(t) => t.apply(variant)?.map(Feature::Transcript),
            Feature::Exon(e) => e.apply(variant)?.map(Feature::Exon),
            Feature::Intron(i) => i.apply(variant)?.map(Feature::Intron),
            Feature::Utr(u) => u.apply(variant)?.map(Feature::Utr),
            Feature::Cds(c) => c.apply(variant)?.map(Feature::Cds),
            Feature::SpliceSite(s) => s.apply(variant)?.map(Feature::SpliceSite),
            Feature::Generic(m) => m.apply(variant)?.map(Feature::Generic),
        })
    }

    ///
    /// Effects of `variant` on this feature. A detached UTR has no transcript
    /// to measure distances against, so it reports the bare UTR effect.
    ///
    pub fn variant_effect(
        &self,
        variant: &Variant,
        ctx: &EffectContext<'_>,
        effects: &mut VariantEffects,
    ) -> bool {
        match self {
            Feature::Chromosome(c) => c.variant_effect(variant, ctx, effects),
            Feature::Gene(g) => g.variant_effect(variant, ctx, effects),
            Feature::Transcript(t) => t.variant_effect(variant, ctx, effects),
            Feature::Exon(e) => e.variant_effect(variant, effects),
            Feature::Intron(i) => i.variant_effect(variant, effects),
            Feature::Utr(u) => u.variant_effect(variant, None, ctx, effects),
            Feature::Cds(c) => c.marker.variant_effect(variant, effects),
            Feature::SpliceSite(s) => s.variant_effect(variant, effects),
            Feature::Generic(m) => m.variant_effect(variant, effects),
        }
    }

    /// Markers of this feature's subtree intersecting `locus`.
    pub fn query<L: Locus + ?Sized>(&self, locus: &L) -> Vec<&Marker> {
        let mut out = Vec::new();
        dispatch!(self, f => f.query_into(locus, &mut out));
        out
    }
}

impl Locus for Feature {
    fn chr(&self) -> &str {
        self.marker().chr()
    }

    fn start(&self) -> Pos {
        self.marker().start()
    }

    fn end(&self) -> Pos {
        self.marker().end()
    }

    fn strand(&self) -> Strand {
        self.marker().strand()
    }

    fn id(&self) -> &str {
        self.marker().id()
    }
}

macro_rules! impl_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Feature {
                fn from(f: $variant) -> Self {
                    Feature::$variant(f)
                }
            }
        )*
    };
}

impl_from!(Chromosome, Gene, Transcript, Exon, Intron, Utr, Cds, SpliceSite);

impl From<Marker> for Feature {
    fn from(m: Marker) -> Self {
        Feature::Generic(m)
    }
}
