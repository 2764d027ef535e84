use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant};

use crate::effect::{EffectType, VariantEffects};
use crate::errors::MarkerError;
use crate::marker::{Marker, MarkerKind, ParentRef, impl_marker};

///
/// Splice acceptor, donor, region or branch site. The kind lives in the
/// marker.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpliceSite {
    #[serde(flatten)]
    pub marker: Marker,
}

impl_marker!(SpliceSite, marker);

impl SpliceSite {
    pub fn new(
        kind: MarkerKind,
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
    ) -> Result<Self, MarkerError> {
        if !kind.is_splice_site() {
            return Err(MarkerError::InvalidKind {
                expected: "splice site".to_string(),
                found: kind.to_string(),
            });
        }
        Ok(SpliceSite {
            marker: Marker::new(chr, start, end, strand, id, kind)?,
        })
    }

    /// Site `[start, end]` owned by `parent`, `None` for an empty range.
    pub(crate) fn within(
        kind: MarkerKind,
        parent: &Marker,
        start: Pos,
        end: Pos,
        suffix: &str,
    ) -> Option<Self> {
        if start > end {
            return None;
        }
        let id = format!("{}_{}", parent.id(), suffix);
        SpliceSite::new(kind, parent.chr(), start, end, parent.strand(), id)
            .ok()
            .map(|site| site.with_parent(parent.as_parent()))
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.marker.parent = Some(parent);
        self
    }

    pub fn apply(&self, variant: &Variant) -> Result<Option<SpliceSite>, MarkerError> {
        Ok(self
            .marker
            .apply(variant)?
            .map(|marker| SpliceSite { marker }))
    }

    pub fn variant_effect(&self, variant: &Variant, effects: &mut VariantEffects) -> bool {
        if !self.intersects(variant) {
            return false;
        }
        effects.add(&self.marker, EffectType::from(self.marker.kind), "");
        true
    }
}
