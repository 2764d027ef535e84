use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant};

use crate::effect::{EffectType, VariantEffects};
use crate::errors::MarkerError;
use crate::features::SpliceSite;
use crate::marker::{Marker, MarkerKind, impl_marker};

///
/// Gap between two consecutive exons of a transcript. Introns are derived
/// from the exons, never annotated directly.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intron {
    #[serde(flatten)]
    pub marker: Marker,
    pub rank: u32,
    /// Acceptor, donor and splice regions inside this intron.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub splice_sites: Vec<SpliceSite>,
}

impl_marker!(Intron, marker);

impl Intron {
    pub fn new(
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
        rank: u32,
    ) -> Result<Self, MarkerError> {
        Ok(Intron {
            marker: Marker::new(chr, start, end, strand, id, MarkerKind::Intron)?,
            rank,
            splice_sites: Vec::new(),
        })
    }

    ///
    /// Intronic splice regions: `[min, max]` bases away from each intron
    /// end, `max` clipped to the intron length.
    ///
    pub fn splice_site_regions(&self, min: Pos, max: Pos) -> Vec<SpliceSite> {
        let max = max.min(self.len());
        let min = min.min(max);
        if max <= 0 {
            return Vec::new();
        }
        let mut sites = Vec::with_capacity(2);
        let (start_suffix, end_suffix) = if self.is_strand_plus() {
            ("region_donor", "region_acceptor")
        } else {
            ("region_acceptor", "region_donor")
        };
        sites.extend(SpliceSite::within(
            MarkerKind::SpliceSiteRegion,
            &self.marker,
            self.start() + min - 1,
            self.start() + max - 1,
            start_suffix,
        ));
        sites.extend(SpliceSite::within(
            MarkerKind::SpliceSiteRegion,
            &self.marker,
            self.end() - max + 1,
            self.end() - min + 1,
            end_suffix,
        ));
        sites
    }

    /// The intron after `variant`; splice sites deleted by it are dropped.
    pub fn apply(&self, variant: &Variant) -> Result<Option<Intron>, MarkerError> {
        let Some(marker) = self.marker.apply(variant)? else {
            return Ok(None);
        };
        let mut splice_sites = Vec::with_capacity(self.splice_sites.len());
        for site in self.splice_sites.iter() {
            splice_sites.extend(site.apply(variant)?);
        }
        Ok(Some(Intron {
            marker,
            rank: self.rank,
            splice_sites,
        }))
    }

    pub fn variant_effect(&self, variant: &Variant, effects: &mut VariantEffects) -> bool {
        if !self.intersects(variant) {
            return false;
        }
        for site in self.splice_sites.iter() {
            site.variant_effect(variant, effects);
        }
        effects.add(&self.marker, EffectType::Intron, format!("intron {}", self.rank));
        true
    }
}
