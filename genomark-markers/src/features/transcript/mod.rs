mod cache;
mod coding;
mod effect;
mod rebuild;

use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant};

use crate::errors::MarkerError;
use crate::features::{Cds, Exon, Intron, SpliceSite, Utr};
use crate::marker::{Marker, MarkerKind, MarkerLike, impl_locus};
use crate::sub_intervals::SubIntervals;

use cache::TranscriptCache;

///
/// A transcript and everything it owns: exons, coding segments, UTRs,
/// splice sites and flanking regions. Introns are derived from the exons.
///
/// Derived values (introns, coding sequence, protein, coordinate maps) are
/// cached; every `*_mut` accessor and `add_*` method drops the cache.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(flatten)]
    pub marker: Marker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biotype: Option<String>,
    #[serde(default)]
    pub protein_coding: bool,
    #[serde(default)]
    exons: SubIntervals<Exon>,
    #[serde(default)]
    cds: SubIntervals<Cds>,
    #[serde(default)]
    utrs: SubIntervals<Utr>,
    #[serde(default)]
    splice_branches: SubIntervals<SpliceSite>,
    /// Acceptor, donor and intronic splice regions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    intron_splice_sites: Vec<SpliceSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upstream: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    downstream: Option<Marker>,
    #[serde(skip)]
    cache: TranscriptCache,
}

impl_locus!(Transcript, marker);

impl PartialEq for Transcript {
    fn eq(&self, other: &Self) -> bool {
        self.marker == other.marker
            && self.biotype == other.biotype
            && self.protein_coding == other.protein_coding
            && self.exons == other.exons
            && self.cds == other.cds
            && self.utrs == other.utrs
            && self.splice_branches == other.splice_branches
            && self.intron_splice_sites == other.intron_splice_sites
            && self.upstream == other.upstream
            && self.downstream == other.downstream
    }
}

impl Eq for Transcript {}

fn check_chr<L: Locus + ?Sized>(parent: &Marker, child: &L) -> Result<(), MarkerError> {
    if parent.same_chr(child) {
        Ok(())
    } else {
        Err(MarkerError::ChromosomeMismatch {
            child: format!("{}:{}-{} '{}'", child.chr(), child.start(), child.end(), child.id()),
            chr: parent.chr().to_string(),
        })
    }
}

/// Grow `parent` so that it covers `child`.
pub(crate) fn widen<L: Locus + ?Sized>(parent: &mut Marker, child: &L) -> bool {
    let mut changed = false;
    if child.start() < parent.start() {
        parent.interval.start = child.start();
        changed = true;
    }
    if child.end() > parent.end() {
        parent.interval.end = child.end();
        changed = true;
    }
    if changed {
        log::debug!(
            "{} '{}' widened to {}-{} to contain '{}'",
            parent.kind,
            parent.id(),
            parent.start(),
            parent.end(),
            child.id()
        );
    }
    changed
}

impl Transcript {
    pub fn new(
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
    ) -> Result<Self, MarkerError> {
        Ok(Transcript {
            marker: Marker::new(chr, start, end, strand, id, MarkerKind::Transcript)?,
            biotype: None,
            protein_coding: false,
            exons: SubIntervals::new(),
            cds: SubIntervals::new(),
            utrs: SubIntervals::new(),
            splice_branches: SubIntervals::new(),
            intron_splice_sites: Vec::new(),
            upstream: None,
            downstream: None,
            cache: TranscriptCache::default(),
        })
    }

    /// Set the biotype; `protein_coding` follows it.
    pub fn with_biotype(mut self, biotype: impl Into<String>) -> Self {
        let biotype = biotype.into();
        self.protein_coding = biotype == "protein_coding";
        self.biotype = Some(biotype);
        self
    }

    pub fn with_protein_coding(mut self, protein_coding: bool) -> Self {
        self.protein_coding = protein_coding;
        self
    }

    pub fn exons(&self) -> &SubIntervals<Exon> {
        &self.exons
    }

    pub fn exons_mut(&mut self) -> &mut SubIntervals<Exon> {
        self.invalidate();
        &mut self.exons
    }

    /// Exons in transcription order.
    pub fn exons_sorted(&self) -> Vec<&Exon> {
        self.exons.sorted_strand(self.strand())
    }

    pub fn cds(&self) -> &SubIntervals<Cds> {
        &self.cds
    }

    pub fn cds_mut(&mut self) -> &mut SubIntervals<Cds> {
        self.invalidate();
        &mut self.cds
    }

    pub fn utrs(&self) -> &SubIntervals<Utr> {
        &self.utrs
    }

    pub fn utrs_mut(&mut self) -> &mut SubIntervals<Utr> {
        self.invalidate();
        &mut self.utrs
    }

    pub fn splice_branches(&self) -> &SubIntervals<SpliceSite> {
        &self.splice_branches
    }

    pub fn intron_splice_sites(&self) -> &[SpliceSite] {
        &self.intron_splice_sites
    }

    pub fn upstream(&self) -> Option<&Marker> {
        self.upstream.as_ref()
    }

    pub fn downstream(&self) -> Option<&Marker> {
        self.downstream.as_ref()
    }

    ///
    /// Add an exon. The transcript grows if the exon reaches outside it; an
    /// exon with the same id replaces the previous one.
    ///
    pub fn add_exon(&mut self, mut exon: Exon) -> Result<(), MarkerError> {
        check_chr(&self.marker, &exon)?;
        widen(&mut self.marker, &exon);
        exon.set_parent(self.marker.as_parent());
        self.invalidate();
        self.exons.add(exon);
        Ok(())
    }

    pub fn add_cds(&mut self, mut cds: Cds) -> Result<(), MarkerError> {
        check_chr(&self.marker, &cds)?;
        widen(&mut self.marker, &cds);
        cds.set_parent(self.marker.as_parent());
        self.invalidate();
        self.cds.add(cds);
        Ok(())
    }

    pub fn add_utr(&mut self, mut utr: Utr) -> Result<(), MarkerError> {
        check_chr(&self.marker, &utr)?;
        widen(&mut self.marker, &utr);
        if utr.parent().is_none() {
            if let Some(exon) = self.exons.iter().find(|e| e.includes(&utr)) {
                utr.set_parent(exon.marker().as_parent());
            } else {
                utr.set_parent(self.marker.as_parent());
            }
        }
        self.invalidate();
        self.utrs.add(utr);
        Ok(())
    }

    pub fn add_splice_branch(&mut self, mut site: SpliceSite) -> Result<(), MarkerError> {
        check_chr(&self.marker, &site)?;
        if site.kind() != MarkerKind::SpliceSiteBranch {
            return Err(MarkerError::InvalidKind {
                expected: MarkerKind::SpliceSiteBranch.to_string(),
                found: site.kind().to_string(),
            });
        }
        site.set_parent(self.marker.as_parent());
        self.invalidate();
        self.splice_branches.add(site);
        Ok(())
    }

    /// Drop every cached value.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Incremented on every invalidation.
    pub fn cache_version(&self) -> u64 {
        self.cache.version
    }

    /// Introns between consecutive exons, in transcription order, each with
    /// the splice sites it contains.
    pub fn introns(&self) -> &[Intron] {
        self.cache.introns.get_or_init(|| {
            let mut introns = self.compute_introns();
            for intron in introns.iter_mut() {
                intron.splice_sites = self
                    .intron_splice_sites
                    .iter()
                    .filter(|s| intron.includes(*s))
                    .cloned()
                    .collect();
            }
            introns
        })
    }

    /// Total length of the exons (mRNA length).
    pub fn exonic_length(&self) -> Pos {
        self.exons.iter().map(|e| e.len()).sum()
    }

    /// Number of exonic bases in `[start, end]`.
    pub fn exonic_bases_between(&self, start: Pos, end: Pos) -> Pos {
        if start > end {
            return 0;
        }
        self.exons
            .iter()
            .filter(|e| e.intersects_range(start, end))
            .map(|e| e.end().min(end) - e.start().max(start) + 1)
            .sum()
    }

    ///
    /// This transcript after applying `variant`: every child moved, resized
    /// or dropped accordingly. `None` if the transcript is deleted.
    ///
    pub fn apply(&self, variant: &Variant) -> Result<Option<Transcript>, MarkerError> {
        let Some(marker) = self.marker.apply(variant)? else {
            return Ok(None);
        };
        let apply_marker = |m: &Option<Marker>| -> Result<Option<Marker>, MarkerError> {
            match m {
                Some(m) => m.apply(variant),
                None => Ok(None),
            }
        };
        let mut intron_splice_sites = Vec::with_capacity(self.intron_splice_sites.len());
        for site in self.intron_splice_sites.iter() {
            intron_splice_sites.extend(site.apply(variant)?);
        }

        Ok(Some(Transcript {
            marker,
            biotype: self.biotype.clone(),
            protein_coding: self.protein_coding,
            exons: self.exons.apply_each(|e| e.apply(variant))?,
            cds: self.cds.apply_each(|c| c.apply(variant))?,
            utrs: self.utrs.apply_each(|u| u.apply(variant))?,
            splice_branches: self.splice_branches.apply_each(|s| s.apply(variant))?,
            intron_splice_sites,
            upstream: apply_marker(&self.upstream)?,
            downstream: apply_marker(&self.downstream)?,
            cache: TranscriptCache::default(),
        }))
    }
}

impl MarkerLike for Transcript {
    fn marker(&self) -> &Marker {
        &self.marker
    }

    fn marker_mut(&mut self) -> &mut Marker {
        &mut self.marker
    }

    fn query_into<'a, L: Locus + ?Sized>(&'a self, locus: &L, out: &mut Vec<&'a Marker>) {
        for flank in self.upstream.iter().chain(self.downstream.iter()) {
            flank.query_into(locus, out);
        }
        if !self.intersects(locus) {
            return;
        }
        out.push(&self.marker);
        for exon in self.exons.iter() {
            exon.query_into(locus, out);
            for site in exon.splice_sites() {
                site.query_into(locus, out);
            }
        }
        for intron in self.introns() {
            intron.query_into(locus, out);
            for site in intron.splice_sites.iter() {
                site.query_into(locus, out);
            }
        }
        self.cds.query_into(locus, out);
        self.utrs.query_into(locus, out);
        self.splice_branches.query_into(locus, out);
    }
}
