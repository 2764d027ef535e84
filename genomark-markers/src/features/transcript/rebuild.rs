//! Canonicalization passes run once the annotation has been loaded.

use std::cmp::{max, min};

use genomark_core::models::{Interval, Locus, Pos};

use crate::config::EffectConfig;
use crate::errors::MarkerError;
use crate::features::{Cds, Exon, Intron, SpliceSite, Transcript, Utr};
use crate::frame::{Frame, FrameType};
use crate::marker::{Marker, MarkerKind, MarkerLike};
use crate::sub_intervals::SubIntervals;

/// Coding bases of `locus`.
fn coding_overlap<L: Locus + ?Sized>(locus: &L, segments: &[Interval]) -> Pos {
    segments.iter().map(|s| locus.intersect_size(s)).sum()
}

///
/// Merge runs of adjacent (zero gap) children. `merge` gets the two
/// neighbours in genomic order and may refuse to merge them.
///
fn collapse_adjacent<T, F>(items: &SubIntervals<T>, merge: F) -> Option<SubIntervals<T>>
where
    T: MarkerLike + Clone,
    F: Fn(&T, &T) -> Option<T>,
{
    let mut merged: Vec<T> = Vec::with_capacity(items.len());
    let mut changed = false;
    for item in items.sorted() {
        if let Some(last) = merged.last_mut() {
            if last.same_chr(item) && last.end() + 1 == item.start() {
                if let Some(joined) = merge(last, item) {
                    *last = joined;
                    changed = true;
                    continue;
                }
            }
        }
        merged.push(item.clone());
    }
    changed.then(|| merged.into_iter().collect())
}

/// Ids of children fully included in a sibling (identical copies keep the
/// first one in genomic order).
fn redundant_ids<T: MarkerLike>(items: &SubIntervals<T>) -> Vec<String> {
    let sorted = items.sorted();
    let mut redundant = Vec::new();
    for (i, a) in sorted.iter().enumerate() {
        let covered = sorted.iter().enumerate().any(|(j, b)| {
            i != j
                && a.kind() == b.kind()
                && b.includes(*a)
                && ((b.start(), b.end()) != (a.start(), a.end()) || j < i)
        });
        if covered {
            redundant.push(a.id().to_string());
        }
    }
    redundant
}

impl Transcript {
    pub(crate) fn compute_introns(&self) -> Vec<Intron> {
        let plus = self.is_strand_plus();
        let exons = self.exons_sorted();
        let mut introns = Vec::with_capacity(exons.len().saturating_sub(1));
        for (i, pair) in exons.windows(2).enumerate() {
            let (start, end) = if plus {
                (pair[0].end() + 1, pair[1].start() - 1)
            } else {
                (pair[1].end() + 1, pair[0].start() - 1)
            };
            if start > end {
                continue;
            }
            let rank = (i + 1) as u32;
            if let Ok(mut intron) = Intron::new(
                self.chr(),
                start,
                end,
                self.strand(),
                format!("{}_intron_{}", self.id(), rank),
                rank,
            ) {
                intron.set_parent(self.marker.as_parent());
                introns.push(intron);
            }
        }
        introns
    }

    ///
    /// Merge exons (and CDS/UTR segments) separated by a zero length gap.
    /// The merged feature keeps the id and frame of its 5' part.
    ///
    pub fn collapse_zero_gap(&mut self) -> bool {
        let plus = self.is_strand_plus();
        let mut changed = false;

        let exons = collapse_adjacent(&self.exons, |a, b| {
            let (five, three) = if plus { (a, b) } else { (b, a) };
            let mut joined = Exon::new(a.chr(), a.start(), b.end(), a.strand(), five.id()).ok()?;
            joined.frame = five.frame;
            joined.seq.marker.parent = five.parent().cloned();
            if a.seq.has_sequence() && b.seq.has_sequence() {
                let plus_seq = a.seq.plus_strand_sequence() + &b.seq.plus_strand_sequence();
                joined.seq.set_sequence_from_plus(&plus_seq);
            }
            log::debug!("Merging exons '{}' and '{}'", five.id(), three.id());
            Some(joined)
        });
        if let Some(exons) = exons {
            self.exons = exons;
            changed = true;
        }

        let cds = collapse_adjacent(&self.cds, |a, b| {
            let five = if plus { a } else { b };
            let mut joined = Cds::new(a.chr(), a.start(), b.end(), a.strand(), five.id(), five.frame).ok()?;
            joined.marker.parent = five.parent().cloned();
            Some(joined)
        });
        if let Some(cds) = cds {
            self.cds = cds;
            changed = true;
        }

        let utrs = collapse_adjacent(&self.utrs, |a, b| {
            if a.kind() != b.kind() {
                return None;
            }
            let five = if plus { a } else { b };
            let mut joined = Utr::new(a.kind(), a.chr(), a.start(), b.end(), a.strand(), five.id()).ok()?;
            joined.marker.parent = five.parent().cloned();
            Some(joined)
        });
        if let Some(utrs) = utrs {
            self.utrs = utrs;
            changed = true;
        }

        if changed {
            self.invalidate();
        }
        changed
    }

    /// Remove exons, CDS and UTRs fully included in a sibling.
    pub fn remove_redundant(&mut self) -> bool {
        let exons = redundant_ids(&self.exons);
        let cds = redundant_ids(&self.cds);
        let utrs = redundant_ids(&self.utrs);
        if exons.is_empty() && cds.is_empty() && utrs.is_empty() {
            return false;
        }
        for id in exons.iter() {
            log::debug!("Removing redundant exon '{}' from '{}'", id, self.id());
            self.exons.remove(id);
        }
        for id in cds.iter() {
            self.cds.remove(id);
        }
        for id in utrs.iter() {
            self.utrs.remove(id);
        }
        self.invalidate();
        true
    }

    ///
    /// Create the UTRs implied by the CDS segments: exonic bases not covered
    /// by any CDS become 5'UTR before the coding start and 3'UTR after the
    /// coding end. Existing UTRs are kept.
    ///
    pub fn create_utrs_from_cds(&mut self) -> bool {
        if self.cds.is_empty() {
            return false;
        }
        let (Some(cds_start), Some(cds_end)) = (self.cds_start(), self.cds_end()) else {
            return false;
        };
        let plus = self.is_strand_plus();

        let mut created = Vec::new();
        for exon in self.exons.sorted() {
            let mut pieces = vec![exon.seq.marker.interval.clone()];
            for cds in self.cds.iter().filter(|c| c.intersects(exon)) {
                pieces = pieces.into_iter().flat_map(|p| p.minus(cds)).collect();
            }
            for (n, piece) in pieces.into_iter().enumerate() {
                if self.utrs.iter().any(|u| u.intersects(&piece)) {
                    continue;
                }
                let is_5prime = if plus {
                    piece.end < cds_start
                } else {
                    piece.start > cds_start
                };
                let is_3prime = if plus {
                    piece.start > cds_end
                } else {
                    piece.end < cds_end
                };
                let (kind, label) = match (is_5prime, is_3prime) {
                    (true, _) => (MarkerKind::Utr5Prime, "utr5"),
                    (_, true) => (MarkerKind::Utr3Prime, "utr3"),
                    _ => {
                        log::debug!("Non coding gap {} inside the coding region of '{}'", piece, self.id());
                        continue;
                    }
                };
                let id = format!("{}_{}_{}", exon.id(), label, n + 1);
                if let Ok(mut utr) = Utr::new(kind, piece.chr, piece.start, piece.end, self.strand(), id) {
                    utr.set_parent(exon.marker().as_parent());
                    created.push(utr);
                }
            }
        }

        if created.is_empty() {
            return false;
        }
        for utr in created {
            self.utrs.add(utr);
        }
        self.invalidate();
        true
    }

    /// Number exons 1..n in transcription order.
    pub fn rank_exons(&mut self) {
        let order: Vec<String> = self
            .exons_sorted()
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        for (rank, id) in order.iter().enumerate() {
            if let Some(exon) = self.exons.get_mut(id) {
                exon.rank = (rank + 1) as u32;
            }
        }
    }

    ///
    /// Shrink or grow the transcript to the span of its exons, CDS and UTRs.
    ///
    pub fn adjust(&mut self) -> bool {
        let spans = self
            .exons
            .iter()
            .map(|e| (e.start(), e.end()))
            .chain(self.cds.iter().map(|c| (c.start(), c.end())))
            .chain(self.utrs.iter().map(|u| (u.start(), u.end())));
        let span = spans.reduce(|a, b| (min(a.0, b.0), max(a.1, b.1)));
        match span {
            Some((start, end)) if (start, end) != (self.start(), self.end()) => {
                self.marker.set_range(start, end);
                true
            }
            _ => false,
        }
    }

    ///
    /// Fix exon frames so that each coding exon's frame matches the coding
    /// length before it.
    ///
    /// 1. Exons without a frame take it from the CDS starting at the same
    ///    base.
    /// 2. A first coding exon with a non-zero frame gets a synthetic 5'UTR
    ///    covering the skipped bases, and frame 0.
    /// 3. Every following coding exon whose frame disagrees with the coding
    ///    length so far is shifted inward until it agrees.
    ///
    pub fn frame_correction(&mut self, frame_type: FrameType) -> Result<bool, MarkerError> {
        let mut changed = self.frames_from_cds();
        changed |= self.frame_correction_first_coding_exon()?;
        changed |= self.frame_correction_coding_exons(frame_type)?;
        if changed {
            self.invalidate();
        }
        Ok(changed)
    }

    fn strand_start_of<L: Locus + ?Sized>(&self, locus: &L) -> Pos {
        if self.is_strand_plus() {
            locus.start()
        } else {
            locus.end()
        }
    }

    fn frames_from_cds(&mut self) -> bool {
        let plus = self.is_strand_plus();
        let frames: Vec<(Pos, Frame)> = self
            .cds
            .iter()
            .filter(|c| c.frame.is_known())
            .map(|c| (if plus { c.start() } else { c.end() }, c.frame))
            .collect();
        if frames.is_empty() {
            return false;
        }
        let mut changed = false;
        for exon in self.exons.iter_mut() {
            if exon.frame.is_known() {
                continue;
            }
            if let Some((_, frame)) = frames.iter().find(|(s, _)| *s == exon.strand_start()) {
                exon.frame = *frame;
                changed = true;
            }
        }
        changed
    }

    fn first_coding_exon_id(&self, segments: &[Interval]) -> Option<String> {
        self.exons_sorted()
            .into_iter()
            .find(|e| coding_overlap(*e, segments) > 0)
            .map(|e| e.id().to_string())
    }

    fn frame_correction_first_coding_exon(&mut self) -> Result<bool, MarkerError> {
        let segments = self.compute_coding_segments();
        let Some(id) = self.first_coding_exon_id(&segments) else {
            return Ok(false);
        };
        let Some(exon) = self.exons.get(&id) else {
            return Ok(false);
        };
        let frame = exon.frame;
        if !frame.is_known() || frame == Frame::ZERO {
            return Ok(false);
        }

        let plus = self.is_strand_plus();
        let skip = frame.value() as Pos;
        let coding_start = if plus {
            segments.iter().map(|s| s.start).min()
        } else {
            segments.iter().map(|s| s.end).max()
        };
        let Some(coding_start) = coding_start else {
            return Ok(false);
        };
        let (start, end) = if plus {
            (coding_start, coding_start + skip - 1)
        } else {
            (coding_start - skip + 1, coding_start)
        };
        log::debug!(
            "Transcript '{}': first coding exon '{}' has frame {}, adding a {} base 5'UTR",
            self.id(),
            id,
            frame,
            skip
        );

        let mut utr = Utr::new(
            MarkerKind::Utr5Prime,
            self.chr(),
            start,
            end,
            self.strand(),
            format!("{}_utr5_frame", id),
        )?;
        utr.set_parent(exon.marker().as_parent());
        self.utrs.add(utr);

        if let Some(exon) = self.exons.get_mut(&id) {
            exon.frame = Frame::ZERO;
        }
        for cds in self.cds.iter_mut() {
            let cds_start = if plus { cds.start() } else { cds.end() };
            if cds_start == coding_start {
                cds.frame_correction(skip);
                cds.frame = Frame::ZERO;
            }
        }
        Ok(true)
    }

    fn frame_correction_coding_exons(&mut self, frame_type: FrameType) -> Result<bool, MarkerError> {
        if frame_type == FrameType::Unknown {
            return Ok(false);
        }
        let order: Vec<String> = self
            .exons_sorted()
            .iter()
            .map(|e| e.id().to_string())
            .collect();

        let mut changed = false;
        let mut coding_length: Pos = 0;
        let mut first = true;
        for id in order.iter() {
            let segments = self.compute_coding_segments();
            let Some(exon) = self.exons.get(id) else {
                continue;
            };
            if coding_overlap(exon, &segments) == 0 {
                continue;
            }
            let expected = frame_type.frame_from_length(coding_length);
            let frame = exon.frame;

            if first {
                first = false;
                if frame.is_known() && frame != expected {
                    return Err(MarkerError::FrameCorrection {
                        transcript: self.id().to_string(),
                        reason: format!(
                            "first coding exon '{}' has frame {} after correction",
                            id, frame
                        ),
                    });
                }
            }

            if !frame.is_known() {
                if let Some(exon) = self.exons.get_mut(id) {
                    exon.frame = expected;
                }
                changed = true;
            } else if frame != expected {
                let shift = (frame.value() as Pos - expected.value() as Pos).rem_euclid(3);
                let exon_start = self.strand_start_of(exon);
                let shifted = self
                    .exons
                    .get_mut(id)
                    .is_some_and(|e| e.frame_correction(shift));
                if shifted {
                    let plus = self.is_strand_plus();
                    for cds in self.cds.iter_mut() {
                        let cds_start = if plus { cds.start() } else { cds.end() };
                        if cds_start == exon_start {
                            cds.frame_correction(shift);
                        }
                    }
                    changed = true;
                } else {
                    log::warn!(
                        "Transcript '{}': exon '{}' is too short to fix its frame",
                        self.id(),
                        id
                    );
                }
            }

            let segments = self.compute_coding_segments();
            if let Some(exon) = self.exons.get(id) {
                coding_length += coding_overlap(exon, &segments);
            }
        }
        Ok(changed)
    }

    ///
    /// Derive splice sites from the exon layout:
    ///
    /// * acceptor (before each exon but the first) and donor (after each
    ///   exon but the last), `splice_site_size` bases long but never longer
    ///   than the gap to the neighbouring exon;
    /// * exonic splice regions at the exon edges facing an intron;
    /// * intronic splice regions near both intron ends.
    ///
    pub fn create_splice_sites(&mut self, config: &EffectConfig) {
        let plus = self.is_strand_plus();
        let spans: Vec<(String, Pos, Pos)> = self
            .exons_sorted()
            .iter()
            .map(|e| (e.id().to_string(), e.start(), e.end()))
            .collect();
        let introns = self.compute_introns();

        let mut sites: Vec<(MarkerKind, Pos, Pos, &str)> = Vec::new();
        let n = spans.len();
        for (i, (id, start, end)) in spans.iter().enumerate() {
            let (start, end) = (*start, *end);
            let Some(exon) = self.exons.get_mut(id) else {
                continue;
            };
            exon.clear_splice_sites();

            if i > 0 {
                let (_, prev_start, prev_end) = &spans[i - 1];
                let gap = if plus {
                    start - prev_end - 1
                } else {
                    prev_start - end - 1
                };
                let size = min(config.splice_site_size, gap);
                if size > 0 {
                    let (s, e) = if plus {
                        (start - size, start - 1)
                    } else {
                        (end + 1, end + size)
                    };
                    sites.push((MarkerKind::SpliceSiteAcceptor, s, e, "acceptor"));
                }
                exon.create_splice_site_region_start(config.splice_region_exon_size);
            }

            if i + 1 < n {
                let (_, next_start, next_end) = &spans[i + 1];
                let gap = if plus {
                    next_start - end - 1
                } else {
                    start - next_end - 1
                };
                let size = min(config.splice_site_size, gap);
                if size > 0 {
                    let (s, e) = if plus {
                        (end + 1, end + size)
                    } else {
                        (start - size, start - 1)
                    };
                    sites.push((MarkerKind::SpliceSiteDonor, s, e, "donor"));
                }
                exon.create_splice_site_region_end(config.splice_region_exon_size);
            }
        }

        let mut intron_sites = Vec::new();
        for (kind, start, end, suffix) in sites {
            let owner = introns
                .iter()
                .find(|intron| intron.intersects_range(start, end) && intron.start() <= start && end <= intron.end());
            match owner {
                Some(intron) => {
                    intron_sites.extend(SpliceSite::within(kind, &intron.marker, start, end, suffix))
                }
                None => log::debug!(
                    "No intron owns {} site {}-{} of '{}'",
                    kind,
                    start,
                    end,
                    self.id()
                ),
            }
        }
        for intron in introns.iter() {
            intron_sites.extend(intron.splice_site_regions(
                config.splice_region_intron_min,
                config.splice_region_intron_max,
            ));
        }

        self.intron_splice_sites = intron_sites;
        self.invalidate();
    }

    ///
    /// Create the upstream and downstream flanks, clipped to the chromosome
    /// start and to `chr_end` when known.
    ///
    pub fn create_up_down_stream(&mut self, upstream: Pos, downstream: Pos, chr_end: Option<Pos>) {
        let plus = self.is_strand_plus();
        let (left_size, right_size) = if plus {
            (upstream, downstream)
        } else {
            (downstream, upstream)
        };

        let left = (left_size > 0 && self.start() > 0)
            .then(|| (max(0, self.start() - left_size), self.start() - 1));
        let right_end = self.end() + right_size;
        let right_end = chr_end.map_or(right_end, |c| min(c, right_end));
        let right = (right_size > 0 && self.end() < right_end).then(|| (self.end() + 1, right_end));

        let chr = self.chr().to_string();
        let strand = self.strand();
        let id = self.id().to_string();
        let parent = self.marker.as_parent();
        let flank = |range: Option<(Pos, Pos)>, kind: MarkerKind, label: &str| {
            range.and_then(|(s, e)| {
                Marker::new(&chr, s, e, strand, format!("{}_{}", id, label), kind)
                    .ok()
                    .map(|m| m.with_parent(parent.clone()))
            })
        };
        let (up_range, down_range) = if plus { (left, right) } else { (right, left) };
        let upstream = flank(up_range, MarkerKind::Upstream, "upstream");
        let downstream = flank(down_range, MarkerKind::Downstream, "downstream");
        self.upstream = upstream;
        self.downstream = downstream;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::transcript::tests::coding_transcript;
    use genomark_core::models::Strand;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn site_ranges(tr: &Transcript, kind: MarkerKind) -> Vec<(Pos, Pos)> {
        let mut ranges: Vec<(Pos, Pos)> = tr
            .intron_splice_sites()
            .iter()
            .filter(|s| s.kind() == kind)
            .map(|s| (s.start(), s.end()))
            .collect();
        ranges.sort();
        ranges
    }

    #[rstest]
    fn test_collapse_zero_gap() {
        let mut tr = Transcript::new("chr1", 100, 299, Strand::Minus, "tr1").unwrap();
        tr.add_exon(Exon::new("chr1", 100, 199, Strand::Minus, "exA").unwrap().with_frame(Frame::ONE))
            .unwrap();
        tr.add_exon(Exon::new("chr1", 200, 299, Strand::Minus, "exB").unwrap().with_frame(Frame::TWO))
            .unwrap();
        assert!(tr.collapse_zero_gap());
        assert_eq!(tr.exons().len(), 1);
        let exon = tr.exons().iter().next().unwrap();
        assert_eq!((exon.start(), exon.end()), (100, 299));
        // minus strand: the 5' part is the right one
        assert_eq!(exon.id(), "exB");
        assert_eq!(exon.frame, Frame::TWO);
        assert!(!tr.collapse_zero_gap());
    }

    #[rstest]
    fn test_remove_redundant() {
        let mut tr = coding_transcript(Strand::Plus);
        tr.add_exon(Exon::new("chr1", 320, 350, Strand::Plus, "inner").unwrap())
            .unwrap();
        tr.add_exon(Exon::new("chr1", 500, 599, Strand::Plus, "copy").unwrap())
            .unwrap();
        assert!(tr.remove_redundant());
        let mut ids: Vec<&str> = tr.exons().iter().map(|e| e.id()).collect();
        ids.sort();
        assert_eq!(ids, vec!["copy", "ex1", "ex2"]);
        assert!(!tr.remove_redundant());
    }

    #[rstest]
    #[case(Strand::Plus, vec![(100, 149, MarkerKind::Utr5Prime), (550, 599, MarkerKind::Utr3Prime)])]
    #[case(Strand::Minus, vec![(100, 149, MarkerKind::Utr3Prime), (550, 599, MarkerKind::Utr5Prime)])]
    fn test_create_utrs_from_cds(#[case] strand: Strand, #[case] expected: Vec<(Pos, Pos, MarkerKind)>) {
        let mut tr = coding_transcript(strand);
        assert!(tr.create_utrs_from_cds());
        let utrs: Vec<(Pos, Pos, MarkerKind)> = tr
            .utrs()
            .sorted()
            .iter()
            .map(|u| (u.start(), u.end(), u.kind()))
            .collect();
        assert_eq!(utrs, expected);
        assert!(!tr.create_utrs_from_cds());
    }

    #[rstest]
    fn test_rank_and_adjust() {
        let mut tr = coding_transcript(Strand::Minus);
        tr.rank_exons();
        assert_eq!(tr.exons().get("ex3").unwrap().rank, 1);
        assert_eq!(tr.exons().get("ex1").unwrap().rank, 3);

        tr.marker.set_range(0, 1000);
        assert!(tr.adjust());
        assert_eq!((tr.start(), tr.end()), (100, 599));
        assert!(!tr.adjust());
    }

    #[rstest]
    fn test_splice_sites_plus() {
        let mut tr = coding_transcript(Strand::Plus);
        tr.create_splice_sites(&EffectConfig::default());

        assert_eq!(site_ranges(&tr, MarkerKind::SpliceSiteDonor), vec![(200, 201), (400, 401)]);
        assert_eq!(site_ranges(&tr, MarkerKind::SpliceSiteAcceptor), vec![(298, 299), (498, 499)]);
        assert_eq!(
            site_ranges(&tr, MarkerKind::SpliceSiteRegion),
            vec![(202, 207), (292, 297), (402, 407), (492, 497)]
        );

        let ex1 = tr.exons().get("ex1").unwrap();
        assert!(ex1.splice_region_start.is_none());
        let end = ex1.splice_region_end.as_ref().unwrap();
        assert_eq!((end.start(), end.end()), (197, 199));

        let introns = tr.introns();
        assert_eq!(introns[0].splice_sites.len(), 4);
        assert!(introns[0]
            .splice_sites
            .iter()
            .all(|s| s.parent().unwrap().id == "tr1_intron_1"));
    }

    #[rstest]
    fn test_splice_sites_minus() {
        let mut tr = coding_transcript(Strand::Minus);
        tr.create_splice_sites(&EffectConfig::default());
        // on the minus strand donors follow the exon in transcription order
        assert_eq!(site_ranges(&tr, MarkerKind::SpliceSiteDonor), vec![(298, 299), (498, 499)]);
        assert_eq!(site_ranges(&tr, MarkerKind::SpliceSiteAcceptor), vec![(200, 201), (400, 401)]);
        let ex3 = tr.exons().get("ex3").unwrap();
        let end = ex3.splice_region_end.as_ref().unwrap();
        assert_eq!((end.start(), end.end()), (500, 502));
    }

    #[rstest]
    fn test_splice_sites_short_intron() {
        let mut tr = Transcript::new("chr1", 100, 210, Strand::Plus, "tr1").unwrap();
        tr.add_exon(Exon::new("chr1", 100, 199, Strand::Plus, "ex1").unwrap())
            .unwrap();
        tr.add_exon(Exon::new("chr1", 201, 210, Strand::Plus, "ex2").unwrap())
            .unwrap();
        tr.create_splice_sites(&EffectConfig::default());
        // single base intron at 200
        assert_eq!(site_ranges(&tr, MarkerKind::SpliceSiteDonor), vec![(200, 200)]);
        assert_eq!(site_ranges(&tr, MarkerKind::SpliceSiteAcceptor), vec![(200, 200)]);
    }

    #[rstest]
    fn test_up_down_stream() {
        let mut tr = coding_transcript(Strand::Minus);
        tr.create_up_down_stream(1000, 50, Some(1200));
        let up = tr.upstream().unwrap();
        assert_eq!((up.start(), up.end()), (600, 1200));
        let down = tr.downstream().unwrap();
        assert_eq!((down.start(), down.end()), (50, 99));
        assert_eq!(up.id(), "tr1_upstream");
        assert_eq!(up.parent().map(|p| p.id.as_str()), Some("tr1"));
        assert_eq!(down.strand(), Strand::Minus);
    }

    #[rstest]
    fn test_frame_correction_first_exon() {
        // first coding exon starts with frame 1: one base goes to a new 5'UTR
        let mut tr = Transcript::new("chr1", 100, 399, Strand::Plus, "tr1")
            .unwrap()
            .with_biotype("protein_coding");
        tr.add_exon(Exon::new("chr1", 100, 199, Strand::Plus, "ex1").unwrap())
            .unwrap();
        tr.add_exon(Exon::new("chr1", 300, 399, Strand::Plus, "ex2").unwrap())
            .unwrap();
        tr.add_cds(Cds::new("chr1", 100, 199, Strand::Plus, "cds1", Frame::ONE).unwrap())
            .unwrap();
        tr.add_cds(Cds::new("chr1", 300, 399, Strand::Plus, "cds2", Frame::UNKNOWN).unwrap())
            .unwrap();

        assert!(tr.frame_correction(FrameType::Gff).unwrap());
        let utr = tr.utrs().get("ex1_utr5_frame").unwrap();
        assert_eq!((utr.start(), utr.end()), (100, 100));
        assert_eq!(tr.cds_start(), Some(101));
        assert_eq!(tr.exons().get("ex1").unwrap().frame, Frame::ZERO);
        // 99 coding bases in ex1
        assert_eq!(tr.exons().get("ex2").unwrap().frame, Frame::ZERO);
    }

    #[rstest]
    fn test_frame_correction_shifts_exon() {
        // ex1 has 100 coding bases, so ex2 should have GFF frame 2; it says 0
        let mut tr = Transcript::new("chr1", 100, 399, Strand::Plus, "tr1")
            .unwrap()
            .with_biotype("protein_coding");
        tr.add_exon(Exon::new("chr1", 100, 199, Strand::Plus, "ex1").unwrap().with_frame(Frame::ZERO))
            .unwrap();
        tr.add_exon(
            Exon::new("chr1", 300, 399, Strand::Plus, "ex2")
                .unwrap()
                .with_frame(Frame::ZERO)
                .with_sequence(&"ACGT".repeat(25)),
        )
        .unwrap();

        assert!(tr.frame_correction(FrameType::Gff).unwrap());
        let ex2 = tr.exons().get("ex2").unwrap();
        assert_eq!(ex2.frame, Frame::TWO);
        assert_eq!(ex2.start(), 301);
        assert_eq!(ex2.sequence().len(), 99);
        assert!(!tr.frame_correction(FrameType::Gff).unwrap());
    }

    #[rstest]
    fn test_frame_correction_fills_unknown() {
        let mut tr = coding_transcript(Strand::Minus);
        assert!(tr.frame_correction(FrameType::Ucsc).unwrap());
        let frames: Vec<Frame> = tr.exons_sorted().iter().map(|e| e.frame).collect();
        // coding lengths before each exon: 0, 50, 150
        assert_eq!(frames, vec![Frame::ZERO, Frame::TWO, Frame::ZERO]);
    }
}
