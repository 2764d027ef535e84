use serde::{Deserialize, Serialize};

use genomark_core::models::{Locus, Pos, Strand, Variant};

use crate::errors::MarkerError;
use crate::frame::Frame;
use crate::marker::{Marker, MarkerKind, impl_marker};

/// Coding segment of a transcript, as annotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cds {
    #[serde(flatten)]
    pub marker: Marker,
    #[serde(default)]
    pub frame: Frame,
}

impl_marker!(Cds, marker);

impl Cds {
    pub fn new(
        chr: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
        id: impl Into<String>,
        frame: Frame,
    ) -> Result<Self, MarkerError> {
        Ok(Cds {
            marker: Marker::new(chr, start, end, strand, id, MarkerKind::Cds)?,
            frame,
        })
    }

    ///
    /// Move the 5' end of the segment `bases` inward and update the frame
    /// accordingly. Returns false if the segment is too short.
    ///
    pub fn frame_correction(&mut self, bases: Pos) -> bool {
        if bases <= 0 {
            return true;
        }
        if self.len() <= bases {
            return false;
        }
        if self.is_strand_plus() {
            self.marker.interval.start += bases;
        } else {
            self.marker.interval.end -= bases;
        }
        self.frame = self.frame.shifted(bases);
        true
    }

    pub fn apply(&self, variant: &Variant) -> Result<Option<Cds>, MarkerError> {
        Ok(self.marker.apply(variant)?.map(|marker| Cds {
            marker,
            frame: self.frame,
        }))
    }
}
