use once_cell::sync::OnceCell;

use genomark_core::models::{Interval, Pos};

use crate::features::Intron;

///
/// Values derived from a transcript's children. Every mutation of the
/// transcript replaces the whole cache and bumps the version.
///
#[derive(Debug, Clone, Default)]
pub(crate) struct TranscriptCache {
    pub(crate) version: u64,
    pub(crate) introns: OnceCell<Vec<Intron>>,
    pub(crate) coding_segments: OnceCell<Vec<Interval>>,
    pub(crate) cds_sequence: OnceCell<String>,
    pub(crate) protein: OnceCell<String>,
    pub(crate) cds_base_to_pos: OnceCell<Vec<Pos>>,
    pub(crate) aa_to_pos: OnceCell<Vec<(Pos, Pos)>>,
}

impl TranscriptCache {
    pub(crate) fn invalidate(&mut self) {
        let version = self.version + 1;
        *self = TranscriptCache {
            version,
            ..Default::default()
        };
    }
}
