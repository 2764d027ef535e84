use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use genomark_core::models::Pos;

use crate::errors::MarkerError;

///
/// Reading frame of a coding feature: the number of bases to skip before
/// the first complete codon starts (0, 1 or 2), or unknown.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Frame(i8);

impl Frame {
    pub const UNKNOWN: Frame = Frame(-1);
    pub const ZERO: Frame = Frame(0);
    pub const ONE: Frame = Frame(1);
    pub const TWO: Frame = Frame(2);

    pub fn value(&self) -> i8 {
        self.0
    }

    pub fn is_known(&self) -> bool {
        self.0 >= 0
    }

    /// Frame after removing `bases` from the start of the feature.
    /// Unknown frames stay unknown.
    pub fn shifted(&self, bases: Pos) -> Frame {
        if !self.is_known() {
            return *self;
        }
        Frame((self.0 as Pos - bases).rem_euclid(3) as i8)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::UNKNOWN
    }
}

impl TryFrom<i64> for Frame {
    type Error = MarkerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1..=2 => Ok(Frame(value as i8)),
            other => Err(MarkerError::InvalidFrame(other)),
        }
    }
}

impl From<Frame> for i64 {
    fn from(frame: Frame) -> Self {
        frame.0 as i64
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}", self.0)
        } else {
            write!(f, ".")
        }
    }
}

///
/// Convention used to encode frames in the input annotation.
///
/// * `Gff`: frame is the number of bases to remove to reach the next codon,
///   `(3 - coding_length % 3) % 3`.
/// * `Ucsc`: frame is the number of bases of the previous codon that spill
///   into this exon, `coding_length % 3`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    #[default]
    Gff,
    Ucsc,
    Unknown,
}

impl FrameType {
    /// Expected frame of an exon preceded by `coding_length` coding bases.
    pub fn frame_from_length(&self, coding_length: Pos) -> Frame {
        let rem = coding_length.rem_euclid(3);
        match self {
            FrameType::Gff => Frame(((3 - rem) % 3) as i8),
            FrameType::Ucsc => Frame(rem as i8),
            FrameType::Unknown => Frame::UNKNOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 2)]
    #[case(2, 1)]
    #[case(3, 0)]
    #[case(7, 2)]
    fn test_gff_frame_from_length(#[case] len: Pos, #[case] expected: i8) {
        assert_eq!(FrameType::Gff.frame_from_length(len).value(), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(5, 2)]
    fn test_ucsc_frame_from_length(#[case] len: Pos, #[case] expected: i8) {
        assert_eq!(FrameType::Ucsc.frame_from_length(len).value(), expected);
    }

    #[rstest]
    #[case(Frame::ZERO, 1, Frame::TWO)]
    #[case(Frame::TWO, 1, Frame::ONE)]
    #[case(Frame::ONE, 1, Frame::ZERO)]
    #[case(Frame::TWO, 2, Frame::ZERO)]
    #[case(Frame::UNKNOWN, 1, Frame::UNKNOWN)]
    fn test_shifted(#[case] frame: Frame, #[case] bases: Pos, #[case] expected: Frame) {
        assert_eq!(frame.shifted(bases), expected);
    }

    #[rstest]
    fn test_frame_bounds() {
        assert!(Frame::try_from(3).is_err());
        assert!(Frame::try_from(-2).is_err());
        assert_eq!(Frame::try_from(-1).unwrap(), Frame::UNKNOWN);
        assert_eq!(Frame::default(), Frame::UNKNOWN);
    }

    #[rstest]
    fn test_frame_serde() {
        let json = serde_json::to_string(&Frame::TWO).unwrap();
        assert_eq!(json, "2");
        let frame: Frame = serde_json::from_str("-1").unwrap();
        assert_eq!(frame, Frame::UNKNOWN);
        assert!(serde_json::from_str::<Frame>("5").is_err());
    }
}
