use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::GenomarkCoreError;

///
/// Strand of a genomic feature. Unknown strand is treated as plus.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    pub fn is_plus(&self) -> bool {
        matches!(self, Strand::Plus)
    }

    pub fn is_minus(&self) -> bool {
        matches!(self, Strand::Minus)
    }

    /// `-` for minus, `+` otherwise.
    pub fn as_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }

    /// Anything but `-` is considered plus/unknown.
    pub fn from_char(c: char) -> Strand {
        match c {
            '-' => Strand::Minus,
            _ => Strand::Plus,
        }
    }

    pub fn opposite(&self) -> Strand {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }
}

impl FromStr for Strand {
    type Err = GenomarkCoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "." | "?" | "" | "1" | "+1" | "plus" => Ok(Strand::Plus),
            "-" | "-1" | "minus" => Ok(Strand::Minus),
            other => Err(GenomarkCoreError::InvalidStrand(other.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("+", Strand::Plus)]
    #[case(".", Strand::Plus)]
    #[case("-", Strand::Minus)]
    #[case("-1", Strand::Minus)]
    fn test_parse_strand(#[case] input: &str, #[case] expected: Strand) {
        assert_eq!(input.parse::<Strand>().unwrap(), expected);
    }

    #[rstest]
    fn test_parse_invalid_strand() {
        assert!("x".parse::<Strand>().is_err());
    }

    #[rstest]
    fn test_from_char() {
        assert_eq!(Strand::from_char('-'), Strand::Minus);
        assert_eq!(Strand::from_char('.'), Strand::Plus);
        assert_eq!(Strand::Minus.opposite(), Strand::Plus);
    }
}
