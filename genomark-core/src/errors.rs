use thiserror::Error;

use crate::models::Pos;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenomarkCoreError {
    #[error("Invalid interval {chr}:{start}-{end}: start is after end")]
    InvalidInterval { chr: String, start: Pos, end: Pos },

    #[error("Invalid strand: {0}")]
    InvalidStrand(String),

    #[error("Invalid allele '{0}': only IUPAC nucleotide codes are allowed")]
    InvalidAllele(String),

    #[error("Error parsing variant: {0}")]
    VariantParseError(String),
}
