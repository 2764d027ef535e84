//! Feature kinds of the annotation tree, from the genome down to splice
//! sites.

pub mod cds;
pub mod chromosome;
pub mod exon;
pub mod feature;
pub mod gene;
pub mod genome;
pub mod intron;
pub mod splice_site;
pub(crate) mod transcript;
pub mod utr;

pub use cds::Cds;
pub use chromosome::Chromosome;
pub use exon::Exon;
pub use feature::Feature;
pub use gene::Gene;
pub use genome::Genome;
pub use intron::Intron;
pub use splice_site::SpliceSite;
pub use transcript::Transcript;
pub use utr::Utr;
