//! The genomark marker tree: genes, transcripts, exons and every other
//! annotated feature of a genome, and the two algorithms run over it.
//!
//! - [`Marker::apply`] and the `apply` of every feature map a marker onto
//!   the sequence obtained after a variant (SNP, MNP, insertion, deletion).
//!   The original is never touched; a new tree is returned, or `None` when
//!   the variant deletes the feature.
//! - `variant_effect` walks the tree top-down and collects every
//!   [`VariantEffect`] of a variant into a [`VariantEffects`] sink.
//!
//! A tree is built once (genes added to a [`Genome`]), then
//! [`Genome::finalize`] canonicalizes transcripts, reconciles coding
//! frames and derives UTRs, splice sites and up/downstream flanks.
//!
//! ```rust
//! use genomark_core::models::{Strand, Variant};
//! use genomark_markers::{EffectConfig, EffectContext, EffectType, Exon, Gene, Genome, Transcript};
//!
//! let mut tr = Transcript::new("chr1", 1000, 1999, Strand::Plus, "tr1").unwrap();
//! tr.add_exon(Exon::new("chr1", 1000, 1199, Strand::Plus, "ex1").unwrap()).unwrap();
//! tr.add_exon(Exon::new("chr1", 1800, 1999, Strand::Plus, "ex2").unwrap()).unwrap();
//! let mut gene = Gene::new("chr1", 1000, 1999, Strand::Plus, "g1", "GENE1").unwrap();
//! gene.add_transcript(tr).unwrap();
//!
//! let mut genome = Genome::new("demo");
//! genome.add_gene(gene).unwrap();
//! let config = EffectConfig::default();
//! genome.finalize(&config).unwrap();
//!
//! let snp = Variant::new("chr1", 1500, "A", "G").unwrap();
//! let effects = genome.variant_effect(&snp, &EffectContext::new(&config));
//! assert_eq!(effects.effect_types(), vec![EffectType::Intron]);
//! ```

pub mod codon;
pub mod config;
pub mod effect;
pub mod errors;
pub mod features;
pub mod frame;
pub mod marker;
pub mod marker_seq;
pub mod sub_intervals;

pub use codon::{CodonChangeCalculator, CodonTable, FrameCodonChange, StandardCodonTable};
pub use config::EffectConfig;
pub use effect::{
    EffectContext, EffectImpact, EffectType, EffectWarning, VariantEffect, VariantEffects,
    WarningType,
};
pub use errors::MarkerError;
pub use features::*;
pub use frame::{Frame, FrameType};
pub use marker::{Marker, MarkerKind, MarkerLike, ParentRef};
pub use marker_seq::SeqMarker;
pub use sub_intervals::SubIntervals;
