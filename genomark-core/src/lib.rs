//! Core types for genomark: genomic intervals, strands, sequence variants and
//! the small sequence helpers shared by every other crate in the workspace.
//!
//! All coordinates are 0-based and *inclusive* on both ends: a one base
//! feature has `start == end`.
//!
//! # Example
//!
//! ```rust
//! use genomark_core::models::{Interval, Locus, Strand, Variant};
//!
//! let exon = Interval::new("chr1", 100, 109, Strand::Plus, "exon_1").unwrap();
//! let snp = Variant::new("chr1", 104, "A", "G").unwrap();
//!
//! assert!(exon.intersects(&snp));
//! assert_eq!(exon.len(), 10);
//! ```

pub mod errors;
pub mod models;
pub mod utils;

pub use errors::GenomarkCoreError;
