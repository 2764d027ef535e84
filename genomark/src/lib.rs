//! genomark: genome annotation trees, variant application and variant
//! effect resolution.
//!
//! Each member crate is re-exported behind a cargo feature of the same name.

#[cfg(feature = "core")]
#[doc(inline)]
pub use genomark_core as core;

#[cfg(feature = "markers")]
#[doc(inline)]
pub use genomark_markers as markers;
