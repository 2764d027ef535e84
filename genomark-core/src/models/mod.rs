pub mod interval;
pub mod strand;
pub mod variant;

// re-export for cleaner imports
pub use self::interval::{Interval, Locus, Pos};
pub use self::strand::Strand;
pub use self::variant::{Variant, VariantType};
