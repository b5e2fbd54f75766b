//! Combine module - deep structural combination of records.
//!
//! Two operations share one helper: [`extend`] overwrites on conflict and
//! deep-clones nested records, [`merge`] combines records field by field and
//! concatenates sequences, and [`is_circular`] guards `merge` against
//! unbounded recursion on self-referential inputs.

mod cycle;
mod extend;
mod merge;



pub use cycle::*;
pub use extend::*;
pub use merge::*;
