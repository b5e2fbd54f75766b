//! # Deep Combine
//!
//! Deep structural combination of dynamic records.
//!
//! This library provides two combination operations over any number of
//! record inputs, each producing a new, independent record: [`extend`]
//! overwrites on conflict and deep-clones nested records, while [`merge`]
//! combines nested records field by field, concatenates sequences, and uses
//! [`is_circular`] to alias rather than clone self-referential subgraphs.
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of records, sequences and scalars,
//!   with property descriptors (stored values or accessors) and a JSON/YAML
//!   codec boundary
//! - [`combine`] - The `extend` and `merge` operations and cycle detection

pub mod combine;
pub mod value;

pub use combine::{extend, is_circular, merge};
pub use value::{
    CodecError, Getter, Property, PropertyValue, Record, RecordRef, SequenceRef, Setter, Value,
};
