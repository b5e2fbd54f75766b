//! Value module - in-memory representation of dynamic records.
//!
//! Containers are shared handles, so structures may alias or cycle through
//! them; properties carry full attribute descriptors (stored value or
//! accessor, plus enumerability and writability flags).

mod serialize;
mod value;

pub use serialize::*;
pub use value::*;
