//! Accumulate-on-conflict combination.

use std::cell::RefCell;
use std::rc::Rc;

use super::cycle::is_circular;
use crate::value::{Property, Record, RecordRef, SequenceRef, Value};

/// Combines the sources left to right into one new record, accumulating on
/// conflict: records falling under the same key are combined field by field,
/// sequences are concatenated in source order, and a later null overwrites
/// any prior truthy value. Sources that are not records are silently
/// skipped; no input is ever mutated.
///
/// Two deliberate aliasing exceptions to the fresh-clone guarantee:
/// sequence elements are appended as shared handles rather than clones, and
/// a nested record that [`is_circular`] is aliased into the destination
/// instead of being cloned, which is what keeps recursion bounded.
pub fn merge(sources: &[Value]) -> RecordRef {
    let dest = Record::new().into_ref();
    for source in sources {
        if let Value::Record(src) = source {
            merge_into(&dest, src);
        }
    }
    dest
}

fn merge_into(dest: &RecordRef, src: &RecordRef) {
    let src = src.borrow();
    for (key, property) in src.iter() {
        if !property.enumerable {
            continue;
        }
        match property.read(&src) {
            Value::Sequence(items) => {
                let target = sequence_slot(dest, key);
                // Snapshot first: appending a sequence to itself must
                // terminate with its prior contents, not grow forever.
                let snapshot: Vec<Value> = items.borrow().iter().cloned().collect();
                target.borrow_mut().extend(snapshot);
            }
            Value::Record(nested) => {
                if is_circular(&Value::Record(nested.clone())) {
                    dest.borrow_mut()
                        .define(key, Property::stored(Value::Record(nested)));
                } else {
                    let prior = dest.borrow().get(key);
                    let combined = Record::new().into_ref();
                    if let Some(Value::Record(prior)) = prior {
                        merge_into(&combined, &prior);
                    }
                    merge_into(&combined, &nested);
                    dest.borrow_mut()
                        .define(key, Property::stored(Value::Record(combined)));
                }
            }
            Value::Null => {
                let prior_truthy = dest
                    .borrow()
                    .get(key)
                    .is_some_and(|prior| prior.is_truthy());
                if prior_truthy {
                    dest.borrow_mut().define(key, Property::stored(Value::Null));
                } else {
                    dest.borrow_mut().define(key, property.clone());
                }
            }
            _ => {
                dest.borrow_mut().define(key, property.clone());
            }
        }
    }
}

/// Returns the sequence already under `key`, or installs a fresh empty one
/// when the slot is missing or holds a non-sequence.
fn sequence_slot(dest: &RecordRef, key: &str) -> SequenceRef {
    let mut dest = dest.borrow_mut();
    if let Some(Value::Sequence(existing)) = dest.get(key) {
        return existing;
    }
    let fresh: SequenceRef = Rc::new(RefCell::new(Vec::new()));
    dest.define(key, Property::stored(Value::Sequence(fresh.clone())));
    fresh
}
