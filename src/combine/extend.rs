//! Overwrite-on-conflict combination.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::{Property, PropertyValue, Record, RecordRef, Value};

/// Combines the sources left to right into one new record, overwriting on
/// conflict: a later source's value fully replaces an earlier one's, even
/// when both are records. Nested records are deep-cloned, so the result
/// shares no container with any input. Sources that are not records are
/// silently skipped; no input is ever mutated.
///
/// Cyclic inputs are not guarded here (`merge` is the operation that
/// tolerates cycles); depth is bounded by input nesting.
pub fn extend(sources: &[Value]) -> RecordRef {
    let dest = Record::new().into_ref();
    for source in sources {
        if let Value::Record(src) = source {
            extend_into(&dest, src);
        }
    }
    dest
}

fn extend_into(dest: &RecordRef, src: &RecordRef) {
    let src = src.borrow();
    for (key, property) in src.iter() {
        if !property.enumerable {
            continue;
        }
        // Dispatch on the evaluated value, so getters are observed here the
        // same way a plain read would observe them.
        match property.read(&src) {
            Value::Record(nested) => {
                let clone = clone_record(&nested);
                dest.borrow_mut()
                    .define(key, Property::stored(Value::Record(clone)));
            }
            _ => {
                dest.borrow_mut().define(key, transfer_property(property));
            }
        }
    }
}

/// Deep-clones a record in isolation by extending it into a fresh one.
fn clone_record(src: &RecordRef) -> RecordRef {
    let dest = Record::new().into_ref();
    extend_into(&dest, src);
    dest
}

/// Transfers a property descriptor across records: accessors move verbatim
/// with their flags, stored containers are deep-cloned so the destination
/// never aliases a source container.
fn transfer_property(property: &Property) -> Property {
    match &property.value {
        PropertyValue::Stored(v) => Property {
            value: PropertyValue::Stored(deep_clone(v)),
            enumerable: property.enumerable,
            writable: property.writable,
        },
        PropertyValue::Accessor { .. } => property.clone(),
    }
}

fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Sequence(items) => {
            let cloned: Vec<Value> = items.borrow().iter().map(deep_clone).collect();
            Value::Sequence(Rc::new(RefCell::new(cloned)))
        }
        Value::Record(rc) => Value::Record(clone_record(rc)),
        other => other.clone(),
    }
}
