//! Reference-cycle detection over container handles.

use crate::value::{container_id, Value};

/// Returns true iff some container reachable from `value` through enumerable
/// properties and sequence elements is pointer-identical to a container
/// already on the current path from the root.
///
/// Scalars, null and acyclic structures of any depth are false, as is
/// shared-but-acyclic (diamond) substructure. Accessor getters are evaluated
/// and their results traversed. The traversal state is allocated per call,
/// so the function is pure and reentrant.
pub fn is_circular(value: &Value) -> bool {
    detect(value, &mut Vec::new())
}

fn detect(value: &Value, path: &mut Vec<usize>) -> bool {
    match value {
        Value::Record(rc) => {
            let id = container_id(rc);
            if path.contains(&id) {
                return true;
            }
            path.push(id);
            let record = rc.borrow();
            let mut found = false;
            for (_, property) in record.iter() {
                if property.enumerable && detect(&property.read(&record), path) {
                    found = true;
                    break;
                }
            }
            drop(record);
            path.pop();
            found
        }
        Value::Sequence(rc) => {
            let id = container_id(rc);
            if path.contains(&id) {
                return true;
            }
            path.push(id);
            let items = rc.borrow();
            let mut found = false;
            for item in items.iter() {
                if detect(item, path) {
                    found = true;
                    break;
                }
            }
            drop(items);
            path.pop();
            found
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Property, Record, Value};
    use std::rc::Rc;

    #[test]
    fn test_scalars_are_not_circular() {
        assert!(!is_circular(&Value::Null));
        assert!(!is_circular(&Value::Bool(true)));
        assert!(!is_circular(&Value::Int(1)));
        assert!(!is_circular(&Value::String("s".into())));
    }

    #[test]
    fn test_acyclic_nesting_is_not_circular() {
        let value = crate::value::from_json(r#"{"a":{"b":{"c":[1,{"d":2}]}}}"#).unwrap();
        assert!(!is_circular(&value));
    }

    #[test]
    fn test_direct_self_reference() {
        let rc = Record::new().into_ref();
        rc.borrow_mut().set("me", Value::Record(rc.clone()));
        assert!(is_circular(&Value::Record(rc)));
    }

    #[test]
    fn test_mutual_reference() {
        let p = Record::new().into_ref();
        let q = Record::new().into_ref();
        p.borrow_mut().set("next", Value::Record(q.clone()));
        q.borrow_mut().set("back", Value::Record(p.clone()));

        assert!(is_circular(&Value::Record(p)));
        assert!(is_circular(&Value::Record(q)));
    }

    #[test]
    fn test_cycle_through_sequence() {
        let rc = Record::new().into_ref();
        let items = Value::sequence(vec![Value::Int(1), Value::Record(rc.clone())]);
        rc.borrow_mut().set("items", items);
        assert!(is_circular(&Value::Record(rc)));
    }

    #[test]
    fn test_shared_substructure_is_not_a_cycle() {
        let shared = Value::record({
            let mut r = Record::new();
            r.set("x", Value::Int(1));
            r
        });
        let mut outer = Record::new();
        outer.set("a", shared.clone());
        outer.set("b", shared);

        assert!(!is_circular(&Value::record(outer)));
    }

    #[test]
    fn test_cycle_reached_through_getter() {
        let rc = Record::new().into_ref();
        let target = rc.clone();
        rc.borrow_mut().define(
            "me",
            Property::accessor(
                Some(Rc::new(move |_: &Record| Value::Record(target.clone()))),
                None,
            ),
        );
        assert!(is_circular(&Value::Record(rc)));
    }

    #[test]
    fn test_non_enumerable_branch_ignored() {
        let rc = Record::new().into_ref();
        let hidden = Property::stored(Value::Record(rc.clone())).with_enumerable(false);
        rc.borrow_mut().define("me", hidden);
        assert!(!is_circular(&Value::Record(rc)));
    }
}
