//! Structural equivalence between object graphs
//!
//! Two objects are equivalent when they share a concrete schema and their
//! typed fields, dynamic fields, and metadata compare equal recursively,
//! ignoring node identity. Recursion is guarded by the set of object pairs
//! currently under comparison: a pair reached again through a cycle is
//! treated as equal rather than recursed into, so comparison terminates even
//! on self-referential metadata.

use std::collections::HashSet;

use crate::object::ObjectRef;
use crate::value::{Dictionary, Value};

pub(crate) fn objects_equivalent(a: &ObjectRef, b: &ObjectRef) -> bool {
    let mut seen = HashSet::new();
    objects_equivalent_guarded(a, b, &mut seen)
}

fn objects_equivalent_guarded(
    a: &ObjectRef,
    b: &ObjectRef,
    seen: &mut HashSet<(usize, usize)>,
) -> bool {
    if ObjectRef::ptr_eq(a, b) {
        return true;
    }
    // Pair already on the comparison path: equal through the cycle.
    if !seen.insert((a.id(), b.id())) {
        return true;
    }

    let a = a.borrow();
    let b = b.borrow();
    a.schema_name() == b.schema_name()
        && a.schema_version() == b.schema_version()
        && dicts_equivalent(a.fields().typed(), b.fields().typed(), seen)
        && dicts_equivalent(a.fields().dynamic(), b.fields().dynamic(), seen)
        && dicts_equivalent(a.metadata(), b.metadata(), seen)
}

/// Same key sets, recursively equivalent values; insertion order is ignored
fn dicts_equivalent(a: &Dictionary, b: &Dictionary, seen: &mut HashSet<(usize, usize)>) -> bool {
    a.len() == b.len()
        && a.iter().all(|(key, a_val)| {
            b.get(key)
                .is_some_and(|b_val| values_equivalent(a_val, b_val, seen))
        })
}

fn values_equivalent(a: &Value, b: &Value, seen: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Double(a), Value::Double(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(a, b)| values_equivalent(a, b, seen))
        }
        (Value::Map(a), Value::Map(b)) => dicts_equivalent(a, b, seen),
        (Value::Object(a), Value::Object(b)) => objects_equivalent_guarded(a, b, seen),
        (Value::RationalTime(a), Value::RationalTime(b)) => a == b,
        (Value::TimeRange(a), Value::TimeRange(b)) => a == b,
        (Value::TimeTransform(a), Value::TimeTransform(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SerializableObject;

    fn fresh() -> ObjectRef {
        ObjectRef::new(SerializableObject::new())
    }

    #[test]
    fn test_reflexive_and_fresh_instances_equivalent() {
        let a = fresh();
        let b = fresh();
        assert!(a.is_equivalent_to(&a));
        assert!(a.is_equivalent_to(&b));
        assert!(b.is_equivalent_to(&a));
    }

    #[test]
    fn test_schema_mismatch_is_not_equivalent() {
        let a = fresh();
        let b = ObjectRef::new(SerializableObject::with_schema("Clip", 1));
        assert!(!a.is_equivalent_to(&b));
    }

    #[test]
    fn test_metadata_order_is_ignored() {
        let a = fresh();
        let b = fresh();
        a.metadata_set("x", 1);
        a.metadata_set("y", 2);
        b.metadata_set("y", 2);
        b.metadata_set("x", 1);
        assert!(a.is_equivalent_to(&b));
    }

    #[test]
    fn test_int_and_double_are_distinct_kinds() {
        let a = fresh();
        let b = fresh();
        a.metadata_set("n", 1);
        b.metadata_set("n", 1.0);
        assert!(!a.is_equivalent_to(&b));
    }

    #[test]
    fn test_self_referential_metadata_terminates() {
        let a = fresh();
        a.metadata_set("myself", a.clone());
        let b = fresh();
        b.metadata_set("myself", b.clone());
        // Each cycle edge resolves as equal instead of recursing forever.
        assert!(a.is_equivalent_to(&b));
        assert!(a.is_equivalent_to(&a));
    }

    #[test]
    fn test_nested_object_compared_by_value() {
        let a = fresh();
        let b = fresh();
        let child_a = fresh();
        child_a.metadata_set("k", "v");
        let child_b = fresh();
        child_b.metadata_set("k", "v");
        a.metadata_set("child", child_a);
        b.metadata_set("child", child_b);
        assert!(a.is_equivalent_to(&b));

        b.metadata_get("child")
            .and_then(|v| v.as_object().cloned())
            .unwrap()
            .metadata_set("k", "other");
        assert!(!a.is_equivalent_to(&b));
    }
}
