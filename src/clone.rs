//! Deep-copy traversal with cycle rejection
//!
//! Cloning reconstructs every reachable object, so the copy shares no
//! ownership with the source graph. Repeated references are not deduplicated:
//! two metadata entries aliasing the same node clone into two separate,
//! equivalent nodes (instancing is unsupported). A visiting set of node
//! identities tracks the active recursion path; reaching a node already on
//! the path means the graph contains a cycle, and the clone fails whole
//! rather than silently breaking or truncating it.

use std::collections::HashSet;

use crate::error::{CoreError, Result};
use crate::object::{ObjectRef, SerializableObject};
use crate::value::Value;

pub(crate) fn deep_clone_object(object: &ObjectRef) -> Result<ObjectRef> {
    let mut visiting = HashSet::new();
    clone_object(object, &mut visiting)
}

fn clone_object(object: &ObjectRef, visiting: &mut HashSet<usize>) -> Result<ObjectRef> {
    if !visiting.insert(object.id()) {
        return Err(CoreError::CyclicGraph);
    }
    let result = clone_object_inner(object, visiting);
    visiting.remove(&object.id());
    result
}

fn clone_object_inner(object: &ObjectRef, visiting: &mut HashSet<usize>) -> Result<ObjectRef> {
    let src = object.borrow();
    let mut dst = SerializableObject::with_schema(src.schema_name(), src.schema_version());
    for (name, value) in src.fields().typed() {
        let copied = clone_value(value, visiting)?;
        dst.fields.declare(name.clone(), copied);
    }
    for (name, value) in src.fields().dynamic() {
        let copied = clone_value(value, visiting)?;
        dst.set_dynamic_field(name.clone(), copied);
    }
    for (key, value) in src.metadata() {
        let copied = clone_value(value, visiting)?;
        dst.metadata_mut().insert(key.clone(), copied);
    }
    Ok(ObjectRef::new(dst))
}

fn clone_value(value: &Value, visiting: &mut HashSet<usize>) -> Result<Value> {
    Ok(match value {
        Value::Object(nested) => Value::Object(clone_object(nested, visiting)?),
        Value::List(items) => Value::List(
            items
                .iter()
                .map(|item| clone_value(item, visiting))
                .collect::<Result<_>>()?,
        ),
        Value::Map(map) => {
            let mut copied = crate::value::Dictionary::with_capacity(map.len());
            for (key, value) in map {
                copied.insert(key.clone(), clone_value(value, visiting)?);
            }
            Value::Map(copied)
        }
        other => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dictionary;

    fn fresh() -> ObjectRef {
        ObjectRef::new(SerializableObject::new())
    }

    #[test]
    fn test_clone_is_equivalent_and_independent() {
        let so = fresh();
        let mut nested = Dictionary::new();
        nested.insert("foo".to_string(), Value::from("bar"));
        so.metadata_set("meta_data", nested);

        let copy = so.deep_clone().unwrap();
        assert!(so.is_equivalent_to(&copy));

        copy.metadata_mut()
            .get_mut("meta_data")
            .and_then(Value::as_map_mut)
            .unwrap()
            .insert("foo".to_string(), Value::from("changed"));
        assert!(!so.is_equivalent_to(&copy));
    }

    #[test]
    fn test_repeated_reference_clones_to_separate_nodes() {
        let parent = fresh();
        let child = fresh();
        parent.metadata_set("child1", child.clone());
        parent.metadata_set("child2", child);

        let c1 = parent.metadata_get("child1").unwrap();
        let c2 = parent.metadata_get("child2").unwrap();
        assert!(ObjectRef::ptr_eq(c1.as_object().unwrap(), c2.as_object().unwrap()));

        let copy = parent.deep_clone().unwrap();
        let c1 = copy.metadata_get("child1").unwrap();
        let c2 = copy.metadata_get("child2").unwrap();
        let (c1, c2) = (c1.as_object().unwrap(), c2.as_object().unwrap());
        assert!(!ObjectRef::ptr_eq(c1, c2));
        assert!(c1.is_equivalent_to(c2));
    }

    #[test]
    fn test_direct_cycle_is_rejected() {
        let so = fresh();
        so.metadata_set("myself", so.clone());
        assert!(matches!(so.deep_clone().unwrap_err(), CoreError::CyclicGraph));
    }

    #[test]
    fn test_transitive_cycle_is_rejected() {
        let a = fresh();
        let b = fresh();
        a.metadata_set("next", b.clone());
        b.metadata_set("back", a.clone());
        assert!(matches!(a.deep_clone().unwrap_err(), CoreError::CyclicGraph));
    }

    #[test]
    fn test_diamond_without_cycle_succeeds() {
        // The same node reached twice along different paths is not a cycle.
        let root = fresh();
        let shared = fresh();
        let mut level = Dictionary::new();
        level.insert("left".to_string(), Value::from(shared.clone()));
        level.insert("right".to_string(), Value::from(shared));
        root.metadata_set("children", level);
        assert!(root.deep_clone().is_ok());
    }
}
