//! The base serializable object and its shared handle
//!
//! A [`SerializableObject`] is one node in an interchange document: a schema
//! identity fixed at construction, a typed/dynamic field store, and an ordered
//! metadata dictionary that may nest further objects. Live instances are held
//! through [`ObjectRef`], a reference-counted handle, so two objects can share
//! a mutable metadata value; typed fields stay exclusively owned by their
//! instance.
//!
//! Instances are not thread-safe: the handle is deliberately `!Send`, and
//! callers sharing one across threads must synchronize externally.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::clone::deep_clone_object;
use crate::equivalence::objects_equivalent;
use crate::error::{CoreError, Result};
use crate::fields::FieldStore;
use crate::value::{self, Dictionary, Value};

/// One node of an interchange object graph
#[derive(Debug)]
pub struct SerializableObject {
    schema_name: String,
    schema_version: u32,
    pub(crate) fields: FieldStore,
    pub(crate) metadata: Dictionary,
}

impl SerializableObject {
    /// Schema name of the base object
    pub const SCHEMA_NAME: &'static str = "SerializableObject";
    /// Current schema version of the base object
    pub const SCHEMA_VERSION: u32 = 1;

    /// A default instance of the base schema
    pub fn new() -> Self {
        Self::with_schema(Self::SCHEMA_NAME, Self::SCHEMA_VERSION)
    }

    /// A default instance of an arbitrary concrete schema
    pub fn with_schema(name: impl Into<String>, version: u32) -> Self {
        Self {
            schema_name: name.into(),
            schema_version: version,
            fields: FieldStore::new(),
            metadata: Dictionary::new(),
        }
    }

    /// Declare a typed field slot, builder style
    pub fn with_field(mut self, name: impl Into<String>, default: Value) -> Self {
        self.fields.declare(name, default);
        self
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    /// Read a declared field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Assign a declared field with kind checking
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        let schema = self.schema_name.clone();
        self.fields.set(&schema, name, value)
    }

    /// Read a field unknown to the current schema
    pub fn dynamic_field(&self, name: &str) -> Option<&Value> {
        self.fields.get_dynamic(name)
    }

    /// Store a field by key, routing to a typed slot when one is declared
    pub fn set_dynamic_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.set_any(name, value);
    }

    pub fn metadata(&self) -> &Dictionary {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Dictionary {
        &mut self.metadata
    }

    /// Overlay `src` onto this object's metadata, last write wins per key
    pub fn metadata_update(&mut self, src: &Dictionary) {
        value::update(&mut self.metadata, src);
    }
}

impl Default for SerializableObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a live [`SerializableObject`]
///
/// `Clone` on the handle aliases the same node (the explicit aliasing the
/// host program may create through metadata). Copying the node itself goes
/// through [`ObjectRef::deep_clone`]; a shallow copy of the underlying store
/// is refused.
#[derive(Debug, Clone)]
pub struct ObjectRef(Rc<RefCell<SerializableObject>>);

impl ObjectRef {
    pub fn new(object: SerializableObject) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    /// Whether two handles point at the same live node
    pub fn ptr_eq(a: &ObjectRef, b: &ObjectRef) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Stable identity of the node, used by the clone and equivalence guards
    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn borrow(&self) -> Ref<'_, SerializableObject> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, SerializableObject> {
        self.0.borrow_mut()
    }

    pub fn schema_name(&self) -> String {
        self.borrow().schema_name().to_string()
    }

    pub fn schema_version(&self) -> u32 {
        self.borrow().schema_version()
    }

    pub fn metadata(&self) -> Ref<'_, Dictionary> {
        Ref::map(self.borrow(), SerializableObject::metadata)
    }

    pub fn metadata_mut(&self) -> RefMut<'_, Dictionary> {
        RefMut::map(self.borrow_mut(), SerializableObject::metadata_mut)
    }

    /// Cloned value of one metadata entry
    ///
    /// An `Object` entry clones the handle, aliasing the nested node.
    pub fn metadata_get(&self, key: &str) -> Option<Value> {
        self.metadata().get(key).cloned()
    }

    pub fn metadata_set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata_mut().insert(key.into(), value.into());
    }

    pub fn metadata_update(&self, src: &Dictionary) {
        self.borrow_mut().metadata_update(src);
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.borrow().field(name).cloned()
    }

    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.borrow_mut().set_field(name, value.into())
    }

    pub fn dynamic_field(&self, name: &str) -> Option<Value> {
        self.borrow().dynamic_field(name).cloned()
    }

    pub fn set_dynamic_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.borrow_mut().set_dynamic_field(name, value.into());
    }

    /// Structural equivalence, ignoring node identity
    pub fn is_equivalent_to(&self, other: &ObjectRef) -> bool {
        objects_equivalent(self, other)
    }

    /// Deep copy of the reachable graph; fails on cycles
    pub fn deep_clone(&self) -> Result<ObjectRef> {
        deep_clone_object(self)
    }

    /// Shallow copies are refused: they would silently share the mutable
    /// field and metadata stores between two instances.
    pub fn shallow_copy(&self) -> Result<ObjectRef> {
        Err(CoreError::InvalidCopy)
    }
}

/// A composable node: no structure beyond the base contract
///
/// Exists to demonstrate that equivalence and metadata propagate through the
/// base object regardless of the concrete subtype.
pub struct Composable;

impl Composable {
    pub const SCHEMA_NAME: &'static str = "Composable";
    pub const SCHEMA_VERSION: u32 = 1;

    pub fn new() -> ObjectRef {
        ObjectRef::new(SerializableObject::with_schema(
            Self::SCHEMA_NAME,
            Self::SCHEMA_VERSION,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_identity_is_fixed() {
        let obj = ObjectRef::new(SerializableObject::with_schema("Clip", 2));
        assert_eq!(obj.schema_name(), "Clip");
        assert_eq!(obj.schema_version(), 2);
    }

    #[test]
    fn test_metadata_set_and_get() {
        let so = ObjectRef::new(SerializableObject::new());
        so.metadata_set("foo", "bar");
        assert_eq!(
            so.metadata_get("foo").as_ref().and_then(Value::as_str),
            Some("bar")
        );
    }

    #[test]
    fn test_handle_clone_aliases_node() {
        let a = ObjectRef::new(SerializableObject::new());
        let b = a.clone();
        assert!(ObjectRef::ptr_eq(&a, &b));
        b.metadata_set("via-b", 1);
        assert!(a.metadata_get("via-b").is_some());
    }

    #[test]
    fn test_shallow_copy_is_refused() {
        let so = ObjectRef::new(SerializableObject::new());
        assert!(matches!(
            so.shallow_copy().unwrap_err(),
            CoreError::InvalidCopy
        ));
    }

    #[test]
    fn test_typed_field_accessors() {
        let clip = ObjectRef::new(SerializableObject::with_schema("Clip", 1).with_field(
            "name",
            Value::None,
        ));
        clip.set_field("name", "shot-4").unwrap();
        assert_eq!(
            clip.field("name").as_ref().and_then(Value::as_str),
            Some("shot-4")
        );
        assert!(clip.set_field("missing", 1).is_err());
    }
}
