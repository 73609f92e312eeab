//! Per-instance field storage
//!
//! Each object owns a [`FieldStore`]: the schema-declared typed slots plus an
//! open-ended dynamic map for keys the current schema does not recognize
//! (typically fields carried forward from a newer or older serialized
//! version). The two key sets are kept disjoint; every insertion path routes
//! through the store so the invariant holds.

use crate::error::{CoreError, Result};
use crate::value::{Dictionary, Value};

/// Typed + dynamic field storage for one object instance
#[derive(Debug, Default)]
pub struct FieldStore {
    typed: Dictionary,
    dynamic: Dictionary,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a typed slot with its default value
    ///
    /// Called by schema constructors before any data is assigned.
    pub fn declare(&mut self, name: impl Into<String>, default: Value) {
        let name = name.into();
        self.dynamic.shift_remove(&name);
        self.typed.insert(name, default);
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.typed.contains_key(name)
    }

    pub fn typed(&self) -> &Dictionary {
        &self.typed
    }

    pub fn dynamic(&self) -> &Dictionary {
        &self.dynamic
    }

    /// Read a declared field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.typed.get(name)
    }

    /// Assign a declared field, checking the value kind against the slot
    ///
    /// A slot whose current value is `None` accepts any kind; otherwise the
    /// incoming kind must match. `schema` is only used for error context.
    pub fn set(&mut self, schema: &str, name: &str, value: Value) -> Result<()> {
        let slot = self
            .typed
            .get_mut(name)
            .ok_or_else(|| CoreError::UnknownField {
                schema: schema.to_string(),
                field: name.to_string(),
            })?;
        if !slot.is_none() && !value.is_none() && slot.kind_name() != value.kind_name() {
            return Err(CoreError::FieldTypeMismatch {
                schema: schema.to_string(),
                field: name.to_string(),
                expected: slot.kind_name(),
                got: value.kind_name(),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Read a dynamic field
    pub fn get_dynamic(&self, name: &str) -> Option<&Value> {
        self.dynamic.get(name)
    }

    /// Store a field by key, routing to the typed slot when one is declared
    pub fn set_any(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.typed.get_mut(&name) {
            *slot = value;
        } else {
            self.dynamic.insert(name, value);
        }
    }

    /// Route every entry of a constructed field map into the store
    ///
    /// Keys matching declared slots land in typed fields, everything else in
    /// dynamic fields. Used by the registry after the upgrade chain runs.
    pub fn absorb(&mut self, fields: Dictionary) {
        for (name, value) in fields {
            self.set_any(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_routes_declared_and_unknown_keys() {
        let mut store = FieldStore::new();
        store.declare("name", Value::None);

        let mut fields = Dictionary::new();
        fields.insert("name".to_string(), Value::from("clip-1"));
        fields.insert("mystery".to_string(), Value::from(7));
        store.absorb(fields);

        assert_eq!(store.get("name").and_then(Value::as_str), Some("clip-1"));
        assert_eq!(store.get_dynamic("mystery").and_then(Value::as_int), Some(7));
        assert!(!store.dynamic().contains_key("name"));
    }

    #[test]
    fn test_set_unknown_field_fails() {
        let mut store = FieldStore::new();
        let err = store.set("Clip", "nope", Value::from(1)).unwrap_err();
        assert!(matches!(err, CoreError::UnknownField { .. }));
    }

    #[test]
    fn test_set_kind_mismatch_fails() {
        let mut store = FieldStore::new();
        store.declare("name", Value::None);
        store.set("Clip", "name", Value::from("ok")).unwrap();
        let err = store.set("Clip", "name", Value::from(3)).unwrap_err();
        assert!(matches!(err, CoreError::FieldTypeMismatch { .. }));
        // None always resets the slot
        store.set("Clip", "name", Value::None).unwrap();
        store.set("Clip", "name", Value::from(3)).unwrap();
    }

    #[test]
    fn test_declare_reclaims_dynamic_key() {
        let mut store = FieldStore::new();
        store.set_any("late", Value::from(1));
        store.declare("late", Value::None);
        assert!(store.is_declared("late"));
        assert!(store.get_dynamic("late").is_none());
    }
}
