//! The dynamic value model shared by fields and metadata
//!
//! Every field slot and metadata entry holds a [`Value`]: a discriminated sum
//! over the scalars, containers, object references, and opentime types the
//! interchange encoding can carry. Mappings are ordered ([`Dictionary`]) so
//! encoded documents keep a stable key order.

use indexmap::IndexMap;

use crate::object::ObjectRef;
use crate::opentime::{RationalTime, TimeRange, TimeTransform};

/// Ordered string-keyed mapping used for fields and metadata
pub type Dictionary = IndexMap<String, Value>;

/// A dynamically typed value
///
/// `Object` holds a shared handle: cloning a `Value::Object` aliases the same
/// live object rather than copying it. Deep copies go through the clone
/// engine, which reconstructs every reachable object.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Map(Dictionary),
    Object(ObjectRef),
    RationalTime(RationalTime),
    TimeRange(TimeRange),
    TimeTransform(TimeTransform),
}

impl Value {
    /// Name of the value's kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::RationalTime(_) => "rational_time",
            Value::TimeRange(_) => "time_range",
            Value::TimeTransform(_) => "time_transform",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Dictionary> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

/// Overlay `src` onto `dst`, last write wins per key
///
/// Unrelated keys in `dst` are left untouched.
pub fn update(dst: &mut Dictionary, src: &Dictionary) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Dictionary> for Value {
    fn from(v: Dictionary) -> Self {
        Value::Map(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl From<RationalTime> for Value {
    fn from(v: RationalTime) -> Self {
        Value::RationalTime(v)
    }
}

impl From<TimeRange> for Value {
    fn from(v: TimeRange) -> Self {
        Value::TimeRange(v)
    }
}

impl From<TimeTransform> for Value {
    fn from(v: TimeTransform) -> Self {
        Value::TimeTransform(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_overlays_and_preserves() {
        let mut dst = Dictionary::new();
        dst.insert("keep".to_string(), Value::Int(1));
        dst.insert("replace".to_string(), Value::Int(2));

        let mut src = Dictionary::new();
        src.insert("replace".to_string(), Value::Int(20));
        src.insert("add".to_string(), Value::Int(30));

        update(&mut dst, &src);

        assert_eq!(dst["keep"].as_int(), Some(1));
        assert_eq!(dst["replace"].as_int(), Some(20));
        assert_eq!(dst["add"].as_int(), Some(30));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::None.kind_name(), "none");
        assert_eq!(Value::from("x").kind_name(), "string");
        assert_eq!(Value::from(1.5).kind_name(), "double");
        assert_eq!(Value::Map(Dictionary::new()).kind_name(), "map");
    }
}
