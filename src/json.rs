//! The canonical JSON adapter
//!
//! Encodes object graphs into self-describing JSON: every object node carries
//! the reserved discriminator key with a `"Name.Version"` label, its fields by
//! name (typed before dynamic), and its metadata under the reserved metadata
//! key. Decoding resolves each tagged node through the schema registry, with
//! children constructed before their parent. Nested objects are always
//! encoded inline; shared references fan out into independent copies on
//! decode.
//!
//! The file forms translate I/O failures into narrow error kinds so callers
//! can branch on "nothing there" versus "wrong kind of target" versus "not
//! allowed" the way they would on errno.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Map as JsonMap, Value as Json};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::object::ObjectRef;
use crate::opentime::{RationalTime, TimeRange, TimeTransform};
use crate::registry::{construct_from_schema, FieldMap};
use crate::value::{Dictionary, Value};

/// Reserved discriminator key carried by every encoded object node
pub const SCHEMA_TAG_KEY: &str = "SCENELINE_SCHEMA";

/// Reserved key holding an object node's metadata mapping
pub const METADATA_KEY: &str = "metadata";

/// Encode a value or object graph as indented JSON text
pub fn write_to_string(value: &Value) -> Result<String> {
    let mut visiting = HashSet::new();
    let json = value_to_json(value, &mut visiting)?;
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Decode JSON text, constructing every tagged node through the registry
pub fn read_from_string(text: &str) -> Result<Value> {
    let json: Json = serde_json::from_str(text)?;
    json_to_value(&json)
}

/// Encode to a file, translating I/O failures into narrow error kinds
pub fn write_to_file(value: &Value, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        #[cfg(unix)]
        return Err(CoreError::IsADirectory(path.to_path_buf()));
        // Platforms without a directory-write errno report permission denied.
        #[cfg(not(unix))]
        return Err(CoreError::PermissionDenied(path.to_path_buf()));
    }
    let text = write_to_string(value)?;
    debug!(path = %path.display(), bytes = text.len(), "writing document");
    fs::write(path, text).map_err(|err| translate_io(err, path))
}

/// Decode from a file, translating I/O failures into narrow error kinds
pub fn read_from_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading document");
    let text = fs::read_to_string(path).map_err(|err| translate_io(err, path))?;
    read_from_string(&text)
}

fn translate_io(err: io::Error, path: &Path) -> CoreError {
    match err.kind() {
        io::ErrorKind::NotFound => CoreError::FileNotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
        _ => CoreError::Io(err),
    }
}

fn schema_label(name: &str, version: u32) -> Json {
    Json::String(format!("{name}.{version}"))
}

fn value_to_json(value: &Value, visiting: &mut HashSet<usize>) -> Result<Json> {
    Ok(match value {
        Value::None => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Double(d) => Json::from(*d),
        Value::String(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| value_to_json(item, visiting))
                .collect::<Result<_>>()?,
        ),
        Value::Map(map) => Json::Object(dictionary_to_json(map, visiting)?),
        Value::Object(object) => object_to_json(object, visiting)?,
        Value::RationalTime(rt) => opaque_to_json("RationalTime", serde_json::to_value(rt)?),
        Value::TimeRange(tr) => opaque_to_json("TimeRange", serde_json::to_value(tr)?),
        Value::TimeTransform(tt) => opaque_to_json("TimeTransform", serde_json::to_value(tt)?),
    })
}

fn dictionary_to_json(map: &Dictionary, visiting: &mut HashSet<usize>) -> Result<JsonMap<String, Json>> {
    let mut out = JsonMap::new();
    for (key, value) in map {
        out.insert(key.clone(), value_to_json(value, visiting)?);
    }
    Ok(out)
}

fn opaque_to_json(name: &str, body: Json) -> Json {
    let mut map = JsonMap::new();
    map.insert(SCHEMA_TAG_KEY.to_string(), schema_label(name, 1));
    if let Json::Object(fields) = body {
        map.extend(fields);
    }
    Json::Object(map)
}

fn object_to_json(object: &ObjectRef, visiting: &mut HashSet<usize>) -> Result<Json> {
    // Same policy as the clone engine: a node already on the active path
    // means the graph is cyclic, and the encode fails whole.
    if !visiting.insert(object.id()) {
        return Err(CoreError::CyclicGraph);
    }
    let result = object_to_json_inner(object, visiting);
    visiting.remove(&object.id());
    result
}

fn object_to_json_inner(object: &ObjectRef, visiting: &mut HashSet<usize>) -> Result<Json> {
    let src = object.borrow();
    let mut map = JsonMap::new();
    map.insert(
        SCHEMA_TAG_KEY.to_string(),
        schema_label(src.schema_name(), src.schema_version()),
    );
    for (name, value) in src.fields().typed() {
        map.insert(name.clone(), value_to_json(value, visiting)?);
    }
    for (name, value) in src.fields().dynamic() {
        map.insert(name.clone(), value_to_json(value, visiting)?);
    }
    map.insert(
        METADATA_KEY.to_string(),
        Json::Object(dictionary_to_json(src.metadata(), visiting)?),
    );
    Ok(Json::Object(map))
}

fn json_to_value(json: &Json) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::None,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(json_to_value).collect::<Result<_>>()?),
        Json::Object(map) => match map.get(SCHEMA_TAG_KEY) {
            Some(tag) => tagged_to_value(map, tag)?,
            None => {
                let mut out = Dictionary::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), json_to_value(value)?);
                }
                Value::Map(out)
            }
        },
    })
}

/// Split a tag into `(name, version)`, rejecting anything but `name.integer`
fn parse_schema_tag(tag: &Json) -> Result<(String, u32)> {
    let label = tag
        .as_str()
        .ok_or_else(|| CoreError::MalformedSchemaTag(tag.to_string()))?;
    let malformed = || CoreError::MalformedSchemaTag(label.to_string());
    let (name, version) = label.rsplit_once('.').ok_or_else(malformed)?;
    if name.is_empty() {
        return Err(malformed());
    }
    let version: u32 = version.parse().map_err(|_| malformed())?;
    Ok((name.to_string(), version))
}

fn tagged_to_value(map: &JsonMap<String, Json>, tag: &Json) -> Result<Value> {
    let (name, version) = parse_schema_tag(tag)?;
    match name.as_str() {
        "RationalTime" | "TimeRange" | "TimeTransform" => {
            if version != 1 {
                return Err(CoreError::UnsupportedSchema { name, version });
            }
            let mut body = map.clone();
            body.remove(SCHEMA_TAG_KEY);
            let body = Json::Object(body);
            Ok(match name.as_str() {
                "RationalTime" => Value::RationalTime(serde_json::from_value::<RationalTime>(body)?),
                "TimeRange" => Value::TimeRange(serde_json::from_value::<TimeRange>(body)?),
                _ => Value::TimeTransform(serde_json::from_value::<TimeTransform>(body)?),
            })
        }
        _ => {
            // Children are decoded before the parent is constructed.
            let mut fields = FieldMap::new();
            let mut metadata = None;
            for (key, value) in map {
                if key == SCHEMA_TAG_KEY {
                    continue;
                }
                let decoded = json_to_value(value)?;
                if key == METADATA_KEY {
                    match decoded {
                        Value::Map(map) => metadata = Some(map),
                        other => {
                            fields.insert(key.clone(), other);
                        }
                    }
                    continue;
                }
                fields.insert(key.clone(), decoded);
            }
            let object = construct_from_schema(&name, version, fields)?;
            if let Some(metadata) = metadata {
                *object.metadata_mut() = metadata;
            }
            Ok(Value::Object(object))
        }
    }
}
