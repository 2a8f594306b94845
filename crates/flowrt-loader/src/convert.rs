use std::collections::BTreeMap;

use flowrt_core::{TypeTag, Value};

/// Converts a generic JSON tree (the document's wire format for configured
/// pin values and `macroData`) into the engine's dynamic [`Value`].
#[must_use]
pub fn json_to_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n.as_i64().map_or_else(
            || Value::Float(n.as_f64().unwrap_or(0.0)),
            Value::Int,
        ),
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => {
            Value::Map(map.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect())
        }
    }
}

/// The inverse of [`json_to_value`], used when round-tripping a loaded
/// document's effective configuration back out (`spec.md`'s `toDict`).
#[must_use]
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f).map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::Array(b.iter().map(|byte| serde_json::Value::Number((*byte).into())).collect()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => {
            serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect())
        }
    }
}

/// Converts a document-level config map into the engine's value map.
#[must_use]
pub fn json_map_to_values(map: &BTreeMap<String, serde_json::Value>) -> BTreeMap<String, Value> {
    map.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect()
}

/// Maps a declared `type` string onto a [`TypeTag`]. Unrecognized or absent
/// names fall back to `Any` rather than a load-time error: an exposed
/// graph boundary pin with a typo'd type degrades to untyped rather than
/// making the whole document unloadable.
#[must_use]
pub fn parse_type_tag(name: Option<&str>) -> TypeTag {
    match name {
        Some("null") => TypeTag::Null,
        Some("bool") => TypeTag::Bool,
        Some("int") => TypeTag::Int,
        Some("float") => TypeTag::Float,
        Some("str") => TypeTag::Str,
        Some("bytes") => TypeTag::Bytes,
        Some("list") => TypeTag::List,
        Some("map") => TypeTag::Map,
        _ => TypeTag::Any,
    }
}

/// Merges two document-level config maps, with `overrides` winning on key
/// collision (`spec.md` §4.5's "merged arguments: blueprint ⊕ call-site
/// arguments").
#[must_use]
pub fn merge_json_maps(
    base: &BTreeMap<String, serde_json::Value>,
    overrides: &BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, serde_json::Value> {
    let mut merged = base.clone();
    for (k, v) in overrides {
        merged.insert(k.clone(), v.clone());
    }
    merged
}
