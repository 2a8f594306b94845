use std::collections::BTreeMap;

use flowrt_core::{Input, InputMode, Output, OutputMode, Requiredness, TypeTag, Value};
use flowrt_runtime::{Component, Inputs, LeafNode, Node, ProcessCtx, ProcessOutcome, UserError};

use crate::RegistryError;

/// The fixed set of built-in macro identifiers the loader recognizes
/// without consulting a [`crate::ComponentRegistry`].
pub const MACRO_ALLOW_LIST: &[&str] = &["InlineValue", "Conditional", "GetAttribute", "Http"];

/// Instantiates a macro by its reserved type tag. Unknown tags are a
/// *document* error (`UnsupportedMacro` at the loader layer), not a panic.
pub fn resolve_macro(
    macro_id: &str,
    id: String,
    display_name: String,
    macro_data: &BTreeMap<String, Value>,
) -> Result<Box<dyn Node>, RegistryError> {
    match macro_id {
        "InlineValue" => Ok(Box::new(inline_value(id, display_name, macro_data))),
        "Conditional" => Ok(Box::new(conditional(id, display_name))),
        "GetAttribute" => Ok(Box::new(get_attribute(id, display_name, macro_data)?)),
        "Http" => Ok(Box::new(http(id, display_name))),
        other => Err(RegistryError::UnknownComponent(other.to_string())),
    }
}

/// A zero-input source: emits its configured `value` once, then stops.
/// Mirrors `pyflyde`'s `InlineValue` and the canonical "source" termination
/// rule (process calls `stop()` itself).
fn inline_value(id: String, display_name: String, macro_data: &BTreeMap<String, Value>) -> LeafNode {
    let value = macro_data.get("value").cloned().unwrap_or(Value::Null);
    let outputs = vec![("value".to_string(), Output::new("value", "", TypeTag::Any, OutputMode::Ref))];
    let component: Box<dyn Component> = Box::new(move |_inputs: &Inputs, ctx: &ProcessCtx| {
        ctx.stop();
        Ok(ProcessOutcome::emit([("value".to_string(), value.clone())]))
    });
    LeafNode::new(id, "InlineValue", display_name, Vec::new(), outputs, component)
}

/// Emits `val1` when `condition` is truthy, else `val2`.
fn conditional(id: String, display_name: String) -> LeafNode {
    let inputs = vec![
        ("val1".to_string(), Input::new("val1", "", TypeTag::Any, InputMode::Queue, Requiredness::Required, None)),
        ("val2".to_string(), Input::new("val2", "", TypeTag::Any, InputMode::Queue, Requiredness::Required, None)),
        (
            "condition".to_string(),
            Input::new("condition", "", TypeTag::Any, InputMode::Queue, Requiredness::Required, None),
        ),
    ];
    let outputs = vec![("value".to_string(), Output::new("value", "", TypeTag::Any, OutputMode::Ref))];
    let component: Box<dyn Component> = Box::new(|inputs: &Inputs, _ctx: &ProcessCtx| {
        let truthy = inputs.get("condition").and_then(flowrt_core::Message::as_value).is_some_and(Value::is_truthy);
        let pin = if truthy { "val1" } else { "val2" };
        match inputs.get(pin).and_then(flowrt_core::Message::as_value) {
            Some(v) => Ok(ProcessOutcome::emit([("value".to_string(), v.clone())])),
            None => Ok(ProcessOutcome::None),
        }
    });
    LeafNode::new(id, "Conditional", display_name, inputs, outputs, component)
}

/// Looks up a dot-separated attribute path inside an incoming `Value::Map`.
/// A missing key is a user exception (§4.2/§7's `process`-body error path),
/// not a panic.
fn get_attribute(
    id: String,
    display_name: String,
    macro_data: &BTreeMap<String, Value>,
) -> Result<LeafNode, RegistryError> {
    let path_str = macro_data
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| RegistryError::Other("GetAttribute requires macroData.path".to_string()))?;
    let path: Vec<String> = path_str.split('.').map(str::to_string).collect();
    if path.is_empty() {
        return Err(RegistryError::Other("GetAttribute path must not be empty".to_string()));
    }

    let inputs = vec![(
        "value".to_string(),
        Input::new("value", "", TypeTag::Any, InputMode::Queue, Requiredness::Required, None),
    )];
    let outputs = vec![("value".to_string(), Output::new("value", "", TypeTag::Any, OutputMode::Ref))];
    let component: Box<dyn Component> = Box::new(move |inputs: &Inputs, _ctx: &ProcessCtx| -> Result<ProcessOutcome, UserError> {
        let Some(mut cur) = inputs.get("value").and_then(flowrt_core::Message::as_value) else {
            return Ok(ProcessOutcome::None);
        };
        for segment in &path {
            let Value::Map(map) = cur else {
                return Err(format!("GetAttribute: value at {segment:?} is not a map").into());
            };
            cur = map.get(segment).ok_or_else(|| format!("GetAttribute: missing key {segment:?}"))?;
        }
        Ok(ProcessOutcome::emit([("value".to_string(), cur.clone())]))
    });
    Ok(LeafNode::new(id, "GetAttribute", display_name, inputs, outputs, component))
}

/// Documented stub: wires and runs like a real HTTP leaf so documents that
/// reference it load correctly, but never performs any network I/O
/// (actual networking is out of scope; see `SPEC_FULL.md` §2).
fn http(id: String, display_name: String) -> LeafNode {
    let inputs = vec![
        ("url".to_string(), Input::new("url", "", TypeTag::Str, InputMode::Queue, Requiredness::Required, None)),
        (
            "method".to_string(),
            Input::new("method", "", TypeTag::Str, InputMode::Sticky, Requiredness::Optional, Some(Value::Str("GET".to_string()))),
        ),
        (
            "headers".to_string(),
            Input::new("headers", "", TypeTag::Any, InputMode::Sticky, Requiredness::Optional, Some(Value::Map(BTreeMap::new()))),
        ),
        (
            "body".to_string(),
            Input::new("body", "", TypeTag::Any, InputMode::Sticky, Requiredness::Optional, Some(Value::Null)),
        ),
    ];
    let outputs = vec![("response".to_string(), Output::new("response", "", TypeTag::Any, OutputMode::Ref))];
    let component: Box<dyn Component> = Box::new(|_inputs: &Inputs, _ctx: &ProcessCtx| {
        let mut response = BTreeMap::new();
        response.insert("status".to_string(), Value::Int(501));
        response.insert(
            "body".to_string(),
            Value::Str("Http macro performs no network I/O in this engine".to_string()),
        );
        Ok(ProcessOutcome::emit([("response".to_string(), Value::Map(response))]))
    });
    LeafNode::new(id, "Http", display_name, inputs, outputs, component)
}
