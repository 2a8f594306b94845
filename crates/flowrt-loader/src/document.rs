use std::collections::BTreeMap;

use flowrt_core::Connection;
use serde::{Deserialize, Serialize};

/// How a document spells out where a node type's implementation lives
/// (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SourceDef {
    /// A nested visual graph document.
    File(String),
    /// A leaf provided by a specific source file and symbol.
    Custom(String),
    /// A leaf or graph shipped with a known package.
    Package(String),
}

/// A single declared boundary pin on a graph (`inputs`/`outputs` maps in
/// `spec.md` §4.5). `mode`/`required`/`value`/`delayed` are parsed and kept
/// for round-tripping; a graph's own exposed ports forward immediately and
/// gate only on EOF refcounting, so those fields carry no runtime weight of
/// their own, only `type` does (see `DESIGN.md`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinDef {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delayed: Option<bool>,
}

/// One entry in a graph's `instances` list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macro_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub input_config: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub macro_data: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceDef>,
}

/// A graph definition: either the document's root `node`, or a blueprint
/// resolved from a nested graph-file import. Reserved `nodeId ==
/// "VisualNode"` marks a subtree built as a container rather than looked up
/// in the registry (`spec.md` §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub input_config: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, PinDef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, PinDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<InstanceDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<Connection>,
}

/// The reserved `nodeId` a `GraphDef` subtree carries to mark itself as a
/// container rather than a registry-resolved component (`spec.md` §4.5).
pub const VISUAL_NODE: &str = "VisualNode";

/// Top-level document: an optional import table plus the root graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub imports: BTreeMap<String, Vec<String>>,
    pub node: GraphDef,
}

impl FlowDocument {
    /// Parses a document from YAML text (`spec.md` §4.5's `fromYaml`).
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serializes the document to a generic JSON tree (`spec.md` §4.5's
    /// `toDict`), suitable for re-emission as YAML or JSON.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("FlowDocument always serializes")
    }
}
