//! C9: the document model and recursive factory (`spec.md` §4.5) that turn
//! a YAML/JSON visual-graph document into a wired [`flowrt_runtime::Graph`],
//! consulting a [`ComponentRegistry`] for anything that isn't a reserved
//! `VisualNode` container or a built-in macro.
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod convert;
mod document;
mod error;
mod factory;

pub use convert::{json_to_value, value_to_json};
pub use document::{FlowDocument, GraphDef, InstanceDef, PinDef, SourceDef, VISUAL_NODE};
pub use error::LoaderError;
pub use factory::{build_graph, LoaderConfig};

use std::collections::BTreeMap;

use flowrt_registry::ComponentRegistry;
use flowrt_runtime::Graph;

/// A document that has been fully resolved into a running-ready [`Graph`],
/// retaining the parsed document for `toDict`/re-serialization.
pub struct LoadedFlow {
    pub document: FlowDocument,
    pub root: Graph,
}

/// Loads an already-parsed document against a registry (`spec.md` §4.5).
pub fn load(doc: FlowDocument, registry: &dyn ComponentRegistry, config: &LoaderConfig) -> Result<LoadedFlow, LoaderError> {
    let root = build_graph(&doc.node, registry, config, 0, &BTreeMap::new())?;
    Ok(LoadedFlow { document: doc, root })
}

/// Parses and loads a YAML document in one step.
pub fn load_yaml(yaml: &str, registry: &dyn ComponentRegistry, config: &LoaderConfig) -> Result<LoadedFlow, LoaderError> {
    let doc = FlowDocument::from_yaml(yaml)?;
    load(doc, registry, config)
}
