use std::collections::BTreeMap;

use flowrt_registry::{ComponentRegistry, LeafArgs, SourceDescriptor};
use flowrt_runtime::{Graph, Node, PortSpec};
use uuid::Uuid;

use crate::convert::{json_map_to_values, merge_json_maps, parse_type_tag};
use crate::document::{GraphDef, InstanceDef, SourceDef, VISUAL_NODE};
use crate::error::LoaderError;

/// Caps recursive nested-graph instantiation; a cycle in blueprint imports
/// would otherwise recurse forever.
const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Strict mode turns an instance with neither `nodeId`/`macroId` nor a
    /// resolvable `source` into a hard error instead of falling back to a
    /// `Package` source lookup keyed by the bare node type name.
    pub strict: bool,
    pub max_depth: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { strict: true, max_depth: DEFAULT_MAX_DEPTH }
    }
}

fn to_source_descriptor(src: &SourceDef) -> SourceDescriptor {
    match src {
        SourceDef::File(path) => SourceDescriptor::File(path.clone()),
        SourceDef::Custom(path) => SourceDescriptor::Custom(path.clone()),
        SourceDef::Package(tag) => SourceDescriptor::Package(tag.clone()),
    }
}

fn fresh_id(node_type: &str) -> String {
    format!("{node_type}-{}", Uuid::new_v4())
}

/// Builds a [`Graph`] from a `GraphDef` subtree, recursively instantiating
/// its instances. `arg_overrides` carries the call-site `inputConfig ⊕
/// config` a parent instance passed when resolving this subtree as a nested
/// blueprint; it is merged into the def's own `inputConfig` and cascaded as
/// a default to any direct child instance that doesn't already set a
/// matching key (`spec.md` §4.5's "merged arguments").
pub fn build_graph(
    def: &GraphDef,
    registry: &dyn ComponentRegistry,
    config: &LoaderConfig,
    depth: usize,
    arg_overrides: &BTreeMap<String, serde_json::Value>,
) -> Result<Graph, LoaderError> {
    if depth > config.max_depth {
        return Err(LoaderError::DepthExceeded(config.max_depth));
    }
    if def.node_id != VISUAL_NODE {
        return Err(LoaderError::InvalidDocument(format!(
            "graph subtree has nodeId {:?}, expected {VISUAL_NODE:?}",
            def.node_id
        )));
    }

    let effective_config = merge_json_maps(&def.input_config, arg_overrides);

    let id = def.id.clone().unwrap_or_else(|| fresh_id(VISUAL_NODE));
    let display_name = def.display_name.clone().unwrap_or_else(|| VISUAL_NODE.to_string());

    let mut instances = Vec::with_capacity(def.instances.len());
    for inst in &def.instances {
        let node = build_instance(inst, registry, config, depth, &effective_config)?;
        instances.push((inst.id.clone(), node));
    }

    let input_specs = def
        .inputs
        .iter()
        .map(|(name, pin)| PortSpec::new(name.clone(), parse_type_tag(pin.type_name.as_deref()), flowrt_core::OutputMode::Ref))
        .collect();
    let output_specs = def
        .outputs
        .iter()
        .map(|(name, pin)| PortSpec::new(name.clone(), parse_type_tag(pin.type_name.as_deref()), flowrt_core::OutputMode::Ref))
        .collect();

    Graph::new(id, VISUAL_NODE, display_name, instances, def.connections.clone(), input_specs, output_specs)
        .map_err(LoaderError::from)
}

fn build_instance(
    inst: &InstanceDef,
    registry: &dyn ComponentRegistry,
    config: &LoaderConfig,
    depth: usize,
    parent_defaults: &BTreeMap<String, serde_json::Value>,
) -> Result<Box<dyn Node>, LoaderError> {
    // A graph-level default only fills in a key the instance itself leaves
    // unset; the instance's own config always wins.
    let input_config = merge_json_maps(parent_defaults, &inst.input_config);

    if let Some(macro_id) = &inst.macro_id {
        if !flowrt_registry::MACRO_ALLOW_LIST.contains(&macro_id.as_str()) {
            return Err(LoaderError::UnsupportedMacro(macro_id.clone()));
        }
        let display_name = inst.display_name.clone().unwrap_or_else(|| macro_id.clone());
        let macro_data = json_map_to_values(&inst.macro_data);
        let node = flowrt_registry::resolve_macro(macro_id, inst.id.clone(), display_name, &macro_data)?;
        return Ok(node);
    }

    let Some(node_type) = &inst.node_id else {
        return Err(LoaderError::InvalidDocument(format!(
            "instance {:?} has neither nodeId nor macroId",
            inst.id
        )));
    };
    let display_name = inst.display_name.clone().unwrap_or_else(|| node_type.clone());

    match &inst.source {
        Some(SourceDef::File(_)) => {
            let source = to_source_descriptor(inst.source.as_ref().unwrap());
            let blueprint = registry.resolve_graph(node_type, &source)?;
            let child_def: GraphDef = serde_json::from_value(blueprint)?;
            let overrides = merge_json_maps(&input_config, &inst.config);
            let child = build_graph(&child_def, registry, config, depth + 1, &overrides)?;
            Ok(Box::new(child))
        }
        other => {
            let source = match other {
                Some(src) => to_source_descriptor(src),
                None if config.strict => {
                    return Err(LoaderError::InvalidDocument(format!(
                        "instance {:?} of type {node_type:?} has no source",
                        inst.id
                    )));
                }
                None => SourceDescriptor::Package(node_type.clone()),
            };
            let ctor = registry.resolve_leaf(node_type, &source)?;
            let args = LeafArgs {
                id: inst.id.clone(),
                display_name,
                input_config: json_map_to_values(&input_config),
                config: json_map_to_values(&inst.config),
            };
            let node = ctor(args)?;
            Ok(node)
        }
    }
}
