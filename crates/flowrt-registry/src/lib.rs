//! C8: the abstract `ComponentRegistry` collaborator the loader consults to
//! turn a node-type identifier into either a leaf constructor or a nested
//! graph blueprint, plus the bounded set of built-in macros the loader
//! recognizes without any registry lookup at all (`spec.md` §4.5, §9).
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod macros;

pub use macros::{resolve_macro, MACRO_ALLOW_LIST};

use std::collections::BTreeMap;

use flowrt_core::Value;
use flowrt_runtime::Node;

/// How a document says to locate a node-type's implementation
/// (`spec.md` §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// `{type: file, data: <path>}` — a nested visual graph document.
    File(String),
    /// `{type: custom, data: <path>/<symbol>}` — a leaf provided by a
    /// specific source file and symbol.
    Custom(String),
    /// `{type: package, data: <registry-tag>}` — a leaf or graph shipped
    /// with a known package.
    Package(String),
}

/// Arguments the loader passes a resolved leaf constructor (`spec.md`
/// §4.5: "passing `id`, `displayName`, `inputConfig`, `stopped`, and any
/// `macroData` or `config` keys").
#[derive(Debug, Clone, Default)]
pub struct LeafArgs {
    pub id: String,
    pub display_name: String,
    pub input_config: BTreeMap<String, Value>,
    pub config: BTreeMap<String, Value>,
}

/// A constructor the registry hands back for a leaf node type.
pub type LeafConstructor = Box<dyn Fn(LeafArgs) -> Result<Box<dyn Node>, RegistryError> + Send + Sync>;

/// A parsed subtree for a nested graph, kept schema-agnostic here so this
/// crate does not depend on `flowrt-loader`'s document model; the loader
/// deserializes it into its own `GraphDef`.
pub type GraphBlueprint = serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("unknown component {0:?}")]
    UnknownComponent(String),
    #[error("unsupported source scheme {0:?}")]
    UnsupportedSource(String),
    #[error("{0}")]
    Other(String),
}

/// Abstract collaborator (`spec.md` §4.5, §6): resolves a node-type
/// identifier plus a source descriptor to either a leaf constructor or a
/// nested-graph blueprint. Dynamic code loading from source trees is out of
/// scope; implementors of this trait own that concern.
pub trait ComponentRegistry: Send + Sync {
    fn resolve_leaf(&self, name: &str, source: &SourceDescriptor) -> Result<LeafConstructor, RegistryError>;
    fn resolve_graph(&self, name: &str, source: &SourceDescriptor) -> Result<GraphBlueprint, RegistryError>;

    /// The bounded allow-list checked during loading, independent of any
    /// particular registry implementation.
    #[must_use]
    fn list_macros(&self) -> &'static [&'static str] {
        MACRO_ALLOW_LIST
    }
}
