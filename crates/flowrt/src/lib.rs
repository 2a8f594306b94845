//! `flowrt`: a runtime for visual dataflow graphs. This facade crate wires
//! together the port/channel model ([`flowrt_core`]), the node worker model
//! ([`flowrt_runtime`]), the component registry and built-in macros
//! ([`flowrt_registry`]), and the document loader ([`flowrt_loader`]) behind
//! a single [`Flow`] object.
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use flowrt_core::{
    Connection, Endpoint, Input, InputMode, Message, Output, OutputMode, Requiredness, StoppedEvent,
    TypeTag, Value, THIS_INSTANCE,
};
pub use flowrt_loader::{FlowDocument, GraphDef, InstanceDef, LoaderConfig, LoaderError, PinDef, SourceDef};
pub use flowrt_macros::component;
pub use flowrt_registry::{ComponentRegistry, GraphBlueprint, LeafArgs, LeafConstructor, RegistryError, SourceDescriptor};
pub use flowrt_runtime::{Component, Graph, Inputs, LeafNode, Node, PortSpec, ProcessCtx, ProcessOutcome, UserError, WireError};

use crossbeam_channel::{Receiver, Sender};

/// A registry that resolves only the built-in macro allow-list
/// (`spec.md` §9) and rejects every other node type. Dynamic loading of
/// leaf/graph implementations from source trees is out of scope for this
/// engine (see `DESIGN.md`); embedders needing that wire up their own
/// [`ComponentRegistry`] and pass it to [`Flow::from_yaml_with_registry`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MacroOnlyRegistry;

impl ComponentRegistry for MacroOnlyRegistry {
    fn resolve_leaf(&self, name: &str, _source: &SourceDescriptor) -> Result<LeafConstructor, RegistryError> {
        Err(RegistryError::UnknownComponent(name.to_string()))
    }

    fn resolve_graph(&self, name: &str, _source: &SourceDescriptor) -> Result<GraphBlueprint, RegistryError> {
        Err(RegistryError::UnknownComponent(name.to_string()))
    }
}

/// The root object of a loaded flow: an instantiated, wired [`Graph`] plus
/// the document it was built from, for round-tripping (`spec.md` §4.5's
/// `toDict`/`fromYaml`).
pub struct Flow {
    document: FlowDocument,
    root: Graph,
}

impl Flow {
    /// Parses and instantiates a document, resolving any non-macro node
    /// type through `registry`.
    pub fn from_yaml_with_registry(
        yaml: &str,
        registry: &dyn ComponentRegistry,
        config: &LoaderConfig,
    ) -> Result<Self, LoaderError> {
        let loaded = flowrt_loader::load_yaml(yaml, registry, config)?;
        Ok(Self { document: loaded.document, root: loaded.root })
    }

    /// Parses and instantiates a document containing only built-in macros
    /// and `VisualNode` containers — no leaf/graph registry lookups.
    pub fn from_yaml(yaml: &str) -> Result<Self, LoaderError> {
        Self::from_yaml_with_registry(yaml, &MacroOnlyRegistry, &LoaderConfig::default())
    }

    /// Re-serializes the loaded document (`spec.md`'s `toDict`).
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        self.document.to_dict()
    }

    /// Starts every node's worker. Returns immediately; use [`Flow::stopped`]
    /// or [`Flow::run_sync`] to wait for completion.
    pub fn run(&mut self) {
        self.root.run();
    }

    /// Starts the flow, blocks until it has finished, then runs main-thread
    /// finalization (`spec.md`'s `runSync`: run() then wait on stopped then
    /// shutdown()).
    pub fn run_sync(&mut self) {
        self.root.run();
        self.root.stopped_event().wait();
        self.root.shutdown();
    }

    /// Fires once the whole flow has finished (`spec.md` §4.6).
    #[must_use]
    pub fn stopped(&self) -> StoppedEvent {
        self.root.stopped_event()
    }

    /// Main-thread finalization hook (`spec.md` §4.4), for a driver that
    /// called [`Flow::run`] directly and waited on [`Flow::stopped`] itself
    /// rather than going through [`Flow::run_sync`].
    pub fn shutdown(&mut self) {
        self.root.shutdown();
    }

    /// A sender to drive one of the root graph's exposed input pins.
    #[must_use]
    pub fn input_sender(&self, pin: &str) -> Option<Sender<Message>> {
        self.root.input_sender(pin)
    }

    /// A receiver observing one of the root graph's exposed output pins.
    /// Must be called before [`Flow::run`]/[`Flow::run_sync`].
    pub fn output_receiver(&mut self, pin: &str) -> Option<Receiver<Message>> {
        self.root.output_receiver(pin)
    }

    /// Requests graceful termination (`spec.md` §4.6's `stop`).
    pub fn stop(&mut self) {
        self.root.stop();
    }

    /// Best-effort immediate abort (`spec.md` §4.6's `terminate`).
    pub fn terminate(&mut self) {
        self.root.terminate();
    }

    /// The first worker error observed anywhere in the tree, if any
    /// (`spec.md` §7: the flow completes normally even if a child errored).
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.root.last_error()
    }
}
