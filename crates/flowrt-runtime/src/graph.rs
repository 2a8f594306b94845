use std::collections::HashMap;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use flowrt_core::{Connection, GraphInputPort, GraphOutputPort, Message, OutputMode, StoppedEvent, TypeTag};

use crate::node::Node;

/// Errors that can occur while wiring a graph's connections (`spec.md`
/// §4.4). All of these indicate a malformed document; a correctly produced
/// one never hits them.
#[derive(thiserror::Error, Debug)]
pub enum WireError {
    #[error("connection references unknown instance {0:?}")]
    UnknownInstance(String),
    #[error("{instance} has no output pin {pin:?}")]
    UnknownOutputPin { instance: String, pin: String },
    #[error("{instance} has no input pin {pin:?}")]
    UnknownInputPin { instance: String, pin: String },
    #[error("graph has no exposed input pin {0:?}")]
    UnknownGraphInput(String),
    #[error("graph has no exposed output pin {0:?}")]
    UnknownGraphOutput(String),
    #[error("a connection cannot run directly from the graph's own input to its own output")]
    DirectPassthroughUnsupported,
}

/// Declares one of a graph's own boundary ports at construction time.
pub struct PortSpec {
    pub name: String,
    pub description: String,
    pub type_tag: TypeTag,
    pub mode: OutputMode,
}

impl PortSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, type_tag: TypeTag, mode: OutputMode) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            type_tag,
            mode,
        }
    }
}

/// A C7 visual graph: a set of child [`Node`]s, the connections wiring them
/// together, and the graph's own boundary ports. A `Graph` is itself a
/// `Node`, so graphs nest (`spec.md` §4.4's "Nested graphs" note).
pub struct Graph {
    id: String,
    node_type: String,
    display_name: String,
    instances: HashMap<String, Box<dyn Node>>,
    insertion_order: Vec<String>,
    connections: Vec<Connection>,
    graph_inputs: Vec<(String, GraphInputPort)>,
    graph_outputs: Vec<(String, GraphOutputPort)>,
    output_feeds: HashMap<String, Receiver<Message>>,
    output_feed_senders: HashMap<String, Sender<Message>>,
    /// Number of interior connections feeding each exposed output pin
    /// (Case C). An output fed by more than one producer must see an EOF
    /// from every one of them before it forwards its own, mirroring
    /// `GraphInputPort`'s refcounted suppression on the input side.
    output_feed_counts: HashMap<String, usize>,
    stopped: StoppedEvent,
    bookkeeper: Option<JoinHandle<()>>,
}

impl Graph {
    /// Builds and wires a graph. `instances` must be in the order they
    /// should be waited on at shutdown (`spec.md` §4.4's "insertion
    /// order").
    pub fn new(
        id: impl Into<String>,
        node_type: impl Into<String>,
        display_name: impl Into<String>,
        instances: Vec<(String, Box<dyn Node>)>,
        connections: Vec<Connection>,
        input_specs: Vec<PortSpec>,
        output_specs: Vec<PortSpec>,
    ) -> Result<Self, WireError> {
        let insertion_order = instances.iter().map(|(id, _)| id.clone()).collect();
        let instances = instances.into_iter().collect::<HashMap<_, _>>();

        let graph_inputs: Vec<(String, GraphInputPort)> = input_specs
            .into_iter()
            .map(|spec| {
                let target =
                    flowrt_core::Output::new(spec.name.clone(), spec.description, spec.type_tag, spec.mode);
                (spec.name, GraphInputPort::new(target))
            })
            .collect();
        let graph_outputs: Vec<(String, GraphOutputPort)> = output_specs
            .into_iter()
            .map(|spec| {
                (
                    spec.name.clone(),
                    flowrt_core::Output::new(spec.name, spec.description, spec.type_tag, spec.mode),
                )
            })
            .collect();

        let mut graph = Self {
            id: id.into(),
            node_type: node_type.into(),
            display_name: display_name.into(),
            instances,
            insertion_order,
            connections,
            graph_inputs,
            graph_outputs,
            output_feeds: HashMap::new(),
            output_feed_senders: HashMap::new(),
            output_feed_counts: HashMap::new(),
            stopped: StoppedEvent::new(),
            bookkeeper: None,
        };
        graph.wire()?;
        Ok(graph)
    }

    fn wire(&mut self) -> Result<(), WireError> {
        let connections = self.connections.clone();
        for conn in &connections {
            match (conn.from.is_this(), conn.to.is_this()) {
                (true, true) => return Err(WireError::DirectPassthroughUnsupported),

                // Case B: the graph's own input fans out to an interior consumer.
                (true, false) => {
                    let (_, port) = self
                        .graph_inputs
                        .iter_mut()
                        .find(|(n, _)| *n == conn.from.pin_id)
                        .ok_or_else(|| WireError::UnknownGraphInput(conn.from.pin_id.clone()))?;
                    let (tx, rx) = flowrt_core::new_queue();
                    port.inner_output_mut().connect(tx);

                    let to_node = self
                        .instances
                        .get_mut(&conn.to.ins_id)
                        .ok_or_else(|| WireError::UnknownInstance(conn.to.ins_id.clone()))?;
                    let input = to_node.input_mut(&conn.to.pin_id).ok_or_else(|| WireError::UnknownInputPin {
                        instance: conn.to.ins_id.clone(),
                        pin: conn.to.pin_id.clone(),
                    })?;
                    input.attach_queue(rx);
                    let rc = input.ref_count();
                    input.set_ref_count(rc + 1);
                }

                // Case C: an interior producer feeds the graph's own output.
                (false, true) => {
                    if !self.graph_outputs.iter().any(|(n, _)| *n == conn.to.pin_id) {
                        return Err(WireError::UnknownGraphOutput(conn.to.pin_id.clone()));
                    }
                    let tx = match self.output_feed_senders.get(&conn.to.pin_id) {
                        Some(tx) => tx.clone(),
                        None => {
                            let (tx, rx) = flowrt_core::new_queue();
                            self.output_feed_senders.insert(conn.to.pin_id.clone(), tx.clone());
                            self.output_feeds.insert(conn.to.pin_id.clone(), rx);
                            tx
                        }
                    };

                    let from_node = self
                        .instances
                        .get_mut(&conn.from.ins_id)
                        .ok_or_else(|| WireError::UnknownInstance(conn.from.ins_id.clone()))?;
                    let output = from_node.output_mut(&conn.from.pin_id).ok_or_else(|| WireError::UnknownOutputPin {
                        instance: conn.from.ins_id.clone(),
                        pin: conn.from.pin_id.clone(),
                    })?;
                    output.connect(tx);
                    *self.output_feed_counts.entry(conn.to.pin_id.clone()).or_insert(0) += 1;
                }

                // Case A: both endpoints are interior nodes.
                (false, false) => {
                    if conn.from.ins_id == conn.to.ins_id {
                        return Err(WireError::UnknownInstance(conn.from.ins_id.clone()));
                    }
                    let (tx, rx) = flowrt_core::new_queue();
                    let mut from_node = self
                        .instances
                        .remove(&conn.from.ins_id)
                        .ok_or_else(|| WireError::UnknownInstance(conn.from.ins_id.clone()))?;
                    let connect_result = from_node
                        .output_mut(&conn.from.pin_id)
                        .ok_or_else(|| WireError::UnknownOutputPin {
                            instance: conn.from.ins_id.clone(),
                            pin: conn.from.pin_id.clone(),
                        })
                        .map(|output| output.connect(tx));
                    self.instances.insert(conn.from.ins_id.clone(), from_node);
                    connect_result?;

                    let to_node = self
                        .instances
                        .get_mut(&conn.to.ins_id)
                        .ok_or_else(|| WireError::UnknownInstance(conn.to.ins_id.clone()))?;
                    let input = to_node.input_mut(&conn.to.pin_id).ok_or_else(|| WireError::UnknownInputPin {
                        instance: conn.to.ins_id.clone(),
                        pin: conn.to.pin_id.clone(),
                    })?;
                    input.attach_queue(rx);
                    let rc = input.ref_count();
                    input.set_ref_count(rc + 1);
                }
            }
        }
        Ok(())
    }

    /// Hands out a sender an external driver can use to feed one of this
    /// graph's own input pins, registering it as one more upstream
    /// producer. Call once per independent producer; `Sender` is cloneable
    /// for a producer that writes from multiple places itself.
    pub fn input_sender(&self, pin: &str) -> Option<Sender<Message>> {
        let (_, port) = self.graph_inputs.iter().find(|(n, _)| n == pin)?;
        port.register_producer();
        Some(port.sender())
    }

    /// Hands out a receiver an external consumer can attach to one of this
    /// graph's own output pins.
    pub fn output_receiver(&mut self, pin: &str) -> Option<Receiver<Message>> {
        let (tx, rx) = flowrt_core::new_queue();
        let (_, output) = self.graph_outputs.iter_mut().find(|(n, _)| n == pin)?;
        output.connect(tx);
        Some(rx)
    }
}

impl Node for Graph {
    fn id(&self) -> &str {
        &self.id
    }

    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn stopped_event(&self) -> StoppedEvent {
        self.stopped.clone()
    }

    fn input_mut(&mut self, pin: &str) -> Option<&mut flowrt_core::Input> {
        // A graph's boundary input is a `GraphInputPort`, not a plain
        // `Input`; a parent graph wires into it via `input_sender`.
        let _ = pin;
        None
    }

    fn output_mut(&mut self, pin: &str) -> Option<&mut flowrt_core::Output> {
        self.graph_outputs.iter_mut().find(|(n, _)| n == pin).map(|(_, o)| o)
    }

    fn run(&mut self) {
        for node in self.instances.values_mut() {
            node.run();
        }

        let mut input_handles = Vec::new();
        for (_, port) in std::mem::take(&mut self.graph_inputs) {
            input_handles.push(thread::spawn(move || port.run_forwarder()));
        }

        let mut fed_handles = Vec::new();
        let mut unfed_outputs = Vec::new();
        for (name, output) in std::mem::take(&mut self.graph_outputs) {
            if let Some(rx) = self.output_feeds.remove(&name) {
                let expected = self.output_feed_counts.get(&name).copied().unwrap_or(1);
                fed_handles.push(thread::spawn(move || forward_to_graph_output(output, rx, expected)));
            } else {
                unfed_outputs.push((name, output));
            }
        }

        let child_events: Vec<StoppedEvent> = self
            .insertion_order
            .iter()
            .filter_map(|id| self.instances.get(id))
            .map(|n| n.stopped_event())
            .collect();
        let id = self.id.clone();
        let stopped = self.stopped.clone();

        self.bookkeeper = Some(thread::spawn(move || {
            for ev in child_events {
                ev.wait();
            }
            for h in input_handles {
                let _ = h.join();
            }
            for h in fed_handles {
                let _ = h.join();
            }
            for (name, mut output) in unfed_outputs {
                if output.is_connected() {
                    if let Err(e) = output.send(Message::Eof) {
                        log::warn!("graph {id} failed to close unfed output {name}: {e}");
                    }
                }
            }
            log::debug!("graph {id} finished");
            stopped.fire();
        }));
    }

    fn stop(&mut self) {
        for (_, port) in &self.graph_inputs {
            port.register_producer();
            let _ = port.sender().send(Message::Eof);
        }
    }

    fn terminate(&mut self) {
        for node in self.instances.values_mut() {
            node.terminate();
        }
        self.stop();
    }

    fn shutdown(&mut self) {
        for id in self.insertion_order.clone() {
            if let Some(node) = self.instances.get_mut(&id) {
                node.shutdown();
            }
        }
    }

    fn last_error(&self) -> Option<String> {
        self.insertion_order.iter().find_map(|id| self.instances.get(id).and_then(|n| n.last_error()))
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        if let Some(handle) = self.bookkeeper.take() {
            let _ = handle.join();
        }
    }
}

/// Drains the merged feed for one exposed output pin and forwards every
/// message downstream, gating the final EOF on having seen one from each
/// of `expected` interior producers (Case C fan-in; see
/// `output_feed_counts`).
fn forward_to_graph_output(mut output: GraphOutputPort, rx: Receiver<Message>, expected: usize) {
    let mut eofs_seen = 0usize;
    loop {
        match rx.recv() {
            Ok(Message::Eof) => {
                eofs_seen += 1;
                if eofs_seen >= expected {
                    let _ = output.send(Message::Eof);
                    return;
                }
            }
            Ok(msg) => {
                if let Err(e) = output.send(msg) {
                    log::warn!("graph output {} failed to forward: {e}", output.id());
                    return;
                }
            }
            Err(_) => {
                let _ = output.send(Message::Eof);
                return;
            }
        }
    }
}
