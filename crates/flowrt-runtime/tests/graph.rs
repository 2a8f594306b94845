//! Direct tests of `Graph` wiring and worker-lifecycle behavior, below the
//! document loader.
use std::time::Duration;

use flowrt_core::{Connection, Endpoint, Input, InputMode, Message, Output, OutputMode, Requiredness, TypeTag, Value};
use flowrt_runtime::{Component, Graph, Inputs, LeafNode, Node, PortSpec, ProcessCtx, ProcessOutcome};

const TIMEOUT: Duration = Duration::from_secs(5);

fn passthrough_leaf(id: &str) -> Box<dyn Node> {
    let inputs = vec![(
        "in".to_string(),
        Input::new("in", "", TypeTag::Str, InputMode::Queue, Requiredness::Required, None),
    )];
    let outputs = vec![("out".to_string(), Output::new("out", "", TypeTag::Str, OutputMode::Ref))];
    let component = |inputs: &Inputs, _ctx: &ProcessCtx| {
        let text = inputs.get("in").and_then(Message::as_value).and_then(Value::as_str).unwrap_or_default();
        Ok(ProcessOutcome::emit([("out".to_string(), Value::Str(text.to_string()))]))
    };
    let component: Box<dyn Component> = Box::new(component);
    Box::new(LeafNode::new(id, "Passthrough", id, inputs, outputs, component))
}

/// Three independently driven leaves all feed the same exposed output pin
/// (Case C fan-in). Closing one producer's input must not truncate the
/// others: the merged output only closes once every producer has sent its
/// own EOF, and every real value from the still-open producers must still
/// arrive.
#[test]
fn exposed_output_waits_for_every_fan_in_producer_before_closing() {
    let instances = vec![
        ("a".to_string(), passthrough_leaf("a")),
        ("b".to_string(), passthrough_leaf("b")),
        ("c".to_string(), passthrough_leaf("c")),
    ];
    let connections = vec![
        Connection::new(Endpoint::new("__this", "a_in"), Endpoint::new("a", "in")),
        Connection::new(Endpoint::new("__this", "b_in"), Endpoint::new("b", "in")),
        Connection::new(Endpoint::new("__this", "c_in"), Endpoint::new("c", "in")),
        Connection::new(Endpoint::new("a", "out"), Endpoint::new("__this", "out")),
        Connection::new(Endpoint::new("b", "out"), Endpoint::new("__this", "out")),
        Connection::new(Endpoint::new("c", "out"), Endpoint::new("__this", "out")),
    ];
    let inputs = vec![
        PortSpec::new("a_in", TypeTag::Str, OutputMode::Ref),
        PortSpec::new("b_in", TypeTag::Str, OutputMode::Ref),
        PortSpec::new("c_in", TypeTag::Str, OutputMode::Ref),
    ];
    let outputs = vec![PortSpec::new("out", TypeTag::Str, OutputMode::Ref)];

    let mut graph = Graph::new("g", "VisualNode", "g", instances, connections, inputs, outputs)
        .expect("graph should wire");
    let rx = graph.output_receiver("out").unwrap();
    let a_tx = graph.input_sender("a_in").unwrap();
    let b_tx = graph.input_sender("b_in").unwrap();
    let c_tx = graph.input_sender("c_in").unwrap();

    graph.run();

    // Close `a` immediately; `b` and `c` keep producing for a while.
    a_tx.send(Message::Eof).unwrap();
    b_tx.send(Message::value(Value::Str("b1".to_string()))).unwrap();
    c_tx.send(Message::value(Value::Str("c1".to_string()))).unwrap();
    b_tx.send(Message::value(Value::Str("b2".to_string()))).unwrap();
    b_tx.send(Message::Eof).unwrap();
    c_tx.send(Message::value(Value::Str("c2".to_string()))).unwrap();
    c_tx.send(Message::Eof).unwrap();

    let mut values = Vec::new();
    loop {
        let msg = rx.recv_timeout(TIMEOUT).expect("expected a message before timeout");
        if msg.is_eof() {
            break;
        }
        values.push(msg.as_value().unwrap().as_str().unwrap().to_string());
    }
    values.sort();
    assert_eq!(values, vec!["b1", "b2", "c1", "c2"]);

    graph.stop();
    graph.stopped_event().wait();
}

/// A single producer feeding an exposed output still closes normally
/// (the common, non-fan-in path stays correct after the refcounted fix).
#[test]
fn exposed_output_with_single_producer_closes_on_its_eof() {
    let instances = vec![("a".to_string(), passthrough_leaf("a"))];
    let connections = vec![
        Connection::new(Endpoint::new("__this", "a_in"), Endpoint::new("a", "in")),
        Connection::new(Endpoint::new("a", "out"), Endpoint::new("__this", "out")),
    ];
    let inputs = vec![PortSpec::new("a_in", TypeTag::Str, OutputMode::Ref)];
    let outputs = vec![PortSpec::new("out", TypeTag::Str, OutputMode::Ref)];

    let mut graph = Graph::new("g", "VisualNode", "g", instances, connections, inputs, outputs)
        .expect("graph should wire");
    let rx = graph.output_receiver("out").unwrap();
    let a_tx = graph.input_sender("a_in").unwrap();
    graph.run();

    a_tx.send(Message::value(Value::Str("hi".to_string()))).unwrap();
    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().as_value().unwrap().as_str(), Some("hi"));
    a_tx.send(Message::Eof).unwrap();
    assert!(rx.recv_timeout(TIMEOUT).unwrap().is_eof());

    graph.stopped_event().wait();
}
