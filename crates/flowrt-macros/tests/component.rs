use std::time::Duration;

use flowrt_core::Value;
use flowrt_macros::component;
use flowrt_runtime::{Inputs, Node, ProcessCtx, ProcessOutcome, UserError};

#[derive(Debug, Default)]
struct Adder;

#[component(Adder, inputs(a: int, b: int), outputs(sum: int))]
fn process(&mut self, inputs: &Inputs, _ctx: &ProcessCtx) -> Result<ProcessOutcome, UserError> {
    let a = inputs.get("a").and_then(flowrt_core::Message::as_value).and_then(Value::as_int);
    let b = inputs.get("b").and_then(flowrt_core::Message::as_value).and_then(Value::as_int);
    match (a, b) {
        (Some(a), Some(b)) => Ok(ProcessOutcome::emit([("sum".to_string(), Value::Int(a + b))])),
        _ => Ok(ProcessOutcome::None),
    }
}

#[test]
fn generated_leaf_node_adds_two_queues() {
    let mut node = Adder.into_leaf_node("adder-1", "Adder");

    let (a_tx, a_rx) = flowrt_core::new_queue();
    let (b_tx, b_rx) = flowrt_core::new_queue();
    node.input_mut("a").unwrap().attach_queue(a_rx);
    node.input_mut("b").unwrap().attach_queue(b_rx);
    let (out_tx, out_rx) = flowrt_core::new_queue();
    node.output_mut("sum").unwrap().connect(out_tx);
    node.run();

    a_tx.send(flowrt_core::Message::value(Value::Int(2))).unwrap();
    b_tx.send(flowrt_core::Message::value(Value::Int(40))).unwrap();
    let sum = out_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(sum.as_value().unwrap().as_int(), Some(42));

    a_tx.send(flowrt_core::Message::Eof).unwrap();
    b_tx.send(flowrt_core::Message::Eof).unwrap();
    let last = out_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(last.is_eof());
    node.stopped_event().wait();
}
