use std::sync::Arc;

use flowrt_core::{
    new_queue, GraphInputPort, Input, InputMode, Message, Output, OutputMode, Requiredness,
    TypeTag, Value,
};

fn send_all(output: &mut Output, values: Vec<Value>) {
    for v in values {
        output.send(Message::value(v)).unwrap();
    }
}

#[test]
fn p1_fifo_per_edge() {
    let (tx, rx) = new_queue();
    let mut output = Output::new("n.out", "", TypeTag::Int, OutputMode::Ref);
    output.connect(tx);
    let mut input = Input::new("m.in", "", TypeTag::Int, InputMode::Queue, Requiredness::Required, None);
    input.attach_queue(rx);

    send_all(&mut output, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    output.send(Message::Eof).unwrap();

    let mut seen = Vec::new();
    loop {
        match input.get() {
            Message::Value(v) => seen.push(v.as_int().unwrap()),
            Message::Eof => break,
        }
    }
    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn p3_sticky_invariance() {
    let (tx, rx) = new_queue();
    let mut output = Output::new("src.n", "", TypeTag::Int, OutputMode::Ref);
    output.connect(tx);
    let mut sticky = Input::new(
        "node.s",
        "",
        TypeTag::Int,
        InputMode::Sticky,
        Requiredness::Optional,
        Some(Value::Int(0)),
    );
    sticky.attach_queue(rx);

    // Nothing produced yet, but an initial value was configured: returns it
    // without blocking.
    assert_eq!(sticky.get().into_value().unwrap().as_int(), Some(0));

    output.send(Message::value(Value::Int(7))).unwrap();
    assert_eq!(sticky.get().into_value().unwrap().as_int(), Some(7));

    // Further reads with an empty queue keep returning the latched value.
    assert_eq!(sticky.get().into_value().unwrap().as_int(), Some(7));

    // EOF must not terminate a sticky input.
    output.send(Message::Eof).unwrap();
    assert_eq!(sticky.get().into_value().unwrap().as_int(), Some(7));
    assert_eq!(sticky.get().into_value().unwrap().as_int(), Some(7));
}

#[test]
fn p4_static_invariance() {
    let mut input = Input::new(
        "node.k",
        "",
        TypeTag::Int,
        InputMode::Static,
        Requiredness::Optional,
        Some(Value::Int(42)),
    );
    for _ in 0..5 {
        assert_eq!(input.get().into_value().unwrap().as_int(), Some(42));
    }
}

#[test]
fn p5_fan_out_by_value_deep_copies() {
    let (tx0, rx0) = new_queue();
    let (tx1, rx1) = new_queue();
    let mut output = Output::new("n.out", "", TypeTag::List, OutputMode::Value);
    output.connect(tx0);
    output.connect(tx1);

    let payload = Value::List(vec![Value::Int(1)]);
    output.send(Message::value(payload)).unwrap();

    let Message::Value(v0) = rx0.recv().unwrap() else {
        panic!("expected value")
    };
    let Message::Value(v1) = rx1.recv().unwrap() else {
        panic!("expected value")
    };
    assert!(!Arc::ptr_eq(&v0, &v1), "queue 1 must be an independent allocation");
    assert_eq!(*v0, *v1);
}

#[test]
fn p6_fan_out_by_ref_shares_allocation() {
    let (tx0, rx0) = new_queue();
    let (tx1, rx1) = new_queue();
    let mut output = Output::new("n.out", "", TypeTag::List, OutputMode::Ref);
    output.connect(tx0);
    output.connect(tx1);

    output
        .send(Message::value(Value::List(vec![Value::Int(9)])))
        .unwrap();

    let Message::Value(v0) = rx0.recv().unwrap() else {
        panic!("expected value")
    };
    let Message::Value(v1) = rx1.recv().unwrap() else {
        panic!("expected value")
    };
    assert!(Arc::ptr_eq(&v0, &v1));
}

#[test]
fn p7_round_robin_then_eof_broadcasts() {
    let (tx0, rx0) = new_queue();
    let (tx1, rx1) = new_queue();
    let (tx2, rx2) = new_queue();
    let mut output = Output::new("n.out", "", TypeTag::Int, OutputMode::Circle);
    output.connect(tx0);
    output.connect(tx1);
    output.connect(tx2);

    for i in 0..7 {
        output.send(Message::value(Value::Int(i))).unwrap();
    }
    output.send(Message::Eof).unwrap();

    let drain = |rx: &crossbeam_channel::Receiver<Message>| -> Vec<i64> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            match msg {
                Message::Value(v) => out.push(v.as_int().unwrap()),
                Message::Eof => break,
            }
        }
        out
    };

    assert_eq!(drain(&rx0), vec![0, 3, 6]);
    assert_eq!(drain(&rx1), vec![1, 4]);
    assert_eq!(drain(&rx2), vec![2, 5]);

    // Drain the queued EOF sentinel left behind on every queue.
    assert_eq!(rx0.try_recv().unwrap(), Message::Eof);
    assert_eq!(rx1.try_recv().unwrap(), Message::Eof);
    assert_eq!(rx2.try_recv().unwrap(), Message::Eof);
}

#[test]
fn p8_graph_port_refcount_gates_eof() {
    let (tx, rx) = new_queue();
    let mut interior_out = Output::new("graph.in", "", TypeTag::Any, OutputMode::Ref);
    interior_out.connect(tx);
    let mut port = GraphInputPort::new(interior_out);
    port.register_producer();
    port.register_producer();
    port.register_producer();

    port.put(Message::value(Value::Int(1))).unwrap();
    assert_eq!(rx.try_recv().unwrap(), Message::value(Value::Int(1)));

    port.put(Message::Eof).unwrap();
    assert!(rx.try_recv().is_err(), "first EOF of 3 must be swallowed");
    port.put(Message::Eof).unwrap();
    assert!(rx.try_recv().is_err(), "second EOF of 3 must be swallowed");
    port.put(Message::Eof).unwrap();
    assert_eq!(rx.try_recv().unwrap(), Message::Eof, "third EOF forwards");
}

#[test]
fn p9_type_gating() {
    let (tx, _rx) = new_queue();
    let mut output = Output::new("n.out", "", TypeTag::Int, OutputMode::Ref);
    output.connect(tx);

    let err = output.send(Message::value(Value::Str("nope".into()))).unwrap_err();
    assert!(matches!(err, flowrt_core::OutputSendError::Type(_)));

    // EOF always passes regardless of declared type.
    output.send(Message::Eof).unwrap();
}

#[test]
fn unconnected_output_is_fatal() {
    let mut output = Output::new("n.out", "", TypeTag::Any, OutputMode::Ref);
    let err = output.send(Message::value(Value::Null)).unwrap_err();
    assert!(matches!(err, flowrt_core::OutputSendError::Unconnected(_)));
}
