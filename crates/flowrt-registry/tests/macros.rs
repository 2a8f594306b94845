use std::collections::BTreeMap;
use std::time::Duration;

use crossbeam_channel::Receiver;
use flowrt_core::{Message, Value};
use flowrt_registry::resolve_macro;
use flowrt_runtime::Node;

fn drain(rx: &Receiver<Message>) -> Vec<Message> {
    let mut out = Vec::new();
    loop {
        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(msg) => {
                let is_eof = msg.is_eof();
                out.push(msg);
                if is_eof {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    out
}

#[test]
fn inline_value_emits_once_then_stops() {
    let mut macro_data = BTreeMap::new();
    macro_data.insert("value".to_string(), Value::Str("hi".to_string()));
    let mut node = resolve_macro("InlineValue", "n1".into(), "n1".into(), &macro_data).unwrap();

    let (tx, rx) = flowrt_core::new_queue();
    node.output_mut("value").unwrap().connect(tx);
    node.run();
    node.stopped_event().wait();

    let msgs = drain(&rx);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].as_value().unwrap().as_str(), Some("hi"));
    assert!(msgs[1].is_eof());
}

#[test]
fn conditional_picks_branch_by_truthiness() {
    let mut node = resolve_macro("Conditional", "n2".into(), "n2".into(), &BTreeMap::new()).unwrap();
    let (val1_tx, val1_rx) = flowrt_core::new_queue();
    let (val2_tx, val2_rx) = flowrt_core::new_queue();
    let (cond_tx, cond_rx) = flowrt_core::new_queue();
    node.input_mut("val1").unwrap().attach_queue(val1_rx);
    node.input_mut("val2").unwrap().attach_queue(val2_rx);
    node.input_mut("condition").unwrap().attach_queue(cond_rx);
    let (out_tx, out_rx) = flowrt_core::new_queue();
    node.output_mut("value").unwrap().connect(out_tx);
    node.run();

    val1_tx.send(Message::value(Value::Str("A".to_string()))).unwrap();
    val2_tx.send(Message::value(Value::Str("B".to_string()))).unwrap();
    cond_tx.send(Message::value(Value::Bool(true))).unwrap();
    let first = out_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first.as_value().unwrap().as_str(), Some("A"));

    val1_tx.send(Message::Eof).unwrap();
    val2_tx.send(Message::Eof).unwrap();
    cond_tx.send(Message::Eof).unwrap();
    let last = out_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(last.is_eof());
    node.stopped_event().wait();
}

#[test]
fn get_attribute_resolves_nested_path() {
    let mut macro_data = BTreeMap::new();
    macro_data.insert("path".to_string(), Value::Str("a.b".to_string()));
    let mut node = resolve_macro("GetAttribute", "n3".into(), "n3".into(), &macro_data).unwrap();
    let (in_tx, in_rx) = flowrt_core::new_queue();
    node.input_mut("value").unwrap().attach_queue(in_rx);
    let (out_tx, out_rx) = flowrt_core::new_queue();
    node.output_mut("value").unwrap().connect(out_tx);
    node.run();

    let mut inner = BTreeMap::new();
    inner.insert("b".to_string(), Value::Int(42));
    let mut outer = BTreeMap::new();
    outer.insert("a".to_string(), Value::Map(inner));
    in_tx.send(Message::value(Value::Map(outer))).unwrap();
    let first = out_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first.as_value().unwrap().as_int(), Some(42));

    in_tx.send(Message::Eof).unwrap();
    let last = out_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(last.is_eof());
}

#[test]
fn get_attribute_missing_key_is_fatal_but_graph_still_finishes() {
    let mut macro_data = BTreeMap::new();
    macro_data.insert("path".to_string(), Value::Str("missing".to_string()));
    let mut node = resolve_macro("GetAttribute", "n4".into(), "n4".into(), &macro_data).unwrap();
    let (in_tx, in_rx) = flowrt_core::new_queue();
    node.input_mut("value").unwrap().attach_queue(in_rx);
    let (out_tx, out_rx) = flowrt_core::new_queue();
    node.output_mut("value").unwrap().connect(out_tx);
    node.run();

    in_tx.send(Message::value(Value::Map(BTreeMap::new()))).unwrap();
    node.stopped_event().wait();
    assert!(node.last_error().is_some());
    assert!(out_rx.recv_timeout(Duration::from_secs(2)).unwrap().is_eof());
}

#[test]
fn http_macro_is_inert_but_responds() {
    let mut node = resolve_macro("Http", "n5".into(), "n5".into(), &BTreeMap::new()).unwrap();
    let mut senders = Vec::new();
    for pin in ["url", "method", "headers", "body"] {
        let (tx, rx) = flowrt_core::new_queue();
        node.input_mut(pin).unwrap().attach_queue(rx);
        tx.send(Message::value(Value::Null)).unwrap();
        senders.push(tx);
    }
    let (out_tx, out_rx) = flowrt_core::new_queue();
    node.output_mut("response").unwrap().connect(out_tx);
    node.run();

    let first = out_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(first.as_value().unwrap().as_map().is_some());
    drop(senders);
}
