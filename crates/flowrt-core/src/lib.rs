//! # `flowrt-core`
//!
//! The port/channel model for `flowrt`: [`Message`] and the distinguished
//! EOF marker, typed [`Input`](port::Input) and [`Output`](port::Output)
//! ports, the [`GraphInputPort`](graph_port::GraphInputPort) redirect sink
//! that a visual graph uses to expose itself to the outside, and the
//! [`Connection`](connection::Connection) record produced by wiring.
//!
//! This crate has no notion of threads, workers, or documents — it is pure
//! data plus the read/write disciplines described in `spec.md` §4.1 and
//! §4.3. See `flowrt-runtime` for the node/worker model built on top of it.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod connection;
mod error;
mod graph_port;
mod message;
mod port;
mod stopped;
mod type_tag;

pub use connection::{Connection, Endpoint, THIS_INSTANCE};
pub use error::{TypeError, UnconnectedOutputError};
pub use graph_port::{GraphInputPort, GraphOutputPort};
pub use message::{Message, Value};
pub use port::{Input, InputMode, Output, OutputMode, OutputSendError, Requiredness};
pub use stopped::StoppedEvent;
pub use type_tag::TypeTag;

/// Allocates a fresh unbounded channel used to back one [`Connection`].
///
/// A single queue is shared by exactly one [`Output`] (or
/// [`GraphInputPort`]) and one [`Input`] (or [`GraphOutputPort`]); see
/// "Ownership" in `spec.md` §3.
#[must_use]
pub fn new_queue() -> (crossbeam_channel::Sender<Message>, crossbeam_channel::Receiver<Message>) {
    crossbeam_channel::unbounded()
}
