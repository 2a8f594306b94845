//! Node worker model: leaf components run on dedicated threads (C6), and a
//! visual graph (C7) owns a set of child nodes plus the connections wiring
//! them together, itself presenting as a [`Node`] so graphs nest.
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod component;
mod graph;
mod leaf;
mod node;

pub use component::{Component, Inputs, ProcessCtx, ProcessOutcome, UserError};
pub use graph::{Graph, PortSpec, WireError};
pub use leaf::{LeafNode, WorkerError};
pub use node::Node;
