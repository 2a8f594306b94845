use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use flowrt_core::{Message, Value};

/// The error type a `process` body returns for anything that isn't a
/// `TypeMismatch`/`UnknownOutput`/`UnconnectedOutput` — the "user
/// exception" row of the error taxonomy in `spec.md` §7.
pub type UserError = Box<dyn std::error::Error + Send + Sync>;

/// One round's worth of input reads, keyed by pin name, in the order
/// `process` should treat them as having been read (schema order).
///
/// A queue-mode input's value is `Message::Eof` on the round where it
/// closed; see `spec.md`'s worker pseudocode in §4.2.
pub type Inputs = BTreeMap<String, Message>;

/// What a `process` call produces. The sum-type return mirrors the
/// "Dynamic dispatch on return shape" design note: the teacher's Python
/// duck-typed `if result looks like a mapping` becomes a tagged enum.
#[derive(Debug, Default)]
pub enum ProcessOutcome {
    /// Emit these named values on the correspondingly named outputs.
    Emit(BTreeMap<String, Value>),
    /// Sink components (or components skipping this round) emit nothing.
    #[default]
    None,
}

impl ProcessOutcome {
    #[must_use]
    pub fn emit(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self::Emit(pairs.into_iter().collect())
    }
}

/// Handle a `process` body uses to request its own termination.
///
/// A node with zero inputs, or only sticky/static inputs, never reaches
/// EOF-driven termination: it must call [`ProcessCtx::stop`] itself
/// (`spec.md` §4.2).
#[derive(Debug, Clone)]
pub struct ProcessCtx {
    stop_requested: Arc<AtomicBool>,
}

impl ProcessCtx {
    #[must_use]
    pub(crate) fn new(stop_requested: Arc<AtomicBool>) -> Self {
        Self { stop_requested }
    }

    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn stop_was_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

/// User-supplied computation logic for a leaf node (C6).
///
/// Implementors are invoked reactively: once per round of "read one value
/// per declared input, in schema order".
pub trait Component: Send {
    fn process(&mut self, inputs: &Inputs, ctx: &ProcessCtx) -> Result<ProcessOutcome, UserError>;
}

/// Blanket impl so a plain closure can serve as a `Component`, useful for
/// small built-ins and tests.
impl<F> Component for F
where
    F: FnMut(&Inputs, &ProcessCtx) -> Result<ProcessOutcome, UserError> + Send,
{
    fn process(&mut self, inputs: &Inputs, ctx: &ProcessCtx) -> Result<ProcessOutcome, UserError> {
        self(inputs, ctx)
    }
}
