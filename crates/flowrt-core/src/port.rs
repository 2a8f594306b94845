use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::{TypeError, UnconnectedOutputError};
use crate::message::{Message, Value};
use crate::type_tag::TypeTag;

/// The three read disciplines for an [`Input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Blocks on the backing queue; EOF terminates the owning worker.
    Queue,
    /// Latches the last non-EOF value seen; EOF is ignored.
    Sticky,
    /// Always yields a fixed configured constant; never blocks.
    Static,
}

/// Whether an input must be wired for the graph to be considered valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requiredness {
    Required,
    Optional,
    RequiredIfConnected,
}

/// The receiving endpoint on a node.
///
/// An `Input`'s backing queue is lazily attached at wiring time
/// ([`Input::attach_queue`]); before that `is_connected` is `false`.
#[derive(Debug)]
pub struct Input {
    id: String,
    description: String,
    type_tag: TypeTag,
    mode: InputMode,
    requiredness: Requiredness,
    /// Current static/sticky value, or the default served to an
    /// unconnected optional input.
    value: Option<Value>,
    queue: Option<Receiver<Message>>,
    ref_count: usize,
}

impl Input {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        type_tag: TypeTag,
        mode: InputMode,
        requiredness: Requiredness,
        initial_value: Option<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            type_tag,
            mode,
            requiredness,
            value: initial_value,
            queue: None,
            ref_count: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn mode(&self) -> InputMode {
        self.mode
    }

    #[must_use]
    pub const fn requiredness(&self) -> Requiredness {
        self.requiredness
    }

    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.queue.is_some()
    }

    #[must_use]
    pub const fn ref_count(&self) -> usize {
        self.ref_count
    }

    pub fn set_ref_count(&mut self, count: usize) {
        self.ref_count = count;
    }

    /// Attaches the backing queue allocated by wiring. Called at most once.
    pub fn attach_queue(&mut self, queue: Receiver<Message>) {
        self.queue = Some(queue);
    }

    /// Assigns a value directly (used by `static`/configured inputs and by
    /// tests). EOF bypasses type checking; any other value is validated
    /// against the declared type.
    pub fn set(&mut self, value: Value) -> Result<(), TypeError> {
        if !self.type_tag.matches(&value) {
            return Err(TypeError::TypeMismatch {
                port: self.id.clone(),
                expected: self.type_tag,
            });
        }
        self.value = Some(value);
        Ok(())
    }

    /// Reads one value per the port's mode. See `spec.md` §4.1.
    pub fn get(&mut self) -> Message {
        match self.mode {
            InputMode::Static => self.value.clone().map_or(Message::Eof, Message::value),
            InputMode::Sticky => self.get_sticky(),
            InputMode::Queue => self.get_queue(),
        }
    }

    fn get_queue(&mut self) -> Message {
        let Some(queue) = &self.queue else {
            return self.unconnected_default();
        };
        match queue.recv() {
            Ok(msg) => msg,
            // Producer dropped without an explicit EOF: treat as EOF.
            Err(_) => Message::Eof,
        }
    }

    fn get_sticky(&mut self) -> Message {
        let Some(queue) = &self.queue else {
            return self.value.clone().map_or(Message::Eof, Message::value);
        };
        match queue.try_recv() {
            Ok(Message::Value(v)) => {
                self.value = Some(v.as_ref().clone());
                Message::Value(v)
            }
            Ok(Message::Eof) => self.latched_or_block(queue),
            Err(TryRecvError::Empty) => self.latched_or_block(queue),
            Err(TryRecvError::Disconnected) => {
                self.value.clone().map_or(Message::Eof, Message::value)
            }
        }
    }

    /// Sticky inputs never terminate on EOF. If nothing has latched yet,
    /// block until the first real value arrives (per spec: "reading before
    /// either blocks in queue-mode fashion until a first value arrives").
    fn latched_or_block(&mut self, queue: &Receiver<Message>) -> Message {
        if let Some(v) = &self.value {
            return Message::value(v.clone());
        }
        loop {
            match queue.recv() {
                Ok(Message::Value(v)) => {
                    self.value = Some(v.as_ref().clone());
                    return Message::Value(v);
                }
                Ok(Message::Eof) => continue,
                Err(_) => return Message::Eof,
            }
        }
    }

    fn unconnected_default(&self) -> Message {
        match self.requiredness {
            Requiredness::Optional | Requiredness::RequiredIfConnected => {
                self.value.clone().map_or(Message::Eof, Message::value)
            }
            Requiredness::Required => {
                log::error!(
                    "input {} is required but unconnected at read time; returning EOF",
                    self.id
                );
                Message::Eof
            }
        }
    }
}

/// The three write disciplines for an [`Output`]'s fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Every downstream queue receives the same reference-equal value.
    Ref,
    /// The first downstream queue gets the original; every other queue
    /// gets an independent deep copy.
    Value,
    /// Round-robin: each emission goes to exactly one downstream queue.
    Circle,
}

/// The sending endpoint on a node.
#[derive(Debug)]
pub struct Output {
    id: String,
    description: String,
    type_tag: TypeTag,
    mode: OutputMode,
    downstreams: Vec<Sender<Message>>,
    cursor: usize,
}

impl Output {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        type_tag: TypeTag,
        mode: OutputMode,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            type_tag,
            mode,
            downstreams: Vec::new(),
            cursor: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    #[must_use]
    pub fn fan_out(&self) -> usize {
        self.downstreams.len()
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !self.downstreams.is_empty()
    }

    /// Adds a downstream queue. Wiring calls this once per connection
    /// whose `from` endpoint is this output.
    pub fn connect(&mut self, queue: Sender<Message>) {
        self.downstreams.push(queue);
    }

    /// Sends a message. See `spec.md` §4.1 for the fan-out rule, including
    /// the EOF override of `circle`.
    pub fn send(&mut self, msg: Message) -> Result<(), OutputSendError> {
        if let Message::Value(v) = &msg {
            if !self.type_tag.matches(v) {
                return Err(OutputSendError::Type(TypeError::TypeMismatch {
                    port: self.id.clone(),
                    expected: self.type_tag,
                }));
            }
        }
        if self.downstreams.is_empty() {
            return Err(OutputSendError::Unconnected(UnconnectedOutputError(
                self.id.clone(),
            )));
        }

        if msg.is_eof() {
            for q in &self.downstreams {
                let _ = q.send(Message::Eof);
            }
            return Ok(());
        }

        match self.mode {
            // Every queue gets the same Arc: reference-identical payload.
            OutputMode::Ref => {
                for q in &self.downstreams {
                    let _ = q.send(msg.clone());
                }
            }
            // The first queue gets the original Arc; every other queue
            // gets a freshly allocated deep copy.
            OutputMode::Value => {
                let Message::Value(original) = &msg else {
                    unreachable!("EOF handled above")
                };
                for q in &self.downstreams[1..] {
                    let _ = q.send(Message::value(original.as_ref().clone()));
                }
                let _ = self.downstreams[0].send(msg);
            }
            OutputMode::Circle => {
                let idx = self.cursor % self.downstreams.len();
                let _ = self.downstreams[idx].send(msg);
                self.cursor = (self.cursor + 1) % self.downstreams.len();
            }
        }
        Ok(())
    }
}

/// Errors raised by [`Output::send`].
#[derive(thiserror::Error, Debug)]
pub enum OutputSendError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Unconnected(#[from] UnconnectedOutputError),
}
