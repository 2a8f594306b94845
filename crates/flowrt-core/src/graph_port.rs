use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::message::Message;
use crate::port::{Output, OutputSendError};

/// The port a visual graph exposes to the outside world on its *input*
/// side.
///
/// From a writer's point of view this behaves exactly like an ordinary
/// input queue: `sender()` hands out a `Sender` that any number of
/// producers (an external driver, or another node's fan-out) can connect
/// to or clone. Internally, [`GraphInputPort::run_forwarder`] drains that
/// queue and forwards every value into `target` — the interior fan-out —
/// suppressing EOF until every registered producer has closed
/// (`spec.md` §4.3, P8). This avoids a back-pointer from the graph's
/// interior to its own boundary: the forwarder just holds `target` by
/// value (see the "Cyclic/diamond references" design note).
#[derive(Debug)]
pub struct GraphInputPort {
    queue: Receiver<Message>,
    sender: Sender<Message>,
    target: Output,
    ref_count: AtomicUsize,
}

impl GraphInputPort {
    #[must_use]
    pub fn new(target: Output) -> Self {
        let (sender, queue) = crossbeam_channel::unbounded();
        Self {
            queue,
            sender,
            target,
            ref_count: AtomicUsize::new(0),
        }
    }

    /// A cloneable handle producers connect to, exactly as they would an
    /// ordinary input's backing queue.
    #[must_use]
    pub fn sender(&self) -> Sender<Message> {
        self.sender.clone()
    }

    /// Registers one more upstream producer. Called once per incoming
    /// connection (or external driver) at wiring time, before `run`.
    pub fn register_producer(&self) {
        self.ref_count.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.ref_count.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn inner_output_mut(&mut self) -> &mut Output {
        &mut self.target
    }

    /// Forwards a value immediately; suppresses EOF until every registered
    /// producer has sent one.
    fn put(&mut self, msg: Message) -> Result<(), OutputSendError> {
        match msg {
            Message::Value(_) => self.target.send(msg),
            Message::Eof => {
                let prev = self.ref_count.fetch_sub(1, Ordering::SeqCst);
                if prev <= 1 {
                    self.target.send(Message::Eof)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Runs to completion on the calling thread: drains the port's queue
    /// and forwards into the interior, until the gated EOF fires or every
    /// producer has disconnected without one.
    pub fn run_forwarder(mut self) {
        loop {
            match self.queue.recv() {
                Ok(msg) => {
                    let was_eof = msg.is_eof();
                    if let Err(e) = self.put(msg) {
                        log::warn!("graph input port failed to forward: {e}");
                        return;
                    }
                    if was_eof && self.ref_count() == 0 {
                        return;
                    }
                }
                Err(_) => {
                    // All producer senders dropped without an explicit EOF.
                    let _ = self.target.send(Message::Eof);
                    return;
                }
            }
        }
    }
}

/// The port a visual graph exposes on its *output* side: a real [`Output`]
/// whose downstream queues are the outside consumers.
pub type GraphOutputPort = Output;
