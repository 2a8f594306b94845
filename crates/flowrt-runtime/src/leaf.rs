use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use flowrt_core::{Input, InputMode, Message, Output, StoppedEvent};

use crate::component::{Component, Inputs, ProcessCtx, ProcessOutcome};
use crate::node::Node;

/// Errors a leaf worker can die with. All are fatal to that worker; see
/// `spec.md` §7.
#[derive(thiserror::Error, Debug, Clone)]
pub enum WorkerError {
    #[error("node {node} returned unknown output pin {pin:?}")]
    UnknownOutput { node: String, pin: String },
    #[error("node {node}: {source}")]
    Send {
        node: String,
        #[source]
        source: Arc<flowrt_core::OutputSendError>,
    },
    #[error("node {node}: process raised: {message}")]
    User { node: String, message: String },
}

/// A C6 leaf node: declares a static input/output schema and executes a
/// user-supplied [`Component`] reactively on a dedicated worker thread.
pub struct LeafNode {
    id: String,
    node_type: String,
    display_name: String,
    input_order: Vec<String>,
    output_order: Vec<String>,
    inputs: Vec<(String, Input)>,
    outputs: Vec<(String, Output)>,
    component: Option<Box<dyn Component>>,
    stop_flag: Arc<AtomicBool>,
    stopped: StoppedEvent,
    join: Option<JoinHandle<()>>,
    error: Arc<Mutex<Option<WorkerError>>>,
}

impl LeafNode {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        node_type: impl Into<String>,
        display_name: impl Into<String>,
        inputs: Vec<(String, Input)>,
        outputs: Vec<(String, Output)>,
        component: Box<dyn Component>,
    ) -> Self {
        let input_order = inputs.iter().map(|(n, _)| n.clone()).collect();
        let output_order = outputs.iter().map(|(n, _)| n.clone()).collect();
        Self {
            id: id.into(),
            node_type: node_type.into(),
            display_name: display_name.into(),
            input_order,
            output_order,
            inputs,
            outputs,
            component: Some(component),
            stop_flag: Arc::new(AtomicBool::new(false)),
            stopped: StoppedEvent::new(),
            join: None,
            error: Arc::new(Mutex::new(None)),
        }
    }
}

impl Node for LeafNode {
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

    fn input_mut(&mut self, pin: &str) -> Option<&mut Input> {
        self.inputs.iter_mut().find(|(n, _)| n == pin).map(|(_, i)| i)
    }

    fn output_mut(&mut self, pin: &str) -> Option<&mut Output> {
        self.outputs.iter_mut().find(|(n, _)| n == pin).map(|(_, o)| o)
    }

    fn run(&mut self) {
        let inputs = std::mem::take(&mut self.inputs);
        let outputs = std::mem::take(&mut self.outputs);
        let Some(component) = self.component.take() else {
            log::warn!("node {} run() called more than once; ignoring", self.id);
            return;
        };
        let input_order = self.input_order.clone();
        let stop_flag = Arc::clone(&self.stop_flag);
        let stopped = self.stopped.clone();
        let id = self.id.clone();
        let error_slot = Arc::clone(&self.error);

        let handle = thread::Builder::new()
            .name(format!("flowrt-leaf-{id}"))
            .spawn(move || {
                worker_loop(id, input_order, inputs, outputs, component, stop_flag, stopped, error_slot);
            })
            .expect("failed to spawn leaf worker thread");
        self.join = Some(handle);
    }

    fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    fn terminate(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    fn last_error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(ToString::to_string)
    }
}

impl Drop for LeafNode {
    fn drop(&mut self) {
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    id: String,
    input_order: Vec<String>,
    mut inputs: Vec<(String, Input)>,
    mut outputs: Vec<(String, Output)>,
    mut component: Box<dyn Component>,
    stop_flag: Arc<AtomicBool>,
    stopped: StoppedEvent,
    error_slot: Arc<Mutex<Option<WorkerError>>>,
) {
    log::debug!("node {id} starting");
    let ctx = ProcessCtx::new(Arc::clone(&stop_flag));

    loop {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }

        let mut round = Inputs::new();
        let mut queue_total = 0usize;
        let mut queue_eof = 0usize;
        for name in &input_order {
            let input = inputs.iter_mut().find(|(n, _)| n == name).map(|(_, i)| i).expect("schema invariant");
            let is_queue = input.mode() == InputMode::Queue;
            let msg = input.get();
            if is_queue {
                queue_total += 1;
                if msg.is_eof() {
                    queue_eof += 1;
                }
            }
            round.insert(name.clone(), msg);
        }

        if queue_total > 0 && queue_eof == queue_total {
            log::debug!("node {id} all queue inputs closed; stopping");
            break;
        }

        match component.process(&round, &ctx) {
            Ok(ProcessOutcome::None) => {}
            Ok(ProcessOutcome::Emit(values)) => {
                for (pin, value) in values {
                    let Some((_, output)) = outputs.iter_mut().find(|(n, _)| *n == pin) else {
                        let err = WorkerError::UnknownOutput { node: id.clone(), pin };
                        log::error!("{err}");
                        *error_slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(err);
                        finish(&id, &mut outputs, &stopped);
                        return;
                    };
                    if let Err(source) = output.send(Message::value(value)) {
                        let err = WorkerError::Send { node: id.clone(), source: Arc::new(source) };
                        log::error!("{err}");
                        *error_slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(err);
                        finish(&id, &mut outputs, &stopped);
                        return;
                    }
                }
            }
            Err(user_err) => {
                let err = WorkerError::User { node: id.clone(), message: user_err.to_string() };
                log::error!("{err}");
                *error_slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(err);
                finish(&id, &mut outputs, &stopped);
                return;
            }
        }

        if ctx.stop_was_requested() {
            break;
        }
    }

    finish(&id, &mut outputs, &stopped);
}

fn finish(id: &str, outputs: &mut [(String, Output)], stopped: &StoppedEvent) {
    for (pin, output) in outputs.iter_mut() {
        if output.is_connected() {
            if let Err(e) = output.send(Message::Eof) {
                log::warn!("node {id} failed to broadcast EOF on {pin}: {e}");
            }
        }
    }
    log::debug!("node {id} finished");
    stopped.fire();
}
