use flowrt_core::{Input, Output, StoppedEvent};

/// Common surface of a leaf component and a visual graph (`spec.md` §3's
/// "Node" attributes plus the lifecycle operations of §4.2/§4.4).
pub trait Node: Send {
    fn id(&self) -> &str;
    fn node_type(&self) -> &str;
    fn display_name(&self) -> &str;

    /// Fires once this node has finished and will emit no more (§4.6).
    fn stopped_event(&self) -> StoppedEvent;

    /// Accesses a declared input by pin name, for wiring. Returns `None`
    /// once `run` has taken ownership of the node's ports.
    fn input_mut(&mut self, pin: &str) -> Option<&mut Input>;

    /// Accesses a declared output by pin name, for wiring.
    fn output_mut(&mut self, pin: &str) -> Option<&mut Output>;

    /// Transitions Created → Running: spawns the node's worker(s).
    fn run(&mut self);

    /// Graceful termination: cease after the current iteration, still
    /// emit EOF on outputs.
    fn stop(&mut self);

    /// Best-effort abort: stop immediately and finish without waiting for
    /// an in-flight `process` call to return.
    fn terminate(&mut self);

    /// Runs on the thread that owns main-thread resources, strictly after
    /// `stopped_event` has fired. Most nodes have nothing to do here.
    fn shutdown(&mut self) {}

    /// The error a worker died with, if any (`spec.md` §7's propagation
    /// policy: the graph completes normally even if a child errored).
    fn last_error(&self) -> Option<String> {
        None
    }
}
