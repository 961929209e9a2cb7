// core/src/flow/control.rs

/// Returned by a step handler to continue with the flow or halt it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
  Continue,
  /// Stop immediately. Remaining handlers and steps are not run.
  Halt,
}

/// Outcome of a complete flow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  Halted,
}
