// core/src/flow/error.rs
use thiserror::Error;

/// Framework-level failures of the flow engine itself, as opposed to failures
/// raised by step handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("No handler registered for step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No flow registered for context type {context_type}")]
  NotRegistered { context_type: String },

  #[error("Type mismatch during context dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Flow over {context_type} finished without producing its result")]
  MissingOutput { context_type: String },
}

impl FlowError {
  pub fn missing_output<T>() -> Self {
    FlowError::MissingOutput {
      context_type: std::any::type_name::<T>().to_string(),
    }
  }
}
