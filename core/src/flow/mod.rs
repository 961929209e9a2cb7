// core/src/flow/mod.rs

//! A small step-pipeline engine.
//!
//! A [`Flow`] is an ordered list of named steps. Each step has `on` handlers and
//! optional `after` handlers that receive a shared [`FlowContext`] and return a
//! [`FlowControl`]. Flows are registered in a [`FlowRegistry`] keyed by their
//! context type, and the approval engine dispatches every operation through it.

pub mod context;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod step;

pub use context::FlowContext;
pub use control::{FlowControl, FlowOutcome};
pub use error::FlowError;
pub use pipeline::{Flow, Handler};
pub use registry::FlowRegistry;
pub use step::{skip_when, SkipCondition, StepDef};
