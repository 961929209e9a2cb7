// core/src/flow/pipeline.rs

//! The `Flow<TData, Err>` definition, handler registration and execution.

use crate::flow::context::FlowContext;
use crate::flow::control::{FlowControl, FlowOutcome};
use crate::flow::error::FlowError;
use crate::flow::step::{SkipCondition, StepDef};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{event, instrument, span, Instrument, Level};

/// A boxed asynchronous step handler.
///
/// Handlers take a clone of the flow context. Lock guards must be released before
/// the handler awaits anything.
pub type Handler<TData, Err> = Box<
  dyn Fn(FlowContext<TData>) -> Pin<Box<dyn Future<Output = Result<FlowControl, Err>> + Send>> + Send + Sync,
>;

/// Ordered steps over a context `TData`, whose handlers fail with `Err`.
///
/// `Err` must be constructible from [`FlowError`] so that engine-level problems
/// (a step without handlers, for instance) surface through the same error type.
pub struct Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a flow from `(step_name, skip_if)` pairs, run in the given order.
  pub fn new(step_defs: &[(&str, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, skip_if)| StepDef {
        name: (*name).to_string(),
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      steps,
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  // Registering against an unknown step is a wiring bug, caught at startup.
  fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Flow setup error: step '{}' is not part of this flow.", step_name);
    }
  }

  /// Registers the main handler of a step.
  pub fn on<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<FlowControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx| {
      let fut = handler_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self.on.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Registers a handler that runs once every `on` handler of the step has continued.
  pub fn after<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<FlowControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx| {
      let fut = handler_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self.after.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Runs every step in order against `ctx`.
  ///
  /// A step with no `on` handler fails the run with [`FlowError::HandlerMissing`].
  /// The first handler error aborts the run; nothing already done is undone.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(
      flow_context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx: FlowContext<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Flow execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(Level::INFO, "flow_step", step_name, step_index = step_idx);

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx.clone()) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped.");
          continue;
        }
      }

      let on_handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ => {
          event!(parent: &step_span, Level::ERROR, "Step has no handler.");
          return Err(Err::from(FlowError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      let phases = [("on", Some(on_handlers)), ("after", self.after.get(step_name))];
      for (phase, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        for handler in handlers {
          match handler(ctx.clone()).instrument(step_span.clone()).await {
            Ok(FlowControl::Continue) => {}
            Ok(FlowControl::Halt) => {
              event!(parent: &step_span, Level::INFO, phase, "Flow halted by handler.");
              return Ok(FlowOutcome::Halted);
            }
            Err(e) => {
              event!(parent: &step_span, Level::WARN, phase, error = %e, "Step handler failed.");
              return Err(e);
            }
          }
        }
      }
    }

    event!(Level::DEBUG, "Flow execution completed.");
    Ok(FlowOutcome::Completed)
  }
}
