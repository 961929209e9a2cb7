// core/src/flow/registry.rs

//! Type-keyed registry of flows. Each context type has at most one flow.

use crate::flow::context::FlowContext;
use crate::flow::control::FlowOutcome;
use crate::flow::error::FlowError;
use crate::flow::pipeline::Flow;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait AnyFlowRunner<Err>: Send + Sync
where
  Err: std::error::Error + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, Err>;
}

struct FlowRunner<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flow: Flow<TData, Err>,
}

#[async_trait]
impl<TData, Err> AnyFlowRunner<Err> for FlowRunner<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, Err> {
    let typed = ctx.downcast::<FlowContext<TData>>().map_err(|_| {
      Err::from(FlowError::TypeMismatch {
        expected_type: std::any::type_name::<FlowContext<TData>>().to_string(),
      })
    })?;
    self.flow.run(*typed).await
  }
}

/// Holds one flow per context type and dispatches runs to it.
pub struct FlowRegistry<Err>
where
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flows: RwLock<HashMap<TypeId, Arc<dyn AnyFlowRunner<Err>>>>,
}

impl<Err> FlowRegistry<Err>
where
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `flow` for its context type, replacing any earlier registration.
  pub fn register<TData>(&self, flow: Flow<TData, Err>)
  where
    TData: 'static + Send + Sync,
  {
    event!(
      Level::DEBUG,
      context_type = %std::any::type_name::<TData>(),
      steps = ?flow.step_names(),
      "Registering flow."
    );
    self
      .flows
      .write()
      .insert(TypeId::of::<TData>(), Arc::new(FlowRunner { flow }));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.flows.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the flow registered for `TData`.
  pub async fn run<TData>(&self, ctx: FlowContext<TData>) -> Result<FlowOutcome, Err>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self.flows.read().get(&TypeId::of::<TData>()).cloned();
    let runner = runner.ok_or_else(|| {
      let context_type = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %context_type, "No flow registered.");
      Err::from(FlowError::NotRegistered { context_type })
    })?;
    runner.run_erased(Box::new(ctx)).await
  }
}

impl<Err> Default for FlowRegistry<Err>
where
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
