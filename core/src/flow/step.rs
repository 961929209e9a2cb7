// core/src/flow/step.rs

use super::FlowContext;
use std::sync::Arc;

/// Evaluated before a step runs; `true` skips the step.
pub type SkipCondition<T> = Arc<dyn Fn(FlowContext<T>) -> bool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct StepDef<T: 'static + Send + Sync> {
  pub name: String,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send + Sync> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}

/// Builds a skip condition that inspects the context data under a read lock.
pub fn skip_when<T, F>(predicate: F) -> Option<SkipCondition<T>>
where
  T: 'static + Send + Sync,
  F: Fn(&T) -> bool + Send + Sync + 'static,
{
  Some(Arc::new(move |ctx: FlowContext<T>| ctx.with(|data| predicate(data))))
}
