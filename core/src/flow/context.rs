// core/src/flow/context.rs

//! Shared, lockable state handed to every step handler of a flow.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared ownership wrapper around a flow's working data.
///
/// Guards returned by [`FlowContext::read`] and [`FlowContext::write`] are blocking
/// and MUST be dropped before any `.await` point inside a handler.
#[derive(Debug)]
pub struct FlowContext<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> FlowContext<T> {
  pub fn new(data: T) -> Self {
    FlowContext(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Copies a value out of the context under a short read lock.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
    f(&self.0.read())
  }
}

impl<T: Send + Sync + 'static> Clone for FlowContext<T> {
  fn clone(&self) -> Self {
    FlowContext(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static> FlowContext<T> {
  /// Takes the data back out once every other clone has been dropped.
  pub fn into_inner(self) -> Option<T> {
    Arc::try_unwrap(self.0).ok().map(RwLock::into_inner)
  }
}
