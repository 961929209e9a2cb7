// core/src/error.rs
use crate::flow::FlowError;
use crate::model::ApprovalStatus;
use crate::store::StoreError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The three moderated entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  Artisan,
  Product,
  BlogPost,
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      EntityKind::Artisan => "Artisan",
      EntityKind::Product => "Product",
      EntityKind::BlogPost => "Blog post",
    })
  }
}

#[derive(Debug, Error)]
pub enum ApprovalError {
  #[error("{entity} not found: {id}")]
  NotFound { entity: EntityKind, id: Uuid },

  #[error("{entity} has already been {status}")]
  AlreadyProcessed { entity: EntityKind, status: ApprovalStatus },

  #[error("Rejection reason is required")]
  MissingReason,

  #[error("An artisan application already exists for this user")]
  DuplicateApplication,

  #[error("No pending changes to clear")]
  NoChangesToClear,

  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Store failure: {0}")]
  Store(#[from] StoreError),

  #[error("Workflow engine error: {0}")]
  Flow(#[from] FlowError),
}

impl ApprovalError {
  pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
    ApprovalError::NotFound { entity, id }
  }
}

pub type ApprovalResult<T, E = ApprovalError> = std::result::Result<T, E>;
