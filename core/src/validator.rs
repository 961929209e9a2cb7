// core/src/validator.rs

//! Legal moderation transitions: only `pending` entities may be decided, and a
//! rejection needs a reason.

use crate::error::{ApprovalError, EntityKind};
use crate::model::{ApprovalStatus, Decision, Review, Verdict};
use chrono::{DateTime, Utc};

/// Checks the decision on its own. Runs before anything is read from the store.
pub fn check_decision(decision: &Decision) -> Result<(), ApprovalError> {
  match &decision.verdict {
    Verdict::Reject { reason } if reason.trim().is_empty() => Err(ApprovalError::MissingReason),
    _ => Ok(()),
  }
}

/// Fails closed on anything that is not `pending`.
pub fn check_transition(entity: EntityKind, current: ApprovalStatus) -> Result<(), ApprovalError> {
  match current {
    ApprovalStatus::Pending => Ok(()),
    status => Err(ApprovalError::AlreadyProcessed { entity, status }),
  }
}

pub fn validate(entity: EntityKind, current: ApprovalStatus, decision: &Decision) -> Result<(), ApprovalError> {
  check_decision(decision)?;
  check_transition(entity, current)
}

/// The review an entity carries once `decision` is committed at `now`.
pub fn review_for(decision: &Decision, now: DateTime<Utc>) -> Review {
  match &decision.verdict {
    Verdict::Approve { notes } => Review::Approved {
      notes: notes.clone().unwrap_or_default(),
      reviewed_by: decision.actor,
      reviewed_at: now,
    },
    Verdict::Reject { reason } => Review::Rejected {
      reason: reason.trim().to_string(),
      reviewed_by: decision.actor,
      reviewed_at: now,
    },
  }
}
