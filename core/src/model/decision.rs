// core/src/model/decision.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a moderator decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Verdict {
  Approve { notes: Option<String> },
  Reject { reason: String },
}

/// A moderation decision. Never persisted on its own; it becomes a [`super::Review`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
  pub actor: Uuid,
  pub verdict: Verdict,
}

impl Decision {
  pub fn approve(actor: Uuid, notes: Option<String>) -> Self {
    Self {
      actor,
      verdict: Verdict::Approve { notes },
    }
  }

  pub fn reject(actor: Uuid, reason: impl Into<String>) -> Self {
    Self {
      actor,
      verdict: Verdict::Reject { reason: reason.into() },
    }
  }

  pub fn is_approve(&self) -> bool {
    matches!(self.verdict, Verdict::Approve { .. })
  }
}
