// core/src/model/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Moderation state shared by artisans, products and blog posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl ApprovalStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ApprovalStatus::Pending => "pending",
      ApprovalStatus::Approved => "approved",
      ApprovalStatus::Rejected => "rejected",
    }
  }
}

impl fmt::Display for ApprovalStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ApprovalStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(ApprovalStatus::Pending),
      "approved" => Ok(ApprovalStatus::Approved),
      "rejected" => Ok(ApprovalStatus::Rejected),
      other => Err(format!("Invalid approval status: {}", other)),
    }
  }
}

/// The approval fields of an entity.
///
/// Notes only exist on an approval and a reason only on a rejection, so an entity can
/// never carry both. Serialized flat, with the `approvalStatus` tag next to
/// `approvalNotes` / `rejectionReason` / `approvedBy` / `approvedAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "approvalStatus", rename_all = "lowercase")]
pub enum Review {
  #[default]
  Pending,
  Approved {
    #[serde(rename = "approvalNotes")]
    notes: String,
    #[serde(rename = "approvedBy")]
    reviewed_by: Uuid,
    #[serde(rename = "approvedAt")]
    reviewed_at: DateTime<Utc>,
  },
  Rejected {
    #[serde(rename = "rejectionReason")]
    reason: String,
    #[serde(rename = "approvedBy")]
    reviewed_by: Uuid,
    #[serde(rename = "approvedAt")]
    reviewed_at: DateTime<Utc>,
  },
}

impl Review {
  pub fn status(&self) -> ApprovalStatus {
    match self {
      Review::Pending => ApprovalStatus::Pending,
      Review::Approved { .. } => ApprovalStatus::Approved,
      Review::Rejected { .. } => ApprovalStatus::Rejected,
    }
  }

  pub fn is_approved(&self) -> bool {
    matches!(self, Review::Approved { .. })
  }

  pub fn notes(&self) -> Option<&str> {
    match self {
      Review::Approved { notes, .. } => Some(notes),
      _ => None,
    }
  }

  pub fn rejection_reason(&self) -> Option<&str> {
    match self {
      Review::Rejected { reason, .. } => Some(reason),
      _ => None,
    }
  }

  pub fn reviewed_by(&self) -> Option<Uuid> {
    match self {
      Review::Pending => None,
      Review::Approved { reviewed_by, .. } | Review::Rejected { reviewed_by, .. } => Some(*reviewed_by),
    }
  }

  pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
    match self {
      Review::Pending => None,
      Review::Approved { reviewed_at, .. } | Review::Rejected { reviewed_at, .. } => Some(*reviewed_at),
    }
  }

  /// Rebuilds a review from its flat column representation.
  pub fn from_columns(
    status: ApprovalStatus,
    notes: Option<String>,
    reason: Option<String>,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
  ) -> Result<Self, String> {
    match status {
      ApprovalStatus::Pending => Ok(Review::Pending),
      ApprovalStatus::Approved | ApprovalStatus::Rejected => {
        let (Some(reviewed_by), Some(reviewed_at)) = (reviewed_by, reviewed_at) else {
          return Err(format!("{} review is missing approvedBy/approvedAt", status));
        };
        if status == ApprovalStatus::Approved {
          Ok(Review::Approved {
            notes: notes.unwrap_or_default(),
            reviewed_by,
            reviewed_at,
          })
        } else {
          Ok(Review::Rejected {
            reason: reason.unwrap_or_default(),
            reviewed_by,
            reviewed_at,
          })
        }
      }
    }
  }
}
