// core/src/model/artisan.rs

use super::profile::ArtisanProfile;
use super::review::{ApprovalStatus, Review};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One tracked profile edit, kept forever in [`PendingChanges::history`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
  pub field: String,
  pub value: Value,
  pub changed_at: DateTime<Utc>,
}

/// Re-review flag raised when an approved artisan edits a reviewable field.
///
/// `has_changes` is the only thing a clear resets; the field list, the snapshot of
/// new values and the history stay for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PendingChanges {
  pub has_changes: bool,
  pub changed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub changed_fields: Vec<String>,
  #[serde(default)]
  pub changes: Map<String, Value>,
  #[serde(default)]
  pub history: Vec<ChangeRecord>,
  pub cleared_at: Option<DateTime<Utc>>,
  pub cleared_by: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artisan {
  pub id: Uuid,
  pub user_id: Uuid,
  #[serde(flatten)]
  pub profile: ArtisanProfile,
  #[serde(flatten)]
  pub review: Review,
  pub is_active: bool,
  pub pending_changes: PendingChanges,
  pub version: u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Artisan {
  /// A freshly onboarded, pending and inactive artisan.
  pub fn new(user_id: Uuid, profile: ArtisanProfile, now: DateTime<Utc>) -> Self {
    Self {
      id: Uuid::new_v4(),
      user_id,
      profile,
      review: Review::Pending,
      is_active: false,
      pending_changes: PendingChanges::default(),
      version: 1,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn status(&self) -> ApprovalStatus {
    self.review.status()
  }

  pub fn display_name(&self) -> &str {
    &self.profile.name
  }

  pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
    self.version += 1;
    self.updated_at = now;
  }
}

/// Where a user stands in the seller onboarding process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingState {
  NotSubmitted,
  Pending,
  Approved,
  Rejected,
}

impl From<ApprovalStatus> for OnboardingState {
  fn from(status: ApprovalStatus) -> Self {
    match status {
      ApprovalStatus::Pending => OnboardingState::Pending,
      ApprovalStatus::Approved => OnboardingState::Approved,
      ApprovalStatus::Rejected => OnboardingState::Rejected,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
  pub onboarding_status: OnboardingState,
  pub artisan: Option<Artisan>,
}

impl OnboardingStatus {
  pub fn of(artisan: Option<Artisan>) -> Self {
    let onboarding_status = artisan
      .as_ref()
      .map(|a| OnboardingState::from(a.status()))
      .unwrap_or(OnboardingState::NotSubmitted);
    Self {
      onboarding_status,
      artisan,
    }
  }
}
