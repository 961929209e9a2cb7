// core/src/tracker.rs

//! Re-review flag for approved artisans who edit their profile.

use crate::error::ApprovalError;
use crate::model::{ChangeRecord, FieldChange, PendingChanges};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Records the reviewable subset of `changes`. Returns whether anything was recorded.
///
/// While the flag is up, new field names are added to the flagged set. Once an admin
/// has cleared it, the next edit starts a fresh set. History is never rewritten.
pub fn record(pending: &mut PendingChanges, changes: &[FieldChange], now: DateTime<Utc>) -> bool {
  let reviewable: Vec<&FieldChange> = changes.iter().filter(|c| c.field.is_reviewable()).collect();
  if reviewable.is_empty() {
    return false;
  }

  // Whether a clear should also drop the previously reviewed snapshot is an open
  // question upstream. Until it is settled, an acknowledged set is not carried into
  // the next review round; `history` keeps every entry either way.
  if !pending.has_changes {
    pending.changed_fields.clear();
    pending.changes.clear();
  }

  for change in reviewable {
    let path = change.field.path();
    if !pending.changed_fields.iter().any(|f| f == path) {
      pending.changed_fields.push(path.to_string());
    }
    pending.changes.insert(path.to_string(), change.value.clone());
    pending.history.push(ChangeRecord {
      field: path.to_string(),
      value: change.value.clone(),
      changed_at: now,
    });
  }

  pending.has_changes = true;
  pending.changed_at = Some(now);
  true
}

/// Drops the flag. Field list, snapshot and history are left as they are.
pub fn clear(pending: &mut PendingChanges, admin: Uuid, now: DateTime<Utc>) -> Result<(), ApprovalError> {
  if !pending.has_changes {
    return Err(ApprovalError::NoChangesToClear);
  }
  pending.has_changes = false;
  pending.cleared_at = Some(now);
  pending.cleared_by = Some(admin);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::ProfileField;
  use serde_json::json;

  fn change(field: ProfileField, value: &str) -> FieldChange {
    FieldChange {
      field,
      value: json!(value),
    }
  }

  #[test]
  fn cosmetic_only_edits_are_ignored() {
    let mut pending = PendingChanges::default();
    let recorded = record(&mut pending, &[change(ProfileField::AvatarUrl, "a.png")], Utc::now());
    assert!(!recorded);
    assert!(!pending.has_changes);
    assert!(pending.history.is_empty());
  }

  #[test]
  fn clear_keeps_the_audit_trail() {
    let mut pending = PendingChanges::default();
    record(&mut pending, &[change(ProfileField::Bio, "new bio")], Utc::now());
    let admin = Uuid::new_v4();
    clear(&mut pending, admin, Utc::now()).unwrap();

    assert!(!pending.has_changes);
    assert_eq!(pending.changed_fields, vec!["bio"]);
    assert_eq!(pending.changes.get("bio"), Some(&json!("new bio")));
    assert_eq!(pending.cleared_by, Some(admin));
    assert!(matches!(clear(&mut pending, admin, Utc::now()), Err(ApprovalError::NoChangesToClear)));
  }

  #[test]
  fn edit_after_clear_starts_a_new_set() {
    let mut pending = PendingChanges::default();
    record(&mut pending, &[change(ProfileField::Bio, "one")], Utc::now());
    clear(&mut pending, Uuid::new_v4(), Utc::now()).unwrap();
    record(&mut pending, &[change(ProfileField::TaxId, "T-1")], Utc::now());

    assert!(pending.has_changes);
    assert_eq!(pending.changed_fields, vec!["businessInfo.taxId"]);
    assert_eq!(pending.history.len(), 2);
  }
}
