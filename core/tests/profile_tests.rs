// tests/profile_tests.rs
mod common;

use artisan_approval::{
  ApprovalError, ApprovalStatus, BusinessInfoUpdate, Decision, DocumentsUpdate, EntityStore, ProfileUpdate,
};
use common::*;
use uuid::Uuid;

fn bio(text: &str) -> ProfileUpdate {
  ProfileUpdate {
    bio: Some(text.to_string()),
    ..Default::default()
  }
}

fn business_name(name: &str) -> ProfileUpdate {
  ProfileUpdate {
    business_info: Some(BusinessInfoUpdate {
      business_name: Some(name.to_string()),
      ..Default::default()
    }),
    ..Default::default()
  }
}

async fn approved_artisan(engine: &artisan_approval::ApprovalEngine, name: &str) -> artisan_approval::Artisan {
  let artisan = onboard(engine, name).await;
  engine
    .decide_artisan(artisan.id, Decision::approve(Uuid::new_v4(), None))
    .await
    .unwrap()
    .artisan
}

#[tokio::test]
async fn test_changed_fields_accumulate_until_cleared() {
  let (engine, _store) = engine();
  let artisan = approved_artisan(&engine, "Poplar").await;

  let after_bio = engine.update_artisan_profile(artisan.id, bio("Now also weaving")).await.unwrap();
  assert!(after_bio.pending_changes.has_changes);
  assert_eq!(after_bio.pending_changes.changed_fields, vec!["bio"]);

  let after_name = engine
    .update_artisan_profile(artisan.id, business_name("Poplar Weaving Co"))
    .await
    .unwrap();
  assert_eq!(
    after_name.pending_changes.changed_fields,
    vec!["bio", "businessInfo.businessName"]
  );
  assert_eq!(after_name.pending_changes.changes["businessInfo.businessName"], "Poplar Weaving Co");
  assert_eq!(after_name.pending_changes.history.len(), 2);

  // The artisan stays approved and live while flagged.
  assert_eq!(after_name.status(), ApprovalStatus::Approved);
  assert!(after_name.is_active);
  assert_eq!(after_name.profile.business_info.business_name, "Poplar Weaving Co");
}

#[tokio::test]
async fn test_clear_resets_only_the_flag() {
  let (engine, _store) = engine();
  let artisan = approved_artisan(&engine, "Sumac").await;
  engine.update_artisan_profile(artisan.id, bio("New bio")).await.unwrap();

  let admin = Uuid::new_v4();
  let cleared = engine.clear_change_notification(artisan.id, admin).await.unwrap();

  assert!(!cleared.pending_changes.has_changes);
  assert_eq!(cleared.pending_changes.changed_fields, vec!["bio"]);
  assert_eq!(cleared.pending_changes.cleared_by, Some(admin));
  assert_eq!(cleared.status(), ApprovalStatus::Approved);

  let again = engine.clear_change_notification(artisan.id, admin).await;
  assert!(matches!(again, Err(ApprovalError::NoChangesToClear)));
}

#[tokio::test]
async fn test_clear_on_unflagged_artisan_fails() {
  let (engine, _store) = engine();
  let artisan = onboard(&engine, "Yew").await;
  let result = engine.clear_change_notification(artisan.id, Uuid::new_v4()).await;
  assert!(matches!(result, Err(ApprovalError::NoChangesToClear)));
}

#[tokio::test]
async fn test_pending_artisan_edits_are_not_tracked() {
  let (engine, _store) = engine();
  let artisan = onboard(&engine, "Larch").await;

  let updated = engine.update_artisan_profile(artisan.id, bio("Revised")).await.unwrap();

  assert_eq!(updated.profile.bio, "Revised");
  assert!(!updated.pending_changes.has_changes);
  assert!(updated.pending_changes.history.is_empty());
  assert_eq!(updated.status(), ApprovalStatus::Pending);
}

#[tokio::test]
async fn test_cosmetic_edits_do_not_flag() {
  let (engine, _store) = engine();
  let artisan = approved_artisan(&engine, "Holly").await;

  let updated = engine
    .update_artisan_profile(
      artisan.id,
      ProfileUpdate {
        avatar_url: Some("https://cdn.example/holly.png".to_string()),
        banner_url: Some("https://cdn.example/holly-banner.png".to_string()),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.profile.avatar_url.as_deref(), Some("https://cdn.example/holly.png"));
  assert!(!updated.pending_changes.has_changes);
}

#[tokio::test]
async fn test_unchanged_values_do_not_flag() {
  let (engine, _store) = engine();
  let artisan = approved_artisan(&engine, "Ash").await;

  let same = artisan.profile.bio.clone();
  let updated = engine.update_artisan_profile(artisan.id, bio(&same)).await.unwrap();

  assert!(!updated.pending_changes.has_changes);
  assert_eq!(updated.version, artisan.version);
}

#[tokio::test]
async fn test_document_edits_are_reviewable() {
  let (engine, _store) = engine();
  let artisan = approved_artisan(&engine, "Oak").await;

  let updated = engine
    .update_artisan_profile(
      artisan.id,
      ProfileUpdate {
        documents: Some(DocumentsUpdate {
          business_license: Some("license-2026.pdf".to_string()),
          ..Default::default()
        }),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.pending_changes.changed_fields, vec!["documents.businessLicense"]);
}

#[tokio::test]
async fn test_blank_required_fields_are_rejected() {
  let (engine, store) = engine();
  let artisan = onboard(&engine, "Fir").await;

  let result = engine.update_artisan_profile(artisan.id, business_name("  ")).await;
  assert!(matches!(result, Err(ApprovalError::Validation(_))));
  assert_eq!(store.find_artisan(artisan.id).await.unwrap().unwrap(), artisan);
}

#[tokio::test]
async fn test_unknown_artisan_profile_is_not_found() {
  let (engine, _store) = engine();
  let result = engine.update_artisan_profile(Uuid::new_v4(), bio("x")).await;
  assert!(matches!(result, Err(ApprovalError::NotFound { .. })));
}
