// tests/decision_tests.rs
mod common;

use artisan_approval::{
  ApprovalError, ApprovalStatus, Decision, EntityKind, EntityStore, PublicationStatus,
};
use common::*;
use uuid::Uuid;

#[tokio::test]
async fn test_second_artisan_decision_is_already_processed() {
  let (engine, store) = engine();
  let artisan = onboard(&engine, "Willow").await;
  let pending = seed_product(&store, artisan.id, ApprovalStatus::Pending).await;

  let admin = Uuid::new_v4();
  let first = engine
    .decide_artisan(artisan.id, Decision::approve(admin, None))
    .await
    .unwrap();
  assert_eq!(first.cascade.products_affected, 1);
  let after_first = store.find_product(pending.id).await.unwrap().unwrap();

  let second = engine
    .decide_artisan(artisan.id, Decision::approve(admin, Some("again".to_string())))
    .await;
  assert!(matches!(
    second,
    Err(ApprovalError::AlreadyProcessed {
      entity: EntityKind::Artisan,
      status: ApprovalStatus::Approved
    })
  ));

  // Neither the artisan nor its content was touched again.
  let stored = store.find_artisan(artisan.id).await.unwrap().unwrap();
  assert_eq!(stored, first.artisan);
  assert_eq!(store.find_product(pending.id).await.unwrap().unwrap(), after_first);
}

#[tokio::test]
async fn test_reject_product_without_reason_changes_nothing() {
  let (engine, store) = engine();
  let artisan = onboard(&engine, "Birch").await;
  let product = seed_product(&store, artisan.id, ApprovalStatus::Pending).await;

  let result = engine
    .decide_product(product.id, Decision::reject(Uuid::new_v4(), ""))
    .await;

  assert!(matches!(result, Err(ApprovalError::MissingReason)));
  assert_eq!(store.find_product(product.id).await.unwrap().unwrap(), product);
}

#[tokio::test]
async fn test_missing_reason_is_reported_before_lookup() {
  let (engine, _store) = engine();
  let result = engine
    .decide_artisan(Uuid::new_v4(), Decision::reject(Uuid::new_v4(), "  "))
    .await;
  assert!(matches!(result, Err(ApprovalError::MissingReason)));
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
  let (engine, _store) = engine();
  let admin = Uuid::new_v4();
  let id = Uuid::new_v4();

  let artisan = engine.decide_artisan(id, Decision::approve(admin, None)).await;
  assert!(matches!(artisan, Err(ApprovalError::NotFound { entity: EntityKind::Artisan, .. })));

  let product = engine.decide_product(id, Decision::approve(admin, None)).await;
  assert!(matches!(product, Err(ApprovalError::NotFound { entity: EntityKind::Product, .. })));

  let blog = engine.decide_blog_post(id, Decision::approve(admin, None)).await;
  assert!(matches!(blog, Err(ApprovalError::NotFound { entity: EntityKind::BlogPost, .. })));
}

#[tokio::test]
async fn test_approved_artisan_carries_notes_only() {
  let (engine, _store) = engine();
  let artisan = onboard(&engine, "Cedar").await;
  let admin = Uuid::new_v4();

  let outcome = engine
    .decide_artisan(artisan.id, Decision::approve(admin, Some("welcome".to_string())))
    .await
    .unwrap();

  let decided = outcome.artisan;
  assert_eq!(decided.status(), ApprovalStatus::Approved);
  assert!(decided.is_active);
  assert_eq!(decided.review.notes(), Some("welcome"));
  assert_eq!(decided.review.rejection_reason(), None);
  assert_eq!(decided.review.reviewed_by(), Some(admin));
  assert!(decided.version > artisan.version);

  let json = serde_json::to_value(&decided).unwrap();
  assert_eq!(json["approvalStatus"], "approved");
  assert_eq!(json["approvalNotes"], "welcome");
  assert!(json.get("rejectionReason").is_none());
}

#[tokio::test]
async fn test_rejected_artisan_carries_reason_only() {
  let (engine, _store) = engine();
  let artisan = onboard(&engine, "Alder").await;

  let outcome = engine
    .decide_artisan(artisan.id, Decision::reject(Uuid::new_v4(), "missing license"))
    .await
    .unwrap();

  assert_eq!(outcome.artisan.status(), ApprovalStatus::Rejected);
  assert!(!outcome.artisan.is_active);
  assert_eq!(outcome.artisan.review.notes(), None);
  assert_eq!(outcome.artisan.review.rejection_reason(), Some("missing license"));
}

#[tokio::test]
async fn test_product_decision_does_not_cascade() {
  let (engine, store) = engine();
  let artisan = onboard(&engine, "Maple").await;
  let product = seed_product(&store, artisan.id, ApprovalStatus::Pending).await;
  let sibling = seed_product(&store, artisan.id, ApprovalStatus::Pending).await;

  let decided = engine
    .decide_product(product.id, Decision::approve(Uuid::new_v4(), None))
    .await
    .unwrap();

  assert_eq!(decided.status(), ApprovalStatus::Approved);
  assert!(decided.is_active);
  assert_eq!(decided.review.notes(), Some(""));
  assert_eq!(product_status(&store, sibling.id).await, ApprovalStatus::Pending);
  assert_eq!(
    store.find_artisan(artisan.id).await.unwrap().unwrap().status(),
    ApprovalStatus::Pending
  );
}

#[tokio::test]
async fn test_blog_approval_publishes_and_rejection_drafts() {
  let (engine, store) = engine();
  let artisan = onboard(&engine, "Rowan").await;
  let to_approve = seed_post(&store, artisan.id, ApprovalStatus::Pending).await;
  let to_reject = seed_post(&store, artisan.id, ApprovalStatus::Pending).await;
  let admin = Uuid::new_v4();

  let published = engine
    .decide_blog_post(to_approve.id, Decision::approve(admin, None))
    .await
    .unwrap();
  assert_eq!(published.status, PublicationStatus::Published);
  assert!(published.published_at.is_some());
  assert_eq!(published.approval_status(), ApprovalStatus::Approved);

  let drafted = engine
    .decide_blog_post(to_reject.id, Decision::reject(admin, "off topic"))
    .await
    .unwrap();
  assert_eq!(drafted.status, PublicationStatus::Draft);
  assert_eq!(drafted.published_at, None);
  assert_eq!(drafted.review.rejection_reason(), Some("off topic"));

  for post in store.blog_posts_by_artisan(artisan.id).await.unwrap() {
    if post.status == PublicationStatus::Published {
      assert_eq!(post.approval_status(), ApprovalStatus::Approved);
    }
  }
}
