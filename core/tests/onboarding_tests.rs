// tests/onboarding_tests.rs
mod common;

use artisan_approval::{
  ApprovalError, ApprovalStatus, Decision, EntityStore, OnboardingState, PublicationStatus,
};
use common::*;
use uuid::Uuid;

#[tokio::test]
async fn test_onboarding_to_approval_end_to_end() {
  let (engine, store) = engine();
  let user = Uuid::new_v4();

  let before = engine.onboarding_status(user).await.unwrap();
  assert_eq!(before.onboarding_status, OnboardingState::NotSubmitted);
  assert!(before.artisan.is_none());

  let artisan = engine.submit_onboarding(user, profile("Magnolia")).await.unwrap();
  assert_eq!(artisan.status(), ApprovalStatus::Pending);
  assert!(!artisan.is_active);
  let status = engine.onboarding_status(user).await.unwrap();
  assert_eq!(status.onboarding_status, OnboardingState::Pending);

  let first = engine.submit_product(user, new_product("vase")).await.unwrap();
  let second = engine.submit_product(user, new_product("mug")).await.unwrap();
  assert_eq!(first.status(), ApprovalStatus::Pending);
  assert!(!first.is_active);

  let outcome = engine
    .decide_artisan(artisan.id, Decision::approve(Uuid::new_v4(), Some("welcome".to_string())))
    .await
    .unwrap();

  assert_eq!(outcome.artisan.status(), ApprovalStatus::Approved);
  assert_eq!(outcome.artisan.review.notes(), Some("welcome"));
  assert_eq!(outcome.artisan.review.rejection_reason(), None);
  assert_eq!(outcome.cascade.products_affected, 2);

  for id in [first.id, second.id] {
    let product = store.find_product(id).await.unwrap().unwrap();
    assert_eq!(product.status(), ApprovalStatus::Approved);
    assert!(product.is_active);
    assert!(product.review.notes().unwrap().contains("Magnolia"));
  }

  let status = engine.onboarding_status(user).await.unwrap();
  assert_eq!(status.onboarding_status, OnboardingState::Approved);
  assert_eq!(status.artisan.map(|a| a.id), Some(artisan.id));
}

#[tokio::test]
async fn test_second_application_is_a_duplicate() {
  let (engine, _store) = engine();
  let user = Uuid::new_v4();
  let artisan = engine.submit_onboarding(user, profile("Cypress")).await.unwrap();
  engine
    .decide_artisan(artisan.id, Decision::reject(Uuid::new_v4(), "incomplete"))
    .await
    .unwrap();

  let again = engine.submit_onboarding(user, profile("Cypress Again")).await;
  assert!(matches!(again, Err(ApprovalError::DuplicateApplication)));
}

#[tokio::test]
async fn test_onboarding_requires_name_and_business_name() {
  let (engine, _store) = engine();

  let mut no_name = profile("x");
  no_name.name = "   ".to_string();
  let result = engine.submit_onboarding(Uuid::new_v4(), no_name).await;
  assert!(matches!(result, Err(ApprovalError::Validation(_))));

  let mut no_business = profile("Pine");
  no_business.business_info.business_name = String::new();
  let result = engine.submit_onboarding(Uuid::new_v4(), no_business).await;
  assert!(matches!(result, Err(ApprovalError::Validation(_))));
}

#[tokio::test]
async fn test_rejected_artisans_cannot_submit_content() {
  let (engine, _store) = engine();
  let user = Uuid::new_v4();
  let artisan = engine.submit_onboarding(user, profile("Sequoia")).await.unwrap();
  engine
    .decide_artisan(artisan.id, Decision::reject(Uuid::new_v4(), "not handmade"))
    .await
    .unwrap();

  let product = engine.submit_product(user, new_product("lamp")).await;
  assert!(matches!(product, Err(ApprovalError::Validation(_))));
  let post = engine.submit_blog_post(user, new_post("Hello")).await;
  assert!(matches!(post, Err(ApprovalError::Validation(_))));
}

#[tokio::test]
async fn test_submissions_need_an_artisan_profile() {
  let (engine, _store) = engine();
  let result = engine.submit_product(Uuid::new_v4(), new_product("bowl")).await;
  assert!(matches!(result, Err(ApprovalError::NotFound { .. })));
}

#[tokio::test]
async fn test_new_blog_posts_start_as_pending_drafts() {
  let (engine, _store) = engine();
  let user = Uuid::new_v4();
  let artisan = engine.submit_onboarding(user, profile("Acacia")).await.unwrap();
  engine
    .decide_artisan(artisan.id, Decision::approve(Uuid::new_v4(), None))
    .await
    .unwrap();

  let post = engine.submit_blog_post(user, new_post("Glaze notes")).await.unwrap();
  assert_eq!(post.approval_status(), ApprovalStatus::Pending);
  assert_eq!(post.status, PublicationStatus::Draft);
  assert_eq!(post.artisan_id, artisan.id);

  let invalid = engine.submit_blog_post(user, new_post(" ")).await;
  assert!(matches!(invalid, Err(ApprovalError::Validation(_))));
}
