// tests/concurrency_tests.rs
mod common;

use artisan_approval::{
  ApprovalError, ApprovalStatus, BusinessInfoUpdate, Decision, EntityStore, ProfileUpdate,
};
use common::*;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_decisions_commit_exactly_once() {
  let (engine, store) = engine();
  let engine = Arc::new(engine);
  let artisan = onboard(&engine, "Tamarack").await;
  let product = seed_product(&store, artisan.id, ApprovalStatus::Pending).await;
  let artisan_id = artisan.id;

  let approve = {
    let engine = engine.clone();
    tokio::spawn(async move {
      engine
        .decide_artisan(artisan_id, Decision::approve(Uuid::new_v4(), None))
        .await
    })
  };
  let reject = {
    let engine = engine.clone();
    tokio::spawn(async move {
      engine
        .decide_artisan(artisan_id, Decision::reject(Uuid::new_v4(), "spam"))
        .await
    })
  };
  let (approve, reject) = tokio::join!(approve, reject);
  let results = [approve.unwrap(), reject.unwrap()];

  let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
  assert_eq!(winners.len(), 1);
  assert!(results
    .iter()
    .any(|r| matches!(r, Err(ApprovalError::AlreadyProcessed { .. }))));

  let winner = winners[0];
  let stored = store.find_artisan(artisan.id).await.unwrap().unwrap();
  assert_eq!(stored.status(), winner.artisan.status());
  assert_eq!(winner.cascade.products_affected, 1);
  assert_eq!(product_status(&store, product.id).await, winner.artisan.status());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_profile_edits_both_land() {
  let (engine, _store) = engine();
  let engine = Arc::new(engine);
  let artisan = onboard(&engine, "Sassafras").await;
  engine
    .decide_artisan(artisan.id, Decision::approve(Uuid::new_v4(), None))
    .await
    .unwrap();
  let artisan_id = artisan.id;

  let edit_bio = {
    let engine = engine.clone();
    tokio::spawn(async move {
      let update = ProfileUpdate {
        bio: Some("Bio from tab one".to_string()),
        ..Default::default()
      };
      engine.update_artisan_profile(artisan_id, update).await
    })
  };
  let edit_tax_id = {
    let engine = engine.clone();
    tokio::spawn(async move {
      let update = ProfileUpdate {
        business_info: Some(BusinessInfoUpdate {
          tax_id: Some("TX-99".to_string()),
          ..Default::default()
        }),
        ..Default::default()
      };
      engine.update_artisan_profile(artisan_id, update).await
    })
  };
  let (a, b) = tokio::join!(edit_bio, edit_tax_id);
  a.unwrap().unwrap();
  b.unwrap().unwrap();

  let stored = engine.get_artisan(artisan.id).await.unwrap();
  assert_eq!(stored.profile.bio, "Bio from tab one");
  assert_eq!(stored.profile.business_info.tax_id.as_deref(), Some("TX-99"));
  let mut fields = stored.pending_changes.changed_fields.clone();
  fields.sort();
  assert_eq!(fields, vec!["bio", "businessInfo.taxId"]);
}

#[tokio::test]
async fn test_stale_save_is_refused() {
  let (engine, store) = engine();
  let artisan = onboard(&engine, "Buckeye").await;

  let mut first = artisan.clone();
  first.profile.bio = "first".to_string();
  first.version += 1;
  assert!(store.save_artisan(&first, artisan.version).await.unwrap());

  let mut stale = artisan.clone();
  stale.profile.bio = "stale".to_string();
  stale.version += 1;
  assert!(!store.save_artisan(&stale, artisan.version).await.unwrap());

  assert_eq!(store.find_artisan(artisan.id).await.unwrap().unwrap().profile.bio, "first");
}

#[tokio::test]
async fn test_concurrent_onboarding_for_one_user_yields_one_artisan() {
  let (engine, store) = engine();
  let user = Uuid::new_v4();

  let (a, b) = tokio::join!(
    engine.submit_onboarding(user, profile("Catalpa")),
    engine.submit_onboarding(user, profile("Catalpa"))
  );

  let oks = [&a, &b].iter().filter(|r| r.is_ok()).count();
  assert_eq!(oks, 1);
  assert!([&a, &b]
    .iter()
    .any(|r| matches!(r, Err(ApprovalError::DuplicateApplication))));
  assert!(store.find_artisan_by_user(user).await.unwrap().is_some());
}
