// core/src/workflows/submission.rs

//! Sellers submitting new products and blog posts. New content always starts pending.

use crate::error::{ApprovalError, ApprovalResult, EntityKind};
use crate::flow::{Flow, FlowContext, FlowControl, FlowRegistry};
use crate::model::{ApprovalStatus, Artisan, BlogPost, NewBlogPost, NewProduct, Product};
use crate::store::{EntityStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[async_trait]
pub trait Submittable: Send + Sync + 'static {
  type Input: Clone + Send + Sync + 'static;

  const KIND: EntityKind;

  fn check_input(input: &Self::Input) -> ApprovalResult<()>;
  fn build(input: Self::Input, artisan_id: Uuid, now: DateTime<Utc>) -> Self;

  async fn insert(store: &dyn EntityStore, record: &Self) -> StoreResult<()>;
}

#[async_trait]
impl Submittable for Product {
  type Input = NewProduct;

  const KIND: EntityKind = EntityKind::Product;

  fn check_input(input: &NewProduct) -> ApprovalResult<()> {
    if input.name.trim().is_empty() {
      return Err(ApprovalError::Validation("name is required".to_string()));
    }
    if input.price_cents < 0 {
      return Err(ApprovalError::Validation("priceCents cannot be negative".to_string()));
    }
    if input.stock_quantity < 0 {
      return Err(ApprovalError::Validation("stockQuantity cannot be negative".to_string()));
    }
    Ok(())
  }

  fn build(input: NewProduct, artisan_id: Uuid, now: DateTime<Utc>) -> Self {
    input.into_product(artisan_id, now)
  }

  async fn insert(store: &dyn EntityStore, record: &Self) -> StoreResult<()> {
    store.insert_product(record).await
  }
}

#[async_trait]
impl Submittable for BlogPost {
  type Input = NewBlogPost;

  const KIND: EntityKind = EntityKind::BlogPost;

  fn check_input(input: &NewBlogPost) -> ApprovalResult<()> {
    if input.title.trim().is_empty() {
      return Err(ApprovalError::Validation("title is required".to_string()));
    }
    Ok(())
  }

  fn build(input: NewBlogPost, artisan_id: Uuid, now: DateTime<Utc>) -> Self {
    input.into_post(artisan_id, now)
  }

  async fn insert(store: &dyn EntityStore, record: &Self) -> StoreResult<()> {
    store.insert_blog_post(record).await
  }
}

pub struct SubmissionCtx<T: Submittable> {
  pub store: Arc<dyn EntityStore>,
  pub user_id: Uuid,
  pub input: T::Input,
  pub now: DateTime<Utc>,
  pub owner: Option<Artisan>,
  pub record: Option<T>,
}

impl<T: Submittable> SubmissionCtx<T> {
  pub fn new(store: Arc<dyn EntityStore>, user_id: Uuid, input: T::Input) -> Self {
    Self {
      store,
      user_id,
      input,
      now: Utc::now(),
      owner: None,
      record: None,
    }
  }
}

pub fn register<T: Submittable>(registry: &FlowRegistry<ApprovalError>) {
  let mut flow = Flow::<SubmissionCtx<T>, ApprovalError>::new(&[
    ("check_input", None),
    ("load_owner", None),
    ("check_owner_standing", None),
    ("insert_record", None),
  ]);

  flow.on("check_input", check_input::<T>);
  flow.on("load_owner", load_owner::<T>);
  flow.on("check_owner_standing", check_owner_standing::<T>);
  flow.on("insert_record", insert_record::<T>);

  registry.register(flow);
}

async fn check_input<T: Submittable>(ctx: FlowContext<SubmissionCtx<T>>) -> ApprovalResult<FlowControl> {
  ctx.with(|c| T::check_input(&c.input))?;
  Ok(FlowControl::Continue)
}

async fn load_owner<T: Submittable>(ctx: FlowContext<SubmissionCtx<T>>) -> ApprovalResult<FlowControl> {
  let (store, user_id) = ctx.with(|c| (c.store.clone(), c.user_id));
  let owner = store
    .find_artisan_by_user(user_id)
    .await?
    .ok_or_else(|| ApprovalError::not_found(EntityKind::Artisan, user_id))?;
  ctx.write().owner = Some(owner);
  Ok(FlowControl::Continue)
}

async fn check_owner_standing<T: Submittable>(ctx: FlowContext<SubmissionCtx<T>>) -> ApprovalResult<FlowControl> {
  let status = ctx.with(|c| c.owner.as_ref().map(|a| a.status()));
  if status == Some(ApprovalStatus::Rejected) {
    warn!(entity = %T::KIND, "Submission from a rejected artisan refused.");
    return Err(ApprovalError::Validation(
      "Rejected artisans cannot submit new content".to_string(),
    ));
  }
  Ok(FlowControl::Continue)
}

async fn insert_record<T: Submittable>(ctx: FlowContext<SubmissionCtx<T>>) -> ApprovalResult<FlowControl> {
  let (store, record) = ctx.with(|c| {
    let artisan_id = c.owner.as_ref().map(|a| a.id);
    (c.store.clone(), artisan_id.map(|id| T::build(c.input.clone(), id, c.now)))
  });
  let Some(record) = record else {
    return Ok(FlowControl::Halt);
  };

  T::insert(store.as_ref(), &record).await?;
  info!(entity = %T::KIND, "Content submitted for review.");
  ctx.write().record = Some(record);
  Ok(FlowControl::Continue)
}
