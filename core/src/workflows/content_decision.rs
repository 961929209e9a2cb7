// core/src/workflows/content_decision.rs

//! Direct moderation of a single product or blog post. Never cascades.

use crate::error::{ApprovalError, ApprovalResult, EntityKind};
use crate::flow::{Flow, FlowContext, FlowControl, FlowRegistry};
use crate::model::{ApprovalStatus, BlogEffect, BlogPost, Decision, Product, ProductEffect};
use crate::store::{EntityStore, StoreResult, Transition};
use crate::validator;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{event, info, Level};
use uuid::Uuid;

/// A record that can be decided on its own.
#[async_trait]
pub trait Moderatable: Clone + Send + Sync + 'static {
  type Effect: Copy + Send + Sync + 'static;

  const KIND: EntityKind;

  fn id(&self) -> Uuid;
  fn approval_status(&self) -> ApprovalStatus;
  /// Field changes that accompany `decision`.
  fn effect_for(decision: &Decision, now: DateTime<Utc>) -> Self::Effect;

  async fn find(store: &dyn EntityStore, id: Uuid) -> StoreResult<Option<Self>>;
  async fn transition(store: &dyn EntityStore, transition: &Transition<Self::Effect>) -> StoreResult<Option<Self>>;
}

#[async_trait]
impl Moderatable for Product {
  type Effect = ProductEffect;

  const KIND: EntityKind = EntityKind::Product;

  fn id(&self) -> Uuid {
    self.id
  }

  fn approval_status(&self) -> ApprovalStatus {
    self.status()
  }

  fn effect_for(decision: &Decision, _now: DateTime<Utc>) -> ProductEffect {
    ProductEffect {
      is_active: decision.is_approve(),
    }
  }

  async fn find(store: &dyn EntityStore, id: Uuid) -> StoreResult<Option<Self>> {
    store.find_product(id).await
  }

  async fn transition(store: &dyn EntityStore, transition: &Transition<ProductEffect>) -> StoreResult<Option<Self>> {
    store.transition_product(transition).await
  }
}

#[async_trait]
impl Moderatable for BlogPost {
  type Effect = BlogEffect;

  const KIND: EntityKind = EntityKind::BlogPost;

  fn id(&self) -> Uuid {
    self.id
  }

  fn approval_status(&self) -> ApprovalStatus {
    self.review.status()
  }

  fn effect_for(decision: &Decision, now: DateTime<Utc>) -> BlogEffect {
    if decision.is_approve() {
      BlogEffect::Publish { at: now }
    } else {
      BlogEffect::Unpublish
    }
  }

  async fn find(store: &dyn EntityStore, id: Uuid) -> StoreResult<Option<Self>> {
    store.find_blog_post(id).await
  }

  async fn transition(store: &dyn EntityStore, transition: &Transition<BlogEffect>) -> StoreResult<Option<Self>> {
    store.transition_blog_post(transition).await
  }
}

pub struct ContentDecisionCtx<T: Moderatable> {
  pub store: Arc<dyn EntityStore>,
  pub id: Uuid,
  pub decision: Decision,
  pub now: DateTime<Utc>,
  pub record: Option<T>,
}

impl<T: Moderatable> ContentDecisionCtx<T> {
  pub fn new(store: Arc<dyn EntityStore>, id: Uuid, decision: Decision) -> Self {
    Self {
      store,
      id,
      decision,
      now: Utc::now(),
      record: None,
    }
  }
}

pub fn register<T: Moderatable>(registry: &FlowRegistry<ApprovalError>) {
  let mut flow = Flow::<ContentDecisionCtx<T>, ApprovalError>::new(&[
    ("check_decision", None),
    ("load_record", None),
    ("check_transition", None),
    ("commit_decision", None),
  ]);

  flow.on("check_decision", check_decision::<T>);
  flow.on("load_record", load_record::<T>);
  flow.on("check_transition", check_transition::<T>);
  flow.on("commit_decision", commit_decision::<T>);

  registry.register(flow);
}

async fn check_decision<T: Moderatable>(ctx: FlowContext<ContentDecisionCtx<T>>) -> ApprovalResult<FlowControl> {
  ctx.with(|c| validator::check_decision(&c.decision))?;
  Ok(FlowControl::Continue)
}

async fn load_record<T: Moderatable>(ctx: FlowContext<ContentDecisionCtx<T>>) -> ApprovalResult<FlowControl> {
  let (store, id) = ctx.with(|c| (c.store.clone(), c.id));
  let record = T::find(store.as_ref(), id)
    .await?
    .ok_or_else(|| ApprovalError::not_found(T::KIND, id))?;
  ctx.write().record = Some(record);
  Ok(FlowControl::Continue)
}

async fn check_transition<T: Moderatable>(ctx: FlowContext<ContentDecisionCtx<T>>) -> ApprovalResult<FlowControl> {
  let current = ctx.with(|c| c.record.as_ref().map(|r| r.approval_status()).unwrap_or_default());
  validator::check_transition(T::KIND, current)?;
  Ok(FlowControl::Continue)
}

async fn commit_decision<T: Moderatable>(ctx: FlowContext<ContentDecisionCtx<T>>) -> ApprovalResult<FlowControl> {
  let (store, transition, actor) = ctx.with(|c| {
    let transition = Transition {
      id: c.id,
      from: ApprovalStatus::Pending,
      review: validator::review_for(&c.decision, c.now),
      effect: T::effect_for(&c.decision, c.now),
      at: c.now,
    };
    (c.store.clone(), transition, c.decision.actor)
  });

  match T::transition(store.as_ref(), &transition).await? {
    Some(committed) => {
      info!(
        entity = %T::KIND,
        id = %committed.id(),
        status = %committed.approval_status(),
        %actor,
        "Decision committed."
      );
      ctx.write().record = Some(committed);
      Ok(FlowControl::Continue)
    }
    None => {
      let current = T::find(store.as_ref(), transition.id)
        .await?
        .ok_or_else(|| ApprovalError::not_found(T::KIND, transition.id))?;
      event!(Level::WARN, entity = %T::KIND, id = %transition.id, "Lost decision race.");
      Err(ApprovalError::AlreadyProcessed {
        entity: T::KIND,
        status: current.approval_status(),
      })
    }
  }
}
