// core/src/engine.rs

//! The approval workflow engine: the public face of the crate.

use crate::cascade::{CascadePlan, CascadeReport};
use crate::error::{ApprovalError, ApprovalResult, EntityKind};
use crate::flow::{FlowContext, FlowError, FlowOutcome, FlowRegistry};
use crate::model::{
  Artisan, ArtisanProfile, BlogPost, Decision, ListQuery, NewBlogPost, NewProduct, OnboardingStatus, Page, Product,
  ProfileUpdate, MAX_PAGE_SIZE,
};
use crate::store::{EntityStore, StoreError};
use crate::workflows::{
  self, ArtisanDecisionCtx, ContentDecisionCtx, Moderatable, OnboardingCtx, ProfileAction, ProfileCtx,
  SubmissionCtx, Submittable,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

/// How many times a version-guarded profile save is retried before giving up.
pub const MAX_SAVE_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanDecisionOutcome {
  pub artisan: Artisan,
  pub cascade: CascadeReport,
}

pub struct ApprovalEngine {
  store: Arc<dyn EntityStore>,
  flows: FlowRegistry<ApprovalError>,
  max_page_size: u32,
}

impl ApprovalEngine {
  pub fn new(store: Arc<dyn EntityStore>) -> Self {
    let flows = FlowRegistry::new();
    workflows::register_all(&flows);
    Self {
      store,
      flows,
      max_page_size: MAX_PAGE_SIZE,
    }
  }

  pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
    self.max_page_size = max_page_size.max(1);
    self
  }

  pub fn store(&self) -> &Arc<dyn EntityStore> {
    &self.store
  }

  async fn run<T: Send + Sync + 'static>(&self, data: T) -> ApprovalResult<(FlowOutcome, T)> {
    let ctx = FlowContext::new(data);
    let outcome = self.flows.run(ctx.clone()).await?;
    // Handlers only hold clones while running; the run is over, so this is the last one.
    let data = ctx.into_inner().ok_or_else(FlowError::missing_output::<T>)?;
    Ok((outcome, data))
  }

  #[instrument(skip(self, profile), err(Display))]
  pub async fn submit_onboarding(&self, user_id: Uuid, profile: ArtisanProfile) -> ApprovalResult<Artisan> {
    let (_, ctx) = self
      .run(OnboardingCtx {
        store: self.store.clone(),
        user_id,
        profile,
        now: Utc::now(),
        artisan: None,
      })
      .await?;
    ctx.artisan.ok_or_else(|| FlowError::missing_output::<OnboardingCtx>().into())
  }

  #[instrument(skip(self), err(Display))]
  pub async fn onboarding_status(&self, user_id: Uuid) -> ApprovalResult<OnboardingStatus> {
    let artisan = self.store.find_artisan_by_user(user_id).await?;
    Ok(OnboardingStatus::of(artisan))
  }

  #[instrument(skip(self), err(Display))]
  pub async fn artisan_for_user(&self, user_id: Uuid) -> ApprovalResult<Artisan> {
    self
      .store
      .find_artisan_by_user(user_id)
      .await?
      .ok_or_else(|| ApprovalError::not_found(EntityKind::Artisan, user_id))
  }

  #[instrument(skip(self), err(Display))]
  pub async fn get_artisan(&self, artisan_id: Uuid) -> ApprovalResult<Artisan> {
    self
      .store
      .find_artisan(artisan_id)
      .await?
      .ok_or_else(|| ApprovalError::not_found(EntityKind::Artisan, artisan_id))
  }

  /// Decides a pending artisan and cascades onto its content.
  ///
  /// The artisan commit happens first and is never undone. A store failure during the
  /// cascade is returned as an error even though the artisan decision stands.
  #[instrument(skip(self, decision), fields(actor = %decision.actor, approve = decision.is_approve()), err(Display))]
  pub async fn decide_artisan(&self, artisan_id: Uuid, decision: Decision) -> ApprovalResult<ArtisanDecisionOutcome> {
    let (_, ctx) = self
      .run(ArtisanDecisionCtx {
        store: self.store.clone(),
        artisan_id,
        decision,
        now: Utc::now(),
        artisan: None,
        plan: CascadePlan::default(),
        report: CascadeReport::default(),
      })
      .await?;
    let artisan = ctx
      .artisan
      .ok_or_else(FlowError::missing_output::<ArtisanDecisionCtx>)?;
    Ok(ArtisanDecisionOutcome {
      artisan,
      cascade: ctx.report,
    })
  }

  async fn decide_content<T: Moderatable>(&self, id: Uuid, decision: Decision) -> ApprovalResult<T> {
    let (_, ctx) = self
      .run(ContentDecisionCtx::<T>::new(self.store.clone(), id, decision))
      .await?;
    ctx.record.ok_or_else(|| FlowError::missing_output::<ContentDecisionCtx<T>>().into())
  }

  #[instrument(skip(self, decision), fields(actor = %decision.actor, approve = decision.is_approve()), err(Display))]
  pub async fn decide_product(&self, product_id: Uuid, decision: Decision) -> ApprovalResult<Product> {
    self.decide_content(product_id, decision).await
  }

  /// Approval publishes the post; rejection sends it back to draft.
  #[instrument(skip(self, decision), fields(actor = %decision.actor, approve = decision.is_approve()), err(Display))]
  pub async fn decide_blog_post(&self, blog_id: Uuid, decision: Decision) -> ApprovalResult<BlogPost> {
    self.decide_content(blog_id, decision).await
  }

  async fn run_profile(&self, artisan_id: Uuid, action: impl Fn() -> ProfileAction) -> ApprovalResult<Artisan> {
    for attempt in 1..=MAX_SAVE_ATTEMPTS {
      let (outcome, ctx) = self
        .run(ProfileCtx::new(self.store.clone(), artisan_id, action()))
        .await?;
      match (outcome, ctx.artisan) {
        (FlowOutcome::Halted, _) if ctx.conflict => {
          warn!(%artisan_id, attempt, "Profile save conflicted, retrying.");
        }
        (_, Some(artisan)) => return Ok(artisan),
        (_, None) => return Err(FlowError::missing_output::<ProfileCtx>().into()),
      }
    }
    Err(StoreError::Conflict { id: artisan_id }.into())
  }

  /// Applies a self-service profile edit. Reviewable edits by an approved artisan
  /// raise the change flag; the artisan stays approved and live.
  #[instrument(skip(self, update), err(Display))]
  pub async fn update_artisan_profile(&self, artisan_id: Uuid, update: ProfileUpdate) -> ApprovalResult<Artisan> {
    self
      .run_profile(artisan_id, || ProfileAction::Update(update.clone()))
      .await
  }

  #[instrument(skip(self), err(Display))]
  pub async fn clear_change_notification(&self, artisan_id: Uuid, admin: Uuid) -> ApprovalResult<Artisan> {
    self
      .run_profile(artisan_id, || ProfileAction::ClearChanges { admin })
      .await
  }

  async fn submit<T: Submittable>(&self, user_id: Uuid, input: T::Input) -> ApprovalResult<T> {
    let (_, ctx) = self
      .run(SubmissionCtx::<T>::new(self.store.clone(), user_id, input))
      .await?;
    ctx.record.ok_or_else(|| FlowError::missing_output::<SubmissionCtx<T>>().into())
  }

  #[instrument(skip(self, input), err(Display))]
  pub async fn submit_product(&self, user_id: Uuid, input: NewProduct) -> ApprovalResult<Product> {
    self.submit(user_id, input).await
  }

  #[instrument(skip(self, input), err(Display))]
  pub async fn submit_blog_post(&self, user_id: Uuid, input: NewBlogPost) -> ApprovalResult<BlogPost> {
    self.submit(user_id, input).await
  }

  #[instrument(skip(self), err(Display))]
  pub async fn list_artisans(&self, query: ListQuery) -> ApprovalResult<Page<Artisan>> {
    let query = query.normalized(self.max_page_size);
    Ok(self.store.list_artisans(&query).await?)
  }

  #[instrument(skip(self), err(Display))]
  pub async fn list_products(&self, query: ListQuery) -> ApprovalResult<Page<Product>> {
    let query = query.normalized(self.max_page_size);
    Ok(self.store.list_products(&query).await?)
  }

  #[instrument(skip(self), err(Display))]
  pub async fn list_blog_posts(&self, query: ListQuery) -> ApprovalResult<Page<BlogPost>> {
    let query = query.normalized(self.max_page_size);
    Ok(self.store.list_blog_posts(&query).await?)
  }
}
