// core/src/workflows/artisan_decision.rs

//! Artisan moderation: validate, commit the artisan with a guarded transition, then
//! cascade onto its products and blog posts.

use super::ArtisanDecisionCtx;
use crate::cascade;
use crate::error::{ApprovalError, ApprovalResult, EntityKind};
use crate::flow::{skip_when, Flow, FlowContext, FlowControl, FlowRegistry};
use crate::model::ApprovalStatus;
use crate::store::{ArtisanEffect, Transition};
use crate::validator;
use tracing::{event, info, Level};

pub fn register(registry: &FlowRegistry<ApprovalError>) {
  let mut flow = Flow::<ArtisanDecisionCtx, ApprovalError>::new(&[
    ("check_decision", None),
    ("load_artisan", None),
    ("check_transition", None),
    ("commit_decision", None),
    ("plan_cascade", None),
    ("apply_cascade", skip_when(|c: &ArtisanDecisionCtx| c.plan.is_empty())),
  ]);

  flow.on("check_decision", check_decision);
  flow.on("load_artisan", load_artisan);
  flow.on("check_transition", check_transition);
  flow.on("commit_decision", commit_decision);
  flow.after("commit_decision", audit_decision);
  flow.on("plan_cascade", plan_cascade);
  flow.on("apply_cascade", apply_cascade);

  registry.register(flow);
}

async fn check_decision(ctx: FlowContext<ArtisanDecisionCtx>) -> ApprovalResult<FlowControl> {
  ctx.with(|c| validator::check_decision(&c.decision))?;
  Ok(FlowControl::Continue)
}

async fn load_artisan(ctx: FlowContext<ArtisanDecisionCtx>) -> ApprovalResult<FlowControl> {
  let (store, artisan_id) = ctx.with(|c| (c.store.clone(), c.artisan_id));
  let artisan = store
    .find_artisan(artisan_id)
    .await?
    .ok_or_else(|| ApprovalError::not_found(EntityKind::Artisan, artisan_id))?;
  ctx.write().artisan = Some(artisan);
  Ok(FlowControl::Continue)
}

async fn check_transition(ctx: FlowContext<ArtisanDecisionCtx>) -> ApprovalResult<FlowControl> {
  let current = ctx.with(|c| c.artisan.as_ref().map(|a| a.status()).unwrap_or_default());
  validator::check_transition(EntityKind::Artisan, current)?;
  Ok(FlowControl::Continue)
}

async fn commit_decision(ctx: FlowContext<ArtisanDecisionCtx>) -> ApprovalResult<FlowControl> {
  let (store, transition) = ctx.with(|c| {
    let transition = Transition {
      id: c.artisan_id,
      from: ApprovalStatus::Pending,
      review: validator::review_for(&c.decision, c.now),
      effect: ArtisanEffect {
        is_active: c.decision.is_approve(),
      },
      at: c.now,
    };
    (c.store.clone(), transition)
  });

  match store.transition_artisan(&transition).await? {
    Some(committed) => {
      ctx.write().artisan = Some(committed);
      Ok(FlowControl::Continue)
    }
    None => {
      // Another decision landed between the read and the write.
      let current = store
        .find_artisan(transition.id)
        .await?
        .ok_or_else(|| ApprovalError::not_found(EntityKind::Artisan, transition.id))?;
      event!(Level::WARN, artisan_id = %transition.id, status = %current.status(), "Lost decision race.");
      Err(ApprovalError::AlreadyProcessed {
        entity: EntityKind::Artisan,
        status: current.status(),
      })
    }
  }
}

async fn audit_decision(ctx: FlowContext<ArtisanDecisionCtx>) -> ApprovalResult<FlowControl> {
  ctx.with(|c| {
    if let Some(artisan) = &c.artisan {
      info!(
        artisan_id = %artisan.id,
        status = %artisan.status(),
        actor = %c.decision.actor,
        "Artisan decision committed."
      );
    }
  });
  Ok(FlowControl::Continue)
}

async fn plan_cascade(ctx: FlowContext<ArtisanDecisionCtx>) -> ApprovalResult<FlowControl> {
  let (store, artisan) = ctx.with(|c| (c.store.clone(), c.artisan.clone()));
  let Some(artisan) = artisan else {
    return Ok(FlowControl::Halt);
  };

  let products = store.products_by_artisan(artisan.id).await?;
  let blogs = store.blog_posts_by_artisan(artisan.id).await?;
  let mut guard = ctx.write();
  let now = guard.now;
  guard.plan = cascade::resolve(&artisan, &artisan.review, &products, &blogs, now);
  event!(
    Level::DEBUG,
    artisan_id = %artisan.id,
    products = guard.plan.products.len(),
    blogs = guard.plan.blogs.len(),
    "Cascade planned."
  );
  Ok(FlowControl::Continue)
}

async fn apply_cascade(ctx: FlowContext<ArtisanDecisionCtx>) -> ApprovalResult<FlowControl> {
  let (store, plan, artisan_id) = ctx.with(|c| (c.store.clone(), c.plan.clone(), c.artisan_id));

  let report = cascade::apply(store.as_ref(), &plan).await.map_err(|e| {
    event!(Level::ERROR, %artisan_id, error = %e, "Cascade failed after the artisan decision was committed.");
    ApprovalError::from(e)
  })?;

  info!(
    %artisan_id,
    products_affected = report.products_affected,
    blogs_affected = report.blogs_affected,
    "Cascade applied."
  );
  ctx.write().report = report;
  Ok(FlowControl::Continue)
}
