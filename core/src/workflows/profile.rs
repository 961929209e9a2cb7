// core/src/workflows/profile.rs

//! Artisan self-service edits and the admin clear of the change flag.
//!
//! Both end in a save guarded by the version read at the start. On a version
//! conflict the flow halts with `conflict` set and the engine reruns it from a
//! fresh read.

use super::{ProfileAction, ProfileCtx};
use crate::error::{ApprovalError, ApprovalResult, EntityKind};
use crate::flow::{skip_when, Flow, FlowContext, FlowControl, FlowRegistry};
use crate::model::{ApprovalStatus, ProfileUpdate};
use crate::tracker;
use tracing::{event, info, Level};

pub fn register(registry: &FlowRegistry<ApprovalError>) {
  let mut flow = Flow::<ProfileCtx, ApprovalError>::new(&[
    ("load_artisan", None),
    ("apply_action", None),
    (
      "track_changes",
      skip_when(|c: &ProfileCtx| {
        c.changes.is_empty()
          || c.artisan.as_ref().map(|a| a.status()) != Some(ApprovalStatus::Approved)
      }),
    ),
    ("save_artisan", skip_when(|c: &ProfileCtx| !c.dirty)),
  ]);

  flow.on("load_artisan", load_artisan);
  flow.on("apply_action", apply_action);
  flow.on("track_changes", track_changes);
  flow.on("save_artisan", save_artisan);

  registry.register(flow);
}

fn check_required(update: &ProfileUpdate) -> ApprovalResult<()> {
  if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApprovalError::Validation("name cannot be empty".to_string()));
  }
  let business_name = update.business_info.as_ref().and_then(|b| b.business_name.as_deref());
  if business_name.is_some_and(|n| n.trim().is_empty()) {
    return Err(ApprovalError::Validation("businessInfo.businessName cannot be empty".to_string()));
  }
  Ok(())
}

async fn load_artisan(ctx: FlowContext<ProfileCtx>) -> ApprovalResult<FlowControl> {
  let (store, artisan_id) = ctx.with(|c| (c.store.clone(), c.artisan_id));
  let artisan = store
    .find_artisan(artisan_id)
    .await?
    .ok_or_else(|| ApprovalError::not_found(EntityKind::Artisan, artisan_id))?;

  let mut guard = ctx.write();
  guard.loaded_version = artisan.version;
  guard.artisan = Some(artisan);
  Ok(FlowControl::Continue)
}

async fn apply_action(ctx: FlowContext<ProfileCtx>) -> ApprovalResult<FlowControl> {
  let mut guard = ctx.write();
  let ProfileCtx {
    action, artisan, now, ..
  } = &mut *guard;
  let Some(artisan) = artisan.as_mut() else {
    return Ok(FlowControl::Halt);
  };

  let (changes, dirty) = match action {
    ProfileAction::Update(update) => {
      check_required(update)?;
      let changes = update.apply_to(&mut artisan.profile);
      let dirty = !changes.is_empty();
      (changes, dirty)
    }
    ProfileAction::ClearChanges { admin } => {
      tracker::clear(&mut artisan.pending_changes, *admin, *now)?;
      info!(artisan_id = %artisan.id, admin = %admin, "Change notification cleared.");
      (Vec::new(), true)
    }
  };

  if dirty {
    artisan.touch(*now);
  }
  guard.changes = changes;
  guard.dirty = dirty;
  Ok(FlowControl::Continue)
}

async fn track_changes(ctx: FlowContext<ProfileCtx>) -> ApprovalResult<FlowControl> {
  let mut guard = ctx.write();
  let ProfileCtx {
    artisan, changes, now, ..
  } = &mut *guard;
  if let Some(artisan) = artisan.as_mut() {
    if tracker::record(&mut artisan.pending_changes, changes, *now) {
      info!(
        artisan_id = %artisan.id,
        changed_fields = ?artisan.pending_changes.changed_fields,
        "Approved artisan edited reviewable fields."
      );
    }
  }
  Ok(FlowControl::Continue)
}

async fn save_artisan(ctx: FlowContext<ProfileCtx>) -> ApprovalResult<FlowControl> {
  let (store, artisan, expected) = ctx.with(|c| (c.store.clone(), c.artisan.clone(), c.loaded_version));
  let Some(artisan) = artisan else {
    return Ok(FlowControl::Halt);
  };

  if store.save_artisan(&artisan, expected).await? {
    Ok(FlowControl::Continue)
  } else {
    event!(Level::DEBUG, artisan_id = %artisan.id, expected, "Concurrent write detected, retrying.");
    ctx.write().conflict = true;
    Ok(FlowControl::Halt)
  }
}
