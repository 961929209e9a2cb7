// core/src/workflows/onboarding.rs

use super::OnboardingCtx;
use crate::error::{ApprovalError, ApprovalResult};
use crate::flow::{Flow, FlowContext, FlowControl, FlowRegistry};
use crate::model::Artisan;
use crate::store::StoreError;
use tracing::{event, info, warn, Level};

pub fn register(registry: &FlowRegistry<ApprovalError>) {
  let mut flow = Flow::<OnboardingCtx, ApprovalError>::new(&[
    ("validate_profile", None),
    ("check_existing_application", None),
    ("create_artisan", None),
  ]);

  flow.on("validate_profile", validate_profile);
  flow.on("check_existing_application", check_existing_application);
  flow.on("create_artisan", create_artisan);

  registry.register(flow);
}

async fn validate_profile(ctx: FlowContext<OnboardingCtx>) -> ApprovalResult<FlowControl> {
  let mut guard = ctx.write();
  let profile = &mut guard.profile;
  profile.name = profile.name.trim().to_string();
  profile.business_info.business_name = profile.business_info.business_name.trim().to_string();

  if profile.name.is_empty() {
    return Err(ApprovalError::Validation("name is required".to_string()));
  }
  if profile.business_info.business_name.is_empty() {
    return Err(ApprovalError::Validation("businessInfo.businessName is required".to_string()));
  }
  Ok(FlowControl::Continue)
}

async fn check_existing_application(ctx: FlowContext<OnboardingCtx>) -> ApprovalResult<FlowControl> {
  let (store, user_id) = ctx.with(|c| (c.store.clone(), c.user_id));

  if let Some(existing) = store.find_artisan_by_user(user_id).await? {
    warn!(%user_id, artisan_id = %existing.id, status = %existing.status(), "Duplicate onboarding submission.");
    return Err(ApprovalError::DuplicateApplication);
  }
  Ok(FlowControl::Continue)
}

async fn create_artisan(ctx: FlowContext<OnboardingCtx>) -> ApprovalResult<FlowControl> {
  let (store, artisan) = ctx.with(|c| (c.store.clone(), Artisan::new(c.user_id, c.profile.clone(), c.now)));

  match store.insert_artisan(&artisan).await {
    Ok(()) => {}
    // Lost a race with a concurrent submission for the same user.
    Err(StoreError::Duplicate(what)) => {
      event!(Level::WARN, %what, "Unique user constraint rejected onboarding.");
      return Err(ApprovalError::DuplicateApplication);
    }
    Err(e) => return Err(e.into()),
  }

  info!(artisan_id = %artisan.id, user_id = %artisan.user_id, "Artisan onboarding submitted.");
  ctx.write().artisan = Some(artisan);
  Ok(FlowControl::Continue)
}
