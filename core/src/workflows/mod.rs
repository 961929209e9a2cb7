// core/src/workflows/mod.rs

//! Every mutating engine operation as a registered flow.
//!
//! The engine builds one of the `*Ctx` structs, runs the flow registered for it and
//! reads the result back out of the context.

use crate::cascade::{CascadePlan, CascadeReport};
use crate::error::ApprovalError;
use crate::flow::FlowRegistry;
use crate::model::{Artisan, ArtisanProfile, Decision, FieldChange, ProfileUpdate};
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub mod artisan_decision;
pub mod content_decision;
pub mod onboarding;
pub mod profile;
pub mod submission;

pub use content_decision::{ContentDecisionCtx, Moderatable};
pub use submission::{Submittable, SubmissionCtx};

pub struct OnboardingCtx {
  pub store: Arc<dyn EntityStore>,
  pub user_id: Uuid,
  pub profile: ArtisanProfile,
  pub now: DateTime<Utc>,
  pub artisan: Option<Artisan>,
}

pub struct ArtisanDecisionCtx {
  pub store: Arc<dyn EntityStore>,
  pub artisan_id: Uuid,
  pub decision: Decision,
  pub now: DateTime<Utc>,
  pub artisan: Option<Artisan>,
  pub plan: CascadePlan,
  pub report: CascadeReport,
}

/// Shared by profile edits and change-flag clears; both end in a version-guarded save.
pub struct ProfileCtx {
  pub store: Arc<dyn EntityStore>,
  pub artisan_id: Uuid,
  pub action: ProfileAction,
  pub now: DateTime<Utc>,
  pub loaded_version: u64,
  pub artisan: Option<Artisan>,
  pub changes: Vec<FieldChange>,
  pub dirty: bool,
  pub conflict: bool,
}

impl ProfileCtx {
  pub fn new(store: Arc<dyn EntityStore>, artisan_id: Uuid, action: ProfileAction) -> Self {
    Self {
      store,
      artisan_id,
      action,
      now: Utc::now(),
      loaded_version: 0,
      artisan: None,
      changes: Vec::new(),
      dirty: false,
      conflict: false,
    }
  }
}

pub enum ProfileAction {
  Update(ProfileUpdate),
  ClearChanges { admin: Uuid },
}

/// Registers every workflow flow with `registry`.
pub fn register_all(registry: &FlowRegistry<ApprovalError>) {
  onboarding::register(registry);
  artisan_decision::register(registry);
  content_decision::register::<crate::model::Product>(registry);
  content_decision::register::<crate::model::BlogPost>(registry);
  profile::register(registry);
  submission::register::<crate::model::Product>(registry);
  submission::register::<crate::model::BlogPost>(registry);
  tracing::debug!("Approval workflows registered.");
}
