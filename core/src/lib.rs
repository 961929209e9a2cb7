// src/lib.rs

//! Moderation workflow for an artisan marketplace.
//!
//! Artisans, their products and their blog posts all enter as `pending` and are
//! moved to `approved` or `rejected` by an admin decision:
//!  - Decisions are validated and committed with a compare-and-set on the status.
//!  - An artisan decision cascades onto the artisan's dependent content.
//!  - Approved artisans who edit reviewable profile fields get a sticky
//!    "pending changes" flag that only an admin can clear.
//!
//! Every mutating operation runs as a [`flow::Flow`] registered in a
//! [`flow::FlowRegistry`] owned by the [`ApprovalEngine`]. Persistence goes
//! through the [`store::EntityStore`] port.

pub mod cascade;
pub mod engine;
pub mod error;
pub mod flow;
pub mod model;
pub mod store;
pub mod tracker;
pub mod validator;
pub mod workflows;

pub use crate::cascade::{CascadePlan, CascadeReport};
pub use crate::engine::{ApprovalEngine, ArtisanDecisionOutcome, MAX_SAVE_ATTEMPTS};
pub use crate::error::{ApprovalError, ApprovalResult, EntityKind};
pub use crate::model::*;
pub use crate::store::{EntityStore, MemoryStore, StoreError, StoreResult};
