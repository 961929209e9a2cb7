// core/src/store/mod.rs

//! Persistence port for the approval workflow.
//!
//! Adapters must make every `transition_*` call a compare-and-set on the record's
//! approval status: the write happens only if the stored status still equals
//! `Transition::from`. Bulk transitions apply each record under that same guard and
//! commit a whole batch at once.

pub mod memory;

pub use memory::MemoryStore;

use crate::model::{Artisan, BlogEffect, BlogPost, ListQuery, Page, Product, ProductEffect, Review, ApprovalStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Duplicate record: {0}")]
  Duplicate(String),

  #[error("Gave up on {id} after repeated concurrent modifications")]
  Conflict { id: Uuid },

  #[error("Corrupt record {id}: {message}")]
  Corrupt { id: Uuid, message: String },

  #[error(transparent)]
  Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A guarded review change for one record, plus the field effect that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<E> {
  pub id: Uuid,
  pub from: ApprovalStatus,
  pub review: Review,
  pub effect: E,
  pub at: DateTime<Utc>,
}

/// Activation that travels with an artisan review change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtisanEffect {
  pub is_active: bool,
}

pub type ArtisanTransition = Transition<ArtisanEffect>;
pub type ProductTransition = Transition<ProductEffect>;
pub type BlogTransition = Transition<BlogEffect>;

#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
  /// Fails with [`StoreError::Duplicate`] if the user already owns an artisan record.
  async fn insert_artisan(&self, artisan: &Artisan) -> StoreResult<()>;
  async fn find_artisan(&self, id: Uuid) -> StoreResult<Option<Artisan>>;
  async fn find_artisan_by_user(&self, user_id: Uuid) -> StoreResult<Option<Artisan>>;
  /// Overwrites the artisan if its stored version is still `expected_version`.
  /// Returns `false` when someone else wrote first.
  async fn save_artisan(&self, artisan: &Artisan, expected_version: u64) -> StoreResult<bool>;
  /// `None` when the record is missing or no longer in `from`.
  async fn transition_artisan(&self, transition: &ArtisanTransition) -> StoreResult<Option<Artisan>>;
  async fn list_artisans(&self, query: &ListQuery) -> StoreResult<Page<Artisan>>;

  async fn insert_product(&self, product: &Product) -> StoreResult<()>;
  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>>;
  async fn products_by_artisan(&self, artisan_id: Uuid) -> StoreResult<Vec<Product>>;
  async fn transition_product(&self, transition: &ProductTransition) -> StoreResult<Option<Product>>;
  /// Returns how many records were actually written.
  async fn transition_products(&self, transitions: &[ProductTransition]) -> StoreResult<u64>;
  async fn list_products(&self, query: &ListQuery) -> StoreResult<Page<Product>>;

  async fn insert_blog_post(&self, post: &BlogPost) -> StoreResult<()>;
  async fn find_blog_post(&self, id: Uuid) -> StoreResult<Option<BlogPost>>;
  async fn blog_posts_by_artisan(&self, artisan_id: Uuid) -> StoreResult<Vec<BlogPost>>;
  async fn transition_blog_post(&self, transition: &BlogTransition) -> StoreResult<Option<BlogPost>>;
  async fn transition_blog_posts(&self, transitions: &[BlogTransition]) -> StoreResult<u64>;
  async fn list_blog_posts(&self, query: &ListQuery) -> StoreResult<Page<BlogPost>>;
}
