// core/src/store/memory.rs

use super::{
  ArtisanTransition, BlogTransition, EntityStore, ProductTransition, StoreError, StoreResult, Transition,
};
use crate::model::{ApprovalStatus, Artisan, BlogPost, ListQuery, Page, Product, Review, SortOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{event, Level};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  artisans: HashMap<Uuid, Artisan>,
  products: HashMap<Uuid, Product>,
  blog_posts: HashMap<Uuid, BlogPost>,
}

/// In-process [`EntityStore`]. One lock covers all collections, so each guarded
/// transition and each bulk batch is atomic.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

/// Common shape of the moderated records, for the generic helpers below.
trait Moderated: Clone {
  fn review_mut(&mut self) -> &mut Review;
  fn review(&self) -> &Review;
  fn created_at(&self) -> DateTime<Utc>;
  fn id(&self) -> Uuid;
  fn stamp(&mut self, at: DateTime<Utc>);
}

macro_rules! moderated {
  ($ty:ty) => {
    impl Moderated for $ty {
      fn review_mut(&mut self) -> &mut Review {
        &mut self.review
      }
      fn review(&self) -> &Review {
        &self.review
      }
      fn created_at(&self) -> DateTime<Utc> {
        self.created_at
      }
      fn id(&self) -> Uuid {
        self.id
      }
      fn stamp(&mut self, at: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = at;
      }
    }
  };
}

moderated!(Artisan);
moderated!(Product);
moderated!(BlogPost);

fn guarded<T: Moderated, E: Copy>(
  table: &mut HashMap<Uuid, T>,
  transition: &Transition<E>,
  apply: impl FnOnce(&mut T, E),
) -> Option<T> {
  let record = table.get_mut(&transition.id)?;
  if record.review().status() != transition.from {
    return None;
  }
  *record.review_mut() = transition.review.clone();
  apply(record, transition.effect);
  record.stamp(transition.at);
  Some(record.clone())
}

fn page_of<'a, T: Moderated + 'a>(
  records: impl Iterator<Item = &'a T>,
  status: Option<ApprovalStatus>,
  query: &ListQuery,
) -> Page<T> {
  let mut matching: Vec<&T> = records
    .filter(|r| status.map_or(true, |s| r.review().status() == s))
    .collect();
  matching.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(&b.id())));
  if query.sort == SortOrder::NewestFirst {
    matching.reverse();
  }
  let total = matching.len() as u64;
  let items = matching
    .into_iter()
    .skip(query.offset())
    .take(query.limit as usize)
    .cloned()
    .collect();
  Page::new(items, total, query)
}

#[async_trait]
impl EntityStore for MemoryStore {
  async fn insert_artisan(&self, artisan: &Artisan) -> StoreResult<()> {
    let mut tables = self.tables.write();
    if tables.artisans.values().any(|a| a.user_id == artisan.user_id) {
      return Err(StoreError::Duplicate(format!("artisan for user {}", artisan.user_id)));
    }
    tables.artisans.insert(artisan.id, artisan.clone());
    Ok(())
  }

  async fn find_artisan(&self, id: Uuid) -> StoreResult<Option<Artisan>> {
    Ok(self.tables.read().artisans.get(&id).cloned())
  }

  async fn find_artisan_by_user(&self, user_id: Uuid) -> StoreResult<Option<Artisan>> {
    Ok(self.tables.read().artisans.values().find(|a| a.user_id == user_id).cloned())
  }

  async fn save_artisan(&self, artisan: &Artisan, expected_version: u64) -> StoreResult<bool> {
    let mut tables = self.tables.write();
    match tables.artisans.get_mut(&artisan.id) {
      Some(stored) if stored.version == expected_version => {
        *stored = artisan.clone();
        Ok(true)
      }
      Some(stored) => {
        event!(Level::DEBUG, artisan_id = %artisan.id, expected_version, found = stored.version, "Version conflict on save.");
        Ok(false)
      }
      None => Ok(false),
    }
  }

  async fn transition_artisan(&self, transition: &ArtisanTransition) -> StoreResult<Option<Artisan>> {
    let mut tables = self.tables.write();
    Ok(guarded(&mut tables.artisans, transition, |a, effect| a.is_active = effect.is_active))
  }

  async fn list_artisans(&self, query: &ListQuery) -> StoreResult<Page<Artisan>> {
    let tables = self.tables.read();
    let flagged = query.pending_changes_only;
    let records = tables
      .artisans
      .values()
      .filter(|a| !flagged || a.pending_changes.has_changes);
    Ok(page_of(records, query.status, query))
  }

  async fn insert_product(&self, product: &Product) -> StoreResult<()> {
    let mut tables = self.tables.write();
    if tables.products.contains_key(&product.id) {
      return Err(StoreError::Duplicate(format!("product {}", product.id)));
    }
    tables.products.insert(product.id, product.clone());
    Ok(())
  }

  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    Ok(self.tables.read().products.get(&id).cloned())
  }

  async fn products_by_artisan(&self, artisan_id: Uuid) -> StoreResult<Vec<Product>> {
    let tables = self.tables.read();
    Ok(tables.products.values().filter(|p| p.artisan_id == artisan_id).cloned().collect())
  }

  async fn transition_product(&self, transition: &ProductTransition) -> StoreResult<Option<Product>> {
    let mut tables = self.tables.write();
    Ok(guarded(&mut tables.products, transition, |p, effect| p.is_active = effect.is_active))
  }

  async fn transition_products(&self, transitions: &[ProductTransition]) -> StoreResult<u64> {
    let mut tables = self.tables.write();
    let applied = transitions
      .iter()
      .filter_map(|t| guarded(&mut tables.products, t, |p, effect| p.is_active = effect.is_active))
      .count();
    Ok(applied as u64)
  }

  async fn list_products(&self, query: &ListQuery) -> StoreResult<Page<Product>> {
    let tables = self.tables.read();
    Ok(page_of(tables.products.values(), query.status, query))
  }

  async fn insert_blog_post(&self, post: &BlogPost) -> StoreResult<()> {
    let mut tables = self.tables.write();
    if tables.blog_posts.contains_key(&post.id) {
      return Err(StoreError::Duplicate(format!("blog post {}", post.id)));
    }
    tables.blog_posts.insert(post.id, post.clone());
    Ok(())
  }

  async fn find_blog_post(&self, id: Uuid) -> StoreResult<Option<BlogPost>> {
    Ok(self.tables.read().blog_posts.get(&id).cloned())
  }

  async fn blog_posts_by_artisan(&self, artisan_id: Uuid) -> StoreResult<Vec<BlogPost>> {
    let tables = self.tables.read();
    Ok(tables.blog_posts.values().filter(|b| b.artisan_id == artisan_id).cloned().collect())
  }

  async fn transition_blog_post(&self, transition: &BlogTransition) -> StoreResult<Option<BlogPost>> {
    let mut tables = self.tables.write();
    Ok(guarded(&mut tables.blog_posts, transition, BlogPost::apply_effect))
  }

  async fn transition_blog_posts(&self, transitions: &[BlogTransition]) -> StoreResult<u64> {
    let mut tables = self.tables.write();
    let applied = transitions
      .iter()
      .filter_map(|t| guarded(&mut tables.blog_posts, t, BlogPost::apply_effect))
      .count();
    Ok(applied as u64)
  }

  async fn list_blog_posts(&self, query: &ListQuery) -> StoreResult<Page<BlogPost>> {
    let tables = self.tables.read();
    Ok(page_of(tables.blog_posts.values(), query.status, query))
  }
}
