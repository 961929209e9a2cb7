// src/store/pg.rs

//! Postgres adapter for the [`EntityStore`] port.
//!
//! Guarded transitions are single `UPDATE ... WHERE approval_status = $from`
//! statements, so the status check and the write are one atomic step. Bulk
//! transitions run every guarded update of a batch inside one transaction.

use artisan_approval::store::{ArtisanTransition, BlogTransition, ProductTransition};
use artisan_approval::{
  ApprovalStatus, Artisan, ArtisanProfile, BlogPost, EntityStore, ListQuery, Page, PendingChanges, Product,
  PublicationStatus, Review, SortOrder, StoreError, StoreResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{event, instrument, Level};
use uuid::Uuid;

const ARTISAN_COLUMNS: &str = "id, user_id, profile, approval_status, approval_notes, rejection_reason, \
   approved_by, approved_at, is_active, pending_changes, version, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, artisan_id, name, description, price_cents, stock_quantity, category, \
   approval_status, approval_notes, rejection_reason, approved_by, approved_at, is_active, version, \
   created_at, updated_at";

const BLOG_COLUMNS: &str = "id, artisan_id, title, content, tags, approval_status, approval_notes, \
   rejection_reason, approved_by, approved_at, status, published_at, version, created_at, updated_at";

const FLAGGED_FILTER: &str = "(pending_changes->>'hasChanges')::boolean";

fn backend(e: sqlx::Error) -> StoreError {
  StoreError::Backend(anyhow::Error::new(e))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
  matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// The flat column form of a [`Review`].
struct ReviewColumns {
  status: &'static str,
  notes: Option<String>,
  reason: Option<String>,
  reviewed_by: Option<Uuid>,
  reviewed_at: Option<DateTime<Utc>>,
}

impl From<&Review> for ReviewColumns {
  fn from(review: &Review) -> Self {
    Self {
      status: review.status().as_str(),
      notes: review.notes().map(str::to_string),
      reason: review.rejection_reason().map(str::to_string),
      reviewed_by: review.reviewed_by(),
      reviewed_at: review.reviewed_at(),
    }
  }
}

fn review_from_row(
  id: Uuid,
  status: &str,
  notes: Option<String>,
  reason: Option<String>,
  reviewed_by: Option<Uuid>,
  reviewed_at: Option<DateTime<Utc>>,
) -> StoreResult<Review> {
  let status = status
    .parse::<ApprovalStatus>()
    .map_err(|message| StoreError::Corrupt { id, message })?;
  Review::from_columns(status, notes, reason, reviewed_by, reviewed_at).map_err(|message| StoreError::Corrupt { id, message })
}

fn version_of(id: Uuid, raw: i64) -> StoreResult<u64> {
  u64::try_from(raw).map_err(|_| StoreError::Corrupt {
    id,
    message: format!("negative version {}", raw),
  })
}

#[derive(FromRow)]
struct ArtisanRow {
  id: Uuid,
  user_id: Uuid,
  profile: Json<ArtisanProfile>,
  approval_status: String,
  approval_notes: Option<String>,
  rejection_reason: Option<String>,
  approved_by: Option<Uuid>,
  approved_at: Option<DateTime<Utc>>,
  is_active: bool,
  pending_changes: Json<PendingChanges>,
  version: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<ArtisanRow> for Artisan {
  type Error = StoreError;

  fn try_from(row: ArtisanRow) -> StoreResult<Self> {
    Ok(Artisan {
      id: row.id,
      user_id: row.user_id,
      profile: row.profile.0,
      review: review_from_row(
        row.id,
        &row.approval_status,
        row.approval_notes,
        row.rejection_reason,
        row.approved_by,
        row.approved_at,
      )?,
      is_active: row.is_active,
      pending_changes: row.pending_changes.0,
      version: version_of(row.id, row.version)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(FromRow)]
struct ProductRow {
  id: Uuid,
  artisan_id: Uuid,
  name: String,
  description: String,
  price_cents: i64,
  stock_quantity: i32,
  category: Option<String>,
  approval_status: String,
  approval_notes: Option<String>,
  rejection_reason: Option<String>,
  approved_by: Option<Uuid>,
  approved_at: Option<DateTime<Utc>>,
  is_active: bool,
  version: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
  type Error = StoreError;

  fn try_from(row: ProductRow) -> StoreResult<Self> {
    Ok(Product {
      id: row.id,
      artisan_id: row.artisan_id,
      name: row.name,
      description: row.description,
      price_cents: row.price_cents,
      stock_quantity: row.stock_quantity,
      category: row.category,
      review: review_from_row(
        row.id,
        &row.approval_status,
        row.approval_notes,
        row.rejection_reason,
        row.approved_by,
        row.approved_at,
      )?,
      is_active: row.is_active,
      version: version_of(row.id, row.version)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(FromRow)]
struct BlogRow {
  id: Uuid,
  artisan_id: Uuid,
  title: String,
  content: String,
  tags: Vec<String>,
  approval_status: String,
  approval_notes: Option<String>,
  rejection_reason: Option<String>,
  approved_by: Option<Uuid>,
  approved_at: Option<DateTime<Utc>>,
  status: String,
  published_at: Option<DateTime<Utc>>,
  version: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<BlogRow> for BlogPost {
  type Error = StoreError;

  fn try_from(row: BlogRow) -> StoreResult<Self> {
    let status = row
      .status
      .parse::<PublicationStatus>()
      .map_err(|message| StoreError::Corrupt { id: row.id, message })?;
    Ok(BlogPost {
      id: row.id,
      artisan_id: row.artisan_id,
      title: row.title,
      content: row.content,
      tags: row.tags,
      review: review_from_row(
        row.id,
        &row.approval_status,
        row.approval_notes,
        row.rejection_reason,
        row.approved_by,
        row.approved_at,
      )?,
      status,
      published_at: row.published_at,
      version: version_of(row.id, row.version)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

fn collect<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
  T: TryFrom<R, Error = StoreError>,
{
  rows.into_iter().map(T::try_from).collect()
}

fn order_clause(sort: SortOrder) -> &'static str {
  match sort {
    SortOrder::NewestFirst => "ORDER BY created_at DESC, id DESC",
    SortOrder::OldestFirst => "ORDER BY created_at ASC, id ASC",
  }
}

#[derive(Clone)]
pub struct PgEntityStore {
  pool: PgPool,
}

impl PgEntityStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Creates the tables and indexes if they do not exist yet.
  pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../../schema.sql")).execute(&self.pool).await?;
    Ok(())
  }

  /// `extra_filter` is ANDed onto the status filter.
  async fn list<R, T>(
    &self,
    table: &str,
    columns: &str,
    extra_filter: Option<&str>,
    query: &ListQuery,
  ) -> StoreResult<Page<T>>
  where
    R: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    T: TryFrom<R, Error = StoreError>,
  {
    let status = query.status.map(|s| s.as_str());
    let mut filter = String::from("WHERE ($1::text IS NULL OR approval_status = $1)");
    if let Some(extra) = extra_filter {
      filter.push_str(" AND ");
      filter.push_str(extra);
    }

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} {}", table, filter))
      .bind(status)
      .fetch_one(&self.pool)
      .await
      .map_err(backend)?;

    let rows: Vec<R> = sqlx::query_as(&format!(
      "SELECT {} FROM {} {} {} LIMIT $2 OFFSET $3",
      columns,
      table,
      filter,
      order_clause(query.sort)
    ))
    .bind(status)
    .bind(i64::from(query.limit))
    .bind(query.offset() as i64)
    .fetch_all(&self.pool)
    .await
    .map_err(backend)?;

    Ok(Page::new(collect(rows)?, total.max(0) as u64, query))
  }
}

#[async_trait]
impl EntityStore for PgEntityStore {
  #[instrument(skip(self, artisan), fields(artisan_id = %artisan.id, user_id = %artisan.user_id))]
  async fn insert_artisan(&self, artisan: &Artisan) -> StoreResult<()> {
    let review = ReviewColumns::from(&artisan.review);
    let result = sqlx::query(&format!(
      "INSERT INTO artisans ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
      ARTISAN_COLUMNS
    ))
    .bind(artisan.id)
    .bind(artisan.user_id)
    .bind(Json(&artisan.profile))
    .bind(review.status)
    .bind(review.notes)
    .bind(review.reason)
    .bind(review.reviewed_by)
    .bind(review.reviewed_at)
    .bind(artisan.is_active)
    .bind(Json(&artisan.pending_changes))
    .bind(artisan.version as i64)
    .bind(artisan.created_at)
    .bind(artisan.updated_at)
    .execute(&self.pool)
    .await;

    match result {
      Ok(_) => Ok(()),
      Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate(format!("artisan for user {}", artisan.user_id))),
      Err(e) => Err(backend(e)),
    }
  }

  #[instrument(skip(self))]
  async fn find_artisan(&self, id: Uuid) -> StoreResult<Option<Artisan>> {
    let row: Option<ArtisanRow> = sqlx::query_as(&format!("SELECT {} FROM artisans WHERE id = $1", ARTISAN_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.map(Artisan::try_from).transpose()
  }

  #[instrument(skip(self))]
  async fn find_artisan_by_user(&self, user_id: Uuid) -> StoreResult<Option<Artisan>> {
    let row: Option<ArtisanRow> =
      sqlx::query_as(&format!("SELECT {} FROM artisans WHERE user_id = $1", ARTISAN_COLUMNS))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
    row.map(Artisan::try_from).transpose()
  }

  #[instrument(skip(self, artisan), fields(artisan_id = %artisan.id))]
  async fn save_artisan(&self, artisan: &Artisan, expected_version: u64) -> StoreResult<bool> {
    let review = ReviewColumns::from(&artisan.review);
    let result = sqlx::query(
      "UPDATE artisans SET profile = $3, approval_status = $4, approval_notes = $5, rejection_reason = $6, \
       approved_by = $7, approved_at = $8, is_active = $9, pending_changes = $10, version = $11, updated_at = $12 \
       WHERE id = $1 AND version = $2",
    )
    .bind(artisan.id)
    .bind(expected_version as i64)
    .bind(Json(&artisan.profile))
    .bind(review.status)
    .bind(review.notes)
    .bind(review.reason)
    .bind(review.reviewed_by)
    .bind(review.reviewed_at)
    .bind(artisan.is_active)
    .bind(Json(&artisan.pending_changes))
    .bind(artisan.version as i64)
    .bind(artisan.updated_at)
    .execute(&self.pool)
    .await
    .map_err(backend)?;

    Ok(result.rows_affected() == 1)
  }

  #[instrument(skip(self, transition), fields(artisan_id = %transition.id))]
  async fn transition_artisan(&self, transition: &ArtisanTransition) -> StoreResult<Option<Artisan>> {
    let review = ReviewColumns::from(&transition.review);
    let row: Option<ArtisanRow> = sqlx::query_as(&format!(
      "UPDATE artisans SET approval_status = $3, approval_notes = $4, rejection_reason = $5, approved_by = $6, \
       approved_at = $7, is_active = $8, version = version + 1, updated_at = $9 \
       WHERE id = $1 AND approval_status = $2 RETURNING {}",
      ARTISAN_COLUMNS
    ))
    .bind(transition.id)
    .bind(transition.from.as_str())
    .bind(review.status)
    .bind(review.notes)
    .bind(review.reason)
    .bind(review.reviewed_by)
    .bind(review.reviewed_at)
    .bind(transition.effect.is_active)
    .bind(transition.at)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?;
    row.map(Artisan::try_from).transpose()
  }

  #[instrument(skip(self))]
  async fn list_artisans(&self, query: &ListQuery) -> StoreResult<Page<Artisan>> {
    let flagged = query.pending_changes_only.then_some(FLAGGED_FILTER);
    self
      .list::<ArtisanRow, Artisan>("artisans", ARTISAN_COLUMNS, flagged, query)
      .await
  }

  #[instrument(skip(self, product), fields(product_id = %product.id))]
  async fn insert_product(&self, product: &Product) -> StoreResult<()> {
    let review = ReviewColumns::from(&product.review);
    let result = sqlx::query(&format!(
      "INSERT INTO products ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
      PRODUCT_COLUMNS
    ))
    .bind(product.id)
    .bind(product.artisan_id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price_cents)
    .bind(product.stock_quantity)
    .bind(&product.category)
    .bind(review.status)
    .bind(review.notes)
    .bind(review.reason)
    .bind(review.reviewed_by)
    .bind(review.reviewed_at)
    .bind(product.is_active)
    .bind(product.version as i64)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await;

    match result {
      Ok(_) => Ok(()),
      Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate(format!("product {}", product.id))),
      Err(e) => Err(backend(e)),
    }
  }

  #[instrument(skip(self))]
  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.map(Product::try_from).transpose()
  }

  #[instrument(skip(self))]
  async fn products_by_artisan(&self, artisan_id: Uuid) -> StoreResult<Vec<Product>> {
    let rows: Vec<ProductRow> =
      sqlx::query_as(&format!("SELECT {} FROM products WHERE artisan_id = $1", PRODUCT_COLUMNS))
        .bind(artisan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
    collect(rows)
  }

  #[instrument(skip(self, transition), fields(product_id = %transition.id))]
  async fn transition_product(&self, transition: &ProductTransition) -> StoreResult<Option<Product>> {
    let review = ReviewColumns::from(&transition.review);
    let row: Option<ProductRow> = sqlx::query_as(&format!(
      "UPDATE products SET approval_status = $3, approval_notes = $4, rejection_reason = $5, approved_by = $6, \
       approved_at = $7, is_active = $8, version = version + 1, updated_at = $9 \
       WHERE id = $1 AND approval_status = $2 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(transition.id)
    .bind(transition.from.as_str())
    .bind(review.status)
    .bind(review.notes)
    .bind(review.reason)
    .bind(review.reviewed_by)
    .bind(review.reviewed_at)
    .bind(transition.effect.is_active)
    .bind(transition.at)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?;
    row.map(Product::try_from).transpose()
  }

  #[instrument(skip(self, transitions), fields(batch = transitions.len()))]
  async fn transition_products(&self, transitions: &[ProductTransition]) -> StoreResult<u64> {
    let mut tx = self.pool.begin().await.map_err(backend)?;
    let mut affected = 0;
    for t in transitions {
      let review = ReviewColumns::from(&t.review);
      let result = sqlx::query(
        "UPDATE products SET approval_status = $3, approval_notes = $4, rejection_reason = $5, approved_by = $6, \
         approved_at = $7, is_active = $8, version = version + 1, updated_at = $9 \
         WHERE id = $1 AND approval_status = $2",
      )
      .bind(t.id)
      .bind(t.from.as_str())
      .bind(review.status)
      .bind(review.notes)
      .bind(review.reason)
      .bind(review.reviewed_by)
      .bind(review.reviewed_at)
      .bind(t.effect.is_active)
      .bind(t.at)
      .execute(&mut *tx)
      .await
      .map_err(backend)?;
      affected += result.rows_affected();
    }
    tx.commit().await.map_err(backend)?;
    event!(Level::DEBUG, affected, "Product batch committed.");
    Ok(affected)
  }

  #[instrument(skip(self))]
  async fn list_products(&self, query: &ListQuery) -> StoreResult<Page<Product>> {
    self.list::<ProductRow, Product>("products", PRODUCT_COLUMNS, None, query).await
  }

  #[instrument(skip(self, post), fields(blog_id = %post.id))]
  async fn insert_blog_post(&self, post: &BlogPost) -> StoreResult<()> {
    let review = ReviewColumns::from(&post.review);
    let result = sqlx::query(&format!(
      "INSERT INTO blog_posts ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
      BLOG_COLUMNS
    ))
    .bind(post.id)
    .bind(post.artisan_id)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.tags)
    .bind(review.status)
    .bind(review.notes)
    .bind(review.reason)
    .bind(review.reviewed_by)
    .bind(review.reviewed_at)
    .bind(post.status.as_str())
    .bind(post.published_at)
    .bind(post.version as i64)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(&self.pool)
    .await;

    match result {
      Ok(_) => Ok(()),
      Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate(format!("blog post {}", post.id))),
      Err(e) => Err(backend(e)),
    }
  }

  #[instrument(skip(self))]
  async fn find_blog_post(&self, id: Uuid) -> StoreResult<Option<BlogPost>> {
    let row: Option<BlogRow> = sqlx::query_as(&format!("SELECT {} FROM blog_posts WHERE id = $1", BLOG_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.map(BlogPost::try_from).transpose()
  }

  #[instrument(skip(self))]
  async fn blog_posts_by_artisan(&self, artisan_id: Uuid) -> StoreResult<Vec<BlogPost>> {
    let rows: Vec<BlogRow> =
      sqlx::query_as(&format!("SELECT {} FROM blog_posts WHERE artisan_id = $1", BLOG_COLUMNS))
        .bind(artisan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
    collect(rows)
  }

  #[instrument(skip(self, transition), fields(blog_id = %transition.id))]
  async fn transition_blog_post(&self, transition: &BlogTransition) -> StoreResult<Option<BlogPost>> {
    let review = ReviewColumns::from(&transition.review);
    let row: Option<BlogRow> = sqlx::query_as(&format!(
      "UPDATE blog_posts SET approval_status = $3, approval_notes = $4, rejection_reason = $5, approved_by = $6, \
       approved_at = $7, status = $8, published_at = $9, version = version + 1, updated_at = $10 \
       WHERE id = $1 AND approval_status = $2 RETURNING {}",
      BLOG_COLUMNS
    ))
    .bind(transition.id)
    .bind(transition.from.as_str())
    .bind(review.status)
    .bind(review.notes)
    .bind(review.reason)
    .bind(review.reviewed_by)
    .bind(review.reviewed_at)
    .bind(transition.effect.status().as_str())
    .bind(transition.effect.published_at())
    .bind(transition.at)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?;
    row.map(BlogPost::try_from).transpose()
  }

  #[instrument(skip(self, transitions), fields(batch = transitions.len()))]
  async fn transition_blog_posts(&self, transitions: &[BlogTransition]) -> StoreResult<u64> {
    let mut tx = self.pool.begin().await.map_err(backend)?;
    let mut affected = 0;
    for t in transitions {
      let review = ReviewColumns::from(&t.review);
      let result = sqlx::query(
        "UPDATE blog_posts SET approval_status = $3, approval_notes = $4, rejection_reason = $5, approved_by = $6, \
         approved_at = $7, status = $8, published_at = $9, version = version + 1, updated_at = $10 \
         WHERE id = $1 AND approval_status = $2",
      )
      .bind(t.id)
      .bind(t.from.as_str())
      .bind(review.status)
      .bind(review.notes)
      .bind(review.reason)
      .bind(review.reviewed_by)
      .bind(review.reviewed_at)
      .bind(t.effect.status().as_str())
      .bind(t.effect.published_at())
      .bind(t.at)
      .execute(&mut *tx)
      .await
      .map_err(backend)?;
      affected += result.rows_affected();
    }
    tx.commit().await.map_err(backend)?;
    event!(Level::DEBUG, affected, "Blog post batch committed.");
    Ok(affected)
  }

  #[instrument(skip(self))]
  async fn list_blog_posts(&self, query: &ListQuery) -> StoreResult<Page<BlogPost>> {
    self.list::<BlogRow, BlogPost>("blog_posts", BLOG_COLUMNS, None, query).await
  }
}
