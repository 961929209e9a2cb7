// core/src/model/product.rs

use super::review::{ApprovalStatus, Review};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A listing. Only approved products may be active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub artisan_id: Uuid,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub stock_quantity: i32,
  pub category: Option<String>,
  #[serde(flatten)]
  pub review: Review,
  pub is_active: bool,
  pub version: u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn status(&self) -> ApprovalStatus {
    self.review.status()
  }
}

/// Seller input for a new listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price_cents: i64,
  #[serde(default)]
  pub stock_quantity: i32,
  pub category: Option<String>,
}

impl NewProduct {
  pub fn into_product(self, artisan_id: Uuid, now: DateTime<Utc>) -> Product {
    Product {
      id: Uuid::new_v4(),
      artisan_id,
      name: self.name,
      description: self.description,
      price_cents: self.price_cents,
      stock_quantity: self.stock_quantity,
      category: self.category,
      review: Review::Pending,
      is_active: false,
      version: 1,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Field effect applied together with a product review change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductEffect {
  pub is_active: bool,
}
